use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::recruitment::authz::CapabilityTable;
use crate::recruitment::domain::{
    Actor, ActorRole, Candidate, CandidateId, FeedbackEntry, FeedbackStatus, Notification,
    NotificationId, NotificationKind, NotificationPriority, OpenRole, Project, ProjectId,
    ProjectStatus, ProjectType,
};
use crate::recruitment::progression::LevelScheme;
use crate::recruitment::router::{recruitment_router, RecruitmentState};
use crate::recruitment::service::PipelineService;
use crate::recruitment::store::{
    ActorDirectory, CandidateStore, NotificationStore, Notifier, NotifyError, ProjectStore,
    StoreError,
};

pub(super) fn scheme(levels: &[&str]) -> LevelScheme {
    LevelScheme::new(levels.iter().map(|level| level.to_string()).collect())
        .expect("valid scheme")
}

pub(super) fn two_level_scheme() -> LevelScheme {
    scheme(&["L0", "L1"])
}

pub(super) fn actor(id: &str, role: ActorRole) -> Actor {
    Actor {
        id: id.to_string(),
        display_name: id.to_string(),
        role,
    }
}

pub(super) fn admin() -> Actor {
    actor("admin-1", ActorRole::Admin)
}

pub(super) fn recruiter() -> Actor {
    actor("recruiter-1", ActorRole::Recruiter)
}

pub(super) fn lead() -> Actor {
    actor("lead-1", ActorRole::RecruiterLead)
}

pub(super) fn initiator() -> Actor {
    actor("initiator-1", ActorRole::ProjectInitiator)
}

pub(super) fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn timestamp(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).single().expect("valid timestamp")
}

pub(super) fn open_role(title: &str) -> OpenRole {
    OpenRole {
        title: title.to_string(),
        location: "Berlin".to_string(),
        salary: 72_000,
        currency: "EUR".to_string(),
        deadline: day(2026, 4, 30),
        start_date: day(2026, 5, 1),
        end_date: day(2026, 12, 31),
        job_desc_path: None,
    }
}

pub(super) fn project(id: &str, roles: &[&str]) -> Project {
    Project {
        id: ProjectId(id.to_string()),
        client_name: "Northwind".to_string(),
        project_name: "Platform Buildout".to_string(),
        location: "Berlin".to_string(),
        project_type: ProjectType::Staffing,
        start_date: day(2026, 5, 1),
        status: ProjectStatus::Active,
        lead: "lead-1".to_string(),
        roles: roles.iter().map(|title| open_role(title)).collect(),
        created_at: timestamp(8),
    }
}

pub(super) fn candidate(id: &str, project_id: &str, role_title: &str, level: &str) -> Candidate {
    Candidate {
        id: CandidateId(id.to_string()),
        project_id: ProjectId(project_id.to_string()),
        role_title: role_title.to_string(),
        name: format!("Candidate {id}"),
        email: format!("{id}@example.com"),
        phone: None,
        resume_path: None,
        interview_level: level.to_string(),
        feedback: Vec::new(),
        created_at: timestamp(9),
    }
}

pub(super) fn feedback(level: &str, comment: &str, status: FeedbackStatus) -> FeedbackEntry {
    FeedbackEntry {
        level: level.to_string(),
        comment: comment.to_string(),
        status,
    }
}

pub(super) fn notification(
    id: &str,
    recipient: &str,
    read: bool,
    created_at: DateTime<Utc>,
) -> Notification {
    Notification {
        id: NotificationId(id.to_string()),
        kind: NotificationKind::ProjectUpdated,
        title: format!("notice {id}"),
        message: "seeded".to_string(),
        recipient: recipient.to_string(),
        project_id: None,
        candidate_id: None,
        priority: NotificationPriority::Medium,
        read,
        created_at,
    }
}

#[derive(Default)]
pub(super) struct MemoryStore {
    projects: Mutex<HashMap<ProjectId, Project>>,
    candidates: Mutex<HashMap<CandidateId, Candidate>>,
    notifications: Mutex<HashMap<NotificationId, Notification>>,
}

impl MemoryStore {
    pub(super) fn seed_project(&self, project: Project) {
        self.projects
            .lock()
            .expect("project mutex poisoned")
            .insert(project.id.clone(), project);
    }

    pub(super) fn seed_candidate(&self, candidate: Candidate) {
        self.candidates
            .lock()
            .expect("candidate mutex poisoned")
            .insert(candidate.id.clone(), candidate);
    }

    pub(super) fn seed_notification(&self, notification: Notification) {
        self.notifications
            .lock()
            .expect("notification mutex poisoned")
            .insert(notification.id.clone(), notification);
    }

    pub(super) fn candidate_count(&self) -> usize {
        self.candidates.lock().expect("candidate mutex poisoned").len()
    }

    pub(super) fn project_count(&self) -> usize {
        self.projects.lock().expect("project mutex poisoned").len()
    }

    pub(super) fn stored_notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .expect("notification mutex poisoned")
            .values()
            .cloned()
            .collect()
    }
}

impl ProjectStore for MemoryStore {
    fn insert_project(&self, project: Project) -> Result<Project, StoreError> {
        let mut guard = self.projects.lock().expect("project mutex poisoned");
        if guard.contains_key(&project.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    fn update_project(&self, project: Project) -> Result<(), StoreError> {
        let mut guard = self.projects.lock().expect("project mutex poisoned");
        if !guard.contains_key(&project.id) {
            return Err(StoreError::NotFound);
        }
        guard.insert(project.id.clone(), project);
        Ok(())
    }

    fn fetch_project(&self, id: &ProjectId) -> Result<Option<Project>, StoreError> {
        let guard = self.projects.lock().expect("project mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn delete_project(&self, id: &ProjectId) -> Result<(), StoreError> {
        let mut guard = self.projects.lock().expect("project mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    fn projects(&self) -> Result<Vec<Project>, StoreError> {
        let guard = self.projects.lock().expect("project mutex poisoned");
        let mut projects: Vec<Project> = guard.values().cloned().collect();
        projects.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(projects)
    }
}

impl CandidateStore for MemoryStore {
    fn insert_candidate(&self, candidate: Candidate) -> Result<Candidate, StoreError> {
        let mut guard = self.candidates.lock().expect("candidate mutex poisoned");
        if guard.contains_key(&candidate.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(candidate.id.clone(), candidate.clone());
        Ok(candidate)
    }

    fn update_candidate(&self, candidate: Candidate) -> Result<(), StoreError> {
        let mut guard = self.candidates.lock().expect("candidate mutex poisoned");
        if !guard.contains_key(&candidate.id) {
            return Err(StoreError::NotFound);
        }
        guard.insert(candidate.id.clone(), candidate);
        Ok(())
    }

    fn fetch_candidate(&self, id: &CandidateId) -> Result<Option<Candidate>, StoreError> {
        let guard = self.candidates.lock().expect("candidate mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn candidates_for_project(&self, project: &ProjectId) -> Result<Vec<Candidate>, StoreError> {
        let guard = self.candidates.lock().expect("candidate mutex poisoned");
        let mut candidates: Vec<Candidate> = guard
            .values()
            .filter(|candidate| &candidate.project_id == project)
            .cloned()
            .collect();
        candidates.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(candidates)
    }
}

impl NotificationStore for MemoryStore {
    fn insert_notification(&self, notification: Notification) -> Result<Notification, StoreError> {
        let mut guard = self.notifications.lock().expect("notification mutex poisoned");
        if guard.contains_key(&notification.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(notification.id.clone(), notification.clone());
        Ok(notification)
    }

    fn update_notification(&self, notification: Notification) -> Result<(), StoreError> {
        let mut guard = self.notifications.lock().expect("notification mutex poisoned");
        if !guard.contains_key(&notification.id) {
            return Err(StoreError::NotFound);
        }
        guard.insert(notification.id.clone(), notification);
        Ok(())
    }

    fn fetch_notification(
        &self,
        id: &NotificationId,
    ) -> Result<Option<Notification>, StoreError> {
        let guard = self.notifications.lock().expect("notification mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn notifications_for(&self, recipient: &str) -> Result<Vec<Notification>, StoreError> {
        let guard = self.notifications.lock().expect("notification mutex poisoned");
        Ok(guard
            .values()
            .filter(|notification| notification.recipient == recipient)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(super) struct MemoryNotifier {
    deliveries: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub(super) fn deliveries(&self) -> Vec<Notification> {
        self.deliveries
            .lock()
            .expect("notifier mutex poisoned")
            .clone()
    }
}

impl Notifier for MemoryNotifier {
    fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.deliveries
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification.clone());
        Ok(())
    }
}

pub(super) struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn deliver(&self, _notification: &Notification) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("smtp offline".to_string()))
    }
}

pub(super) fn build_service(
    scheme: LevelScheme,
) -> (
    PipelineService<MemoryStore, MemoryNotifier>,
    Arc<MemoryStore>,
    Arc<MemoryNotifier>,
) {
    let store = Arc::new(MemoryStore::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = PipelineService::new(
        store.clone(),
        notifier.clone(),
        CapabilityTable::standard(),
        scheme,
    );
    (service, store, notifier)
}

#[derive(Default, Clone)]
pub(super) struct MemoryDirectory {
    actors: HashMap<String, Actor>,
}

impl MemoryDirectory {
    pub(super) fn with_standard_actors() -> Self {
        let mut actors = HashMap::new();
        actors.insert("admin-token".to_string(), admin());
        actors.insert("initiator-token".to_string(), initiator());
        actors.insert("lead-token".to_string(), lead());
        actors.insert("recruiter-token".to_string(), recruiter());
        Self { actors }
    }
}

impl ActorDirectory for MemoryDirectory {
    fn resolve(&self, token: &str) -> Option<Actor> {
        self.actors.get(token).cloned()
    }
}

pub(super) fn build_router(
    scheme: LevelScheme,
) -> (axum::Router, Arc<MemoryStore>, Arc<MemoryNotifier>) {
    let (service, store, notifier) = build_service(scheme);
    let state = RecruitmentState {
        service: Arc::new(service),
        directory: Arc::new(MemoryDirectory::with_standard_actors()),
    };
    (recruitment_router(state), store, notifier)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
