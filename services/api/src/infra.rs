use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use talentflow::config::AccessTokenEntry;
use talentflow::recruitment::{
    Actor, ActorDirectory, Candidate, CandidateId, CandidateStore, Notification, NotificationId,
    NotificationStore, Notifier, NotifyError, Project, ProjectId, ProjectStore, StoreError,
};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local stand-in for the external document store. Holds the three
/// collections the service persists to.
#[derive(Default)]
pub(crate) struct InMemoryDocumentStore {
    projects: Mutex<HashMap<ProjectId, Project>>,
    candidates: Mutex<HashMap<CandidateId, Candidate>>,
    notifications: Mutex<HashMap<NotificationId, Notification>>,
}

impl ProjectStore for InMemoryDocumentStore {
    fn insert_project(&self, project: Project) -> Result<Project, StoreError> {
        let mut guard = self.projects.lock().expect("store mutex poisoned");
        if guard.contains_key(&project.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    fn update_project(&self, project: Project) -> Result<(), StoreError> {
        let mut guard = self.projects.lock().expect("store mutex poisoned");
        if !guard.contains_key(&project.id) {
            return Err(StoreError::NotFound);
        }
        guard.insert(project.id.clone(), project);
        Ok(())
    }

    fn fetch_project(&self, id: &ProjectId) -> Result<Option<Project>, StoreError> {
        let guard = self.projects.lock().expect("store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn delete_project(&self, id: &ProjectId) -> Result<(), StoreError> {
        let mut guard = self.projects.lock().expect("store mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    fn projects(&self) -> Result<Vec<Project>, StoreError> {
        let guard = self.projects.lock().expect("store mutex poisoned");
        let mut projects: Vec<Project> = guard.values().cloned().collect();
        projects.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(projects)
    }
}

impl CandidateStore for InMemoryDocumentStore {
    fn insert_candidate(&self, candidate: Candidate) -> Result<Candidate, StoreError> {
        let mut guard = self.candidates.lock().expect("store mutex poisoned");
        if guard.contains_key(&candidate.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(candidate.id.clone(), candidate.clone());
        Ok(candidate)
    }

    fn update_candidate(&self, candidate: Candidate) -> Result<(), StoreError> {
        let mut guard = self.candidates.lock().expect("store mutex poisoned");
        if !guard.contains_key(&candidate.id) {
            return Err(StoreError::NotFound);
        }
        guard.insert(candidate.id.clone(), candidate);
        Ok(())
    }

    fn fetch_candidate(&self, id: &CandidateId) -> Result<Option<Candidate>, StoreError> {
        let guard = self.candidates.lock().expect("store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn candidates_for_project(&self, project: &ProjectId) -> Result<Vec<Candidate>, StoreError> {
        let guard = self.candidates.lock().expect("store mutex poisoned");
        let mut candidates: Vec<Candidate> = guard
            .values()
            .filter(|candidate| &candidate.project_id == project)
            .cloned()
            .collect();
        candidates.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(candidates)
    }
}

impl NotificationStore for InMemoryDocumentStore {
    fn insert_notification(&self, notification: Notification) -> Result<Notification, StoreError> {
        let mut guard = self.notifications.lock().expect("store mutex poisoned");
        guard.insert(notification.id.clone(), notification.clone());
        Ok(notification)
    }

    fn update_notification(&self, notification: Notification) -> Result<(), StoreError> {
        let mut guard = self.notifications.lock().expect("store mutex poisoned");
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
        let guard = self.notifications.lock().expect("store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn notifications_for(&self, recipient: &str) -> Result<Vec<Notification>, StoreError> {
        let guard = self.notifications.lock().expect("store mutex poisoned");
        Ok(guard
            .values()
            .filter(|notification| notification.recipient == recipient)
            .cloned()
            .collect())
    }
}

/// Delivery hook used when no external notifier is wired up: the feed row is
/// already persisted, so delivery just logs the event.
#[derive(Default)]
pub(crate) struct LogNotifier;

impl Notifier for LogNotifier {
    fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        info!(
            kind = notification.kind.label(),
            recipient = %notification.recipient,
            title = %notification.title,
            "notification dispatched"
        );
        Ok(())
    }
}

/// Bearer-token directory hydrated from configuration.
pub(crate) struct StaticActorDirectory {
    actors: HashMap<String, Actor>,
}

impl StaticActorDirectory {
    pub(crate) fn from_entries(entries: &[AccessTokenEntry]) -> Self {
        let actors = entries
            .iter()
            .map(|entry| {
                (
                    entry.token.clone(),
                    Actor {
                        id: entry.actor_id.clone(),
                        display_name: entry.display_name.clone(),
                        role: entry.role,
                    },
                )
            })
            .collect();
        Self { actors }
    }
}

impl ActorDirectory for StaticActorDirectory {
    fn resolve(&self, token: &str) -> Option<Actor> {
        self.actors.get(token).cloned()
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
