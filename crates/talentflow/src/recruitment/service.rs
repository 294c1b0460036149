use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::warn;

use super::authz::{Action, CapabilityTable, PermissionEngine};
use super::domain::{
    Actor, ActorRole, Candidate, CandidateId, Notification, NotificationId, NotificationKind,
    NotificationPriority, OpenRole, Project, ProjectId, ProjectStatus, ProjectType,
};
use super::progression::{FeedbackDraft, InterviewPipeline, LevelScheme, ValidationError};
use super::stats::{DashboardSummary, PipelineOverview, StatsAggregator};
use super::store::{DocumentStore, Notifier, StoreError};

static PROJECT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static CANDIDATE_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static NOTIFICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_project_id() -> ProjectId {
    ProjectId(format!(
        "proj-{:06}",
        PROJECT_SEQUENCE.fetch_add(1, Ordering::Relaxed)
    ))
}

fn next_candidate_id() -> CandidateId {
    CandidateId(format!(
        "cand-{:06}",
        CANDIDATE_SEQUENCE.fetch_add(1, Ordering::Relaxed)
    ))
}

fn next_notification_id() -> NotificationId {
    NotificationId(format!(
        "ntf-{:06}",
        NOTIFICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed)
    ))
}

/// Result of a mutation plus an optional degraded-success warning.
///
/// A set warning means the primary write landed but a post-commit
/// notification step did not.
#[derive(Debug, Clone)]
pub struct PipelineCommit<T> {
    pub record: T,
    pub warning: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("role '{}' may not {}", role.label(), action.label())]
    Forbidden { role: ActorRole, action: Action },
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCandidate {
    pub project_id: String,
    pub role_title: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub resume_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDraft {
    pub client_name: String,
    pub project_name: String,
    pub location: String,
    pub project_type: ProjectType,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub status: Option<ProjectStatus>,
    pub lead: String,
    #[serde(default)]
    pub roles: Vec<OpenRole>,
}

/// Partial project payload merged over the freshly-loaded record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    pub client_name: Option<String>,
    pub project_name: Option<String>,
    pub location: Option<String>,
    pub project_type: Option<ProjectType>,
    pub start_date: Option<NaiveDate>,
    pub status: Option<ProjectStatus>,
    pub lead: Option<String>,
    pub roles: Option<Vec<OpenRole>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationQuery {
    pub limit: Option<usize>,
    #[serde(default)]
    pub unread_only: bool,
}

const DEFAULT_FEED_LIMIT: usize = 20;
const DEADLINE_WINDOW_DAYS: i64 = 7;
const DEADLINE_URGENT_DAYS: i64 = 3;

/// Orchestrates authorization, pipeline transitions, persistence, and
/// post-commit notifications. Every method authorizes before touching the
/// store; a denied request performs no entity access.
pub struct PipelineService<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    permissions: PermissionEngine,
    pipeline: InterviewPipeline,
    stats: StatsAggregator,
}

impl<S, N> PipelineService<S, N>
where
    S: DocumentStore + 'static,
    N: Notifier + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>, table: CapabilityTable, scheme: LevelScheme) -> Self {
        Self {
            store,
            notifier,
            permissions: PermissionEngine::new(table),
            pipeline: InterviewPipeline::new(scheme.clone()),
            stats: StatsAggregator::new(scheme),
        }
    }

    fn authorize(&self, actor: &Actor, action: Action) -> Result<(), PipelineError> {
        if self.permissions.authorize(actor.role, action) {
            Ok(())
        } else {
            Err(PipelineError::Forbidden {
                role: actor.role,
                action,
            })
        }
    }

    /// Persist a notification for the feed and hand it to the notifier.
    /// Both steps run after the primary write; either failing yields a
    /// warning instead of failing the mutation.
    fn emit(&self, notification: Notification) -> Option<String> {
        if let Err(error) = self.store.insert_notification(notification.clone()) {
            warn!(kind = notification.kind.label(), %error, "notification not recorded");
            return Some(format!(
                "{} notification was not recorded",
                notification.kind.label()
            ));
        }
        if let Err(error) = self.notifier.deliver(&notification) {
            warn!(kind = notification.kind.label(), %error, "notifier delivery failed");
            return Some(format!(
                "{} notification delivery failed",
                notification.kind.label()
            ));
        }
        None
    }

    fn event(
        &self,
        kind: NotificationKind,
        title: String,
        message: String,
        recipient: String,
        project_id: Option<ProjectId>,
        candidate_id: Option<CandidateId>,
        priority: NotificationPriority,
    ) -> Notification {
        Notification {
            id: next_notification_id(),
            kind,
            title,
            message,
            recipient,
            project_id,
            candidate_id,
            priority,
            read: false,
            created_at: Utc::now(),
        }
    }

    // ---- candidates -----------------------------------------------------

    pub fn add_candidate(
        &self,
        actor: &Actor,
        draft: NewCandidate,
    ) -> Result<PipelineCommit<Candidate>, PipelineError> {
        self.authorize(actor, Action::ManageCandidates)?;

        if draft.name.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "name" }.into());
        }
        if draft.email.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "email" }.into());
        }

        let project_id = ProjectId(draft.project_id.clone());
        let project = self
            .store
            .fetch_project(&project_id)?
            .ok_or(PipelineError::NotFound("project"))?;
        if project.role(&draft.role_title).is_none() {
            return Err(ValidationError::UnknownRoleTitle {
                title: draft.role_title,
            }
            .into());
        }

        let candidate = Candidate {
            id: next_candidate_id(),
            project_id: project.id.clone(),
            role_title: draft.role_title,
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
            resume_path: draft.resume_path,
            interview_level: self.pipeline.initial_level().to_string(),
            feedback: Vec::new(),
            created_at: Utc::now(),
        };
        let record = self.store.insert_candidate(candidate)?;

        let warning = self.emit(self.event(
            NotificationKind::CandidateAdded,
            format!("New candidate for {}", record.role_title),
            format!(
                "{} entered the {} pipeline of {}",
                record.name, record.role_title, project.project_name
            ),
            project.lead.clone(),
            Some(project.id.clone()),
            Some(record.id.clone()),
            NotificationPriority::Medium,
        ));

        Ok(PipelineCommit { record, warning })
    }

    pub fn update_interview_level(
        &self,
        actor: &Actor,
        id: &CandidateId,
        new_level: &str,
    ) -> Result<PipelineCommit<Candidate>, PipelineError> {
        self.authorize(actor, Action::ManageCandidates)?;

        let mut candidate = self
            .store
            .fetch_candidate(id)?
            .ok_or(PipelineError::NotFound("candidate"))?;
        self.pipeline.advance_level(&mut candidate, new_level)?;
        self.store.update_candidate(candidate.clone())?;

        let warning = match self.store.fetch_project(&candidate.project_id)? {
            Some(project) => self.emit(self.event(
                NotificationKind::LevelAdvanced,
                format!("{} moved to {}", candidate.name, candidate.interview_level),
                format!(
                    "{} is now at {} for {}",
                    candidate.name, candidate.interview_level, candidate.role_title
                ),
                project.lead.clone(),
                Some(project.id),
                Some(candidate.id.clone()),
                NotificationPriority::Medium,
            )),
            // Parent project already deleted; nobody left to notify.
            None => None,
        };

        Ok(PipelineCommit {
            record: candidate,
            warning,
        })
    }

    /// Read-current / upsert-one-entry / write-back for the feedback set.
    pub fn record_feedback(
        &self,
        actor: &Actor,
        id: &CandidateId,
        draft: FeedbackDraft,
    ) -> Result<PipelineCommit<Candidate>, PipelineError> {
        self.authorize(actor, Action::ManageCandidates)?;

        let mut candidate = self
            .store
            .fetch_candidate(id)?
            .ok_or(PipelineError::NotFound("candidate"))?;
        let was_selected = self.pipeline.is_selected(&candidate);
        let level = draft.level.trim().to_string();
        self.pipeline.record_feedback(&mut candidate, draft)?;
        self.store.update_candidate(candidate.clone())?;

        let mut warning = None;
        if let Some(project) = self.store.fetch_project(&candidate.project_id)? {
            warning = self.emit(self.event(
                NotificationKind::InterviewCompleted,
                format!("Feedback recorded at {level}"),
                format!(
                    "Interview feedback for {} ({}) was recorded at {level}",
                    candidate.name, candidate.role_title
                ),
                project.lead.clone(),
                Some(project.id.clone()),
                Some(candidate.id.clone()),
                NotificationPriority::Medium,
            ));

            if !was_selected && self.pipeline.is_selected(&candidate) {
                let filled = self.emit(self.event(
                    NotificationKind::RoleFilled,
                    format!("{} filled", candidate.role_title),
                    format!(
                        "{} passed every interview level for {}",
                        candidate.name, candidate.role_title
                    ),
                    project.lead.clone(),
                    Some(project.id),
                    Some(candidate.id.clone()),
                    NotificationPriority::High,
                ));
                warning = merge_warnings(warning, filled);
            }
        }

        Ok(PipelineCommit {
            record: candidate,
            warning,
        })
    }

    pub fn candidate(&self, actor: &Actor, id: &CandidateId) -> Result<Candidate, PipelineError> {
        self.authorize(actor, Action::ViewPipeline)?;
        self.store
            .fetch_candidate(id)?
            .ok_or(PipelineError::NotFound("candidate"))
    }

    pub fn candidates(
        &self,
        actor: &Actor,
        project_id: &ProjectId,
        role_filter: Option<&str>,
    ) -> Result<Vec<Candidate>, PipelineError> {
        self.authorize(actor, Action::ViewPipeline)?;
        if self.store.fetch_project(project_id)?.is_none() {
            return Err(PipelineError::NotFound("project"));
        }
        let mut candidates = self.store.candidates_for_project(project_id)?;
        if let Some(role) = role_filter {
            candidates.retain(|candidate| candidate.role_title == role);
        }
        Ok(candidates)
    }

    // ---- dashboards -----------------------------------------------------

    pub fn overview(
        &self,
        actor: &Actor,
        project_id: &ProjectId,
    ) -> Result<PipelineOverview, PipelineError> {
        self.authorize(actor, Action::ViewPipeline)?;
        if self.store.fetch_project(project_id)?.is_none() {
            return Err(PipelineError::NotFound("project"));
        }
        let candidates = self.store.candidates_for_project(project_id)?;
        Ok(self.stats.overview(&candidates))
    }

    pub fn dashboard(
        &self,
        actor: &Actor,
        project_id: &ProjectId,
    ) -> Result<DashboardSummary, PipelineError> {
        self.authorize(actor, Action::ViewPipeline)?;
        if self.store.fetch_project(project_id)?.is_none() {
            return Err(PipelineError::NotFound("project"));
        }
        let candidates = self.store.candidates_for_project(project_id)?;
        Ok(self.stats.dashboard(&candidates))
    }

    // ---- projects -------------------------------------------------------

    pub fn create_project(
        &self,
        actor: &Actor,
        draft: ProjectDraft,
    ) -> Result<PipelineCommit<Project>, PipelineError> {
        self.authorize(actor, Action::CreateProject)?;

        if draft.client_name.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "clientName",
            }
            .into());
        }
        if draft.project_name.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "projectName",
            }
            .into());
        }
        unique_role_titles(&draft.roles)?;

        let project = Project {
            id: next_project_id(),
            client_name: draft.client_name,
            project_name: draft.project_name,
            location: draft.location,
            project_type: draft.project_type,
            start_date: draft.start_date,
            status: draft.status.unwrap_or(ProjectStatus::Active),
            lead: draft.lead,
            roles: draft.roles,
            created_at: Utc::now(),
        };
        let record = self.store.insert_project(project)?;

        let warning = self.emit(self.event(
            NotificationKind::ProjectCreated,
            format!("Project {} created", record.project_name),
            format!(
                "{} for {} is open with {} role(s)",
                record.project_name,
                record.client_name,
                record.roles.len()
            ),
            record.lead.clone(),
            Some(record.id.clone()),
            None,
            NotificationPriority::Medium,
        ));

        Ok(PipelineCommit { record, warning })
    }

    pub fn update_project(
        &self,
        actor: &Actor,
        id: &ProjectId,
        patch: ProjectPatch,
    ) -> Result<PipelineCommit<Project>, PipelineError> {
        self.authorize(actor, Action::EditProject)?;

        let mut project = self
            .store
            .fetch_project(id)?
            .ok_or(PipelineError::NotFound("project"))?;
        let previous_status = project.status;

        if let Some(client_name) = patch.client_name {
            project.client_name = client_name;
        }
        if let Some(project_name) = patch.project_name {
            project.project_name = project_name;
        }
        if let Some(location) = patch.location {
            project.location = location;
        }
        if let Some(project_type) = patch.project_type {
            project.project_type = project_type;
        }
        if let Some(start_date) = patch.start_date {
            project.start_date = start_date;
        }
        if let Some(status) = patch.status {
            project.status = status;
        }
        if let Some(lead) = patch.lead {
            project.lead = lead;
        }
        if let Some(roles) = patch.roles {
            unique_role_titles(&roles)?;
            project.roles = roles;
        }

        self.store.update_project(project.clone())?;

        let warning = if project.status != previous_status {
            self.emit(self.event(
                NotificationKind::ProjectUpdated,
                format!("Project {} is {}", project.project_name, project.status.label()),
                format!(
                    "{} moved from {} to {}",
                    project.project_name,
                    previous_status.label(),
                    project.status.label()
                ),
                project.lead.clone(),
                Some(project.id.clone()),
                None,
                NotificationPriority::Medium,
            ))
        } else {
            None
        };

        Ok(PipelineCommit {
            record: project,
            warning,
        })
    }

    pub fn delete_project(&self, actor: &Actor, id: &ProjectId) -> Result<(), PipelineError> {
        self.authorize(actor, Action::DeleteProject)?;
        match self.store.delete_project(id) {
            Err(StoreError::NotFound) => Err(PipelineError::NotFound("project")),
            other => other.map_err(PipelineError::from),
        }
    }

    pub fn project(&self, actor: &Actor, id: &ProjectId) -> Result<Project, PipelineError> {
        self.authorize(actor, Action::ViewPipeline)?;
        self.store
            .fetch_project(id)?
            .ok_or(PipelineError::NotFound("project"))
    }

    pub fn projects(&self, actor: &Actor) -> Result<Vec<Project>, PipelineError> {
        self.authorize(actor, Action::ViewPipeline)?;
        Ok(self.store.projects()?)
    }

    // ---- notification feed ----------------------------------------------

    /// Feed scoped to the acting user, newest first.
    pub fn notifications(
        &self,
        actor: &Actor,
        query: NotificationQuery,
    ) -> Result<Vec<Notification>, PipelineError> {
        self.authorize(actor, Action::ViewPipeline)?;
        let mut feed = self.store.notifications_for(&actor.id)?;
        feed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if query.unread_only {
            feed.retain(|notification| !notification.read);
        }
        feed.truncate(query.limit.unwrap_or(DEFAULT_FEED_LIMIT));
        Ok(feed)
    }

    pub fn unread_count(&self, actor: &Actor) -> Result<usize, PipelineError> {
        self.authorize(actor, Action::ViewPipeline)?;
        let feed = self.store.notifications_for(&actor.id)?;
        Ok(feed.iter().filter(|notification| !notification.read).count())
    }

    /// Marking another actor's notification is NotFound, not Forbidden, so
    /// the feed does not leak which identifiers exist.
    pub fn mark_read(
        &self,
        actor: &Actor,
        id: &NotificationId,
    ) -> Result<Notification, PipelineError> {
        self.authorize(actor, Action::ViewPipeline)?;
        let mut notification = self
            .store
            .fetch_notification(id)?
            .filter(|notification| notification.recipient == actor.id)
            .ok_or(PipelineError::NotFound("notification"))?;
        notification.read = true;
        self.store.update_notification(notification.clone())?;
        Ok(notification)
    }

    pub fn mark_all_read(&self, actor: &Actor) -> Result<usize, PipelineError> {
        self.authorize(actor, Action::ViewPipeline)?;
        let mut updated = 0;
        for mut notification in self.store.notifications_for(&actor.id)? {
            if !notification.read {
                notification.read = true;
                self.store.update_notification(notification)?;
                updated += 1;
            }
        }
        Ok(updated)
    }

    /// Admin-triggered sweep: deadline notices for projects starting within
    /// the next week, addressed to each project lead, plus a reminder for
    /// active projects with an empty pipeline. These are the feed's content,
    /// so failures here abort rather than degrade.
    pub fn generate_system_notices(
        &self,
        actor: &Actor,
        today: NaiveDate,
    ) -> Result<usize, PipelineError> {
        self.authorize(actor, Action::GenerateNotifications)?;

        let mut generated = 0;
        for project in self.store.projects()? {
            let days_until_start = (project.start_date - today).num_days();
            if (0..=DEADLINE_WINDOW_DAYS).contains(&days_until_start) {
                let priority = if days_until_start <= DEADLINE_URGENT_DAYS {
                    NotificationPriority::High
                } else {
                    NotificationPriority::Medium
                };
                self.store.insert_notification(self.event(
                    NotificationKind::DeadlineApproaching,
                    format!("{} starts in {days_until_start} day(s)", project.project_name),
                    format!(
                        "{} for {} starts on {}",
                        project.project_name, project.client_name, project.start_date
                    ),
                    project.lead.clone(),
                    Some(project.id.clone()),
                    None,
                    priority,
                ))?;
                generated += 1;
            }

            if project.status == ProjectStatus::Active
                && self.store.candidates_for_project(&project.id)?.is_empty()
            {
                self.store.insert_notification(self.event(
                    NotificationKind::ProjectUpdated,
                    format!("{} needs candidates", project.project_name),
                    format!(
                        "{} is active but its pipeline is empty",
                        project.project_name
                    ),
                    project.lead.clone(),
                    Some(project.id.clone()),
                    None,
                    NotificationPriority::Medium,
                ))?;
                generated += 1;
            }
        }
        Ok(generated)
    }
}

fn unique_role_titles(roles: &[OpenRole]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for role in roles {
        if !seen.insert(role.title.as_str()) {
            return Err(ValidationError::DuplicateRoleTitle {
                title: role.title.clone(),
            });
        }
    }
    Ok(())
}

fn merge_warnings(first: Option<String>, second: Option<String>) -> Option<String> {
    match (first, second) {
        (Some(a), Some(b)) => Some(format!("{a}; {b}")),
        (Some(a), None) => Some(a),
        (None, other) => other,
    }
}
