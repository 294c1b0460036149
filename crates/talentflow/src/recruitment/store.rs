use super::domain::{
    Actor, Candidate, CandidateId, Notification, NotificationId, Project, ProjectId,
};

/// Project persistence offered by the external document store.
///
/// Writes are atomic at the single-document level; the core performs
/// read-current/merge/write-back and never blind-overwrites a parent
/// document it has not just re-read.
pub trait ProjectStore: Send + Sync {
    fn insert_project(&self, project: Project) -> Result<Project, StoreError>;
    fn update_project(&self, project: Project) -> Result<(), StoreError>;
    fn fetch_project(&self, id: &ProjectId) -> Result<Option<Project>, StoreError>;
    fn delete_project(&self, id: &ProjectId) -> Result<(), StoreError>;
    fn projects(&self) -> Result<Vec<Project>, StoreError>;
}

pub trait CandidateStore: Send + Sync {
    fn insert_candidate(&self, candidate: Candidate) -> Result<Candidate, StoreError>;
    fn update_candidate(&self, candidate: Candidate) -> Result<(), StoreError>;
    fn fetch_candidate(&self, id: &CandidateId) -> Result<Option<Candidate>, StoreError>;
    fn candidates_for_project(&self, project: &ProjectId) -> Result<Vec<Candidate>, StoreError>;
}

pub trait NotificationStore: Send + Sync {
    fn insert_notification(&self, notification: Notification) -> Result<Notification, StoreError>;
    fn update_notification(&self, notification: Notification) -> Result<(), StoreError>;
    fn fetch_notification(&self, id: &NotificationId)
        -> Result<Option<Notification>, StoreError>;
    fn notifications_for(&self, recipient: &str) -> Result<Vec<Notification>, StoreError>;
}

/// Unified view of the external document store.
pub trait DocumentStore: ProjectStore + CandidateStore + NotificationStore {}

impl<T> DocumentStore for T where T: ProjectStore + CandidateStore + NotificationStore {}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document already exists")]
    Conflict,
    #[error("document not found")]
    NotFound,
    #[error("document store unavailable: {0}")]
    Unavailable(String),
}

/// Outbound delivery hook for the external notifier. Fire-and-forget from
/// the core's perspective; failures are demoted to warnings.
pub trait Notifier: Send + Sync {
    fn deliver(&self, notification: &Notification) -> Result<(), NotifyError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notifier transport unavailable: {0}")]
    Transport(String),
}

/// Stand-in for the external authentication service: bearer token in,
/// authenticated actor out.
pub trait ActorDirectory: Send + Sync {
    fn resolve(&self, token: &str) -> Option<Actor>;
}
