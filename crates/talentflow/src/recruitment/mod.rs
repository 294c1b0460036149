//! Recruitment pipeline core: authorization, interview progression,
//! statistics, and the orchestration service plus its HTTP router.

pub mod authz;
pub mod domain;
pub mod progression;
pub mod router;
pub mod service;
pub mod stats;
pub mod store;

#[cfg(test)]
mod tests;

pub use authz::{Action, CapabilityTable, PermissionEngine};
pub use domain::{
    Actor, ActorRole, Candidate, CandidateId, FeedbackEntry, FeedbackStatus, Notification,
    NotificationId, NotificationKind, NotificationPriority, OpenRole, Project, ProjectId,
    ProjectStatus, ProjectType,
};
pub use progression::{FeedbackDraft, InterviewPipeline, LevelScheme, ValidationError};
pub use router::{recruitment_router, RecruitmentState};
pub use service::{
    NewCandidate, NotificationQuery, PipelineCommit, PipelineError, PipelineService, ProjectDraft,
    ProjectPatch,
};
pub use stats::{DashboardSummary, PipelineOverview, StatsAggregator};
pub use store::{
    ActorDirectory, CandidateStore, DocumentStore, NotificationStore, Notifier, NotifyError,
    ProjectStore, StoreError,
};
