use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for recruitment projects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub String);

/// Identifier wrapper for candidates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateId(pub String);

/// Identifier wrapper for feed notifications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub String);

/// An authenticated caller, resolved externally from a bearer token.
///
/// Carries exactly one role label; nothing in the core grants a role more
/// than the capability table explicitly lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: String,
    pub display_name: String,
    pub role: ActorRole,
}

/// The closed role enumeration. Serialized with the display labels the
/// upstream identity provider hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorRole {
    #[serde(rename = "Project Initiator")]
    ProjectInitiator,
    #[serde(rename = "Recruiter Lead")]
    RecruiterLead,
    Recruiter,
    Admin,
}

impl ActorRole {
    pub const fn label(self) -> &'static str {
        match self {
            ActorRole::ProjectInitiator => "Project Initiator",
            ActorRole::RecruiterLead => "Recruiter Lead",
            ActorRole::Recruiter => "Recruiter",
            ActorRole::Admin => "Admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Project Initiator" => Some(ActorRole::ProjectInitiator),
            "Recruiter Lead" => Some(ActorRole::RecruiterLead),
            "Recruiter" => Some(ActorRole::Recruiter),
            "Admin" => Some(ActorRole::Admin),
            _ => None,
        }
    }

    pub const fn all() -> [ActorRole; 4] {
        [
            ActorRole::ProjectInitiator,
            ActorRole::RecruiterLead,
            ActorRole::Recruiter,
            ActorRole::Admin,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectType {
    Staffing,
    Consulting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProjectStatus {
    Active,
    Hold,
    Completed,
}

impl ProjectStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ProjectStatus::Active => "ACTIVE",
            ProjectStatus::Hold => "HOLD",
            ProjectStatus::Completed => "COMPLETED",
        }
    }
}

/// A recruitment engagement owning an ordered sequence of open roles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub client_name: String,
    pub project_name: String,
    pub location: String,
    pub project_type: ProjectType,
    pub start_date: NaiveDate,
    pub status: ProjectStatus,
    pub lead: String,
    pub roles: Vec<OpenRole>,
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Look up an embedded role by its title, which is unique per project.
    pub fn role(&self, title: &str) -> Option<&OpenRole> {
        self.roles.iter().find(|role| role.title == title)
    }
}

/// An open position embedded in a project; its lifecycle follows the parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenRole {
    pub title: String,
    pub location: String,
    pub salary: u32,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub deadline: NaiveDate,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_desc_path: Option<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// A person moving through the interview pipeline of one (project, role) pair.
///
/// `interview_level` is the current stage pointer; `feedback` holds at most
/// one entry per level, ordered by when each level was first recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: CandidateId,
    pub project_id: ProjectId,
    pub role_title: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_path: Option<String>,
    pub interview_level: String,
    pub feedback: Vec<FeedbackEntry>,
    pub created_at: DateTime<Utc>,
}

impl Candidate {
    pub fn feedback_at(&self, level: &str) -> Option<&FeedbackEntry> {
        self.feedback.iter().find(|entry| entry.level == level)
    }
}

/// One interview outcome record; level is the dedup key within a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub level: String,
    pub comment: String,
    pub status: FeedbackStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FeedbackStatus {
    Pending,
    Passed,
    Rejected,
}

impl FeedbackStatus {
    pub const fn label(self) -> &'static str {
        match self {
            FeedbackStatus::Pending => "PENDING",
            FeedbackStatus::Passed => "PASSED",
            FeedbackStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "PENDING" => Some(FeedbackStatus::Pending),
            "PASSED" => Some(FeedbackStatus::Passed),
            "REJECTED" => Some(FeedbackStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    ProjectCreated,
    ProjectUpdated,
    CandidateAdded,
    InterviewCompleted,
    LevelAdvanced,
    RoleFilled,
    DeadlineApproaching,
}

impl NotificationKind {
    pub const fn label(self) -> &'static str {
        match self {
            NotificationKind::ProjectCreated => "PROJECT_CREATED",
            NotificationKind::ProjectUpdated => "PROJECT_UPDATED",
            NotificationKind::CandidateAdded => "CANDIDATE_ADDED",
            NotificationKind::InterviewCompleted => "INTERVIEW_COMPLETED",
            NotificationKind::LevelAdvanced => "LEVEL_ADVANCED",
            NotificationKind::RoleFilled => "ROLE_FILLED",
            NotificationKind::DeadlineApproaching => "DEADLINE_APPROACHING",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationPriority {
    Low,
    Medium,
    High,
    Urgent,
}

/// A feed record derived from pipeline events. Append-only apart from the
/// `read` flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub recipient: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_id: Option<CandidateId>,
    pub priority: NotificationPriority,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
