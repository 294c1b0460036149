use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::domain::ActorRole;

/// Closed set of action tags guarding every operation the service exposes.
///
/// `ManageCandidates` covers candidate creation, level updates, and feedback
/// upserts; `ViewPipeline` covers every read surface including the
/// notification feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    CreateProject,
    EditProject,
    DeleteProject,
    AssignRecruiters,
    ManageCandidates,
    ViewPipeline,
    GenerateNotifications,
}

impl Action {
    pub const fn label(self) -> &'static str {
        match self {
            Action::CreateProject => "create_project",
            Action::EditProject => "edit_project",
            Action::DeleteProject => "delete_project",
            Action::AssignRecruiters => "assign_recruiters",
            Action::ManageCandidates => "manage_candidates",
            Action::ViewPipeline => "view_pipeline",
            Action::GenerateNotifications => "generate_notifications",
        }
    }

    pub const fn all() -> [Action; 7] {
        [
            Action::CreateProject,
            Action::EditProject,
            Action::DeleteProject,
            Action::AssignRecruiters,
            Action::ManageCandidates,
            Action::ViewPipeline,
            Action::GenerateNotifications,
        ]
    }
}

/// Immutable role → granted-actions mapping, built once at startup and
/// injected. Tests construct narrow tables with [`CapabilityTable::grant`].
#[derive(Debug, Clone, Default)]
pub struct CapabilityTable {
    grants: HashMap<ActorRole, HashSet<Action>>,
}

impl CapabilityTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn grant(mut self, role: ActorRole, action: Action) -> Self {
        self.grants.entry(role).or_default().insert(action);
        self
    }

    /// The production policy. Admin holds every tag explicitly; no role is
    /// an implicit superset of another.
    pub fn standard() -> Self {
        let mut table = Self::empty();
        for action in [
            Action::CreateProject,
            Action::EditProject,
            Action::DeleteProject,
            Action::ViewPipeline,
        ] {
            table = table.grant(ActorRole::ProjectInitiator, action);
        }
        for action in [
            Action::AssignRecruiters,
            Action::ManageCandidates,
            Action::ViewPipeline,
        ] {
            table = table.grant(ActorRole::RecruiterLead, action);
        }
        for action in [Action::ManageCandidates, Action::ViewPipeline] {
            table = table.grant(ActorRole::Recruiter, action);
        }
        for action in Action::all() {
            table = table.grant(ActorRole::Admin, action);
        }
        table
    }

    fn allows(&self, role: ActorRole, action: Action) -> bool {
        self.grants
            .get(&role)
            .map(|granted| granted.contains(&action))
            .unwrap_or(false)
    }
}

/// Pure (role, action) → allow/deny lookup. Deny is the default for any
/// pair absent from the table; callers treat deny as a hard stop.
#[derive(Debug, Clone)]
pub struct PermissionEngine {
    table: CapabilityTable,
}

impl PermissionEngine {
    pub fn new(table: CapabilityTable) -> Self {
        Self { table }
    }

    pub fn authorize(&self, role: ActorRole, action: Action) -> bool {
        self.table.allows(role, action)
    }
}
