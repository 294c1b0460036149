use serde::{Deserialize, Serialize};

use super::domain::{Candidate, FeedbackEntry, FeedbackStatus};

/// Ordered, duplicate-free interview stage identifiers for one deployment.
///
/// The concrete level count is configuration, not an invariant; the default
/// scheme runs L0 through L6.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelScheme {
    levels: Vec<String>,
}

impl LevelScheme {
    pub fn new(levels: Vec<String>) -> Result<Self, ValidationError> {
        let levels: Vec<String> = levels
            .into_iter()
            .map(|level| level.trim().to_string())
            .collect();

        if levels.is_empty() || levels.iter().any(String::is_empty) {
            return Err(ValidationError::EmptyScheme);
        }
        for (index, level) in levels.iter().enumerate() {
            if levels[..index].contains(level) {
                return Err(ValidationError::DuplicateLevel {
                    level: level.clone(),
                });
            }
        }

        Ok(Self { levels })
    }

    pub fn standard() -> Self {
        Self {
            levels: (0..7).map(|stage| format!("L{stage}")).collect(),
        }
    }

    pub fn contains(&self, level: &str) -> bool {
        self.levels.iter().any(|known| known == level)
    }

    /// The lowest defined level, where every new candidate starts.
    pub fn initial(&self) -> &str {
        &self.levels[0]
    }

    pub fn levels(&self) -> &[String] {
        &self.levels
    }
}

/// Feedback payload as it arrives off the wire. Level and status stay
/// strings so malformed values surface as [`ValidationError`] rather than
/// deserialization failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackDraft {
    pub level: String,
    pub comment: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("interview level '{level}' is not part of the configured scheme")]
    UnknownLevel { level: String },
    #[error("feedback status '{status}' is not one of PENDING, PASSED, REJECTED")]
    UnknownStatus { status: String },
    #[error("level scheme must list at least one non-empty level")]
    EmptyScheme,
    #[error("level scheme lists '{level}' more than once")]
    DuplicateLevel { level: String },
    #[error("role title '{title}' appears more than once in the project")]
    DuplicateRoleTitle { title: String },
    #[error("project has no open role titled '{title}'")]
    UnknownRoleTitle { title: String },
}

/// The interview-stage state machine. A candidate's observable state is the
/// pair (interview_level, feedback set); both tracks move independently.
#[derive(Debug, Clone)]
pub struct InterviewPipeline {
    scheme: LevelScheme,
}

impl InterviewPipeline {
    pub fn new(scheme: LevelScheme) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> &LevelScheme {
        &self.scheme
    }

    pub fn initial_level(&self) -> &str {
        self.scheme.initial()
    }

    /// Move the stage pointer. Deliberately non-monotonic so recruiters can
    /// correct mistakes; not gated on feedback at the prior level.
    pub fn advance_level(
        &self,
        candidate: &mut Candidate,
        new_level: &str,
    ) -> Result<(), ValidationError> {
        if !self.scheme.contains(new_level) {
            return Err(ValidationError::UnknownLevel {
                level: new_level.to_string(),
            });
        }
        candidate.interview_level = new_level.to_string();
        Ok(())
    }

    /// Upsert one feedback entry keyed by level. An existing entry for the
    /// level is replaced in place so the set keeps its recorded order; a new
    /// level appends. Validation failures leave the candidate untouched.
    pub fn record_feedback(
        &self,
        candidate: &mut Candidate,
        draft: FeedbackDraft,
    ) -> Result<(), ValidationError> {
        let level = draft.level.trim().to_string();
        if level.is_empty() {
            return Err(ValidationError::EmptyField { field: "level" });
        }
        let comment = draft.comment.trim().to_string();
        if comment.is_empty() {
            return Err(ValidationError::EmptyField { field: "comment" });
        }
        if !self.scheme.contains(&level) {
            return Err(ValidationError::UnknownLevel { level });
        }
        let status =
            FeedbackStatus::parse(&draft.status).ok_or_else(|| ValidationError::UnknownStatus {
                status: draft.status.trim().to_string(),
            })?;

        let entry = FeedbackEntry {
            level,
            comment,
            status,
        };
        match candidate
            .feedback
            .iter()
            .position(|existing| existing.level == entry.level)
        {
            Some(index) => candidate.feedback[index] = entry,
            None => candidate.feedback.push(entry),
        }
        Ok(())
    }

    /// Derived on read, never stored: a candidate is selected iff every
    /// defined level carries a PASSED entry and no entry is REJECTED. The
    /// rejection veto keeps `is_selected` and `is_rejected` mutually
    /// exclusive even for malformed feedback sets.
    pub fn is_selected(&self, candidate: &Candidate) -> bool {
        let all_passed = self.scheme.levels().iter().all(|level| {
            matches!(
                candidate.feedback_at(level),
                Some(entry) if entry.status == FeedbackStatus::Passed
            )
        });
        all_passed && !self.is_rejected(candidate)
    }

    pub fn is_rejected(&self, candidate: &Candidate) -> bool {
        candidate
            .feedback
            .iter()
            .any(|entry| entry.status == FeedbackStatus::Rejected)
    }
}
