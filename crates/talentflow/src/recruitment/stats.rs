use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::{Candidate, FeedbackStatus};
use super::progression::{InterviewPipeline, LevelScheme};

/// Per-level aggregate across a candidate population. `passed`, `pending`,
/// and `rejected` count historical feedback entries; `at_level` counts the
/// current stage pointers. The two are computed independently and may
/// disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelFunnelEntry {
    pub level: String,
    pub passed: usize,
    pub pending: usize,
    pub rejected: usize,
    pub at_level: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleStatsEntry {
    pub role_title: String,
    pub total: usize,
    pub selected: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOverview {
    pub level_funnel: Vec<LevelFunnelEntry>,
    pub per_role_stats: Vec<RoleStatsEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelCountEntry {
    pub level: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_candidates: usize,
    pub selected: usize,
    pub pipeline: Vec<LevelCountEntry>,
}

/// Pure one-pass rollup over a project's candidate set. Feedback entries or
/// stage pointers referencing levels outside the scheme are ignored.
#[derive(Debug, Clone)]
pub struct StatsAggregator {
    pipeline: InterviewPipeline,
}

impl StatsAggregator {
    pub fn new(scheme: LevelScheme) -> Self {
        Self {
            pipeline: InterviewPipeline::new(scheme),
        }
    }

    pub fn overview(&self, candidates: &[Candidate]) -> PipelineOverview {
        let scheme = self.pipeline.scheme();
        let mut funnel: Vec<LevelFunnelEntry> = scheme
            .levels()
            .iter()
            .map(|level| LevelFunnelEntry {
                level: level.clone(),
                passed: 0,
                pending: 0,
                rejected: 0,
                at_level: 0,
            })
            .collect();
        let index_of = |level: &str| scheme.levels().iter().position(|known| known == level);

        let mut per_role: BTreeMap<String, RoleStatsEntry> = BTreeMap::new();

        for candidate in candidates {
            for entry in &candidate.feedback {
                let Some(index) = index_of(&entry.level) else {
                    continue;
                };
                match entry.status {
                    FeedbackStatus::Passed => funnel[index].passed += 1,
                    FeedbackStatus::Pending => funnel[index].pending += 1,
                    FeedbackStatus::Rejected => funnel[index].rejected += 1,
                }
            }
            if let Some(index) = index_of(&candidate.interview_level) {
                funnel[index].at_level += 1;
            }

            let stats = per_role
                .entry(candidate.role_title.clone())
                .or_insert_with(|| RoleStatsEntry {
                    role_title: candidate.role_title.clone(),
                    total: 0,
                    selected: 0,
                    rejected: 0,
                });
            stats.total += 1;
            if self.pipeline.is_selected(candidate) {
                stats.selected += 1;
            } else if self.pipeline.is_rejected(candidate) {
                stats.rejected += 1;
            }
        }

        PipelineOverview {
            level_funnel: funnel,
            per_role_stats: per_role.into_values().collect(),
        }
    }

    /// Compact rollup backing the project dashboard card. `selected` uses
    /// the same predicate as the overview so the two never drift.
    pub fn dashboard(&self, candidates: &[Candidate]) -> DashboardSummary {
        let scheme = self.pipeline.scheme();
        let mut pipeline: Vec<LevelCountEntry> = scheme
            .levels()
            .iter()
            .map(|level| LevelCountEntry {
                level: level.clone(),
                count: 0,
            })
            .collect();

        let mut selected = 0;
        for candidate in candidates {
            if let Some(index) = scheme
                .levels()
                .iter()
                .position(|known| known == &candidate.interview_level)
            {
                pipeline[index].count += 1;
            }
            if self.pipeline.is_selected(candidate) {
                selected += 1;
            }
        }

        DashboardSummary {
            total_candidates: candidates.len(),
            selected,
            pipeline,
        }
    }
}
