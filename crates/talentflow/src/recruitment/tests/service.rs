use std::sync::Arc;

use super::common::*;
use crate::recruitment::authz::CapabilityTable;
use crate::recruitment::domain::{
    FeedbackStatus, NotificationKind, NotificationPriority, ProjectStatus, ProjectType,
};
use crate::recruitment::progression::{FeedbackDraft, ValidationError};
use crate::recruitment::service::{
    NewCandidate, NotificationQuery, PipelineError, PipelineService, ProjectDraft, ProjectPatch,
};
use crate::recruitment::store::{CandidateStore, NotificationStore};

fn new_candidate(project_id: &str, role_title: &str) -> NewCandidate {
    NewCandidate {
        project_id: project_id.to_string(),
        role_title: role_title.to_string(),
        name: "Sam Rivera".to_string(),
        email: "sam@example.com".to_string(),
        phone: Some("+49 30 1234".to_string()),
        resume_path: None,
    }
}

fn feedback_draft(level: &str, comment: &str, status: &str) -> FeedbackDraft {
    FeedbackDraft {
        level: level.to_string(),
        comment: comment.to_string(),
        status: status.to_string(),
    }
}

fn project_draft(roles: &[&str]) -> ProjectDraft {
    ProjectDraft {
        client_name: "Northwind".to_string(),
        project_name: "Platform Buildout".to_string(),
        location: "Berlin".to_string(),
        project_type: ProjectType::Staffing,
        start_date: day(2026, 5, 1),
        status: None,
        lead: "lead-1".to_string(),
        roles: roles.iter().map(|title| open_role(title)).collect(),
    }
}

#[test]
fn denied_mutation_leaves_the_store_untouched() {
    let (service, store, notifier) = build_service(two_level_scheme());
    store.seed_project(project("p1", &["Backend Engineer"]));

    let result = service.delete_project(&recruiter(), &project("p1", &[]).id);
    assert!(matches!(result, Err(PipelineError::Forbidden { .. })));
    assert_eq!(store.project_count(), 1);
    assert!(notifier.deliveries().is_empty());
}

#[test]
fn add_candidate_requires_an_existing_project() {
    let (service, store, _) = build_service(two_level_scheme());

    let result = service.add_candidate(&recruiter(), new_candidate("missing", "Backend Engineer"));
    assert!(matches!(result, Err(PipelineError::NotFound("project"))));
    assert_eq!(store.candidate_count(), 0);
}

#[test]
fn add_candidate_requires_a_role_the_project_declares() {
    let (service, store, _) = build_service(two_level_scheme());
    store.seed_project(project("p1", &["Backend Engineer"]));

    let result = service.add_candidate(&recruiter(), new_candidate("p1", "Astronaut"));
    assert!(matches!(
        result,
        Err(PipelineError::Validation(
            ValidationError::UnknownRoleTitle { .. }
        ))
    ));
    assert_eq!(store.candidate_count(), 0);
}

#[test]
fn add_candidate_starts_at_the_lowest_level_and_notifies_the_lead() {
    let (service, store, notifier) = build_service(two_level_scheme());
    store.seed_project(project("p1", &["Backend Engineer"]));

    let commit = service
        .add_candidate(&lead(), new_candidate("p1", "Backend Engineer"))
        .expect("candidate created");

    assert_eq!(commit.record.interview_level, "L0");
    assert!(commit.record.feedback.is_empty());
    assert!(commit.warning.is_none());

    let deliveries = notifier.deliveries();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].kind, NotificationKind::CandidateAdded);
    assert_eq!(deliveries[0].recipient, "lead-1");
    // The feed copy is persisted alongside the delivery.
    let feed = store.notifications_for("lead-1").expect("feed loads");
    assert_eq!(feed.len(), 1);
}

#[test]
fn record_feedback_upserts_by_level_in_storage() {
    let (service, store, _) = build_service(two_level_scheme());
    store.seed_project(project("p1", &["Backend Engineer"]));
    store.seed_candidate(candidate("c1", "p1", "Backend Engineer", "L0"));
    let id = candidate("c1", "p1", "Backend Engineer", "L0").id;

    service
        .record_feedback(&recruiter(), &id, feedback_draft("L0", "first", "PENDING"))
        .expect("first write");
    service
        .record_feedback(&recruiter(), &id, feedback_draft("L0", "second", "PASSED"))
        .expect("second write");

    let stored = store
        .fetch_candidate(&id)
        .expect("fetch succeeds")
        .expect("candidate present");
    assert_eq!(stored.feedback.len(), 1);
    assert_eq!(stored.feedback[0].comment, "second");
    assert_eq!(stored.feedback[0].status, FeedbackStatus::Passed);
}

#[test]
fn invalid_feedback_status_leaves_storage_unchanged() {
    let (service, store, _) = build_service(two_level_scheme());
    store.seed_project(project("p1", &["Backend Engineer"]));
    store.seed_candidate(candidate("c1", "p1", "Backend Engineer", "L0"));
    let id = candidate("c1", "p1", "Backend Engineer", "L0").id;

    let result = service.record_feedback(
        &recruiter(),
        &id,
        feedback_draft("L0", "looks good", "APPROVED"),
    );
    assert!(matches!(
        result,
        Err(PipelineError::Validation(ValidationError::UnknownStatus { .. }))
    ));

    let stored = store
        .fetch_candidate(&id)
        .expect("fetch succeeds")
        .expect("candidate present");
    assert!(stored.feedback.is_empty());
}

#[test]
fn notifier_failure_degrades_to_a_warning() {
    let store = Arc::new(MemoryStore::default());
    let service = PipelineService::new(
        store.clone(),
        Arc::new(FailingNotifier),
        CapabilityTable::standard(),
        two_level_scheme(),
    );
    store.seed_project(project("p1", &["Backend Engineer"]));

    let commit = service
        .add_candidate(&recruiter(), new_candidate("p1", "Backend Engineer"))
        .expect("primary mutation still succeeds");

    assert_eq!(store.candidate_count(), 1);
    let warning = commit.warning.expect("degraded success reported");
    assert!(warning.contains("CANDIDATE_ADDED"));
}

#[test]
fn completing_every_level_emits_role_filled() {
    let (service, store, notifier) = build_service(two_level_scheme());
    store.seed_project(project("p1", &["Backend Engineer"]));
    store.seed_candidate(candidate("c1", "p1", "Backend Engineer", "L0"));
    let id = candidate("c1", "p1", "Backend Engineer", "L0").id;

    service
        .record_feedback(&lead(), &id, feedback_draft("L0", "ok", "PASSED"))
        .expect("L0 recorded");
    service
        .record_feedback(&lead(), &id, feedback_draft("L1", "ok", "PASSED"))
        .expect("L1 recorded");

    let kinds: Vec<NotificationKind> = notifier
        .deliveries()
        .iter()
        .map(|notification| notification.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            NotificationKind::InterviewCompleted,
            NotificationKind::InterviewCompleted,
            NotificationKind::RoleFilled,
        ]
    );
    let filled = &notifier.deliveries()[2];
    assert_eq!(filled.priority, NotificationPriority::High);
}

#[test]
fn update_interview_level_persists_and_notifies() {
    let (service, store, notifier) = build_service(two_level_scheme());
    store.seed_project(project("p1", &["Backend Engineer"]));
    store.seed_candidate(candidate("c1", "p1", "Backend Engineer", "L0"));
    let id = candidate("c1", "p1", "Backend Engineer", "L0").id;

    let commit = service
        .update_interview_level(&recruiter(), &id, "L1")
        .expect("level updated");
    assert_eq!(commit.record.interview_level, "L1");

    let stored = store
        .fetch_candidate(&id)
        .expect("fetch succeeds")
        .expect("candidate present");
    assert_eq!(stored.interview_level, "L1");
    assert_eq!(
        notifier.deliveries()[0].kind,
        NotificationKind::LevelAdvanced
    );
}

#[test]
fn candidate_round_trips_through_the_store() {
    let (service, store, _) = build_service(two_level_scheme());
    store.seed_project(project("p1", &["Backend Engineer"]));

    let created = service
        .add_candidate(&recruiter(), new_candidate("p1", "Backend Engineer"))
        .expect("candidate created")
        .record;
    let fetched = service
        .candidate(&recruiter(), &created.id)
        .expect("candidate fetched");
    assert_eq!(created, fetched);
}

#[test]
fn candidates_can_be_filtered_by_role_title() {
    let (service, store, _) = build_service(two_level_scheme());
    store.seed_project(project("p1", &["Backend Engineer", "Analyst"]));
    store.seed_candidate(candidate("c1", "p1", "Backend Engineer", "L0"));
    store.seed_candidate(candidate("c2", "p1", "Analyst", "L0"));

    let all = service
        .candidates(&recruiter(), &project("p1", &[]).id, None)
        .expect("list loads");
    assert_eq!(all.len(), 2);

    let analysts = service
        .candidates(&recruiter(), &project("p1", &[]).id, Some("Analyst"))
        .expect("filtered list loads");
    assert_eq!(analysts.len(), 1);
    assert_eq!(analysts[0].role_title, "Analyst");
}

#[test]
fn create_project_rejects_duplicate_role_titles() {
    let (service, store, _) = build_service(two_level_scheme());

    let result = service.create_project(
        &initiator(),
        project_draft(&["Backend Engineer", "Backend Engineer"]),
    );
    assert!(matches!(
        result,
        Err(PipelineError::Validation(
            ValidationError::DuplicateRoleTitle { .. }
        ))
    ));
    assert_eq!(store.project_count(), 0);
}

#[test]
fn create_project_defaults_to_active_and_notifies() {
    let (service, _store, notifier) = build_service(two_level_scheme());

    let commit = service
        .create_project(&initiator(), project_draft(&["Backend Engineer"]))
        .expect("project created");
    assert_eq!(commit.record.status, ProjectStatus::Active);
    assert_eq!(
        notifier.deliveries()[0].kind,
        NotificationKind::ProjectCreated
    );
}

#[test]
fn update_project_merges_patch_and_reports_status_changes() {
    let (service, store, notifier) = build_service(two_level_scheme());
    store.seed_project(project("p1", &["Backend Engineer"]));
    let id = project("p1", &[]).id;

    let unchanged = service
        .update_project(
            &initiator(),
            &id,
            ProjectPatch {
                location: Some("Munich".to_string()),
                ..ProjectPatch::default()
            },
        )
        .expect("patch applied");
    assert_eq!(unchanged.record.location, "Munich");
    assert_eq!(unchanged.record.client_name, "Northwind");
    assert!(notifier.deliveries().is_empty(), "no status change, no notice");

    let held = service
        .update_project(
            &initiator(),
            &id,
            ProjectPatch {
                status: Some(ProjectStatus::Hold),
                ..ProjectPatch::default()
            },
        )
        .expect("status patch applied");
    assert_eq!(held.record.status, ProjectStatus::Hold);
    assert_eq!(
        notifier.deliveries()[0].kind,
        NotificationKind::ProjectUpdated
    );
}

#[test]
fn delete_project_maps_missing_documents_to_not_found() {
    let (service, _, _) = build_service(two_level_scheme());
    let result = service.delete_project(&initiator(), &project("ghost", &[]).id);
    assert!(matches!(result, Err(PipelineError::NotFound("project"))));
}

#[test]
fn overview_requires_the_project_to_exist() {
    let (service, _, _) = build_service(two_level_scheme());
    let result = service.overview(&recruiter(), &project("ghost", &[]).id);
    assert!(matches!(result, Err(PipelineError::NotFound("project"))));
}

#[test]
fn overview_aggregates_the_projects_candidates() {
    let (service, store, _) = build_service(two_level_scheme());
    store.seed_project(project("p1", &["Backend Engineer"]));
    let mut selected = candidate("c1", "p1", "Backend Engineer", "L1");
    selected
        .feedback
        .push(feedback("L0", "ok", FeedbackStatus::Passed));
    selected
        .feedback
        .push(feedback("L1", "ok", FeedbackStatus::Passed));
    store.seed_candidate(selected);

    let overview = service
        .overview(&recruiter(), &project("p1", &[]).id)
        .expect("overview loads");
    assert_eq!(overview.per_role_stats[0].selected, 1);
    assert_eq!(overview.level_funnel[1].at_level, 1);
}

#[test]
fn notification_feed_is_newest_first_limited_and_filterable() {
    let (service, store, _) = build_service(two_level_scheme());
    store.seed_notification(notification("n1", "lead-1", true, timestamp(9)));
    store.seed_notification(notification("n2", "lead-1", false, timestamp(10)));
    store.seed_notification(notification("n3", "lead-1", false, timestamp(11)));
    store.seed_notification(notification("n4", "recruiter-1", false, timestamp(12)));

    let feed = service
        .notifications(&lead(), NotificationQuery::default())
        .expect("feed loads");
    let ids: Vec<&str> = feed.iter().map(|n| n.id.0.as_str()).collect();
    assert_eq!(ids, vec!["n3", "n2", "n1"]);

    let unread = service
        .notifications(
            &lead(),
            NotificationQuery {
                limit: Some(1),
                unread_only: true,
            },
        )
        .expect("filtered feed loads");
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].id.0, "n3");
}

#[test]
fn mark_read_is_scoped_to_the_recipient() {
    let (service, store, _) = build_service(two_level_scheme());
    store.seed_notification(notification("n1", "lead-1", false, timestamp(9)));
    let id = notification("n1", "lead-1", false, timestamp(9)).id;

    let result = service.mark_read(&recruiter(), &id);
    assert!(matches!(
        result,
        Err(PipelineError::NotFound("notification"))
    ));

    let marked = service.mark_read(&lead(), &id).expect("own notice marked");
    assert!(marked.read);
    assert_eq!(service.unread_count(&lead()).expect("count loads"), 0);
}

#[test]
fn mark_all_read_clears_the_unread_count() {
    let (service, store, _) = build_service(two_level_scheme());
    store.seed_notification(notification("n1", "lead-1", false, timestamp(9)));
    store.seed_notification(notification("n2", "lead-1", false, timestamp(10)));
    store.seed_notification(notification("n3", "lead-1", true, timestamp(11)));

    assert_eq!(service.unread_count(&lead()).expect("count loads"), 2);
    let updated = service.mark_all_read(&lead()).expect("bulk mark succeeds");
    assert_eq!(updated, 2);
    assert_eq!(service.unread_count(&lead()).expect("count loads"), 0);
}

#[test]
fn system_notice_sweep_covers_deadlines_and_empty_pipelines() {
    let (service, store, _) = build_service(two_level_scheme());
    let today = day(2026, 4, 28);

    // Starts in 3 days: deadline notice at High priority, plus the
    // empty-pipeline reminder because it is active with no candidates.
    let mut urgent = project("p1", &["Backend Engineer"]);
    urgent.start_date = day(2026, 5, 1);
    store.seed_project(urgent);

    // Starts in 5 days but has a candidate: deadline notice at Medium only.
    let mut soon = project("p2", &["Analyst"]);
    soon.start_date = day(2026, 5, 3);
    store.seed_project(soon);
    store.seed_candidate(candidate("c1", "p2", "Analyst", "L0"));

    // Far out and on hold: nothing.
    let mut distant = project("p3", &["Analyst"]);
    distant.start_date = day(2026, 8, 1);
    distant.status = ProjectStatus::Hold;
    store.seed_project(distant);

    let generated = service
        .generate_system_notices(&admin(), today)
        .expect("sweep runs");
    assert_eq!(generated, 3);

    let stored = store.stored_notifications();
    let deadline_priorities: Vec<NotificationPriority> = stored
        .iter()
        .filter(|n| n.kind == NotificationKind::DeadlineApproaching)
        .map(|n| n.priority)
        .collect();
    assert!(deadline_priorities.contains(&NotificationPriority::High));
    assert!(deadline_priorities.contains(&NotificationPriority::Medium));
    assert_eq!(
        stored
            .iter()
            .filter(|n| n.kind == NotificationKind::ProjectUpdated)
            .count(),
        1
    );
}

#[test]
fn system_notice_sweep_is_admin_only() {
    let (service, _, _) = build_service(two_level_scheme());
    let result = service.generate_system_notices(&lead(), day(2026, 4, 28));
    assert!(matches!(result, Err(PipelineError::Forbidden { .. })));
}
