use crate::infra::{InMemoryDocumentStore, LogNotifier, StaticActorDirectory};
use chrono::{Local, NaiveDate};
use clap::Args;
use std::sync::Arc;
use talentflow::config::AuthConfig;
use talentflow::error::AppError;
use talentflow::recruitment::{
    Actor, ActorDirectory, ActorRole, CapabilityTable, FeedbackDraft, LevelScheme, NewCandidate,
    NotificationQuery, OpenRole, PipelineService, ProjectDraft, ProjectType,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Project start date (YYYY-MM-DD). Defaults to today + 5 days.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) start_date: Option<NaiveDate>,
    /// Evaluation date for the deadline sweep (defaults to today).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Skip the admin notification sweep at the end of the demo.
    #[arg(long)]
    pub(crate) skip_sweep: bool,
}

fn demo_actor(id: &str, name: &str, role: ActorRole) -> Actor {
    Actor {
        id: id.to_string(),
        display_name: name.to_string(),
        role,
    }
}

fn demo_role(title: &str, salary: u32, start_date: NaiveDate) -> OpenRole {
    OpenRole {
        title: title.to_string(),
        location: "Berlin".to_string(),
        salary,
        currency: "EUR".to_string(),
        deadline: start_date - chrono::Duration::days(1),
        start_date,
        end_date: start_date + chrono::Duration::days(180),
        job_desc_path: None,
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        start_date,
        today,
        skip_sweep,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let start_date = start_date.unwrap_or(today + chrono::Duration::days(5));

    let initiator = demo_actor("initiator-1", "Isha Initiator", ActorRole::ProjectInitiator);
    let lead = demo_actor("lead-1", "Lee Lead", ActorRole::RecruiterLead);
    let recruiter = demo_actor("recruiter-1", "Riley Recruiter", ActorRole::Recruiter);
    let admin = demo_actor("admin-1", "Avery Admin", ActorRole::Admin);

    let scheme = LevelScheme::new(vec!["L0".to_string(), "L1".to_string(), "L2".to_string()])?;
    let levels: Vec<String> = scheme.levels().to_vec();
    let store = Arc::new(InMemoryDocumentStore::default());
    let service = PipelineService::new(
        store,
        Arc::new(LogNotifier),
        CapabilityTable::standard(),
        scheme,
    );

    println!("Recruitment pipeline demo");
    println!(
        "Interview levels: {} (evaluated {})",
        levels.join(" -> "),
        today
    );

    let commit = service.create_project(
        &initiator,
        ProjectDraft {
            client_name: "Northwind".to_string(),
            project_name: "Platform Buildout".to_string(),
            location: "Berlin".to_string(),
            project_type: ProjectType::Staffing,
            start_date,
            status: None,
            lead: lead.id.clone(),
            roles: vec![
                demo_role("Backend Engineer", 72_000, start_date),
                demo_role("Data Analyst", 58_000, start_date),
            ],
        },
    )?;
    let project = commit.record;
    if let Some(warning) = commit.warning {
        println!("  warning: {warning}");
    }
    println!(
        "\nProject {} created for {} ({} open roles, starts {})",
        project.id.0,
        project.client_name,
        project.roles.len(),
        project.start_date
    );

    let hire = service
        .add_candidate(
            &recruiter,
            NewCandidate {
                project_id: project.id.0.clone(),
                role_title: "Backend Engineer".to_string(),
                name: "Sam Rivera".to_string(),
                email: "sam@example.com".to_string(),
                phone: None,
                resume_path: None,
            },
        )?
        .record;
    let pass_over = service
        .add_candidate(
            &recruiter,
            NewCandidate {
                project_id: project.id.0.clone(),
                role_title: "Data Analyst".to_string(),
                name: "Noa Fischer".to_string(),
                email: "noa@example.com".to_string(),
                phone: None,
                resume_path: None,
            },
        )?
        .record;
    println!(
        "Candidates {} ({}) and {} ({}) entered at {}",
        hire.name, hire.role_title, pass_over.name, pass_over.role_title, hire.interview_level
    );

    println!("\nRunning {} through every level", hire.name);
    for level in &levels {
        service.record_feedback(
            &lead,
            &hire.id,
            FeedbackDraft {
                level: level.clone(),
                comment: format!("Cleared {level} panel"),
                status: "PASSED".to_string(),
            },
        )?;
        service.update_interview_level(&recruiter, &hire.id, level)?;
        println!("  {level}: PASSED");
    }

    service.record_feedback(
        &lead,
        &pass_over.id,
        FeedbackDraft {
            level: levels[0].clone(),
            comment: "Missing core skills".to_string(),
            status: "REJECTED".to_string(),
        },
    )?;
    println!("{} rejected at {}", pass_over.name, levels[0]);

    let overview = service.overview(&lead, &project.id)?;
    println!("\nLevel funnel");
    for entry in &overview.level_funnel {
        println!(
            "- {}: {} passed, {} pending, {} rejected, {} currently here",
            entry.level, entry.passed, entry.pending, entry.rejected, entry.at_level
        );
    }
    println!("Per-role standing");
    for entry in &overview.per_role_stats {
        println!(
            "- {}: {} candidate(s), {} selected, {} rejected",
            entry.role_title, entry.total, entry.selected, entry.rejected
        );
    }

    let dashboard = service.dashboard(&lead, &project.id)?;
    println!(
        "Dashboard: {} candidate(s) total, {} selected",
        dashboard.total_candidates, dashboard.selected
    );

    if !skip_sweep {
        let generated = service.generate_system_notices(&admin, today)?;
        println!("\nAdmin sweep generated {generated} notice(s)");
    }

    let feed = service.notifications(
        &lead,
        NotificationQuery {
            limit: Some(50),
            unread_only: false,
        },
    )?;
    println!("\nLead feed ({} item(s), newest first)", feed.len());
    for notification in &feed {
        println!(
            "- [{}] {}: {}",
            notification.kind.label(),
            notification.title,
            notification.message
        );
    }

    // The serve path resolves tokens the same way; show the mapping once.
    let directory = StaticActorDirectory::from_entries(&AuthConfig::development_tokens());
    if let Some(actor) = directory.resolve("lead-token") {
        println!(
            "\nDevelopment token 'lead-token' resolves to {} ({})",
            actor.display_name,
            actor.role.label()
        );
    }

    Ok(())
}
