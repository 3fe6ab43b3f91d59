use crate::infra::{
    start_of_day, InMemoryDashboard, InMemoryEscrow, InMemoryFileStorage, InMemorySavedSearches,
    InMemorySubmitter, ScriptedMailbox,
};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Args;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use waqti::access::{AccessPolicy, CurrentUser, PendingNavigation};
use waqti::error::AppError;
use waqti::workflows::admin::AdminDashboardService;
use waqti::workflows::escrow::{EscrowFilter, EscrowService};
use waqti::workflows::onboarding::{
    EmailVerification, OnboardingError, Role, RoleSelection, Walkthrough, WalkthroughState,
};
use waqti::workflows::saved_searches::SavedSearchService;
use waqti::workflows::verification::{
    AccountPatch, AdmissionPatch, AnswerValue, GalleryPatch, NavigationOutcome, PortfolioPatch,
    ProfilePatch, StepPatch, UserId, VerificationService, VerificationServiceError, WizardView,
    ADMISSION_QUESTIONS,
};

const DEMO_INTRODUCTION: &str =
    "I design clear product interfaces and have shipped dashboards for regional startups.";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reporting date for the dashboard and escrow sections (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Answer every admission question correctly instead of missing the first one.
    #[arg(long)]
    pub(crate) perfect_score: bool,
    /// Skip the admin dashboard and escrow portion of the demo.
    #[arg(long)]
    pub(crate) skip_admin: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let now = args.today.map(start_of_day).unwrap_or_else(Utc::now);
    let policy = AccessPolicy::default();
    let freelancer = CurrentUser {
        id: "user-42".to_string(),
        name: "Ahmad Dev".to_string(),
        email: "ahmad@example.com".to_string(),
    };

    println!("Waqti marketplace demo");
    run_onboarding(&freelancer);

    match run_verification(&freelancer, &policy, args.perfect_score) {
        Ok(view) => render_verification(&view),
        Err(error) => println!("Verification failed: {error}"),
    }

    if !args.skip_admin {
        run_admin(&policy, now)?;
    }

    run_saved_searches(&freelancer, &policy, now);
    Ok(())
}

fn run_onboarding(user: &CurrentUser) {
    let mut walkthrough = Walkthrough::new();
    println!("\nWelcome walkthrough");
    loop {
        let progress = walkthrough.progress();
        let slide = walkthrough.slide();
        println!("- {} ({}%): {} / {}", progress.label, progress.percent, slide.title, slide.title_ar);
        if walkthrough.next() == WalkthroughState::Completed {
            break;
        }
    }

    let navigation = Arc::new(PendingNavigation::default());
    let mut roles = RoleSelection::new(navigation.clone());
    if let Err(OnboardingError::NoRoleSelected) = roles.continue_with_selection() {
        println!("Role selection refused until a role is chosen");
    }
    roles.select(Role::Freelancer);
    match roles.continue_with_selection() {
        Ok(page) => println!("Role freelancer -> {}", page.name()),
        Err(error) => println!("Role selection failed: {error}"),
    }

    let mailbox = Arc::new(ScriptedMailbox::new(1));
    let mut email = EmailVerification::new(user.email.clone(), mailbox.clone(), navigation.clone());
    if let Err(error) = email.resend() {
        println!("Resend failed: {error}");
    }
    if let Err(error) = email.resend() {
        println!("Second resend refused: {error}");
    }
    for _ in 0..5 {
        email.tick();
    }
    let mut confirmed = false;
    for _ in 0..2 {
        match email.check() {
            Ok(verified) => confirmed = verified,
            Err(error) => println!("Verification check failed: {error}"),
        }
    }
    println!(
        "Email {} confirmed: {} | mails sent: {} | cooldown left: {} | next page: {}",
        user.email,
        confirmed,
        mailbox.sent(),
        email.cooldown(),
        navigation.take().map(|page| page.name()).unwrap_or("none"),
    );
}

fn answer_for(index: usize, miss: bool) -> AnswerValue {
    let question = &ADMISSION_QUESTIONS[index];
    let correct = question.correct_options();
    if question.is_multiple_choice() {
        return AnswerValue::Multiple(
            correct
                .iter()
                .map(|option| option.to_string())
                .collect::<BTreeSet<_>>(),
        );
    }
    let chosen = if miss {
        question
            .options
            .iter()
            .find(|option| !correct.contains(option))
            .copied()
            .unwrap_or(correct[0])
    } else {
        correct[0]
    };
    AnswerValue::Single(chosen.to_string())
}

fn demo_answers(perfect: bool) -> BTreeMap<String, AnswerValue> {
    ADMISSION_QUESTIONS
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let miss = !perfect && index == 0;
            (question.id.to_string(), answer_for(index, miss))
        })
        .collect()
}

fn run_verification(
    user: &CurrentUser,
    policy: &AccessPolicy,
    perfect_score: bool,
) -> Result<WizardView, VerificationServiceError> {
    let storage = Arc::new(InMemoryFileStorage::default());
    let submitter = Arc::new(InMemorySubmitter::default());
    let service = VerificationService::new(submitter.clone(), storage.clone(), policy.clone());
    let user_id = UserId(user.id.clone());

    println!("\nFreelancer verification");
    service.open(user)?;

    let blocked = service.advance(&user_id)?;
    if blocked.navigation == Some(NavigationOutcome::Blocked) {
        println!("- Step 1 blocked until terms and privacy are accepted");
    }

    service.update(
        &user_id,
        StepPatch::AccountData(AccountPatch {
            terms_accepted: Some(true),
            privacy_accepted: Some(true),
            ..AccountPatch::default()
        }),
    )?;
    report_step(&service.advance(&user_id)?);

    service.update(
        &user_id,
        StepPatch::Profile(ProfilePatch {
            job_title: Some("Designer".to_string()),
            specialization: Some("UI/UX Design".to_string()),
            introduction: Some(DEMO_INTRODUCTION.to_string()),
            skills: Some(vec![
                "Figma".to_string(),
                "Sketch".to_string(),
                "CSS".to_string(),
            ]),
            ..ProfilePatch::default()
        }),
    )?;
    report_step(&service.advance(&user_id)?);

    service.update(
        &user_id,
        StepPatch::BusinessGallery(GalleryPatch {
            portfolio: vec![PortfolioPatch {
                slot: 0,
                title: Some("Banking dashboard".to_string()),
                description: Some("Redesigned the retail banking dashboard".to_string()),
                ..PortfolioPatch::default()
            }],
            testimonials: None,
        }),
    )?;
    service.attach_thumbnail(
        &user_id,
        0,
        "dashboard.png",
        mime::IMAGE_PNG,
        vec![0x89, 0x50, 0x4e, 0x47],
    )?;
    report_step(&service.advance(&user_id)?);

    service.update(
        &user_id,
        StepPatch::AdmissionTest(AdmissionPatch {
            answers: demo_answers(perfect_score),
        }),
    )?;
    let scored = service.complete_admission(&user_id)?;
    if let Some(score) = scored.record.steps.admission_test.score {
        println!("- Admission score {score} ({:?})", scored.verdict);
    }

    let submitted = service.advance(&user_id)?;
    println!(
        "- Stored {} file(s), {} submission(s) recorded",
        storage.files().len(),
        submitter.submissions().len()
    );
    Ok(submitted)
}

fn report_step(view: &WizardView) {
    match &view.navigation {
        Some(NavigationOutcome::Moved { step }) => {
            println!("- Moved to step {} ({})", step.number(), step.label())
        }
        Some(NavigationOutcome::Blocked) => println!("- Blocked: {:?}", view.gate),
        other => println!("- {other:?}"),
    }
}

fn render_verification(view: &WizardView) {
    match &view.navigation {
        Some(NavigationOutcome::Submitted { receipt }) => println!(
            "Submitted verification {} at {} | status {} | next page {}",
            receipt.verification_id,
            receipt.submitted_at.to_rfc3339(),
            view.record.status.label(),
            view.redirect.map(|page| page.name()).unwrap_or("none"),
        ),
        _ => println!(
            "Verification not submitted: {}",
            view.error.as_deref().unwrap_or("gate still closed")
        ),
    }
}

fn run_admin(policy: &AccessPolicy, now: DateTime<Utc>) -> Result<(), AppError> {
    let dashboard = AdminDashboardService::new(
        Arc::new(InMemoryDashboard::seeded(now)),
        policy.clone(),
    );
    let snapshot = dashboard.load(now);
    let stats = &snapshot.stats;
    println!("\nAdmin dashboard");
    println!(
        "- {} users ({} active in 30 days) | {} services | {} bookings | revenue {:.0}",
        stats.total_users,
        stats.active_users,
        stats.total_services,
        stats.total_bookings,
        stats.total_revenue
    );
    println!(
        "- {} pending verifications | {} open disputes | monthly growth {:.1}%",
        stats.pending_verifications, stats.open_disputes, stats.monthly_growth
    );
    for activity in snapshot.recent_activity.iter().take(3) {
        println!("  - {} ({})", activity.description, activity.timestamp.date_naive());
    }

    let escrow = EscrowService::new(Arc::new(InMemoryEscrow::seeded()?), policy.clone());
    match escrow.listing(&EscrowFilter::default(), now) {
        Ok(listing) => {
            println!("\nEscrow oversight");
            println!(
                "- {} held ({} hours, {} AED) | {} disputed",
                listing.summary.held_count,
                listing.summary.held_hours,
                listing.summary.held_aed,
                listing.summary.disputed_count
            );
            for row in &listing.items {
                let release = row
                    .days_until_auto_release
                    .map(|days| format!(", auto-release in {days} day(s)"))
                    .unwrap_or_default();
                println!(
                    "  - {} {} | {} | {}{}",
                    row.item.id, row.item.project_title, row.amount_display, row.status_label, release
                );
            }
        }
        Err(error) => println!("Escrow listing failed: {error}"),
    }
    match escrow.release("esc1") {
        Ok(item) => println!("- Released {} to {}", item.amount_display(), item.freelancer_name),
        Err(error) => println!("- Release failed: {error}"),
    }
    if let Err(error) = escrow.refund("esc1") {
        println!("- Second action refused: {error}");
    }
    Ok(())
}

fn run_saved_searches(user: &CurrentUser, policy: &AccessPolicy, now: DateTime<Utc>) {
    let service = SavedSearchService::new(
        Arc::new(InMemorySavedSearches::seeded(&user.id, now)),
        policy.clone(),
    );
    println!("\nSaved searches");
    match service.stats(user) {
        Ok(stats) => println!(
            "- {} searches | {} with notifications | {} total results",
            stats.total, stats.with_notifications, stats.total_results
        ),
        Err(error) => println!("- Stats failed: {error}"),
    }
    match service.run(user, "saved-design", now) {
        Ok(run) => println!("- Ran '{}' -> {} page", run.search.name, run.page.name()),
        Err(error) => println!("- Run failed: {error}"),
    }
}
