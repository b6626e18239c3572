use anyhow::Result;
use labcal_core::Labcal;
use labcal_core::schedule::PriorityCalendar;
use labcal_core::sync::ScheduleDiff;
use owo_colors::OwoColorize;

use crate::render;
use crate::utils::tui;

pub async fn run(rebuild: bool, verbose: bool) -> Result<()> {
    let labcal = Labcal::load()?;
    let calendar = labcal.load_calendar()?;
    push(&labcal, &calendar, rebuild, verbose).await
}

/// Push after add/delete, skipping quietly when no remote is set up.
pub async fn push_if_configured(
    labcal: &Labcal,
    calendar: &PriorityCalendar,
    verbose: bool,
) -> Result<()> {
    if labcal.config().remote.is_none() {
        println!("{}", "No remote configured, skipping sync".dimmed());
        return Ok(());
    }
    push(labcal, calendar, false, verbose).await
}

async fn push(
    labcal: &Labcal,
    calendar: &PriorityCalendar,
    rebuild: bool,
    verbose: bool,
) -> Result<()> {
    let remote = labcal.remote()?;
    let mut state = labcal.sync_state()?;

    let diff = if rebuild {
        ScheduleDiff::rebuild(calendar, &state, labcal.grid(), labcal.event_template())?
    } else {
        ScheduleDiff::compute(calendar, &state, labcal.grid(), labcal.event_template())?
    };

    println!("📅 {}", remote.provider.name());
    println!("{}", render::render_diff(&diff, verbose));

    if diff.is_empty() {
        return Ok(());
    }

    let progress = tui::create_progress_bar(diff.diffs.len() as u64, "   Pushing".to_string());
    let result = diff
        .apply(remote, &mut state, |_| progress.inc(1))
        .await;
    progress.finish_and_clear();

    if let Err(e) = result {
        println!("   {}", e.to_string().red());
        println!(
            "{}",
            "   Completed changes were saved; run `labcal sync` to retry the rest".dimmed()
        );
        return Err(e.into());
    }

    let (created, deleted) = diff.counts();
    println!("\nPushed: {} created, {} deleted", created, deleted);

    Ok(())
}
