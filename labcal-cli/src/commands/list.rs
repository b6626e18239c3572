use anyhow::Result;
use labcal_core::Labcal;
use owo_colors::OwoColorize;

use crate::render;

pub fn run(verbose: bool) -> Result<()> {
    let labcal = Labcal::load()?;
    let calendar = labcal.load_calendar()?;

    if calendar.is_empty() {
        println!("{}", "No experiments scheduled".dimmed());
        println!(
            "{}",
            format!("Data directory: {}", labcal.display_path().display()).dimmed()
        );
        return Ok(());
    }

    for (rank, experiment) in calendar.experiments().iter().enumerate() {
        println!(
            "{}",
            render::render_experiment(rank, experiment, labcal.grid(), verbose)
        );
    }

    Ok(())
}
