use anyhow::Result;
use dialoguer::{Confirm, Select};
use labcal_core::Labcal;
use owo_colors::OwoColorize;

use crate::commands::sync;
use crate::render;

pub async fn run(label: Option<String>, force: bool, no_sync: bool, verbose: bool) -> Result<()> {
    let labcal = Labcal::load()?;
    let mut calendar = labcal.load_calendar()?;

    if calendar.is_empty() {
        println!("{}", "No experiments scheduled".dimmed());
        return Ok(());
    }

    let label = match label {
        Some(l) => l,
        None => {
            let items: Vec<&str> = calendar.labels().collect();
            let selection = Select::new()
                .with_prompt("  Experiment")
                .items(&items)
                .default(0)
                .interact()?;
            items[selection].to_string()
        }
    };

    let Some(experiment) = calendar.get(&label) else {
        anyhow::bail!(
            "Experiment '{}' not found. Scheduled: {}",
            label,
            calendar.labels().collect::<Vec<_>>().join(", ")
        );
    };

    if !force {
        let days = experiment.active_days().len();
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete '{}' and its {} {}?",
                label,
                days,
                render::pluralize("measurement", days)
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            return Ok(());
        }
    }

    calendar.delete(&label)?;
    labcal.save_calendar(&calendar)?;
    println!("{}", format!("  Deleted: {}", label).green());

    if !no_sync {
        println!();
        sync::push_if_configured(&labcal, &calendar, verbose).await?;
    }

    Ok(())
}
