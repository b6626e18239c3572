use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use dialoguer::{Confirm, Input};
use labcal_core::error::StartDayError;
use labcal_core::schedule::PriorityCalendar;
use labcal_core::{CadenceSpec, Day, DayGrid, LabCalError, Labcal, MonthlyMode};
use owo_colors::OwoColorize;
use tracing::debug;

use crate::commands::{DATE_FORMAT, sync};
use crate::render;
use crate::utils::tui;

pub struct AddArgs {
    pub label: Option<String>,
    pub days: Option<usize>,
    pub weeks: Option<usize>,
    pub months: Option<String>,
    pub start: Option<String>,
    pub once: bool,
    pub no_sync: bool,
}

impl AddArgs {
    fn has_cadence(&self) -> bool {
        self.once || self.days.is_some() || self.weeks.is_some() || self.months.is_some()
    }
}

pub async fn run(args: AddArgs, verbose: bool) -> Result<()> {
    let labcal = Labcal::load()?;
    let mut calendar = labcal.load_calendar()?;
    let grid = labcal.grid();
    let today = labcal.today();

    let interactive = args.label.is_none() || !args.has_cadence() || args.start.is_none();

    // --- Label ---
    let label = match args.label.clone() {
        Some(l) => {
            calendar.ensure_label_available(&l)?;
            l
        }
        None => prompt_label(&calendar)?,
    };

    // --- Cadence ---
    let mut cadence = if args.once {
        CadenceSpec::one_off()
    } else if args.has_cadence() {
        let monthly = parse_months(args.months.as_deref().unwrap_or(""))?;
        CadenceSpec::new(args.days.unwrap_or(0), args.weeks.unwrap_or(0), monthly)
    } else {
        prompt_cadence()?
    };

    // --- Start ---
    let start_day = match args.start.as_deref() {
        Some(s) => {
            let date = parse_start_date(s, today)?;
            validate_start(grid, date, today)?
        }
        None => prompt_start(grid, today)?,
    };

    // --- Schedule ---
    let outcome = loop {
        debug!(label = %label, ?cadence, start_day, "scheduling experiment");
        let spinner = tui::create_spinner("  Resolving collisions".to_string());
        let result = calendar.schedule(&label, &cadence, start_day);
        spinner.finish_and_clear();

        match result {
            Err(e @ LabCalError::InvalidCadence(_)) if interactive => {
                eprintln!("  {}", e.to_string().red());
                cadence = prompt_cadence()?;
            }
            other => break other?,
        }
    };

    labcal.save_calendar(&calendar)?;

    if interactive {
        println!();
    }
    println!("{}", format!("  Scheduled: {}", label).green());
    if let Some(experiment) = calendar.get(&label) {
        println!("{}", render::render_experiment(0, experiment, grid, verbose));
    }
    println!("{}", render::render_outcome(&label, &outcome));

    if !args.no_sync {
        println!();
        sync::push_if_configured(&labcal, &calendar, verbose).await?;
    }

    Ok(())
}

fn prompt_label(calendar: &PriorityCalendar) -> Result<String> {
    prompt_with_retry("  Experiment label", |input| {
        let label = input.trim();
        if label.is_empty() {
            anyhow::bail!("Label cannot be empty");
        }
        calendar.ensure_label_available(label)?;
        Ok(label.to_string())
    })
}

fn prompt_cadence() -> Result<CadenceSpec> {
    let once = Confirm::new()
        .with_prompt("  One-off experiment?")
        .default(false)
        .interact()?;

    if once {
        return Ok(CadenceSpec::one_off());
    }

    let days = prompt_optional("  Daily measurements for how many days? (0)", parse_count)?;
    let weeks = prompt_optional("  Then weekly for how many weeks? (0)", parse_count)?;
    let monthly = prompt_optional(
        "  Then monthly for how many months? (number, \"end\", or skip)",
        parse_months,
    )?;

    Ok(CadenceSpec::new(days, weeks, monthly))
}

fn prompt_start(grid: &DayGrid, today: NaiveDate) -> Result<Day> {
    loop {
        let date = prompt_optional(
            &format!("  Start date? ({})", today.format(DATE_FORMAT)),
            |input| parse_start_date(input, today),
        )?;

        let day = match validate_start(grid, date, today) {
            Ok(day) => day,
            Err(e) => {
                eprintln!("  {}", e.to_string().red());
                continue;
            }
        };

        let confirmed = Confirm::new()
            .with_prompt(format!("  Start on {}?", render::render_date(date)))
            .default(true)
            .interact()?;

        if confirmed {
            return Ok(day);
        }
    }
}

/// Prompt the user with retry on parse errors.
fn prompt_with_retry<T, F>(prompt: &str, parse: F) -> Result<T>
where
    F: Fn(&str) -> Result<T>,
{
    loop {
        let input: String = Input::new().with_prompt(prompt).interact_text()?;
        match parse(&input) {
            Ok(result) => return Ok(result),
            Err(e) => {
                eprintln!("  {}", e.to_string().red());
            }
        }
    }
}

/// Like `prompt_with_retry`, but an empty answer is passed to `parse`.
fn prompt_optional<T, F>(prompt: &str, parse: F) -> Result<T>
where
    F: Fn(&str) -> Result<T>,
{
    loop {
        let input: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        match parse(&input) {
            Ok(result) => return Ok(result),
            Err(e) => {
                eprintln!("  {}", e.to_string().red());
            }
        }
    }
}

fn validate_start(grid: &DayGrid, date: NaiveDate, today: NaiveDate) -> Result<Day> {
    grid.validate_start(date, today).map_err(|e| match e {
        LabCalError::InvalidStartDay(StartDayError::OutsideGrid(_)) => anyhow::anyhow!(
            "{}. The scheduling year starts on {}; change `epoch` in the config to move it",
            e,
            grid.epoch().format(DATE_FORMAT)
        ),
        other => other.into(),
    })
}

/// Blank means zero.
fn parse_count(input: &str) -> Result<usize> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(0);
    }
    input
        .parse()
        .with_context(|| format!("Expected a whole number, got \"{}\"", input))
}

fn parse_months(input: &str) -> Result<MonthlyMode> {
    Ok(MonthlyMode::from_str(input)?)
}

/// dd/mm/yy, or today when blank.
fn parse_start_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(today);
    }
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .with_context(|| format!("Could not parse date \"{}\", expected dd/mm/yy", input))
}
