//! Terminal rendering for labcal types.
//!
//! Extension traits that add colored output to labcal-core types using
//! owo_colors.

use chrono::NaiveDate;
use labcal_core::DayGrid;
use labcal_core::experiment::Experiment;
use labcal_core::schedule::InsertOutcome;
use labcal_core::sync::{DiffKind, EventDiff, ScheduleDiff};
use owo_colors::OwoColorize;

use crate::commands::DATE_FORMAT;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for DiffKind {
    fn render(&self) -> String {
        colorize_diff(*self, self.symbol())
    }
}

fn colorize_diff(kind: DiffKind, text: &str) -> String {
    match kind {
        DiffKind::Create => text.green().to_string(),
        DiffKind::Delete => text.red().to_string(),
    }
}

impl Render for EventDiff {
    fn render(&self) -> String {
        let summary = colorize_diff(self.kind(), self.label());
        format!(
            "{} {} {}",
            self.kind().render(),
            summary,
            render_date(self.date()).dimmed()
        )
    }
}

pub fn render_date(date: NaiveDate) -> String {
    date.format(&format!("%a {DATE_FORMAT}")).to_string()
}

/// Threshold for compact view (show counts instead of individual events)
const COMPACT_THRESHOLD: usize = 5;

pub fn render_diff(diff: &ScheduleDiff, verbose: bool) -> String {
    if diff.is_empty() {
        return "   No changes".dimmed().to_string();
    }

    let mut lines = Vec::new();

    if verbose || diff.diffs.len() <= COMPACT_THRESHOLD {
        for event_diff in &diff.diffs {
            lines.push(format!("   {}", event_diff.render()));
        }
    } else {
        let (creates, deletes) = diff.counts();

        if creates > 0 {
            let label = format!("({} new {})", creates, pluralize("event", creates));
            lines.push(format!("   {} {}", "+".green(), label.green()));
        }
        if deletes > 0 {
            let label = format!("({} deleted {})", deletes, pluralize("event", deletes));
            lines.push(format!("   {} {}", "-".red(), label.red()));
        }
    }

    lines.join("\n")
}

pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

/// One experiment line in priority order, with its dates when verbose.
pub fn render_experiment(
    rank: usize,
    experiment: &Experiment,
    grid: &DayGrid,
    verbose: bool,
) -> String {
    let days = experiment.active_days();
    let span = match (days.first(), days.last()) {
        (Some(&first), Some(&last)) => format!(
            "{} → {}",
            render_date(grid.date_of(first)),
            render_date(grid.date_of(last))
        ),
        _ => "no days".to_string(),
    };

    let mut line = format!(
        "{:>3}. {} {} {}",
        rank + 1,
        experiment.label().bold(),
        format!("({} {})", days.len(), pluralize("day", days.len())).dimmed(),
        span.dimmed()
    );

    if verbose {
        for day in days {
            line.push_str(&format!("\n       {}", render_date(grid.date_of(day))));
        }
    }

    line
}

pub fn render_outcome(label: &str, outcome: &InsertOutcome) -> String {
    let moved: Vec<&str> = outcome
        .displaced
        .iter()
        .map(String::as_str)
        .filter(|l| *l != label)
        .collect();

    if moved.is_empty() {
        return "  No collisions".dimmed().to_string();
    }

    format!(
        "  {} {} in {} {}: {}",
        "Moved".yellow(),
        pluralize("experiment", moved.len()),
        outcome.steps,
        pluralize("step", outcome.steps as usize),
        moved.join(", ")
    )
}
