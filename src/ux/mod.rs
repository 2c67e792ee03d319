use colored::Colorize;
use std::fmt::Write as _;

use crate::catalog::ExerciseCatalog;
use crate::errors::CoachError;
use crate::wire::{Exercise, WorkoutPlan};

pub fn show_plan(plan: &WorkoutPlan, catalog: Option<&ExerciseCatalog>) {
    print!("{}", render_plan(plan, catalog));
}

pub fn show_failure(err: &CoachError) {
    eprintln!("\n{} {}", "✗".red().bold(), err.user_message().red());
}

/// Render every day as its own page, in day order.
pub fn render_plan(plan: &WorkoutPlan, catalog: Option<&ExerciseCatalog>) -> String {
    let mut out = String::new();
    let total = plan.day_count();
    let _ = writeln!(out, "\n{}", "=== WORKOUT PLAN ===".bold());
    for (page, (day, exercises)) in plan.days.iter().enumerate() {
        let _ = writeln!(
            out,
            "\n{}  {}",
            format!("Day {day}").cyan().bold(),
            format!("({} of {total})", page + 1).dimmed()
        );
        if exercises.is_empty() {
            let _ = writeln!(out, "  (no exercises for this day)");
            continue;
        }
        for (i, ex) in exercises.iter().enumerate() {
            render_exercise(&mut out, i + 1, ex, catalog);
        }
    }
    out.push('\n');
    out
}

fn render_exercise(out: &mut String, n: usize, ex: &Exercise, catalog: Option<&ExerciseCatalog>) {
    let _ = writeln!(
        out,
        "  {}. {}  {}",
        n,
        ex.name.bold(),
        format!("{} x {}", ex.sets, ex.reps).green()
    );
    if let Some(entry) = catalog.and_then(|c| c.by_name(&ex.name)) {
        let equipment = entry.equipment.as_deref().unwrap_or("none");
        let _ = writeln!(out, "     {}", format!("{} · {}", entry.level, equipment).dimmed());
    }
    if !ex.instructions.trim().is_empty() {
        let _ = writeln!(out, "     {}", ex.instructions.trim());
    }
}
