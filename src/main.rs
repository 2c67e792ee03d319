use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use gym_coach::catalog::ExerciseCatalog;
use gym_coach::cli::Args;
use gym_coach::config::Config;
use gym_coach::plan::{GenerationOptions, PlanGenerator};
use gym_coach::wire::{UserSelection, WorkoutPlan};
use gym_coach::{context, provider, ux, CoachResult};

fn init_logging(debug: bool) {
    let default = if debug { "gym_coach=debug,info" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut cfg = match &args.config {
        Some(path) => Config::load(Path::new(path))
            .with_context(|| format!("loading config from {path}"))?,
        None => Config::default(),
    };
    if let Some(p) = args.provider {
        cfg.provider = p;
    }
    if let Some(m) = &args.model {
        cfg.model = m.clone();
    }
    if let Some(t) = args.timeout_secs {
        cfg.timeout_secs = t;
    }
    if let Some(c) = &args.catalog {
        cfg.catalog_path = Some(c.clone());
    }
    Ok(cfg)
}

fn spinner(enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner} {msg} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Asking the coach for your plan");
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Print the outcome of one exchange and map it to the process status.
fn report(result: CoachResult<WorkoutPlan>, catalog: Option<&ExerciseCatalog>) -> ExitCode {
    match result {
        Ok(plan) => {
            ux::show_plan(&plan, catalog);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!(error = %e, "plan generation failed");
            ux::show_failure(&e);
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.debug);

    let cfg = load_config(&args)?;

    let catalog = match &cfg.catalog_path {
        Some(path) => Some(
            ExerciseCatalog::load(Path::new(path))
                .with_context(|| format!("loading exercise catalog from {path}"))?,
        ),
        None => None,
    };

    let equipment_photo = match &args.photo {
        Some(path) => Some(
            context::load_photo(Path::new(path))
                .with_context(|| format!("loading equipment photo {path}"))?,
        ),
        None => None,
    };

    let selection = UserSelection {
        muscle_groups: args.muscles.iter().map(|m| m.trim().to_string()).collect(),
        goals: args.goals.iter().map(|g| g.trim().to_string()).collect(),
        workout_type: args.workout_type,
        training_days: args.days,
        equipment_photo,
    };

    let prov = provider::make_provider(&cfg).context("configuring model provider")?;
    let mut generator = PlanGenerator::new(prov, GenerationOptions::from_config(&cfg));
    if let Some(catalog) = catalog {
        generator = generator.with_catalog(catalog);
    }

    // Ctrl-C cancels the in-flight request.
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let pb = spinner(!args.no_progress);
    let result = generator.generate_with_cancel(&selection, cancel).await;
    pb.finish_and_clear();

    Ok(report(result, generator.catalog()))
}
