use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::wire::WorkoutType;

#[derive(ValueEnum, Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[value(alias = "open-ai", alias = "openai")]
    OpenAI,
    #[value(alias = "ollama")]
    Ollama,
}

#[derive(Parser, Debug)]
#[command(name = "gym-coach", version, about = "AI gym coach: generate a day-by-day workout plan")]
pub struct Args {
    /// Target muscle group (repeat for several).
    #[arg(long = "muscle", required = true)]
    pub muscles: Vec<String>,

    /// Fitness goal (repeat for several).
    #[arg(long = "goal", required = true)]
    pub goals: Vec<String>,

    #[arg(long, value_enum, default_value_t = WorkoutType::Gym)]
    pub workout_type: WorkoutType,

    #[arg(long, default_value_t = 3)]
    pub days: u8,

    /// Photo of the available equipment.
    #[arg(long)]
    pub photo: Option<String>,

    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Exercise database (JSON) used to steer and annotate the plan.
    #[arg(long)]
    pub catalog: Option<String>,

    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, default_value_t = false)]
    pub debug: bool,

    /// Hide the spinner while waiting on the model.
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}
