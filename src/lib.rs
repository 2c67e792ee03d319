pub mod catalog;
pub mod cli;
pub mod config;
pub mod context;
pub mod errors;
pub mod plan;
pub mod prompt;
pub mod provider;
pub mod ux;
pub mod wire;

pub use errors::{CoachError, CoachResult};
pub use plan::{GenerationOptions, PlanGenerator};
pub use wire::{Exercise, UserSelection, WorkoutPlan, WorkoutType};
