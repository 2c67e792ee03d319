use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::errors::{CoachError, CoachResult};

// ========================================
// Submission / plan data model
// ========================================

pub const MIN_TRAINING_DAYS: u8 = 1;
pub const MAX_TRAINING_DAYS: u8 = 7;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutType {
    Gym,
    Home,
    Bodyweight,
    Outdoor,
}

impl WorkoutType {
    pub fn label(&self) -> &'static str {
        match self {
            WorkoutType::Gym => "Gym",
            WorkoutType::Home => "Home",
            WorkoutType::Bodyweight => "Bodyweight",
            WorkoutType::Outdoor => "Outdoor",
        }
    }
}

/// A photo of the user's equipment, held fully in memory.
#[derive(Clone, PartialEq, Eq)]
pub struct EquipmentPhoto {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for EquipmentPhoto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EquipmentPhoto")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct UserSelection {
    pub muscle_groups: BTreeSet<String>,
    pub goals: BTreeSet<String>,
    pub workout_type: WorkoutType,
    pub training_days: u8,
    pub equipment_photo: Option<EquipmentPhoto>,
}

impl UserSelection {
    /// Reject submissions the exchange cannot turn into a meaningful prompt.
    pub fn validate(&self) -> CoachResult<()> {
        if self.muscle_groups.is_empty() {
            return Err(CoachError::InvalidSelection(
                "choose at least one muscle group".into(),
            ));
        }
        if self.goals.is_empty() {
            return Err(CoachError::InvalidSelection("choose at least one goal".into()));
        }
        if self.muscle_groups.iter().chain(self.goals.iter()).any(|s| s.trim().is_empty()) {
            return Err(CoachError::InvalidSelection(
                "muscle groups and goals must not be blank".into(),
            ));
        }
        if !(MIN_TRAINING_DAYS..=MAX_TRAINING_DAYS).contains(&self.training_days) {
            return Err(CoachError::InvalidSelection(format!(
                "training days must be between {MIN_TRAINING_DAYS} and {MAX_TRAINING_DAYS}, got {}",
                self.training_days
            )));
        }
        Ok(())
    }
}

/// Image data inlined into the request as base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineImage {
    pub mime_type: String,
    pub base64: String,
}

impl InlineImage {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }
}

/// Everything a provider needs to ask the model for a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptPayload {
    pub system: String,
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<InlineImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    pub sets: u32,
    pub reps: String,
    pub instructions: String,
}

/// Day-indexed plan; serialized as `{"days": {"1": [...], "2": [...]}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub days: BTreeMap<u8, Vec<Exercise>>,
}

impl WorkoutPlan {
    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    pub fn exercise_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }
}
