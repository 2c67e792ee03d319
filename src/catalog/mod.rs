use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::{CoachError, CoachResult};

/// One entry of the exercise database (free-exercise-db layout).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogExercise {
    pub name: String,
    #[serde(default)]
    pub force: Option<String>,
    pub level: String,
    #[serde(default)]
    pub mechanic: Option<String>,
    #[serde(default)]
    pub equipment: Option<String>,
    #[serde(default)]
    pub primary_muscles: Vec<String>,
    #[serde(default)]
    pub secondary_muscles: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    pub category: String,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    exercises: Vec<CatalogExercise>,
}

#[derive(Debug, Clone, Default)]
pub struct ExerciseCatalog {
    exercises: Vec<CatalogExercise>,
}

impl ExerciseCatalog {
    pub fn new(exercises: Vec<CatalogExercise>) -> Self {
        Self { exercises }
    }

    pub fn load(path: &Path) -> CoachResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| CoachError::Config(e.to_string()))?;
        Self::from_json(&text)
            .map_err(|e| CoachError::Config(format!("catalog {}: {e}", path.display())))
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let file: CatalogFile = serde_json::from_str(text)?;
        Ok(Self::new(file.exercises))
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn by_name(&self, name: &str) -> Option<&CatalogExercise> {
        let wanted = name.trim().to_lowercase();
        self.exercises.iter().find(|e| e.name.to_lowercase() == wanted)
    }

    /// Exercises that train `muscle` as a primary or secondary target.
    pub fn by_muscle_group(&self, muscle: &str) -> Vec<&CatalogExercise> {
        let wanted = muscle.trim().to_lowercase();
        self.exercises
            .iter()
            .filter(|e| {
                e.primary_muscles.iter().any(|m| m.to_lowercase() == wanted)
                    || e.secondary_muscles.iter().any(|m| m.to_lowercase() == wanted)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
      "exercises": [
        {"name": "Barbell Bench Press", "force": "push", "level": "beginner", "mechanic": "compound",
         "equipment": "barbell", "primaryMuscles": ["chest"], "secondaryMuscles": ["triceps", "shoulders"],
         "instructions": ["Lie on the bench.", "Press the bar."], "category": "strength"},
        {"name": "Plank", "force": "static", "level": "beginner", "mechanic": null,
         "equipment": "body only", "primaryMuscles": ["abdominals"], "secondaryMuscles": [],
         "instructions": ["Hold a straight line."], "category": "strength"}
      ]
    }"#;

    #[test]
    fn lookup_by_name_ignores_case() {
        let cat = ExerciseCatalog::from_json(SAMPLE).unwrap();
        assert_eq!(cat.len(), 2);
        let e = cat.by_name("barbell bench PRESS").unwrap();
        assert_eq!(e.equipment.as_deref(), Some("barbell"));
        assert!(cat.by_name("Deadlift").is_none());
    }

    #[test]
    fn lookup_by_muscle_matches_secondary_targets() {
        let cat = ExerciseCatalog::from_json(SAMPLE).unwrap();
        let shoulders = cat.by_muscle_group("Shoulders");
        assert_eq!(shoulders.len(), 1);
        assert_eq!(shoulders[0].name, "Barbell Bench Press");
        assert!(cat.by_muscle_group("glutes").is_empty());
    }

    #[test]
    fn load_reads_file_and_reports_bad_json() {
        let mut good = tempfile::NamedTempFile::new().unwrap();
        good.write_all(SAMPLE.as_bytes()).unwrap();
        assert_eq!(ExerciseCatalog::load(good.path()).unwrap().len(), 2);

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        bad.write_all(b"{\"exercises\": 3}").unwrap();
        let err = ExerciseCatalog::load(bad.path()).unwrap_err();
        assert!(matches!(err, CoachError::Config(_)));
    }
}
