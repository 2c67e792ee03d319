use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::catalog::ExerciseCatalog;
use crate::wire::{InlineImage, PromptPayload, UserSelection};

/// Catalog names offered to the model per muscle group.
const CATALOG_HINT_PER_MUSCLE: usize = 12;

pub fn system_prompt() -> String {
    r#"You are a knowledgeable fitness coach.
Design safe, effective workout plans tailored to the user's target muscle groups, goals, workout setting and available equipment.
When the user attaches a photo of their equipment, only program exercises that can be done with what is shown.

Return EXACTLY ONE JSON object (no markdown, no prose, no code fences)."#
        .to_string()
}

fn plan_schema() -> &'static str {
r#"{
  "days": {
    "1": [
      {"name": "Exercise Name", "sets": 3, "reps": "8-10", "instructions": "Brief instructions"}
    ]
  }
}"#
}

fn equipment_note(sel: &UserSelection) -> &'static str {
    if sel.equipment_photo.is_some() {
        "The user has attached a photo of their available equipment. Base exercise choices on the equipment visible in it."
    } else {
        "The user hasn't uploaded a photo of their equipment. Assume they have access to basic equipment for the chosen workout type."
    }
}

fn catalog_hint(sel: &UserSelection, catalog: &ExerciseCatalog) -> Option<String> {
    let mut names: Vec<&str> = Vec::new();
    for muscle in &sel.muscle_groups {
        for e in catalog.by_muscle_group(muscle).into_iter().take(CATALOG_HINT_PER_MUSCLE) {
            if !names.contains(&e.name.as_str()) {
                names.push(&e.name);
            }
        }
    }
    if names.is_empty() {
        return None;
    }
    Some(format!(
        "Prefer exercises from our database, using these names verbatim where they fit:\n{}",
        names.iter().map(|n| format!(" - {n}")).collect::<Vec<_>>().join("\n")
    ))
}

pub fn user_prompt(sel: &UserSelection, catalog: Option<&ExerciseCatalog>) -> String {
    let days = sel.training_days;
    let muscles = sel.muscle_groups.iter().cloned().collect::<Vec<_>>().join(", ");
    let goals = sel.goals.iter().cloned().collect::<Vec<_>>().join(", ");
    let hint = catalog
        .and_then(|c| catalog_hint(sel, c))
        .map(|h| format!("\n{h}\n"))
        .unwrap_or_default();

    format!(
"Create a {days}-day workout plan.

Target muscle groups: {muscles}
Goals: {goals}
Workout type: {workout_type}
Training days per week: {days}

{equipment}
{hint}
Requirements:
- Cover exactly {days} training day(s), keyed \"1\" through \"{days}\".
- Give 5-6 exercises per day.
- Every exercise has \"name\" (string), \"sets\" (positive integer), \"reps\" (string, e.g. \"8-12\" or \"30 seconds\") and \"instructions\" (string).

Format your response as a single JSON object with exactly this structure (field names and nesting must match):
{schema}",
        workout_type = sel.workout_type.label(),
        equipment = equipment_note(sel),
        schema = plan_schema(),
    )
}

/// Assemble the full payload, inlining the equipment photo as base64 when present.
pub fn build_payload(sel: &UserSelection, catalog: Option<&ExerciseCatalog>) -> PromptPayload {
    let image = sel.equipment_photo.as_ref().map(|p| InlineImage {
        mime_type: p.mime_type.clone(),
        base64: STANDARD.encode(&p.bytes),
    });
    PromptPayload {
        system: system_prompt(),
        user: user_prompt(sel, catalog),
        image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogExercise;
    use crate::wire::{EquipmentPhoto, WorkoutType};

    fn selection() -> UserSelection {
        UserSelection {
            muscle_groups: ["Chest", "Back"].iter().map(|s| s.to_string()).collect(),
            goals: ["Build muscle", "Burn fat"].iter().map(|s| s.to_string()).collect(),
            workout_type: WorkoutType::Gym,
            training_days: 4,
            equipment_photo: None,
        }
    }

    #[test]
    fn prompt_mentions_days_muscles_and_goals() {
        for days in 1..=7u8 {
            let mut sel = selection();
            sel.training_days = days;
            let text = user_prompt(&sel, None);
            assert!(text.contains(&format!("{days}-day")));
            assert!(text.contains(&format!("through \"{days}\"")));
            for m in &sel.muscle_groups {
                assert!(text.contains(m.as_str()));
            }
            for g in &sel.goals {
                assert!(text.contains(g.as_str()));
            }
        }
    }

    #[test]
    fn prompt_demands_day_indexed_json() {
        let text = user_prompt(&selection(), None);
        assert!(text.contains("\"days\""));
        assert!(text.contains("5-6 exercises"));
        assert!(!text.contains("mainWorkout"));
    }

    #[test]
    fn photo_is_inlined_as_base64() {
        let mut sel = selection();
        sel.equipment_photo = Some(EquipmentPhoto {
            file_name: "bench.png".into(),
            mime_type: "image/png".into(),
            bytes: b"hello".to_vec(),
        });
        let payload = build_payload(&sel, None);
        let image = payload.image.expect("image attached");
        assert_eq!(image.base64, "aGVsbG8=");
        assert_eq!(image.data_url(), "data:image/png;base64,aGVsbG8=");
        assert!(payload.user.contains("attached a photo"));
    }

    #[test]
    fn no_photo_assumes_basic_equipment() {
        let payload = build_payload(&selection(), None);
        assert!(payload.image.is_none());
        assert!(payload.user.contains("basic equipment"));
    }

    #[test]
    fn catalog_names_are_offered_for_selected_muscles() {
        let catalog = ExerciseCatalog::new(vec![
            CatalogExercise {
                name: "Incline Dumbbell Press".into(),
                force: Some("push".into()),
                level: "intermediate".into(),
                mechanic: Some("compound".into()),
                equipment: Some("dumbbell".into()),
                primary_muscles: vec!["chest".into()],
                secondary_muscles: vec![],
                instructions: vec![],
                category: "strength".into(),
            },
            CatalogExercise {
                name: "Walking Lunge".into(),
                force: None,
                level: "beginner".into(),
                mechanic: None,
                equipment: None,
                primary_muscles: vec!["quadriceps".into()],
                secondary_muscles: vec![],
                instructions: vec![],
                category: "strength".into(),
            },
        ]);
        let text = user_prompt(&selection(), Some(&catalog));
        assert!(text.contains("Incline Dumbbell Press"));
        assert!(!text.contains("Walking Lunge"));
    }
}
