//! Plan generation: one chat-completion exchange, then a shape-checked decode
//! of the model's JSON into a [`WorkoutPlan`].

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::catalog::ExerciseCatalog;
use crate::config::Config;
use crate::errors::{CoachError, CoachResult};
use crate::prompt;
use crate::provider::{excerpt, DynProvider};
use crate::wire::{Exercise, PromptPayload, UserSelection, WorkoutPlan};

#[derive(Debug, Clone)]
pub struct GenerationOptions {
    /// Extra attempts after a transient transport failure.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further attempt.
    pub retry_base_delay: Duration,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self { max_retries: 1, retry_base_delay: Duration::from_millis(500) }
    }
}

impl GenerationOptions {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            max_retries: cfg.max_retries,
            retry_base_delay: Duration::from_millis(cfg.retry_base_delay_ms),
        }
    }
}

pub struct PlanGenerator {
    provider: DynProvider,
    options: GenerationOptions,
    catalog: Option<ExerciseCatalog>,
}

impl PlanGenerator {
    pub fn new(provider: DynProvider, options: GenerationOptions) -> Self {
        Self { provider, options, catalog: None }
    }

    pub fn with_catalog(mut self, catalog: ExerciseCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn catalog(&self) -> Option<&ExerciseCatalog> {
        self.catalog.as_ref()
    }

    pub async fn generate(&self, sel: &UserSelection) -> CoachResult<WorkoutPlan> {
        self.generate_with_cancel(sel, CancellationToken::new()).await
    }

    /// Like [`generate`](Self::generate), but gives up with
    /// [`CoachError::Cancelled`] as soon as `cancel` fires.
    pub async fn generate_with_cancel(
        &self,
        sel: &UserSelection,
        cancel: CancellationToken,
    ) -> CoachResult<WorkoutPlan> {
        sel.validate()?;
        let payload = prompt::build_payload(sel, self.catalog.as_ref());

        let span = info_span!(
            "generate_plan",
            submission_id = %Uuid::new_v4(),
            provider = self.provider.name(),
            training_days = sel.training_days,
        );

        async {
            info!(
                muscle_groups = sel.muscle_groups.len(),
                goals = sel.goals.len(),
                has_photo = sel.equipment_photo.is_some(),
                "requesting workout plan"
            );

            let content = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("workout plan request cancelled");
                    return Err(CoachError::Cancelled);
                }
                res = self.complete_with_retry(&payload) => res?,
            };

            match decode_plan(content.as_deref(), sel.training_days) {
                Ok(plan) => {
                    info!(
                        days = plan.day_count(),
                        exercises = plan.exercise_count(),
                        "workout plan ready"
                    );
                    Ok(plan)
                }
                Err(e) => {
                    warn!(error = %e, "model response rejected");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn complete_with_retry(&self, payload: &PromptPayload) -> CoachResult<Option<String>> {
        let mut attempt = 0u32;
        loop {
            match self.provider.complete(payload).await {
                Ok(content) => return Ok(content),
                Err(e) if e.is_transient() && attempt < self.options.max_retries => {
                    let delay = self.options.retry_base_delay * 2u32.saturating_pow(attempt);
                    attempt += 1;
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient provider failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    warn!(error = %e, "provider call failed");
                    return Err(e);
                }
            }
        }
    }
}

/// Decode the model's completion text. Missing or blank content is a parse
/// failure, never an empty plan.
pub fn decode_plan(content: Option<&str>, training_days: u8) -> CoachResult<WorkoutPlan> {
    let text = content.map(str::trim).unwrap_or_default();
    if text.is_empty() {
        return Err(CoachError::Parse("model returned no content".into()));
    }
    let value: Value = serde_json::from_str(text)
        .map_err(|e| CoachError::Parse(format!("{e}; content: {}", excerpt(text))))?;
    validate_plan(&value, training_days)
}

/// Walk a parsed JSON value and build a plan, stopping at the first violation.
pub fn validate_plan(value: &Value, training_days: u8) -> CoachResult<WorkoutPlan> {
    let root = value
        .as_object()
        .ok_or_else(|| CoachError::shape("$", "expected a JSON object"))?;

    let days_value = match root.get("days") {
        Some(d) => d,
        None if root.contains_key("mainWorkout") => {
            return Err(CoachError::shape(
                "mainWorkout",
                "single-session plan shape is no longer supported, expected \"days\"",
            ))
        }
        None => return Err(CoachError::shape("days", "missing")),
    };
    let days_obj = days_value
        .as_object()
        .ok_or_else(|| CoachError::shape("days", "expected an object keyed by day number"))?;

    let mut days = BTreeMap::new();
    for (key, list) in days_obj {
        let path = format!("days.{key}");
        let day = parse_day_key(key, training_days, &path)?;
        let list = list
            .as_array()
            .ok_or_else(|| CoachError::shape(&path, "expected an array of exercises"))?;
        let exercises = list
            .iter()
            .enumerate()
            .map(|(i, ex)| parse_exercise(ex, &format!("{path}[{i}]")))
            .collect::<CoachResult<Vec<_>>>()?;
        if days.insert(day, exercises).is_some() {
            return Err(CoachError::shape(&path, format!("day {day} appears more than once")));
        }
    }

    if let Some(missing) = (1..=training_days).find(|d| !days.contains_key(d)) {
        return Err(CoachError::shape(format!("days.{missing}"), "missing day"));
    }

    Ok(WorkoutPlan { days })
}

fn parse_day_key(key: &str, training_days: u8, path: &str) -> CoachResult<u8> {
    let n: i64 = key
        .trim()
        .parse()
        .map_err(|_| CoachError::shape(path, "day key is not an integer"))?;
    if n < 1 || n > i64::from(training_days) {
        return Err(CoachError::shape(
            path,
            format!("day {n} is outside 1..={training_days}"),
        ));
    }
    Ok(n as u8)
}

fn parse_exercise(value: &Value, path: &str) -> CoachResult<Exercise> {
    let obj = value
        .as_object()
        .ok_or_else(|| CoachError::shape(path, "expected an exercise object"))?;

    let name = string_field(obj, "name", path)?;
    if name.trim().is_empty() {
        return Err(CoachError::shape(format!("{path}.name"), "must not be empty"));
    }

    let sets = obj
        .get("sets")
        .and_then(Value::as_u64)
        .filter(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| CoachError::shape(format!("{path}.sets"), "expected a positive integer"))?;

    // Models sometimes answer `"reps": 10`; keep it as text.
    let reps = match obj.get("reps") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Number(n)) if n.is_u64() => n.to_string(),
        _ => {
            return Err(CoachError::shape(
                format!("{path}.reps"),
                "expected a non-empty string",
            ))
        }
    };

    let instructions = string_field(obj, "instructions", path)?;

    Ok(Exercise { name: name.trim().to_string(), sets, reps, instructions })
}

fn string_field(obj: &Map<String, Value>, field: &str, path: &str) -> CoachResult<String> {
    obj.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| CoachError::shape(format!("{path}.{field}"), "expected a string"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape_path(err: CoachError) -> String {
        match err {
            CoachError::Shape { path, .. } => path,
            other => panic!("expected shape error, got {other:?}"),
        }
    }

    const THREE_DAYS: &str = r#"{"days": {
        "1": [{"name": "Bench Press", "sets": 3, "reps": "8-10", "instructions": "Control the bar."}],
        "2": [{"name": "Push-up", "sets": 4, "reps": "12", "instructions": "Elbows at 45 degrees."}],
        "3": [{"name": "Cable Fly", "sets": 3, "reps": "12-15", "instructions": "Squeeze at the top."}]
    }}"#;

    #[test]
    fn decodes_well_shaped_plan() {
        let plan = decode_plan(Some(THREE_DAYS), 3).unwrap();
        assert_eq!(plan.day_count(), 3);
        assert_eq!(plan.days[&1][0].name, "Bench Press");
        assert_eq!(plan.days[&2][0].sets, 4);
    }

    #[test]
    fn reencoding_a_decoded_plan_is_stable() {
        let plan = decode_plan(Some(THREE_DAYS), 3).unwrap();
        let text = serde_json::to_string(&plan).unwrap();
        assert_eq!(decode_plan(Some(&text), 3).unwrap(), plan);
    }

    #[test]
    fn missing_or_blank_content_is_a_parse_error() {
        for content in [None, Some(""), Some("  \n ")] {
            let err = decode_plan(content, 1).unwrap_err();
            assert!(matches!(err, CoachError::Parse(_)), "{content:?}");
        }
    }

    #[test]
    fn prose_is_a_parse_error() {
        let err = decode_plan(Some("Sorry, I can't help"), 3).unwrap_err();
        assert!(matches!(err, CoachError::Parse(_)));
    }

    #[test]
    fn empty_object_is_a_shape_error_not_an_empty_plan() {
        assert_eq!(shape_path(decode_plan(Some("{}"), 2).unwrap_err()), "days");
    }

    #[test]
    fn day_outside_range_is_rejected() {
        let json = r#"{"days": {"1": [], "4": []}}"#;
        assert_eq!(shape_path(decode_plan(Some(json), 3).unwrap_err()), "days.4");
        let json = r#"{"days": {"0": []}}"#;
        assert_eq!(shape_path(decode_plan(Some(json), 1).unwrap_err()), "days.0");
    }

    #[test]
    fn non_numeric_day_key_is_rejected() {
        let json = r#"{"days": {"Monday": []}}"#;
        assert_eq!(shape_path(decode_plan(Some(json), 1).unwrap_err()), "days.Monday");
    }

    #[test]
    fn missing_day_is_rejected() {
        let json = r#"{"days": {"1": [], "3": []}}"#;
        assert_eq!(shape_path(decode_plan(Some(json), 3).unwrap_err()), "days.2");
    }

    #[test]
    fn duplicate_day_after_normalizing_is_rejected() {
        let json = r#"{"days": {"1": [], "01": []}}"#;
        let err = decode_plan(Some(json), 1).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn empty_day_is_allowed() {
        let plan = decode_plan(Some(r#"{"days":{"1":[]}}"#), 1).unwrap();
        assert!(plan.days[&1].is_empty());
    }

    #[test]
    fn legacy_main_workout_shape_is_named() {
        let json = r#"{"mainWorkout": [{"name": "Squat", "sets": 3, "reps": "5", "instructions": ""}]}"#;
        assert_eq!(shape_path(decode_plan(Some(json), 1).unwrap_err()), "mainWorkout");
    }

    #[test]
    fn top_level_array_is_rejected() {
        assert_eq!(shape_path(decode_plan(Some("[]"), 1).unwrap_err()), "$");
    }

    #[test]
    fn exercise_field_violations_report_first_path() {
        let cases = [
            (r#"{"name": "", "sets": 3, "reps": "5", "instructions": ""}"#, "days.1[0].name"),
            (r#"{"sets": 3, "reps": "5", "instructions": ""}"#, "days.1[0].name"),
            (r#"{"name": "Row", "sets": "3", "reps": "5", "instructions": ""}"#, "days.1[0].sets"),
            (r#"{"name": "Row", "sets": 0, "reps": "5", "instructions": ""}"#, "days.1[0].sets"),
            (r#"{"name": "Row", "sets": 2.5, "reps": "5", "instructions": ""}"#, "days.1[0].sets"),
            (r#"{"name": "Row", "sets": 3, "instructions": ""}"#, "days.1[0].reps"),
            (r#"{"name": "Row", "sets": 3, "reps": "5"}"#, "days.1[0].instructions"),
            (r#""Row""#, "days.1[0]"),
        ];
        for (exercise, expected) in cases {
            let json = format!(r#"{{"days": {{"1": [{exercise}]}}}}"#);
            assert_eq!(shape_path(decode_plan(Some(&json), 1).unwrap_err()), expected, "{exercise}");
        }
    }

    #[test]
    fn numeric_reps_are_kept_as_text() {
        let json = r#"{"days": {"1": [{"name": " Dip ", "sets": 3, "reps": 10, "instructions": "Lean forward."}]}}"#;
        let plan = decode_plan(Some(json), 1).unwrap();
        assert_eq!(plan.days[&1][0].reps, "10");
        assert_eq!(plan.days[&1][0].name, "Dip");
    }
}
