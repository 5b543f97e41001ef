//! Workout model derivations.
//!
//! Pure functions over the item tree:
//! - Flattening nested repeat-sets into atomic leaves
//! - Total time and interval counts for a plan
//! - Plan validation before persistence

use crate::{
    Error, Exercise, ExerciseType, IntensityLevel, Leaf, PlanDraft, Rest, Result, Set,
    WorkoutItem, WorkoutPlan,
};
use chrono::Utc;
use std::collections::HashSet;
use uuid::Uuid;

/// Longest plan accepted by validation: one day
pub const MAX_PLAN_SECS: u32 = 24 * 60 * 60;

/// Generate a fresh opaque identifier
///
/// UUIDv7 combines a millisecond timestamp with 74 random bits.
pub fn generate_id() -> String {
    Uuid::now_v7().to_string()
}

impl Exercise {
    pub fn new(exercise_type: ExerciseType, duration: u32) -> Self {
        Self {
            id: generate_id(),
            exercise_type,
            duration,
            intensity: None,
            name: None,
        }
    }

    pub fn with_intensity(mut self, intensity: IntensityLevel) -> Self {
        self.intensity = Some(intensity);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Intensity with the medium default applied
    pub fn intensity_level(&self) -> IntensityLevel {
        self.intensity.unwrap_or_default()
    }
}

impl Rest {
    pub fn new(duration: u32) -> Self {
        Self {
            id: generate_id(),
            duration,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Set {
    pub fn new(repetitions: u32, items: Vec<WorkoutItem>) -> Self {
        Self {
            id: generate_id(),
            repetitions,
            items,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl From<Exercise> for WorkoutItem {
    fn from(value: Exercise) -> Self {
        WorkoutItem::Exercise(value)
    }
}

impl From<Rest> for WorkoutItem {
    fn from(value: Rest) -> Self {
        WorkoutItem::Rest(value)
    }
}

impl From<Set> for WorkoutItem {
    fn from(value: Set) -> Self {
        WorkoutItem::Set(value)
    }
}

impl WorkoutItem {
    pub fn id(&self) -> &str {
        match self {
            WorkoutItem::Exercise(e) => &e.id,
            WorkoutItem::Rest(r) => &r.id,
            WorkoutItem::Set(s) => &s.id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            WorkoutItem::Exercise(e) => e.name.as_deref(),
            WorkoutItem::Rest(r) => r.name.as_deref(),
            WorkoutItem::Set(s) => s.name.as_deref(),
        }
    }

    /// Derived duration in seconds; a set counts every repetition
    ///
    /// Saturates at `u32::MAX` instead of overflowing.
    pub fn duration(&self) -> u32 {
        match self {
            WorkoutItem::Exercise(e) => e.duration,
            WorkoutItem::Rest(r) => r.duration,
            WorkoutItem::Set(s) => s.repetitions.saturating_mul(sum_durations(&s.items)),
        }
    }

    /// Number of atomic leaves this item expands to, saturating
    fn leaf_count(&self) -> usize {
        match self {
            WorkoutItem::Exercise(_) | WorkoutItem::Rest(_) => 1,
            WorkoutItem::Set(s) => {
                let per_pass = s
                    .items
                    .iter()
                    .fold(0usize, |n, item| n.saturating_add(item.leaf_count()));
                per_pass.saturating_mul(s.repetitions as usize)
            }
        }
    }
}

impl Leaf<'_> {
    pub fn id(&self) -> &str {
        match self {
            Leaf::Exercise(e) => &e.id,
            Leaf::Rest(r) => &r.id,
        }
    }

    pub fn duration(&self) -> u32 {
        match self {
            Leaf::Exercise(e) => e.duration,
            Leaf::Rest(r) => r.duration,
        }
    }
}

/// Expand nested sets into the ordered sequence of atomic leaves
///
/// The whole list is visited `repetitions` times; each set splices in its
/// own expansion, so nested repeats multiply outer-repeat-major.
pub fn flatten(items: &[WorkoutItem], repetitions: u32) -> Vec<Leaf<'_>> {
    let mut out = Vec::new();
    flatten_into(items, repetitions, &mut out);
    out
}

fn flatten_into<'a>(items: &'a [WorkoutItem], repetitions: u32, out: &mut Vec<Leaf<'a>>) {
    // repeating a subtree without leaves yields nothing
    if items.iter().all(|item| item.leaf_count() == 0) {
        return;
    }
    for _ in 0..repetitions {
        for item in items {
            match item {
                WorkoutItem::Exercise(e) => out.push(Leaf::Exercise(e)),
                WorkoutItem::Rest(r) => out.push(Leaf::Rest(r)),
                WorkoutItem::Set(s) => flatten_into(&s.items, s.repetitions, out),
            }
        }
    }
}

fn sum_durations(items: &[WorkoutItem]) -> u32 {
    items
        .iter()
        .fold(0, |total: u32, item| total.saturating_add(item.duration()))
}

/// Warmup, every flattened leaf and cooldown, in seconds
///
/// Computed from derived set durations without expanding the tree.
/// Saturates at `u32::MAX`; validated plans stay under [`MAX_PLAN_SECS`].
pub fn calculate_total_time(plan: &WorkoutPlan) -> u32 {
    plan.warmup_time
        .saturating_add(sum_durations(&plan.items))
        .saturating_add(plan.cooldown_time)
}

/// Number of timeline steps the plan expands to, warmup and cooldown included
pub fn count_intervals(plan: &WorkoutPlan) -> usize {
    plan.items
        .iter()
        .fold(0usize, |n, item| n.saturating_add(item.leaf_count()))
        .saturating_add(usize::from(plan.warmup_time > 0))
        .saturating_add(usize::from(plan.cooldown_time > 0))
}

impl WorkoutPlan {
    /// Build a new plan from a draft, assigning id and timestamps
    pub fn from_draft(draft: PlanDraft) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            name: draft.name,
            description: draft.description,
            warmup_time: draft.warmup_time,
            cooldown_time: draft.cooldown_time,
            items: draft.items,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh the update timestamp after any change
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Check the plan is fit to persist
    ///
    /// Returns the first problem found as [`Error::Validation`].
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("plan name must not be empty".into()));
        }
        if self.items.is_empty() {
            return Err(Error::Validation(
                "plan must contain at least one item".into(),
            ));
        }

        let mut seen = HashSet::new();
        seen.insert(self.id.as_str());
        validate_items(&self.items, &mut seen)?;

        let total = calculate_total_time(self);
        if total > MAX_PLAN_SECS {
            return Err(Error::Validation(format!(
                "plan lasts {}s, longer than the {}s limit",
                total, MAX_PLAN_SECS
            )));
        }
        Ok(())
    }
}

fn validate_items<'a>(items: &'a [WorkoutItem], seen: &mut HashSet<&'a str>) -> Result<()> {
    for item in items {
        if !seen.insert(item.id()) {
            return Err(Error::Validation(format!("duplicate id {}", item.id())));
        }
        match item {
            WorkoutItem::Exercise(Exercise { id, duration, .. })
            | WorkoutItem::Rest(Rest { id, duration, .. }) => {
                if *duration == 0 {
                    return Err(Error::Validation(format!(
                        "item {} must last at least one second",
                        id
                    )));
                }
            }
            WorkoutItem::Set(set) => {
                if set.repetitions == 0 {
                    return Err(Error::Validation(format!(
                        "set {} must repeat at least once",
                        set.id
                    )));
                }
                validate_items(&set.items, seen)?;
            }
        }
    }
    Ok(())
}
