//! Timeline construction.
//!
//! Expands a plan into the flat, time-stamped sequence of steps that
//! playback walks through. The timeline is derived from the plan every
//! time it is needed and never cached.

use crate::intensity::{final_intensity, intensity_label, rest_intensity, warmup_cooldown_intensity};
use crate::workout::flatten;
use crate::{IntensityLevel, Leaf, StepType, WorkoutPlan};
use serde::{Deserialize, Serialize};

/// Which part of the plan a step belongs to
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Warmup,
    Main,
    Cooldown,
}

/// One atomic timed step with absolute offsets in seconds
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TimelineStep {
    pub id: String,
    pub step_type: StepType,
    pub duration: u32,
    pub intensity: Option<IntensityLevel>,
    pub name: Option<String>,
    pub start_offset: u32,
    pub end_offset: u32,
    pub segment: Segment,
    pub severity: u8,
    pub label: String,
}

impl TimelineStep {
    /// Name to show for the step: its own name, else its intensity label
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.label)
    }
}

/// Build the playback timeline for a plan
///
/// Warmup and cooldown become walking steps when non-zero and are omitted
/// entirely otherwise. Offsets saturate at `u32::MAX`.
pub fn build_timeline(plan: &WorkoutPlan) -> Vec<TimelineStep> {
    let mut steps = Vec::new();
    let mut offset = 0;

    if plan.warmup_time > 0 {
        steps.push(bookend(
            format!("{}-warmup", plan.id),
            "warmup",
            Segment::Warmup,
            plan.warmup_time,
            offset,
        ));
        offset = plan.warmup_time;
    }

    for leaf in flatten(&plan.items, 1) {
        let step = main_step(leaf, offset);
        offset = step.end_offset;
        steps.push(step);
    }

    if plan.cooldown_time > 0 {
        steps.push(bookend(
            format!("{}-cooldown", plan.id),
            "cooldown",
            Segment::Cooldown,
            plan.cooldown_time,
            offset,
        ));
    }

    tracing::debug!("Built timeline of {} steps for plan {}", steps.len(), plan.id);
    steps
}

fn bookend(id: String, name: &str, segment: Segment, duration: u32, start: u32) -> TimelineStep {
    TimelineStep {
        id,
        step_type: StepType::Walking,
        duration,
        intensity: None,
        name: Some(name.to_string()),
        start_offset: start,
        end_offset: start.saturating_add(duration),
        segment,
        severity: warmup_cooldown_intensity(),
        label: name.to_string(),
    }
}

fn main_step(leaf: Leaf<'_>, start: u32) -> TimelineStep {
    match leaf {
        Leaf::Exercise(e) => {
            let step_type = StepType::from(e.exercise_type);
            let level = e.intensity_level();
            TimelineStep {
                id: e.id.clone(),
                step_type,
                duration: e.duration,
                intensity: e.intensity,
                name: e.name.clone(),
                start_offset: start,
                end_offset: start.saturating_add(e.duration),
                segment: Segment::Main,
                severity: final_intensity(step_type, level),
                label: intensity_label(step_type, level).to_string(),
            }
        }
        Leaf::Rest(r) => TimelineStep {
            id: r.id.clone(),
            step_type: StepType::Rest,
            duration: r.duration,
            intensity: None,
            name: r.name.clone(),
            start_offset: start,
            end_offset: start.saturating_add(r.duration),
            segment: Segment::Main,
            severity: rest_intensity(),
            label: "rest".to_string(),
        },
    }
}
