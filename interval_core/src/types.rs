//! Core domain types for the interval timer.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercise kinds and intensity levels
//! - The recursive workout item tree (exercise, rest, repeated set)
//! - Workout plans and drafts used to create them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Exercise Types
// ============================================================================

/// Kind of movement performed during an exercise interval
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    Running,
    Walking,
}

/// Effort level of an exercise interval
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IntensityLevel {
    Low,
    #[default]
    Medium,
    High,
}

/// Activity performed during a single timeline step
///
/// Wider than [`ExerciseType`]: rests are steps too, and the intensity
/// tables fall back to their "other" row for them.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    Running,
    Walking,
    Rest,
}

impl From<ExerciseType> for StepType {
    fn from(value: ExerciseType) -> Self {
        match value {
            ExerciseType::Running => StepType::Running,
            ExerciseType::Walking => StepType::Walking,
        }
    }
}

// ============================================================================
// Item Tree
// ============================================================================

/// An atomic timed exercise interval
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: String,
    #[serde(rename = "type")]
    pub exercise_type: ExerciseType,
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<IntensityLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// An atomic rest interval
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Rest {
    pub id: String,
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A group of items repeated `repetitions` times
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Set {
    pub id: String,
    pub repetitions: u32,
    #[serde(default)]
    pub items: Vec<WorkoutItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A node of the workout item tree
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkoutItem {
    Exercise(Exercise),
    Rest(Rest),
    Set(Set),
}

/// An atomic item produced by flattening: never a set
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Leaf<'a> {
    Exercise(&'a Exercise),
    Rest(&'a Rest),
}

// ============================================================================
// Plans
// ============================================================================

/// A complete workout definition: warmup, main item tree, cooldown
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutPlan {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub warmup_time: u32,
    #[serde(default)]
    pub cooldown_time: u32,
    #[serde(default)]
    pub items: Vec<WorkoutItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User-supplied fields for a plan that does not exist yet
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PlanDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub warmup_time: u32,
    #[serde(default)]
    pub cooldown_time: u32,
    #[serde(default)]
    pub items: Vec<WorkoutItem>,
}
