//! Intensity scoring for timeline steps.
//!
//! The severity table is shown both when planning and during live
//! playback, so the values here are fixed:
//!
//! | type    | low | medium | high |
//! |---------|-----|--------|------|
//! | walking | 1   | 2      | 3    |
//! | running | 3   | 4      | 5    |
//! | other   | 1   | 1      | 1    |

use crate::{IntensityLevel, StepType};

/// Base score for an activity type
pub fn base_intensity(step_type: StepType) -> u8 {
    match step_type {
        StepType::Walking => 2,
        StepType::Running => 3,
        StepType::Rest => 1,
    }
}

/// Scaling factor for an intensity level
///
/// Not part of [`final_intensity`], which uses the fixed table.
pub fn intensity_multiplier(level: IntensityLevel) -> f64 {
    match level {
        IntensityLevel::Low => 0.7,
        IntensityLevel::Medium => 1.0,
        IntensityLevel::High => 1.3,
    }
}

/// Discrete 1-5 severity of a step
pub fn final_intensity(step_type: StepType, level: IntensityLevel) -> u8 {
    match (step_type, level) {
        (StepType::Walking, IntensityLevel::Low) => 1,
        (StepType::Walking, IntensityLevel::Medium) => 2,
        (StepType::Walking, IntensityLevel::High) => 3,
        (StepType::Running, IntensityLevel::Low) => 3,
        (StepType::Running, IntensityLevel::Medium) => 4,
        (StepType::Running, IntensityLevel::High) => 5,
        (StepType::Rest, _) => 1,
    }
}

pub fn rest_intensity() -> u8 {
    1
}

pub fn warmup_cooldown_intensity() -> u8 {
    2
}

/// Human-readable name for an activity at a given effort
pub fn intensity_label(step_type: StepType, level: IntensityLevel) -> &'static str {
    match (step_type, level) {
        (StepType::Walking, IntensityLevel::Low) => "stroll",
        (StepType::Walking, IntensityLevel::Medium) => "walk",
        (StepType::Walking, IntensityLevel::High) => "brisk walk",
        (StepType::Running, IntensityLevel::Low) => "jog",
        (StepType::Running, IntensityLevel::Medium) => "run",
        (StepType::Running, IntensityLevel::High) => "sprint",
        (StepType::Rest, _) => "rest",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_intensity_table() {
        assert_eq!(final_intensity(StepType::Running, IntensityLevel::High), 5);
        assert_eq!(final_intensity(StepType::Running, IntensityLevel::Medium), 4);
        assert_eq!(final_intensity(StepType::Running, IntensityLevel::Low), 3);
        assert_eq!(final_intensity(StepType::Walking, IntensityLevel::High), 3);
        assert_eq!(final_intensity(StepType::Walking, IntensityLevel::Medium), 2);
        assert_eq!(final_intensity(StepType::Walking, IntensityLevel::Low), 1);
    }

    #[test]
    fn test_rest_is_always_one() {
        for level in [IntensityLevel::Low, IntensityLevel::Medium, IntensityLevel::High] {
            assert_eq!(final_intensity(StepType::Rest, level), rest_intensity());
        }
        assert_eq!(warmup_cooldown_intensity(), 2);
    }

    #[test]
    fn test_base_and_multiplier() {
        assert_eq!(base_intensity(StepType::Walking), 2);
        assert_eq!(base_intensity(StepType::Running), 3);
        assert_eq!(base_intensity(StepType::Rest), 1);
        assert_eq!(intensity_multiplier(IntensityLevel::Low), 0.7);
        assert_eq!(intensity_multiplier(IntensityLevel::High), 1.3);
    }

    #[test]
    fn test_labels() {
        assert_eq!(intensity_label(StepType::Running, IntensityLevel::Low), "jog");
        assert_eq!(intensity_label(StepType::Running, IntensityLevel::High), "sprint");
        assert_eq!(intensity_label(StepType::Rest, IntensityLevel::High), "rest");
    }
}
