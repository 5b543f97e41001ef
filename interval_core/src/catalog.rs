//! Built-in plan templates.
//!
//! Templates are built once and cached; every instantiation gets fresh ids
//! so plans created from the same template never share item ids.

use crate::workout::generate_id;
use crate::{Exercise, ExerciseType, IntensityLevel, PlanDraft, Rest, Set, WorkoutItem};
use once_cell::sync::Lazy;

/// A named starting point for a new plan
#[derive(Clone, Debug)]
pub struct PlanTemplate {
    pub key: &'static str,
    pub draft: PlanDraft,
}

impl PlanTemplate {
    /// A draft of this template with every item id regenerated
    pub fn instantiate(&self) -> PlanDraft {
        let mut draft = self.draft.clone();
        reassign_ids(&mut draft.items);
        draft
    }
}

fn reassign_ids(items: &mut [WorkoutItem]) {
    for item in items {
        match item {
            WorkoutItem::Exercise(e) => e.id = generate_id(),
            WorkoutItem::Rest(r) => r.id = generate_id(),
            WorkoutItem::Set(s) => {
                s.id = generate_id();
                reassign_ids(&mut s.items);
            }
        }
    }
}

static TEMPLATES: Lazy<Vec<PlanTemplate>> = Lazy::new(build_templates);

/// All built-in templates
pub fn templates() -> &'static [PlanTemplate] {
    &TEMPLATES
}

/// Look up a template by key
pub fn find_template(key: &str) -> Option<&'static PlanTemplate> {
    TEMPLATES.iter().find(|t| t.key == key)
}

fn build_templates() -> Vec<PlanTemplate> {
    vec![
        PlanTemplate {
            key: "c25k-w1",
            draft: PlanDraft {
                name: "Couch to 5K - Week 1".into(),
                description: "Alternate 60 seconds of jogging with 90 seconds of walking."
                    .into(),
                warmup_time: 300,
                cooldown_time: 300,
                items: vec![Set::new(
                    8,
                    vec![
                        Exercise::new(ExerciseType::Running, 60)
                            .with_intensity(IntensityLevel::Low)
                            .into(),
                        Exercise::new(ExerciseType::Walking, 90).into(),
                    ],
                )
                .with_name("Jog / walk")
                .into()],
            },
        },
        PlanTemplate {
            key: "hiit-ladder",
            draft: PlanDraft {
                name: "Sprint Ladder".into(),
                description: "Three rounds of 20/40/60 second sprints with equal rest."
                    .into(),
                warmup_time: 180,
                cooldown_time: 180,
                items: vec![Set::new(
                    3,
                    [20, 40, 60]
                        .into_iter()
                        .flat_map(|secs| {
                            [
                                WorkoutItem::from(
                                    Exercise::new(ExerciseType::Running, secs)
                                        .with_intensity(IntensityLevel::High),
                                ),
                                WorkoutItem::from(Rest::new(secs)),
                            ]
                        })
                        .collect(),
                )
                .with_name("Ladder")
                .into()],
            },
        },
        PlanTemplate {
            key: "power-walk",
            draft: PlanDraft {
                name: "Power Walk".into(),
                description: "Brisk walking blocks with easy recovery strolls.".into(),
                warmup_time: 0,
                cooldown_time: 120,
                items: vec![Set::new(
                    5,
                    vec![
                        Exercise::new(ExerciseType::Walking, 180)
                            .with_intensity(IntensityLevel::High)
                            .into(),
                        Exercise::new(ExerciseType::Walking, 120)
                            .with_intensity(IntensityLevel::Low)
                            .into(),
                    ],
                )
                .into()],
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workout::{calculate_total_time, count_intervals, flatten};
    use crate::WorkoutPlan;

    #[test]
    fn test_templates_are_valid_plans() {
        for template in templates() {
            let plan = WorkoutPlan::from_draft(template.instantiate());
            plan.validate().unwrap();
        }
    }

    #[test]
    fn test_couch_to_5k_shape() {
        let plan = WorkoutPlan::from_draft(find_template("c25k-w1").unwrap().instantiate());
        assert_eq!(calculate_total_time(&plan), 300 + 8 * 150 + 300);
        assert_eq!(count_intervals(&plan), 18);
    }

    #[test]
    fn test_ladder_order() {
        let plan = WorkoutPlan::from_draft(find_template("hiit-ladder").unwrap().instantiate());
        let durations: Vec<u32> = flatten(&plan.items, 1)
            .iter()
            .take(6)
            .map(|l| l.duration())
            .collect();
        assert_eq!(durations, vec![20, 20, 40, 40, 60, 60]);
    }

    #[test]
    fn test_instantiation_regenerates_ids() {
        let template = find_template("power-walk").unwrap();
        let a = template.instantiate();
        let b = template.instantiate();
        assert_ne!(a.items[0].id(), b.items[0].id());
        assert_ne!(a.items[0].id(), template.draft.items[0].id());
    }

    #[test]
    fn test_unknown_template() {
        assert!(find_template("marathon").is_none());
    }
}
