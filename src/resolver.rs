use std::collections::HashSet;

use crate::model::{ExerciseAssignment, ScheduledExercise};
use crate::timeline::WeekRange;

/// Collect the exercises scheduled inside `range`.
///
/// Schedule order is kept. When the same exercise appears more than once in
/// the range, only its first occurrence is returned.
pub fn resolve_exercises(range: WeekRange, schedule: &[ScheduledExercise]) -> Vec<ExerciseAssignment> {
    let mut seen = HashSet::new();
    schedule
        .iter()
        .filter(|s| range.contains(s.week))
        .filter(|s| seen.insert(s.exercise.id.as_str()))
        .map(ScheduledExercise::assignment)
        .collect()
}

/// Drop repeated exercise ids from an already built list, first one wins.
pub fn dedup_assignments(assignments: Vec<ExerciseAssignment>) -> Vec<ExerciseAssignment> {
    let mut seen = HashSet::new();
    assignments
        .into_iter()
        .filter(|a| seen.insert(a.exercise.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Exercise, Variant};

    fn scheduled(week: u32, id: &str, pct: f64) -> ScheduledExercise {
        ScheduledExercise {
            week,
            exercise: Exercise::new(id, id.to_uppercase()),
            variant: Variant { percentage: pct },
        }
    }

    #[test]
    fn keeps_first_occurrence_of_repeated_exercise() {
        let schedule = vec![
            scheduled(1, "sq", 70.0),
            scheduled(2, "sq", 75.0),
            scheduled(3, "dl", 80.0),
        ];
        let resolved = resolve_exercises(WeekRange::between(1, 4), &schedule);
        let ids: Vec<_> = resolved.iter().map(|a| a.exercise.id.as_str()).collect();
        assert_eq!(ids, vec!["sq", "dl"]);
        assert_eq!(resolved[0].variant.percentage, 70.0);
    }

    #[test]
    fn excludes_weeks_outside_range() {
        let schedule = vec![
            scheduled(1, "bench", 60.0),
            scheduled(3, "row", 65.0),
            scheduled(5, "press", 70.0),
        ];
        let resolved = resolve_exercises(WeekRange::between(2, 4), &schedule);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].exercise.id, "row");
        assert!(resolve_exercises(WeekRange::between(6, 8), &schedule).is_empty());
    }

    #[test]
    fn dedup_assignments_is_stable() {
        let list = vec![
            scheduled(1, "a", 1.0).assignment(),
            scheduled(1, "b", 2.0).assignment(),
            scheduled(1, "a", 3.0).assignment(),
        ];
        let out = dedup_assignments(list);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].variant.percentage, 1.0);
        assert_eq!(out[1].exercise.id, "b");
    }
}
