use serde::{Deserialize, Serialize};

use crate::timeline::WeekRange;

/// Name given to periods that arrive from the backend without one.
pub const UNNAMED_PERIOD: &str = "Periodo sin nombre";

/// Default label for the `n`th period created in a store (1-based).
pub fn default_period_name(n: usize) -> String {
    format!("Periodo {n}")
}

/// A catalogue exercise.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub description: String,
    pub muscle_groups: Vec<String>,
    pub equipment: Vec<String>,
}

impl Exercise {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_muscle_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.muscle_groups = groups.into_iter().map(Into::into).collect();
        self
    }
}

/// Load or intensity prescribed for one scheduled instance of an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Variant {
    pub percentage: f64,
}

/// An exercise as carried by a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseAssignment {
    pub exercise: Exercise,
    #[serde(default)]
    pub variant: Variant,
}

/// One entry of a plan's chronological schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledExercise {
    pub week: u32,
    pub exercise: Exercise,
    #[serde(default)]
    pub variant: Variant,
}

impl ScheduledExercise {
    pub fn assignment(&self) -> ExerciseAssignment {
        ExerciseAssignment {
            exercise: self.exercise.clone(),
            variant: self.variant,
        }
    }
}

/// A named, inclusive week range of a training plan.
///
/// `id` is `None` until the backend has acknowledged the period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub id: Option<String>,
    pub start: u32,
    pub end: u32,
    pub name: String,
    pub exercises: Vec<ExerciseAssignment>,
}

impl Period {
    pub fn range(&self) -> WeekRange {
        WeekRange {
            start: self.start,
            end: self.end,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn exercise_ids(&self) -> impl Iterator<Item = &str> {
        self.exercises.iter().map(|a| a.exercise.id.as_str())
    }
}
