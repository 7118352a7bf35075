use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    /// Target number of sets. Evaluation exercises use a single set.
    pub sets: u32,
    /// Target reps per set. Zero for open-ended evaluation intervals.
    pub reps: u32,
    #[serde(default)]
    pub description: String,
    /// Alternative forms the user picks from before starting (e.g. knee push-ups).
    #[serde(default)]
    pub variants: Vec<String>,
}

impl Exercise {
    pub fn new(id: impl Into<String>, name: impl Into<String>, sets: u32, reps: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sets,
            reps,
            description: String::new(),
            variants: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_variants<I, S>(mut self, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variants = variants.into_iter().map(Into::into).collect();
        self
    }
}

/// An ordered, validated list of exercises.
///
/// Guarantees at least one exercise, unique ids and at least one set per
/// exercise, so a session cursor into it is always valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Program {
    name: String,
    exercises: Vec<Exercise>,
}

impl Program {
    pub fn new(name: impl Into<String>, exercises: Vec<Exercise>) -> Result<Self, ValidationError> {
        if exercises.is_empty() {
            return Err(ValidationError::EmptyCollection("program exercises".into()));
        }
        for (i, exercise) in exercises.iter().enumerate() {
            if exercise.sets == 0 {
                return Err(ValidationError::InvalidValue {
                    field: format!("{}.sets", exercise.id),
                    message: "must be at least 1".into(),
                });
            }
            if exercises[..i].iter().any(|e| e.id == exercise.id) {
                return Err(ValidationError::DuplicateId(exercise.id.clone()));
            }
        }
        Ok(Self {
            name: name.into(),
            exercises,
        })
    }

    /// The default guided workout.
    pub fn full_body() -> Self {
        Self {
            name: "Full Body Challenge".into(),
            exercises: vec![
                Exercise::new("pushups", "Push-ups", 3, 10),
                Exercise::new("squats", "Squats", 3, 10),
                Exercise::new("crunches", "Crunches", 3, 10),
            ],
        }
    }

    /// The initial fitness evaluation: four max-effort intervals.
    pub fn evaluation() -> Self {
        Self {
            name: "Initial Evaluation".into(),
            exercises: vec![
                Exercise::new("pushups", "Push-ups", 1, 0)
                    .with_description("Do as many push-ups as you can in 5 minutes")
                    .with_variants(["regular", "knee"]),
                Exercise::new("crunches", "Crunches", 1, 0)
                    .with_description("Do as many crunches as you can in 5 minutes"),
                Exercise::new("squats", "Squats", 1, 0)
                    .with_description("Do as many squats as you can in 5 minutes"),
                Exercise::new("burpees", "Burpees", 1, 0)
                    .with_description("Do as many burpees as you can in 5 minutes"),
            ],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn get(&self, index: usize) -> Option<&Exercise> {
        self.exercises.get(index)
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn total_sets(&self) -> u32 {
        self.exercises.iter().map(|e| e.sets).fold(0, u32::saturating_add)
    }

    pub fn total_target_reps(&self) -> u32 {
        self.exercises
            .iter()
            .map(|e| e.sets.saturating_mul(e.reps))
            .fold(0, u32::saturating_add)
    }

    /// Rough duration estimate: a minute and a half per set, rounded up.
    pub fn estimated_minutes(&self) -> u32 {
        self.total_sets().saturating_mul(3).div_ceil(2)
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::full_body()
    }
}
