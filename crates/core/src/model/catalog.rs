use serde::{Deserialize, Serialize};

use crate::model::ids::ExerciseId;

/// Label used when an exercise has neither a body part nor a target muscle.
pub const GENERAL_MUSCLE_GROUP: &str = "General";

/// An entry of the exercise library.
///
/// Programs reference catalog entries by id; the generator embeds the
/// highest-rated entries into its prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogExercise {
    pub id: ExerciseId,
    pub name: String,
    pub equipment: Option<String>,
    pub body_part: Option<String>,
    pub target_muscle: Option<String>,
    pub rating: f64,
}

impl CatalogExercise {
    /// Muscle-group label shown during a workout: body part, else target
    /// muscle, else "General".
    #[must_use]
    pub fn muscle_group(&self) -> &str {
        non_empty(self.body_part.as_deref())
            .or_else(|| non_empty(self.target_muscle.as_deref()))
            .unwrap_or(GENERAL_MUSCLE_GROUP)
    }

    /// One prompt line, e.g. `Barbell Bench Press (Chest, Barbell)`.
    #[must_use]
    pub fn prompt_line(&self) -> String {
        format!(
            "{} ({}, {})",
            self.name,
            self.body_part.as_deref().unwrap_or(""),
            self.equipment.as_deref().unwrap_or("")
        )
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Filters for browsing the exercise library.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Case-insensitive substring of the exercise name.
    pub name_contains: Option<String>,
    pub body_part: Option<String>,
    pub equipment: Option<String>,
    pub limit: usize,
}

impl CatalogFilter {
    #[must_use]
    pub fn matches(&self, exercise: &CatalogExercise) -> bool {
        let name_ok = self.name_contains.as_ref().is_none_or(|needle| {
            exercise
                .name
                .to_lowercase()
                .contains(&needle.trim().to_lowercase())
        });
        let body_ok = self
            .body_part
            .as_ref()
            .is_none_or(|b| exercise.body_part.as_deref() == Some(b.as_str()));
        let equipment_ok = self
            .equipment
            .as_ref()
            .is_none_or(|e| exercise.equipment.as_deref() == Some(e.as_str()));
        name_ok && body_ok && equipment_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(body_part: Option<&str>, target: Option<&str>) -> CatalogExercise {
        CatalogExercise {
            id: ExerciseId::new(1),
            name: "Barbell Bench Press".into(),
            equipment: Some("Barbell".into()),
            body_part: body_part.map(Into::into),
            target_muscle: target.map(Into::into),
            rating: 9.1,
        }
    }

    #[test]
    fn muscle_group_prefers_body_part() {
        assert_eq!(exercise(Some("Chest"), Some("Pectorals")).muscle_group(), "Chest");
        assert_eq!(exercise(None, Some("Pectorals")).muscle_group(), "Pectorals");
        assert_eq!(exercise(Some("  "), None).muscle_group(), "General");
    }

    #[test]
    fn prompt_line_lists_body_part_and_equipment() {
        assert_eq!(
            exercise(Some("Chest"), None).prompt_line(),
            "Barbell Bench Press (Chest, Barbell)"
        );
    }

    #[test]
    fn filter_matches_name_case_insensitively() {
        let filter = CatalogFilter {
            name_contains: Some("BENCH".into()),
            equipment: Some("Barbell".into()),
            ..CatalogFilter::default()
        };
        assert!(filter.matches(&exercise(Some("Chest"), None)));

        let filter = CatalogFilter {
            body_part: Some("Back".into()),
            ..CatalogFilter::default()
        };
        assert!(!filter.matches(&exercise(Some("Chest"), None)));
    }
}
