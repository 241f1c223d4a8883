use dreppy_core::model::{CatalogExercise, ExerciseId, Program, ProgramExercise, ProgramId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgramCardVm {
    pub id: ProgramId,
    pub name: String,
    pub avatar: String,
    pub exercises_label: String,
}

#[must_use]
pub fn map_program_card(program: &Program) -> ProgramCardVm {
    let avatar = program
        .name()
        .chars()
        .next()
        .map_or_else(|| "?".to_string(), |ch| ch.to_uppercase().to_string());
    let exercises_label = match program.exercises().len() {
        1 => "1 exercise".to_owned(),
        n => format!("{n} exercises"),
    };
    ProgramCardVm {
        id: program.id(),
        name: program.name().to_owned(),
        avatar,
        exercises_label,
    }
}

/// One row of a draft or saved program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgramRowVm {
    pub id: ExerciseId,
    pub name: String,
    pub muscle_group: String,
    pub targets_label: String,
}

impl From<&ProgramExercise> for ProgramRowVm {
    fn from(slot: &ProgramExercise) -> Self {
        Self {
            id: slot.exercise_id(),
            name: slot.name().to_owned(),
            muscle_group: slot.muscle_group().to_owned(),
            targets_label: format!("{} × {}", slot.target_sets(), slot.target_reps()),
        }
    }
}

/// One hit in the exercise library or picker.
#[derive(Clone, Debug, PartialEq)]
pub struct LibraryRowVm {
    pub id: ExerciseId,
    pub name: String,
    pub detail: String,
    pub rating: f64,
}

impl From<&CatalogExercise> for LibraryRowVm {
    fn from(row: &CatalogExercise) -> Self {
        let detail = [row.body_part.as_deref(), row.equipment.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" · ");
        Self {
            id: row.id,
            name: row.name.clone(),
            detail,
            rating: row.rating,
        }
    }
}

#[must_use]
pub fn map_library_rows(rows: &[CatalogExercise]) -> Vec<LibraryRowVm> {
    rows.iter().map(LibraryRowVm::from).collect()
}
