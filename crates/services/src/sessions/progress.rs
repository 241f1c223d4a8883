/// Aggregated view of workout progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total_exercises: usize,
    pub completed_exercises: usize,
    pub sets_completed: usize,
    pub is_complete: bool,
}

impl SessionProgress {
    /// `completed / total` exercises, `0.0` for an empty workout.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.total_exercises == 0 {
            return 0.0;
        }
        let completed = u32::try_from(self.completed_exercises).unwrap_or(u32::MAX);
        let total = u32::try_from(self.total_exercises).unwrap_or(u32::MAX);
        f64::from(completed) / f64::from(total)
    }
}
