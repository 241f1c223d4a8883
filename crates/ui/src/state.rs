use services::SessionError;
use services::sessions::NoWorkoutReason;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    Unknown,
    Rejected,
    NoWorkout(NoWorkoutReason),
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ViewError::Unknown => "Something went wrong. Please try again.",
            ViewError::Rejected => "That action is not available right now.",
            ViewError::NoWorkout(reason) => reason.message(),
        }
    }
}

impl From<SessionError> for ViewError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NoPendingSet | SessionError::Exercise(_) | SessionError::Workout(_) => {
                ViewError::Rejected
            }
            _ => ViewError::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

impl<T> ViewState<T> {
    #[must_use]
    pub fn from_result(result: Result<T, ViewError>) -> Self {
        match result {
            Ok(data) => ViewState::Ready(data),
            Err(err) => ViewState::Error(err),
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }
}
