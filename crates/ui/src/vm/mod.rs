mod chat_vm;
mod history_vm;
mod number_wheel;
mod overlay;
mod program_vm;
mod swipe;
mod time_fmt;
mod tip_scheduler;
mod workout_vm;

pub use chat_vm::{
    CONNECTION_REPLY, ChatBubbleVm, ChatFailure, ChatThread, ChatTicket, ERROR_REPLY,
};
pub use history_vm::{HistoryCardVm, HistoryHeaderVm, map_history_cards, map_history_header};
pub use number_wheel::{ITEM_WIDTH, NumberWheel, format_value};
pub use overlay::Overlay;
pub use program_vm::{
    LibraryRowVm, ProgramCardVm, ProgramRowVm, map_library_rows, map_program_card,
};
pub use swipe::SwipeTracker;
pub use time_fmt::{format_countdown, format_datetime, format_day};
pub use tip_scheduler::{TIP_DEBOUNCE_MS, TipScheduler, TipTrigger};
pub use workout_vm::{
    ExerciseCardVm, RestVm, SetRowVm, SummaryVm, WorkoutIntent, WorkoutVm, start_workout,
};
