use dreppy_core::model::ExerciseId;
use services::ai::{ChatMessage, ChatRole};
use services::chat::ExerciseContext;

/// Bubble shown when the assistant endpoint answered with an error.
pub const ERROR_REPLY: &str = "Sorry, I encountered an error. Please try again.";
/// Bubble shown when the assistant could not be reached at all.
pub const CONNECTION_REPLY: &str = "Sorry, I could not connect. Please check your connection.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatFailure {
    Upstream,
    Connection,
}

impl ChatFailure {
    #[must_use]
    pub fn bubble(self) -> &'static str {
        match self {
            ChatFailure::Upstream => ERROR_REPLY,
            ChatFailure::Connection => CONNECTION_REPLY,
        }
    }
}

/// Everything needed to send one chat turn, tagged with the exercise it
/// was asked about.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTicket {
    pub tag: u64,
    pub exercise: Option<ExerciseId>,
    pub messages: Vec<ChatMessage>,
    pub context: Option<ExerciseContext>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatBubbleVm {
    pub from_user: bool,
    pub text: String,
}

/// Conversation shown in the chat sheet.
#[derive(Debug, Clone, Default)]
pub struct ChatThread {
    messages: Vec<ChatMessage>,
    input: String,
    loading: bool,
    sequence: u64,
}

impl ChatThread {
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn can_send(&self) -> bool {
        !self.loading && !self.input.trim().is_empty()
    }

    /// Move the input into the thread and hand out the request to send.
    pub fn submit(
        &mut self,
        exercise: Option<ExerciseId>,
        context: Option<ExerciseContext>,
    ) -> Option<ChatTicket> {
        if !self.can_send() {
            return None;
        }
        let text = std::mem::take(&mut self.input).trim().to_owned();
        self.messages.push(ChatMessage::user(text));
        self.loading = true;
        self.sequence += 1;
        Some(ChatTicket {
            tag: self.sequence,
            exercise,
            messages: self.messages.clone(),
            context,
        })
    }

    /// Append the assistant's answer, or an error bubble. Replies to an
    /// outdated ticket are dropped; so are replies about an exercise that
    /// is no longer `active`, which also ends the wait.
    pub fn resolve(
        &mut self,
        ticket: &ChatTicket,
        active: Option<ExerciseId>,
        reply: Result<String, ChatFailure>,
    ) -> bool {
        if ticket.tag != self.sequence || !self.loading {
            return false;
        }
        if ticket.exercise != active {
            self.loading = false;
            return false;
        }
        let text = reply.unwrap_or_else(|failure| failure.bubble().to_owned());
        self.messages.push(ChatMessage::assistant(text));
        self.loading = false;
        true
    }

    /// Forget the conversation; any reply still in flight becomes stale.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.input.clear();
        self.loading = false;
        self.sequence += 1;
    }

    #[must_use]
    pub fn bubbles(&self) -> Vec<ChatBubbleVm> {
        self.messages
            .iter()
            .filter(|m| m.role != ChatRole::System)
            .map(|m| ChatBubbleVm {
                from_user: m.role == ChatRole::User,
                text: m.content.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_moves_input_into_the_thread() {
        let mut thread = ChatThread::default();
        thread.set_input("  how deep should I squat?  ");
        let ticket = thread.submit(None, None).unwrap();
        assert_eq!(ticket.messages.len(), 1);
        assert_eq!(ticket.messages[0].content, "how deep should I squat?");
        assert!(thread.input().is_empty());
        assert!(thread.is_loading());

        thread.set_input("another");
        assert!(thread.submit(None, None).is_none());
    }

    #[test]
    fn blank_input_is_not_sent() {
        let mut thread = ChatThread::default();
        thread.set_input("   ");
        assert!(thread.submit(None, None).is_none());
    }

    #[test]
    fn failures_render_as_assistant_bubbles() {
        let mut thread = ChatThread::default();
        thread.set_input("hi");
        let ticket = thread.submit(None, None).unwrap();
        assert!(thread.resolve(&ticket, None, Err(ChatFailure::Upstream)));
        let bubbles = thread.bubbles();
        assert_eq!(bubbles.len(), 2);
        assert!(!bubbles[1].from_user);
        assert_eq!(bubbles[1].text, ERROR_REPLY);
        assert!(!thread.is_loading());
    }

    #[test]
    fn replies_about_another_exercise_are_dropped() {
        let mut thread = ChatThread::default();
        thread.set_input("is my elbow position ok?");
        let ticket = thread.submit(Some(ExerciseId::new(1)), None).unwrap();
        assert_eq!(ticket.exercise, Some(ExerciseId::new(1)));

        assert!(!thread.resolve(&ticket, Some(ExerciseId::new(2)), Ok("Tuck them".into())));
        assert_eq!(thread.messages().len(), 1);
        assert!(!thread.is_loading());
    }

    #[test]
    fn replies_after_clear_are_dropped() {
        let mut thread = ChatThread::default();
        thread.set_input("hi");
        let ticket = thread.submit(None, None).unwrap();
        thread.clear();
        assert!(!thread.resolve(&ticket, None, Ok("late".into())));
        assert!(thread.messages().is_empty());
    }
}
