use crate::core::conversation::ConversationStore;
use crate::core::message::Message;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Success { text: String },
    Failure { reason: String },
}

impl SendOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SendOutcome::Success { .. })
    }
}

/// Folds streamed fragments into the MODEL placeholder at the tail of the
/// conversation.
///
/// Between [`StreamAccumulator::begin`] and `complete`/`fail` the last two
/// conversation entries are the USER turn and its placeholder; nothing else
/// may append in that window.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    accumulated: String,
}

impl StreamAccumulator {
    /// Appends the USER turn and an empty MODEL placeholder.
    pub fn begin(conversation: &mut ConversationStore, user_text: &str) -> Self {
        conversation.append(Message::user(user_text));
        conversation.append(Message::model(""));
        Self::default()
    }

    pub fn apply_fragment(&mut self, conversation: &mut ConversationStore, fragment: &str) {
        if fragment.is_empty() {
            return;
        }
        self.accumulated.push_str(fragment);
        conversation.replace_last(self.accumulated.clone());
    }

    pub fn text(&self) -> &str {
        &self.accumulated
    }

    pub fn complete(self) -> SendOutcome {
        SendOutcome::Success {
            text: self.accumulated,
        }
    }

    /// Removes the placeholder; the USER turn stays.
    pub fn fail(self, conversation: &mut ConversationStore, reason: impl Into<String>) -> SendOutcome {
        if conversation.last().is_some_and(Message::is_model) {
            conversation.drop_last();
        }
        SendOutcome::Failure {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Role;

    fn seeded() -> ConversationStore {
        let mut conversation = ConversationStore::new();
        conversation.append(Message::model("greeting"));
        conversation
    }

    #[test]
    fn accumulator_overwrites_placeholder_with_running_total() {
        let mut conversation = ConversationStore::new();
        let mut accumulator = StreamAccumulator::begin(&mut conversation, "q");
        assert_eq!(conversation.last(), Some(&Message::model("")));

        accumulator.apply_fragment(&mut conversation, "Hi");
        assert_eq!(conversation.last(), Some(&Message::model("Hi")));
        accumulator.apply_fragment(&mut conversation, " there");
        assert_eq!(conversation.last(), Some(&Message::model("Hi there")));
        assert_eq!(conversation.len(), 2);
    }

    #[test]
    fn complete_reports_the_concatenated_text() {
        let mut conversation = seeded();
        let mut accumulator = StreamAccumulator::begin(&mut conversation, "hello");
        for fragment in ["Hi", "", " there", "!"] {
            accumulator.apply_fragment(&mut conversation, fragment);
        }

        assert_eq!(
            accumulator.complete(),
            SendOutcome::Success {
                text: "Hi there!".into()
            }
        );
        assert_eq!(conversation.len(), 3);
        assert_eq!(conversation.all()[2], Message::model("Hi there!"));
    }

    #[test]
    fn fail_drops_the_partial_reply_and_keeps_the_user_turn() {
        let mut conversation = seeded();
        let mut accumulator = StreamAccumulator::begin(&mut conversation, "hello");
        accumulator.apply_fragment(&mut conversation, "Hi");

        let outcome = accumulator.fail(&mut conversation, "boom");

        assert!(matches!(outcome, SendOutcome::Failure { ref reason } if reason == "boom"));
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.last().map(|m| m.role), Some(Role::User));
    }
}
