use crate::core::message::Message;

/// Ordered transcript of the current session.
///
/// Append-only, except for the tail: the in-flight model reply may be
/// overwritten with [`ConversationStore::replace_last`] or removed with
/// [`ConversationStore::drop_last`]. Role ordering is not checked here; the
/// stream accumulator and the reducer keep the USER/MODEL pairing intact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationStore {
    messages: Vec<Message>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Overwrites the text of the last message. Returns `false` when the
    /// transcript is empty.
    pub fn replace_last(&mut self, text: impl Into<String>) -> bool {
        match self.messages.last_mut() {
            Some(last) => {
                last.text = text.into();
                true
            }
            None => false,
        }
    }

    pub fn drop_last(&mut self) -> Option<Message> {
        self.messages.pop()
    }

    /// Read-only view in chronological order.
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Starts a fresh transcript holding only `greeting`.
    pub fn reset_with(&mut self, greeting: Message) {
        self.messages.clear();
        self.messages.push(greeting);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Role;

    #[test]
    fn replace_last_only_touches_the_tail() {
        let mut store = ConversationStore::new();
        store.append(Message::user("hello"));
        store.append(Message::model(""));

        assert!(store.replace_last("Hi"));
        assert!(store.replace_last("Hi there"));

        assert_eq!(store.all()[0].text, "hello");
        assert_eq!(store.all()[1].text, "Hi there");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn replace_last_on_empty_store_reports_failure() {
        let mut store = ConversationStore::new();
        assert!(!store.replace_last("nothing"));
        assert!(store.is_empty());
    }

    #[test]
    fn drop_last_returns_removed_message() {
        let mut store = ConversationStore::new();
        store.append(Message::user("hello"));
        store.append(Message::model("partial"));

        let dropped = store.drop_last().expect("tail message");
        assert_eq!(dropped.role, Role::Model);
        assert_eq!(store.last().map(|m| m.role), Some(Role::User));
    }

    #[test]
    fn reset_with_discards_previous_history() {
        let mut store = ConversationStore::new();
        store.append(Message::user("old"));
        store.reset_with(Message::model("greeting"));
        assert_eq!(store.all(), &[Message::model("greeting")]);
    }
}
