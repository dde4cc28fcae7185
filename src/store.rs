use crate::error::{InsertionLogError, Result};

/// One entry of the log. `contents` may span several physical lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    id: Option<String>,
    contents: String,
}

impl Message {
    pub fn new(contents: impl Into<String>, id: Option<&str>) -> Self {
        Self {
            id: id.map(str::to_owned),
            contents: contents.into(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Number of terminal rows this message occupies once printed.
    pub fn line_count(&self) -> usize {
        line_count(&self.contents)
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.contents.split('\n')
    }

    pub(crate) fn push_str(&mut self, extra: &str) {
        self.contents.push_str(extra);
    }

    pub(crate) fn set_contents(&mut self, contents: &str) {
        contents.clone_into(&mut self.contents);
    }
}

pub(crate) fn line_count(text: &str) -> usize {
    1 + text.matches('\n').count()
}

/// Ordered messages, oldest first. Order here is the order rows appear on screen.
#[derive(Debug, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Panics if `index > len`, like [Vec::insert]. Callers derive `index` from a lookup.
    pub fn insert_at(&mut self, index: usize, message: Message) {
        self.messages.insert(index, message);
    }

    /// Ids are not unique, the most recently added match wins.
    pub fn find_index_by_id(&self, id: &str) -> Result<usize> {
        self.messages
            .iter()
            .rposition(|message| message.id() == Some(id))
            .ok_or_else(|| InsertionLogError::MessageNotFound { id: id.to_owned() })
    }

    /// Panics if `index` is out of range. Callers take `index` from [MessageStore::find_index_by_id].
    pub fn message_mut(&mut self, index: usize) -> &mut Message {
        &mut self.messages[index]
    }

    pub fn tail_from(&self, index: usize) -> &[Message] {
        &self.messages[index.min(self.messages.len())..]
    }

    /// The last `count` messages, or all of them if there are fewer.
    pub fn tail(&self, count: usize) -> &[Message] {
        self.tail_from(self.messages.len().saturating_sub(count))
    }

    /// Forgets everything before `index` without touching the terminal.
    pub fn truncate_before(&mut self, index: usize) {
        self.messages.drain(..index.min(self.messages.len()));
    }

    /// Total physical rows of every tracked message.
    pub fn line_count(&self) -> usize {
        self.messages.iter().map(Message::line_count).sum()
    }
}
