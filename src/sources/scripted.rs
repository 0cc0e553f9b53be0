//! # ScriptedSource: replays a fixed script.
//!
//! Each `read` returns the next scripted entry. Once the script runs out, the
//! source returns its default message if one was set, or
//! [`SourceError::Exhausted`] otherwise.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::SourceError;
use crate::messages::Message;
use crate::sources::Source;

/// Deterministic source for tests and demos.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    script: Vec<Result<Message, SourceError>>,
    default: Option<Message>,
    cursor: AtomicUsize,
}

impl ScriptedSource {
    /// Replays `messages` in order.
    pub fn new(messages: impl IntoIterator<Item = Message>) -> Self {
        Self::from_results(messages.into_iter().map(Ok))
    }

    /// Replays a script that may contain failures.
    pub fn from_results(script: impl IntoIterator<Item = Result<Message, SourceError>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            default: None,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Message returned forever once the script is exhausted.
    pub fn with_default(mut self, msg: Message) -> Self {
        self.default = Some(msg);
        self
    }

    /// Number of `read` calls so far.
    pub fn read_count(&self) -> usize {
        self.cursor.load(Ordering::Relaxed)
    }
}

impl Source for ScriptedSource {
    type Error = SourceError;

    fn read(&self) -> Result<Message, SourceError> {
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed);
        match self.script.get(idx) {
            Some(entry) => entry.clone(),
            None => self.default.clone().ok_or(SourceError::Exhausted),
        }
    }
}
