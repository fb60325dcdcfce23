//! Bounded conversation history.
//!
//! The buffer keeps turns in insertion order and, on `trim`, drops the
//! oldest non-system turns until it is back within capacity. The system
//! turn is pinned: it is never evicted, even when that leaves the buffer
//! above capacity.

use thiserror::Error;
use tracing::debug;

use crate::{Role, Turn};

/// Number of turns kept when no capacity is configured.
pub const DEFAULT_CAPACITY: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    #[error("Invalid history capacity {capacity}: must be at least 1")]
    InvalidConfig { capacity: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationBuffer {
    turns: Vec<Turn>,
    capacity: usize,
}

impl ConversationBuffer {
    /// Create a buffer, seeded with a system turn when `system_prompt` is non-empty.
    pub fn new(system_prompt: Option<&str>, capacity: usize) -> Result<Self, BufferError> {
        if capacity < 1 {
            return Err(BufferError::InvalidConfig { capacity });
        }

        Ok(Self {
            turns: seed_turns(system_prompt),
            capacity,
        })
    }

    #[must_use]
    pub fn with_default_capacity(system_prompt: Option<&str>) -> Self {
        Self {
            turns: seed_turns(system_prompt),
            capacity: DEFAULT_CAPACITY,
        }
    }

    pub fn append_human(&mut self, content: impl Into<String>) {
        self.turns.push(Turn::human(content));
    }

    pub fn append_assistant(&mut self, content: impl Into<String>) {
        self.turns.push(Turn::assistant(content));
    }

    /// Current turns in insertion order, ready to send to a provider.
    #[must_use]
    pub fn snapshot(&self) -> &[Turn] {
        &self.turns
    }

    /// Evict the oldest non-system turns until the buffer fits its capacity.
    ///
    /// Returns the number of evicted turns. Calling it again without an
    /// intervening append is a no-op.
    pub fn trim(&mut self) -> usize {
        let excess = self.turns.len().saturating_sub(self.capacity);
        if excess == 0 {
            return 0;
        }

        let mut remaining = excess;
        let before = self.turns.len();
        self.turns.retain(|turn| {
            if remaining > 0 && turn.role != Role::System {
                remaining -= 1;
                false
            } else {
                true
            }
        });

        let evicted = before - self.turns.len();
        debug!(
            "Trimmed {evicted} turns, {} remain (capacity {})",
            self.turns.len(),
            self.capacity
        );
        evicted
    }

    #[must_use]
    pub fn system_prompt(&self) -> Option<&str> {
        self.turns
            .first()
            .filter(|turn| turn.role == Role::System)
            .map(|turn| turn.content.as_str())
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

fn seed_turns(system_prompt: Option<&str>) -> Vec<Turn> {
    system_prompt
        .filter(|prompt| !prompt.is_empty())
        .map(|prompt| vec![Turn::system(prompt)])
        .unwrap_or_default()
}
