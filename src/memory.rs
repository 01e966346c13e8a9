use std::collections::VecDeque;
use std::fmt;

use crate::error::ConfigurationError;

/// One completed request/response round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    user: String,
    bot: String,
}

impl Exchange {
    /// Build an exchange from untrimmed text.
    pub fn new(user: impl AsRef<str>, bot: impl AsRef<str>) -> Self {
        Self {
            user: user.as_ref().trim().to_string(),
            bot: bot.as_ref().trim().to_string(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn bot(&self) -> &str {
        &self.bot
    }
}

/// Bounded window of the most recent [`Exchange`]s, oldest first.
///
/// When a new exchange would exceed `max_turns`, the oldest ones are evicted.
///
/// ```
/// use banter::TurnMemory;
///
/// let mut memory = TurnMemory::new(1).unwrap();
/// memory.record("a", "b");
/// memory.record("c", "d");
/// assert_eq!(memory.render_prompt("e"), "User: c\nBot: d\nUser: e\nBot:");
/// ```
#[derive(Debug, Clone)]
pub struct TurnMemory {
    exchanges: VecDeque<Exchange>,
    max_turns: usize,
}

impl TurnMemory {
    /// Create an empty window holding at most `max_turns` exchanges.
    pub fn new(max_turns: i64) -> Result<Self, ConfigurationError> {
        let cap = usize::try_from(max_turns)
            .ok()
            .filter(|n| *n >= 1)
            .ok_or(ConfigurationError::InvalidMaxTurns { max_turns })?;
        Ok(Self {
            exchanges: VecDeque::with_capacity(cap),
            max_turns: cap,
        })
    }

    /// Append a trimmed exchange, evicting from the front past capacity.
    pub fn record(&mut self, user: impl AsRef<str>, bot: impl AsRef<str>) {
        self.exchanges.push_back(Exchange::new(user, bot));
        while self.exchanges.len() > self.max_turns {
            self.exchanges.pop_front();
        }
    }

    /// Render the stored dialogue followed by `input` and an open `Bot:` cue.
    pub fn render_prompt(&self, input: &str) -> String {
        let mut lines = Vec::with_capacity(self.exchanges.len() * 2 + 2);
        for ex in &self.exchanges {
            lines.push(format!("User: {}", ex.user));
            lines.push(format!("Bot: {}", ex.bot));
        }
        lines.push(format!("User: {}", input.trim()));
        lines.push("Bot:".to_string());
        lines.join("\n")
    }

    pub fn clear(&mut self) {
        self.exchanges.clear();
    }

    /// Number of stored exchanges.
    pub fn size(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Stored exchanges, oldest first.
    pub fn exchanges(&self) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter()
    }
}

impl fmt::Display for TurnMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<TurnMemory turns={}/{}>", self.size(), self.max_turns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_capacity() {
        assert_eq!(
            TurnMemory::new(0).unwrap_err(),
            ConfigurationError::InvalidMaxTurns { max_turns: 0 }
        );
        assert_eq!(
            TurnMemory::new(-1).unwrap_err(),
            ConfigurationError::InvalidMaxTurns { max_turns: -1 }
        );
        assert!(TurnMemory::new(1).is_ok());
    }

    #[test]
    fn record_trims_both_sides() {
        let mut memory = TurnMemory::new(2).unwrap();
        memory.record("  hi \n", "\thello ");
        let ex = memory.exchanges().next().unwrap();
        assert_eq!(ex.user(), "hi");
        assert_eq!(ex.bot(), "hello");
    }

    #[test]
    fn evicts_oldest_first() {
        let mut memory = TurnMemory::new(2).unwrap();
        memory.record("1", "a");
        memory.record("2", "b");
        memory.record("3", "c");
        let users: Vec<_> = memory.exchanges().map(|e| e.user().to_string()).collect();
        assert_eq!(users, vec!["2", "3"]);
    }

    #[test]
    fn empty_window_renders_only_cue() {
        let memory = TurnMemory::new(3).unwrap();
        assert_eq!(memory.render_prompt("hi"), "User: hi\nBot:");
    }

    #[test]
    fn renders_history_then_input() {
        let mut memory = TurnMemory::new(3).unwrap();
        memory.record("a", "b");
        assert_eq!(memory.render_prompt("  c "), "User: a\nBot: b\nUser: c\nBot:");
    }

    #[test]
    fn clear_empties_window() {
        let mut memory = TurnMemory::new(3).unwrap();
        memory.record("a", "b");
        memory.clear();
        assert_eq!(memory.size(), 0);
        assert!(memory.is_empty());
    }

    #[test]
    fn display_shows_usage() {
        let mut memory = TurnMemory::new(4).unwrap();
        memory.record("a", "b");
        assert_eq!(memory.to_string(), "<TurnMemory turns=1/4>");
    }
}
