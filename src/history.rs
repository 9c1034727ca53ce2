/// Number of entries shown by the `history` command.
pub const DEFAULT_VIEW: usize = 20;

/// Append-only log of submitted command lines.
///
/// Nothing is ever evicted; readers only get to see the tail.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<String>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.entries.push(line.into());
    }

    /// The `n` most recent entries, oldest first.
    pub fn recent(&self, n: usize) -> &[String] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_returns_tail_oldest_first() {
        let mut h = History::new();
        for i in 0..25 {
            h.push(format!("cmd {i}"));
        }
        let tail = h.recent(DEFAULT_VIEW);
        assert_eq!(tail.len(), 20);
        assert_eq!(tail[0], "cmd 5");
        assert_eq!(tail[19], "cmd 24");
        assert_eq!(h.len(), 25);
    }

    #[test]
    fn test_recent_with_fewer_entries() {
        let mut h = History::new();
        h.push("pwd");
        h.push("pwd");
        assert_eq!(h.recent(DEFAULT_VIEW), ["pwd", "pwd"]);
    }
}
