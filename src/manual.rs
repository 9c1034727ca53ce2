use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManualEntry {
    pub description: String,
    pub usage: String,
}

/// Manual pages answered by `man` and `man <command>`.
#[derive(Debug, Clone, Default)]
pub struct Manual {
    entries: Vec<(String, ManualEntry)>,
}

impl Manual {
    pub fn new(entries: Vec<(String, ManualEntry)>) -> Self {
        Self { entries }
    }

    /// Answer a `man` line, or `None` when `input` is not one.
    pub fn query(&self, input: &str) -> Option<String> {
        let mut words = input.split_whitespace();
        if words.next() != Some("man") {
            return None;
        }
        Some(match words.next() {
            None => self.list_all(),
            Some(name) => self.describe(name),
        })
    }

    pub fn list_all(&self) -> String {
        self.entries
            .iter()
            .map(|(name, entry)| {
                format!(
                    "{name}:\n  {}\n  Usage: {}\n",
                    entry.description, entry.usage
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn describe(&self, name: &str) -> String {
        match self.entries.iter().find(|(n, _)| n == name) {
            Some((_, entry)) => format!("{name}:\n{}\nUsage:\n{}", entry.description, entry.usage),
            None => format!("No manual entry for '{name}'"),
        }
    }
}
