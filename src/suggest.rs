use std::collections::BTreeSet;

/// Most suggestions returned for one prefix.
pub const MAX_SUGGESTIONS: usize = 10;

/// Prefix lookup over every known command string.
///
/// Categories only matter for loading; candidates are merged and
/// de-duplicated up front.
#[derive(Debug, Clone, Default)]
pub struct SuggestionIndex {
    candidates: BTreeSet<String>,
}

impl SuggestionIndex {
    pub fn new(categories: Vec<(String, Vec<String>)>) -> Self {
        let candidates = categories
            .into_iter()
            .flat_map(|(_, commands)| commands)
            .collect();
        Self { candidates }
    }

    /// Sorted candidates starting with `typed`, ignoring case, at most
    /// [`MAX_SUGGESTIONS`]. An empty prefix suggests nothing.
    pub fn suggest(&self, typed: &str) -> Vec<String> {
        let prefix = typed.trim().to_lowercase();
        if prefix.is_empty() {
            return Vec::new();
        }
        self.candidates
            .iter()
            .filter(|c| c.to_lowercase().starts_with(&prefix))
            .take(MAX_SUGGESTIONS)
            .cloned()
            .collect()
    }
}
