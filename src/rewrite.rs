/// Turns free-form phrases into command lines.
///
/// Phrases are scanned in the order they were loaded; the first one found
/// anywhere in the input (ignoring case) replaces the whole input.
#[derive(Debug, Clone, Default)]
pub struct PhraseRewriter {
    phrases: Vec<(String, String)>,
}

impl PhraseRewriter {
    pub fn new(phrases: Vec<(String, String)>) -> Self {
        let phrases = phrases
            .into_iter()
            .map(|(phrase, command)| (phrase.to_lowercase(), command))
            .collect();
        Self { phrases }
    }

    /// The command line replacing `input`, if any phrase matches.
    pub fn rewrite(&self, input: &str) -> Option<&str> {
        let haystack = input.to_lowercase();
        self.phrases
            .iter()
            .find(|(phrase, _)| haystack.contains(phrase.as_str()))
            .map(|(phrase, command)| {
                log::debug!("rewrote {input:?} via {phrase:?} to {command:?}");
                command.as_str()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewriter(pairs: &[(&str, &str)]) -> PhraseRewriter {
        PhraseRewriter::new(
            pairs
                .iter()
                .map(|(p, c)| (p.to_string(), c.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_first_match_in_order_wins() {
        let r = rewriter(&[("memory", "mem"), ("show memory usage", "ps")]);
        assert_eq!(r.rewrite("Show Memory Usage please"), Some("mem"));
    }

    #[test]
    fn test_phrase_case_is_ignored() {
        let r = rewriter(&[("Where Am I", "pwd")]);
        assert_eq!(r.rewrite("where am i?"), Some("pwd"));
    }

    #[test]
    fn test_no_match_and_empty_mapping() {
        let r = rewriter(&[("list files", "ls")]);
        assert_eq!(r.rewrite("cat notes.txt"), None);
        assert_eq!(PhraseRewriter::default().rewrite("list files"), None);
    }
}
