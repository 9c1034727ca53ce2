//! Quote-aware splitting of a command line into words.
//!
//! The rules follow POSIX shell word splitting without any expansion:
//! single quotes keep everything literally, double quotes keep everything
//! except that a backslash may escape `"` or `\`, and outside of quotes a
//! backslash escapes the following character.

/// Errors that can occur during lexical analysis.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexingError {
    /// A closing quote (single or double) was not found.
    #[error("No closing quotation")]
    UnfinishedQuote,
    /// The line ended right after an escaping backslash.
    #[error("No escaped character")]
    TrailingEscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Start,
    ReadingWord,
    ReadingSingleQuote,
    ReadingDoubleQuote,
}

struct LexingFSM {
    input: Vec<char>,
    pos: usize,
    state: LexingState,
    buffer: String,
    /// Set once a word has begun, so that `''` still yields an empty word.
    in_word: bool,
}

impl LexingFSM {
    fn new(line: &str) -> Self {
        LexingFSM {
            input: line.chars().collect(),
            pos: 0,
            state: LexingState::Start,
            buffer: String::new(),
            in_word: false,
        }
    }

    /// Runs the machine over the whole input and returns the collected words.
    fn make_tokens(&mut self) -> Result<Vec<String>, LexingError> {
        let mut out = Vec::new();

        while let Some(ch) = self.read_char() {
            match self.state {
                LexingState::Start | LexingState::ReadingWord => self.handle_word(ch, &mut out)?,
                LexingState::ReadingSingleQuote => self.handle_single_quote(ch),
                LexingState::ReadingDoubleQuote => self.handle_double_quote(ch)?,
            }
        }

        match self.state {
            LexingState::ReadingSingleQuote | LexingState::ReadingDoubleQuote => {
                return Err(LexingError::UnfinishedQuote);
            }
            _ => {}
        }

        self.finish_word(&mut out);
        Ok(out)
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn handle_word(&mut self, ch: char, out: &mut Vec<String>) -> Result<(), LexingError> {
        match ch {
            c if c.is_whitespace() => {
                self.finish_word(out);
                self.state = LexingState::Start;
            }
            '\'' => {
                self.in_word = true;
                self.state = LexingState::ReadingSingleQuote;
            }
            '"' => {
                self.in_word = true;
                self.state = LexingState::ReadingDoubleQuote;
            }
            '\\' => {
                let escaped = self.read_char().ok_or(LexingError::TrailingEscape)?;
                self.push(escaped);
                self.state = LexingState::ReadingWord;
            }
            c => {
                self.push(c);
                self.state = LexingState::ReadingWord;
            }
        }
        Ok(())
    }

    fn handle_single_quote(&mut self, ch: char) {
        match ch {
            '\'' => self.state = LexingState::ReadingWord,
            c => self.buffer.push(c),
        }
    }

    fn handle_double_quote(&mut self, ch: char) -> Result<(), LexingError> {
        match ch {
            '"' => self.state = LexingState::ReadingWord,
            '\\' => match self.peek_char() {
                Some(next @ ('"' | '\\')) => {
                    self.read_char();
                    self.buffer.push(next);
                }
                Some(_) => self.buffer.push('\\'),
                None => return Err(LexingError::UnfinishedQuote),
            },
            c => self.buffer.push(c),
        }
        Ok(())
    }

    fn push(&mut self, ch: char) {
        self.in_word = true;
        self.buffer.push(ch);
    }

    fn finish_word(&mut self, out: &mut Vec<String>) {
        if self.in_word {
            out.push(std::mem::take(&mut self.buffer));
            self.in_word = false;
        }
    }
}

/// Splits a command line into words.
///
/// The first word is the command name, the rest are its arguments. A line
/// made only of whitespace yields an empty vector.
pub fn split_into_tokens(line: &str) -> Result<Vec<String>, LexingError> {
    let mut lexer = LexingFSM::new(line);
    lexer.make_tokens()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(line: &str) -> Vec<String> {
        split_into_tokens(line).expect("line should split")
    }

    #[test]
    fn test_plain_words() {
        assert_eq!(split("ls  -la\t/tmp "), vec!["ls", "-la", "/tmp"]);
    }

    #[test]
    fn test_empty_line() {
        assert!(split("   ").is_empty());
    }

    #[test]
    fn test_quoted_argument_keeps_spaces() {
        assert_eq!(
            split("touch \"my file.txt\" 'other file'"),
            vec!["touch", "my file.txt", "other file"]
        );
    }

    #[test]
    fn test_single_quotes_are_literal() {
        assert_eq!(split(r#"echo 'a\"b $x'"#), vec!["echo", r#"a\"b $x"#]);
    }

    #[test]
    fn test_double_quote_escapes() {
        assert_eq!(
            split(r#"echo "say \"hi\" \\ \n""#),
            vec!["echo", r#"say "hi" \ \n"#]
        );
    }

    #[test]
    fn test_backslash_outside_quotes() {
        assert_eq!(split(r"cat my\ file"), vec!["cat", "my file"]);
    }

    #[test]
    fn test_adjacent_quotes_join_one_word() {
        assert_eq!(split(r#"a"b c"'d e'f"#), vec![r#"ab cd ef"#]);
    }

    #[test]
    fn test_empty_quotes_produce_empty_word() {
        assert_eq!(split("echo '' \"\""), vec!["echo", "", ""]);
    }

    #[test]
    fn test_unfinished_quotes() {
        assert_eq!(
            split_into_tokens("echo 'oops"),
            Err(LexingError::UnfinishedQuote)
        );
        assert_eq!(
            split_into_tokens("echo \"oops"),
            Err(LexingError::UnfinishedQuote)
        );
    }

    #[test]
    fn test_trailing_escape() {
        assert_eq!(
            split_into_tokens("echo oops\\"),
            Err(LexingError::TrailingEscape)
        );
        assert_eq!(LexingError::TrailingEscape.to_string(), "No escaped character");
    }
}
