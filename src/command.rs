use serde::Serialize;

use crate::error::Result;
use crate::metrics::SystemMetrics;
use crate::session::Session;

/// Sentinel the historic clients look for to clear their display.
pub const CLEAR_SCREEN_MARKER: &str = "__CLEAR_SCREEN__";

/// Prefix of the historic open-editor sentinel, `__OPEN_EDITOR__::<file>::<content>`.
pub const OPEN_EDITOR_MARKER: &str = "__OPEN_EDITOR__";

/// What a command hands back to the caller.
///
/// Side-channel instructions are variants of their own so that front ends
/// match on structure instead of on string prefixes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// Human readable text, possibly spanning several lines.
    Text { text: String },
    /// Ask the client to edit `content` and send it back through `save`.
    OpenEditor { filename: String, content: String },
    /// Ask the client to clear its display.
    ClearScreen,
}

impl Outcome {
    pub fn text(text: impl Into<String>) -> Self {
        Outcome::Text { text: text.into() }
    }

    /// Render the outcome the way older string-only clients expect it.
    pub fn to_legacy_string(&self) -> String {
        match self {
            Outcome::Text { text } => text.clone(),
            Outcome::OpenEditor { filename, content } => {
                format!("{OPEN_EDITOR_MARKER}::{filename}::{content}")
            }
            Outcome::ClearScreen => CLEAR_SCREEN_MARKER.to_string(),
        }
    }
}

/// Everything a handler may touch while it runs.
pub struct Context<'a> {
    pub session: &'a mut Session,
    pub metrics: &'a mut dyn SystemMetrics,
}

/// A built-in command registered by name.
///
/// Implementors receive the arguments that follow the command name.
pub trait Command {
    /// The command name (what the user types).
    fn name(&self) -> &'static str;

    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<Outcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_rendering() {
        let open = Outcome::OpenEditor {
            filename: "notes.txt".into(),
            content: "a::b\n".into(),
        };
        assert_eq!(open.to_legacy_string(), "__OPEN_EDITOR__::notes.txt::a::b\n");
        assert_eq!(Outcome::ClearScreen.to_legacy_string(), "__CLEAR_SCREEN__");
        assert_eq!(Outcome::text("hi").to_legacy_string(), "hi");
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(Outcome::text("x")).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "text", "text": "x"}));
        let json = serde_json::to_value(Outcome::ClearScreen).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "clear_screen"}));
    }
}
