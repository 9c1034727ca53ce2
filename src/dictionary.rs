//! Loading of the JSON dictionaries that drive rewriting, completion and `man`.

use std::fmt;
use std::fs;
use std::marker::PhantomData;
use std::path::Path;

use anyhow::Context as _;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};

use crate::manual::{Manual, ManualEntry};
use crate::rewrite::PhraseRewriter;
use crate::suggest::SuggestionIndex;

pub const PHRASES_FILE: &str = "nl_to_command.json";
pub const SUGGESTIONS_FILE: &str = "command_suggestions.json";
pub const MANUAL_FILE: &str = "command_manual.json";

/// A JSON object whose entries keep the order they have in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        OrderedMap(Vec::new())
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry()? {
                    entries.push((key, value));
                }
                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }
}

/// Every dictionary the front end needs, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct Dictionaries {
    pub phrases: PhraseRewriter,
    pub suggestions: SuggestionIndex,
    pub manual: Manual,
}

impl Dictionaries {
    /// Load all dictionaries from `dir`.
    ///
    /// A missing file gives an empty dictionary; a file that is not valid
    /// JSON of the expected shape is an error.
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        let phrases: OrderedMap<String> = load_map(&dir.join(PHRASES_FILE))?;
        let suggestions: OrderedMap<Vec<String>> = load_map(&dir.join(SUGGESTIONS_FILE))?;
        let manual: OrderedMap<ManualEntry> = load_map(&dir.join(MANUAL_FILE))?;
        log::info!(
            "loaded {} phrases, {} suggestion categories, {} manual entries from {}",
            phrases.0.len(),
            suggestions.0.len(),
            manual.0.len(),
            dir.display()
        );
        Ok(Self {
            phrases: PhraseRewriter::new(phrases.0),
            suggestions: SuggestionIndex::new(suggestions.0),
            manual: Manual::new(manual.0),
        })
    }
}

fn load_map<V>(path: &Path) -> anyhow::Result<OrderedMap<V>>
where
    V: for<'de> Deserialize<'de>,
{
    if !path.exists() {
        log::warn!("{} not found, using an empty dictionary", path.display());
        return Ok(OrderedMap::default());
    }
    let text =
        fs::read_to_string(path).with_context(|| format!("can't read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("can't parse {}", path.display()))
}
