//! Profanity Filter
//!
//! Loads per-language banned-word lists once at startup and masks
//! occurrences in display text. Dictionaries are immutable after loading
//! and safe for unsynchronized concurrent reads.
//!
//! Matching currently scans the union of all loaded dictionaries instead
//! of only the dictionary for the resolved language code. That mirrors
//! the shipped behavior; restricting to the room's language is an open
//! product question, so the `language_code` parameter is accepted and
//! logged but does not narrow the search.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

/// Character used to mask banned tokens.
const MASK: char = '*';

/// Display-time profanity filter over startup-loaded dictionaries.
pub struct ProfanityFilter {
    /// Per-language banned token sets, entries lowercased
    dictionaries: HashMap<String, HashSet<String>>,

    /// Union of all dictionaries, precomputed at construction.
    /// Ordered so masking is deterministic.
    merged: Vec<String>,
}

impl ProfanityFilter {
    /// Load dictionaries for the given language codes from `dir`.
    ///
    /// Word lists are plain text files named `bad-words_{lang}.txt`, one
    /// token per line; blank lines and `#` comments are skipped and every
    /// entry is lowercased. A missing or unreadable file yields an empty
    /// set for that language with a logged warning, never an error.
    pub fn load(dir: &Path, languages: &[String]) -> Self {
        let mut dictionaries = HashMap::new();

        for lang in languages {
            let path = dir.join(format!("bad-words_{lang}.txt"));
            let words = match std::fs::read_to_string(&path) {
                Ok(contents) => contents
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty() && !line.starts_with('#'))
                    .map(|line| line.to_lowercase())
                    .collect::<HashSet<String>>(),
                Err(e) => {
                    tracing::warn!(
                        language = %lang,
                        path = %path.display(),
                        error = %e,
                        "Profanity word list unavailable, using empty set"
                    );
                    HashSet::new()
                }
            };

            tracing::info!(language = %lang, words = words.len(), "Profanity dictionary loaded");
            dictionaries.insert(lang.clone(), words);
        }

        Self::from_dictionaries(dictionaries)
    }

    /// Build a filter from in-memory word sets.
    pub fn from_dictionaries(dictionaries: HashMap<String, HashSet<String>>) -> Self {
        let merged: Vec<String> = dictionaries
            .values()
            .flatten()
            .cloned()
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect();

        Self {
            dictionaries,
            merged,
        }
    }

    /// Number of tokens loaded for a language.
    pub fn dictionary_size(&self, language_code: &str) -> usize {
        self.dictionaries
            .get(language_code)
            .map(HashSet::len)
            .unwrap_or(0)
    }

    /// Mask every banned-token occurrence in `text` with `*` runs of the
    /// token's length. Matching is case-insensitive and substring-based,
    /// so tokens are masked even inside longer words. Blank input and an
    /// empty merged dictionary return the input unchanged.
    pub fn filter(&self, text: &str, language_code: &str) -> String {
        if text.trim().is_empty() || self.merged.is_empty() {
            return text.to_string();
        }

        let mut chars: Vec<char> = text.chars().collect();
        for word in &self.merged {
            mask_occurrences(&mut chars, word);
        }

        let filtered: String = chars.into_iter().collect();
        tracing::debug!(
            language_code = %language_code,
            changed = filtered != text,
            "Profanity filter applied"
        );
        filtered
    }
}

/// Replace each case-insensitive occurrence of `word` in `chars` with masks.
fn mask_occurrences(chars: &mut [char], word: &str) {
    let needle: Vec<char> = word.chars().collect();
    if needle.is_empty() || needle.len() > chars.len() {
        return;
    }

    let mut i = 0;
    while i + needle.len() <= chars.len() {
        let matched = chars[i..i + needle.len()]
            .iter()
            .zip(&needle)
            .all(|(c, w)| c.to_lowercase().eq(w.to_lowercase()));

        if matched {
            for c in &mut chars[i..i + needle.len()] {
                *c = MASK;
            }
            i += needle.len();
        } else {
            i += 1;
        }
    }
}
