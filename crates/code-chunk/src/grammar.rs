//! Process-wide cache of loaded tree-sitter grammars.
//!
//! Populated lazily on first use per language. Clearing it never affects
//! parses already in flight: they hold their own handle to the grammar.

use crate::language::Language;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

static GRAMMARS: Lazy<RwLock<HashMap<Language, tree_sitter::Language>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Get the grammar for `language`, loading it on first use
pub(crate) fn grammar_for(language: Language) -> tree_sitter::Language {
    {
        let cache = GRAMMARS.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(grammar) = cache.get(&language) {
            return grammar.clone();
        }
    }

    let mut cache = GRAMMARS.write().unwrap_or_else(PoisonError::into_inner);
    // Another thread may have loaded it between the two locks.
    cache
        .entry(language)
        .or_insert_with(|| {
            log::debug!("Loading {language} grammar");
            language.load_grammar()
        })
        .clone()
}

/// Drop every cached grammar; the next parse reloads on demand
pub fn clear_grammar_cache() {
    GRAMMARS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .clear();
}

/// Number of grammars currently cached
pub fn cached_grammar_count() -> usize {
    GRAMMARS.read().unwrap_or_else(PoisonError::into_inner).len()
}
