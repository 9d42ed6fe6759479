//! World encyclopedia: titled snippets about places, creatures and history.
//!
//! Titles are matched case-insensitively. The default book is built from the
//! default world, so renaming a location or enemy there renames its entry too.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::game::world::default_world;

/// Most entries a book will hold.
pub const MAX_LORE_ENTRIES: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoreEntry {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoreError {
    #[error("No lore entry titled '{0}'")]
    NotFound(String),

    #[error("The lore book is full ({max} entries)")]
    Full { max: usize },
}

#[derive(Debug, Clone, Default)]
pub struct LoreBook {
    entries: BTreeMap<String, LoreEntry>,
}

fn key(title: &str) -> String {
    title.trim().to_lowercase()
}

impl LoreBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add or replace an entry. Returns the content it replaced, if any.
    pub fn add_lore(&mut self, title: &str, content: &str) -> Result<Option<String>, LoreError> {
        let key = key(title);
        if !self.entries.contains_key(&key) && self.entries.len() >= MAX_LORE_ENTRIES {
            return Err(LoreError::Full {
                max: MAX_LORE_ENTRIES,
            });
        }
        let entry = LoreEntry {
            title: title.trim().to_string(),
            content: content.to_string(),
        };
        Ok(self.entries.insert(key, entry).map(|old| old.content))
    }

    pub fn get_lore(&self, title: &str) -> Result<&LoreEntry, LoreError> {
        self.entries
            .get(&key(title))
            .ok_or_else(|| LoreError::NotFound(title.trim().to_string()))
    }

    /// Entries whose title or content contains `keyword`, ignoring case, in
    /// title order.
    pub fn query_lore(&self, keyword: &str) -> Vec<&LoreEntry> {
        let needle = keyword.to_lowercase();
        self.entries
            .values()
            .filter(|e| {
                e.title.to_lowercase().contains(&needle)
                    || e.content.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &LoreEntry> {
        self.entries.values()
    }
}

/// Entries for every location and enemy in the default world, plus a little
/// local history.
pub fn default_lore() -> LoreBook {
    let mut book = LoreBook::new();
    let mut add = |title: &str, content: &str| {
        book.entries.insert(
            key(title),
            LoreEntry {
                title: title.to_string(),
                content: content.to_string(),
            },
        );
    };

    for location in default_world().values() {
        add(&location.name, &location.description);
        for enemy in &location.enemies {
            add(&enemy.name, &enemy.description);
        }
    }
    add(
        "The Goblin Raids",
        "Three winters ago goblins came down the forest road and burned the \
mill. The town has kept a watch on the treeline ever since.",
    );
    add(
        "The Dry Fountain",
        "The fountain in the town square stopped flowing the night the forest \
troll was first seen. Nobody has managed to restart it.",
    );
    book
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_book_covers_the_world() {
        let book = default_lore();
        for location in default_world().values() {
            assert_eq!(book.get_lore(&location.name).unwrap().content, location.description);
            for enemy in &location.enemies {
                assert!(book.get_lore(&enemy.name).is_ok(), "{}", enemy.name);
            }
        }
    }

    #[test]
    fn titles_ignore_case() {
        let book = default_lore();
        assert_eq!(book.get_lore("giant rat").unwrap().title, "Giant Rat");
        assert_eq!(
            book.get_lore("Unknown Tome"),
            Err(LoreError::NotFound("Unknown Tome".into()))
        );
    }

    #[test]
    fn query_matches_title_or_content() {
        let book = default_lore();
        let titles: Vec<&str> = book
            .query_lore("TROLL")
            .iter()
            .map(|e| e.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Forest Troll", "The Dry Fountain"]);
        assert!(book.query_lore("dragon").is_empty());
    }

    #[test]
    fn add_replaces_and_respects_capacity() {
        let mut book = LoreBook::new();
        assert_eq!(book.add_lore("Moon", "Pale."), Ok(None));
        assert_eq!(book.add_lore("moon", "Silver."), Ok(Some("Pale.".to_string())));
        assert_eq!(book.len(), 1);

        for i in 1..MAX_LORE_ENTRIES {
            book.add_lore(&format!("Entry {}", i), "x").unwrap();
        }
        assert_eq!(
            book.add_lore("One Too Many", "x"),
            Err(LoreError::Full {
                max: MAX_LORE_ENTRIES
            })
        );
        // Replacing an existing title still works when full.
        assert!(book.add_lore("Moon", "Gone.").is_ok());
    }
}
