//! Catalog sources, the built-in fallback list and catalog assembly.

mod fallback;
/// Catalog document providers.
pub mod source;

use std::collections::HashSet;

use tracing::warn;

use crate::models::{default_categories, CatalogDocument, Game, GameEntry, GameId};

pub use fallback::fallback_games;
pub use source::{
    resolve_game_url, AnySource, CatalogLocation, CatalogSource, FileCatalogSource,
    HttpCatalogSource,
};

/// Hands out identifiers for games that need one. Identifiers only grow, so
/// rapid successive adds never collide.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    /// Make sure future identifiers stay above `id`. Identifiers beyond
    /// `GameId::MAX` are never kept, so they are not observed either.
    pub fn observe(&mut self, id: GameId) {
        if id <= GameId::MAX {
            self.next = self.next.max(id.0.saturating_add(1));
        }
    }

    /// Next fresh identifier.
    pub fn allocate(&mut self) -> GameId {
        let id = GameId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// Result of assembling the working catalog.
#[derive(Debug, Clone)]
pub struct AssembledCatalog {
    /// Base games followed by user-added games.
    pub games: Vec<Game>,
    /// User-added games, newest first, with identifiers settled.
    pub custom: Vec<Game>,
    /// Category names.
    pub categories: Vec<String>,
    /// Whether identifiers of user-added games had to be (re)assigned.
    pub custom_changed: bool,
    /// Allocator positioned above every identifier in `games`.
    pub ids: IdAllocator,
    /// Whether the fallback list replaced the source document.
    pub used_fallback: bool,
}

/// Merge a source document (or the fallback list when `document` is `None`)
/// with the stored user-added games.
pub fn assemble(
    document: Option<CatalogDocument>,
    stored_custom: Vec<GameEntry>,
) -> AssembledCatalog {
    let used_fallback = document.is_none();
    let (base_entries, categories) = match document {
        Some(document) => (
            document.games,
            document.categories.unwrap_or_else(default_categories),
        ),
        None => (
            fallback_games().into_iter().map(GameEntry::from).collect(),
            default_categories(),
        ),
    };

    // Base numbering depends on the base catalog alone, so an id-less entry
    // keeps its id across sessions whatever the user has added.
    let mut ids = IdAllocator::default();
    for id in base_entries.iter().filter_map(|entry| usable(entry.id)) {
        ids.observe(id);
    }

    let mut seen = HashSet::new();
    let mut games = Vec::with_capacity(base_entries.len() + stored_custom.len());
    for GameEntry { id, fields } in base_entries {
        let mut game = fields.with_id(usable(id).unwrap_or_else(|| ids.allocate()));
        if !seen.insert(game.id) {
            let fresh = ids.allocate();
            warn!(duplicate = %game.id, assigned = %fresh, title = %game.title, "Duplicate catalog id");
            game.id = fresh;
            seen.insert(fresh);
        }
        games.push(game);
    }

    for id in stored_custom.iter().filter_map(|entry| usable(entry.id)) {
        ids.observe(id);
    }

    let mut custom_changed = false;
    let mut custom = Vec::with_capacity(stored_custom.len());
    for GameEntry { id, fields } in stored_custom {
        let id = match usable(id) {
            Some(id) if !seen.contains(&id) => id,
            Some(id) => {
                let fresh = ids.allocate();
                warn!(duplicate = %id, assigned = %fresh, "User-added game collided with catalog id");
                custom_changed = true;
                fresh
            }
            None => {
                custom_changed = true;
                ids.allocate()
            }
        };
        seen.insert(id);
        custom.push(fields.with_id(id));
    }
    games.extend(custom.iter().cloned());

    AssembledCatalog {
        games,
        custom,
        categories,
        custom_changed,
        ids,
        used_fallback,
    }
}

fn usable(id: Option<GameId>) -> Option<GameId> {
    id.filter(|id| *id <= GameId::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entries(value: serde_json::Value) -> Vec<GameEntry> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn fallback_has_five_games() {
        let assembled = assemble(None, Vec::new());
        assert!(assembled.used_fallback);
        assert_eq!(assembled.games, fallback_games());
        assert_eq!(assembled.games.len(), 5);
        assert_eq!(assembled.categories.len(), 6);
    }

    #[test]
    fn assigns_missing_and_colliding_ids() {
        let document = CatalogDocument {
            games: entries(json!([
                {"id": 1, "title": "A", "url": "a", "category": "Action"},
                {"title": "B", "url": "b", "category": "Puzzle"}
            ])),
            categories: None,
        };
        let custom = entries(json!([
            {"id": 1, "title": "Mine", "url": "m", "category": "Arcade"},
            {"title": "Other", "url": "o", "category": "Arcade"}
        ]));
        let mut assembled = assemble(Some(document), custom);
        assert!(assembled.custom_changed);
        let ids: HashSet<_> = assembled.games.iter().map(|game| game.id).collect();
        assert_eq!(ids.len(), 4);
        assert_eq!(assembled.games[0].id, GameId(1));
        assert_eq!(assembled.games[2].title, "Mine");
        assert_ne!(assembled.games[2].id, GameId(1));

        let next = assembled.ids.allocate();
        assert!(!ids.contains(&next));
    }

    #[test]
    fn base_numbering_ignores_user_added_ids() {
        let base = || CatalogDocument {
            games: entries(json!([
                {"id": 1, "title": "A", "url": "a"},
                {"title": "B", "url": "b"}
            ])),
            categories: None,
        };
        let alone = assemble(Some(base()), Vec::new());
        let with_custom = assemble(
            Some(base()),
            entries(json!([{"id": 40, "title": "Mine", "url": "m"}])),
        );
        assert_eq!(alone.games[1].id, GameId(2));
        assert_eq!(with_custom.games[1].id, GameId(2));
        assert_eq!(with_custom.custom[0].id, GameId(40));
        assert!(!with_custom.custom_changed);

        let mut ids = with_custom.ids;
        assert_eq!(ids.allocate(), GameId(41));
    }

    #[test]
    fn out_of_range_ids_are_reassigned() {
        let mut huge = entries(json!([{"title": "Huge", "url": "h"}]));
        huge[0].id = Some(GameId(u64::MAX));
        let document = CatalogDocument {
            games: huge,
            categories: None,
        };
        let mut custom = entries(json!([{"title": "Mine", "url": "m"}]));
        custom[0].id = Some(GameId(u64::MAX));

        let mut assembled = assemble(Some(document), custom);
        assert_eq!(assembled.games[0].id, GameId(1));
        assert_eq!(assembled.custom[0].id, GameId(2));
        assert!(assembled.custom_changed);
        assert_eq!(assembled.ids.allocate(), GameId(3));
    }

    #[test]
    fn allocator_saturates_instead_of_wrapping() {
        let mut ids = IdAllocator::default();
        ids.observe(GameId(u64::MAX));
        assert_eq!(ids.allocate(), GameId(1));

        ids.observe(GameId::MAX);
        assert_eq!(ids.allocate(), GameId(GameId::MAX.0 + 1));
        assert!(ids.allocate().0 > GameId::MAX.0);
    }

    #[test]
    fn allocator_is_monotonic() {
        let mut ids = assemble(None, Vec::new()).ids;
        let first = ids.allocate();
        let second = ids.allocate();
        assert_eq!(first, GameId(6));
        assert!(second > first);
    }
}
