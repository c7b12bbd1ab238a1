//! Shared domain models.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Icon shown for games that do not carry their own.
pub const DEFAULT_ICON: &str = "fas fa-gamepad";

/// Categories offered when the catalog document does not list any.
pub const DEFAULT_CATEGORIES: [&str; 6] = [
    "Action",
    "Puzzle",
    "Strategy",
    "Arcade",
    "Adventure",
    "Simulation",
];

/// Identifier of a game, unique within the active catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl GameId {
    /// Largest identifier the portal accepts, the biggest integer a
    /// JavaScript number holds exactly.
    pub const MAX: GameId = GameId((1 << 53) - 1);
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Player rating of a game. User-added games start out unrated.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Rating {
    /// Numeric score, conventionally between 0 and 5.
    Score(f32),
    /// No rating yet; persisted as `"N/A"`.
    #[default]
    Unrated,
}

impl Rating {
    /// Label used when displaying the rating.
    pub fn label(&self) -> String {
        match self {
            Rating::Score(score) => format!("{score:.1}"),
            Rating::Unrated => "N/A".to_string(),
        }
    }
}

impl Serialize for Rating {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Rating::Score(score) => serializer.serialize_f32(*score),
            Rating::Unrated => serializer.serialize_str("N/A"),
        }
    }
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value.as_f64() {
            Some(score) => Rating::Score(score as f32),
            None => Rating::Unrated,
        })
    }
}

/// A playable game as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    /// Catalog identifier.
    pub id: GameId,
    /// Display title.
    pub title: String,
    /// Address of the game page, absolute or relative to the catalog.
    pub url: String,
    /// Category label.
    pub category: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Rating, `"N/A"` when unrated.
    #[serde(default)]
    pub rating: Rating,
    /// Optional thumbnail image address.
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Icon identifier (Font Awesome class names in the published catalogs).
    #[serde(default)]
    pub icon: Option<String>,
    /// Author credit.
    #[serde(default)]
    pub author: Option<String>,
    /// Ordered tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Game {
    /// Author credit, or `Unknown`.
    pub fn author_label(&self) -> &str {
        self.author
            .as_deref()
            .filter(|author| !author.is_empty())
            .unwrap_or("Unknown")
    }

    /// Icon identifier, falling back to the generic gamepad icon.
    pub fn icon_name(&self) -> &str {
        self.icon
            .as_deref()
            .filter(|icon| !icon.is_empty())
            .unwrap_or(DEFAULT_ICON)
    }

    /// Case-insensitive match against title, category, author and tags.
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(needle)
            || self.category.to_lowercase().contains(needle)
            || self
                .author
                .as_ref()
                .map(|author| author.to_lowercase().contains(needle))
                .unwrap_or(false)
            || self
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(needle))
    }
}

/// A catalog entry as it appears in a document or in storage, where the
/// identifier may still be missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameEntry {
    /// Identifier, if the document carried a usable one.
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<GameId>,
    /// Remaining game fields.
    #[serde(flatten)]
    pub fields: GameFields,
}

/// Read an identifier, treating anything other than an unsigned integer up
/// to `GameId::MAX` as missing so one bad entry does not reject the
/// whole document.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<GameId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_u64)
        .filter(|id| *id <= GameId::MAX.0)
        .map(GameId))
}

/// Game fields without the identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameFields {
    /// Display title.
    pub title: String,
    /// Game page address.
    pub url: String,
    /// Category label.
    #[serde(default)]
    pub category: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Rating.
    #[serde(default)]
    pub rating: Rating,
    /// Thumbnail address.
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Icon identifier.
    #[serde(default)]
    pub icon: Option<String>,
    /// Author credit.
    #[serde(default)]
    pub author: Option<String>,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl GameFields {
    /// Attach an identifier, producing a full game record.
    pub fn with_id(self, id: GameId) -> Game {
        Game {
            id,
            title: self.title,
            url: self.url,
            category: self.category,
            description: self.description,
            rating: self.rating,
            thumbnail: self.thumbnail,
            icon: self.icon,
            author: self.author,
            tags: self.tags,
        }
    }
}

impl From<Game> for GameEntry {
    fn from(game: Game) -> Self {
        Self {
            id: Some(game.id),
            fields: GameFields {
                title: game.title,
                url: game.url,
                category: game.category,
                description: game.description,
                rating: game.rating,
                thumbnail: game.thumbnail,
                icon: game.icon,
                author: game.author,
                tags: game.tags,
            },
        }
    }
}

/// Document served by a catalog source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// Listed games.
    #[serde(default)]
    pub games: Vec<GameEntry>,
    /// Category names; absent means the default six.
    #[serde(default)]
    pub categories: Option<Vec<String>>,
}

/// Icon used for user-added games of the given category.
pub fn category_icon(category: &str) -> &'static str {
    match category {
        "Action" => "fas fa-fist-raised",
        "Puzzle" => "fas fa-puzzle-piece",
        "Strategy" => "fas fa-chess",
        "Arcade" => "fas fa-gamepad",
        "Adventure" => "fas fa-map",
        "Simulation" => "fas fa-cogs",
        _ => DEFAULT_ICON,
    }
}

/// The default category list as owned strings.
pub fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rating_accepts_numbers_and_labels() {
        let rated: Rating = serde_json::from_value(json!(4.5)).unwrap();
        assert_eq!(rated, Rating::Score(4.5));
        let unrated: Rating = serde_json::from_value(json!("N/A")).unwrap();
        assert_eq!(unrated, Rating::Unrated);
        assert_eq!(serde_json::to_value(Rating::Unrated).unwrap(), json!("N/A"));
    }

    #[test]
    fn entry_without_id_parses() {
        let entry: GameEntry = serde_json::from_value(json!({
            "title": "Dino",
            "url": "https://example.com/dino",
            "category": "Arcade"
        }))
        .unwrap();
        assert!(entry.id.is_none());
        assert_eq!(entry.fields.rating, Rating::Unrated);
        assert!(entry.fields.tags.is_empty());
    }

    #[test]
    fn malformed_ids_count_as_missing() {
        let document: CatalogDocument = serde_json::from_value(json!({
            "games": [
                {"id": "dino-3d", "title": "Dino", "url": "d"},
                {"id": 18446744073709551615u64, "title": "Huge", "url": "h"},
                {"id": -4, "title": "Negative", "url": "n"},
                {"id": 1.5, "title": "Fraction", "url": "f"},
                {"id": null, "title": "Null", "url": "z"},
                {"id": 7, "title": "Seven", "url": "s"}
            ]
        }))
        .unwrap();
        let ids: Vec<_> = document.games.iter().map(|entry| entry.id).collect();
        assert_eq!(ids, vec![None, None, None, None, None, Some(GameId(7))]);
        assert_eq!(document.games[0].fields.title, "Dino");
    }

    #[test]
    fn largest_exact_id_is_kept() {
        let entry: GameEntry = serde_json::from_value(json!({
            "id": GameId::MAX.0,
            "title": "Edge",
            "url": "e"
        }))
        .unwrap();
        assert_eq!(entry.id, Some(GameId::MAX));
    }

    #[test]
    fn labels_fall_back() {
        let game = GameFields {
            title: "T".into(),
            url: "u".into(),
            category: "Action".into(),
            description: String::new(),
            rating: Rating::Unrated,
            thumbnail: None,
            icon: None,
            author: None,
            tags: vec!["Runner".into()],
        }
        .with_id(GameId(3));
        assert_eq!(game.author_label(), "Unknown");
        assert_eq!(game.icon_name(), DEFAULT_ICON);
        assert!(game.matches("runner"));
        assert!(game.matches("act"));
        assert!(!game.matches("puzzle"));
    }
}
