use once_cell::sync::Lazy;

use crate::models::{Game, GameId, Rating};

static FALLBACK_GAMES: Lazy<Vec<Game>> = Lazy::new(|| {
    vec![
        game(
            1,
            "Red Light, Green Light (Local)",
            "./index.html",
            "Action",
            "Survive the deadly Squid Game challenge with 10 players competing for survival!",
            4.8,
            None,
            "fas fa-running",
            "Local Game",
            &["squid-game", "survival", "multiplayer"],
        ),
        game(
            2,
            "Squid Game (Red Light, Green Light)",
            "https://aritra6524.github.io/squid-game/",
            "Action",
            "Official Squid Game Red Light, Green Light challenge. Move during green light, freeze during red light!",
            4.7,
            Some("https://images.unsplash.com/photo-1606503153255-59d8b8b3e893?w=300&h=200&fit=crop"),
            "fas fa-traffic-light",
            "Aritra",
            &["squid-game", "netflix", "survival"],
        ),
        game(
            3,
            "Chor Police Dakat Babu",
            "https://aritra6524.github.io/chor-police-dakat-babu/",
            "Action",
            "Traditional Indian chase game! Play as police or thief in this strategic multiplayer experience.",
            4.5,
            Some("https://images.unsplash.com/photo-1568605117036-5fe5e7bab0b7?w=300&h=200&fit=crop"),
            "fas fa-user-ninja",
            "Aritra",
            &["chase", "strategy", "indian"],
        ),
        game(
            4,
            "FPS Shooter Game",
            "https://tamonash10.github.io/fps-shooter/",
            "Action",
            "First-person shooter with realistic graphics and smooth controls. Complete missions and take down enemies!",
            4.6,
            Some("https://images.unsplash.com/photo-1542751371-adc38448a05e?w=300&h=200&fit=crop"),
            "fas fa-crosshairs",
            "Tamonash",
            &["fps", "shooter", "3d"],
        ),
        game(
            5,
            "Dino 3D Game",
            "https://ayandas-official.github.io/dino-3d/",
            "Arcade",
            "Enhanced 3D version of the classic Chrome Dino game! Jump over obstacles in this endless runner.",
            4.4,
            Some("https://images.unsplash.com/photo-1578662996442-48f60103fc96?w=300&h=200&fit=crop"),
            "fas fa-dragon",
            "Ayan Das",
            &["dino", "3d", "endless-runner"],
        ),
    ]
});

/// Built-in catalog used whenever the configured source cannot be loaded.
pub fn fallback_games() -> Vec<Game> {
    FALLBACK_GAMES.clone()
}

#[allow(clippy::too_many_arguments)]
fn game(
    id: u64,
    title: &str,
    url: &str,
    category: &str,
    description: &str,
    rating: f32,
    thumbnail: Option<&str>,
    icon: &str,
    author: &str,
    tags: &[&str],
) -> Game {
    Game {
        id: GameId(id),
        title: title.to_string(),
        url: url.to_string(),
        category: category.to_string(),
        description: description.to_string(),
        rating: Rating::Score(rating),
        thumbnail: thumbnail.map(str::to_string),
        icon: Some(icon.to_string()),
        author: Some(author.to_string()),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
    }
}
