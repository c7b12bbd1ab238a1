#![allow(missing_docs)]

//! Render target port and the view models the controller hands to it.

use serde::{Deserialize, Serialize};

use crate::{
    models::{Game, GameId, Rating},
    player::PlayerGate,
};

/// Content section of the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Full catalog.
    Games,
    /// Favorited games.
    Favorites,
    /// Recently played games.
    Recent,
}

impl Section {
    /// All sections in navigation order.
    pub const ALL: [Section; 3] = [Section::Games, Section::Favorites, Section::Recent];

    /// Navigation label.
    pub fn label(&self) -> &'static str {
        match self {
            Section::Games => "Games",
            Section::Favorites => "Favorites",
            Section::Recent => "Recent",
        }
    }

    /// Empty-state shown when the section has nothing to list.
    pub fn empty_state(&self) -> EmptyState {
        match self {
            Section::Games => EmptyState::NoGames,
            Section::Favorites => EmptyState::NoFavorites,
            Section::Recent => EmptyState::NoRecent,
        }
    }
}

/// Card layout of the games section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Multi-column cards.
    #[default]
    Grid,
    /// One row per game.
    List,
}

/// Colour theme of the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeChoice {
    /// Dark palette.
    #[default]
    Dark,
    /// Light palette.
    Light,
}

impl ThemeChoice {
    /// The other theme.
    pub fn toggled(self) -> Self {
        match self {
            ThemeChoice::Dark => ThemeChoice::Light,
            ThemeChoice::Light => ThemeChoice::Dark,
        }
    }
}

/// Message shown in place of an empty section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// Catalog (or filter result) is empty.
    NoGames,
    /// Nothing favorited.
    NoFavorites,
    /// Nothing played yet.
    NoRecent,
}

impl EmptyState {
    /// User-facing text.
    pub fn message(&self) -> &'static str {
        match self {
            EmptyState::NoGames => "No games found in this section.",
            EmptyState::NoFavorites => "No favorite games yet. Star some games to see them here!",
            EmptyState::NoRecent => "No recent games. Start playing to see your history!",
        }
    }
}

/// Compact card for one game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameCard {
    pub id: GameId,
    pub title: String,
    pub category: String,
    pub icon: String,
    pub thumbnail: Option<String>,
    pub rating: Rating,
    pub is_favorite: bool,
}

impl GameCard {
    /// Card for `game` with the given favorite state.
    pub fn new(game: &Game, is_favorite: bool) -> Self {
        Self {
            id: game.id,
            title: game.title.clone(),
            category: game.category.clone(),
            icon: game.icon_name().to_string(),
            thumbnail: game.thumbnail.clone(),
            rating: game.rating,
            is_favorite,
        }
    }
}

/// Content of one section.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionView {
    /// Cards in display order.
    Cards(Vec<GameCard>),
    /// Nothing to show.
    Empty(EmptyState),
}

impl SectionView {
    /// Cards listed, empty for the empty state.
    pub fn cards(&self) -> &[GameCard] {
        match self {
            SectionView::Cards(cards) => cards,
            SectionView::Empty(_) => &[],
        }
    }
}

/// Featured slides shown above the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CarouselView {
    pub slides: Vec<Game>,
    pub index: usize,
    pub paused: bool,
}

/// Detail panel for one game.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub game: Game,
    pub is_favorite: bool,
}

/// Active-play panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub game: Game,
    /// Address handed to the player.
    pub url: String,
    pub is_favorite: bool,
    pub gate: PlayerGate,
    /// Last score reported by the running game.
    pub last_score: Option<f64>,
}

/// Transient user-facing notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Informational message.
    Info(String),
    /// Something went wrong but the portal carried on.
    Warning(String),
}

/// Output surface driven exclusively by the catalog controller.
pub trait RenderTarget {
    /// Categories offered by the add-game form.
    fn set_categories(&mut self, categories: &[String]);
    /// Replace the content of one section.
    fn render_section(&mut self, section: Section, view: SectionView);
    /// Show the featured carousel, or hide it with `None`.
    fn render_carousel(&mut self, carousel: Option<CarouselView>);
    /// Mark the visible section.
    fn set_active_section(&mut self, section: Section);
    /// Switch the games layout.
    fn set_view_mode(&mut self, mode: ViewMode);
    /// Open, refresh or close (`None`) the detail panel.
    fn show_detail(&mut self, detail: Option<DetailView>);
    /// Open, refresh or close (`None`) the active-play panel.
    fn show_player(&mut self, player: Option<PlayerView>);
    /// Open or close the add-game form.
    fn show_add_form(&mut self, open: bool);
    /// Apply a colour theme.
    fn set_theme(&mut self, theme: ThemeChoice);
    /// Report something to the user.
    fn notify(&mut self, notice: Notice);
}
