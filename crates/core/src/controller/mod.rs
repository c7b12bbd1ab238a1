//! The catalog controller: owns the session's game data, mirrors it into the
//! persistence store and drives the render target and the embedded player.


use std::time::{Duration, Instant};

use reqwest::Url;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    carousel::Carousel,
    catalog::{assemble, resolve_game_url, CatalogSource, IdAllocator},
    config::{AppConfig, Features},
    error::{FormError, StoreError},
    messaging::FrameMessage,
    models::{category_icon, Game, GameEntry, GameFields, GameId, Rating},
    player::{EmbeddedPlayer, LoadOutcome, LoadRequest, LoadTicket, PlayerGate, SandboxPolicy},
    render::{
        CarouselView, DetailView, GameCard, Notice, PlayerView, RenderTarget, Section,
        SectionView, ThemeChoice, ViewMode,
    },
    store::{
        read_slot, write_slot, PersistenceStore, CUSTOM_GAMES_KEY, FAVORITES_KEY, RECENT_KEY,
        THEME_KEY,
    },
};

/// Maximum number of games kept in the recent history.
pub const RECENT_LIMIT: usize = 10;

/// Author credited on games added by the user.
pub const COMMUNITY_AUTHOR: &str = "Community";

/// Tunables of the controller.
#[derive(Debug, Clone, Copy)]
pub struct ControllerOptions {
    /// Optional capabilities.
    pub features: Features,
    /// Pause before the player receives a game address.
    pub load_delay: Duration,
    /// Carousel auto-advance interval.
    pub carousel_interval: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            features: Features::default(),
            load_delay: Duration::from_millis(100),
            carousel_interval: crate::carousel::DEFAULT_INTERVAL,
        }
    }
}

impl ControllerOptions {
    /// Options derived from the application config.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            features: config.features,
            load_delay: config.player.load_delay(),
            carousel_interval: config.carousel_interval(),
        }
    }
}

/// Field values of the add-game form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewGame {
    /// Display title, required.
    pub title: String,
    /// Game address, required.
    pub url: String,
    /// Category label.
    pub category: String,
    /// Free-form description.
    pub description: String,
    /// Optional thumbnail address; blank means none.
    pub image: String,
}

/// Summary of a catalog load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// Games in the working catalog.
    pub total: usize,
    /// Whether the built-in list replaced the configured source.
    pub used_fallback: bool,
}

#[derive(Debug, Clone)]
struct ActiveGame {
    game: Game,
    url: String,
    ticket: LoadTicket,
    gate: PlayerGate,
    last_score: Option<f64>,
}

/// Single owner of catalog, favorites and history for the session.
pub struct CatalogController<C, S, R, P> {
    source: C,
    store: S,
    target: R,
    player: P,
    options: ControllerOptions,
    games: Vec<Game>,
    custom: Vec<Game>,
    categories: Vec<String>,
    favorites: Vec<GameId>,
    recent: Vec<Game>,
    ids: IdAllocator,
    base_url: Option<Url>,
    section: Section,
    view_mode: ViewMode,
    filter: String,
    detail: Option<GameId>,
    add_form_open: bool,
    active: Option<ActiveGame>,
    next_ticket: u64,
    carousel: Option<Carousel>,
    theme: ThemeChoice,
}

impl<C, S, R, P> CatalogController<C, S, R, P>
where
    C: CatalogSource,
    S: PersistenceStore,
    R: RenderTarget,
    P: EmbeddedPlayer,
{
    /// Build a controller over injected collaborators. Favorites, history
    /// and theme are read from the store immediately; the catalog is empty
    /// until [`load`](Self::load) runs.
    pub fn new(source: C, store: S, target: R, player: P, options: ControllerOptions) -> Self {
        let favorites: Vec<GameId> = read_slot(&store, FAVORITES_KEY);
        let recent: Vec<Game> = read_slot(&store, RECENT_KEY);
        let theme = if options.features.theme_toggle {
            read_slot(&store, THEME_KEY)
        } else {
            ThemeChoice::default()
        };
        let carousel = options
            .features
            .carousel
            .then(|| Carousel::new(options.carousel_interval));
        Self {
            source,
            store,
            target,
            player,
            options,
            games: Vec::new(),
            custom: Vec::new(),
            categories: Vec::new(),
            favorites,
            recent,
            ids: IdAllocator::default(),
            base_url: None,
            section: Section::Games,
            view_mode: ViewMode::Grid,
            filter: String::new(),
            detail: None,
            add_form_open: false,
            active: None,
            next_ticket: 0,
            carousel,
            theme,
        }
    }

    /// Fetch the catalog, fall back to the built-in list on any failure,
    /// merge user-added games and render everything.
    pub async fn load(&mut self) -> LoadReport {
        let document = match self.source.fetch().await {
            Ok(document) => Some(document),
            Err(err) => {
                warn!("Catalog unavailable, using built-in games: {err}");
                None
            }
        };
        let stored: Vec<GameEntry> = read_slot(&self.store, CUSTOM_GAMES_KEY);
        let assembled = assemble(document, stored);

        self.games = assembled.games;
        self.custom = assembled.custom;
        self.categories = assembled.categories;
        self.ids = assembled.ids;
        self.base_url = self.source.base_url();
        if assembled.custom_changed {
            self.persist_custom();
        }

        let report = LoadReport {
            total: self.games.len(),
            used_fallback: assembled.used_fallback,
        };
        info!(
            total = report.total,
            custom = self.custom.len(),
            fallback = report.used_fallback,
            "Catalog loaded"
        );

        self.target.set_categories(&self.categories);
        self.target.set_theme(self.theme);
        self.target.set_view_mode(self.view_mode);
        self.target.set_active_section(self.section);
        self.reset_carousel(Instant::now());
        self.render_all_sections();
        report
    }

    /// Working catalog in display order.
    pub fn games(&self) -> &[Game] {
        &self.games
    }

    /// Look up a game in the working catalog.
    pub fn game(&self, id: GameId) -> Option<&Game> {
        self.games.iter().find(|game| game.id == id)
    }

    /// Categories offered for new games.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Favorite identifiers, including orphans.
    pub fn favorites(&self) -> &[GameId] {
        &self.favorites
    }

    /// Whether `id` is a favorite.
    pub fn is_favorite(&self, id: GameId) -> bool {
        self.favorites.contains(&id)
    }

    /// Recently played games, most recent first.
    pub fn recent(&self) -> &[Game] {
        &self.recent
    }

    /// Visible section.
    pub fn section(&self) -> Section {
        self.section
    }

    /// Games layout.
    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Active theme.
    pub fn theme(&self) -> ThemeChoice {
        self.theme
    }

    /// Game occupying the player, if any.
    pub fn active_game(&self) -> Option<&Game> {
        self.active.as_ref().map(|active| &active.game)
    }

    /// Gate state of the player, if a game is active.
    pub fn gate(&self) -> Option<&PlayerGate> {
        self.active.as_ref().map(|active| &active.gate)
    }

    /// Whether the portal is in play mode.
    pub fn is_playing(&self) -> bool {
        self.active.is_some()
    }

    /// Whether the add-game form is open.
    pub fn is_add_form_open(&self) -> bool {
        self.add_form_open
    }

    /// Game shown in the detail panel, if open.
    pub fn detail(&self) -> Option<GameId> {
        self.detail
    }

    /// Carousel state, when the feature is enabled.
    pub fn carousel(&self) -> Option<&Carousel> {
        self.carousel.as_ref()
    }

    /// Render target.
    pub fn target(&self) -> &R {
        &self.target
    }

    /// Persistence store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Embedded player.
    pub fn player(&self) -> &P {
        &self.player
    }

    /// Mutable access to the embedded player.
    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    /// Flip the favorite state of `id`, persist it and refresh every view
    /// that shows favorite state. Returns the new state.
    pub fn toggle_favorite(&mut self, id: GameId) -> bool {
        let now_favorite = match self.favorites.iter().position(|fav| *fav == id) {
            Some(index) => {
                self.favorites.remove(index);
                false
            }
            None => {
                self.favorites.push(id);
                true
            }
        };
        let result = write_slot(&mut self.store, FAVORITES_KEY, &self.favorites);
        self.check_persisted(FAVORITES_KEY, result);
        debug!(%id, favorite = now_favorite, "Favorite toggled");

        self.render_all_sections();
        if self.detail.is_some() {
            self.render_detail();
        }
        if self.active.is_some() {
            self.render_player();
        }
        now_favorite
    }

    /// Toggle the favorite state of the game in the player.
    pub fn toggle_active_favorite(&mut self) -> Option<bool> {
        let id = self.active.as_ref()?.game.id;
        Some(self.toggle_favorite(id))
    }

    /// Record `id` in the history and start playing it. Unknown ids are
    /// ignored.
    pub fn play(&mut self, id: GameId) -> bool {
        let Some(game) = self.game(id).cloned() else {
            debug!(%id, "Ignoring play request for unknown game");
            return false;
        };
        self.remember_recent(&game);
        if self.detail.take().is_some() {
            self.target.show_detail(None);
        }
        self.enter_play_mode(game);
        true
    }

    /// Deliver the completion signal of a load attempt. Stale tickets are
    /// ignored; returns whether the outcome was applied.
    pub fn complete_load(&mut self, ticket: LoadTicket, outcome: LoadOutcome) -> bool {
        let Some(active) = self.active.as_mut().filter(|active| active.ticket == ticket) else {
            debug!(%ticket, ?outcome, "Discarding stale load outcome");
            return false;
        };
        match outcome {
            LoadOutcome::Succeeded => {
                info!(title = %active.game.title, %ticket, "Game loaded");
                active.gate = PlayerGate::Ready;
            }
            LoadOutcome::Failed(reason) => {
                warn!(title = %active.game.title, %ticket, "Game failed to load: {reason}");
                active.gate = PlayerGate::Failed { reason };
            }
        }
        self.render_player();
        true
    }

    /// Restart the load of the active game.
    pub fn retry(&mut self) -> bool {
        self.restart_load(PlayerGate::Loading)
    }

    /// Reload the active game, showing the refresh gate.
    pub fn refresh(&mut self) -> bool {
        self.restart_load(PlayerGate::Refreshing)
    }

    /// Open the active game outside the player. Returns the address used.
    pub fn open_external(&mut self) -> Option<String> {
        let url = self.active.as_ref()?.url.clone();
        info!(%url, "Opening game externally");
        self.player.open_external(&url);
        Some(url)
    }

    /// Leave play mode. Safe to call when nothing is playing.
    pub fn exit_play(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        info!(title = %active.game.title, "Leaving play mode");
        self.player.clear();
        self.target.show_player(None);
        true
    }

    /// Open the detail panel for `id`.
    pub fn show_info(&mut self, id: GameId) -> bool {
        if self.game(id).is_none() {
            return false;
        }
        self.detail = Some(id);
        self.render_detail();
        true
    }

    /// Close the detail panel.
    pub fn close_info(&mut self) {
        if self.detail.take().is_some() {
            self.target.show_detail(None);
        }
    }

    /// Open the add-game form.
    pub fn open_add_form(&mut self) {
        self.add_form_open = true;
        self.target.show_add_form(true);
    }

    /// Discard the add-game form without touching the catalog.
    pub fn cancel_add_game(&mut self) {
        if self.add_form_open {
            self.add_form_open = false;
            self.target.show_add_form(false);
        }
    }

    /// Validate the form, add the game to the front of the catalog and of
    /// the persisted user-added list.
    pub fn add_game(&mut self, form: NewGame) -> Result<GameId, FormError> {
        let fields = build_fields(form)?;
        let id = self.ids.allocate();
        let game = fields.with_id(id);
        info!(%id, title = %game.title, "Adding game");

        self.games.insert(0, game.clone());
        self.custom.insert(0, game);
        self.persist_custom();

        self.add_form_open = false;
        self.target.show_add_form(false);
        self.reset_carousel(Instant::now());
        self.render_all_sections();
        self.target
            .notify(Notice::Info("Game added successfully!".to_string()));
        Ok(id)
    }

    /// Switch the games layout.
    pub fn switch_view(&mut self, mode: ViewMode) {
        self.view_mode = mode;
        self.target.set_view_mode(mode);
    }

    /// Show another section.
    pub fn switch_section(&mut self, section: Section) {
        self.section = section;
        self.target.set_active_section(section);
    }

    /// Filter the games section. A blank query shows the whole catalog.
    pub fn set_filter(&mut self, query: &str) {
        self.filter = query.trim().to_lowercase();
        self.render_section(Section::Games);
    }

    /// Active filter, lowercase.
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Handle a payload posted by a hosted game.
    pub fn handle_message(&mut self, payload: &Value) -> Option<FrameMessage> {
        let message = FrameMessage::parse(payload)?;
        match &message {
            FrameMessage::GameScore(report) => {
                info!(score = report.score, received_at = %report.received_at, "Game score update");
                if let Some(active) = self.active.as_mut() {
                    active.last_score = Some(report.score);
                    self.render_player();
                }
            }
        }
        Some(message)
    }

    /// Switch between dark and light themes. `None` when the feature is off.
    pub fn toggle_theme(&mut self) -> Option<ThemeChoice> {
        if !self.options.features.theme_toggle {
            return None;
        }
        self.theme = self.theme.toggled();
        let result = write_slot(&mut self.store, THEME_KEY, &self.theme);
        self.check_persisted(THEME_KEY, result);
        self.target.set_theme(self.theme);
        Some(self.theme)
    }

    /// Next featured slide (manual).
    pub fn carousel_next(&mut self, now: Instant) {
        self.with_carousel(|carousel| carousel.next(now));
    }

    /// Previous featured slide (manual).
    pub fn carousel_prev(&mut self, now: Instant) {
        self.with_carousel(|carousel| carousel.prev(now));
    }

    /// Jump to a featured slide (manual).
    pub fn carousel_show(&mut self, index: usize, now: Instant) {
        self.with_carousel(|carousel| carousel.show(index as isize, now));
    }

    /// Pointer entered (`true`) or left (`false`) the carousel.
    pub fn carousel_hover(&mut self, hovering: bool, now: Instant) {
        self.with_carousel(|carousel| {
            if hovering {
                carousel.hover_start();
            } else {
                carousel.hover_end(now);
            }
        });
    }

    /// Drive auto-advance. Returns whether the slide changed.
    pub fn carousel_tick(&mut self, now: Instant) -> bool {
        let advanced = self
            .carousel
            .as_mut()
            .map(|carousel| carousel.tick(now))
            .unwrap_or(false);
        if advanced {
            self.render_carousel();
        }
        advanced
    }

    fn with_carousel(&mut self, update: impl FnOnce(&mut Carousel)) {
        if let Some(carousel) = self.carousel.as_mut() {
            update(carousel);
            self.render_carousel();
        }
    }

    fn reset_carousel(&mut self, now: Instant) {
        if let Some(carousel) = self.carousel.as_mut() {
            carousel.reset(self.games.len(), now);
            self.render_carousel();
        }
    }

    fn render_carousel(&mut self) {
        let Some(carousel) = self.carousel.as_ref() else {
            return;
        };
        let view = (!self.games.is_empty()).then(|| CarouselView {
            slides: self.games.clone(),
            index: carousel.index(),
            paused: carousel.is_paused(),
        });
        self.target.render_carousel(view);
    }

    fn remember_recent(&mut self, game: &Game) {
        self.recent.retain(|entry| entry.id != game.id);
        self.recent.insert(0, game.clone());
        self.recent.truncate(RECENT_LIMIT);
        let result = write_slot(&mut self.store, RECENT_KEY, &self.recent);
        self.check_persisted(RECENT_KEY, result);
        self.render_section(Section::Recent);
    }

    fn enter_play_mode(&mut self, game: Game) {
        if self.active.is_some() {
            self.player.clear();
        }
        let url = resolve_game_url(self.base_url.as_ref(), &game.url);
        let ticket = self.issue_ticket();
        info!(title = %game.title, %url, %ticket, "Entering play mode");
        self.active = Some(ActiveGame {
            game,
            url: url.clone(),
            ticket,
            gate: PlayerGate::Loading,
            last_score: None,
        });
        self.render_player();
        let request = self.load_request(ticket, url);
        self.player.load(request);
    }

    fn restart_load(&mut self, gate: PlayerGate) -> bool {
        let ticket = self.issue_ticket();
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        active.ticket = ticket;
        active.gate = gate;
        let url = active.url.clone();
        info!(%url, %ticket, "Reloading game");
        self.player.clear();
        self.render_player();
        let request = self.load_request(ticket, url);
        self.player.load(request);
        true
    }

    fn load_request(&self, ticket: LoadTicket, url: String) -> LoadRequest {
        LoadRequest {
            ticket,
            url,
            sandbox: SandboxPolicy::RESTRICTED,
            delay: self.options.load_delay,
        }
    }

    fn issue_ticket(&mut self) -> LoadTicket {
        self.next_ticket += 1;
        LoadTicket(self.next_ticket)
    }

    fn persist_custom(&mut self) {
        let result = write_slot(&mut self.store, CUSTOM_GAMES_KEY, &self.custom);
        self.check_persisted(CUSTOM_GAMES_KEY, result);
    }

    fn check_persisted(&mut self, key: &str, result: Result<(), StoreError>) {
        if let Err(err) = result {
            warn!(key, "Failed to persist slot: {err}");
            self.target
                .notify(Notice::Warning(format!("Could not save {key}: {err}")));
        }
    }

    fn render_all_sections(&mut self) {
        for section in Section::ALL {
            self.render_section(section);
        }
    }

    fn render_section(&mut self, section: Section) {
        let view = self.section_view(section);
        self.target.render_section(section, view);
    }

    fn section_view(&self, section: Section) -> SectionView {
        let card = |game: &Game| GameCard::new(game, self.is_favorite(game.id));
        let cards: Vec<GameCard> = match section {
            Section::Games => self
                .games
                .iter()
                .filter(|game| game.matches(&self.filter))
                .map(card)
                .collect(),
            Section::Favorites => self
                .games
                .iter()
                .filter(|game| self.is_favorite(game.id))
                .map(card)
                .collect(),
            Section::Recent => self
                .recent
                .iter()
                .filter(|entry| self.game(entry.id).is_some())
                .map(card)
                .collect(),
        };
        if cards.is_empty() {
            SectionView::Empty(section.empty_state())
        } else {
            SectionView::Cards(cards)
        }
    }

    fn render_detail(&mut self) {
        let view = self.detail.and_then(|id| {
            self.game(id).map(|game| DetailView {
                game: game.clone(),
                is_favorite: self.is_favorite(id),
            })
        });
        self.target.show_detail(view);
    }

    fn render_player(&mut self) {
        let view = self.active.as_ref().map(|active| PlayerView {
            game: active.game.clone(),
            url: active.url.clone(),
            is_favorite: self.is_favorite(active.game.id),
            gate: active.gate.clone(),
            last_score: active.last_score,
        });
        self.target.show_player(view);
    }
}

fn build_fields(form: NewGame) -> Result<GameFields, FormError> {
    let title = form.title.trim().to_string();
    if title.is_empty() {
        return Err(FormError::MissingTitle);
    }
    let url = form.url.trim().to_string();
    if url.is_empty() {
        return Err(FormError::MissingUrl);
    }
    match Url::parse(&url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https" | "file") => {}
        Ok(_) => return Err(FormError::InvalidUrl(url)),
        // Relative paths resolve against the catalog location.
        Err(_) if !url.contains(':') && !url.contains(char::is_whitespace) => {}
        Err(_) => return Err(FormError::InvalidUrl(url)),
    }
    let category = form.category.trim().to_string();
    let image = form.image.trim();
    Ok(GameFields {
        icon: Some(category_icon(&category).to_string()),
        title,
        url,
        category,
        description: form.description.trim().to_string(),
        rating: Rating::Unrated,
        thumbnail: (!image.is_empty()).then(|| image.to_string()),
        author: Some(COMMUNITY_AUTHOR.to_string()),
        tags: vec!["custom".to_string()],
    })
}
