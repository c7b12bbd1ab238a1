use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Duration as ChronoDuration, Local};
use gamehub_core::render::{
    CarouselView, DetailView, GameCard, Notice, PlayerView, RenderTarget, Section, SectionView,
    ThemeChoice, ViewMode,
};
use parking_lot::{RwLock, RwLockReadGuard};

/// How long a notice stays in the status bar.
const NOTICE_TTL_SECS: i64 = 3;

#[derive(Debug, Clone)]
pub struct ShownNotice {
    pub notice: Notice,
    pub shown_at: DateTime<Local>,
}

impl ShownNotice {
    pub fn is_expired(&self, now: DateTime<Local>) -> bool {
        now - self.shown_at > ChronoDuration::seconds(NOTICE_TTL_SECS)
    }

    pub fn text(&self) -> String {
        let message = match &self.notice {
            Notice::Info(message) => message,
            Notice::Warning(message) => message,
        };
        format!("[{}] {message}", self.shown_at.format("%H:%M:%S"))
    }
}

/// Everything the controller has pushed to the terminal so far.
#[derive(Debug, Clone)]
pub struct ViewModel {
    pub categories: Vec<String>,
    pub sections: HashMap<Section, SectionView>,
    pub carousel: Option<CarouselView>,
    pub active_section: Section,
    pub view_mode: ViewMode,
    pub detail: Option<DetailView>,
    pub player: Option<PlayerView>,
    pub add_form_open: bool,
    pub theme: ThemeChoice,
    pub notice: Option<ShownNotice>,
}

impl Default for ViewModel {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            sections: HashMap::new(),
            carousel: None,
            active_section: Section::Games,
            view_mode: ViewMode::Grid,
            detail: None,
            player: None,
            add_form_open: false,
            theme: ThemeChoice::Dark,
            notice: None,
        }
    }
}

impl ViewModel {
    pub fn cards(&self, section: Section) -> &[GameCard] {
        self.sections
            .get(&section)
            .map(SectionView::cards)
            .unwrap_or(&[])
    }

    pub fn active_cards(&self) -> &[GameCard] {
        self.cards(self.active_section)
    }

    /// Empty-state message of `section`, if it has nothing to list.
    pub fn empty_message(&self, section: Section) -> Option<&'static str> {
        match self.sections.get(&section) {
            Some(SectionView::Empty(state)) => Some(state.message()),
            Some(SectionView::Cards(_)) => None,
            None => Some(section.empty_state().message()),
        }
    }
}

/// Render target backed by a shared [`ViewModel`]. Clones share the model,
/// so the app keeps one handle for drawing while the controller writes
/// through another.
#[derive(Debug, Clone, Default)]
pub struct TerminalView {
    model: Arc<RwLock<ViewModel>>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ViewModel {
        self.model.read().clone()
    }

    /// Borrow the model without cloning it. Drop the guard before the
    /// controller renders again.
    pub fn read(&self) -> RwLockReadGuard<'_, ViewModel> {
        self.model.read()
    }

    /// Drop the notice once it has been shown long enough. Returns whether
    /// anything changed.
    pub fn expire_notice(&self, now: DateTime<Local>) -> bool {
        let mut model = self.model.write();
        if model
            .notice
            .as_ref()
            .is_some_and(|notice| notice.is_expired(now))
        {
            model.notice = None;
            return true;
        }
        false
    }
}

impl RenderTarget for TerminalView {
    fn set_categories(&mut self, categories: &[String]) {
        self.model.write().categories = categories.to_vec();
    }

    fn render_section(&mut self, section: Section, view: SectionView) {
        self.model.write().sections.insert(section, view);
    }

    fn render_carousel(&mut self, carousel: Option<CarouselView>) {
        self.model.write().carousel = carousel;
    }

    fn set_active_section(&mut self, section: Section) {
        self.model.write().active_section = section;
    }

    fn set_view_mode(&mut self, mode: ViewMode) {
        self.model.write().view_mode = mode;
    }

    fn show_detail(&mut self, detail: Option<DetailView>) {
        self.model.write().detail = detail;
    }

    fn show_player(&mut self, player: Option<PlayerView>) {
        self.model.write().player = player;
    }

    fn show_add_form(&mut self, open: bool) {
        self.model.write().add_form_open = open;
    }

    fn set_theme(&mut self, theme: ThemeChoice) {
        self.model.write().theme = theme;
    }

    fn notify(&mut self, notice: Notice) {
        self.model.write().notice = Some(ShownNotice {
            notice,
            shown_at: Local::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamehub_core::{
        models::{Game, GameId, Rating},
        render::EmptyState,
    };

    fn card(id: u64) -> GameCard {
        let game = Game {
            id: GameId(id),
            title: format!("Game {id}"),
            url: "https://example.com".into(),
            category: "Arcade".into(),
            description: String::new(),
            rating: Rating::Score(4.0),
            thumbnail: None,
            icon: None,
            author: None,
            tags: Vec::new(),
        };
        GameCard::new(&game, false)
    }

    #[test]
    fn clones_share_the_model() {
        let view = TerminalView::new();
        let mut writer = view.clone();
        writer.render_section(Section::Games, SectionView::Cards(vec![card(1), card(2)]));
        writer.set_active_section(Section::Games);
        writer.set_view_mode(ViewMode::List);

        let model = view.snapshot();
        assert_eq!(model.active_cards().len(), 2);
        assert_eq!(model.view_mode, ViewMode::List);
        assert_eq!(model.empty_message(Section::Games), None);
    }

    #[test]
    fn empty_sections_report_their_message() {
        let mut view = TerminalView::new();
        view.render_section(
            Section::Favorites,
            SectionView::Empty(EmptyState::NoFavorites),
        );
        let model = view.snapshot();
        assert!(model.cards(Section::Favorites).is_empty());
        assert_eq!(
            model.empty_message(Section::Favorites),
            Some("No favorite games yet. Star some games to see them here!")
        );
        assert_eq!(
            model.empty_message(Section::Recent),
            Some("No recent games. Start playing to see your history!")
        );
    }

    #[test]
    fn notices_expire() {
        let mut view = TerminalView::new();
        view.notify(Notice::Info("Game added successfully!".into()));
        let shown_at = view.snapshot().notice.unwrap().shown_at;
        assert!(!view.expire_notice(shown_at + ChronoDuration::seconds(1)));
        assert!(view.expire_notice(shown_at + ChronoDuration::seconds(4)));
        assert!(view.snapshot().notice.is_none());
    }

    #[test]
    fn read_guard_sees_latest_render() {
        let view = TerminalView::new();
        let mut writer = view.clone();
        writer.render_section(Section::Games, SectionView::Cards(vec![card(1)]));
        assert_eq!(view.read().active_cards().len(), 1);

        writer.render_section(Section::Games, SectionView::Cards(vec![card(1), card(2)]));
        let model = view.read();
        assert_eq!(model.active_cards().len(), 2);
        assert_eq!(model.active_cards()[1].id, GameId(2));
    }
}
