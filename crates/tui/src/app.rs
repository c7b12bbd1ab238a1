use std::{cmp, io, thread, time::Duration, time::Instant};

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use gamehub_core::{
    catalog::AnySource,
    controller::{CatalogController, LoadReport},
    models::GameId,
    player::{LoadOutcome, PlayerGate},
    render::{
        CarouselView, DetailView, GameCard, Notice, PlayerView, Section, ThemeChoice, ViewMode,
    },
    store::JsonFileStore,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::{
    form::{AddGameForm, FormField},
    player::{BrowserPlayer, PlayerEvent},
    view::{TerminalView, ViewModel},
};

const TICK_RATE: Duration = Duration::from_millis(250);
const CARD_WIDTH: u16 = 30;
const CARD_HEIGHT: u16 = 5;
const FORM_LABEL_WIDTH: usize = 14;

pub type PortalController =
    CatalogController<AnySource, JsonFileStore, TerminalView, BrowserPlayer>;

#[derive(Debug, Clone, Copy)]
struct Theme {
    primary_bg: Color,
    primary_fg: Color,
    accent: Color,
    accent_alt: Color,
    muted: Color,
    selection_bg: Color,
    selection_fg: Color,
    success: Color,
    warning: Color,
    danger: Color,
}

impl Theme {
    fn dark() -> Self {
        Self {
            primary_bg: Color::Rgb(11, 14, 19),
            primary_fg: Color::Rgb(228, 235, 244),
            accent: Color::Rgb(92, 219, 195),
            accent_alt: Color::Rgb(122, 186, 255),
            muted: Color::Rgb(129, 143, 158),
            selection_bg: Color::Rgb(29, 37, 47),
            selection_fg: Color::Rgb(151, 239, 217),
            success: Color::Rgb(120, 210, 140),
            warning: Color::Rgb(246, 195, 111),
            danger: Color::Rgb(239, 117, 117),
        }
    }

    fn light() -> Self {
        Self {
            primary_bg: Color::Rgb(240, 245, 252),
            primary_fg: Color::Rgb(28, 38, 52),
            accent: Color::Rgb(27, 170, 152),
            accent_alt: Color::Rgb(64, 120, 212),
            muted: Color::Rgb(116, 135, 155),
            selection_bg: Color::Rgb(217, 225, 236),
            selection_fg: Color::Rgb(16, 120, 110),
            success: Color::Rgb(40, 150, 80),
            warning: Color::Rgb(200, 130, 40),
            danger: Color::Rgb(219, 83, 83),
        }
    }

    fn for_choice(choice: ThemeChoice) -> Self {
        match choice {
            ThemeChoice::Dark => Self::dark(),
            ThemeChoice::Light => Self::light(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Filter,
}

enum AppEvent {
    Input(Event),
    Tick,
}

/// Terminal front end of the portal.
pub struct GameHubApp {
    controller: PortalController,
    view: TerminalView,
    player_rx: Option<mpsc::Receiver<PlayerEvent>>,
    state: UiState,
    form: Option<AddGameForm>,
}

impl GameHubApp {
    pub fn new(controller: PortalController, view: TerminalView, report: LoadReport) -> Self {
        let mut state = UiState::default();
        let status = if report.used_fallback {
            format!(
                "Catalog unavailable, showing {} built-in games",
                report.total
            )
        } else {
            format!("Loaded {} games", report.total)
        };
        state.set_status(status);
        Self {
            controller,
            view,
            player_rx: None,
            state,
            form: None,
        }
    }

    pub fn attach_player(&mut self, receiver: mpsc::Receiver<PlayerEvent>) {
        self.player_rx = Some(receiver);
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        let mut player_rx = self.player_rx.take();

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break;
            }

            let mut player_closed = false;
            let keep_running = match player_rx.as_mut() {
                Some(rx) => tokio::select! {
                    maybe_event = event_rx.recv() => self.process_app_event(maybe_event),
                    maybe_player = rx.recv() => {
                        match maybe_player {
                            Some(event) => self.handle_player_event(event),
                            None => player_closed = true,
                        }
                        true
                    }
                },
                None => {
                    let maybe_event = event_rx.recv().await;
                    self.process_app_event(maybe_event)
                }
            };
            if player_closed {
                player_rx = None;
            }
            if !keep_running || self.state.should_quit {
                break;
            }
        }

        self.controller.exit_play();
        restore_terminal(&mut terminal)?;
        Ok(())
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                self.handle_input(event);
                true
            }
            Some(AppEvent::Tick) => {
                self.handle_tick();
                true
            }
            None => false,
        }
    }

    fn handle_tick(&mut self) {
        self.controller.carousel_tick(Instant::now());
        self.view.expire_notice(Local::now());
    }

    fn handle_player_event(&mut self, event: PlayerEvent) {
        let PlayerEvent { ticket, outcome } = event;
        let message = match &outcome {
            LoadOutcome::Succeeded => "Game opened in your browser".to_string(),
            LoadOutcome::Failed(reason) => format!("Game failed to load: {reason}"),
        };
        if self.controller.complete_load(ticket, outcome) {
            self.state.set_status(message);
        } else {
            debug!(%ticket, "Player event ignored");
        }
    }

    fn handle_input(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            self.state.should_quit = true;
            return;
        }
        if self.form.is_some() {
            self.handle_form_key(key);
        } else if self.controller.is_playing() {
            self.handle_play_key(key);
        } else if self.state.mode == Mode::Filter {
            self.handle_filter_key(key);
        } else if self.controller.detail().is_some() {
            self.handle_detail_key(key);
        } else {
            self.handle_browse_key(key);
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) {
        let len = self.active_len();
        let step = match self.controller.view_mode() {
            ViewMode::Grid => self.state.columns as isize,
            ViewMode::List => 1,
        };
        match key.code {
            KeyCode::Char('q') => self.state.should_quit = true,
            KeyCode::Tab => self.cycle_section(1),
            KeyCode::BackTab => self.cycle_section(-1),
            KeyCode::Char('1') => self.switch_section(Section::Games),
            KeyCode::Char('2') => self.switch_section(Section::Favorites),
            KeyCode::Char('3') => self.switch_section(Section::Recent),
            KeyCode::Char('j') | KeyCode::Down => self.state.move_cursor(step, len),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_cursor(-step, len),
            KeyCode::Char('l') | KeyCode::Right => self.state.move_cursor(1, len),
            KeyCode::Char('h') | KeyCode::Left => self.state.move_cursor(-1, len),
            KeyCode::Char('g') | KeyCode::Home => self.state.move_to(0, len),
            KeyCode::Char('G') | KeyCode::End => self.state.move_to(len.saturating_sub(1), len),
            KeyCode::PageDown => self.state.page(1, len),
            KeyCode::PageUp => self.state.page(-1, len),
            KeyCode::Enter => self.play_selected(),
            KeyCode::Char('i') => {
                if let Some(card) = self.selected_card() {
                    self.controller.show_info(card.id);
                }
            }
            KeyCode::Char('f') => {
                if let Some(card) = self.selected_card() {
                    self.toggle_favorite(&card.title, card.id);
                }
            }
            KeyCode::Char('a') => self.open_form(),
            KeyCode::Char('v') => {
                let mode = match self.controller.view_mode() {
                    ViewMode::Grid => ViewMode::List,
                    ViewMode::List => ViewMode::Grid,
                };
                self.controller.switch_view(mode);
                self.state.offset = 0;
            }
            KeyCode::Char('t') => self.toggle_theme(),
            KeyCode::Char('[') => self.controller.carousel_prev(Instant::now()),
            KeyCode::Char(']') => self.controller.carousel_next(Instant::now()),
            KeyCode::Char('p') => {
                self.state.carousel_held = !self.state.carousel_held;
                self.controller
                    .carousel_hover(self.state.carousel_held, Instant::now());
            }
            KeyCode::Char('c') => self.play_featured(),
            KeyCode::Char('/') => {
                self.switch_section(Section::Games);
                self.state.mode = Mode::Filter;
                self.state.set_status("Enter filter text".to_string());
            }
            KeyCode::Esc if !self.controller.filter().is_empty() => {
                self.apply_filter(String::new());
                self.state.set_status("Filter cleared".to_string());
            }
            _ => {}
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.state.mode = Mode::Browse;
                self.apply_filter(String::new());
                self.state.set_status("Filter cancelled".to_string());
            }
            KeyCode::Enter => {
                self.state.mode = Mode::Browse;
                self.state
                    .set_status(format!("Filter applied: {}", self.state.filter));
            }
            KeyCode::Backspace => {
                let mut filter = self.state.filter.clone();
                filter.pop();
                self.apply_filter(filter);
            }
            KeyCode::Char(c) => {
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                    let mut filter = self.state.filter.clone();
                    filter.push(c);
                    self.apply_filter(filter);
                }
            }
            _ => {}
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent) {
        let Some(id) = self.controller.detail() else {
            return;
        };
        match key.code {
            KeyCode::Esc | KeyCode::Char('i') | KeyCode::Char('q') => self.controller.close_info(),
            KeyCode::Enter => {
                self.controller.play(id);
            }
            KeyCode::Char('f') => {
                let title = self
                    .controller
                    .game(id)
                    .map(|game| game.title.clone())
                    .unwrap_or_default();
                self.toggle_favorite(&title, id);
            }
            _ => {}
        }
    }

    fn handle_play_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('x') => {
                self.controller.exit_play();
                self.state.set_status("Back to the catalog".to_string());
            }
            KeyCode::Char('r') => {
                if self.controller.retry() {
                    self.state.set_status("Retrying…".to_string());
                }
            }
            KeyCode::Char('R') => {
                if self.controller.refresh() {
                    self.state.set_status("Refreshing game…".to_string());
                }
            }
            KeyCode::Char('o') => {
                if let Some(url) = self.controller.open_external() {
                    self.state.set_status(format!("Opening {url}"));
                }
            }
            KeyCode::Char('f') => {
                if let Some(favorite) = self.controller.toggle_active_favorite() {
                    let message = if favorite {
                        "Added to favorites"
                    } else {
                        "Removed from favorites"
                    };
                    self.state.set_status(message.to_string());
                }
            }
            KeyCode::Char('t') => self.toggle_theme(),
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let mut submit = false;
        let mut cancel = false;
        if let Some(form) = self.form.as_mut() {
            match key.code {
                KeyCode::Esc => cancel = true,
                KeyCode::Enter => submit = true,
                KeyCode::Tab | KeyCode::Down => form.focus_next(),
                KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
                KeyCode::Left => form.move_horizontal(-1),
                KeyCode::Right => form.move_horizontal(1),
                KeyCode::Backspace => form.backspace(),
                KeyCode::Delete => form.delete(),
                KeyCode::Char(ch) => {
                    if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                        form.insert(ch);
                    }
                }
                _ => {}
            }
        }

        if cancel {
            self.form = None;
            self.controller.cancel_add_game();
            self.state.set_status("Add game cancelled".to_string());
            return;
        }

        if submit {
            let Some(new_game) = self.form.as_ref().map(AddGameForm::to_new_game) else {
                return;
            };
            match self.controller.add_game(new_game) {
                Ok(id) => {
                    info!(%id, "Game added from the form");
                    self.form = None;
                    let len = self.active_len();
                    self.state.move_to(0, len);
                    self.state.set_status("Game added".to_string());
                }
                Err(err) => {
                    if let Some(form) = self.form.as_mut() {
                        form.set_error(err.to_string());
                    }
                }
            }
        }
    }

    fn open_form(&mut self) {
        let categories = self.view.read().categories.clone();
        self.form = Some(AddGameForm::new(categories));
        self.controller.open_add_form();
    }

    fn apply_filter(&mut self, filter: String) {
        self.controller.set_filter(&filter);
        self.state.filter = filter;
        self.state.cursor = 0;
        self.state.offset = 0;
    }

    fn toggle_favorite(&mut self, title: &str, id: GameId) {
        let message = if self.controller.toggle_favorite(id) {
            format!("Added {title} to favorites")
        } else {
            format!("Removed {title} from favorites")
        };
        let len = self.active_len();
        self.state.clamp_cursor(len);
        self.state.set_status(message);
    }

    fn toggle_theme(&mut self) {
        match self.controller.toggle_theme() {
            Some(theme) => self.state.set_status(format!("{} theme", theme_label(theme))),
            None => self
                .state
                .set_status("Theme switching is disabled".to_string()),
        }
    }

    fn play_selected(&mut self) {
        if let Some(card) = self.selected_card() {
            self.controller.play(card.id);
            self.state.set_status(format!("Loading {}…", card.title));
        }
    }

    fn play_featured(&mut self) {
        let featured = self.view.read().carousel.as_ref().and_then(|carousel| {
            carousel
                .slides
                .get(carousel.index)
                .map(|game| (game.id, game.title.clone()))
        });
        if let Some((id, title)) = featured {
            self.controller.play(id);
            self.state.set_status(format!("Loading {title}…"));
        }
    }

    fn cycle_section(&mut self, delta: isize) {
        let current = Section::ALL
            .iter()
            .position(|section| *section == self.controller.section())
            .unwrap_or(0) as isize;
        let len = Section::ALL.len() as isize;
        let next = Section::ALL[(current + delta).rem_euclid(len) as usize];
        self.switch_section(next);
    }

    fn switch_section(&mut self, section: Section) {
        if self.controller.section() != section {
            self.controller.switch_section(section);
            self.state.cursor = 0;
            self.state.offset = 0;
        }
    }

    fn active_len(&self) -> usize {
        self.view.read().active_cards().len()
    }

    fn selected_card(&self) -> Option<GameCard> {
        self.view
            .read()
            .active_cards()
            .get(self.state.cursor)
            .cloned()
    }

    fn draw(&mut self, frame: &mut Frame) {
        let view = self.view.clone();
        let model = view.read();
        let theme = Theme::for_choice(model.theme);
        let size = frame.size();
        frame.render_widget(
            Block::default().style(Style::default().bg(theme.primary_bg).fg(theme.primary_fg)),
            size,
        );

        let carousel = model
            .carousel
            .as_ref()
            .filter(|_| model.player.is_none() && model.active_section == Section::Games);

        let mut constraints = vec![Constraint::Length(3)];
        if carousel.is_some() {
            constraints.push(Constraint::Length(6));
        }
        constraints.push(Constraint::Min(6));
        constraints.push(Constraint::Length(4));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(size);
        let mut chunk_iter = chunks.iter().copied();
        let header_chunk = chunk_iter.next().unwrap_or(size);
        let carousel_chunk = if carousel.is_some() {
            chunk_iter.next()
        } else {
            None
        };
        let body_chunk = chunk_iter.next().unwrap_or(size);
        let status_chunk = chunk_iter.next().unwrap_or(size);

        self.render_header(frame, header_chunk, &model, &theme);
        if let (Some(carousel), Some(area)) = (carousel, carousel_chunk) {
            render_carousel(frame, area, carousel, &theme);
        }
        match &model.player {
            Some(player) => render_player(frame, body_chunk, player, &theme),
            None => self.render_section(frame, body_chunk, &model, &theme),
        }
        self.render_status(frame, status_chunk, &model, &theme);

        if let Some(detail) = &model.detail {
            render_detail(frame, detail, &theme);
        }
        if let (true, Some(form)) = (model.add_form_open, &self.form) {
            render_form(frame, form, &theme);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, model: &ViewModel, theme: &Theme) {
        let titles: Vec<Line> = Section::ALL
            .iter()
            .enumerate()
            .map(|(index, section)| {
                Line::from(format!(
                    "{} {} ({})",
                    index + 1,
                    section.label(),
                    model.cards(*section).len()
                ))
            })
            .collect();
        let selected = Section::ALL
            .iter()
            .position(|section| *section == model.active_section)
            .unwrap_or(0);
        let mode = match model.view_mode {
            ViewMode::Grid => "Grid",
            ViewMode::List => "List",
        };
        let title = format!("Game Hub · {mode} · {}", theme_label(model.theme));
        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::ALL).title(title))
            .select(selected)
            .style(Style::default().fg(theme.muted))
            .highlight_style(
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            )
            .divider(" | ");
        frame.render_widget(tabs, area);
    }

    fn render_section(&mut self, frame: &mut Frame, area: Rect, model: &ViewModel, theme: &Theme) {
        let section = model.active_section;
        let cards = model.active_cards();
        let title = if section == Section::Games && !self.state.filter.is_empty() {
            format!("{} · filter \"{}\"", section.label(), self.state.filter)
        } else {
            section.label().to_string()
        };
        let block = Block::default().borders(Borders::ALL).title(title);

        if let Some(message) = model.empty_message(section) {
            self.state.cursor = 0;
            self.state.offset = 0;
            let paragraph = Paragraph::new(Line::from(Span::styled(
                message,
                Style::default().fg(theme.muted),
            )))
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
            return;
        }

        match model.view_mode {
            ViewMode::Grid => self.render_grid(frame, area, block, cards, theme),
            ViewMode::List => self.render_list(frame, area, block, cards, theme),
        }
    }

    fn render_grid(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        block: Block,
        cards: &[GameCard],
        theme: &Theme,
    ) {
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let columns = cmp::max(1, inner.width / CARD_WIDTH) as usize;
        let rows = cmp::max(1, inner.height / CARD_HEIGHT) as usize;
        self.state.columns = columns;
        self.state.page_rows = rows;
        self.state.clamp_cursor(cards.len());
        self.state.ensure_cursor_visible(cards.len());

        let first = self.state.offset * columns;
        let row_areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(CARD_HEIGHT); rows])
            .split(inner);
        for (row, row_area) in row_areas.iter().enumerate() {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, columns as u32); columns])
                .split(*row_area);
            for (column, cell) in cells.iter().enumerate() {
                let index = first + row * columns + column;
                let Some(card) = cards.get(index) else {
                    return;
                };
                render_card(frame, *cell, card, index == self.state.cursor, theme);
            }
        }
    }

    fn render_list(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        block: Block,
        cards: &[GameCard],
        theme: &Theme,
    ) {
        let height = area.height.saturating_sub(2) as usize;
        self.state.columns = 1;
        self.state.page_rows = cmp::max(1, height);
        self.state.clamp_cursor(cards.len());
        self.state.ensure_cursor_visible(cards.len());

        let end = (self.state.offset + height).min(cards.len());
        let visible = &cards[self.state.offset.min(end)..end];
        let mut list_state = ListState::default();
        if !visible.is_empty() {
            list_state.select(Some(self.state.cursor.saturating_sub(self.state.offset)));
        }

        let items: Vec<ListItem> = visible
            .iter()
            .enumerate()
            .map(|(idx, card)| {
                let is_selected = self.state.cursor == self.state.offset + idx;
                let marker = if is_selected {
                    Span::styled(
                        "▶ ",
                        Style::default()
                            .fg(theme.accent)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::raw("  ")
                };
                let mut line = vec![
                    marker,
                    Span::styled(
                        card.title.clone(),
                        Style::default()
                            .fg(theme.primary_fg)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!(" · {}", card.category),
                        Style::default().fg(theme.muted),
                    ),
                    Span::styled(
                        format!(" · ★ {}", card.rating.label()),
                        Style::default().fg(theme.warning),
                    ),
                ];
                if card.is_favorite {
                    line.push(Span::styled(" ♥", Style::default().fg(theme.danger)));
                }
                ListItem::new(Line::from(line))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(theme.selection_bg));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect, model: &ViewModel, theme: &Theme) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let primary = if self.state.mode == Mode::Filter {
            Line::from(format!("Filter: {}", self.state.filter))
        } else if let Some(shown) = &model.notice {
            let color = match shown.notice {
                Notice::Info(_) => theme.success,
                Notice::Warning(_) => theme.warning,
            };
            Line::from(Span::styled(shown.text(), Style::default().fg(color)))
        } else {
            Line::from(self.state.status.clone())
        };
        let hints = if self.form.is_some() {
            "Tab next field · ←/→ category · Enter add · Esc cancel"
        } else if model.player.is_some() {
            "r retry · R refresh · o open externally · f favorite · Esc back"
        } else if model.detail.is_some() {
            "Enter play · f favorite · Esc close"
        } else if self.state.mode == Mode::Filter {
            "Enter apply · Esc clear"
        } else {
            "Enter play · i info · f favorite · a add · v view · / filter · [ ] featured · t theme · q quit"
        };
        let secondary = Line::from(Span::styled(hints, Style::default().fg(theme.muted)));
        let paragraph = Paragraph::new(vec![primary, secondary])
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn render_card(frame: &mut Frame, area: Rect, card: &GameCard, selected: bool, theme: &Theme) {
    let border = if selected {
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.muted)
    };
    let mut title = vec![Span::styled(
        format!(" {} ", card.title),
        Style::default()
            .fg(if selected {
                theme.selection_fg
            } else {
                theme.primary_fg
            })
            .add_modifier(Modifier::BOLD),
    )];
    if card.is_favorite {
        title.push(Span::styled("♥ ", Style::default().fg(theme.danger)));
    }
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Line::from(title));
    if selected {
        block = block.style(Style::default().bg(theme.selection_bg));
    }
    let lines = vec![
        Line::from(Span::styled(
            card.category.clone(),
            Style::default().fg(theme.accent_alt),
        )),
        Line::from(Span::styled(
            format!("★ {}", card.rating.label()),
            Style::default().fg(theme.warning),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_carousel(frame: &mut Frame, area: Rect, carousel: &CarouselView, theme: &Theme) {
    let Some(game) = carousel.slides.get(carousel.index) else {
        return;
    };
    let mut title = format!(
        "Featured {}/{}",
        carousel.index + 1,
        carousel.slides.len()
    );
    if carousel.paused && carousel.slides.len() > 1 {
        title.push_str(" · paused");
    }
    let lines = vec![
        Line::from(Span::styled(
            game.title.clone(),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(
                "{} · ★ {} · by {}",
                game.category,
                game.rating.label(),
                game.author_label()
            ),
            Style::default().fg(theme.muted),
        )),
        Line::from(game.description.clone()),
        Line::from(Span::styled(
            "c play · [ ] browse · p pause",
            Style::default().fg(theme.muted),
        )),
    ];
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_player(frame: &mut Frame, area: Rect, player: &PlayerView, theme: &Theme) {
    let game = &player.game;
    let mut title = format!("Now Playing · {}", game.title);
    if player.is_favorite {
        title.push_str(" ♥");
    }
    let mut lines = vec![
        Line::from(Span::styled(
            game.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("{} · by {}", game.category, game.author_label()),
            Style::default().fg(theme.muted),
        )),
        Line::from(format!("Address: {}", player.url)),
        Line::from(""),
    ];
    let gate = match &player.gate {
        PlayerGate::Loading => Line::from(Span::styled(
            "Loading game…",
            Style::default().fg(theme.warning),
        )),
        PlayerGate::Refreshing => Line::from(Span::styled(
            "Refreshing game…",
            Style::default().fg(theme.warning),
        )),
        PlayerGate::Ready => Line::from(Span::styled(
            "Running in your browser.",
            Style::default().fg(theme.success),
        )),
        PlayerGate::Failed { reason } => Line::from(Span::styled(
            format!("Failed to load game: {reason}"),
            Style::default().fg(theme.danger),
        )),
    };
    lines.push(gate);
    if matches!(player.gate, PlayerGate::Failed { .. }) {
        lines.push(Line::from("Press r to try again or o to open it in a new window."));
    }
    if let Some(score) = player.last_score {
        lines.push(Line::from(""));
        lines.push(Line::from(format!("Last score: {score}")));
    }
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_detail(frame: &mut Frame, detail: &DetailView, theme: &Theme) {
    let area = centered_rect(70, 16, frame.size());
    frame.render_widget(Clear, area);

    let game = &detail.game;
    let favorite = if detail.is_favorite {
        Span::styled("♥ In favorites", Style::default().fg(theme.danger))
    } else {
        Span::styled("Not in favorites", Style::default().fg(theme.muted))
    };
    let tags = if game.tags.is_empty() {
        "none".to_string()
    } else {
        game.tags.join(", ")
    };
    let description = if game.description.is_empty() {
        "No description available."
    } else {
        game.description.as_str()
    };
    let lines = vec![
        Line::from(Span::styled(
            game.title.clone(),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("Author: {}", game.author_label())),
        Line::from(format!("Category: {}", game.category)),
        Line::from(format!("Rating: {}", game.rating.label())),
        Line::from(format!("Tags: {tags}")),
        Line::from(favorite),
        Line::from(""),
        Line::from(description.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Enter play · f favorite · Esc close",
            Style::default().fg(theme.muted),
        )),
    ];
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Game Details"))
        .style(Style::default().bg(theme.primary_bg).fg(theme.primary_fg))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_form(frame: &mut Frame, form: &AddGameForm, theme: &Theme) {
    let area = centered_rect(72, 11, frame.size());
    frame.render_widget(Clear, area);

    let focus = form.focus();
    let mut lines: Vec<Line> = FormField::ALL
        .iter()
        .map(|field| {
            let focused = *field == focus;
            let marker = if focused { "> " } else { "  " };
            let label = format!("{marker}{:<width$}", field.label(), width = FORM_LABEL_WIDTH - 2);
            let value = match field {
                FormField::Category => format!("◀ {} ▶", form.value(*field)),
                _ => form.value(*field).to_string(),
            };
            let label_style = if focused {
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.muted)
            };
            Line::from(vec![Span::styled(label, label_style), Span::raw(value)])
        })
        .collect();
    lines.push(Line::from(""));
    if let Some(error) = form.error() {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(theme.danger),
        )));
    }
    lines.push(Line::from(vec![
        Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" add  "),
        Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" next field  "),
        Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" cancel"),
    ]));

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Add Game"))
        .style(Style::default().bg(theme.primary_bg).fg(theme.primary_fg));
    frame.render_widget(paragraph, area);

    if let Some(cursor) = form.cursor() {
        let row = FormField::ALL
            .iter()
            .position(|field| *field == focus)
            .unwrap_or(0) as u16;
        let cursor_x = (area.x + 1 + FORM_LABEL_WIDTH as u16 + cursor as u16)
            .min(area.x + area.width.saturating_sub(2));
        frame.set_cursor(cursor_x, area.y + 1 + row);
    }
}

fn theme_label(theme: ThemeChoice) -> &'static str {
    match theme {
        ThemeChoice::Dark => "Dark",
        ThemeChoice::Light => "Light",
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

/// Cursor over the cards of the active section. Scrolling is tracked in
/// rows so the same state serves grid and list layouts.
struct UiState {
    cursor: usize,
    offset: usize,
    columns: usize,
    page_rows: usize,
    filter: String,
    status: String,
    mode: Mode,
    carousel_held: bool,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            cursor: 0,
            offset: 0,
            columns: 1,
            page_rows: 1,
            filter: String::new(),
            status: "Ready".to_string(),
            mode: Mode::Browse,
            carousel_held: false,
            should_quit: false,
        }
    }
}

impl UiState {
    fn move_cursor(&mut self, delta: isize, len: usize) {
        if len == 0 {
            return;
        }
        let idx = (self.cursor as isize + delta).clamp(0, len as isize - 1);
        self.cursor = idx as usize;
        self.ensure_cursor_visible(len);
    }

    fn move_to(&mut self, index: usize, len: usize) {
        if len == 0 {
            self.cursor = 0;
            self.offset = 0;
            return;
        }
        self.cursor = index.min(len - 1);
        self.ensure_cursor_visible(len);
    }

    fn page(&mut self, direction: isize, len: usize) {
        let delta = (self.page_rows * self.columns) as isize;
        self.move_cursor(direction * delta, len);
    }

    fn set_status(&mut self, message: String) {
        self.status = message;
    }

    fn clamp_cursor(&mut self, len: usize) {
        if len == 0 {
            self.cursor = 0;
            self.offset = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }

    fn ensure_cursor_visible(&mut self, len: usize) {
        if len == 0 || self.page_rows == 0 {
            self.offset = 0;
            return;
        }
        let columns = self.columns.max(1);
        let row = self.cursor / columns;
        let total_rows = len.div_ceil(columns);
        let max_offset = total_rows.saturating_sub(self.page_rows);

        if row < self.offset {
            self.offset = row;
        } else if row >= self.offset + self.page_rows {
            self.offset = row + 1 - self.page_rows;
        }

        if self.offset > max_offset {
            self.offset = max_offset;
        }
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_cursor_scrolls_by_rows() {
        let mut state = UiState {
            columns: 3,
            page_rows: 2,
            ..UiState::default()
        };
        state.move_cursor(3, 10);
        assert_eq!((state.cursor, state.offset), (3, 0));
        state.move_cursor(3, 10);
        assert_eq!((state.cursor, state.offset), (6, 1));
        state.move_to(9, 10);
        assert_eq!((state.cursor, state.offset), (9, 2));
        state.page(-1, 10);
        assert_eq!((state.cursor, state.offset), (3, 1));
        state.move_cursor(-10, 10);
        assert_eq!((state.cursor, state.offset), (0, 0));
    }

    #[test]
    fn cursor_clamps_when_cards_shrink() {
        let mut state = UiState::default();
        state.move_to(8, 9);
        state.clamp_cursor(4);
        assert_eq!(state.cursor, 3);
        state.clamp_cursor(0);
        assert_eq!((state.cursor, state.offset), (0, 0));
        state.move_cursor(1, 0);
        assert_eq!(state.cursor, 0);
    }

    #[test]
    fn centered_rect_fits_area() {
        let area = Rect::new(0, 0, 40, 10);
        let rect = centered_rect(70, 16, area);
        assert_eq!(rect, Rect::new(0, 0, 40, 10));
        let rect = centered_rect(20, 4, area);
        assert_eq!(rect, Rect::new(10, 3, 20, 4));
    }
}
