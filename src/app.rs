use std::time::Instant;

use tracing::{debug, warn};

use crate::config::UI_CHROME_ROWS;
use crate::error::{AppError, Result};
use crate::types::{GlobalStats, Market, MarketSnapshot};
use crate::view::ViewState;

// ---------------------------------------------------------------------------
// Modes, pages, input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Loading,
    Error,
    List,
    Detail,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Page {
    #[default]
    Markets,
    Stats,
    About,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Markets, Page::Stats, Page::About];

    pub fn index(self) -> usize {
        match self {
            Page::Markets => 0,
            Page::Stats => 1,
            Page::About => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn title(self) -> &'static str {
        match self {
            Page::Markets => "Markets",
            Page::Stats => "Stats",
            Page::About => "About",
        }
    }
}

/// Terminal-independent key, mapped from crossterm by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Ctrl(char),
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Enter,
    Esc,
    Tab,
    BackTab,
    Backspace,
}

#[derive(Debug)]
pub enum Event {
    Resize { width: u16, height: u16 },
    FetchCompleted(Result<MarketSnapshot>),
    TimerFired,
    /// Animation tick from the UI loop.
    Tick,
    Key(Key),
}

/// Side effects requested by [`App::update`], executed by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Fetch,
    ArmTimer,
    Quit,
}

/// A failed fetch as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub kind: &'static str,
    pub message: String,
}

impl From<&AppError> for FetchFailure {
    fn from(e: &AppError) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct App {
    pub mode: Mode,
    pub page: Page,
    pub view: ViewState,
    pub markets: Vec<Market>,
    pub stats: GlobalStats,
    /// A fetch is in flight. Guards against issuing a second one.
    pub loading: bool,
    pub auto_refresh: bool,
    pub error: Option<FetchFailure>,
    /// Index into the visible list of the market open in the detail view.
    pub detail: Option<usize>,
    pub last_update: Option<Instant>,
    pub spinner_frame: usize,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            mode: Mode::Loading,
            page: Page::Markets,
            view: ViewState::default(),
            markets: Vec::new(),
            stats: GlobalStats::default(),
            loading: false,
            auto_refresh: true,
            error: None,
            detail: None,
            last_update: None,
            spinner_frame: 0,
        }
    }

    /// Effects to run at startup: first fetch plus the refresh timer.
    pub fn init(&mut self) -> Vec<Effect> {
        self.loading = true;
        self.mode = Mode::Loading;
        vec![Effect::Fetch, Effect::ArmTimer]
    }

    pub fn detail_market(&self) -> Option<&Market> {
        self.detail.and_then(|i| self.view.visible().get(i))
    }

    /// Single state transition. Never blocks and never performs I/O.
    pub fn update(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::Resize { height, .. } => {
                let rows = usize::from(height.saturating_sub(UI_CHROME_ROWS)).max(1);
                self.view.set_page_size(rows);
                Vec::new()
            }
            Event::FetchCompleted(result) => {
                self.on_fetch_completed(result);
                Vec::new()
            }
            Event::TimerFired => self.on_timer(),
            Event::Tick => {
                self.spinner_frame = self.spinner_frame.wrapping_add(1);
                Vec::new()
            }
            Event::Key(key) => self.on_key(key),
        }
    }

    fn on_fetch_completed(&mut self, result: Result<MarketSnapshot>) {
        self.loading = false;
        match result {
            Ok(snapshot) => {
                let detail_id = self.detail_market().map(|m| m.id.clone());

                self.markets = snapshot.markets;
                self.stats = snapshot.stats;
                self.error = None;
                self.last_update = Some(Instant::now());
                self.view.refresh(&self.markets);

                // Follow the open market to its new row, or drop back to the list.
                self.detail = detail_id.and_then(|id| self.view.visible().iter().position(|m| m.id == id));
                if let Some(row) = self.detail {
                    self.view.select(row);
                }
                self.mode = match (self.mode, self.detail) {
                    (Mode::Detail, Some(_)) => Mode::Detail,
                    _ => Mode::List,
                };
                debug!(markets = self.markets.len(), visible = self.view.visible().len(), "applied refresh");
            }
            Err(e) => {
                warn!("Fetch failed ({}): {e}", e.kind());
                self.error = Some(FetchFailure::from(&e));
                self.detail = None;
                // Keys belong to the error view now; keep what was typed.
                self.view.confirm_search();
                self.mode = Mode::Error;
            }
        }
    }

    /// The timer always re-arms; it only fetches when idle and auto-refresh is on.
    fn on_timer(&mut self) -> Vec<Effect> {
        let mut effects = vec![Effect::ArmTimer];
        if self.auto_refresh && !self.loading {
            self.loading = true;
            effects.push(Effect::Fetch);
        }
        effects
    }

    fn request_refresh(&mut self) -> Vec<Effect> {
        if self.loading {
            return Vec::new();
        }
        self.loading = true;
        self.mode = Mode::Loading;
        self.error = None;
        self.detail = None;
        vec![Effect::Fetch]
    }

    // -----------------------------------------------------------------------
    // Key handling
    // -----------------------------------------------------------------------

    fn on_key(&mut self, key: Key) -> Vec<Effect> {
        if key == Key::Ctrl('c') {
            return vec![Effect::Quit];
        }
        if self.view.search_mode && self.mode == Mode::List {
            self.on_search_key(key);
            return Vec::new();
        }

        match key {
            Key::Char('q') => return vec![Effect::Quit],
            Key::Char('r') => return self.request_refresh(),
            Key::Char('a') => {
                self.auto_refresh = !self.auto_refresh;
                return Vec::new();
            }
            Key::Tab => {
                self.page = self.page.next();
                return Vec::new();
            }
            Key::BackTab => {
                self.page = self.page.prev();
                return Vec::new();
            }
            Key::Char(c @ '1'..='3') => {
                let idx = c as usize - '1' as usize;
                self.page = Page::ALL[idx];
                return Vec::new();
            }
            _ => {}
        }

        match self.mode {
            Mode::Loading => {
                if key == Key::Esc {
                    return vec![Effect::Quit];
                }
            }
            Mode::Error => {
                if key == Key::Esc {
                    if self.markets.is_empty() {
                        return vec![Effect::Quit];
                    }
                    self.error = None;
                    self.mode = Mode::List;
                }
            }
            Mode::List | Mode::Detail if self.page != Page::Markets => {
                if key == Key::Esc {
                    self.page = Page::Markets;
                }
            }
            Mode::List => return self.on_list_key(key),
            Mode::Detail => self.on_detail_key(key),
        }
        Vec::new()
    }

    fn on_list_key(&mut self, key: Key) -> Vec<Effect> {
        match key {
            Key::Esc => return vec![Effect::Quit],
            Key::Enter => {
                if self.view.selected().is_some() {
                    self.detail = Some(self.view.cursor);
                    self.mode = Mode::Detail;
                }
            }
            Key::Char('/') => self.view.begin_search(),
            Key::Char('f') => self.view.cycle_filter(&self.markets),
            Key::Char('s') => self.view.cycle_sort(&self.markets),
            Key::Char('c') => self.view.clear(&self.markets),
            _ => self.on_navigation_key(key),
        }
        Vec::new()
    }

    fn on_detail_key(&mut self, key: Key) {
        match key {
            Key::Esc | Key::Backspace => {
                self.detail = None;
                self.mode = Mode::List;
            }
            // Step through markets without leaving the detail view.
            Key::Up | Key::Char('k') | Key::Down | Key::Char('j') => {
                self.on_navigation_key(key);
                self.detail = Some(self.view.cursor);
            }
            _ => {}
        }
    }

    fn on_search_key(&mut self, key: Key) {
        match key {
            Key::Enter => self.view.confirm_search(),
            Key::Esc => self.view.cancel_search(&self.markets),
            Key::Backspace => self.view.pop_query_char(&self.markets),
            Key::Char(c) => self.view.push_query_char(c, &self.markets),
            _ => self.on_navigation_key(key),
        }
    }

    fn on_navigation_key(&mut self, key: Key) {
        match key {
            Key::Up | Key::Char('k') => self.view.move_up(),
            Key::Down | Key::Char('j') => self.view.move_down(),
            Key::Home | Key::Char('g') => self.view.home(),
            Key::End | Key::Char('G') => self.view.end(),
            Key::PageUp => self.view.page_up(),
            Key::PageDown => self.view.page_down(),
            _ => {}
        }
    }
}
