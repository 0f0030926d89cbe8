use std::io;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use polyterm::app::{App, Effect, Event, Key};
use polyterm::config::{Config, TICK_INTERVAL_MS};
use polyterm::error::Result;
use polyterm::fetcher::FetchClient;
use polyterm::types::MarketSnapshot;
use polyterm::ui::{render, Theme};

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = init_tracing(&cfg) {
        eprintln!("Log file error: {e}");
        std::process::exit(1);
    }

    let client = match FetchClient::new(&cfg) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("HTTP client error: {e}");
            std::process::exit(1);
        }
    };

    info!(
        url = %cfg.gamma_api_url,
        limit = cfg.market_limit,
        refresh_secs = cfg.refresh_interval.as_secs(),
        "polyterm starting"
    );

    if let Err(e) = run(&cfg, client).await {
        error!("Fatal error: {e}");
        eprintln!("Fatal error: {e}");
        std::process::exit(1);
    }
}

/// Logs go to LOG_FILE only; stdout is owned by the terminal UI.
fn init_tracing(cfg: &Config) -> Result<()> {
    let Some(path) = cfg.log_file.as_deref() else {
        return Ok(());
    };
    let file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

async fn run(cfg: &Config, client: FetchClient) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, cfg, client).await;

    // Restore terminal regardless of result
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

// ---------------------------------------------------------------------------
// Effect runner
// ---------------------------------------------------------------------------

struct Runtime {
    client: FetchClient,
    limit: usize,
    refresh_interval: Duration,
    results: mpsc::UnboundedSender<Result<MarketSnapshot>>,
    /// When the refresh timer fires next. `None` while disarmed.
    deadline: Option<Instant>,
}

impl Runtime {
    /// Executes effects in order. Returns `false` once `Quit` is seen.
    fn apply(&mut self, effects: Vec<Effect>) -> bool {
        for effect in effects {
            match effect {
                Effect::Fetch => self.spawn_fetch(),
                Effect::ArmTimer => self.deadline = Some(Instant::now() + self.refresh_interval),
                Effect::Quit => return false,
            }
        }
        true
    }

    fn spawn_fetch(&self) {
        let client = self.client.clone();
        let results = self.results.clone();
        let limit = self.limit;
        tokio::spawn(async move {
            let result = client.fetch_markets(limit).await;
            if results.send(result).is_err() {
                debug!("UI loop gone, dropping fetch result");
            }
        });
    }

    fn timer_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    cfg: &Config,
    client: FetchClient,
) -> Result<()> {
    let theme = Theme::default();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut runtime = Runtime {
        client,
        limit: cfg.market_limit,
        refresh_interval: cfg.refresh_interval,
        results: tx,
        deadline: None,
    };

    let mut app = App::new();
    let size = terminal.size()?;
    app.update(Event::Resize {
        width: size.width,
        height: size.height,
    });
    let startup = app.init();
    if !runtime.apply(startup) {
        return Ok(());
    }

    let tick_rate = Duration::from_millis(TICK_INTERVAL_MS);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| render(f, &app, &theme))?;

        let mut events = Vec::new();

        let timeout = tick_rate.checked_sub(last_tick.elapsed()).unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            match event::read()? {
                TermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(k) = map_key(key) {
                        events.push(Event::Key(k));
                    }
                }
                TermEvent::Resize(width, height) => events.push(Event::Resize { width, height }),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            events.push(Event::Tick);
            last_tick = Instant::now();
        }

        while let Ok(result) = rx.try_recv() {
            events.push(Event::FetchCompleted(result));
        }

        if runtime.timer_due(Instant::now()) {
            events.push(Event::TimerFired);
        }

        for ev in events {
            let effects = app.update(ev);
            if !runtime.apply(effects) {
                info!("quit requested");
                return Ok(());
            }
        }
    }
}

fn map_key(key: KeyEvent) -> Option<Key> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if let KeyCode::Char(c) = key.code {
            return Some(Key::Ctrl(c.to_ascii_lowercase()));
        }
    }
    let k = match key.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Esc,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => Key::BackTab,
        KeyCode::Backspace => Key::Backspace,
        _ => return None,
    };
    Some(k)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Option<Key> {
        map_key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn maps_plain_and_control_keys() {
        assert_eq!(press(KeyCode::Char('j'), KeyModifiers::NONE), Some(Key::Char('j')));
        assert_eq!(press(KeyCode::Char('G'), KeyModifiers::SHIFT), Some(Key::Char('G')));
        assert_eq!(press(KeyCode::Char('c'), KeyModifiers::CONTROL), Some(Key::Ctrl('c')));
        assert_eq!(press(KeyCode::BackTab, KeyModifiers::SHIFT), Some(Key::BackTab));
        assert_eq!(press(KeyCode::F(5), KeyModifiers::NONE), None);
    }

    #[tokio::test]
    async fn runtime_arms_timer_and_stops_on_quit() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut runtime = Runtime {
            client: FetchClient::new(&Config::default()).unwrap(),
            limit: 10,
            refresh_interval: Duration::from_secs(30),
            results: tx,
            deadline: None,
        };

        assert!(runtime.apply(vec![Effect::ArmTimer]));
        assert!(runtime.deadline.is_some());
        assert!(!runtime.timer_due(Instant::now()));
        assert!(runtime.timer_due(Instant::now() + Duration::from_secs(31)));
        assert!(runtime.deadline.is_none());

        assert!(!runtime.apply(vec![Effect::ArmTimer, Effect::Quit]));
    }
}
