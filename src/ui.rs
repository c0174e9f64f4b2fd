use crate::app::{update, AppMsg, Effect};
use crate::feed::form_feed::FormFeed;
use crate::feed::registry::build_feeds;
use crate::feed::FeedWidget;
use crate::model::DashboardConfig;
use crate::services::env::env_flag;
use crate::services::http::{spawn_submit, SubmitMsg};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

const TICK_MS: u64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

pub struct Toast {
    pub text: String,
    pub level: ToastLevel,
    pub expires_at_tick: u64,
}

#[derive(Default)]
pub(crate) struct AppState {
    pub(crate) config: DashboardConfig,
    pub(crate) feeds: Vec<Box<dyn FeedWidget>>,
    pub(crate) selected: usize,
    pub(crate) tick: u64,
    pub(crate) toast: Option<Toast>,
    pub(crate) theme: crate::theme::Theme,
    // Feeds skipped at startup; kept for the whole session
    pub(crate) last_error: Option<String>,
    pub(crate) should_quit: bool,
    tx: Option<Sender<SubmitMsg>>,
    rx: Option<Receiver<SubmitMsg>>,
}

impl AppState {
    pub(crate) fn from_config(mut config: DashboardConfig) -> Self {
        config.resolve_defaults();
        let (mut feeds, errors) = build_feeds(&config);
        for feed in &mut feeds {
            feed.load();
        }
        let (tx, rx) = mpsc::channel::<SubmitMsg>();
        Self {
            config,
            feeds,
            last_error: (!errors.is_empty()).then(|| errors.join("; ")),
            theme: crate::theme::Theme::from_env(),
            tx: Some(tx),
            rx: Some(rx),
            ..Default::default()
        }
    }

    pub(crate) fn active_feed(&self) -> Option<&dyn FeedWidget> {
        self.feeds.get(self.selected).map(|f| &**f)
    }

    fn active_captures_keys(&self) -> bool {
        self.active_feed().map(|f| f.captures_keys()).unwrap_or(false)
    }
}

pub(crate) fn run_effects(state: &mut AppState, effects: Vec<Effect>) {
    for eff in effects {
        match eff {
            Effect::Submit { feed, request } => {
                tracing::info!(%feed, url = %request.url, "dispatching submit");
                match &state.tx {
                    Some(tx) => spawn_submit(feed, request, tx.clone()),
                    None => tracing::warn!(%feed, "no result channel; submit dropped"),
                }
            }
            Effect::ShowToast {
                text,
                level,
                seconds,
            } => {
                let ticks = seconds.saturating_mul(1000 / TICK_MS);
                state.toast = Some(Toast {
                    text,
                    level,
                    expires_at_tick: state.tick.saturating_add(ticks),
                });
            }
            Effect::CopyToClipboard { text } => {
                let copied = arboard::Clipboard::new().and_then(|mut c| c.set_text(text));
                let (msg, level) = match copied {
                    Ok(()) => ("Copied result to clipboard".to_string(), ToastLevel::Success),
                    Err(e) => {
                        tracing::warn!(error = %e, "clipboard unavailable");
                        (format!("Clipboard unavailable: {e}"), ToastLevel::Error)
                    }
                };
                state.toast = Some(Toast {
                    text: msg,
                    level,
                    expires_at_tick: state.tick + 3 * (1000 / TICK_MS),
                });
            }
        }
    }
}

/// Drain finished submissions into their feeds. Returns how many arrived.
pub(crate) fn pump_results(state: &mut AppState) -> usize {
    let mut drained: Vec<SubmitMsg> = Vec::new();
    if let Some(rx) = &state.rx {
        while let Ok(msg) = rx.try_recv() {
            drained.push(msg);
        }
    }
    let n = drained.len();
    for msg in drained {
        let effects = update(
            state,
            AppMsg::SubmitDone {
                feed: msg.feed,
                outcome: msg.outcome,
            },
        );
        run_effects(state, effects);
    }
    n
}

pub(crate) fn handle_key(state: &mut AppState, key: KeyCode) {
    if !state.active_captures_keys() {
        let msg = match key {
            KeyCode::Char('q') => {
                state.should_quit = true;
                return;
            }
            KeyCode::F(n) => {
                match crate::widgets::feed_tabs::handle_function_key(state, n) {
                    Some(idx) => Some(AppMsg::SelectFeed(idx)),
                    None => return,
                }
            }
            KeyCode::Char(']') if !state.feeds.is_empty() => {
                Some(AppMsg::SelectFeed((state.selected + 1) % state.feeds.len()))
            }
            KeyCode::Char('[') if !state.feeds.is_empty() => Some(AppMsg::SelectFeed(
                (state.selected + state.feeds.len() - 1) % state.feeds.len(),
            )),
            KeyCode::Char('r') => Some(AppMsg::ReloadFeed),
            KeyCode::Char('y') => Some(AppMsg::CopyResult),
            _ => None,
        };
        if let Some(msg) = msg {
            let effects = update(state, msg);
            run_effects(state, effects);
            return;
        }
    }
    let sel = state.selected;
    if let Some(feed) = state.feeds.get_mut(sel) {
        let effects = feed.on_key(key);
        run_effects(state, effects);
    }
}

pub fn run() -> Result<()> {
    let cfg = crate::services::config::load_config()?;
    let mut state = AppState::from_config(cfg);
    tracing::info!(feeds = state.feeds.len(), "dashboard ready");
    if env_flag("FEED_DASH_HEADLESS") {
        return run_headless(&mut state);
    }
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let res = event_loop(&mut terminal, &mut state);
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, state: &mut AppState) -> Result<()> {
    let tick_rate = Duration::from_millis(TICK_MS);
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| ui(f, state))?;
        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if key.modifiers.contains(KeyModifiers::CONTROL)
                        && key.code == KeyCode::Char('c')
                    {
                        state.should_quit = true;
                    } else {
                        handle_key(state, key.code);
                    }
                }
            }
        }
        pump_results(state);
        if state.should_quit {
            return Ok(());
        }
        if last_tick.elapsed() >= tick_rate {
            state.tick = state.tick.wrapping_add(1);
            last_tick = Instant::now();
        }
    }
}

/// Render into an off-screen buffer for a fixed number of ticks; used for
/// smoke checks without a terminal.
fn run_headless(state: &mut AppState) -> Result<()> {
    let ticks: u64 = std::env::var("FEED_DASH_TICKS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(10);
    let submit_feed: Option<String> = std::env::var("FEED_DASH_HEADLESS_SUBMIT").ok();
    let backend = ratatui::backend::TestBackend::new(100, 30);
    let mut terminal = Terminal::new(backend)?;
    let mut submitted = false;
    let mut results = 0usize;
    for _ in 0..ticks {
        if !submitted {
            if let Some(name) = submit_feed.as_deref() {
                submitted = headless_submit(state, name);
            }
        }
        terminal.draw(|f| ui(f, state))?;
        results += pump_results(state);
        state.tick = state.tick.wrapping_add(1);
        std::thread::sleep(Duration::from_millis(TICK_MS));
    }
    let line = serde_json::json!({
        "ok": state.last_error.is_none(),
        "feeds": state.feeds.len(),
        "submitted": submitted,
        "results": results,
        "result_present": state.active_feed().and_then(|f| f.last_result()).is_some(),
    });
    println!("{line}");
    Ok(())
}

fn headless_submit(state: &mut AppState, name: &str) -> bool {
    let Some(idx) = state.feeds.iter().position(|f| f.name() == name) else {
        return false;
    };
    state.selected = idx;
    let request = state.feeds[idx]
        .as_any_mut()
        .downcast_mut::<FormFeed>()
        .and_then(|form| form.submit());
    match request {
        Some(request) => {
            run_effects(
                state,
                vec![Effect::Submit {
                    feed: name.to_string(),
                    request,
                }],
            );
            true
        }
        None => false,
    }
}

pub(crate) fn ui(f: &mut Frame, state: &mut AppState) {
    if let Some(t) = &state.toast {
        if state.tick >= t.expires_at_tick {
            state.toast = None;
        }
    }

    let screen = f.area();
    let bg = Block::default().style(Style::default().bg(state.theme.bg));
    f.render_widget(bg, screen);

    let chunks = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .split(screen);

    crate::widgets::feed_tabs::draw_feed_tabs(f, chunks[0], state);

    let body = chunks[1];
    let sel = state.selected;
    let tick = state.tick;
    let theme = &state.theme;
    if let Some(feed) = state.feeds.get_mut(sel) {
        feed.render(f, body, true, tick, theme);
    } else {
        let mut lines = vec![
            Line::from("No feeds configured."),
            Line::from(Span::styled(
                "Create dashboard.yaml (or .feeds/dashboard.yaml), or set FEED_DASH_CONFIG_DIR.",
                theme.text_muted(),
            )),
        ];
        if let Some(err) = &state.last_error {
            lines.push(Line::from(Span::styled(
                err.clone(),
                theme.text_error(),
            )));
        }
        let p = Paragraph::new(lines)
            .block(crate::widgets::chrome::panel_block("Feeds", false, theme))
            .wrap(Wrap { trim: false });
        f.render_widget(p, body);
    }

    crate::widgets::status_bar::draw_status(f, chunks[2], state);
}
