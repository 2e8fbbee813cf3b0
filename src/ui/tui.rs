//! Ratatui-based interface wired to the instant search pipeline.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{ExecutableCommand, execute};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::model::types::{EntityType, entity_label};
use crate::search::fallback::default_entity_types;
use crate::search::http::HttpGateway;
use crate::search::pipeline::{PipelineEvent, PipelineSettings, QueryPipeline, Surface, next_settled};
use crate::ui::components::theme::{ThemePalette, kbd_style};
use crate::ui::components::widgets::{entity_chips, search_bar};
use crate::ui::data::{FocusRegion, detail_lines, result_line, status_summary};
use crate::ui::navigate::{ConsoleNavigator, Navigator};
use crate::ui::selection::{CommandOutcome, SelectionCommand, SelectionController, SelectionPhase};
use crate::ui::shortcuts::{
    self, FocusPoll, FocusTarget, PendingFocus, ShortcutAction, ShortcutListener,
};

fn help_lines(palette: ThemePalette, shortcut: &str) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    let add_section = |title: &str, items: &[(&str, &str)]| -> Vec<Line<'static>> {
        let mut v = Vec::new();
        v.push(Line::from(Span::styled(title.to_string(), palette.title())));
        for (keys, what) in items {
            v.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(keys.to_string(), kbd_style(palette)),
                Span::raw(format!("  {what}")),
            ]));
        }
        v.push(Line::from(""));
        v
    };

    lines.extend(add_section(
        "Search",
        &[
            ("type", "live-search panels, boards, inputs, outputs, events"),
            (shortcut, "focus the search box from anywhere"),
            (shortcuts::FOCUS_QUERY_FROM_RESULTS, "focus the search box from the results"),
            (shortcuts::CLEAR_QUERY, "clear the query (in the search box)"),
        ],
    ));
    lines.extend(add_section(
        "Results",
        &[
            (shortcuts::MOVE, "move the highlight"),
            (shortcuts::JUMP_TOP, "first result"),
            (shortcuts::JUMP_BOTTOM, "last result"),
            (shortcuts::OPEN, "open the highlighted result in the console"),
            (shortcuts::TAB_FOCUS, "toggle focus (search box ⇄ results)"),
        ],
    ));
    lines.extend(add_section(
        "General",
        &[
            (shortcuts::THEME, "theme: dark/light"),
            (shortcuts::HELP, "toggle this help"),
            (shortcuts::QUIT, "quit (Esc quits from the results)"),
        ],
    ));
    lines.extend(add_section(
        "Offline",
        &[(
            "",
            "when the service is down a notice replaces the status line; keep typing to retry",
        )],
    ));

    lines
}

fn render_help_overlay(frame: &mut Frame, palette: ThemePalette, scroll: u16, shortcut: &str) {
    let area = frame.area();
    let popup_area = centered_rect(70, 70, area);
    let lines = help_lines(palette, shortcut);
    let block = Block::default()
        .title(Span::styled("Help / Shortcuts", palette.title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent));

    frame.render_widget(ratatui::widgets::Clear, popup_area);

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .scroll((scroll, 0)),
        popup_area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1]);

    horizontal[1]
}

pub fn footer_legend(show_help: bool) -> String {
    if show_help {
        format!(
            "{} close help • {} search • {} focus • {} move • {}/{} first/last • {} open • {} theme • {} quit",
            shortcuts::HELP,
            shortcuts::FOCUS_QUERY,
            shortcuts::TAB_FOCUS,
            shortcuts::MOVE,
            shortcuts::JUMP_TOP,
            shortcuts::JUMP_BOTTOM,
            shortcuts::OPEN,
            shortcuts::THEME,
            shortcuts::QUIT,
        )
    } else {
        format!(
            "{} help | {} search | {} move | {} open | {} clear | {} theme | {} quit",
            shortcuts::HELP,
            shortcuts::FOCUS_QUERY,
            shortcuts::MOVE,
            shortcuts::OPEN,
            shortcuts::CLEAR_QUERY,
            shortcuts::THEME,
            shortcuts::QUIT,
        )
    }
}

/// What the event loop has to do after a key went through [`App::handle_key`].
#[derive(Clone, Debug, PartialEq, Eq)]
enum KeyOutcome {
    Ignored,
    Redraw,
    /// The query text changed and must be fed to the pipeline.
    QueryChanged,
    /// The query was emptied by a clear or a commit.
    QueryCleared,
    FocusQuery,
    Quit,
}

/// Presenter state; owns nothing async.
struct App {
    query: String,
    focus: FocusRegion,
    /// The search box exists only after the first frame has been drawn.
    query_mounted: bool,
    selection: SelectionController,
    searching: bool,
    theme_dark: bool,
    show_help: bool,
    help_scroll: u16,
    entity_types: Vec<EntityType>,
    last_opened: Option<String>,
    /// Shortest query the pipeline will dispatch; drives the empty-state prompt.
    min_query_len: usize,
}

impl App {
    fn new() -> Self {
        Self {
            query: String::new(),
            focus: FocusRegion::Results,
            query_mounted: false,
            selection: SelectionController::new(),
            searching: false,
            theme_dark: true,
            show_help: false,
            help_scroll: 0,
            entity_types: Vec::new(),
            last_opened: None,
            min_query_len: PipelineSettings::instant().min_query_len,
        }
    }

    fn palette(&self) -> ThemePalette {
        if self.theme_dark {
            ThemePalette::dark()
        } else {
            ThemePalette::light()
        }
    }

    fn on_pipeline(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::Searching { .. } => self.searching = true,
            PipelineEvent::Settled(set) => {
                self.searching = false;
                self.selection.apply(set);
            }
        }
    }

    fn handle_key(
        &mut self,
        key: KeyEvent,
        listener: &ShortcutListener,
        navigator: &mut impl Navigator,
    ) -> KeyOutcome {
        if key.kind != KeyEventKind::Press {
            return KeyOutcome::Ignored;
        }
        if listener.observe(&key) == ShortcutAction::FocusQuery {
            return KeyOutcome::FocusQuery;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && matches!(key.code, KeyCode::Char('c')) {
            return KeyOutcome::Quit;
        }

        match key.code {
            KeyCode::F(1) => {
                self.show_help = !self.show_help;
                self.help_scroll = 0;
                return KeyOutcome::Redraw;
            }
            KeyCode::F(2) => {
                self.theme_dark = !self.theme_dark;
                return KeyOutcome::Redraw;
            }
            _ => {}
        }

        if self.show_help {
            return match key.code {
                KeyCode::Esc => {
                    self.show_help = false;
                    KeyOutcome::Redraw
                }
                KeyCode::Up => {
                    self.help_scroll = self.help_scroll.saturating_sub(1);
                    KeyOutcome::Redraw
                }
                KeyCode::Down => {
                    self.help_scroll = self.help_scroll.saturating_add(1);
                    KeyOutcome::Redraw
                }
                _ => KeyOutcome::Ignored,
            };
        }

        let command = match key.code {
            KeyCode::Down => Some(SelectionCommand::MoveNext),
            KeyCode::Up => Some(SelectionCommand::MovePrevious),
            KeyCode::Home => Some(SelectionCommand::MoveFirst),
            KeyCode::End => Some(SelectionCommand::MoveLast),
            KeyCode::Enter => Some(SelectionCommand::Commit),
            KeyCode::Esc if self.focus == FocusRegion::Query => Some(SelectionCommand::Clear),
            _ => None,
        };
        if let Some(command) = command {
            return self.run_command(command, navigator);
        }

        match (self.focus, key.code) {
            (_, KeyCode::Tab) => {
                self.focus = self.focus.toggle();
                KeyOutcome::Redraw
            }
            (FocusRegion::Results, KeyCode::Esc) => KeyOutcome::Quit,
            (FocusRegion::Results, KeyCode::Char('/')) => KeyOutcome::FocusQuery,
            (FocusRegion::Query, KeyCode::Backspace) => {
                if self.query.pop().is_some() {
                    KeyOutcome::QueryChanged
                } else {
                    KeyOutcome::Ignored
                }
            }
            (FocusRegion::Query, KeyCode::Char(c))
                if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) =>
            {
                self.query.push(c);
                KeyOutcome::QueryChanged
            }
            _ => KeyOutcome::Ignored,
        }
    }

    fn run_command(&mut self, command: SelectionCommand, navigator: &mut impl Navigator) -> KeyOutcome {
        let outcome = self.selection.handle(command, navigator);
        if let CommandOutcome::Committed { route } = &outcome {
            self.last_opened = route.clone();
        }
        if outcome.clears_query() {
            self.query.clear();
            return KeyOutcome::QueryCleared;
        }
        match outcome {
            CommandOutcome::Ignored => KeyOutcome::Ignored,
            _ => KeyOutcome::Redraw,
        }
    }

    fn chip_counts(&self) -> Vec<(String, Option<u64>)> {
        let facets = self.selection.results().and_then(|set| set.facets.as_ref());
        self.entity_types
            .iter()
            .map(|ty| {
                let count = facets.and_then(|f| f.entity_types.get(&ty.id)).copied();
                (entity_label(&ty.id), count)
            })
            .collect()
    }
}

impl FocusTarget for App {
    fn try_focus(&mut self) -> bool {
        if self.query_mounted {
            self.focus = FocusRegion::Query;
        }
        self.query_mounted
    }
}

fn draw(frame: &mut Frame, app: &App, shortcut_hint: &str) {
    let palette = app.palette();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3), // search bar
                Constraint::Length(1), // entity chips
                Constraint::Min(0),    // results + detail
                Constraint::Length(1), // status / advisory
                Constraint::Length(1), // footer
            ]
            .as_ref(),
        )
        .split(frame.area());

    frame.render_widget(
        search_bar(
            &app.query,
            palette,
            app.focus == FocusRegion::Query,
            shortcut_hint,
            app.searching,
        ),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(entity_chips(&app.chip_counts(), palette)),
        chunks[1],
    );

    let main_split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)].as_ref())
        .split(chunks[2]);

    let results_border = if app.focus == FocusRegion::Results {
        palette.border_focus_style()
    } else {
        palette.border_style()
    };
    let results_block = Block::default()
        .title(Span::styled("Results", palette.title()))
        .borders(Borders::ALL)
        .border_style(results_border);

    let items = app.selection.items();
    if items.is_empty() {
        let hint = match app.selection.phase() {
            SelectionPhase::Loaded => format!("No matches for '{}'", app.query.trim()),
            _ => status_summary(app.selection.results(), app.min_query_len),
        };
        frame.render_widget(
            Paragraph::new(Span::styled(hint, palette.hint_style())).block(results_block),
            main_split[0],
        );
    } else {
        let rows: Vec<ListItem> = items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                ListItem::new(result_line(item, &app.query, palette)).style(palette.stripe(idx))
            })
            .collect();
        let list = List::new(rows)
            .block(results_block)
            .highlight_style(palette.selected_style())
            .highlight_symbol("▶ ");
        let mut state = ListState::default();
        state.select(app.selection.index());
        frame.render_stateful_widget(list, main_split[0], &mut state);
    }

    let detail = app
        .selection
        .highlighted()
        .map(|item| detail_lines(item, palette))
        .unwrap_or_default();
    frame.render_widget(
        Paragraph::new(detail)
            .block(
                Block::default()
                    .title(Span::styled("Detail", palette.title()))
                    .borders(Borders::ALL)
                    .border_style(palette.border_style()),
            )
            .wrap(Wrap { trim: true }),
        main_split[1],
    );

    let status = match (app.selection.advisory(), &app.last_opened) {
        (Some(advisory), _) => Span::styled(advisory.to_string(), palette.advisory_style()),
        (None, Some(route)) if app.selection.phase() == SelectionPhase::Idle => {
            Span::styled(format!("Opened {route}"), palette.hint_style())
        }
        _ => Span::styled(
            status_summary(app.selection.results(), app.min_query_len),
            palette.hint_style(),
        ),
    };
    frame.render_widget(Paragraph::new(Line::from(status)), chunks[3]);
    frame.render_widget(
        Paragraph::new(Span::styled(footer_legend(app.show_help), palette.hint_style())),
        chunks[4],
    );

    if app.show_help {
        render_help_overlay(frame, palette, app.help_scroll, shortcut_hint);
    }
}

/// Crossterm's reader blocks, so it lives on its own thread.
fn spawn_event_reader(tx: mpsc::UnboundedSender<Event>) {
    std::thread::spawn(move || {
        loop {
            match event::poll(Duration::from_millis(250)) {
                Ok(true) => match event::read() {
                    Ok(ev) => {
                        if tx.send(ev).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("terminal read failed: {e}");
                        break;
                    }
                },
                Ok(false) if tx.is_closed() => break,
                Ok(false) => {}
                Err(e) => {
                    warn!("terminal poll failed: {e}");
                    break;
                }
            }
        }
    });
}

async fn focus_due(pending: Option<Instant>) {
    match pending {
        Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
        None => std::future::pending().await,
    }
}

pub async fn run_tui(config: &Config, once: bool) -> Result<()> {
    if once
        && std::env::var("TUI_HEADLESS")
            .map(|v| v == "1")
            .unwrap_or(false)
    {
        return run_tui_headless(config).await;
    }

    let listener = ShortcutListener::new(config.shortcut_combo()?);
    let retry = config.focus_retry();
    let gateway = Arc::new(HttpGateway::new(&config.api_url, config.request_timeout())?);
    let settings = config.pipeline_settings(Surface::Instant);
    let min_query_len = settings.min_query_len;
    let (pipeline, mut events) = QueryPipeline::spawn(Arc::clone(&gateway), settings);
    let mut navigator = ConsoleNavigator::new(config.console_url.clone(), config.open_browser);

    let mut chips_task = tokio::spawn({
        let gateway = Arc::clone(&gateway);
        async move { gateway.entity_types_or_default().await }
    });
    let mut chips_pending = true;

    let mut stdout = io::stdout();
    enable_raw_mode().context("enabling raw mode")?;
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (term_tx, mut term_rx) = mpsc::unbounded_channel();
    spawn_event_reader(term_tx);

    let mut app = App::new();
    app.min_query_len = min_query_len;
    let shortcut_hint = listener.combo().to_string();
    // The search box is not drawn yet; this goes through the retry path.
    let mut pending_focus = listener.focus(&mut app, retry, Instant::now());
    let mut needs_draw = true;
    info!(api = %gateway.base_url(), "tui_start");

    loop {
        if needs_draw {
            terminal.draw(|f| draw(f, &app, &shortcut_hint))?;
            app.query_mounted = true;
            needs_draw = false;
            if once {
                break;
            }
        }

        tokio::select! {
            ev = term_rx.recv() => {
                let Some(ev) = ev else { break };
                match ev {
                    Event::Key(key) => match app.handle_key(key, &listener, &mut navigator) {
                        KeyOutcome::Ignored => {}
                        KeyOutcome::Redraw => needs_draw = true,
                        KeyOutcome::QueryChanged => {
                            pipeline.set_text(app.query.clone());
                            needs_draw = true;
                        }
                        KeyOutcome::QueryCleared => {
                            pipeline.clear();
                            needs_draw = true;
                        }
                        KeyOutcome::FocusQuery => {
                            pending_focus = listener.focus(&mut app, retry, Instant::now());
                            needs_draw = true;
                        }
                        KeyOutcome::Quit => break,
                    },
                    Event::Resize(..) => needs_draw = true,
                    _ => {}
                }
            }
            Some(event) = events.recv() => {
                app.on_pipeline(event);
                needs_draw = true;
            }
            joined = &mut chips_task, if chips_pending => {
                chips_pending = false;
                app.entity_types = joined.unwrap_or_else(|e| {
                    warn!("entity type lookup task failed: {e}");
                    default_entity_types()
                });
                needs_draw = true;
            }
            () = focus_due(pending_focus.as_ref().map(PendingFocus::next_at)) => {
                if let Some(pending) = pending_focus.as_mut() {
                    match pending.poll(Instant::now(), &mut app) {
                        FocusPoll::Waiting => {}
                        FocusPoll::Focused | FocusPoll::GaveUp => {
                            debug!(attempts = pending.attempts(), "focus_request_done");
                            pending_focus = None;
                            needs_draw = true;
                        }
                    }
                }
            }
        }
    }

    if let Some(route) = navigator.last_route() {
        debug!(route, "tui_exit_last_route");
    }
    chips_task.abort();
    teardown_terminal()
}

/// Drives one pipeline round and one frame without a terminal or network.
async fn run_tui_headless(config: &Config) -> Result<()> {
    let listener = ShortcutListener::new(config.shortcut_combo()?);
    let gateway = Arc::new(HttpGateway::new(&config.api_url, config.request_timeout())?);
    let settings = config.pipeline_settings(Surface::Instant);
    let min_query_len = settings.min_query_len;
    let (pipeline, mut events) = QueryPipeline::spawn(gateway, settings);
    pipeline.clear();
    let set = next_settled(&mut events)
        .await
        .ok_or_else(|| anyhow::anyhow!("search pipeline stopped before settling"))?;

    let mut app = App::new();
    app.min_query_len = min_query_len;
    app.entity_types = default_entity_types();
    app.selection.apply(set);
    let mut terminal = Terminal::new(ratatui::backend::TestBackend::new(100, 30))?;
    terminal.draw(|f| draw(f, &app, &listener.combo().to_string()))?;
    Ok(())
}

fn teardown_terminal() -> Result<()> {
    let mut stdout = io::stdout();
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen)?;
    Ok(())
}
