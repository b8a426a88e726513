// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use beacon_app::{
    AppCommand, AppEvent, AppMode, AppState, FieldControl, FieldEdit, FormController, FormSchema,
    FormValues, FormViewSpec, LayoutItem, ListEndpoint, ListPage, ListRequest, ListState,
    ListViewSpec, RequestId, ResourceOption, TextControl, TimerToken, ViewOptions, ViewSpec,
    flatten_dotted, redact_pii, scalar_text, summarize_row,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap};
use serde_json::Value;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use time::macros::format_description;
use tracing::debug;

const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const TIMER_SLICE: Duration = Duration::from_millis(50);
const SPINNER_TEXT: &str = "loading...";
const TIME_COLUMN_WIDTH: u16 = 26;

pub trait AppRuntime {
    fn fetch_page(&mut self, endpoint: &ListEndpoint, page: u32) -> Result<ListPage>;
    fn load_form_schema(&mut self, url: &str) -> Result<FormSchema>;
    fn load_form_values(&mut self, url: &str) -> Result<FormValues>;
    fn load_resources(&mut self) -> Result<Vec<ResourceOption>>;
    fn submit_form(&mut self, url: &str, values: &FormValues) -> Result<()>;
    /// Fetches `request` and reports the outcome as a `PageLoaded` event.
    /// Runs inline by default; network runtimes move the fetch to a worker.
    fn spawn_page_load(
        &mut self,
        target: PageTarget,
        request: &ListRequest,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let result = self
            .fetch_page(&request.endpoint, request.page)
            .map_err(|error| format!("{error:#}"));
        tx.send(InternalEvent::PageLoaded {
            target,
            request_id: request.request_id,
            result,
        })
        .map_err(|_| anyhow!("page event channel closed"))?;
        Ok(())
    }
}

/// Identifies the list mount a page response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTarget {
    pub view: usize,
    pub mount: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus {
        token: u64,
    },
    PageLoaded {
        target: PageTarget,
        request_id: RequestId,
        result: Result<ListPage, String>,
    },
    RefreshTick {
        view: usize,
        token: TimerToken,
    },
}

/// Ticks a list view's periodic refresh. Dropping the handle stops the
/// thread and waits for it.
#[derive(Debug)]
pub struct RefreshTimer {
    token: TimerToken,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshTimer {
    pub fn start(
        view: usize,
        token: TimerToken,
        interval: Duration,
        tx: Sender<InternalEvent>,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            let mut waited = Duration::ZERO;
            while !thread_stop.load(Ordering::Relaxed) {
                thread::sleep(TIMER_SLICE);
                waited += TIMER_SLICE;
                if waited < interval {
                    continue;
                }
                waited = Duration::ZERO;
                if thread_stop.load(Ordering::Relaxed)
                    || tx.send(InternalEvent::RefreshTick { view, token }).is_err()
                {
                    break;
                }
            }
        });
        Self {
            token,
            stop,
            handle: Some(handle),
        }
    }

    pub fn token(&self) -> TimerToken {
        self.token
    }
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct DetailOverlay {
    title: String,
    pairs: Vec<(String, String)>,
    scroll: usize,
}

#[derive(Debug)]
struct ListPanel {
    view: usize,
    mount: u64,
    spec: ListViewSpec,
    list: ListState,
    cursor: usize,
    detail: Option<DetailOverlay>,
    timer: Option<RefreshTimer>,
}

impl ListPanel {
    fn target(&self) -> PageTarget {
        PageTarget {
            view: self.view,
            mount: self.mount,
        }
    }
}

#[derive(Debug)]
struct FormPanel {
    spec: FormViewSpec,
    controller: Option<FormController>,
    error: Option<String>,
    cursor: usize,
}

#[derive(Debug)]
enum Panel {
    List(ListPanel),
    Form(FormPanel),
}

#[derive(Debug, Default)]
struct ViewData {
    panel: Option<Panel>,
    mounts: u64,
    timer_token: TimerToken,
    status_token: u64,
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();
    mount_active_view(state, runtime, &mut view_data, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(state, runtime, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    unmount_panel(&mut view_data);
    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::PageLoaded {
                target,
                request_id,
                result,
            } => apply_page_event(view_data, target, request_id, result),
            InternalEvent::RefreshTick { view, token } => {
                let request = match view_data.panel.as_mut() {
                    Some(Panel::List(panel))
                        if panel.view == view
                            && panel.timer.as_ref().is_some_and(|timer| timer.token() == token) =>
                    {
                        panel.list.refresh_tick()
                    }
                    _ => None,
                };
                send_page_request(runtime, view_data, tx, request);
            }
        }
    }
}

fn apply_page_event(
    view_data: &mut ViewData,
    target: PageTarget,
    request_id: RequestId,
    result: Result<ListPage, String>,
) {
    let panel = match view_data.panel.as_mut() {
        Some(Panel::List(panel)) if panel.target() == target => panel,
        _ => {
            debug!(view = target.view, "dropped page for unmounted view");
            return;
        }
    };

    let applied = match result {
        Ok(page) => panel.list.apply_page(request_id, page),
        Err(error) => panel.list.apply_error(request_id, error),
    };
    if !applied {
        debug!(request_id = request_id.get(), "dropped superseded page");
    }
    let len = panel.list.rows().len();
    if panel.cursor >= len {
        panel.cursor = len.saturating_sub(1);
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn mount_active_view<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    unmount_panel(view_data);
    let Some(spec) = state.active().cloned() else {
        return;
    };
    let view = state.active_view;
    view_data.mounts = view_data.mounts.saturating_add(1);
    let mount = view_data.mounts;

    match spec {
        ViewSpec::List(spec) => {
            let mut list = ListState::new(spec.endpoint.clone(), spec.refresh_interval);
            let timer = if list.refresh_enabled() {
                view_data.timer_token = view_data.timer_token.next();
                Some(RefreshTimer::start(
                    view,
                    view_data.timer_token,
                    list.refresh_interval(),
                    tx.clone(),
                ))
            } else {
                None
            };
            let request = list.start();
            view_data.panel = Some(Panel::List(ListPanel {
                view,
                mount,
                spec,
                list,
                cursor: 0,
                detail: None,
                timer,
            }));
            send_page_request(runtime, view_data, tx, request);
        }
        ViewSpec::Form(spec) => {
            let label = spec.label.clone();
            let (controller, error) = match build_form_controller(runtime, &spec) {
                Ok(controller) => (Some(controller), None),
                Err(error) => (None, Some(format!("{error:#}"))),
            };
            let failed = error.is_some();
            view_data.panel = Some(Panel::Form(FormPanel {
                spec,
                controller,
                error,
                cursor: 0,
            }));
            if failed {
                emit_status(state, view_data, tx, format!("{label} failed to load"));
            }
        }
    }
}

fn unmount_panel(view_data: &mut ViewData) {
    if let Some(Panel::List(panel)) = view_data.panel.as_mut() {
        panel.list.unmount();
    }
    view_data.panel = None;
}

fn build_form_controller<R: AppRuntime>(
    runtime: &mut R,
    spec: &FormViewSpec,
) -> Result<FormController> {
    let schema = runtime
        .load_form_schema(&spec.schema_url)
        .with_context(|| format!("load form {}", spec.label))?;
    let initial = match &spec.values_url {
        Some(url) => runtime
            .load_form_values(url)
            .with_context(|| format!("load values for {}", spec.label))?,
        None => FormValues::new(),
    };

    let mut controller = FormController::new(schema, &initial);
    if controller.needs_resources() {
        let options = runtime.load_resources().context("load resources")?;
        controller.set_resource_options(&options);
    }
    Ok(controller)
}

fn send_page_request<R: AppRuntime>(
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    request: Option<ListRequest>,
) {
    let Some(request) = request else {
        return;
    };
    let Some(Panel::List(panel)) = view_data.panel.as_mut() else {
        return;
    };
    debug!(
        view = panel.view,
        page = request.page,
        fresh = request.fresh,
        "request list page"
    );
    if let Err(error) = runtime.spawn_page_load(panel.target(), &request, tx.clone()) {
        panel
            .list
            .apply_error(request.request_id, format!("{error:#}"));
    }
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    match state.mode {
        AppMode::Detail => {
            handle_detail_key(state, view_data, key);
            return false;
        }
        AppMode::Edit => {
            handle_edit_key(state, runtime, view_data, internal_tx, key);
            return false;
        }
        AppMode::Nav => {}
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Tab, _) => {
            switch_view(state, runtime, view_data, internal_tx, AppCommand::NextView);
            return false;
        }
        (KeyCode::BackTab, _) => {
            switch_view(state, runtime, view_data, internal_tx, AppCommand::PrevView);
            return false;
        }
        _ => {}
    }

    match view_data.panel {
        Some(Panel::List(_)) => handle_list_key(state, runtime, view_data, internal_tx, key),
        Some(Panel::Form(_)) => handle_form_key(state, runtime, view_data, internal_tx, key),
        None => {}
    }
    false
}

fn switch_view<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    let events = state.dispatch(command);
    let changed = events
        .iter()
        .any(|event| matches!(event, AppEvent::ViewChanged { from, to } if from != to));
    if changed {
        mount_active_view(state, runtime, view_data, internal_tx);
    }
}

fn handle_list_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let options = state.options;
    let Some(Panel::List(panel)) = view_data.panel.as_mut() else {
        return;
    };

    let cursor = panel.cursor;
    let request = match key.code {
        KeyCode::Char('j') | KeyCode::Down => select_row(panel, cursor.saturating_add(1)),
        KeyCode::Char('k') | KeyCode::Up => select_row(panel, cursor.saturating_sub(1)),
        KeyCode::Char('g') | KeyCode::Home => select_row(panel, 0),
        KeyCode::Char('G') | KeyCode::End => select_row(panel, usize::MAX),
        KeyCode::Char('r') => panel.list.reset(),
        KeyCode::Enter => {
            if let Some(row) = panel.list.rows().get(panel.cursor) {
                panel.detail = Some(detail_for_row(row, options));
                state.dispatch(AppCommand::OpenDetail);
            }
            None
        }
        _ => None,
    };
    send_page_request(runtime, view_data, internal_tx, request);
}

/// Moves the cursor, clamped to the loaded rows. Landing on the last row
/// asks for the next page.
fn select_row(panel: &mut ListPanel, index: usize) -> Option<ListRequest> {
    let len = panel.list.rows().len();
    if len == 0 {
        return None;
    }
    let last = len - 1;
    panel.cursor = index.min(last);
    if panel.cursor == last {
        panel.list.load_more()
    } else {
        None
    }
}

fn detail_for_row(row: &Value, options: ViewOptions) -> DetailOverlay {
    let title = row
        .get("id")
        .map(scalar_text)
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| "record".to_owned());
    DetailOverlay {
        title,
        pairs: flatten_dotted(&redact_pii(row, options)),
        scroll: 0,
    }
}

fn handle_detail_key(state: &mut AppState, view_data: &mut ViewData, key: KeyEvent) {
    let Some(Panel::List(panel)) = view_data.panel.as_mut() else {
        state.dispatch(AppCommand::ExitToNav);
        return;
    };
    let Some(detail) = panel.detail.as_mut() else {
        state.dispatch(AppCommand::ExitToNav);
        return;
    };

    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
            panel.detail = None;
            state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Char('j') | KeyCode::Down => {
            detail.scroll = (detail.scroll + 1).min(detail.pairs.len().saturating_sub(1));
        }
        KeyCode::Char('k') | KeyCode::Up => {
            detail.scroll = detail.scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_form_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
        submit_active_form(state, runtime, view_data, internal_tx);
        return;
    }
    if key.code == KeyCode::Char('r') {
        mount_active_view(state, runtime, view_data, internal_tx);
        return;
    }

    let Some(Panel::Form(panel)) = view_data.panel.as_mut() else {
        return;
    };
    let count = panel
        .controller
        .as_ref()
        .map_or(0, |controller| controller.controls().len());

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            panel.cursor = (panel.cursor + 1).min(count.saturating_sub(1));
        }
        KeyCode::Char('k') | KeyCode::Up => {
            panel.cursor = panel.cursor.saturating_sub(1);
        }
        KeyCode::Enter => {
            let label = panel
                .controller
                .as_ref()
                .and_then(|controller| controller.control(panel.cursor))
                .map(|control| control.label().to_owned());
            if let Some(label) = label {
                state.dispatch(AppCommand::EnterEditMode);
                emit_status(state, view_data, internal_tx, format!("editing {label}"));
            }
        }
        _ => {}
    }
}

fn handle_edit_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
        submit_active_form(state, runtime, view_data, internal_tx);
        return;
    }

    let Some(Panel::Form(panel)) = view_data.panel.as_mut() else {
        state.dispatch(AppCommand::ExitToNav);
        return;
    };
    let Some(controller) = panel.controller.as_mut() else {
        state.dispatch(AppCommand::ExitToNav);
        return;
    };
    let multiline = matches!(
        controller.control(panel.cursor),
        Some(FieldControl::Text(TextControl {
            multiline: true,
            ..
        }))
    );

    let edit = match key.code {
        KeyCode::Esc => {
            state.dispatch(AppCommand::ExitToNav);
            return;
        }
        KeyCode::Enter if multiline => FieldEdit::Insert('\n'),
        KeyCode::Enter => {
            state.dispatch(AppCommand::ExitToNav);
            return;
        }
        KeyCode::Backspace => FieldEdit::Backspace,
        KeyCode::Delete => FieldEdit::Clear,
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => FieldEdit::Clear,
        KeyCode::Left => FieldEdit::Cycle(-1),
        KeyCode::Right => FieldEdit::Cycle(1),
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            FieldEdit::Insert(ch)
        }
        _ => return,
    };
    controller.edit(panel.cursor, edit);
}

fn submit_active_form<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let outcome = match view_data.panel.as_ref() {
        Some(Panel::Form(FormPanel {
            spec,
            controller: Some(controller),
            ..
        })) => controller
            .submit(|values| runtime.submit_form(&spec.submit_url, values))
            .map(|()| format!("{} saved", spec.label))
            .map_err(|error| format!("submit failed: {error:#}")),
        Some(Panel::Form(_)) => Err("form is not loaded; press r to retry".to_owned()),
        _ => return,
    };
    let message = match outcome {
        Ok(message) | Err(message) => message,
    };
    emit_status(state, view_data, internal_tx, message);
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let titles = state
        .views
        .iter()
        .map(|view| view.label().to_owned())
        .collect::<Vec<String>>();
    let tabs = Tabs::new(titles)
        .block(Block::default().title("beacon").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(state.active_view);
    frame.render_widget(tabs, layout[0]);

    match &view_data.panel {
        Some(Panel::List(panel)) => render_list(frame, layout[1], panel, state.options),
        Some(Panel::Form(panel)) => render_form(frame, layout[1], panel, state.mode),
        None => {
            let empty = Paragraph::new("no views configured; add [[lists]] or [[forms]]")
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(empty, layout[1]);
        }
    }

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if let Some(Panel::List(ListPanel {
        detail: Some(detail),
        ..
    })) = &view_data.panel
    {
        let area = centered_rect(80, 75, frame.area());
        frame.render_widget(Clear, area);
        let overlay = Paragraph::new(render_detail_text(detail)).block(
            Block::default()
                .title(detail.title.as_str())
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(overlay, area);
    }
}

fn list_header_text(panel: &ListPanel) -> String {
    format!("{} - {}", panel.spec.label, panel.list.summary_text())
}

fn render_list(frame: &mut ratatui::Frame<'_>, area: Rect, panel: &ListPanel, options: ViewOptions) {
    let title = list_header_text(panel);
    if panel.list.show_spinner() {
        let spinner = Paragraph::new(SPINNER_TEXT)
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(spinner, area);
        return;
    }

    let (table_area, error_area) = if panel.list.error().is_some() {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(3)])
            .split(area);
        (chunks[0], Some(chunks[1]))
    } else {
        (area, None)
    };

    let time_field = panel.spec.time_field.as_deref();
    let visible = usize::from(table_area.height.saturating_sub(3)).max(1);
    let offset = panel.cursor.saturating_sub(visible - 1);

    let rows = panel
        .list
        .rows()
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(index, row)| {
            let summary = summarize_row(row, time_field, &panel.spec.filter_fields, options);
            let mut cells = Vec::with_capacity(2);
            if time_field.is_some() {
                cells.push(Cell::from(summary.time.unwrap_or_default()));
            }
            cells.push(Cell::from(summary.text));
            let style = if index == panel.cursor {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(cells).style(style)
        });

    let (widths, header_labels) = if time_field.is_some() {
        (
            vec![Constraint::Length(TIME_COLUMN_WIDTH), Constraint::Min(8)],
            vec!["time", "record"],
        )
    } else {
        (vec![Constraint::Min(8)], vec!["record"])
    };
    let header = Row::new(header_labels.into_iter().map(|label| {
        Cell::from(label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(table, table_area);

    if let (Some(area), Some(error)) = (error_area, panel.list.error()) {
        let widget = Paragraph::new(format!("load failed: {error}"))
            .style(Style::default().fg(Color::Red))
            .block(Block::default().title("error").borders(Borders::ALL));
        frame.render_widget(widget, area);
    }
}

fn render_form(frame: &mut ratatui::Frame<'_>, area: Rect, panel: &FormPanel, mode: AppMode) {
    let body = match (&panel.controller, &panel.error) {
        (Some(controller), _) => render_form_text(controller, panel.cursor, mode),
        (None, Some(error)) => format!("could not load form: {error}\n\npress r to retry"),
        (None, None) => SPINNER_TEXT.to_owned(),
    };
    let widget = Paragraph::new(body)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(panel.spec.label.as_str())
                .borders(Borders::ALL),
        );
    frame.render_widget(widget, area);
}

fn render_form_text(controller: &FormController, cursor: usize, mode: AppMode) -> String {
    let mut lines = Vec::new();
    for item in controller.layout() {
        match item {
            LayoutItem::Title(title) => {
                lines.push(title.to_uppercase());
                lines.push(String::new());
            }
            LayoutItem::GroupHeading(name) => lines.push(format!("== {name} ==")),
            LayoutItem::GroupDescription(description) => lines.push(description),
            LayoutItem::FieldHeading { text, emphasized } => {
                if emphasized {
                    lines.push(format!("## {text}"));
                } else {
                    lines.push(text);
                }
            }
            LayoutItem::FieldDescription(description) => lines.push(format!("  {description}")),
            LayoutItem::Control { index } => {
                let Some(control) = controller.control(index) else {
                    continue;
                };
                let selected = index == cursor;
                let marker = if selected { ">" } else { " " };
                let caret = if selected && mode == AppMode::Edit {
                    "_"
                } else {
                    ""
                };
                let value = control.display().replace('\n', "\n    ");
                lines.push(format!("{marker} {}: {value}{caret}", control.label()));
            }
        }
    }
    lines.join("\n")
}

fn render_detail_text(detail: &DetailOverlay) -> String {
    detail
        .pairs
        .iter()
        .skip(detail.scroll)
        .map(|(key, value)| format!("{key}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    let mode = match state.mode {
        AppMode::Nav => "NAV",
        AppMode::Edit => "EDIT",
        AppMode::Detail => "DETAIL",
    };
    let hints = match (&view_data.panel, state.mode) {
        (_, AppMode::Detail) => "j/k scroll | esc close".to_owned(),
        (Some(Panel::Form(_)), AppMode::Edit) => {
            "type to edit | ctrl+u clear | left/right cycle | ctrl+s submit | esc done".to_owned()
        }
        (Some(Panel::Form(_)), _) => {
            "j/k field | enter edit | ctrl+s submit | r reload | tab view | q".to_owned()
        }
        (Some(Panel::List(panel)), _) => {
            let mut hints = "j/k row | enter detail | r reload | tab view | q".to_owned();
            if panel.list.refresh_enabled() {
                hints = format!(
                    "auto-refresh {}s{} | {hints}",
                    panel.list.refresh_interval().as_secs(),
                    loaded_at_text(&panel.list)
                );
            }
            hints
        }
        (None, _) => "tab view | q".to_owned(),
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn loaded_at_text(list: &ListState) -> String {
    let format = format_description!("[hour]:[minute]:[second]");
    list.loaded_at()
        .and_then(|at| at.format(format).ok())
        .map(|at| format!(", updated {at}"))
        .unwrap_or_default()
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::{
        AppRuntime, InternalEvent, PageTarget, Panel, ViewData, handle_key_event,
        list_header_text, mount_active_view, process_internal_events, render_detail_text,
        render_form_text, status_text,
    };
    use anyhow::{Result, anyhow};
    use beacon_app::{
        AppMode, AppState, FieldValue, FormSchema, FormValues, FormViewSpec, ListEndpoint,
        ListPage, ListRequest, ListViewSpec, ResourceOption, ViewOptions, ViewSpec,
        form_values_from_json,
    };
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use serde_json::{Value, json};
    use std::sync::mpsc;
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct TestRuntime {
        rows: Vec<Value>,
        page_size: usize,
        fail_pages: bool,
        deferred: bool,
        pending: Vec<(PageTarget, ListRequest)>,
        page_requests: Vec<(String, u32)>,
        submitted: Vec<(String, FormValues)>,
        submit_error: Option<String>,
        schema_error: bool,
    }

    impl TestRuntime {
        fn with_rows(count: usize) -> Self {
            Self {
                rows: (0..count)
                    .map(|index| {
                        json!({
                            "id": format!("p-{index}"),
                            "metadata": {"time": {"insert": format!("2026-01-01T00:00:{:02}Z", index % 60)}},
                            "data": {"pii": {"email": "someone@example.com"}, "plan": "pro"},
                        })
                    })
                    .collect(),
                page_size: 20,
                ..Self::default()
            }
        }

        fn page_numbers(&self) -> Vec<u32> {
            self.page_requests.iter().map(|(_, page)| *page).collect()
        }

        fn deliver_pending(&mut self, tx: &mpsc::Sender<InternalEvent>) {
            let pending = std::mem::take(&mut self.pending);
            for (target, request) in pending {
                let result = self
                    .fetch_page(&request.endpoint, request.page)
                    .map_err(|error| format!("{error:#}"));
                tx.send(InternalEvent::PageLoaded {
                    target,
                    request_id: request.request_id,
                    result,
                })
                .expect("channel open");
            }
        }
    }

    impl AppRuntime for TestRuntime {
        fn fetch_page(&mut self, endpoint: &ListEndpoint, page: u32) -> Result<ListPage> {
            self.page_requests.push((endpoint.url.clone(), page));
            if self.fail_pages {
                return Err(anyhow!("server error (502): store unavailable"));
            }
            let start = page as usize * self.page_size;
            Ok(ListPage {
                result: self
                    .rows
                    .iter()
                    .skip(start)
                    .take(self.page_size)
                    .cloned()
                    .collect(),
                total: self.rows.len() as u64,
            })
        }

        fn load_form_schema(&mut self, _url: &str) -> Result<FormSchema> {
            if self.schema_error {
                return Err(anyhow!("server error (404): Not found"));
            }
            Ok(serde_json::from_value(beacon_testkit::plugin_form_schema())?)
        }

        fn load_form_values(&mut self, _url: &str) -> Result<FormValues> {
            Ok(form_values_from_json(&json!({
                "source": "event@properties.page",
                "retries": 3,
            })))
        }

        fn load_resources(&mut self) -> Result<Vec<ResourceOption>> {
            Ok(vec![
                ResourceOption {
                    id: "res-a".to_owned(),
                    name: "Alpha".to_owned(),
                },
                ResourceOption {
                    id: "res-b".to_owned(),
                    name: "Beta".to_owned(),
                },
            ])
        }

        fn submit_form(&mut self, url: &str, values: &FormValues) -> Result<()> {
            if let Some(error) = self.submit_error.take() {
                return Err(anyhow!("{error}"));
            }
            self.submitted.push((url.to_owned(), values.clone()));
            Ok(())
        }

        fn spawn_page_load(
            &mut self,
            target: PageTarget,
            request: &ListRequest,
            tx: mpsc::Sender<InternalEvent>,
        ) -> Result<()> {
            if self.deferred {
                self.pending.push((target, request.clone()));
                return Ok(());
            }
            let result = self
                .fetch_page(&request.endpoint, request.page)
                .map_err(|error| format!("{error:#}"));
            tx.send(InternalEvent::PageLoaded {
                target,
                request_id: request.request_id,
                result,
            })
            .map_err(|_| anyhow!("page event channel closed"))?;
            Ok(())
        }
    }

    fn profiles_view(refresh_interval: Duration) -> ViewSpec {
        ViewSpec::List(ListViewSpec {
            label: "Profiles".to_owned(),
            endpoint: ListEndpoint::new("/profiles"),
            refresh_interval,
            time_field: Some("metadata.time.insert".to_owned()),
            filter_fields: Vec::new(),
        })
    }

    fn copy_trait_view() -> ViewSpec {
        ViewSpec::Form(FormViewSpec {
            label: "Copy trait".to_owned(),
            schema_url: "/forms/copy-trait".to_owned(),
            submit_url: "/forms/copy-trait".to_owned(),
            values_url: Some("/forms/copy-trait/values".to_owned()),
        })
    }

    struct Harness {
        state: AppState,
        view_data: ViewData,
        tx: mpsc::Sender<InternalEvent>,
        rx: mpsc::Receiver<InternalEvent>,
    }

    impl Harness {
        fn mount(views: Vec<ViewSpec>, runtime: &mut TestRuntime) -> Self {
            let (tx, rx) = mpsc::channel();
            let mut harness = Self {
                state: AppState::new(views, ViewOptions::default()),
                view_data: ViewData::default(),
                tx,
                rx,
            };
            mount_active_view(
                &mut harness.state,
                runtime,
                &mut harness.view_data,
                &harness.tx,
            );
            harness.pump(runtime);
            harness
        }

        fn pump(&mut self, runtime: &mut TestRuntime) {
            process_internal_events(
                &mut self.state,
                runtime,
                &mut self.view_data,
                &self.tx,
                &self.rx,
            );
        }

        fn press(&mut self, runtime: &mut TestRuntime, key: KeyEvent) -> bool {
            let quit = handle_key_event(&mut self.state, runtime, &mut self.view_data, &self.tx, key);
            self.pump(runtime);
            quit
        }

        fn press_code(&mut self, runtime: &mut TestRuntime, code: KeyCode, times: usize) {
            for _ in 0..times {
                self.press(runtime, KeyEvent::new(code, KeyModifiers::NONE));
            }
        }

        fn type_text(&mut self, runtime: &mut TestRuntime, text: &str) {
            for ch in text.chars() {
                self.press(runtime, KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE));
            }
        }

        fn list(&self) -> &super::ListPanel {
            match &self.view_data.panel {
                Some(Panel::List(panel)) => panel,
                other => panic!("expected list panel, got {other:?}"),
            }
        }

        fn form(&self) -> &super::FormPanel {
            match &self.view_data.panel {
                Some(Panel::Form(panel)) => panel,
                other => panic!("expected form panel, got {other:?}"),
            }
        }
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    #[test]
    fn mounting_a_list_loads_the_first_page() {
        let mut runtime = TestRuntime::with_rows(45);
        let harness = Harness::mount(vec![profiles_view(Duration::ZERO)], &mut runtime);

        let panel = harness.list();
        assert_eq!(panel.list.rows().len(), 20);
        assert_eq!(
            list_header_text(panel),
            "Profiles - Showing 20 of 45 total records"
        );
        assert_eq!(runtime.page_requests, vec![("/profiles".to_owned(), 0)]);
    }

    #[test]
    fn reaching_the_last_row_loads_the_next_page() {
        let mut runtime = TestRuntime::with_rows(45);
        let mut harness = Harness::mount(vec![profiles_view(Duration::ZERO)], &mut runtime);

        harness.press_code(&mut runtime, KeyCode::Char('j'), 19);
        assert_eq!(harness.list().list.rows().len(), 40);
        assert_eq!(runtime.page_numbers(), vec![0, 1]);

        harness.press_code(&mut runtime, KeyCode::Char('G'), 1);
        harness.press_code(&mut runtime, KeyCode::Char('G'), 1);
        assert_eq!(harness.list().list.rows().len(), 45);

        // The empty page halts infinite scroll.
        harness.press_code(&mut runtime, KeyCode::Char('G'), 3);
        assert_eq!(runtime.page_numbers(), vec![0, 1, 2, 3]);
        assert!(!harness.list().list.has_more());
        assert_eq!(harness.list().list.rows().len(), 45);
    }

    #[test]
    fn load_more_waits_for_the_request_in_flight() {
        let mut runtime = TestRuntime::with_rows(45);
        runtime.deferred = true;
        let mut harness = Harness::mount(vec![profiles_view(Duration::ZERO)], &mut runtime);
        assert!(harness.list().list.show_spinner());

        runtime.deliver_pending(&harness.tx);
        harness.pump(&mut runtime);
        assert!(!harness.list().list.show_spinner());

        harness.press_code(&mut runtime, KeyCode::Char('G'), 1);
        harness.press_code(&mut runtime, KeyCode::Char('k'), 1);
        harness.press_code(&mut runtime, KeyCode::Char('G'), 1);
        assert_eq!(runtime.pending.len(), 1);

        runtime.deliver_pending(&harness.tx);
        harness.pump(&mut runtime);
        assert_eq!(harness.list().list.rows().len(), 40);
    }

    #[test]
    fn pages_for_an_earlier_mount_are_dropped() {
        let mut runtime = TestRuntime::with_rows(45);
        runtime.deferred = true;
        let mut harness = Harness::mount(
            vec![profiles_view(Duration::ZERO), copy_trait_view()],
            &mut runtime,
        );
        let stale = std::mem::take(&mut runtime.pending);

        harness.press_code(&mut runtime, KeyCode::Tab, 1);
        harness.press_code(&mut runtime, KeyCode::Tab, 1);
        assert_eq!(runtime.pending.len(), 1);

        runtime.pending = stale;
        runtime.deliver_pending(&harness.tx);
        harness.pump(&mut runtime);
        assert!(harness.list().list.rows().is_empty());
        assert!(harness.list().list.show_spinner());
    }

    #[test]
    fn fetch_errors_keep_rows_and_stop_loading() {
        let mut runtime = TestRuntime::with_rows(45);
        let mut harness = Harness::mount(vec![profiles_view(Duration::ZERO)], &mut runtime);

        runtime.fail_pages = true;
        harness.press_code(&mut runtime, KeyCode::Char('G'), 1);
        let panel = harness.list();
        assert_eq!(panel.list.rows().len(), 20);
        assert_eq!(
            panel.list.error(),
            Some("server error (502): store unavailable")
        );

        harness.press_code(&mut runtime, KeyCode::Char('G'), 2);
        assert_eq!(runtime.page_numbers(), vec![0, 1]);
    }

    #[test]
    fn refresh_ticks_reload_page_zero_and_ignore_stale_timers() {
        let mut runtime = TestRuntime::with_rows(45);
        let mut harness = Harness::mount(
            vec![profiles_view(Duration::from_secs(3600))],
            &mut runtime,
        );
        let token = harness.view_data.timer_token;

        harness
            .tx
            .send(InternalEvent::RefreshTick { view: 0, token })
            .expect("channel open");
        harness.pump(&mut runtime);
        assert_eq!(runtime.page_numbers(), vec![0, 0]);
        assert_eq!(harness.list().list.rows().len(), 20);

        harness
            .tx
            .send(InternalEvent::RefreshTick {
                view: 0,
                token: token.next(),
            })
            .expect("channel open");
        harness.pump(&mut runtime);
        assert_eq!(runtime.page_numbers(), vec![0, 0]);

        harness.press_code(&mut runtime, KeyCode::Char('G'), 1);
        assert_eq!(runtime.page_numbers(), vec![0, 0]);
        assert!(status_text(&harness.state, &harness.view_data).contains("auto-refresh 3600s"));
    }

    #[test]
    fn enter_opens_a_redacted_detail_and_esc_closes_it() {
        let mut runtime = TestRuntime::with_rows(3);
        let mut harness = Harness::mount(vec![profiles_view(Duration::ZERO)], &mut runtime);

        harness.press_code(&mut runtime, KeyCode::Enter, 1);
        assert_eq!(harness.state.mode, AppMode::Detail);
        let detail = harness.list().detail.clone().expect("detail should open");
        assert_eq!(detail.title, "p-0");
        assert!(detail.pairs.contains(&("data.plan".to_owned(), "pro".to_owned())));
        assert!(!render_detail_text(&detail).contains("someone@example.com"));

        // q closes the overlay instead of quitting.
        assert!(!harness.press(&mut runtime, KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert_eq!(harness.state.mode, AppMode::Nav);
        assert!(harness.list().detail.is_none());
    }

    #[test]
    fn editing_a_number_drops_bad_input_and_submits_unset() {
        let mut runtime = TestRuntime::with_rows(3);
        let mut harness = Harness::mount(
            vec![profiles_view(Duration::ZERO), copy_trait_view()],
            &mut runtime,
        );
        harness.press_code(&mut runtime, KeyCode::Tab, 1);
        assert!(harness.form().controller.is_some());

        harness.press_code(&mut runtime, KeyCode::Char('j'), 2);
        harness.press_code(&mut runtime, KeyCode::Enter, 1);
        assert_eq!(harness.state.mode, AppMode::Edit);
        assert_eq!(harness.state.status_line.as_deref(), Some("editing Retries"));

        harness.type_text(&mut runtime, "1a");
        let values = harness
            .form()
            .controller
            .as_ref()
            .map(|controller| controller.values().clone())
            .unwrap_or_default();
        assert_eq!(values.get("retries"), Some(&FieldValue::Integer(31)));

        harness.press_code(&mut runtime, KeyCode::Backspace, 2);
        harness.press_code(&mut runtime, KeyCode::Esc, 1);
        assert_eq!(harness.state.mode, AppMode::Nav);

        harness.press(&mut runtime, ctrl('s'));
        assert_eq!(runtime.submitted.len(), 1);
        let (url, submitted) = &runtime.submitted[0];
        assert_eq!(url, "/forms/copy-trait");
        assert_eq!(submitted.get("retries"), Some(&FieldValue::Unset));
        assert_eq!(
            submitted.get("source"),
            Some(&FieldValue::text("event@properties.page"))
        );
        assert_eq!(harness.state.status_line.as_deref(), Some("Copy trait saved"));
    }

    #[test]
    fn ctrl_u_clears_a_number_and_minus_starts_a_negative() {
        let mut runtime = TestRuntime::with_rows(3);
        let mut harness = Harness::mount(vec![copy_trait_view()], &mut runtime);
        harness.press_code(&mut runtime, KeyCode::Char('j'), 2);
        harness.press_code(&mut runtime, KeyCode::Enter, 1);
        assert_eq!(harness.state.mode, AppMode::Edit);

        let retries = |harness: &Harness| {
            harness
                .form()
                .controller
                .as_ref()
                .and_then(|controller| controller.values().get("retries").cloned())
        };
        assert_eq!(retries(&harness), Some(FieldValue::Integer(3)));

        harness.press(&mut runtime, ctrl('u'));
        assert_eq!(retries(&harness), Some(FieldValue::Unset));
        assert_eq!(harness.state.mode, AppMode::Edit);

        harness.type_text(&mut runtime, "-");
        assert_eq!(retries(&harness), Some(FieldValue::Unset));
        harness.type_text(&mut runtime, "12");
        assert_eq!(retries(&harness), Some(FieldValue::Integer(-12)));

        harness.press_code(&mut runtime, KeyCode::Delete, 1);
        assert_eq!(retries(&harness), Some(FieldValue::Unset));
    }

    #[test]
    fn refresh_ticks_do_not_retry_a_failed_list() {
        let mut runtime = TestRuntime::with_rows(45);
        let mut harness = Harness::mount(
            vec![profiles_view(Duration::from_secs(3600))],
            &mut runtime,
        );
        let token = harness.view_data.timer_token;

        runtime.fail_pages = true;
        harness
            .tx
            .send(InternalEvent::RefreshTick { view: 0, token })
            .expect("channel open");
        harness.pump(&mut runtime);
        assert_eq!(
            harness.list().list.error(),
            Some("server error (502): store unavailable")
        );

        runtime.fail_pages = false;
        harness
            .tx
            .send(InternalEvent::RefreshTick { view: 0, token })
            .expect("channel open");
        harness.pump(&mut runtime);
        assert_eq!(runtime.page_numbers(), vec![0, 0]);
        assert!(harness.list().list.error().is_some());
        assert_eq!(harness.list().list.rows().len(), 20);

        harness.press_code(&mut runtime, KeyCode::Char('r'), 1);
        assert_eq!(runtime.page_numbers(), vec![0, 0, 0]);
        assert!(harness.list().list.error().is_none());
    }

    #[test]
    fn arrows_cycle_dotted_sources_and_resources() {
        let mut runtime = TestRuntime::default();
        let mut harness = Harness::mount(vec![copy_trait_view()], &mut runtime);

        harness.press_code(&mut runtime, KeyCode::Enter, 1);
        harness.press_code(&mut runtime, KeyCode::Right, 1);
        harness.press_code(&mut runtime, KeyCode::Esc, 1);

        harness.press_code(&mut runtime, KeyCode::Char('j'), 3);
        harness.press_code(&mut runtime, KeyCode::Enter, 1);
        harness.press_code(&mut runtime, KeyCode::Right, 1);
        harness.press_code(&mut runtime, KeyCode::Esc, 1);

        let controller = harness.form().controller.as_ref().expect("form loaded");
        assert_eq!(
            controller.values().get("source"),
            Some(&FieldValue::text("session@properties.page"))
        );
        assert_eq!(
            controller.values().get("resource"),
            Some(&FieldValue::text("res-a"))
        );
        let text = render_form_text(controller, 3, AppMode::Nav);
        assert!(text.contains("> Resource: Alpha"));
        assert!(text.contains("## Source path"));
        assert!(!text.contains("Chart"));
    }

    #[test]
    fn q_quits_from_nav_but_types_while_editing() {
        let mut runtime = TestRuntime::default();
        let mut harness = Harness::mount(vec![copy_trait_view()], &mut runtime);

        harness.press_code(&mut runtime, KeyCode::Char('j'), 5);
        harness.press_code(&mut runtime, KeyCode::Enter, 1);
        assert!(!harness.press(&mut runtime, KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
        let controller = harness.form().controller.as_ref().expect("form loaded");
        assert_eq!(controller.values().get("label"), Some(&FieldValue::text("q")));

        harness.press_code(&mut runtime, KeyCode::Esc, 1);
        assert!(harness.press(&mut runtime, KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
    }

    #[test]
    fn failed_form_load_reports_and_blocks_submit() {
        let mut runtime = TestRuntime {
            schema_error: true,
            ..TestRuntime::default()
        };
        let mut harness = Harness::mount(vec![copy_trait_view()], &mut runtime);
        assert!(harness.form().controller.is_none());
        assert!(
            harness
                .form()
                .error
                .as_deref()
                .is_some_and(|error| error.contains("load form Copy trait"))
        );

        harness.press(&mut runtime, ctrl('s'));
        assert!(runtime.submitted.is_empty());
        assert_eq!(
            harness.state.status_line.as_deref(),
            Some("form is not loaded; press r to retry")
        );
    }

    #[test]
    fn submit_errors_surface_in_the_status_line() {
        let mut runtime = TestRuntime {
            submit_error: Some("server error (422): bad type".to_owned()),
            ..TestRuntime::default()
        };
        let mut harness = Harness::mount(vec![copy_trait_view()], &mut runtime);

        harness.press(&mut runtime, ctrl('s'));
        assert_eq!(
            harness.state.status_line.as_deref(),
            Some("submit failed: server error (422): bad type")
        );
    }

    #[test]
    fn status_clear_requires_the_latest_token() {
        let mut runtime = TestRuntime::default();
        let mut harness = Harness::mount(vec![copy_trait_view()], &mut runtime);
        harness.press(&mut runtime, ctrl('s'));
        let token = harness.view_data.status_token;

        harness
            .tx
            .send(InternalEvent::ClearStatus { token: token - 1 })
            .expect("channel open");
        harness.pump(&mut runtime);
        assert!(harness.state.status_line.is_some());

        harness
            .tx
            .send(InternalEvent::ClearStatus { token })
            .expect("channel open");
        harness.pump(&mut runtime);
        assert!(harness.state.status_line.is_none());
    }
}
