#![allow(clippy::too_many_lines)]

use crate::controller::{SettingsController, SourceEditOutcome, SourceEditRequest};
use crate::editor::{SHOW_CAMERAS_OPTIONS, SourceForm};
use crate::settings::{ConnectionType, Source};
use crate::store::{SessionStash, SettingsRepository};
use crate::theme::{self, ThemePalette};
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use std::io;
use std::sync::OnceLock;
use tracing::warn;

const GLYPH_ACTIVE: &str = "▸";
const GLYPH_CHECKED: &str = "◉";
const GLYPH_UNCHECKED: &str = "○";
const GLYPH_BULLET: &str = "•";
const GLYPH_CURSOR: &str = "▏";

/// Host shown for sources that use the camera's own address.
const CAMERA_HOST_PLACEHOLDER: &str = "camera";

static THEME: OnceLock<ThemePalette> = OnceLock::new();

/// How the settings editor was left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorExit {
    Saved,
    Suspended,
    Discarded,
}

pub fn run_settings_editor<R, S>(controller: SettingsController<R, S>) -> Result<EditorExit>
where
    R: SettingsRepository,
    S: SessionStash,
{
    let loaded_theme = match theme::load_or_create_theme() {
        Ok(palette) => palette,
        Err(err) => {
            warn!("failed to load theme config ({err:#}), using defaults");
            ThemePalette::default()
        }
    };
    let _ = THEME.set(loaded_theme);

    let mut terminal = init_terminal()?;
    let mut app = App::new(controller);

    let run_result = run_loop(&mut terminal, &mut app);
    let restore_result = restore_terminal(&mut terminal);

    let exit = run_result?;
    restore_result?;
    Ok(exit)
}

fn run_loop<R, S>(terminal: &mut AppTerminal, app: &mut App<R, S>) -> Result<EditorExit>
where
    R: SettingsRepository,
    S: SessionStash,
{
    loop {
        terminal
            .draw(|frame| app.draw(frame))
            .context("failed drawing TUI frame")?;

        // Resize and focus events fall through to a redraw.
        if let Event::Key(key) = event::read().context("failed reading input")? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let AppCommand::Exit(exit) = app.handle_key(key) {
                return Ok(exit);
            }
        }
    }
}

type AppTerminal = Terminal<CrosstermBackend<io::Stdout>>;

fn active_theme() -> &'static ThemePalette {
    THEME.get_or_init(ThemePalette::default)
}

fn init_terminal() -> Result<AppTerminal> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed entering alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("failed creating terminal")
}

fn restore_terminal(terminal: &mut AppTerminal) -> Result<()> {
    disable_raw_mode().context("failed disabling raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed leaving alternate screen")?;
    terminal.show_cursor().context("failed showing cursor")?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettingsFocus {
    CameraName,
    ShowCameras,
    ScanTimeout,
    Source(ConnectionType),
}

impl SettingsFocus {
    const ORDER: [Self; 6] = [
        Self::CameraName,
        Self::ShowCameras,
        Self::ScanTimeout,
        Self::Source(ConnectionType::RawTcpIp),
        Self::Source(ConnectionType::RawHttp),
        Self::Source(ConnectionType::RawMulticast),
    ];

    fn next(self) -> Self {
        cycle(&Self::ORDER, self, 1)
    }

    fn prev(self) -> Self {
        cycle(&Self::ORDER, self, Self::ORDER.len() - 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceFocus {
    Address,
    Port,
    Width,
    Height,
    Fps,
    Bitrate,
}

impl SourceFocus {
    const ORDER: [Self; 6] = [
        Self::Address,
        Self::Port,
        Self::Width,
        Self::Height,
        Self::Fps,
        Self::Bitrate,
    ];

    fn next(self) -> Self {
        cycle(&Self::ORDER, self, 1)
    }

    fn prev(self) -> Self {
        cycle(&Self::ORDER, self, Self::ORDER.len() - 1)
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Address => "Address",
            Self::Port => "Port",
            Self::Width => "Width",
            Self::Height => "Height",
            Self::Fps => "Frame Rate",
            Self::Bitrate => "Bitrate",
        }
    }
}

fn cycle<T: Copy + PartialEq>(order: &[T], current: T, step: usize) -> T {
    let index = order.iter().position(|item| *item == current).unwrap_or(0);
    order[(index + step) % order.len()]
}

/// The open source editor and the request it was opened for.
#[derive(Debug)]
struct SourceEditor {
    request: SourceEditRequest,
    form: SourceForm,
    focus: SourceFocus,
}

impl SourceEditor {
    fn new(request: SourceEditRequest) -> Self {
        Self {
            form: SourceForm::load(&request.source),
            request,
            focus: SourceFocus::Address,
        }
    }

    fn field_mut(&mut self, field: SourceFocus) -> &mut String {
        match field {
            SourceFocus::Address => &mut self.form.address,
            SourceFocus::Port => &mut self.form.port,
            SourceFocus::Width => &mut self.form.width,
            SourceFocus::Height => &mut self.form.height,
            SourceFocus::Fps => &mut self.form.fps,
            SourceFocus::Bitrate => &mut self.form.bitrate,
        }
    }

    fn field(&self, field: SourceFocus) -> &str {
        match field {
            SourceFocus::Address => &self.form.address,
            SourceFocus::Port => &self.form.port,
            SourceFocus::Width => &self.form.width,
            SourceFocus::Height => &self.form.height,
            SourceFocus::Fps => &self.form.fps,
            SourceFocus::Bitrate => &self.form.bitrate,
        }
    }
}

#[derive(Debug)]
enum Screen {
    Settings,
    Source(SourceEditor),
}

#[derive(Debug, PartialEq, Eq)]
enum AppCommand {
    None,
    Exit(EditorExit),
}

struct App<R, S> {
    controller: SettingsController<R, S>,
    screen: Screen,
    focus: SettingsFocus,
    dialog: Option<String>,
    status: String,
}

impl<R: SettingsRepository, S: SessionStash> App<R, S> {
    fn new(controller: SettingsController<R, S>) -> Self {
        let status = if controller.restored() {
            "Resumed unsaved edits from the last session.".to_owned()
        } else {
            String::new()
        };
        Self {
            controller,
            screen: Screen::Settings,
            focus: SettingsFocus::CameraName,
            dialog: None,
            status,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> AppCommand {
        if self.dialog.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.dialog = None;
            }
            return AppCommand::None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('q'))
        {
            return AppCommand::Exit(EditorExit::Discarded);
        }

        match self.screen {
            Screen::Settings => self.handle_settings_key(key),
            Screen::Source(_) => self.handle_source_key(key),
        }
    }

    fn handle_settings_key(&mut self, key: KeyEvent) -> AppCommand {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('s') if ctrl => return self.save(),
            KeyCode::Char('z') if ctrl => return self.suspend(),
            KeyCode::Esc => return AppCommand::Exit(EditorExit::Discarded),
            KeyCode::Tab | KeyCode::Down => {
                self.focus = self.focus.next();
                return AppCommand::None;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = self.focus.prev();
                return AppCommand::None;
            }
            _ => {}
        }

        match self.focus {
            SettingsFocus::CameraName => {
                edit_text_field(&mut self.controller.form_mut().camera_name, key, |_| true);
            }
            SettingsFocus::ScanTimeout => {
                edit_text_field(
                    &mut self.controller.form_mut().scan_timeout,
                    key,
                    is_integer_char,
                );
            }
            SettingsFocus::ShowCameras => {
                if matches!(
                    key.code,
                    KeyCode::Left | KeyCode::Right | KeyCode::Enter | KeyCode::Char(' ')
                ) {
                    self.controller.form_mut().toggle_show_cameras();
                }
            }
            SettingsFocus::Source(connection_type) => {
                if key.code == KeyCode::Enter {
                    self.open_source_editor(connection_type);
                }
            }
        }
        AppCommand::None
    }

    fn handle_source_key(&mut self, key: KeyEvent) -> AppCommand {
        let Screen::Source(editor) = &mut self.screen else {
            return AppCommand::None;
        };
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => {
                self.close_source_editor(SourceEditOutcome::Cancelled);
                self.status = "Source edit cancelled.".to_owned();
            }
            KeyCode::Enter => self.save_source_editor(),
            KeyCode::Char('s') if ctrl => self.save_source_editor(),
            KeyCode::Tab | KeyCode::Down => editor.focus = editor.focus.next(),
            KeyCode::BackTab | KeyCode::Up => editor.focus = editor.focus.prev(),
            _ => {
                let field = editor.focus;
                let accepts: fn(char) -> bool = if field == SourceFocus::Address {
                    is_address_char
                } else {
                    is_digit_char
                };
                edit_text_field(editor.field_mut(field), key, accepts);
            }
        }
        AppCommand::None
    }

    fn open_source_editor(&mut self, connection_type: ConnectionType) {
        let request = self.controller.begin_source_edit(connection_type);
        self.screen = Screen::Source(SourceEditor::new(request));
    }

    fn save_source_editor(&mut self) {
        let Screen::Source(editor) = &self.screen else {
            return;
        };
        match editor.form.extract() {
            Ok(source) => {
                let label = source.connection_type.label();
                self.close_source_editor(SourceEditOutcome::Saved(source));
                self.status = format!("{label} source updated.");
            }
            Err(err) => self.dialog = Some(err.to_string()),
        }
    }

    fn close_source_editor(&mut self, outcome: SourceEditOutcome) {
        self.controller.finish_source_edit(outcome);
        self.screen = Screen::Settings;
    }

    fn save(&mut self) -> AppCommand {
        match self.controller.save() {
            Ok(()) => AppCommand::Exit(EditorExit::Saved),
            Err(err) => {
                self.dialog = Some(err.to_string());
                AppCommand::None
            }
        }
    }

    fn suspend(&mut self) -> AppCommand {
        match self.controller.suspend() {
            Ok(()) => AppCommand::Exit(EditorExit::Suspended),
            Err(err) => {
                self.dialog = Some(format!("Failed stashing session: {err:#}"));
                AppCommand::None
            }
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        match &self.screen {
            Screen::Settings => self.draw_settings(frame),
            Screen::Source(editor) => draw_source_editor(frame, editor),
        }
        if let Some(message) = &self.dialog {
            draw_error_dialog(frame, message);
        }
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(8),
                Constraint::Min(6),
                Constraint::Length(3),
            ])
            .split(frame.area());

        let form = self.controller.form();
        let bounds = self.controller.bounds();
        let camera_active = matches!(
            self.focus,
            SettingsFocus::CameraName | SettingsFocus::ShowCameras | SettingsFocus::ScanTimeout
        );

        let mut camera_lines = vec![
            text_field_line(
                "Camera Name",
                &form.camera_name,
                self.focus == SettingsFocus::CameraName,
            ),
            selector_line(form.show_cameras, self.focus == SettingsFocus::ShowCameras),
            text_field_line(
                "Scan Timeout",
                &form.scan_timeout,
                self.focus == SettingsFocus::ScanTimeout,
            ),
            Line::from(Span::styled(
                format!(
                    "    milliseconds, {} to {} (default {})",
                    bounds.min, bounds.max, bounds.default
                ),
                Style::default().fg(color_muted()),
            )),
        ];
        if !self.status.is_empty() {
            camera_lines.push(Line::from(vec![
                Span::styled("status ", Style::default().fg(color_muted())),
                Span::styled(
                    &self.status,
                    Style::default()
                        .fg(color_success())
                        .add_modifier(Modifier::BOLD),
                ),
            ]));
        }

        let camera_panel = Paragraph::new(camera_lines)
            .style(Style::default().fg(color_text()))
            .block(panel_block("◉", "1) Camera", camera_active))
            .wrap(Wrap { trim: false });
        frame.render_widget(camera_panel, layout[0]);

        let working = self.controller.working();
        let mut source_lines = Vec::new();
        for connection_type in ConnectionType::ALL {
            let focused = self.focus == SettingsFocus::Source(connection_type);
            source_lines.push(Line::from(vec![
                Span::styled(
                    format!("{} ", focus_marker(focused)),
                    Style::default()
                        .fg(color_accent())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{:<10}", connection_type.label()),
                    Style::default()
                        .fg(color_text())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    endpoint_label(working.source(connection_type)),
                    Style::default().fg(color_muted()),
                ),
            ]));
        }
        source_lines.push(Line::default());
        source_lines.push(Line::from(Span::styled(
            "Enter on a source opens its editor.",
            Style::default().fg(color_muted()),
        )));
        let sources_active = matches!(self.focus, SettingsFocus::Source(_));
        let sources_panel = Paragraph::new(source_lines)
            .style(Style::default().fg(color_text()))
            .block(panel_block("◈", "2) Sources", sources_active))
            .wrap(Wrap { trim: false });
        frame.render_widget(sources_panel, layout[1]);

        let footer_spans = action_hint_spans(&[
            ("Ctrl+S", "Save"),
            ("Tab", "Next Field"),
            ("Ctrl+Z", "Suspend"),
            ("Esc", "Discard"),
        ]);
        let footer = Paragraph::new(Line::from(footer_spans))
            .style(Style::default().fg(color_text()))
            .block(panel_block("⌘", "Actions", false));
        frame.render_widget(footer, layout[2]);
    }
}

fn draw_source_editor(frame: &mut ratatui::Frame<'_>, editor: &SourceEditor) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(3)])
        .split(frame.area());

    let connection_type = editor.request.connection_type;
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{GLYPH_BULLET} "),
                Style::default().fg(color_accent()),
            ),
            Span::styled("Connection: ", Style::default().fg(color_muted())),
            Span::styled(connection_type.label(), Style::default().fg(color_text())),
        ]),
        Line::default(),
    ];
    for field in SourceFocus::ORDER {
        lines.push(text_field_line(
            field.label(),
            editor.field(field),
            editor.focus == field,
        ));
    }
    lines.push(Line::default());
    let hint = if connection_type == ConnectionType::RawMulticast {
        "Multicast group address is required. Empty numbers use the camera default."
    } else {
        "Empty address uses the camera address. Empty numbers use the camera default."
    };
    lines.push(Line::from(Span::styled(
        hint,
        Style::default().fg(color_muted()),
    )));

    let title = format!("Edit {} Source", connection_type.label());
    let panel = Paragraph::new(lines)
        .style(Style::default().fg(color_text()))
        .block(panel_block("◌", &title, true))
        .wrap(Wrap { trim: false });
    frame.render_widget(panel, layout[0]);

    let footer_spans = action_hint_spans(&[
        ("Enter", "Done"),
        ("Tab", "Next Field"),
        ("Esc", "Cancel"),
    ]);
    let footer = Paragraph::new(Line::from(footer_spans))
        .style(Style::default().fg(color_text()))
        .block(panel_block("⌘", "Actions", false));
    frame.render_widget(footer, layout[1]);
}

fn draw_error_dialog(frame: &mut ratatui::Frame<'_>, message: &str) {
    let area = centered_rect(frame.area(), 60, 7);
    let body = vec![
        Line::from(Span::styled(
            message,
            Style::default()
                .fg(color_text())
                .add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(action_hint_spans(&[("Enter", "OK")])),
    ];
    let dialog = Paragraph::new(body)
        .style(Style::default().fg(color_text()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color_error()))
                .title(Line::from(Span::styled(
                    " ✕ Error ",
                    Style::default()
                        .fg(color_error())
                        .add_modifier(Modifier::BOLD),
                ))),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(Clear, area);
    frame.render_widget(dialog, area);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn endpoint_label(source: &Source) -> String {
    source
        .endpoint_url(CAMERA_HOST_PLACEHOLDER)
        .map_or_else(|| source.to_string(), |url| url.to_string())
}

fn text_field_line<'a>(label: &'a str, value: &'a str, focused: bool) -> Line<'a> {
    let value_style = if focused {
        Style::default().fg(color_text()).bg(color_field())
    } else {
        Style::default().fg(color_text())
    };
    let mut spans = vec![
        Span::styled(
            format!("{} ", focus_marker(focused)),
            Style::default()
                .fg(color_accent())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("{label}: "), Style::default().fg(color_muted())),
        Span::styled(value, value_style),
    ];
    if focused {
        spans.push(Span::styled(
            GLYPH_CURSOR,
            Style::default().fg(color_accent()),
        ));
    }
    Line::from(spans)
}

fn selector_line(position: usize, focused: bool) -> Line<'static> {
    let mut spans = vec![
        Span::styled(
            format!("{} ", focus_marker(focused)),
            Style::default()
                .fg(color_accent())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("Show: ", Style::default().fg(color_muted())),
    ];
    for (index, option) in SHOW_CAMERAS_OPTIONS.iter().enumerate() {
        let checked = index == position;
        spans.push(Span::styled(
            format!("{} ", checkbox(checked)),
            Style::default()
                .fg(if checked {
                    color_success()
                } else {
                    color_muted()
                })
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!("{option}   "),
            Style::default().fg(color_text()),
        ));
    }
    Line::from(spans)
}

fn edit_text_field(target: &mut String, key: KeyEvent, accepts: fn(char) -> bool) {
    match key.code {
        KeyCode::Backspace => {
            let _ = target.pop();
        }
        KeyCode::Char(c) => {
            if key.modifiers.contains(KeyModifiers::CONTROL)
                || key.modifiers.contains(KeyModifiers::ALT)
            {
                return;
            }
            if accepts(c) {
                target.push(c);
            }
        }
        _ => {}
    }
}

fn is_integer_char(c: char) -> bool {
    c.is_ascii_digit() || c == '-'
}

fn is_digit_char(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_address_char(c: char) -> bool {
    !c.is_whitespace()
}

fn color_text() -> Color {
    active_theme().text
}

fn color_muted() -> Color {
    active_theme().muted
}

fn color_border() -> Color {
    active_theme().border
}

fn color_border_active() -> Color {
    active_theme().border_active
}

fn color_accent() -> Color {
    active_theme().accent
}

fn color_field() -> Color {
    active_theme().field
}

fn color_success() -> Color {
    active_theme().success
}

fn color_error() -> Color {
    active_theme().error
}

fn panel_block<'a>(glyph: &'a str, title: &'a str, focused: bool) -> Block<'a> {
    let border_color = if focused {
        color_border_active()
    } else {
        color_border()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(Line::from(vec![
            Span::styled(
                format!(" {glyph} "),
                Style::default()
                    .fg(color_accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                title,
                Style::default()
                    .fg(color_text())
                    .add_modifier(Modifier::BOLD),
            ),
        ]))
}

fn action_hint_spans(hints: &[(&'static str, &'static str)]) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (idx, (key, label)) in hints.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled("  |  ", Style::default().fg(color_border())));
        }
        spans.push(Span::styled(
            format!("[{key}]"),
            Style::default()
                .fg(color_accent())
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!(" {label}"),
            Style::default().fg(color_muted()),
        ));
    }
    spans
}

fn checkbox(checked: bool) -> &'static str {
    if checked {
        GLYPH_CHECKED
    } else {
        GLYPH_UNCHECKED
    }
}

fn focus_marker(focused: bool) -> &'static str {
    if focused { GLYPH_ACTIVE } else { " " }
}

#[cfg(test)]
mod tests {
    use super::{App, AppCommand, EditorExit, Screen, SettingsFocus, SourceFocus};
    use crate::controller::SettingsController;
    use crate::editor::{ALL_CAMERAS, TimeoutBounds};
    use crate::settings::{ConnectionType, Settings};
    use crate::store::{MemorySessionStash, MemorySettingsRepository};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    type TestApp = App<MemorySettingsRepository, MemorySessionStash>;

    fn app() -> TestApp {
        let repository = MemorySettingsRepository::default();
        let controller = SettingsController::open(
            repository,
            MemorySessionStash::default(),
            TimeoutBounds::default(),
        );
        App::new(controller)
    }

    fn press(app: &mut TestApp, code: KeyCode) -> AppCommand {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(app: &mut TestApp, c: char) -> AppCommand {
        app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn type_text(app: &mut TestApp, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn clear_field(app: &mut TestApp) {
        for _ in 0..32 {
            press(app, KeyCode::Backspace);
        }
    }

    fn rendered(app: &TestApp) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).expect("terminal");
        terminal.draw(|frame| app.draw(frame)).expect("draw");
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn focus_cycles_through_all_settings_fields() {
        let mut app = app();
        for expected in SettingsFocus::ORDER.iter().skip(1) {
            press(&mut app, KeyCode::Tab);
            assert_eq!(app.focus, *expected);
        }
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, SettingsFocus::CameraName);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.focus, SettingsFocus::Source(ConnectionType::RawMulticast));
    }

    #[test]
    fn typing_and_save_commits_settings() {
        let mut app = app();
        clear_field(&mut app);
        type_text(&mut app, "  Porch Cam  ");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Tab);
        clear_field(&mut app);
        type_text(&mut app, "1x50");

        assert_eq!(app.controller.form().scan_timeout, "150");
        assert_eq!(app.controller.form().show_cameras, ALL_CAMERAS);
        assert_eq!(ctrl(&mut app, 's'), AppCommand::Exit(EditorExit::Saved));

        let saved = &app.controller.repository().current;
        assert_eq!(saved.camera_name, "Porch Cam");
        assert_eq!(saved.scan_timeout, 150);
        assert!(saved.show_all_cameras);
    }

    #[test]
    fn invalid_save_shows_dialog_and_keeps_editor_open() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        clear_field(&mut app);

        assert_eq!(ctrl(&mut app, 's'), AppCommand::None);
        let message = app.dialog.clone().expect("dialog shown");
        assert!(message.contains("100") && message.contains("5000"), "{message}");
        assert!(rendered(&app).contains("Error"));

        // Keys other than Enter/Esc are swallowed by the dialog.
        press(&mut app, KeyCode::Char('7'));
        assert_eq!(app.controller.form().scan_timeout, "");
        press(&mut app, KeyCode::Enter);
        assert!(app.dialog.is_none());
        assert_eq!(app.controller.repository().flush_count, 0);
    }

    #[test]
    fn source_editor_round_trip_updates_one_slot() {
        let mut app = app();
        let before = app.controller.working().clone();
        for _ in 0..3 {
            press(&mut app, KeyCode::Tab);
        }
        press(&mut app, KeyCode::Enter);
        let Screen::Source(editor) = &app.screen else {
            panic!("source editor should be open");
        };
        assert_eq!(editor.request.connection_type, ConnectionType::RawTcpIp);
        assert!(rendered(&app).contains("Edit TCP/IP Source"));

        type_text(&mut app, "10.0.0.9");
        press(&mut app, KeyCode::Tab);
        clear_field(&mut app);
        type_text(&mut app, "6001");
        press(&mut app, KeyCode::Enter);

        assert!(matches!(app.screen, Screen::Settings));
        let working = app.controller.working();
        assert_eq!(working.raw_tcp_ip_source.address, "10.0.0.9");
        assert_eq!(working.raw_tcp_ip_source.port, 6001);
        assert_eq!(working.raw_http_source, before.raw_http_source);
        assert_eq!(working.raw_multicast_source, before.raw_multicast_source);
        assert!(rendered(&app).contains("tcp://10.0.0.9:6001"));
    }

    #[test]
    fn invalid_source_keeps_source_editor_open() {
        let mut app = app();
        app.open_source_editor(ConnectionType::RawHttp);
        press(&mut app, KeyCode::Tab);
        clear_field(&mut app);
        press(&mut app, KeyCode::Enter);

        assert!(app.dialog.is_some());
        press(&mut app, KeyCode::Esc);
        let Screen::Source(editor) = &app.screen else {
            panic!("source editor should stay open");
        };
        assert_eq!(editor.focus, SourceFocus::Port);

        press(&mut app, KeyCode::Esc);
        assert!(matches!(app.screen, Screen::Settings));
        assert_eq!(*app.controller.working(), Settings::default());
    }

    #[test]
    fn suspend_and_discard_exit_without_saving() {
        let mut app = app();
        assert_eq!(ctrl(&mut app, 'z'), AppCommand::Exit(EditorExit::Suspended));
        assert!(app.controller.stash().stashed.is_some());
        assert_eq!(app.controller.repository().flush_count, 0);

        let mut app = self::app();
        assert_eq!(
            press(&mut app, KeyCode::Esc),
            AppCommand::Exit(EditorExit::Discarded)
        );
        assert_eq!(ctrl(&mut app, 'q'), AppCommand::Exit(EditorExit::Discarded));
    }

    #[test]
    fn settings_screen_renders_fields_and_sources() {
        let screen = rendered(&app());
        assert!(screen.contains("Camera Name: Camera"));
        assert!(screen.contains("Scan Timeout: 500"));
        assert!(screen.contains("Filtered cameras"));
        assert!(screen.contains("Multicast"));
        assert!(screen.contains("[Ctrl+S]"));
    }
}
