use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::path::{Path, PathBuf};

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, StatefulWidget, TableState, Wrap};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

pub mod cache;
pub mod category_list;
pub mod chart_export;
pub mod config;
pub mod export;
pub mod matrix;
pub mod palette;
pub mod session;
pub mod store;
pub mod topic;
pub mod widgets;

pub use cache::CacheManager;
pub use config::{AppConfig, ColorParser, ConfigManager, Theme};
pub use materiality_cli::{Args, ChartFormat};
pub use session::{Session, SessionSettings};
pub use store::{TopicStore, ValidationError};
pub use topic::{Dimension, Topic, TopicField};

use chart_export::CHART_FILE_STEM;
use export::EXPORT_FILE_NAME;
use widgets::category_list::CategoryListView;
use widgets::controls::{Controls, EDIT_CONTROLS, SIDEBAR_CONTROLS, TABLE_CONTROLS};
use widgets::debug::DebugState;
use widgets::matrix::MatrixCanvas;
use widgets::sidebar::{Sidebar, SidebarItem};
use widgets::text_input::{TextInput, TextInputEvent};
use widgets::topic_table::TopicTable;

/// Application name used for cache directory and other app-specific paths
pub const APP_NAME: &str = "materiality";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Csv,
    Chart(ChartFormat),
}

pub enum AppEvent {
    Key(KeyEvent),
    Export(ExportKind),
    Exit,
    Resize(u16, u16), // resized (width, height)
}

#[derive(Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    Editing,
}

/// Which pane receives navigation keys
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Table,
    Sidebar,
}

#[derive(Default)]
pub struct ErrorModal {
    pub active: bool,
    pub message: String,
}

impl ErrorModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, message: String) {
        self.active = true;
        self.message = message;
    }

    pub fn hide(&mut self) {
        self.active = false;
        self.message.clear();
    }
}

const HELP_TEXT: &str = "\
Topic table
  ↑/↓ or k/j        Select row
  ←/→ or h/l        Select column
  Enter             Edit cell (维度 cycles S → E → G)
  a                 Add an empty row
  d or Delete       Delete the selected row

Sidebar
  ↑/↓ or k/j        Select setting
  ←/→ or h/l        Change palette, background or threshold

General
  Tab               Switch between table and sidebar
  e                 Export the table as CSV
  p                 Export the matrix as PNG
  ?                 Toggle this help
  q or Ctrl+c       Quit

Scores range from 0 to 10. Topics with both scores at 0 stay in the table
and lists but are not plotted. Rows without a 维度 are neither plotted nor
listed. Rows without an ID are plotted but not listed.";

pub struct App {
    session: Session,
    table_state: TableState,
    focus: Focus,
    sidebar_item: SidebarItem,
    pub input_mode: InputMode,
    input: TextInput,
    error_modal: ErrorModal,
    show_help: bool,
    /// Result of the last export, shown in the controls bar
    status: Option<String>,
    export_dir: PathBuf,
    theme: Theme,
    parser: ColorParser,
    debug: DebugState,
}

impl App {
    pub fn new_with_session(theme: Theme, session: Session) -> App {
        let mut table_state = TableState::default();
        if !session.topics().is_empty() {
            table_state.select_cell(Some((0, 0)));
        }
        App {
            session,
            table_state,
            focus: Focus::default(),
            sidebar_item: SidebarItem::default(),
            input_mode: InputMode::default(),
            input: TextInput::new(),
            error_modal: ErrorModal::new(),
            show_help: false,
            status: None,
            export_dir: PathBuf::from("."),
            theme,
            parser: ColorParser::new(),
            debug: DebugState::default(),
        }
    }

    /// Directory used by the CSV and PNG export keys
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    /// Override terminal capability detection (rendering tests)
    pub fn with_color_parser(mut self, parser: ColorParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn sidebar_item(&self) -> SidebarItem {
        self.sidebar_item
    }

    pub fn selected_row(&self) -> Option<usize> {
        self.table_state.selected()
    }

    /// Selected column, always one of `TopicField::EDITABLE`
    pub fn selected_field(&self) -> TopicField {
        let column = self.table_state.selected_column().unwrap_or(0);
        TopicField::EDITABLE[column.min(TopicField::EDITABLE.len() - 1)]
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_modal
            .active
            .then_some(self.error_modal.message.as_str())
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn input_value(&self) -> &str {
        self.input.value()
    }

    /// Get a color from the theme by name
    fn color(&self, name: &str) -> Color {
        self.theme.get(name)
    }

    fn select_row(&mut self, row: Option<usize>) {
        let column = self.table_state.selected_column().unwrap_or(0);
        match row {
            Some(row) => self.table_state.select_cell(Some((row, column))),
            None => self.table_state.select(None),
        }
    }

    fn move_row(&mut self, delta: isize) {
        let len = self.session.topics().len();
        if len == 0 {
            self.select_row(None);
            return;
        }
        let current = self.table_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1) as usize;
        self.select_row(Some(next));
    }

    fn move_column(&mut self, delta: isize) {
        let current = self.table_state.selected_column().unwrap_or(0) as isize;
        let last = TopicField::EDITABLE.len() as isize - 1;
        self.table_state
            .select_column(Some((current + delta).clamp(0, last) as usize));
    }

    fn show_validation_error(&mut self, error: ValidationError) {
        log::warn!("rejected edit: {}", error);
        self.error_modal.show(error.to_string());
    }

    fn add_row(&mut self) {
        let index = self.session.add_blank();
        self.table_state.select_cell(Some((index, 0)));
        self.debug.last_action = "add_row".to_string();
    }

    fn delete_row(&mut self) {
        let Some(row) = self.table_state.selected() else {
            return;
        };
        if let Err(e) = self.session.remove(row) {
            self.show_validation_error(e);
            return;
        }
        let len = self.session.topics().len();
        self.select_row(if len == 0 { None } else { Some(row.min(len - 1)) });
        self.debug.last_action = "delete_row".to_string();
    }

    /// Enter on a cell: dimension cycles in place, other fields open the editor
    fn edit_cell(&mut self) {
        let Some(row) = self.table_state.selected() else {
            return;
        };
        let field = self.selected_field();
        if field == TopicField::Dimension {
            if let Err(e) = self.session.cycle_dimension(row) {
                self.show_validation_error(e);
            }
            self.debug.last_action = "cycle_dimension".to_string();
            return;
        }
        let Some(topic) = self.session.topics().get(row) else {
            return;
        };
        let value = topic.display(field);
        self.input = TextInput::new()
            .with_theme(&self.theme)
            .with_background(self.color("background"))
            .with_value(&value);
        self.input_mode = InputMode::Editing;
        self.debug.last_action = format!("edit {:?}", field);
    }

    fn submit_edit(&mut self) {
        self.input_mode = InputMode::Normal;
        let Some(row) = self.table_state.selected() else {
            return;
        };
        let field = self.selected_field();
        let value = self.input.value().to_string();
        if let Err(e) = self.session.update(row, field, &value) {
            self.show_validation_error(e);
        }
    }

    fn change_sidebar_value(&mut self, delta: isize) {
        match self.sidebar_item {
            SidebarItem::Palette => self.session.cycle_palette(delta),
            SidebarItem::Background => self.session.cycle_background(delta),
            SidebarItem::ThresholdFinancial => {
                self.session.nudge_threshold_financial(delta as f64)
            }
            SidebarItem::ThresholdImpact => self.session.nudge_threshold_impact(delta as f64),
        }
        self.debug.last_action = format!("sidebar {:?} {:+}", self.sidebar_item, delta);
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        if event.kind != KeyEventKind::Press {
            return None;
        }
        self.debug.on_key(event);

        // Handle error modal first - it has highest priority
        if self.error_modal.active {
            if matches!(event.code, KeyCode::Esc | KeyCode::Enter) {
                self.error_modal.hide();
            }
            return None;
        }

        if self.show_help {
            if matches!(
                event.code,
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.show_help = false;
            }
            return None;
        }

        if self.input_mode == InputMode::Editing {
            match self.input.handle_key(event) {
                TextInputEvent::Submit => self.submit_edit(),
                TextInputEvent::Cancel => self.input_mode = InputMode::Normal,
                TextInputEvent::None => {}
            }
            return None;
        }

        if event.code == KeyCode::Char('c') && event.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(AppEvent::Exit);
        }

        match event.code {
            KeyCode::Char('q') => return Some(AppEvent::Exit),
            KeyCode::Char('?') => {
                self.show_help = true;
                return None;
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Table => Focus::Sidebar,
                    Focus::Sidebar => Focus::Table,
                };
                return None;
            }
            KeyCode::Char('e') => return Some(AppEvent::Export(ExportKind::Csv)),
            KeyCode::Char('p') => {
                return Some(AppEvent::Export(ExportKind::Chart(ChartFormat::Png)))
            }
            _ => {}
        }

        match self.focus {
            Focus::Table => match event.code {
                KeyCode::Up | KeyCode::Char('k') => self.move_row(-1),
                KeyCode::Down | KeyCode::Char('j') => self.move_row(1),
                KeyCode::PageUp => self.move_row(-10),
                KeyCode::PageDown => self.move_row(10),
                KeyCode::Home | KeyCode::Char('g') => self.move_row(isize::MIN / 2),
                KeyCode::End | KeyCode::Char('G') => self.move_row(isize::MAX / 2),
                KeyCode::Left | KeyCode::Char('h') => self.move_column(-1),
                KeyCode::Right | KeyCode::Char('l') => self.move_column(1),
                KeyCode::Char('a') => self.add_row(),
                KeyCode::Char('d') | KeyCode::Delete => self.delete_row(),
                KeyCode::Enter => self.edit_cell(),
                _ => {}
            },
            Focus::Sidebar => match event.code {
                KeyCode::Up | KeyCode::Char('k') => self.sidebar_item = self.sidebar_item.prev(),
                KeyCode::Down | KeyCode::Char('j') => self.sidebar_item = self.sidebar_item.next(),
                KeyCode::Left | KeyCode::Char('h') => self.change_sidebar_value(-1),
                KeyCode::Right | KeyCode::Char('l') | KeyCode::Enter => {
                    self.change_sidebar_value(1)
                }
                _ => {}
            },
        }
        None
    }

    /// Path an in-app export of `kind` writes to
    pub fn export_path(&self, kind: ExportKind) -> PathBuf {
        match kind {
            ExportKind::Csv => self.export_dir.join(EXPORT_FILE_NAME),
            ExportKind::Chart(format) => self
                .export_dir
                .join(format!("{}.{}", CHART_FILE_STEM, format.extension())),
        }
    }

    fn export(&mut self, kind: ExportKind) {
        let path = self.export_path(kind);
        let result = match kind {
            ExportKind::Csv => self.session.write_csv(&path),
            ExportKind::Chart(format) => self.session.write_chart(&path, format),
        };
        match result {
            Ok(()) => self.status = Some(format!("Saved {}", display_name(&path))),
            Err(e) => {
                log::error!("export to {} failed: {}", path.display(), e);
                self.error_modal.show(format!("Export failed: {}", e));
            }
        }
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;
        let next = match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Export(kind) => {
                self.export(*kind);
                None
            }
            _ => None,
        };
        self.debug.num_recomputes = self.session.recomputes();
        next
    }

    pub fn debug_state(&self) -> &DebugState {
        &self.debug
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;

        let background_color = self.color("background");
        Block::default()
            .style(Style::default().bg(background_color))
            .render(area, buf);

        let mut constraints = vec![Constraint::Fill(1), Constraint::Length(1)];
        if self.debug.enabled {
            constraints.push(Constraint::Length(1));
        }
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(34),
                Constraint::Fill(5),
                Constraint::Fill(4),
            ])
            .split(layout[0]);

        let sidebar_border = self.color("sidebar_border");
        let sidebar_active = self.color("sidebar_active");
        let table_header = self.color("table_header");
        let table_border = self.color("table_border");
        let dimmed = self.color("dimmed");
        let primary = self.color("primary");

        // Sidebar
        let palette = self.session.palette();
        let swatches = palette
            .entries
            .iter()
            .map(|(_, hex)| self.parser.hex_or(hex, Color::Reset))
            .collect();
        Sidebar {
            palette: &palette.name,
            swatches,
            background: self.session.background().name,
            threshold_financial: self.session.threshold_financial(),
            threshold_impact: self.session.threshold_impact(),
            selected: self.sidebar_item,
            focused: self.focus == Focus::Sidebar,
            active_color: sidebar_active,
            border_color: sidebar_border,
        }
        .render(columns[0], buf);

        // Matrix over the three dimension lists
        let center = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Fill(1), Constraint::Length(11)])
            .split(columns[1]);
        let selected_id = self
            .table_state
            .selected()
            .and_then(|row| self.session.topics().get(row))
            .map(|t| t.id.as_str());
        MatrixCanvas::new(self.session.chart(), &self.parser)
            .with_selected(selected_id)
            .with_border_color(primary)
            .render(center[0], buf);

        let list_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Fill(1); 3])
            .split(center[1]);
        for (list, list_area) in self.session.lists().iter().zip(list_areas.iter()) {
            CategoryListView::new(list, &self.parser).render(*list_area, buf);
        }

        // Table, with the cell editor below it while editing
        let editing = self.input_mode == InputMode::Editing;
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints(if editing {
                vec![Constraint::Fill(1), Constraint::Length(3)]
            } else {
                vec![Constraint::Fill(1)]
            })
            .split(columns[2]);
        TopicTable::new(self.session.topics())
            .with_focus(self.focus == Focus::Table)
            .with_colors(table_header, table_border, dimmed)
            .render(right[0], buf, &mut self.table_state);

        if editing {
            let block = Block::default()
                .borders(Borders::ALL)
                .title(format!(" 编辑 {} ", self.selected_field().header()))
                .border_style(Style::default().fg(primary));
            let inner = block.inner(right[1]);
            block.render(right[1], buf);
            (&self.input).render(inner, buf);
        }

        // Controls bar
        let hints = if editing {
            EDIT_CONTROLS
        } else if self.focus == Focus::Sidebar {
            SIDEBAR_CONTROLS
        } else {
            TABLE_CONTROLS
        };
        let status = self.status.clone().unwrap_or_else(|| {
            format!(
                "议题 {} · 图上 {}",
                self.session.topics().len(),
                self.session.chart().point_count()
            )
        });
        (&Controls::new(hints)
            .with_status(status)
            .with_dimmed(self.error_modal.active || self.show_help)
            .with_bar_color(self.color("controls_bg")))
            .render(layout[1], buf);

        if self.debug.enabled {
            (&self.debug).render(layout[layout.len() - 1], buf);
        }

        // Render error modal (has highest priority, shows on top of everything)
        if self.error_modal.active {
            let popup_area = centered_rect(area, 50, 30);
            Clear.render(popup_area, buf);
            let block = Block::default()
                .borders(Borders::ALL)
                .title("Error")
                .border_style(Style::default().fg(self.color("modal_border_error")));
            let inner_area = block.inner(popup_area);
            block.render(popup_area, buf);

            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(3)])
                .split(inner_area);

            Paragraph::new(self.error_modal.message.as_str())
                .style(Style::default().fg(self.color("error")))
                .wrap(Wrap { trim: true })
                .render(chunks[0], buf);

            Paragraph::new("[ OK ]")
                .centered()
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(self.color("modal_border"))),
                )
                .render(chunks[1], buf);
        } else if self.show_help {
            let popup_area = centered_rect(area, 60, 70);
            Clear.render(popup_area, buf);
            Paragraph::new(HELP_TEXT)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(" Help ")
                        .border_style(Style::default().fg(self.color("modal_border"))),
                )
                .wrap(Wrap { trim: false })
                .render(popup_area, buf);
        }
    }
}

fn centered_rect(r: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

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
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn app() -> App {
        let mut rng = StdRng::seed_from_u64(1);
        let session = Session::seeded(&mut rng, SessionSettings::default());
        App::new_with_session(Theme::default(), session)
    }

    fn press(app: &mut App, code: KeyCode) -> Option<AppEvent> {
        app.event(&AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_starts_on_first_cell() {
        let app = app();
        assert_eq!(app.selected_row(), Some(0));
        assert_eq!(app.selected_field(), TopicField::Id);
        assert_eq!(app.focus(), Focus::Table);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        assert!(matches!(press(&mut app, KeyCode::Char('q')), Some(AppEvent::Exit)));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(matches!(app.event(&AppEvent::Key(ctrl_c)), Some(AppEvent::Exit)));
    }

    #[test]
    fn test_release_events_ignored() {
        let mut app = app();
        let mut release = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        app.event(&AppEvent::Key(release));
        assert_eq!(app.session().topics().len(), 22);
    }

    #[test]
    fn test_navigation_clamps() {
        let mut app = app();
        press(&mut app, KeyCode::Up);
        assert_eq!(app.selected_row(), Some(0));
        press(&mut app, KeyCode::End);
        assert_eq!(app.selected_row(), Some(21));
        press(&mut app, KeyCode::Down);
        assert_eq!(app.selected_row(), Some(21));
        for _ in 0..10 {
            press(&mut app, KeyCode::Right);
        }
        assert_eq!(app.selected_field(), TopicField::ImpactMateriality);
    }

    #[test]
    fn test_add_and_delete_rows() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.session().topics().len(), 23);
        assert_eq!(app.selected_row(), Some(22));
        assert_eq!(app.selected_field(), TopicField::Id);
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.session().topics().len(), 22);
        assert_eq!(app.selected_row(), Some(21));
    }

    #[test]
    fn test_delete_everything() {
        let mut app = app();
        for _ in 0..30 {
            press(&mut app, KeyCode::Char('d'));
        }
        assert!(app.session().topics().is_empty());
        assert_eq!(app.selected_row(), None);
        assert_eq!(app.session().chart().point_count(), 0);
        assert!(app.error_message().is_none());
    }

    #[test]
    fn test_edit_score() {
        let mut app = app();
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.selected_field(), TopicField::FinancialMateriality);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Editing);
        for _ in 0..5 {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "9.5");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.session().topics()[0].financial_materiality, 9.5);
        let plotted = app
            .session()
            .chart()
            .points()
            .find(|(p, _)| p.id == "01")
            .map(|(p, _)| p.x);
        assert_eq!(plotted, Some(9.5));
    }

    #[test]
    fn test_out_of_range_edit_shows_error() {
        let mut app = app();
        let before = app.session().topics()[0].impact_materiality;
        for _ in 0..4 {
            press(&mut app, KeyCode::Right);
        }
        press(&mut app, KeyCode::Enter);
        for _ in 0..5 {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "12");
        press(&mut app, KeyCode::Enter);
        assert!(app.error_message().is_some());
        assert_eq!(app.session().topics()[0].impact_materiality, before);
        // Modal swallows keys until dismissed
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.session().topics().len(), 22);
        press(&mut app, KeyCode::Esc);
        assert!(app.error_message().is_none());
    }

    #[test]
    fn test_cancel_edit_keeps_value() {
        let mut app = app();
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "xyz");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.session().topics()[0].name, "职业健康与安全");
    }

    #[test]
    fn test_enter_on_dimension_cycles() {
        let mut app = app();
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Normal);
        let topic = &app.session().topics()[0];
        assert_eq!(topic.dimension, Some(Dimension::Environmental));
        assert_eq!(topic.color, "#00C49F");
    }

    #[test]
    fn test_sidebar_changes_settings() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus(), Focus::Sidebar);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.session().palette().name, app.session().palettes()[1].name);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.sidebar_item(), SidebarItem::ThresholdFinancial);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.session().threshold_financial(), 4.5);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus(), Focus::Table);
    }

    #[test]
    fn test_help_toggle() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        // Keys other than close are swallowed
        assert!(press(&mut app, KeyCode::Char('a')).is_none());
        assert_eq!(app.session().topics().len(), 22);
        press(&mut app, KeyCode::Char('?'));
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.session().topics().len(), 23);
    }

    #[test]
    fn test_export_keys_return_events() {
        let mut app = app();
        assert!(matches!(
            press(&mut app, KeyCode::Char('e')),
            Some(AppEvent::Export(ExportKind::Csv))
        ));
        assert!(matches!(
            press(&mut app, KeyCode::Char('p')),
            Some(AppEvent::Export(ExportKind::Chart(ChartFormat::Png)))
        ));
    }

    #[test]
    fn test_export_paths() {
        let app = app().with_export_dir("/tmp/out");
        assert_eq!(
            app.export_path(ExportKind::Csv),
            PathBuf::from("/tmp/out/Double_Materiality_Matrix.csv")
        );
        assert_eq!(
            app.export_path(ExportKind::Chart(ChartFormat::Eps)),
            PathBuf::from("/tmp/out/Double_Materiality_Matrix.eps")
        );
    }

    #[test]
    fn test_debug_recomputes_current_after_event() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.debug_state().num_recomputes, app.session().recomputes());
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.debug_state().num_recomputes, app.session().recomputes());
    }

    #[test]
    fn test_render_smoke() {
        let mut app = app().with_color_parser(ColorParser::with_capabilities(true, true));
        app.enable_debug();
        let area = Rect::new(0, 0, 160, 48);
        let mut buf = Buffer::empty(area);
        (&mut app).render(area, &mut buf);
        press(&mut app, KeyCode::Char('?'));
        (&mut app).render(area, &mut buf);
        let text: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|pos| buf[pos].symbol().to_string())
            .collect();
        assert!(text.contains("Help"));
        assert!(text.contains("frames=2"));
    }
}
