use crossterm::event::{KeyCode, KeyEvent};
use std::path::PathBuf;
use std::sync::mpsc::Sender;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, StatefulWidget, Wrap};

pub mod config;
pub mod dataset;
pub mod filter;
pub mod filter_modal;
pub mod sampler;
pub mod session;
pub mod widgets;

pub use config::{AppConfig, ConfigManager};
pub use dataset::{ColumnKind, LoadOptions, TrackTable, TRACK_ID_COLUMN};
pub use filter::{FilterSelection, FilterValue};
pub use sampler::PageResult;
pub use session::SessionState;
pub use widgets::results::TrackCard;

use filter_modal::{FilterFocus, FilterModal, RangeField, SelectionEditor, ValueEditor};
use widgets::controls::Controls;
use widgets::info::ResultsInfo;
use widgets::results::ResultsView;

/// Application name used for the config directory and other app-specific paths
pub const APP_NAME: &str = "tracksift";

pub enum AppEvent {
    Key(KeyEvent),
    Open(Vec<PathBuf>, LoadOptions),
    DoLoad(Vec<PathBuf>, LoadOptions), // Internal event to actually perform loading after UI update
    Filter(Vec<FilterSelection>),
    ShowMore,
    Reset,
    Resize(u16, u16), // resized (width, height)
    Exit,
    Crash(String),
}

#[derive(Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    Filtering,
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

pub struct App {
    pub table: Option<TrackTable>,
    /// Current filtered view of the dataset; always a row-subset of the table.
    pub filtered: Option<polars::prelude::DataFrame>,
    pub active_selections: Vec<FilterSelection>,
    pub session: SessionState,
    pub cards: Vec<TrackCard>,
    pub exhausted: bool,
    pub input_mode: InputMode,
    pub filter_modal: FilterModal,
    error_modal: ErrorModal,
    events: Sender<AppEvent>,
    info_visible: bool,
    loading: bool,
    page_size: usize,
    results_scroll: u16,
}

impl App {
    pub fn new(events: Sender<AppEvent>) -> App {
        Self::new_with_config(events, AppConfig::default())
    }

    pub fn new_with_config(events: Sender<AppEvent>, config: AppConfig) -> App {
        App {
            table: None,
            filtered: None,
            active_selections: Vec::new(),
            session: SessionState::new(),
            cards: Vec::new(),
            exhausted: false,
            input_mode: InputMode::Normal,
            filter_modal: FilterModal::new(),
            error_modal: ErrorModal::new(),
            events,
            info_visible: false,
            loading: false,
            page_size: config.display.page_size,
            results_scroll: 0,
        }
    }

    pub fn send_event(&mut self, event: AppEvent) -> color_eyre::Result<()> {
        self.events.send(event)?;
        Ok(())
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size;
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Open(paths, options) => {
                // Show the loading message first, then load on the next pass.
                self.loading = true;
                Some(AppEvent::DoLoad(paths.clone(), options.clone()))
            }
            AppEvent::DoLoad(paths, options) => {
                match TrackTable::from_csv_paths(paths, options) {
                    Ok(table) => {
                        self.loading = false;
                        self.filtered = Some(table.df().clone());
                        self.table = Some(table);
                        self.active_selections.clear();
                        self.session.reset();
                        self.cards.clear();
                        self.exhausted = false;
                        self.filter_modal = FilterModal::new();
                        self.take_page(self.page_size);
                        None
                    }
                    Err(e) => {
                        self.loading = false;
                        Some(AppEvent::Crash(e.to_string()))
                    }
                }
            }
            AppEvent::Filter(selections) => {
                self.apply_filter(selections.clone());
                None
            }
            AppEvent::ShowMore => {
                // "Show more" reveals at least one more unseen track.
                self.take_page(0);
                None
            }
            AppEvent::Reset => {
                if let Some(table) = &self.table {
                    self.filtered = Some(table.df().clone());
                }
                self.active_selections.clear();
                self.session.reset();
                self.cards.clear();
                self.exhausted = false;
                self.results_scroll = 0;
                self.filter_modal.clear();
                self.take_page(self.page_size);
                None
            }
            AppEvent::Resize(_cols, _rows) => None,
            _ => None,
        }
    }

    /// Recompute the filtered view from the full dataset. On failure the
    /// previous view stays on screen and the error is shown; there is no
    /// half-filtered state.
    fn apply_filter(&mut self, selections: Vec<FilterSelection>) {
        let Some(table) = &self.table else {
            return;
        };
        match filter::build_filtered_view(table.df(), &selections) {
            Ok(df) => {
                self.filtered = Some(df);
                self.active_selections = selections;
                self.session.reset();
                self.cards.clear();
                self.exhausted = false;
                self.results_scroll = 0;
                self.take_page(self.page_size);
            }
            Err(e) => self.error_modal.show(e.to_string()),
        }
    }

    /// Reveal the next sample of unseen tracks from the filtered view.
    fn take_page(&mut self, page_size: usize) {
        let Some(table) = &self.table else {
            return;
        };
        let Some(df) = &self.filtered else {
            return;
        };
        match sampler::next_page(df, table.id_column(), &self.session.shown, page_size) {
            Ok(PageResult::Exhausted) => self.exhausted = true,
            Ok(PageResult::Page { rows, shown }) => {
                self.session.replace(shown);
                self.cards
                    .extend(TrackCard::from_frame(&rows, table.id_column()));
            }
            Err(e) => self.error_modal.show(e.to_string()),
        }
    }

    fn open_filter_modal(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        self.filter_modal.open(table.filter_columns());
        self.input_mode = InputMode::Filtering;
    }

    /// Add the highlighted column to the filter spec. Numeric columns are
    /// seeded with `[min, max]` over the frame as narrowed by the filters
    /// already in the spec.
    fn add_filter_column(&mut self) {
        let Some((column, kind)) = self.filter_modal.selected_column() else {
            return;
        };
        if self.filter_modal.is_selected(&column) {
            return;
        }
        if kind == ColumnKind::Numeric {
            let Some(table) = &self.table else {
                return;
            };
            let spec = self.filter_modal.build_spec();
            let bounds = filter::build_filtered_view(table.df(), &spec)
                .and_then(|df| filter::numeric_bounds(&df, &column));
            match bounds {
                Ok(bounds) => self.filter_modal.add_column(column, kind, Some(bounds)),
                Err(e) => self.error_modal.show(e.to_string()),
            }
        } else {
            self.filter_modal.add_column(column, kind, None);
        }
    }

    /// Re-derive default range bounds for every numeric editor from the frame
    /// as narrowed by the editors before it. Runs after any edit that may
    /// change what an earlier filter matches; failures here are not surfaced
    /// since the same problem reports on Apply.
    fn reseed_ranges(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        let mut current = table.df().clone();
        for idx in 0..self.filter_modal.selections.len() {
            if let Some(SelectionEditor {
                column,
                kind: ColumnKind::Numeric,
                ..
            }) = self.filter_modal.selections.get(idx)
            {
                let column = column.clone();
                if let Ok(bounds) = filter::numeric_bounds(&current, &column) {
                    self.filter_modal.seed_range(idx, bounds);
                }
            }
            let Some(selection) = self.filter_modal.selection_spec(idx) else {
                continue;
            };
            match filter::build_filtered_view(&current, std::slice::from_ref(&selection)) {
                Ok(df) => current = df,
                Err(_) => break,
            }
        }
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        if !event.is_press() {
            return None;
        }

        if self.error_modal.active {
            if matches!(event.code, KeyCode::Esc | KeyCode::Enter) {
                self.error_modal.hide();
            }
            return None;
        }

        if self.input_mode == InputMode::Filtering {
            return self.filter_key(event);
        }

        match event.code {
            KeyCode::Char('q') => return Some(AppEvent::Exit),
            KeyCode::Char('f') => self.open_filter_modal(),
            KeyCode::Char('m') | KeyCode::Enter => return Some(AppEvent::ShowMore),
            KeyCode::Char('i') => self.info_visible = !self.info_visible,
            KeyCode::Char('R') => return Some(AppEvent::Reset),
            KeyCode::Down | KeyCode::Char('j') => {
                self.results_scroll = self.results_scroll.saturating_add(1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.results_scroll = self.results_scroll.saturating_sub(1);
            }
            KeyCode::PageDown => {
                self.results_scroll = self.results_scroll.saturating_add(10);
            }
            KeyCode::PageUp => {
                self.results_scroll = self.results_scroll.saturating_sub(10);
            }
            _ => {}
        }
        None
    }

    fn filter_key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        match event.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.filter_modal.close();
            }
            KeyCode::Tab => {
                self.filter_modal.focus = match self.filter_modal.focus {
                    FilterFocus::Columns => {
                        if !self.filter_modal.selections.is_empty() {
                            FilterFocus::Selections
                        } else {
                            FilterFocus::Apply
                        }
                    }
                    FilterFocus::Selections => FilterFocus::Apply,
                    FilterFocus::Apply => FilterFocus::Clear,
                    FilterFocus::Clear => FilterFocus::Columns,
                };
            }
            KeyCode::BackTab => {
                self.filter_modal.focus = match self.filter_modal.focus {
                    FilterFocus::Columns => FilterFocus::Clear,
                    FilterFocus::Selections => FilterFocus::Columns,
                    FilterFocus::Apply => {
                        if !self.filter_modal.selections.is_empty() {
                            FilterFocus::Selections
                        } else {
                            FilterFocus::Columns
                        }
                    }
                    FilterFocus::Clear => FilterFocus::Apply,
                };
            }
            KeyCode::Down | KeyCode::Char('j')
                if self.filter_modal.focus == FilterFocus::Columns =>
            {
                self.filter_modal.next_column();
            }
            KeyCode::Up | KeyCode::Char('k')
                if self.filter_modal.focus == FilterFocus::Columns =>
            {
                self.filter_modal.prev_column();
            }
            KeyCode::Down if self.filter_modal.focus == FilterFocus::Selections => {
                self.filter_modal.next_selection();
            }
            KeyCode::Up if self.filter_modal.focus == FilterFocus::Selections => {
                self.filter_modal.prev_selection();
            }
            KeyCode::Left | KeyCode::Right
                if self.filter_modal.focus == FilterFocus::Selections =>
            {
                self.filter_modal.switch_range_field();
            }
            KeyCode::Delete if self.filter_modal.focus == FilterFocus::Selections => {
                self.filter_modal.remove_selected();
                self.reseed_ranges();
            }
            KeyCode::Char(c) if self.filter_modal.focus == FilterFocus::Selections => {
                self.filter_modal.input_char(c);
                self.reseed_ranges();
            }
            KeyCode::Backspace if self.filter_modal.focus == FilterFocus::Selections => {
                self.filter_modal.backspace();
                self.reseed_ranges();
            }
            KeyCode::Enter => match self.filter_modal.focus {
                FilterFocus::Columns => {
                    self.add_filter_column();
                }
                FilterFocus::Apply => {
                    self.input_mode = InputMode::Normal;
                    self.filter_modal.close();
                    return Some(AppEvent::Filter(self.filter_modal.build_spec()));
                }
                FilterFocus::Clear => {
                    self.filter_modal.clear();
                }
                FilterFocus::Selections => {}
            },
            _ => {}
        }
        None
    }

    fn render_filter_panel(&mut self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Filter Tracks");
        let inner_area = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(45), // Available columns
                Constraint::Min(0),         // Selected filters
                Constraint::Length(3),      // Apply/Clear
            ])
            .split(inner_area);

        let items: Vec<ListItem> = self
            .filter_modal
            .available_columns
            .iter()
            .map(|(name, kind)| {
                let marker = if self.filter_modal.is_selected(name) {
                    "* "
                } else {
                    "  "
                };
                let tag = match kind {
                    ColumnKind::Text => "text",
                    ColumnKind::Numeric => "num",
                    ColumnKind::Unsupported => "-",
                };
                ListItem::new(format!("{}{} ({})", marker, name, tag))
            })
            .collect();
        let columns_style = if self.filter_modal.focus == FilterFocus::Columns {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Columns (Enter to add)")
                    .border_style(columns_style),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        StatefulWidget::render(list, chunks[0], buf, &mut self.filter_modal.column_state);

        let selections_focused = self.filter_modal.focus == FilterFocus::Selections;
        let selected_idx = self.filter_modal.selection_state.selected();
        let items: Vec<ListItem> = self
            .filter_modal
            .selections
            .iter()
            .enumerate()
            .map(|(i, editor)| {
                ListItem::new(editor_line(
                    editor,
                    selections_focused && selected_idx == Some(i),
                ))
            })
            .collect();
        let selections_style = if selections_focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Filters (type to edit, Del removes)")
                    .border_style(selections_style),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        StatefulWidget::render(list, chunks[1], buf, &mut self.filter_modal.selection_state);

        let btn_layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[2]);

        let apply_style = if self.filter_modal.focus == FilterFocus::Apply {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        Paragraph::new("Apply")
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(apply_style),
            )
            .centered()
            .render(btn_layout[0], buf);

        let clear_style = if self.filter_modal.focus == FilterFocus::Clear {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        Paragraph::new("Clear")
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(clear_style),
            )
            .centered()
            .render(btn_layout[1], buf);
    }

    fn render_error_modal(&self, area: Rect, buf: &mut Buffer) {
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Fill(1),
                Constraint::Length(7),
                Constraint::Fill(1),
            ])
            .split(area);
        let horizontal = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Fill(1),
                Constraint::Length(area.width.min(60)),
                Constraint::Fill(1),
            ])
            .split(vertical[1]);
        let modal_area = horizontal[1];

        Clear.render(modal_area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Error")
            .border_style(Style::default().fg(Color::Red));
        let inner = block.inner(modal_area);
        block.render(modal_area, buf);

        let lines = vec![
            Line::from(self.error_modal.message.as_str()),
            Line::default(),
            Line::from(Span::styled(
                "Press Esc to dismiss",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}

fn editor_line(editor: &SelectionEditor, active: bool) -> String {
    match &editor.value {
        ValueEditor::Text { query } => {
            if active {
                format!("{} contains \"{}_\"", editor.column, query)
            } else {
                format!("{} contains \"{}\"", editor.column, query)
            }
        }
        ValueEditor::Range {
            low, high, field, ..
        } => {
            if active {
                match field {
                    RangeField::Low => format!("{}  [{}] .. {}", editor.column, low, high),
                    RangeField::High => format!("{}  {} .. [{}]", editor.column, low, high),
                }
            } else {
                format!("{}  {} .. {}", editor.column, low, high)
            }
        }
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Fill(1), Constraint::Length(1)])
            .split(area);
        let main_area = layout[0];
        let controls_area = layout[1];

        let mut results_area = main_area;
        let mut panel_area = Rect::default();
        if self.filter_modal.active {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(0), Constraint::Length(50)])
                .split(main_area);
            results_area = chunks[0];
            panel_area = chunks[1];
        }

        let matching = self.filtered.as_ref().map(|df| df.height());

        match &self.table {
            Some(table) => {
                let results = ResultsView::new(&self.cards)
                    .with_exhausted(self.exhausted)
                    .with_scroll(self.results_scroll)
                    .with_matching_rows(matching.unwrap_or(0));
                if self.info_visible {
                    let info_layout = Layout::default()
                        .direction(Direction::Horizontal)
                        .constraints([Constraint::Fill(1), Constraint::Max(50)])
                        .split(results_area);
                    (&results).render(info_layout[0], buf);
                    let info = ResultsInfo::new(
                        table.num_rows(),
                        matching.unwrap_or(0),
                        self.session.count(),
                        &self.active_selections,
                    );
                    (&info).render(info_layout[1], buf);
                } else {
                    (&results).render(results_area, buf);
                }
            }
            None => {
                if self.loading {
                    Paragraph::new("Loading tracks...")
                        .centered()
                        .render(results_area, buf);
                } else {
                    Paragraph::new("No data loaded").render(results_area, buf);
                }
            }
        }

        let mut controls = Controls::new().with_dimmed(self.input_mode != InputMode::Normal);
        if let Some(matching) = matching {
            controls = controls.with_row_count(matching);
        }
        (&controls).render(controls_area, buf);

        if self.filter_modal.active {
            self.render_filter_panel(panel_area, buf);
        }
        if self.error_modal.active {
            self.render_error_modal(area, buf);
        }
    }
}
