//! Info panel: filtered dataset summary, active filters, and the column
//! glossary shown alongside the results.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, Widget};

use crate::filter::{FilterSelection, FilterValue};

/// What each searchable column means, shown to the user as-is.
pub const COLUMN_GLOSSARY: [(&str, &str); 14] = [
    ("title", "The title of the song."),
    ("artist", "The artist of the song."),
    ("genre", "The genre of the artist."),
    ("duration", "The duration of the track in ms."),
    ("type", "Album, single, or compilation."),
    (
        "danceability",
        "A measure of how suitable a track is for dancing based on a combination of musical elements.",
    ),
    ("energy", "Represents the intensity and activity level of a track."),
    ("loudness", "The overall loudness of a track in decibels (dB)."),
    (
        "speechiness",
        "Indicates the presence of spoken words in a track. Higher values indicate more spoken words.",
    ),
    (
        "acousticness",
        "Represents the likelihood of a track being acoustic (i.e., without electronic amplification).",
    ),
    (
        "instrumentalness",
        "Measures the amount of instrumental content in a track. Higher values suggest instrumental tracks.",
    ),
    (
        "liveness",
        "Represents the probability of a track being performed live. Higher values indicate a live performance.",
    ),
    (
        "valence",
        "Describes the musical positivity of a track. Higher values represent more positive (happy) tracks.",
    ),
    ("tempo", "The overall estimated tempo of a track in beats per minute (BPM)."),
];

/// One line describing an applied filter.
pub fn describe_selection(selection: &FilterSelection) -> String {
    match &selection.value {
        FilterValue::Text(query) => {
            if query.is_empty() {
                format!("{}: (any)", selection.column)
            } else {
                format!("{} contains \"{}\"", selection.column, query)
            }
        }
        FilterValue::Range { low, high } => {
            format!("{} in [{}, {}]", selection.column, low, high)
        }
    }
}

pub struct ResultsInfo<'a> {
    total_rows: usize,
    matching_rows: usize,
    shown_count: usize,
    filters: &'a [FilterSelection],
}

impl<'a> ResultsInfo<'a> {
    pub fn new(
        total_rows: usize,
        matching_rows: usize,
        shown_count: usize,
        filters: &'a [FilterSelection],
    ) -> Self {
        Self {
            total_rows,
            matching_rows,
            shown_count,
            filters,
        }
    }
}

impl Widget for &ResultsInfo<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL).title("Info");
        let inner = block.inner(area);
        block.render(area, buf);

        let filter_lines = 1 + self.filters.len().max(1);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(filter_lines as u16 + 1),
                Constraint::Min(0),
            ])
            .split(inner);

        let summary = vec![
            Line::from(format!("Tracks in dataset: {}", self.total_rows)),
            Line::from(format!("Matching filters:  {}", self.matching_rows)),
            Line::from(format!("Shown this run:    {}", self.shown_count)),
        ];
        Paragraph::new(summary).render(layout[0], buf);

        let mut filters = vec![Line::from(Span::styled(
            "Filters",
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        if self.filters.is_empty() {
            filters.push(Line::from(Span::styled(
                "(none)",
                Style::default().fg(Color::DarkGray),
            )));
        } else {
            for selection in self.filters {
                filters.push(Line::from(describe_selection(selection)));
            }
        }
        Paragraph::new(filters).render(layout[1], buf);

        let rows: Vec<Row> = COLUMN_GLOSSARY
            .iter()
            .map(|(name, description)| {
                Row::new(vec![name.to_string(), description.to_string()]).height(2)
            })
            .collect();
        let table = Table::new(rows, [Constraint::Length(17), Constraint::Fill(1)])
            .header(
                Row::new(vec!["Column", "Description"])
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .block(Block::default().borders(Borders::TOP).title("Columns"));
        Widget::render(table, layout[2], buf);
    }
}
