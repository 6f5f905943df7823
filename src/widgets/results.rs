//! Results view: every revealed track rendered as an embedded-player card.

use polars::prelude::*;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Base URL of the external player widget; the track id is appended.
pub const EMBED_BASE_URL: &str = "https://open.spotify.com/embed/track";

/// One revealed track, extracted from a page of rows for rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackCard {
    pub uri: String,
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub album_type: String,
    pub duration_ms: Option<f64>,
    pub tempo: Option<f64>,
}

impl TrackCard {
    /// The embeddable player reference for this track.
    pub fn embed_url(&self) -> String {
        format!("{}/{}", EMBED_BASE_URL, self.uri)
    }

    /// Extract cards from a page of rows. Attribute columns are looked up by
    /// their common header spellings; a missing column leaves the field
    /// blank rather than failing the page.
    pub fn from_frame(df: &DataFrame, id_column: &str) -> Vec<TrackCard> {
        (0..df.height())
            .map(|row| TrackCard {
                uri: string_value(df, row, &[id_column]),
                title: string_value(df, row, &["title", "Title", "track_name"]),
                artist: string_value(df, row, &["artist", "Artist", "artist_name"]),
                genre: string_value(df, row, &["genre", "Genre"]),
                album_type: string_value(df, row, &["type", "Type", "album_type"]),
                duration_ms: numeric_value(df, row, &["duration", "Duration", "duration_ms"]),
                tempo: numeric_value(df, row, &["tempo", "Tempo"]),
            })
            .collect()
    }
}

fn string_value(df: &DataFrame, row: usize, names: &[&str]) -> String {
    for name in names {
        if let Ok(column) = df.column(name) {
            if let Ok(value) = column.get(row) {
                return match value {
                    AnyValue::Null => String::new(),
                    AnyValue::String(v) => v.to_string(),
                    AnyValue::StringOwned(v) => v.to_string(),
                    other => other.to_string(),
                };
            }
        }
    }
    String::new()
}

fn numeric_value(df: &DataFrame, row: usize, names: &[&str]) -> Option<f64> {
    for name in names {
        if let Ok(column) = df.column(name) {
            if let Ok(value) = column.get(row) {
                if matches!(value, AnyValue::Null) {
                    return None;
                }
                return value.try_extract::<f64>().ok();
            }
        }
    }
    None
}

/// Milliseconds to "m:ss".
pub fn format_duration(ms: f64) -> String {
    let total_seconds = (ms / 1000.0).round() as u64;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

pub struct ResultsView<'a> {
    cards: &'a [TrackCard],
    exhausted: bool,
    scroll: u16,
    matching_rows: usize,
}

impl<'a> ResultsView<'a> {
    pub fn new(cards: &'a [TrackCard]) -> Self {
        Self {
            cards,
            exhausted: false,
            scroll: 0,
            matching_rows: 0,
        }
    }

    pub fn with_exhausted(mut self, exhausted: bool) -> Self {
        self.exhausted = exhausted;
        self
    }

    pub fn with_scroll(mut self, scroll: u16) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn with_matching_rows(mut self, matching_rows: usize) -> Self {
        self.matching_rows = matching_rows;
        self
    }
}

impl Widget for &ResultsView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = format!(
            "Results ({} shown, {} matching)",
            self.cards.len(),
            self.matching_rows
        );
        let block = Block::default().borders(Borders::ALL).title(title);
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines: Vec<Line> = Vec::new();
        if self.cards.is_empty() && !self.exhausted {
            lines.push(Line::from(Span::styled(
                "No tracks revealed yet.",
                Style::default().fg(Color::DarkGray),
            )));
        }
        for card in self.cards {
            let title = if card.title.is_empty() {
                card.uri.clone()
            } else {
                card.title.clone()
            };
            let mut head = vec![Span::styled(
                title,
                Style::default().add_modifier(Modifier::BOLD),
            )];
            if !card.album_type.is_empty() {
                head.push(Span::styled(
                    format!("  [{}]", card.album_type),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            lines.push(Line::from(head));

            let mut byline = vec![Span::styled(
                card.artist.clone(),
                Style::default().fg(Color::Cyan),
            )];
            if !card.genre.is_empty() {
                byline.push(Span::styled(
                    format!("  {}", card.genre),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            lines.push(Line::from(byline));

            let mut stats: Vec<String> = Vec::new();
            if let Some(ms) = card.duration_ms {
                stats.push(format_duration(ms));
            }
            if let Some(tempo) = card.tempo {
                stats.push(format!("{:.0} BPM", tempo));
            }
            if !stats.is_empty() {
                lines.push(Line::from(Span::raw(stats.join("  "))));
            }

            lines.push(Line::from(Span::styled(
                card.embed_url(),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::UNDERLINED),
            )));
            lines.push(Line::default());
        }
        if self.exhausted {
            lines.push(Line::from(Span::styled(
                "No more results to display.",
                Style::default().fg(Color::Yellow),
            )));
        }

        Paragraph::new(lines)
            .scroll((self.scroll, 0))
            .render(inner, buf);
    }
}
