use ratatui::widgets::ListState;

use crate::dataset::ColumnKind;
use crate::filter::{FilterSelection, FilterValue};

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum FilterFocus {
    #[default]
    Columns,
    Selections,
    Apply,
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeField {
    Low,
    High,
}

/// Editable value for one selected column. Range editors remember the seeded
/// `[min, max]` bounds separately from the user's text so that an untouched
/// field always applies the exact default bound.
#[derive(Debug, Clone)]
pub enum ValueEditor {
    Text {
        query: String,
    },
    Range {
        low: String,
        high: String,
        low_edited: bool,
        high_edited: bool,
        bounds: (f64, f64),
        field: RangeField,
    },
}

#[derive(Debug, Clone)]
pub struct SelectionEditor {
    pub column: String,
    pub kind: ColumnKind,
    pub value: ValueEditor,
}

impl SelectionEditor {
    fn text(column: String) -> Self {
        Self {
            column,
            kind: ColumnKind::Text,
            value: ValueEditor::Text {
                query: String::new(),
            },
        }
    }

    fn range(column: String, bounds: (f64, f64)) -> Self {
        Self {
            column,
            kind: ColumnKind::Numeric,
            value: ValueEditor::Range {
                low: bounds.0.to_string(),
                high: bounds.1.to_string(),
                low_edited: false,
                high_edited: false,
                bounds,
                field: RangeField::Low,
            },
        }
    }

    /// The concrete filter this editor currently stands for. Unedited range
    /// fields resolve to the seeded bound; edited fields that fail to parse
    /// fall back to it.
    pub fn to_selection(&self) -> FilterSelection {
        match &self.value {
            ValueEditor::Text { query } => FilterSelection {
                column: self.column.clone(),
                value: FilterValue::Text(query.clone()),
            },
            ValueEditor::Range {
                low,
                high,
                low_edited,
                high_edited,
                bounds,
                ..
            } => {
                let low = if *low_edited {
                    low.trim().parse::<f64>().unwrap_or(bounds.0)
                } else {
                    bounds.0
                };
                let high = if *high_edited {
                    high.trim().parse::<f64>().unwrap_or(bounds.1)
                } else {
                    bounds.1
                };
                FilterSelection {
                    column: self.column.clone(),
                    value: FilterValue::Range { low, high },
                }
            }
        }
    }
}

/// Sidebar state for building the filter spec: which columns are selected
/// and, per column, the current query or range input.
#[derive(Default)]
pub struct FilterModal {
    pub active: bool,
    pub available_columns: Vec<(String, ColumnKind)>,
    pub selections: Vec<SelectionEditor>,
    pub focus: FilterFocus,
    pub column_state: ListState,
    pub selection_state: ListState,
}

impl FilterModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, available_columns: Vec<(String, ColumnKind)>) {
        self.active = true;
        self.available_columns = available_columns;
        self.focus = FilterFocus::Columns;
        if self.column_state.selected().is_none() && !self.available_columns.is_empty() {
            self.column_state.select(Some(0));
        }
    }

    pub fn close(&mut self) {
        self.active = false;
    }

    pub fn selected_column(&self) -> Option<(String, ColumnKind)> {
        self.column_state
            .selected()
            .and_then(|i| self.available_columns.get(i).cloned())
    }

    pub fn is_selected(&self, column: &str) -> bool {
        self.selections.iter().any(|s| s.column == column)
    }

    /// Add a column to the filter spec. Duplicates are ignored. Numeric
    /// columns must come with their seeded bounds.
    pub fn add_column(&mut self, column: String, kind: ColumnKind, bounds: Option<(f64, f64)>) {
        if self.is_selected(&column) {
            return;
        }
        let editor = match (kind, bounds) {
            (ColumnKind::Numeric, Some(bounds)) => SelectionEditor::range(column, bounds),
            (ColumnKind::Text, _) => SelectionEditor::text(column),
            _ => return,
        };
        self.selections.push(editor);
        self.selection_state.select(Some(self.selections.len() - 1));
    }

    pub fn remove_selected(&mut self) {
        if let Some(idx) = self.selection_state.selected() {
            if idx < self.selections.len() {
                self.selections.remove(idx);
                if self.selections.is_empty() {
                    self.selection_state.select(None);
                    self.focus = FilterFocus::Columns;
                } else if idx >= self.selections.len() {
                    self.selection_state.select(Some(self.selections.len() - 1));
                }
            }
        }
    }

    pub fn next_column(&mut self) {
        Self::select_next(&mut self.column_state, self.available_columns.len());
    }

    pub fn prev_column(&mut self) {
        Self::select_prev(&mut self.column_state, self.available_columns.len());
    }

    pub fn next_selection(&mut self) {
        Self::select_next(&mut self.selection_state, self.selections.len());
    }

    pub fn prev_selection(&mut self) {
        Self::select_prev(&mut self.selection_state, self.selections.len());
    }

    fn select_next(state: &mut ListState, len: usize) {
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        state.select(Some(i));
    }

    fn select_prev(state: &mut ListState, len: usize) {
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }

    pub fn current_editor_mut(&mut self) -> Option<&mut SelectionEditor> {
        let idx = self.selection_state.selected()?;
        self.selections.get_mut(idx)
    }

    pub fn input_char(&mut self, c: char) {
        if let Some(editor) = self.current_editor_mut() {
            match &mut editor.value {
                ValueEditor::Text { query } => query.push(c),
                ValueEditor::Range {
                    low,
                    high,
                    low_edited,
                    high_edited,
                    field,
                    ..
                } => match field {
                    RangeField::Low => {
                        low.push(c);
                        *low_edited = true;
                    }
                    RangeField::High => {
                        high.push(c);
                        *high_edited = true;
                    }
                },
            }
        }
    }

    pub fn backspace(&mut self) {
        if let Some(editor) = self.current_editor_mut() {
            match &mut editor.value {
                ValueEditor::Text { query } => {
                    query.pop();
                }
                ValueEditor::Range {
                    low,
                    high,
                    low_edited,
                    high_edited,
                    field,
                    ..
                } => match field {
                    RangeField::Low => {
                        low.pop();
                        *low_edited = true;
                    }
                    RangeField::High => {
                        high.pop();
                        *high_edited = true;
                    }
                },
            }
        }
    }

    pub fn switch_range_field(&mut self) {
        if let Some(editor) = self.current_editor_mut() {
            if let ValueEditor::Range { field, .. } = &mut editor.value {
                *field = match field {
                    RangeField::Low => RangeField::High,
                    RangeField::High => RangeField::Low,
                };
            }
        }
    }

    /// Re-derive the default bounds for the editor at `idx`. Fields the user
    /// has not touched follow the new bounds.
    pub fn seed_range(&mut self, idx: usize, new_bounds: (f64, f64)) {
        if let Some(editor) = self.selections.get_mut(idx) {
            if let ValueEditor::Range {
                low,
                high,
                low_edited,
                high_edited,
                bounds,
                ..
            } = &mut editor.value
            {
                *bounds = new_bounds;
                if !*low_edited {
                    *low = new_bounds.0.to_string();
                }
                if !*high_edited {
                    *high = new_bounds.1.to_string();
                }
            }
        }
    }

    pub fn selection_spec(&self, idx: usize) -> Option<FilterSelection> {
        self.selections.get(idx).map(|e| e.to_selection())
    }

    /// The full filter spec as currently edited, in selection order.
    pub fn build_spec(&self) -> Vec<FilterSelection> {
        self.selections.iter().map(|e| e.to_selection()).collect()
    }

    pub fn clear(&mut self) {
        self.selections.clear();
        self.selection_state.select(None);
        self.focus = FilterFocus::Columns;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_modal_new() {
        let modal = FilterModal::new();
        assert!(!modal.active);
        assert!(modal.selections.is_empty());
        assert!(modal.available_columns.is_empty());
        assert_eq!(modal.focus, FilterFocus::Columns);
    }

    #[test]
    fn test_add_column_ignores_duplicates() {
        let mut modal = FilterModal::new();
        modal.add_column("artist".to_string(), ColumnKind::Text, None);
        modal.add_column("artist".to_string(), ColumnKind::Text, None);
        assert_eq!(modal.selections.len(), 1);
    }

    #[test]
    fn test_build_spec_from_editors() {
        let mut modal = FilterModal::new();
        modal.add_column("artist".to_string(), ColumnKind::Text, None);
        modal.add_column(
            "tempo".to_string(),
            ColumnKind::Numeric,
            Some((90.0, 140.0)),
        );
        modal.selection_state.select(Some(0));
        for c in "daft".chars() {
            modal.input_char(c);
        }

        let spec = modal.build_spec();
        assert_eq!(spec.len(), 2);
        assert_eq!(spec[0], FilterSelection::text("artist", "daft"));
        assert_eq!(spec[1], FilterSelection::range("tempo", 90.0, 140.0));
    }

    #[test]
    fn test_edited_range_field_parses_input() {
        let mut modal = FilterModal::new();
        modal.add_column(
            "tempo".to_string(),
            ColumnKind::Numeric,
            Some((90.0, 140.0)),
        );
        modal.selection_state.select(Some(0));
        // Overwrite the low field with 100.
        for _ in 0.."90".len() {
            modal.backspace();
        }
        for c in "100".chars() {
            modal.input_char(c);
        }
        assert_eq!(
            modal.build_spec(),
            vec![FilterSelection::range("tempo", 100.0, 140.0)]
        );
    }

    #[test]
    fn test_unparsable_edit_falls_back_to_bound() {
        let mut modal = FilterModal::new();
        modal.add_column(
            "tempo".to_string(),
            ColumnKind::Numeric,
            Some((90.0, 140.0)),
        );
        modal.selection_state.select(Some(0));
        modal.switch_range_field();
        for c in "oops".chars() {
            modal.input_char(c);
        }
        assert_eq!(
            modal.build_spec(),
            vec![FilterSelection::range("tempo", 90.0, 140.0)]
        );
    }

    #[test]
    fn test_seed_range_respects_edited_fields() {
        let mut modal = FilterModal::new();
        modal.add_column(
            "tempo".to_string(),
            ColumnKind::Numeric,
            Some((90.0, 140.0)),
        );
        modal.selection_state.select(Some(0));
        modal.input_char('5'); // low becomes "905", edited
        modal.seed_range(0, (100.0, 130.0));

        match &modal.selections[0].value {
            ValueEditor::Range {
                low, high, bounds, ..
            } => {
                assert_eq!(low, "905");
                assert_eq!(high, "130");
                assert_eq!(*bounds, (100.0, 130.0));
            }
            _ => panic!("expected range editor"),
        }
    }

    #[test]
    fn test_remove_selected() {
        let mut modal = FilterModal::new();
        modal.add_column("artist".to_string(), ColumnKind::Text, None);
        modal.add_column("genre".to_string(), ColumnKind::Text, None);
        modal.selection_state.select(Some(1));
        modal.remove_selected();
        assert_eq!(modal.selections.len(), 1);
        assert_eq!(modal.selections[0].column, "artist");
        modal.remove_selected();
        assert!(modal.selections.is_empty());
        assert_eq!(modal.focus, FilterFocus::Columns);
    }
}
