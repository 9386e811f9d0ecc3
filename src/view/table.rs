use std::collections::BTreeSet;
use std::fmt::Write;

use serde::Serialize;

use super::boundary::RenderError;
use crate::error::ValidationError;
use crate::outline::Outline;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ColumnKey {
    Header,
    Section,
    Status,
    Target,
    Limit,
    Reviewer,
}

impl ColumnKey {
    pub const ALL: [ColumnKey; 6] = [
        ColumnKey::Header,
        ColumnKey::Section,
        ColumnKey::Status,
        ColumnKey::Target,
        ColumnKey::Limit,
        ColumnKey::Reviewer,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ColumnKey::Header => "Header",
            ColumnKey::Section => "Section Type",
            ColumnKey::Status => "Status",
            ColumnKey::Target => "Target",
            ColumnKey::Limit => "Limit",
            ColumnKey::Reviewer => "Reviewer",
        }
    }

    pub fn hideable(&self) -> bool {
        !matches!(self, ColumnKey::Header)
    }

    fn width(&self) -> usize {
        match self {
            ColumnKey::Header => 32,
            ColumnKey::Section => 20,
            ColumnKey::Status => 13,
            ColumnKey::Target | ColumnKey::Limit => 8,
            ColumnKey::Reviewer => 20,
        }
    }

    fn cell(&self, row: &Outline) -> String {
        match self {
            ColumnKey::Header => row.header.clone(),
            ColumnKey::Section => row.section.as_str().to_string(),
            ColumnKey::Status => row.status.as_str().to_string(),
            ColumnKey::Target => row.target.to_string(),
            ColumnKey::Limit => row.limit.to_string(),
            ColumnKey::Reviewer => row
                .reviewer
                .clone()
                .or_else(|| row.reviewer_id.clone())
                .unwrap_or_default(),
        }
    }
}

impl std::str::FromStr for ColumnKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ColumnKey::ALL
            .into_iter()
            .find(|c| {
                let label = c.label().to_ascii_lowercase();
                label == wanted || label.split(' ').next() == Some(wanted.as_str())
            })
            .ok_or_else(|| ValidationError::InvalidValue { field: "column", value: s.to_string() })
    }
}

/// Client-side table state: column visibility and row selection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableState {
    hidden: BTreeSet<ColumnKey>,
    selected: BTreeSet<String>,
}

impl TableState {
    /// Returns the new visibility. The header column can't be hidden.
    pub fn toggle_column(&mut self, column: ColumnKey) -> bool {
        if !column.hideable() {
            return true;
        }
        if self.hidden.remove(&column) {
            true
        } else {
            self.hidden.insert(column);
            false
        }
    }

    pub fn is_visible(&self, column: ColumnKey) -> bool {
        !self.hidden.contains(&column)
    }

    pub fn visible_columns(&self) -> Vec<ColumnKey> {
        ColumnKey::ALL.into_iter().filter(|c| self.is_visible(*c)).collect()
    }

    pub fn toggle_row(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
    }

    pub fn select_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        self.selected = ids.into_iter().map(str::to_string).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }
}

/// Move the row `active_id` to where `over_id` sits. False if either id is unknown or they match.
pub fn move_row(rows: &mut Vec<Outline>, active_id: &str, over_id: &str) -> bool {
    if active_id == over_id {
        return false;
    }
    let Some(from) = rows.iter().position(|r| r.id == active_id) else {
        return false;
    };
    let Some(to) = rows.iter().position(|r| r.id == over_id) else {
        return false;
    };

    let row = rows.remove(from);
    rows.insert(to, row);
    true
}

/// Everything needed to draw one page of the outline table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableModel {
    pub columns: Vec<ColumnKey>,
    pub rows: Vec<Outline>,
    pub selected: Vec<String>,
    pub page: u32,
    pub page_count: u32,
    pub total: u64,
}

impl TableModel {
    pub fn selection_summary(&self) -> String {
        format!("{} of {} row(s) selected.", self.selected.len(), self.total)
    }

    pub fn render_text(&self) -> Result<String, RenderError> {
        let mut out = String::new();

        write!(out, "  ")?;
        for column in &self.columns {
            write!(out, "{:<width$} ", column.label(), width = column.width())?;
        }
        writeln!(out)?;

        let rule = 2 + self.columns.iter().map(|c| c.width() + 1).sum::<usize>();
        writeln!(out, "{}", "-".repeat(rule))?;

        if self.rows.is_empty() {
            writeln!(out, "  No results.")?;
        }

        for row in &self.rows {
            let marker = if self.selected.contains(&row.id) { "* " } else { "  " };
            write!(out, "{}", marker)?;
            for column in &self.columns {
                write!(out, "{:<width$} ", truncate(&column.cell(row), column.width()), width = column.width())?;
            }
            writeln!(out)?;
        }

        writeln!(out)?;
        write!(out, "{}  Page {} of {}", self.selection_summary(), self.page, self.page_count)?;
        Ok(out)
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::{OutlineStatus, SectionStyle};

    fn row(id: &str, header: &str) -> Outline {
        Outline {
            id: id.into(),
            header: header.into(),
            section: SectionStyle::Narrative,
            status: OutlineStatus::Pending,
            target: 1,
            limit: 2,
            reviewer_id: Some("u1".into()),
            reviewer: None,
        }
    }

    #[test]
    fn test_header_column_always_visible() {
        let mut state = TableState::default();
        assert!(state.toggle_column(ColumnKey::Header));
        assert!(!state.toggle_column(ColumnKey::Reviewer));
        assert_eq!(state.visible_columns().len(), 5);
        assert!(state.toggle_column(ColumnKey::Reviewer));
        assert_eq!(state.visible_columns().len(), 6);
    }

    #[test]
    fn test_column_from_str() {
        assert_eq!("section".parse::<ColumnKey>().unwrap(), ColumnKey::Section);
        assert_eq!("Section Type".parse::<ColumnKey>().unwrap(), ColumnKey::Section);
        assert_eq!("REVIEWER".parse::<ColumnKey>().unwrap(), ColumnKey::Reviewer);
        assert!("owner".parse::<ColumnKey>().is_err());
    }

    #[test]
    fn test_row_selection() {
        let mut state = TableState::default();
        state.toggle_row("1");
        state.toggle_row("2");
        state.toggle_row("1");
        assert_eq!(state.selected().iter().collect::<Vec<_>>(), vec!["2"]);

        state.select_all(["1", "2", "3"]);
        assert_eq!(state.selected().len(), 3);
        state.clear_selection();
        assert!(state.selected().is_empty());
    }

    #[test]
    fn test_move_row() {
        let mut rows = vec![row("1", "a"), row("2", "b"), row("3", "c")];
        assert!(move_row(&mut rows, "1", "3"));
        assert_eq!(rows.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), vec!["2", "3", "1"]);
        assert!(!move_row(&mut rows, "1", "1"));
        assert!(!move_row(&mut rows, "9", "1"));
    }

    #[test]
    fn test_render_text() {
        let model = TableModel {
            columns: vec![ColumnKey::Header, ColumnKey::Status],
            rows: vec![row("1", "Cover letter")],
            selected: vec!["1".into()],
            page: 1,
            page_count: 3,
            total: 21,
        };
        let text = model.render_text().unwrap();
        assert!(text.contains("Header"));
        assert!(text.contains("* Cover letter"));
        assert!(text.ends_with("1 of 21 row(s) selected.  Page 1 of 3"));
        assert!(!text.contains("Reviewer"));
    }
}
