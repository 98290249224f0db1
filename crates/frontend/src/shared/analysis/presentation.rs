//! What the flow hands to the presentation layer: tables, cards and section state.

use super::pagination::PaginationView;
use super::view_state::SortOrder;
use crate::shared::number_format::{format_money, format_number_int, format_share};
use chrono::NaiveDate;
use std::borrow::Borrow;
use contracts::dashboards::d500_client_analytics::{
    value_as_f64, value_as_text, AnalysisId, DrillDown, Record,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Money,
    Date,
    /// `part / total` of two numeric columns of the same row, `-` when total is 0
    ShareOf {
        part: &'static str,
        total: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub key: &'static str,
    pub header: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn text(key: &'static str, header: &'static str) -> Self {
        Self {
            key,
            header,
            kind: ColumnKind::Text,
        }
    }

    pub const fn integer(key: &'static str, header: &'static str) -> Self {
        Self {
            key,
            header,
            kind: ColumnKind::Integer,
        }
    }

    pub const fn money(key: &'static str, header: &'static str) -> Self {
        Self {
            key,
            header,
            kind: ColumnKind::Money,
        }
    }

    pub const fn date(key: &'static str, header: &'static str) -> Self {
        Self {
            key,
            header,
            kind: ColumnKind::Date,
        }
    }

    pub const fn share(header: &'static str, part: &'static str, total: &'static str) -> Self {
        Self {
            key: part,
            header,
            kind: ColumnKind::ShareOf { part, total },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    /// Clicking the cell opens this detail view
    pub drill: Option<DrillDown>,
}

impl Cell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            drill: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableModel {
    pub title: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl TableModel {
    pub fn from_records<R: Borrow<Record>>(columns: &[Column], records: &[R]) -> Self {
        Self {
            title: None,
            headers: columns.iter().map(|c| c.header.to_string()).collect(),
            rows: records
                .iter()
                .map(|record| {
                    columns
                        .iter()
                        .map(|c| Cell::plain(format_cell(c.kind, c.key, record.borrow())))
                        .collect()
                })
                .collect(),
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn format_cell(kind: ColumnKind, key: &str, record: &Record) -> String {
    let value = record.get(key);
    match kind {
        ColumnKind::Text => value.map(value_as_text).unwrap_or_default(),
        ColumnKind::Integer => value
            .map(|v| {
                if v.is_null() {
                    String::new()
                } else {
                    format_number_int(value_as_f64(v))
                }
            })
            .unwrap_or_default(),
        ColumnKind::Money => value
            .map(|v| format_money(value_as_f64(v)))
            .unwrap_or_default(),
        ColumnKind::Date => value.map(|v| format_date(&value_as_text(v))).unwrap_or_default(),
        ColumnKind::ShareOf { part, total } => {
            let total = record.get(total).map(value_as_f64).unwrap_or(0.0);
            if total <= 0.0 {
                "-".to_string()
            } else {
                let part = record.get(part).map(value_as_f64).unwrap_or(0.0);
                format_share(part, total)
            }
        }
    }
}

/// `2024-03-05...` → `05/03/2024`; anything else is passed through
pub fn format_date(raw: &str) -> String {
    let head = raw.get(..10).unwrap_or(raw);
    match NaiveDate::parse_from_str(head, "%Y-%m-%d") {
        Ok(date) => date.format("%d/%m/%Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Neutral,
    Danger,
    Warning,
    Info,
    Accent,
    Success,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryCard {
    pub title: String,
    pub value: String,
    pub tone: Tone,
}

impl SummaryCard {
    pub fn count(title: impl Into<String>, value: f64, tone: Tone) -> Self {
        Self {
            title: title.into(),
            value: format_number_int(value),
            tone,
        }
    }

    pub fn money(title: impl Into<String>, value: f64, tone: Tone) -> Self {
        Self {
            title: title.into(),
            value: format_money(value),
            tone,
        }
    }
}

/// Non-widget part of a rendered analysis
#[derive(Debug, Clone, PartialEq)]
pub struct SectionView {
    pub analysis: AnalysisId,
    pub title: String,
    pub cards: Vec<SummaryCard>,
    pub table: Option<TableModel>,
    /// Further titled tables below the main one
    pub tables: Vec<TableModel>,
    /// "Ver tabela completa" target
    pub browse: Option<DrillDown>,
    pub pagination: PaginationView,
    pub sortable: bool,
    pub sort_order: SortOrder,
    /// Neutral empty-result text shown in place of charts and table
    pub notice: Option<String>,
}

/// Presentation-layer capability driven by the re-query flow
pub trait ViewSink {
    fn loading(&self, analysis: AnalysisId);
    /// Failure banner; replaces section content and hides pagination
    fn show_error(&self, message: &str);
    /// Neutral message (no results, missing required filter)
    fn show_notice(&self, message: &str);
    fn show_content(&self, view: SectionView);
    fn clear(&self);
    fn show_cities(&self, cities: &[String]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_table_from_records() {
        let columns = [
            Column::text("Vendedor_Nome", "Vendedor"),
            Column::integer("Cancelados_Count", "Cancelados"),
            Column::share("% Canc.", "Cancelados_Count", "Total"),
            Column::money("Valor", "Valor"),
            Column::date("Data", "Data"),
        ];
        let rows = [
            record(json!({"Vendedor_Nome":"Ana","Cancelados_Count":1500,"Total":3000,
                          "Valor":10.5,"Data":"2024-03-05 10:00:00"})),
            record(json!({"Vendedor_Nome":null,"Cancelados_Count":0,"Total":0})),
        ];

        let table = TableModel::from_records(&columns, &rows);

        assert_eq!(table.headers.len(), 5);
        let first: Vec<&str> = table.rows[0].iter().map(|c| c.text.as_str()).collect();
        assert_eq!(first, vec!["Ana", "1.500", "50.0%", "R$ 10,50", "05/03/2024"]);
        let second: Vec<&str> = table.rows[1].iter().map(|c| c.text.as_str()).collect();
        assert_eq!(second, vec!["", "0", "-", "", ""]);
    }

    #[test]
    fn test_format_date_passthrough() {
        assert_eq!(format_date("N/A"), "N/A");
        assert_eq!(format_date("2024-12-31"), "31/12/2024");
    }
}
