use super::analysis::AnalysisId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Filter understood by the analytics API
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    StartDate,
    EndDate,
    City,
    Neighborhood,
    /// Bucketed "months retained" range, e.g. "0-6", "7-12", "37+"
    Relevance,
    ContractStatus,
    AccessStatus,
    SearchTerm,
    FilterColumn,
    FilterValue,
    /// "cancelado" or "negativado"
    ClientType,
    SellerId,
    Equipment,
    /// Four-digit calendar year of the detail period
    Year,
    /// Month number of the detail period, sent only with `Year`
    Month,
    /// Reference day of the daily comparison
    Date,
    ContractId,
    ClientName,
    /// Raw table behind a collection summary
    TableName,
}

impl FilterField {
    /// Query parameter name on the wire
    pub fn query_name(&self) -> &'static str {
        match self {
            FilterField::StartDate => "start_date",
            FilterField::EndDate => "end_date",
            FilterField::City => "city",
            FilterField::Neighborhood => "neighborhood",
            FilterField::Relevance => "relevance",
            FilterField::ContractStatus => "status_contrato",
            FilterField::AccessStatus => "status_acesso",
            FilterField::SearchTerm => "search_term",
            FilterField::FilterColumn => "filter_column",
            FilterField::FilterValue => "filter_value",
            FilterField::ClientType => "type",
            FilterField::SellerId => "seller_id",
            FilterField::Equipment => "equipment_name",
            FilterField::Year => "year",
            FilterField::Month => "month",
            FilterField::Date => "date",
            FilterField::ContractId => "contract_id",
            FilterField::ClientName => "client_name",
            FilterField::TableName => "table_name",
        }
    }
}

/// Scalar or set-valued filter. Sets go out comma-joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    Set(BTreeSet<String>),
}

impl FilterValue {
    pub fn text(value: impl Into<String>) -> Self {
        FilterValue::Text(value.into())
    }

    pub fn set<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterValue::Set(items.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Text(s) => s.trim().is_empty(),
            FilterValue::Set(items) => items.iter().all(|s| s.trim().is_empty()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FilterValue::Text(s) => Some(s.as_str()),
            FilterValue::Set(_) => None,
        }
    }

    /// Value as it appears in the query string (before percent-encoding)
    pub fn to_query_value(&self) -> String {
        match self {
            FilterValue::Text(s) => s.trim().to_string(),
            FilterValue::Set(items) => items
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

/// Filter values keyed by field, ordered so two snapshots compare deterministically.
///
/// A `Filters` used as a *partial* update may carry empty values: merging an empty value
/// clears that field. Filters held by an active selection never contain empty values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters(BTreeMap<FilterField, FilterValue>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, keeps empty values (they mean "clear" in a merge)
    pub fn with(mut self, field: FilterField, value: FilterValue) -> Self {
        self.0.insert(field, value);
        self
    }

    pub fn with_text(self, field: FilterField, value: impl Into<String>) -> Self {
        self.with(field, FilterValue::text(value))
    }

    pub fn get(&self, field: FilterField) -> Option<&FilterValue> {
        self.0.get(&field)
    }

    /// Text value of a field, empty string when unset or set-valued
    pub fn text(&self, field: FilterField) -> &str {
        self.get(field).and_then(FilterValue::as_text).unwrap_or("")
    }

    pub fn is_set(&self, field: FilterField) -> bool {
        self.get(field).map(|v| !v.is_empty()).unwrap_or(false)
    }

    /// Shallow merge. Empty values in `partial` remove the field.
    pub fn merge(&mut self, partial: &Filters) {
        for (field, value) in &partial.0 {
            if value.is_empty() {
                self.0.remove(field);
            } else {
                self.0.insert(*field, value.clone());
            }
        }
    }

    /// Copy without empty values
    pub fn normalized(&self) -> Filters {
        let mut out = Filters::new();
        out.merge(self);
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterField, &FilterValue)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(FilterValue::is_empty)
    }

    /// Number of non-empty filters (badge count in the filter bar)
    pub fn active_count(&self) -> usize {
        self.0.values().filter(|v| !v.is_empty()).count()
    }
}

/// Drill-down request produced by a chart or table click.
///
/// `filters` is the fully-resolved snapshot the target view must use; it never reaches back
/// into live form state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillDown {
    pub target: AnalysisId,
    pub title: String,
    pub filters: Filters,
}

/// Choices offered by the status filters, served by `/api/filters/contract_statuses`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusOptions {
    #[serde(default)]
    pub status_contrato: Vec<String>,
    #[serde(default)]
    pub status_acesso: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_clears_empty_values() {
        let mut filters = Filters::new()
            .with_text(FilterField::City, "X")
            .with_text(FilterField::StartDate, "2024-01-01")
            .normalized();

        filters.merge(
            &Filters::new()
                .with_text(FilterField::City, "")
                .with_text(FilterField::EndDate, "2024-02-01"),
        );

        assert_eq!(filters.get(FilterField::City), None);
        assert_eq!(filters.text(FilterField::StartDate), "2024-01-01");
        assert_eq!(filters.text(FilterField::EndDate), "2024-02-01");
        assert_eq!(filters.active_count(), 2);
    }

    #[test]
    fn test_set_value_query_form() {
        let value = FilterValue::set(["Bloqueado", "Ativo", " "]);
        assert_eq!(value.to_query_value(), "Ativo,Bloqueado");
        assert!(!value.is_empty());
        assert!(FilterValue::set(Vec::<String>::new()).is_empty());
    }
}
