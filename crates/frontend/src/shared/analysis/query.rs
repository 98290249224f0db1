//! Query-string construction shared by every analysis.
//!
//! Only non-empty filter values that the analysis schema knows about are sent.

use super::view_state::AnalysisSelection;
use contracts::dashboards::d500_client_analytics::{AnalysisId, FieldRule, Filters};

pub type QueryPairs = Vec<(&'static str, String)>;

/// Non-empty schema fields in schema order
pub fn filter_pairs(schema: &[FieldRule], filters: &Filters) -> QueryPairs {
    schema
        .iter()
        .filter(|rule| !rule.in_path)
        .filter_map(|rule| {
            let value = filters.get(rule.field)?;
            if value.is_empty() {
                return None;
            }
            Some((rule.field.query_name(), value.to_query_value()))
        })
        .collect()
}

/// `category/endpoint` followed by the percent-encoded path fields, in schema order
pub fn endpoint_path(analysis: AnalysisId, filters: &Filters) -> String {
    let path = analysis.path();
    analysis
        .schema()
        .iter()
        .filter(|rule| rule.in_path)
        .filter_map(|rule| filters.get(rule.field))
        .filter(|value| !value.is_empty())
        .fold(format!("{}/{}", path.category, path.endpoint), |acc, value| {
            format!("{}/{}", acc, urlencoding::encode(&value.to_query_value()))
        })
}

pub fn encode_pairs(pairs: &[(&str, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn build_query(schema: &[FieldRule], filters: &Filters) -> String {
    encode_pairs(&filter_pairs(schema, filters))
}

/// Filters plus `limit`/`offset` for paginated analyses and `sort_order` for sortable ones
pub fn selection_pairs(selection: &AnalysisSelection) -> QueryPairs {
    let analysis = selection.analysis;
    let mut pairs: QueryPairs = analysis
        .fixed_query()
        .iter()
        .map(|(k, v)| (*k, v.to_string()))
        .collect();
    pairs.extend(filter_pairs(analysis.schema(), &selection.filters));

    if analysis.is_paginated() {
        let limit = selection.rows_per_page.max(1);
        let offset = u64::from(selection.page.max(1) - 1) * u64::from(limit);
        pairs.push(("limit", limit.to_string()));
        pairs.push(("offset", offset.to_string()));
    }
    if analysis.is_sortable() {
        pairs.push(("sort_order", selection.sort_order.as_str().to_string()));
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::analysis::view_state::SortOrder;
    use contracts::dashboards::d500_client_analytics::{FilterField, FilterValue};

    #[test]
    fn test_empty_values_are_omitted() {
        let filters = Filters::new()
            .with_text(FilterField::City, "")
            .with_text(FilterField::StartDate, "2024-01-01")
            .with_text(FilterField::EndDate, "");

        let query = build_query(AnalysisId::BillingByCity.schema(), &filters);

        assert_eq!(query, "start_date=2024-01-01");
        assert!(!query.contains("city"));
        assert!(!query.contains("end_date"));
    }

    #[test]
    fn test_sets_are_comma_joined_and_encoded() {
        let filters = Filters::new()
            .with(FilterField::AccessStatus, FilterValue::set(["Bloqueado", "Ativo"]))
            .with_text(FilterField::SearchTerm, "João Silva");

        let query = build_query(AnalysisId::FinancialHealth.schema(), &filters);

        assert_eq!(query, "search_term=Jo%C3%A3o%20Silva&status_acesso=Ativo%2CBloqueado");
    }

    #[test]
    fn test_fields_outside_schema_are_ignored() {
        let filters = Filters::new().with_text(FilterField::SellerId, "9");
        assert_eq!(build_query(AnalysisId::Cancellations.schema(), &filters), "");
    }

    #[test]
    fn test_selection_pairs_paging_and_sort() {
        let mut selection = AnalysisSelection::new(AnalysisId::Cancellations, 50);
        selection.page = 3;
        selection.sort_order = SortOrder::Asc;

        let query = encode_pairs(&selection_pairs(&selection));
        assert_eq!(query, "limit=50&offset=100&sort_order=asc");

        let chart_only = AnalysisSelection::new(AnalysisId::CancellationsByCity, 50);
        assert!(selection_pairs(&chart_only).is_empty());
    }

    #[test]
    fn test_path_fields_become_segments() {
        let filters = Filters::new()
            .with_text(FilterField::ClientName, "Ana Maria")
            .with_text(FilterField::ContractId, "42");

        assert_eq!(
            endpoint_path(AnalysisId::CancellationContext, &filters),
            "details/cancellation_context/42/Ana%20Maria"
        );
        assert_eq!(build_query(AnalysisId::CancellationContext.schema(), &filters), "");
    }

    #[test]
    fn test_fixed_type_leads_the_query() {
        let selection = AnalysisSelection::new(AnalysisId::ClientServiceOrders, 25)
            .with_filters(&Filters::new().with_text(FilterField::ClientName, "Ana"));

        assert_eq!(
            encode_pairs(&selection_pairs(&selection)),
            "type=os&limit=25&offset=0"
        );
    }
}
