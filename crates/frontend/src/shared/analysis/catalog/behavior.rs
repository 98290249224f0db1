//! Behaviour reports: complaint subjects and clients showing churn signals.

use super::{clients, in_city, linked_table, num, text_or, ChartPlan, RenderPlan, WidgetPlan};
use crate::shared::analysis::chart::{ChartSpec, ChartType, Dataset};
use crate::shared::analysis::presentation::Column;
use contracts::dashboards::d500_client_analytics::{
    AnalysisId, AnalysisPayload, FilterField, Filters, Rect,
};

/// Both marker columns hold "Sim" for every row the server returns
const PREDICTIVE_COLUMNS: &[Column] = &[
    Column::text("Razao_Social", "Cliente"),
    Column::text("Contrato_ID", "Contrato ID"),
    Column::text("Primeira_Inadimplencia_Vencimento", "Teve Atraso >10d?"),
    Column::text("Possui_Reclamacoes", "Tem Reclamações?"),
    Column::date("Ultima_Conexao", "Última Conexão"),
];

pub(super) fn complaints_plan(payload: &AnalysisPayload, filters: &Filters) -> RenderPlan {
    let subjects = payload.records("top_subjects");
    if subjects.is_empty() {
        let city = match filters.text(FilterField::City) {
            "" => String::new(),
            city => format!(" para {}", city),
        };
        return RenderPlan {
            notice: Some(format!("Nenhum dado de reclamação encontrado{}.", city)),
            ..Default::default()
        };
    }

    let spec = ChartSpec::new(
        ChartType::BarVertical,
        format!("Top Assuntos de Reclamação{}", in_city(filters)),
        subjects.iter().map(|r| text_or(r, "Assunto", "N/A")).collect(),
    )
    .dataset(Dataset::new(
        "Contagem",
        subjects.iter().map(|r| num(r, "Count")).collect(),
    ))
    .without_legend();

    RenderPlan {
        widgets: vec![WidgetPlan::Chart(ChartPlan {
            id: "complaintChart".to_string(),
            default_rect: Some(Rect::new(0, 0, 12, 10)),
            spec,
            type_options: vec![
                ChartType::BarVertical,
                ChartType::BarHorizontal,
                ChartType::Pie,
            ],
            drill: None,
        })],
        ..Default::default()
    }
}

pub(super) fn predictive_plan(payload: &AnalysisPayload) -> RenderPlan {
    let rows = payload.rows();
    if rows.is_empty() {
        return RenderPlan {
            notice: Some(
                "Nenhum cliente com perfil de risco encontrado para os filtros selecionados."
                    .to_string(),
            ),
            ..Default::default()
        };
    }
    RenderPlan {
        table: Some(
            linked_table(PREDICTIVE_COLUMNS, rows, clients::health_link)
                .titled(AnalysisId::PredictiveChurn.title()),
        ),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::super::plan;
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> AnalysisPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_complaint_subjects_chart_in_server_order() {
        let payload = payload(json!({
            "top_subjects": [{"Assunto": "Sem sinal", "Count": 9}, {"Assunto": "Lentidão", "Count": 4}],
            "cities": ["Ararí", "Bacabal"]
        }));
        let filters = Filters::new().with_text(FilterField::City, "Bacabal");

        let plan = plan(AnalysisId::ComplaintPatterns, &payload, &filters);

        let WidgetPlan::Chart(chart) = &plan.widgets[0] else {
            panic!("expected a chart");
        };
        assert_eq!(chart.id, "complaintChart");
        assert_eq!(chart.spec.title, "Top Assuntos de Reclamação em Bacabal");
        assert_eq!(chart.spec.labels, vec!["Sem sinal", "Lentidão"]);
        assert_eq!(chart.spec.datasets[0].values, vec![9.0, 4.0]);
        assert!(chart.drill.is_none());
        assert!(plan.notice.is_none());
    }

    #[test]
    fn test_complaints_empty_names_the_city() {
        let filters = Filters::new().with_text(FilterField::City, "Bacabal");
        let plan = plan(
            AnalysisId::ComplaintPatterns,
            &payload(json!({"top_subjects": [], "cities": []})),
            &filters,
        );
        assert!(plan.widgets.is_empty());
        assert_eq!(
            plan.notice.as_deref(),
            Some("Nenhum dado de reclamação encontrado para Bacabal.")
        );
    }

    #[test]
    fn test_predictive_markers_open_client_tabs() {
        let payload = payload(json!({
            "data": [{"Razao_Social": "Davi", "Contrato_ID": 11,
                      "Primeira_Inadimplencia_Vencimento": "Sim",
                      "Possui_Reclamacoes": "Sim", "Ultima_Conexao": null}],
            "total_rows": 1
        }));

        let plan = plan(AnalysisId::PredictiveChurn, &payload, &Filters::new());
        let table = plan.table.unwrap();
        let row = &table.rows[0];

        assert_eq!(table.headers[2], "Teve Atraso >10d?");
        assert_eq!(
            row[2].drill.as_ref().map(|d| d.target),
            Some(AnalysisId::ClientFinancial)
        );
        assert_eq!(
            row[3].drill.as_ref().map(|d| d.target),
            Some(AnalysisId::ClientServiceOrders)
        );
        assert!(row[4].drill.is_none());
        assert_eq!(
            row[2].drill.as_ref().unwrap().filters.text(FilterField::ContractId),
            "11"
        );
    }
}
