//! Activation, retention and receipt analyses.

use super::{
    carry, num, seller_period, text_or, ChartPlan, DrillRule, RenderPlan, WidgetPlan,
};
use crate::shared::analysis::chart::{ChartSpec, ChartType, Dataset};
use crate::shared::analysis::presentation::{
    format_cell, format_date, Cell, Column, SummaryCard, TableModel, Tone,
};
use crate::shared::number_format::{format_money, format_number_int};
use contracts::dashboards::d500_client_analytics::{
    value_as_f64, value_as_text, AnalysisId, AnalysisPayload, DrillDown, FilterField, Filters,
    Rect, Record,
};
use serde_json::Value;

pub(super) const SELLER_ACTIVATION_COLUMNS: &[Column] = &[
    Column::text("Cliente", "Cliente"),
    Column::text("Contrato_ID", "Contrato ID"),
    Column::date("Data_ativa_o", "Data Ativação"),
    Column::text("Status_contrato", "Status Contrato"),
    Column::date("end_date", "Data Final (Churn)"),
    Column::integer("permanencia_meses", "Permanência (Meses)"),
];

pub(super) const DAILY_EVENT_COLUMNS: &[Column] = &[
    Column::text("Cliente", "Cliente"),
    Column::text("Contrato_ID", "Contrato ID"),
    Column::text("Status_contrato", "Status"),
    Column::date("Data_ativa_o", "Data Ativação"),
    Column::date("Data_Final", "Data Churn"),
    Column::text("Equipamento_Atual", "Equipamento"),
];

const LATE_INTEREST_COLUMNS: &[Column] = &[
    Column::text("Delay_Bucket", "Faixa de Atraso"),
    Column::integer("Count", "Nº de Faturas"),
    Column::money("Total_Interest", "Valor Total (Juros/Multas)"),
];

const COHORT_COLORS: [&str; 10] = [
    "#8884d8", "#82ca9d", "#ffc658", "#ff8042", "#0088FE", "#00C49F", "#FFBB28", "#FF8042",
    "#a0aec0", "#4a5568",
];

const GREEN: &str = "#22c55e";
const RED: &str = "#ef4444";

fn total(totals: Option<&Record>, key: &str) -> f64 {
    totals.map_or(0.0, |t| num(t, key))
}

fn activation_caption(client_type: &str) -> &'static str {
    match client_type {
        "ativado" => "Clientes Ativados",
        "ativo_permanece" => "Clientes que Permanecem Ativos",
        "cancelado" => "Clientes Cancelados",
        _ => "Clientes Negativados",
    }
}

pub(super) fn activations_plan(payload: &AnalysisPayload, filters: &Filters) -> RenderPlan {
    let totals = payload.object("totals");
    let cards = vec![
        SummaryCard::count("Total Ativações", total(totals, "total_ativacoes"), Tone::Info),
        SummaryCard::count(
            "Permanecem Ativos",
            total(totals, "total_permanecem_ativos"),
            Tone::Success,
        ),
        SummaryCard::count("Cancelados", total(totals, "total_cancelados"), Tone::Warning),
        SummaryCard::count("Negativados", total(totals, "total_negativados"), Tone::Danger),
        SummaryCard::count("Churn Total", total(totals, "total_churn"), Tone::Neutral),
    ];

    let rows = payload.rows();
    if rows.is_empty() {
        return RenderPlan {
            cards,
            notice: Some(
                "Nenhum vendedor com ativações encontrado para os filtros selecionados."
                    .to_string(),
            ),
            ..Default::default()
        };
    }

    let (period, caption) = seller_period(filters);
    let mut base = carry(filters, &[FilterField::City]);
    base.merge(&period);
    let scope = match filters.text(FilterField::City) {
        "" => format!("Todas Cidades / {}", caption),
        city => format!("{} / {}", city, caption),
    };

    let drill_cell = |record: &Record, count_key: &str, client_type: &str| -> Cell {
        let count = num(record, count_key);
        let text = format_number_int(count);
        if count <= 0.0 {
            return Cell::plain(text);
        }
        let seller = text_or(record, "Vendedor_Nome", "Não Identificado");
        Cell {
            text,
            drill: Some(DrillDown {
                target: AnalysisId::SellerActivations,
                title: format!(
                    "{} de {} ({})",
                    activation_caption(client_type),
                    seller,
                    scope
                ),
                filters: base
                    .clone()
                    .with_text(FilterField::SellerId, text_or(record, "Vendedor_ID", ""))
                    .with_text(FilterField::ClientType, client_type),
            }),
        }
    };
    let share_cell = |record: &Record, part: &'static str| {
        let column = Column::share("", part, "Total_Ativacoes");
        Cell::plain(format_cell(column.kind, column.key, record))
    };

    let table = TableModel {
        title: Some("Desempenho de Ativação por Vendedor".to_string()),
        headers: [
            "Vendedor",
            "Total Ativações",
            "Permanecem Ativos",
            "% Ativos",
            "Cancelados",
            "% Canc.",
            "Negativados",
            "% Neg.",
            "Churn Total",
        ]
        .iter()
        .map(|h| h.to_string())
        .collect(),
        rows: rows
            .iter()
            .map(|r| {
                vec![
                    Cell::plain(text_or(r, "Vendedor_Nome", "Não Identificado")),
                    drill_cell(r, "Total_Ativacoes", "ativado"),
                    drill_cell(r, "Permanecem_Ativos", "ativo_permanece"),
                    share_cell(r, "Permanecem_Ativos"),
                    drill_cell(r, "Cancelados", "cancelado"),
                    share_cell(r, "Cancelados"),
                    drill_cell(r, "Negativados", "negativado"),
                    share_cell(r, "Negativados"),
                    Cell::plain(format_number_int(num(r, "Total_Churn"))),
                ]
            })
            .collect(),
    };

    RenderPlan {
        cards,
        table: Some(table),
        ..Default::default()
    }
}

pub(super) fn cohort_plan(payload: &AnalysisPayload) -> RenderPlan {
    let datasets = payload.records("datasets");
    if datasets.is_empty() {
        return RenderPlan {
            notice: Some("Nenhum dado encontrado para a análise de coorte.".to_string()),
            ..Default::default()
        };
    }

    let mut spec = ChartSpec::new(
        ChartType::Line,
        "Retenção de Clientes por Coorte",
        payload.texts("labels"),
    )
    .stacked()
    .with_value_labels(false);
    for (i, cohort) in datasets.iter().enumerate() {
        let values = match cohort.get("data") {
            Some(Value::Array(points)) => points.iter().map(value_as_f64).collect(),
            _ => Vec::new(),
        };
        spec = spec.dataset(
            Dataset::new(text_or(cohort, "label", "N/A"), values)
                .with_color(COHORT_COLORS[i % COHORT_COLORS.len()]),
        );
    }

    RenderPlan {
        widgets: vec![WidgetPlan::Chart(ChartPlan {
            id: "cohortChart".to_string(),
            default_rect: Some(Rect::new(0, 0, 12, 8)),
            spec,
            type_options: vec![ChartType::Line, ChartType::BarVertical],
            drill: None,
        })],
        ..Default::default()
    }
}

/// One chart per city, two per grid row; a point opens that day's events
pub(super) fn daily_evolution_plan(payload: &AnalysisPayload) -> RenderPlan {
    let Some(by_city) = payload.keyed().filter(|cities| !cities.is_empty()) else {
        return RenderPlan {
            notice: Some("Nenhum dado encontrado.".to_string()),
            ..Default::default()
        };
    };

    let mut cities: Vec<(&String, &Record)> = by_city
        .iter()
        .filter_map(|(city, group)| Some((city, group.as_object()?)))
        .collect();
    cities.sort_by_key(|(city, _)| *city);

    let widgets = cities
        .into_iter()
        .enumerate()
        .map(|(i, (city, group))| {
            let mut days: Vec<&Record> = match group.get("daily_data") {
                Some(Value::Array(items)) => items.iter().filter_map(Value::as_object).collect(),
                _ => Vec::new(),
            };
            // ISO dates order lexically
            days.sort_by_key(|d| text_or(d, "date", ""));
            let dates: Vec<String> = days.iter().map(|d| text_or(d, "date", "")).collect();
            let totals = group.get("totals").and_then(Value::as_object);

            let spec = ChartSpec::new(
                ChartType::Line,
                format!(
                    "{} (Ativações: {} / Churn: {})",
                    city,
                    format_number_int(total(totals, "total_ativacoes")),
                    format_number_int(total(totals, "total_churn"))
                ),
                dates.iter().map(|d| format_date(d)).collect(),
            )
            .dataset(
                Dataset::new("Ativações", days.iter().map(|d| num(d, "ativacoes")).collect())
                    .with_color(GREEN),
            )
            .dataset(
                Dataset::new("Churn", days.iter().map(|d| num(d, "churn")).collect())
                    .with_color(RED),
            )
            .with_value_labels(false);

            let slot = i as u32;
            let id: String = city.chars().filter(char::is_ascii_alphanumeric).collect();
            WidgetPlan::Chart(ChartPlan {
                id: format!("daily-chart-{}", id),
                default_rect: Some(Rect::new((slot % 2) * 6, (slot / 2) * 7, 6, 7)),
                spec,
                type_options: vec![ChartType::Line, ChartType::BarVertical],
                drill: Some(DrillRule::DailyEvents {
                    city: city.clone(),
                    dates,
                }),
            })
        })
        .collect();

    RenderPlan {
        widgets,
        ..Default::default()
    }
}

pub(super) fn daily_events_drill(city: &str, day: &str) -> DrillDown {
    DrillDown {
        target: AnalysisId::DailyEvolutionDetails,
        title: format!("Detalhes: {} - {}", city, format_date(day)),
        filters: Filters::new()
            .with_text(FilterField::StartDate, day)
            .with_text(FilterField::EndDate, day)
            .with_text(FilterField::City, city),
    }
}

pub(super) fn late_interest_plan(payload: &AnalysisPayload) -> RenderPlan {
    let totals = payload.object("totals");
    let cards = vec![
        SummaryCard::money(
            "Total de Juros/Multas Recebidos",
            total(totals, "total_interest_amount"),
            Tone::Success,
        ),
        SummaryCard::count(
            "Total de Faturas Pagas com Atraso",
            total(totals, "total_late_payments_count"),
            Tone::Warning,
        ),
    ];

    let rows = payload.rows();
    if rows.is_empty() {
        return RenderPlan {
            cards,
            notice: Some(
                "Nenhum pagamento com atraso encontrado para os filtros selecionados."
                    .to_string(),
            ),
            ..Default::default()
        };
    }
    RenderPlan {
        cards,
        table: Some(
            TableModel::from_records(LATE_INTEREST_COLUMNS, rows)
                .titled("Detalhamento por Faixa de Atraso"),
        ),
        ..Default::default()
    }
}

fn day_label(day: &Record) -> String {
    let flag = |key: &str| day.get(key).and_then(Value::as_bool).unwrap_or(false);
    let number = text_or(day, "day", "-");
    if flag("is_today") {
        format!("{} (hoje)", number)
    } else if flag("is_holiday") {
        format!("{} (feriado)", number)
    } else {
        number
    }
}

/// Same month this year and last, day by day, for net receipts and write-offs
pub(super) fn daily_comparison_plan(payload: &AnalysisPayload) -> RenderPlan {
    let days = payload.records("liquido");
    if days.is_empty() {
        return RenderPlan {
            notice: Some("Nenhum dado de recebimento encontrado para o mês.".to_string()),
            ..Default::default()
        };
    }

    let info = payload.object("info");
    let label = |key: &str| {
        info.and_then(|i| i.get(key))
            .map(value_as_text)
            .unwrap_or_default()
    };
    let (previous, current) = (label("prev_label"), label("curr_label"));

    let comparison = |title: &str, prefix: &str| {
        let keys = ["prev", "curr", "diff"].map(|suffix| format!("{}_{}", prefix, suffix));
        let mut sums = [0.0; 3];
        let mut rows: Vec<Vec<Cell>> = days
            .iter()
            .map(|day| {
                let mut cells = vec![Cell::plain(day_label(day))];
                for (sum, key) in sums.iter_mut().zip(&keys) {
                    let value = num(day, key);
                    *sum += value;
                    cells.push(Cell::plain(format_money(value)));
                }
                cells
            })
            .collect();
        let mut total_row = vec![Cell::plain("Total")];
        total_row.extend(sums.iter().map(|sum| Cell::plain(format_money(*sum))));
        rows.push(total_row);

        TableModel {
            title: Some(title.to_string()),
            headers: vec![
                "Dia".to_string(),
                format!("Anterior ({})", previous),
                format!("Atual ({})", current),
                "Diferença".to_string(),
            ],
            rows,
        }
    };

    RenderPlan {
        tables: vec![
            comparison("Recebimento Líquido Diário Mês", "liq"),
            comparison("Recebimento Baixa Diária Mês", "bai"),
        ],
        ..Default::default()
    }
}


#[cfg(test)]
mod tests {
    use super::super::{plan, resolve_drill};
    use super::*;
    use crate::shared::analysis::chart::ChartClick;
    use serde_json::json;

    fn payload(value: Value) -> AnalysisPayload {
        serde_json::from_value(value).unwrap()
    }

    fn chart(widget: &WidgetPlan) -> &ChartPlan {
        match widget {
            WidgetPlan::Chart(chart) => chart,
            other => panic!("expected a chart, got {:?}", other),
        }
    }

    #[test]
    fn test_activation_cells_open_seller_activations() {
        let payload = payload(json!({
            "data": [{"Vendedor_ID": 4, "Vendedor_Nome": "Rita", "Total_Ativacoes": 10,
                      "Permanecem_Ativos": 7, "Cancelados": 3, "Negativados": 0,
                      "Total_Churn": 3}],
            "totals": {"total_ativacoes": 10, "total_permanecem_ativos": 7}
        }));
        let filters = Filters::new()
            .with_text(FilterField::City, "X")
            .with_text(FilterField::StartDate, "2024-03-01")
            .with_text(FilterField::EndDate, "2024-03-31");

        let plan = plan(AnalysisId::ActivationsBySeller, &payload, &filters);
        assert_eq!(plan.cards[1].value, "7");
        assert_eq!(plan.cards[1].tone, Tone::Success);

        let row = &plan.table.unwrap().rows[0];
        let drill = row[2].drill.as_ref().unwrap();
        assert_eq!(drill.target, AnalysisId::SellerActivations);
        assert_eq!(drill.title, "Clientes que Permanecem Ativos de Rita (X / 2024/03)");
        assert_eq!(drill.filters.text(FilterField::ClientType), "ativo_permanece");
        assert_eq!(drill.filters.text(FilterField::SellerId), "4");
        assert_eq!(drill.filters.text(FilterField::City), "X");
        assert_eq!(drill.filters.text(FilterField::Month), "03");
        assert_eq!(row[3].text, "70.0%");
        assert!(row[6].drill.is_none());
    }

    #[test]
    fn test_activations_empty_keeps_cards() {
        let payload = payload(json!({"data": [], "totals": {"total_ativacoes": 0}}));
        let plan = plan(AnalysisId::ActivationsBySeller, &payload, &Filters::new());

        assert_eq!(plan.cards.len(), 5);
        assert!(plan.table.is_none());
        assert!(plan.notice.is_some());
    }

    #[test]
    fn test_cohort_lines_are_stacked() {
        let payload = payload(json!({
            "labels": ["Mês 0", "Mês 1"],
            "datasets": [
                {"label": "2024-01", "data": [100, 90]},
                {"label": "2024-02", "data": [80, null]}
            ]
        }));

        let plan = plan(AnalysisId::CohortRetention, &payload, &Filters::new());
        let spec = &chart(&plan.widgets[0]).spec;

        assert_eq!(spec.labels, vec!["Mês 0", "Mês 1"]);
        assert_eq!(spec.datasets[1].label, "2024-02");
        assert_eq!(spec.datasets[1].values, vec![80.0, 0.0]);
        assert_eq!(spec.datasets[1].color.as_deref(), Some("#82ca9d"));
        assert!(spec.options.stacked);
    }

    #[test]
    fn test_daily_evolution_point_opens_that_day() {
        let payload = payload(json!({
            "data": {
                "Vila Nova": {
                    "daily_data": [
                        {"date": "2024-05-02", "ativacoes": 1, "churn": 0},
                        {"date": "2024-05-01", "ativacoes": 3, "churn": 2}
                    ],
                    "totals": {"total_ativacoes": 4, "total_churn": 2}
                },
                "Centro": {"daily_data": [], "totals": {}}
            }
        }));

        let plan = plan(AnalysisId::DailyEvolutionByCity, &payload, &Filters::new());
        assert_eq!(plan.widgets.len(), 2);
        let vila = chart(&plan.widgets[1]);
        assert_eq!(vila.id, "daily-chart-VilaNova");
        assert_eq!(vila.default_rect, Some(Rect::new(6, 0, 6, 7)));
        assert_eq!(vila.spec.title, "Vila Nova (Ativações: 4 / Churn: 2)");
        assert_eq!(vila.spec.labels, vec!["01/05/2024", "02/05/2024"]);
        assert_eq!(vila.spec.datasets[0].values, vec![3.0, 1.0]);

        let click = ChartClick {
            label: "02/05/2024".to_string(),
            dataset_label: "Churn".to_string(),
            index: 1,
        };
        let drill = resolve_drill(vila.drill.as_ref().unwrap(), &click, &Filters::new()).unwrap();
        assert_eq!(drill.target, AnalysisId::DailyEvolutionDetails);
        assert_eq!(drill.title, "Detalhes: Vila Nova - 02/05/2024");
        assert_eq!(drill.filters.text(FilterField::StartDate), "2024-05-02");
        assert_eq!(drill.filters.text(FilterField::EndDate), "2024-05-02");
        assert_eq!(drill.filters.text(FilterField::City), "Vila Nova");

        let past_end = ChartClick { index: 5, ..click };
        assert_eq!(resolve_drill(vila.drill.as_ref().unwrap(), &past_end, &Filters::new()), None);
    }

    #[test]
    fn test_late_interest_totals_are_money() {
        let payload = payload(json!({
            "data": [{"Delay_Bucket": "1-5 dias", "Count": 12, "Total_Interest": 30.5}],
            "totals": {"total_interest_amount": 30.5, "total_late_payments_count": 12}
        }));

        let plan = plan(AnalysisId::LateInterest, &payload, &Filters::new());

        assert_eq!(plan.cards[0].value, "R$ 30,50");
        assert_eq!(plan.cards[1].value, "12");
        let table = plan.table.unwrap();
        assert_eq!(table.rows[0][2].text, "R$ 30,50");
    }

    #[test]
    fn test_daily_comparison_builds_both_tables_with_totals() {
        let payload = payload(json!({
            "info": {"curr_label": "05/2024", "prev_label": "05/2023"},
            "liquido": [
                {"day": 1, "is_today": false, "liq_prev": 10.0, "liq_curr": 15.0, "liq_diff": 5.0,
                 "bai_prev": 1.0, "bai_curr": 0.0, "bai_diff": -1.0},
                {"day": 2, "is_today": true, "liq_prev": 5.0, "liq_curr": 0.0, "liq_diff": -5.0,
                 "bai_prev": 0.0, "bai_curr": 2.0, "bai_diff": 2.0}
            ]
        }));

        let plan = plan(AnalysisId::DailyComparison, &payload, &Filters::new());

        assert_eq!(plan.tables.len(), 2);
        let net = &plan.tables[0];
        assert_eq!(net.headers[1], "Anterior (05/2023)");
        assert_eq!(net.rows.len(), 3);
        assert_eq!(net.rows[1][0].text, "2 (hoje)");
        let total: Vec<&str> = net.rows[2].iter().map(|c| c.text.as_str()).collect();
        assert_eq!(total, vec!["Total", "R$ 15,00", "R$ 15,00", "R$ 0,00"]);
        assert_eq!(plan.tables[1].rows[2][3].text, "R$ 1,00");
    }
}
