//! Collection summaries, one chart set per source table, and the raw-row browser behind them.

use super::{num, pivot, text_or, ChartPlan, RenderPlan, WidgetPlan, NO_RESULTS};
use crate::shared::analysis::chart::{ChartSpec, ChartType, Dataset, FormatMode};
use crate::shared::analysis::presentation::{Cell, TableModel};
use contracts::dashboards::d500_client_analytics::{
    value_as_text, AnalysisId, AnalysisPayload, DrillDown, FilterField, Filters, Rect, Record,
};

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// Paginated raw rows of the table a summary is computed from.
///
/// Summary keys are the source table names.
pub(super) fn browse(analysis: AnalysisId) -> DrillDown {
    DrillDown {
        target: AnalysisId::CollectionRows,
        title: format!("Tabela Completa: {}", analysis.title()),
        filters: Filters::new().with_text(FilterField::TableName, analysis.key()),
    }
}

/// Columns come from the first row; the table has no fixed schema
pub(super) fn rows_plan(payload: &AnalysisPayload, filters: &Filters) -> RenderPlan {
    let rows = payload.rows();
    let Some(first) = rows.first() else {
        return RenderPlan {
            notice: Some(NO_RESULTS.to_string()),
            ..Default::default()
        };
    };
    let keys: Vec<&String> = first.keys().collect();
    let table = TableModel {
        title: Some(filters.text(FilterField::TableName).to_string()),
        headers: keys.iter().map(|k| k.to_string()).collect(),
        rows: rows
            .iter()
            .map(|row| {
                keys.iter()
                    .map(|k| Cell::plain(row.get(*k).map(value_as_text).unwrap_or_default()))
                    .collect()
            })
            .collect(),
    };
    RenderPlan {
        table: Some(table),
        ..Default::default()
    }
}

/// One single-series chart slot
struct Slot {
    id: &'static str,
    key: &'static str,
    chart_type: ChartType,
    title: String,
    label_key: &'static str,
    value_key: &'static str,
    format: FormatMode,
    rect: Rect,
}

impl Slot {
    fn new(
        id: &'static str,
        key: &'static str,
        chart_type: ChartType,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id,
            key,
            chart_type,
            title: title.into(),
            label_key: "Status",
            value_key: "Count",
            format: FormatMode::Number,
            rect: Rect::new(0, 0, 6, 5),
        }
    }

    fn at(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    fn by(mut self, label_key: &'static str, value_key: &'static str) -> Self {
        self.label_key = label_key;
        self.value_key = value_key;
        self
    }

    fn format(mut self, format: FormatMode) -> Self {
        self.format = format;
        self
    }
}

fn type_options(chart_type: ChartType) -> Vec<ChartType> {
    let others: &[ChartType] = match chart_type {
        ChartType::Line => &[ChartType::BarVertical, ChartType::BarHorizontal],
        ChartType::BarHorizontal => &[ChartType::Doughnut, ChartType::BarVertical],
        _ => &[ChartType::Doughnut, ChartType::BarVertical, ChartType::BarHorizontal],
    };
    let mut options = vec![chart_type];
    options.extend(others.iter().copied().filter(|t| *t != chart_type));
    options
}

fn month_label(month: &str) -> String {
    month
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|m| m.checked_sub(1))
        .and_then(|i| MONTH_NAMES.get(i))
        .map_or_else(|| month.to_string(), |name| name.to_string())
}

fn single_series(payload: &AnalysisPayload, slot: Slot) -> Option<WidgetPlan> {
    let mut records = payload.records(slot.key);
    if records.is_empty() {
        return None;
    }
    let by_month = slot.label_key == "Month";
    if by_month {
        let month = |r: &Record| text_or(r, "Month", "").trim().parse::<u32>().unwrap_or(u32::MAX);
        records.sort_by_key(|r| month(*r));
    }
    let labels = records
        .iter()
        .map(|r| {
            let label = text_or(r, slot.label_key, "N/A");
            if by_month {
                month_label(&label)
            } else {
                label
            }
        })
        .collect();
    let values = records.iter().map(|r| num(r, slot.value_key)).collect();
    let spec = ChartSpec::new(slot.chart_type, slot.title, labels)
        .dataset(Dataset::new("Total", values))
        .format(slot.format)
        .without_legend();

    Some(WidgetPlan::Chart(ChartPlan {
        id: slot.id.to_string(),
        default_rect: Some(slot.rect),
        spec,
        type_options: type_options(slot.chart_type),
        drill: None,
    }))
}

/// Status series stacked over a label axis
struct StackedSlot {
    id: &'static str,
    key: &'static str,
    title: &'static str,
    label_key: &'static str,
    value_key: &'static str,
    format: FormatMode,
    rect: Rect,
}

fn stacked_status(payload: &AnalysisPayload, slot: StackedSlot) -> Option<WidgetPlan> {
    let records = payload.records(slot.key);
    if records.is_empty() {
        return None;
    }
    let grid = pivot(&records, slot.label_key, "Status", slot.value_key, false, false);
    let mut spec = ChartSpec::new(ChartType::BarVertical, slot.title, grid.labels)
        .format(slot.format)
        .stacked();
    for (name, values) in grid.series {
        let color = status_color(&name);
        spec = spec.dataset(Dataset::new(name, values).with_color(color));
    }
    Some(WidgetPlan::Chart(ChartPlan {
        id: slot.id.to_string(),
        default_rect: Some(slot.rect),
        spec,
        type_options: vec![ChartType::BarVertical, ChartType::Line, ChartType::BarHorizontal],
        drill: None,
    }))
}

fn status_color(status: &str) -> &'static str {
    match status {
        "Recebido" | "Solucionado" => "#48bb78",
        "Aberto" | "A receber" | "Pendente" => "#f59e0b",
        "Em Andamento" => "#3b82f6",
        "Cancelado" => "#6b7280",
        _ => "#a0aec0",
    }
}

/// `(2024/03)`, `(2024)` or `(Todos)` for the requested period
fn period_caption(filters: &Filters) -> String {
    let year = match filters.text(FilterField::Year) {
        "" => "Todos",
        year => year,
    };
    match filters.text(FilterField::Month) {
        "" => format!("({})", year),
        month => format!("({}/{})", year, month),
    }
}

pub(super) fn summary_plan(
    analysis: AnalysisId,
    payload: &AnalysisPayload,
    filters: &Filters,
) -> RenderPlan {
    use ChartType::{BarHorizontal, BarVertical, Doughnut, Line};

    let period = period_caption(filters);
    let mut widgets: Vec<WidgetPlan> = Vec::new();
    let mut add = |widget: Option<WidgetPlan>| widgets.extend(widget);

    match analysis {
        AnalysisId::ClientsSummary => {
            add(single_series(
                payload,
                Slot::new("mainChart1", "by_city", Doughnut, "Top 20 Cidades por Cliente")
                    .at(Rect::new(0, 0, 6, 5))
                    .by("Cidade", "Count"),
            ));
            add(single_series(
                payload,
                Slot::new("mainChart2", "by_neighborhood", BarHorizontal, "Top 20 Bairros por Cliente")
                    .at(Rect::new(6, 0, 6, 5))
                    .by("Bairro", "Count"),
            ));
        }
        AnalysisId::LoginsSummary => {
            add(single_series(
                payload,
                Slot::new("mainChart1", "by_transmitter", BarHorizontal, "Logins Únicos por Transmissor")
                    .at(Rect::new(0, 0, 6, 5))
                    .by("Transmissor", "Count"),
            ));
            add(single_series(
                payload,
                Slot::new("mainChart2", "by_plan", BarHorizontal, "Top 20 Planos por Nº de Logins")
                    .at(Rect::new(6, 0, 6, 5))
                    .by("Contrato", "Count"),
            ));
        }
        AnalysisId::AttendancesSummary => {
            add(single_series(
                payload,
                Slot::new("mainChart1", "status_summary", Doughnut, "Atendimentos por Status")
                    .at(Rect::new(0, 0, 6, 5)),
            ));
            add(single_series(
                payload,
                Slot::new("mainChart2", "subject_ranking", BarHorizontal, "Top 10 Assuntos Mais Comuns")
                    .at(Rect::new(6, 0, 6, 5))
                    .by("Assunto", "Count"),
            ));
            add(single_series(
                payload,
                Slot::new("mainChart3", "yoy_summary", Line, "Evolução Anual de Atendimentos")
                    .at(Rect::new(0, 5, 6, 5))
                    .by("Year", "Total_Count"),
            ));
            add(single_series(
                payload,
                Slot::new("mainChart4", "mom_summary", Line, format!("Evolução Mensal {}", period))
                    .at(Rect::new(6, 5, 6, 5))
                    .by("Month", "Total_Count"),
            ));
            add(single_series(
                payload,
                Slot::new(
                    "mainChart5",
                    "avg_resolution_time_by_subject",
                    BarVertical,
                    "Tempo Médio de Resolução por Assunto (dias)",
                )
                .at(Rect::new(0, 10, 12, 6))
                .by("Assunto", "Average_Resolution_Days")
                .format(FormatMode::Days),
            ));
        }
        AnalysisId::ServiceOrdersSummary => {
            add(stacked_status(
                payload,
                StackedSlot {
                    id: "mainChart6",
                    key: "status_by_subject",
                    title: "Status de OS por Assunto",
                    label_key: "Assunto",
                    value_key: "Count",
                    format: FormatMode::Number,
                    rect: Rect::new(0, 0, 12, 6),
                },
            ));
            add(single_series(
                payload,
                Slot::new("mainChart4", "mom_summary", Line, format!("Evolução Mensal de OS {}", period))
                    .at(Rect::new(0, 6, 6, 5))
                    .by("Month", "Total_Count"),
            ));
            add(single_series(
                payload,
                Slot::new(
                    "mainChart7",
                    "avg_service_time_by_city",
                    BarHorizontal,
                    "Tempo Médio de Serviço por Cidade (dias)",
                )
                .at(Rect::new(6, 6, 6, 5))
                .by("Cidade", "Average_Service_Days")
                .format(FormatMode::Days),
            ));
        }
        AnalysisId::ReceivablesSummary => {
            add(single_series(
                payload,
                Slot::new("mainChart1", "status_summary", Doughnut, format!("Contas por Status {}", period))
                    .at(Rect::new(0, 0, 6, 5)),
            ));
            add(single_series(
                payload,
                Slot::new(
                    "mainChart2",
                    "status_summary",
                    BarVertical,
                    format!("Valor Total por Status {}", period),
                )
                .at(Rect::new(6, 0, 6, 5))
                .by("Status", "Total_Value")
                .format(FormatMode::Currency),
            ));
            add(single_series(
                payload,
                Slot::new("mainChart3", "yoy_summary", Line, "Evolução Anual de Contas")
                    .at(Rect::new(0, 5, 6, 5))
                    .by("Year", "Total_Count"),
            ));
            add(single_series(
                payload,
                Slot::new("mainChart4", "mom_summary", Line, format!("Evolução Mensal {}", period))
                    .at(Rect::new(6, 5, 6, 5))
                    .by("Month", "Total_Count"),
            ));
            add(stacked_status(
                payload,
                StackedSlot {
                    id: "mainChart5",
                    key: "last_3_months_stacked",
                    title: "Contas a Receber (Últimos 3 Meses - Todos)",
                    label_key: "Month",
                    value_key: "Total_Value",
                    format: FormatMode::Currency,
                    rect: Rect::new(0, 10, 6, 6),
                },
            ));
            add(stacked_status(
                payload,
                StackedSlot {
                    id: "mainChart6",
                    key: "last_3_months_active_clients",
                    title: "Contas a Receber (Últimos 3 Meses - Ativos)",
                    label_key: "Month",
                    value_key: "Total_Value",
                    format: FormatMode::Currency,
                    rect: Rect::new(6, 10, 6, 6),
                },
            ));
        }
        _ => {}
    }

    let browse = Some(browse(analysis));
    if widgets.is_empty() {
        return RenderPlan {
            notice: Some(format!("Nenhum dado encontrado para {}.", analysis.title())),
            browse,
            ..Default::default()
        };
    }
    RenderPlan {
        widgets,
        browse,
        ..Default::default()
    }
}
