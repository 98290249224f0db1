//! Per-analysis render plans: how a payload maps onto cards, chart widgets and tables.

mod activity;
mod behavior;
mod clients;
mod collections;

pub use clients::detail_tabs;

use super::chart::{ChartClick, ChartSpec, ChartType, Dataset, FormatMode};
use super::presentation::{format_cell, Cell, Column, SummaryCard, TableModel, Tone};
use crate::shared::number_format::format_number_int;
use chrono::{Datelike, NaiveDate};
use contracts::dashboards::d500_client_analytics::{
    value_as_f64, value_as_text, AnalysisId, AnalysisPayload, DrillDown, FilterField, Filters,
    Rect, Record,
};

/// How a chart click turns into a detail view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrillRule {
    /// label = city, dataset = client type
    CityClients,
    /// label = neighborhood, dataset = client type, city from the request
    NeighborhoodClients,
    /// label = equipment that came back on cancellation
    EquipmentClients,
    /// label = equipment still on loan to active clients
    ActiveEquipmentClients,
    /// point index = day of `dates` (`YYYY-MM-DD`) in `city`
    DailyEvents { city: String, dates: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPlan {
    pub id: String,
    pub default_rect: Option<Rect>,
    pub spec: ChartSpec,
    pub type_options: Vec<ChartType>,
    pub drill: Option<DrillRule>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetPlan {
    Chart(ChartPlan),
    Table {
        id: String,
        default_rect: Option<Rect>,
        table: TableModel,
    },
    Message {
        id: String,
        default_rect: Option<Rect>,
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderPlan {
    pub cards: Vec<SummaryCard>,
    pub table: Option<TableModel>,
    pub tables: Vec<TableModel>,
    pub widgets: Vec<WidgetPlan>,
    /// Neutral "no results" text; set when there is nothing to chart or list
    pub notice: Option<String>,
    /// Paginated raw rows behind a summary
    pub browse: Option<DrillDown>,
}

/// Message shown instead of fetching when a required filter is empty
pub fn required_notice(field: FilterField) -> &'static str {
    match field {
        FilterField::City => "Por favor, selecione uma cidade.",
        FilterField::StartDate | FilterField::EndDate => "Por favor, selecione as datas.",
        _ => "Por favor, preencha os filtros obrigatórios.",
    }
}

const NO_RESULTS: &str = "Nenhum resultado encontrado para os filtros selecionados.";

const CANCELLATION_COLUMNS: &[Column] = &[
    Column::text("Cliente", "Cliente"),
    Column::text("Contrato_ID", "ID Contrato"),
    Column::integer("permanencia_meses", "Permanência (Meses)"),
    Column::text("Teve_Contato_Relevante", "Teve Contato Relevante?"),
];

const LATE_PAYMENT_COLUMNS: &[Column] = &[
    Column::text("Cliente", "Cliente"),
    Column::text("Contrato_ID", "ID Contrato"),
    Column::integer("Atrasos_Pagos", "Atrasos Pagos"),
    Column::integer("Faturas_Nao_Pagas", "Faturas Vencidas (Não Pagas)"),
];

const FINANCIAL_HEALTH_COLUMNS: &[Column] = &[
    Column::text("Razao_Social", "Cliente"),
    Column::text("Contrato_ID", "ID Contrato"),
    Column::text("Status_contrato", "Status Contrato"),
    Column::text("Status_acesso", "Status Acesso"),
    Column::date("Primeira_Inadimplencia_Vencimento", "1ª Inadimplência"),
    Column::text("Possui_Reclamacoes", "Tem Reclamações?"),
    Column::date("Ultima_Conexao", "Última Conexão"),
];

const CHURNED_CLIENT_COLUMNS: &[Column] = &[
    Column::text("Cliente", "Cliente"),
    Column::text("Contrato_ID", "Contrato ID"),
    Column::date("Data_ativa_o", "Data Ativação"),
    Column::date("end_date", "Data Final"),
    Column::integer("permanencia_dias", "Permanência (Dias)"),
    Column::integer("permanencia_meses", "Permanência (Meses)"),
];

const ACTIVE_CLIENT_COLUMNS: &[Column] = &[
    Column::text("Cliente", "Cliente"),
    Column::text("Contrato_ID", "Contrato ID"),
    Column::date("Data_ativa_o", "Data Ativação"),
    Column::text("Cidade", "Cidade"),
    Column::text("Status_contrato", "Status"),
];

const CITY_TABLE_COLUMNS: &[Column] = &[
    Column::text("Cidade", "Cidade"),
    Column::integer("Cancelados", "Cancelados"),
    Column::integer("Negativados", "Negativados"),
    Column::integer("Total", "Total"),
];

const CANCELADOS: &str = "Cancelados";
const NEGATIVADOS: &str = "Negativados";
const RED: &str = "#ef4444";
const ORANGE: &str = "#f97316";

pub fn plan(analysis: AnalysisId, payload: &AnalysisPayload, filters: &Filters) -> RenderPlan {
    match analysis {
        AnalysisId::Cancellations | AnalysisId::Negativacao => {
            table_plan(analysis, payload, CANCELLATION_COLUMNS, clients::churn_link)
        }
        AnalysisId::LatePayments => {
            table_plan(analysis, payload, LATE_PAYMENT_COLUMNS, clients::invoice_link)
        }
        AnalysisId::FinancialHealth | AnalysisId::FinancialHealthAutoBlock => table_plan(
            analysis,
            payload,
            FINANCIAL_HEALTH_COLUMNS,
            clients::health_link,
        ),
        AnalysisId::CityClients
        | AnalysisId::NeighborhoodClients
        | AnalysisId::EquipmentClients
        | AnalysisId::SellerClients => {
            table_plan(analysis, payload, CHURNED_CLIENT_COLUMNS, clients::history_link)
        }
        AnalysisId::ActiveEquipmentClients => {
            table_plan(analysis, payload, ACTIVE_CLIENT_COLUMNS, clients::history_link)
        }
        AnalysisId::SellerActivations => table_plan(
            analysis,
            payload,
            activity::SELLER_ACTIVATION_COLUMNS,
            clients::history_link,
        ),
        AnalysisId::DailyEvolutionDetails => table_plan(
            analysis,
            payload,
            activity::DAILY_EVENT_COLUMNS,
            clients::history_link,
        ),
        AnalysisId::InvoiceDetails => {
            table_plan(analysis, payload, clients::INVOICE_COLUMNS, no_link)
        }
        AnalysisId::ClientFinancial => {
            table_plan(analysis, payload, clients::FINANCIAL_COLUMNS, no_link)
        }
        AnalysisId::ClientServiceOrders => {
            table_plan(analysis, payload, clients::SERVICE_ORDER_COLUMNS, no_link)
        }
        AnalysisId::ClientAttendances => {
            table_plan(analysis, payload, clients::ATTENDANCE_COLUMNS, no_link)
        }
        AnalysisId::ClientLogins => table_plan(analysis, payload, clients::LOGIN_COLUMNS, no_link),
        AnalysisId::ClientComodato => {
            table_plan(analysis, payload, clients::COMODATO_COLUMNS, no_link)
        }
        AnalysisId::CancellationContext => clients::history_plan(payload),
        AnalysisId::CollectionRows => collections::rows_plan(payload, filters),
        AnalysisId::CancellationsByCity => by_city_plan(payload),
        AnalysisId::CancellationsByNeighborhood => by_neighborhood_plan(payload, filters),
        AnalysisId::CancellationsByEquipment => by_equipment_plan(payload),
        AnalysisId::EquipmentByOlt => equipment_by_olt_plan(payload, filters),
        AnalysisId::ActiveClientsEvolution => evolution_plan(payload, filters),
        AnalysisId::BillingByCity => billing_plan(payload),
        AnalysisId::Sellers => sellers_plan(payload, filters),
        AnalysisId::ActivationsBySeller => activity::activations_plan(payload, filters),
        AnalysisId::CohortRetention => activity::cohort_plan(payload),
        AnalysisId::DailyEvolutionByCity => activity::daily_evolution_plan(payload),
        AnalysisId::LateInterest => activity::late_interest_plan(payload),
        AnalysisId::DailyComparison => activity::daily_comparison_plan(payload),
        AnalysisId::ComplaintPatterns => behavior::complaints_plan(payload, filters),
        AnalysisId::PredictiveChurn => behavior::predictive_plan(payload),
        AnalysisId::ContractsSummary => RenderPlan {
            browse: Some(collections::browse(analysis)),
            ..contracts_plan(payload)
        },
        AnalysisId::ClientsSummary
        | AnalysisId::ReceivablesSummary
        | AnalysisId::AttendancesSummary
        | AnalysisId::ServiceOrdersSummary
        | AnalysisId::LoginsSummary => collections::summary_plan(analysis, payload, filters),
    }
}

/// Detail view for a chart click, built only from the request's filter snapshot
pub fn resolve_drill(rule: &DrillRule, click: &ChartClick, snapshot: &Filters) -> Option<DrillDown> {
    let client_type = client_type(&click.dataset_label);
    match rule {
        DrillRule::CityClients => Some(DrillDown {
            target: AnalysisId::CityClients,
            title: format!("Clientes {} em {}", type_caption(client_type), click.label),
            filters: carry(
                snapshot,
                &[FilterField::StartDate, FilterField::EndDate, FilterField::Relevance],
            )
            .with_text(FilterField::City, click.label.clone())
            .with_text(FilterField::ClientType, client_type),
        }),
        DrillRule::NeighborhoodClients => {
            let city = snapshot.text(FilterField::City);
            if city.is_empty() {
                return None;
            }
            Some(DrillDown {
                target: AnalysisId::NeighborhoodClients,
                title: format!(
                    "Clientes {} em {} - {}",
                    type_caption(client_type),
                    click.label,
                    city
                ),
                filters: carry(
                    snapshot,
                    &[
                        FilterField::City,
                        FilterField::StartDate,
                        FilterField::EndDate,
                        FilterField::Relevance,
                    ],
                )
                .with_text(FilterField::Neighborhood, click.label.clone())
                .with_text(FilterField::ClientType, client_type),
            })
        }
        DrillRule::EquipmentClients => Some(DrillDown {
            target: AnalysisId::EquipmentClients,
            title: format!("Clientes que devolveram {}", click.label),
            filters: carry(
                snapshot,
                &[
                    FilterField::StartDate,
                    FilterField::EndDate,
                    FilterField::City,
                    FilterField::Relevance,
                ],
            )
            .with_text(FilterField::Equipment, click.label.clone()),
        }),
        DrillRule::ActiveEquipmentClients => Some(DrillDown {
            target: AnalysisId::ActiveEquipmentClients,
            title: format!("Clientes ativos com {}", click.label),
            filters: carry(snapshot, &[FilterField::City])
                .with_text(FilterField::Equipment, click.label.clone()),
        }),
        DrillRule::DailyEvents { city, dates } => {
            let day = dates.get(click.index)?;
            Some(activity::daily_events_drill(city, day))
        }
    }
}

fn client_type(dataset_label: &str) -> &'static str {
    if dataset_label == CANCELADOS {
        "cancelado"
    } else {
        "negativado"
    }
}

fn type_caption(client_type: &str) -> &'static str {
    if client_type == "cancelado" {
        "Cancelados"
    } else {
        "Negativados"
    }
}

fn carry(snapshot: &Filters, fields: &[FilterField]) -> Filters {
    fields.iter().fold(Filters::new(), |acc, field| match snapshot.get(*field) {
        Some(value) if !value.is_empty() => acc.with(*field, value.clone()),
        _ => acc,
    })
}

fn text_or(record: &Record, key: &str, fallback: &str) -> String {
    let text = record.get(key).map(value_as_text).unwrap_or_default();
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text
    }
}

fn num(record: &Record, key: &str) -> f64 {
    record.get(key).map(value_as_f64).unwrap_or(0.0)
}

fn labels(rows: &[Record], key: &str, fallback: &str) -> Vec<String> {
    rows.iter().map(|r| text_or(r, key, fallback)).collect()
}

fn column(rows: &[Record], key: &str) -> Vec<f64> {
    rows.iter().map(|r| num(r, key)).collect()
}

fn in_city(filters: &Filters) -> String {
    match filters.text(FilterField::City) {
        "" => String::new(),
        city => format!(" em {}", city),
    }
}

fn churn_totals(payload: &AnalysisPayload, grand_total_title: &str) -> Vec<SummaryCard> {
    vec![
        SummaryCard::count("Total Cancelados", payload.number("total_cancelados"), Tone::Danger),
        SummaryCard::count(
            "Total Negativados",
            payload.number("total_negativados"),
            Tone::Warning,
        ),
        SummaryCard::count(grand_total_title, payload.number("grand_total"), Tone::Neutral),
    ]
}

fn churn_datasets(rows: &[Record]) -> [Dataset; 2] {
    [
        Dataset::new(CANCELADOS, column(rows, CANCELADOS)).with_color(RED),
        Dataset::new(NEGATIVADOS, column(rows, NEGATIVADOS)).with_color(ORANGE),
    ]
}

/// Detail view opened by one table cell
type CellLink = fn(&Column, &Record) -> Option<DrillDown>;

fn no_link(_: &Column, _: &Record) -> Option<DrillDown> {
    None
}

fn linked_table(columns: &[Column], rows: &[Record], link: CellLink) -> TableModel {
    let mut table = TableModel::from_records(columns, rows);
    for (cells, record) in table.rows.iter_mut().zip(rows) {
        for (cell, column) in cells.iter_mut().zip(columns) {
            cell.drill = link(column, record);
        }
    }
    table
}

fn table_plan(
    analysis: AnalysisId,
    payload: &AnalysisPayload,
    columns: &[Column],
    link: CellLink,
) -> RenderPlan {
    let rows = payload.rows();
    if rows.is_empty() {
        return RenderPlan {
            notice: Some(NO_RESULTS.to_string()),
            ..Default::default()
        };
    }
    RenderPlan {
        table: Some(linked_table(columns, rows, link).titled(analysis.title())),
        ..Default::default()
    }
}

fn by_city_plan(payload: &AnalysisPayload) -> RenderPlan {
    let rows = payload.rows();
    let mut cards = churn_totals(payload, "Soma Geral");
    cards.extend(
        rows.iter()
            .map(|r| SummaryCard::count(text_or(r, "Cidade", "N/A"), num(r, "Total"), Tone::Info)),
    );

    if rows.is_empty() {
        return RenderPlan {
            cards,
            notice: Some("Nenhum dado encontrado.".to_string()),
            ..Default::default()
        };
    }

    let [cancelados, negativados] = churn_datasets(rows);
    let spec = ChartSpec::new(
        ChartType::BarVertical,
        "Cancelamentos e Negativações por Cidade",
        labels(rows, "Cidade", "N/A"),
    )
    .dataset(cancelados)
    .dataset(negativados);

    RenderPlan {
        cards,
        widgets: vec![
            WidgetPlan::Chart(ChartPlan {
                id: "cityAnalysisChart".to_string(),
                default_rect: Some(Rect::new(0, 0, 12, 8)),
                spec,
                type_options: vec![ChartType::BarVertical, ChartType::BarHorizontal],
                drill: Some(DrillRule::CityClients),
            }),
            WidgetPlan::Table {
                id: "cityAnalysisTable".to_string(),
                default_rect: Some(Rect::new(0, 8, 12, 6)),
                table: TableModel::from_records(CITY_TABLE_COLUMNS, rows)
                    .titled("Detalhamento por Cidade"),
            },
        ],
        ..Default::default()
    }
}

fn by_neighborhood_plan(payload: &AnalysisPayload, filters: &Filters) -> RenderPlan {
    let city = filters.text(FilterField::City);
    if city.is_empty() {
        return RenderPlan {
            notice: Some(required_notice(FilterField::City).to_string()),
            ..Default::default()
        };
    }
    let rows = payload.rows();
    let cards = churn_totals(payload, "Soma Geral (Bairros)");

    if rows.is_empty() {
        return RenderPlan {
            cards,
            notice: Some(format!("Nenhum dado encontrado para {}.", city)),
            ..Default::default()
        };
    }

    let [cancelados, negativados] = churn_datasets(rows);
    let spec = ChartSpec::new(
        ChartType::BarHorizontal,
        format!("Cancelamentos/Negativações por Bairro em {}", city),
        labels(rows, "Bairro", "N/A"),
    )
    .dataset(cancelados)
    .dataset(negativados);

    RenderPlan {
        cards,
        widgets: vec![WidgetPlan::Chart(ChartPlan {
            id: "neighborhoodChart".to_string(),
            default_rect: Some(Rect::new(0, 0, 12, 10)),
            spec,
            type_options: vec![ChartType::BarHorizontal, ChartType::BarVertical],
            drill: Some(DrillRule::NeighborhoodClients),
        })],
        ..Default::default()
    }
}

fn by_equipment_plan(payload: &AnalysisPayload) -> RenderPlan {
    let rows = payload.rows();
    let cards = vec![SummaryCard::count(
        "Total de Equipamentos Devolvidos",
        payload.number("total_equipments"),
        Tone::Accent,
    )];

    if rows.is_empty() {
        return RenderPlan {
            cards,
            notice: Some("Nenhum cancelamento associado a equipamentos encontrado.".to_string()),
            ..Default::default()
        };
    }

    let spec = ChartSpec::new(
        ChartType::BarHorizontal,
        "Top Cancelamentos por Modelo de Equipamento",
        labels(rows, "Descricao_produto", "Não Identificado"),
    )
    .dataset(Dataset::new("Cancelamentos", column(rows, "Count")).with_color("#d946ef"));

    RenderPlan {
        cards,
        widgets: vec![WidgetPlan::Chart(ChartPlan {
            id: "equipmentChart".to_string(),
            default_rect: Some(Rect::new(0, 0, 12, 10)),
            spec,
            type_options: vec![
                ChartType::BarHorizontal,
                ChartType::BarVertical,
                ChartType::Doughnut,
            ],
            drill: Some(DrillRule::EquipmentClients),
        })],
        ..Default::default()
    }
}

fn equipment_by_olt_plan(payload: &AnalysisPayload, filters: &Filters) -> RenderPlan {
    let rows = payload.rows();
    if rows.is_empty() {
        return RenderPlan {
            notice: Some("Nenhum equipamento em comodato encontrado.".to_string()),
            ..Default::default()
        };
    }

    let scope = match filters.text(FilterField::City) {
        "" => "(Todas as Cidades)".to_string(),
        city => format!("em {}", city),
    };
    let spec = ChartSpec::new(
        ChartType::BarHorizontal,
        format!("Equipamentos em Comodato Ativo {}", scope),
        labels(rows, "Descricao_produto", "N/A"),
    )
    .dataset(Dataset::new("Contagem", column(rows, "Count")))
    .without_legend();

    RenderPlan {
        widgets: vec![WidgetPlan::Chart(ChartPlan {
            id: "equipmentOltChart".to_string(),
            default_rect: Some(Rect::new(0, 0, 12, 10)),
            spec,
            type_options: vec![ChartType::BarHorizontal, ChartType::BarVertical],
            drill: Some(DrillRule::ActiveEquipmentClients),
        })],
        ..Default::default()
    }
}

fn evolution_plan(payload: &AnalysisPayload, filters: &Filters) -> RenderPlan {
    let rows = payload.rows();
    if rows.is_empty() {
        return RenderPlan {
            notice: Some(
                "Nenhum dado de evolução de clientes encontrado para o período.".to_string(),
            ),
            ..Default::default()
        };
    }

    let spec = ChartSpec::new(
        ChartType::Line,
        format!("Evolução de Clientes Ativos{}", in_city(filters)),
        labels(rows, "Month", "N/A"),
    )
    .dataset(
        Dataset::new("Clientes Ativos", column(rows, "Active_Clients_Count")).with_color("#3B82F6"),
    )
    .with_value_labels(true)
    .without_legend();

    RenderPlan {
        widgets: vec![WidgetPlan::Chart(ChartPlan {
            id: "activeClientsChart".to_string(),
            default_rect: Some(Rect::new(0, 0, 12, 8)),
            spec,
            type_options: vec![ChartType::Line, ChartType::BarVertical],
            drill: None,
        })],
        ..Default::default()
    }
}

/// Label × series matrix of a long-format record list
struct Pivot {
    labels: Vec<String>,
    series: Vec<(String, Vec<f64>)>,
}

fn pivot(
    records: &[&Record],
    label_key: &str,
    series_key: &str,
    value_key: &str,
    numeric_labels: bool,
    sort_series: bool,
) -> Pivot {
    let mut labels: Vec<String> = Vec::new();
    let mut series_names: Vec<String> = Vec::new();
    for record in records {
        let label = text_or(record, label_key, "N/A");
        if !labels.contains(&label) {
            labels.push(label);
        }
        let series = text_or(record, series_key, "N/A");
        if !series_names.contains(&series) {
            series_names.push(series);
        }
    }
    if numeric_labels {
        labels.sort_by(|a, b| {
            let a = a.parse::<f64>().unwrap_or(f64::MAX);
            let b = b.parse::<f64>().unwrap_or(f64::MAX);
            a.total_cmp(&b)
        });
    } else {
        labels.sort();
    }
    if sort_series {
        series_names.sort();
    }

    let series = series_names
        .into_iter()
        .map(|name| {
            let values = labels
                .iter()
                .map(|label| {
                    records
                        .iter()
                        .filter(|r| {
                            text_or(r, label_key, "N/A") == *label
                                && text_or(r, series_key, "N/A") == name
                        })
                        .map(|r| num(r, value_key))
                        .sum()
                })
                .collect();
            (name, values)
        })
        .collect();

    Pivot { labels, series }
}

fn billing_status_color(status: &str) -> &'static str {
    match status {
        "Recebido" => "#48bb78",
        "A receber" => "#f59e0b",
        "Cancelado" => "#6b7280",
        _ => "#a0aec0",
    }
}

const DUE_DAY_COLORS: [&str; 5] = ["#3b82f6", "#10b981", "#f97316", "#8b5cf6", "#ec4899"];

fn billing_plan(payload: &AnalysisPayload) -> RenderPlan {
    struct BillingChart {
        id: &'static str,
        key: &'static str,
        title: &'static str,
        rect: Rect,
    }
    let charts = [
        BillingChart {
            id: "billingChart1",
            key: "faturamento_total",
            title: "Contas a Receber (Todos)",
            rect: Rect::new(0, 0, 6, 6),
        },
        BillingChart {
            id: "billingChart2",
            key: "faturamento_ativos",
            title: "Contas a Receber (Ativos)",
            rect: Rect::new(6, 0, 6, 6),
        },
        BillingChart {
            id: "billingChart3",
            key: "faturamento_por_dia_vencimento",
            title: "Comparativo por Dia de Vencimento",
            rect: Rect::new(0, 6, 12, 7),
        },
    ];

    let mut widgets = Vec::new();
    let mut any_data = false;
    for chart in charts {
        let records = payload.records(chart.key);
        if records.is_empty() {
            widgets.push(WidgetPlan::Message {
                id: format!("{}Empty", chart.id),
                default_rect: Some(chart.rect),
                text: format!("Sem dados para {}", chart.title),
            });
            continue;
        }
        any_data = true;

        let by_due_day = chart.key == "faturamento_por_dia_vencimento";
        let grid = if by_due_day {
            pivot(&records, "Due_Day", "Month", "Total_Value", true, true)
        } else {
            pivot(&records, "Month", "Status", "Total_Value", false, false)
        };

        let mut spec = ChartSpec::new(ChartType::BarVertical, chart.title, grid.labels)
            .format(FormatMode::Currency);
        for (i, (name, values)) in grid.series.into_iter().enumerate() {
            let color = if by_due_day {
                DUE_DAY_COLORS[i % DUE_DAY_COLORS.len()]
            } else {
                billing_status_color(&name)
            };
            spec = spec.dataset(Dataset::new(name, values).with_color(color));
        }

        let type_options = if by_due_day {
            vec![ChartType::BarVertical, ChartType::BarHorizontal]
        } else {
            spec = spec.stacked();
            vec![ChartType::BarVertical, ChartType::Line]
        };

        widgets.push(WidgetPlan::Chart(ChartPlan {
            id: chart.id.to_string(),
            default_rect: Some(chart.rect),
            spec,
            type_options,
            drill: None,
        }));
    }

    if !any_data {
        return RenderPlan {
            notice: Some("Nenhum dado de faturamento encontrado para o período.".to_string()),
            ..Default::default()
        };
    }
    RenderPlan {
        widgets,
        ..Default::default()
    }
}

const SELLER_CANCEL_SHARE: Column = Column::share("% Canc.", "Cancelados_Count", "Total");
const SELLER_NEGATIVE_SHARE: Column = Column::share("% Neg.", "Negativados_Count", "Total");

/// Seller details filter by calendar year and month, so the date range narrows to the
/// year (and month) both ends share. A range spanning years sends neither.
fn seller_period(filters: &Filters) -> (Filters, String) {
    let parse = |field| NaiveDate::parse_from_str(filters.text(field), "%Y-%m-%d").ok();
    let bounds = match (parse(FilterField::StartDate), parse(FilterField::EndDate)) {
        (Some(start), Some(end)) => Some((start, end)),
        (Some(day), None) | (None, Some(day)) => Some((day, day)),
        (None, None) => None,
    };
    match bounds {
        Some((start, end)) if start.year() == end.year() => {
            let year = start.year().to_string();
            let by_year = Filters::new().with_text(FilterField::Year, year.clone());
            if start.month() == end.month() {
                let month = format!("{:02}", start.month());
                let caption = format!("{}/{}", year, month);
                (by_year.with_text(FilterField::Month, month), caption)
            } else {
                (by_year, year)
            }
        }
        _ => (Filters::new(), "Todos Anos".to_string()),
    }
}

fn sellers_plan(payload: &AnalysisPayload, filters: &Filters) -> RenderPlan {
    let rows = payload.rows();
    let cards = churn_totals(payload, "Soma Geral");
    if rows.is_empty() {
        return RenderPlan {
            cards,
            notice: Some("Nenhum dado de vendedor encontrado.".to_string()),
            ..Default::default()
        };
    }

    let (period, period_caption) = seller_period(filters);
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
                target: AnalysisId::SellerClients,
                title: format!(
                    "Clientes {} - {} ({})",
                    type_caption(client_type),
                    seller,
                    period_caption
                ),
                filters: period
                    .clone()
                    .with_text(FilterField::SellerId, text_or(record, "Vendedor_ID", ""))
                    .with_text(FilterField::ClientType, client_type),
            }),
        }
    };
    let share_cell =
        |record: &Record, column: Column| Cell::plain(format_cell(column.kind, column.key, record));

    let table = TableModel {
        title: Some("Churn por Vendedor".to_string()),
        headers: [
            "Vendedor",
            "Cancelados",
            "% Canc.",
            "Negativados",
            "% Neg.",
            "Total Churn",
        ]
        .iter()
        .map(|h| h.to_string())
        .collect(),
        rows: rows
            .iter()
            .map(|r| {
                vec![
                    Cell::plain(text_or(r, "Vendedor_Nome", "Não Identificado")),
                    drill_cell(r, "Cancelados_Count", "cancelado"),
                    share_cell(r, SELLER_CANCEL_SHARE),
                    drill_cell(r, "Negativados_Count", "negativado"),
                    share_cell(r, SELLER_NEGATIVE_SHARE),
                    Cell::plain(format_number_int(num(r, "Total"))),
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

fn contracts_plan(payload: &AnalysisPayload) -> RenderPlan {
    let by_status = payload.records("by_status");
    let by_access = payload.records("by_access_status");
    if by_status.is_empty() && by_access.is_empty() {
        return RenderPlan {
            notice: Some("Nenhum contrato encontrado.".to_string()),
            ..Default::default()
        };
    }

    let total: f64 = by_status.iter().map(|r| num(r, "Count")).sum();
    let radial_options = vec![ChartType::Doughnut, ChartType::BarVertical, ChartType::BarHorizontal];
    let doughnut = |id: &str, title: &str, rows: &[&Record], key: &str, rect: Rect| {
        let spec = ChartSpec::new(
            ChartType::Doughnut,
            title,
            rows.iter().map(|r| text_or(r, key, "N/A")).collect(),
        )
        .dataset(Dataset::new(
            "Contagem",
            rows.iter().map(|r| num(r, "Count")).collect(),
        ));
        WidgetPlan::Chart(ChartPlan {
            id: id.to_string(),
            default_rect: Some(rect),
            spec,
            type_options: radial_options.clone(),
            drill: None,
        })
    };

    let mut widgets = vec![
        doughnut(
            "mainChart1",
            "Contratos por Status",
            &by_status,
            "Status_contrato",
            Rect::new(0, 0, 6, 5),
        ),
        doughnut(
            "mainChart2",
            "Contratos por Status de Acesso",
            &by_access,
            "Status_acesso",
            Rect::new(6, 0, 6, 5),
        ),
    ];

    // Only present when no city filter is applied
    let per_city = [
        (
            "mainChart3",
            "by_status_by_city",
            "Status_contrato",
            "Status de Contrato por Cidade",
            Rect::new(0, 5, 6, 5),
        ),
        (
            "mainChart4",
            "by_access_status_by_city",
            "Status_acesso",
            "Status de Acesso por Cidade",
            Rect::new(6, 5, 6, 5),
        ),
    ];
    for (id, key, series_key, title, rect) in per_city {
        let records = payload.records(key);
        if records.is_empty() {
            continue;
        }
        let grid = pivot(&records, "Cidade", series_key, "Count", false, false);
        let mut spec = ChartSpec::new(ChartType::BarVertical, title, grid.labels).stacked();
        for (name, values) in grid.series {
            spec = spec.dataset(Dataset::new(name, values));
        }
        widgets.push(WidgetPlan::Chart(ChartPlan {
            id: id.to_string(),
            default_rect: Some(rect),
            spec,
            type_options: vec![ChartType::BarVertical, ChartType::BarHorizontal],
            drill: None,
        }));
    }

    RenderPlan {
        cards: vec![SummaryCard::count("Total de Contratos", total, Tone::Info)],
        widgets,
        ..Default::default()
    }
}
