//! Per-client views: invoice lists, the tabbed client details and the pre-churn history.

use super::{carry, num, text_or, RenderPlan};
use crate::shared::analysis::presentation::{Column, TableModel};
use contracts::dashboards::d500_client_analytics::{
    AnalysisId, AnalysisPayload, DrillDown, FilterField, Filters, Record,
};

pub(super) const INVOICE_COLUMNS: &[Column] = &[
    Column::text("ID", "ID"),
    Column::date("Emissao", "Emissão"),
    Column::date("Vencimento", "Vencimento"),
    Column::date("Data_pagamento", "Data Pagamento"),
    Column::money("Valor", "Valor"),
    Column::text("Status", "Status"),
];

pub(super) const FINANCIAL_COLUMNS: &[Column] = &[
    Column::text("ID", "ID"),
    Column::text("Parcela_R", "Parcela"),
    Column::date("Emissao", "Emissão"),
    Column::date("Vencimento", "Vencimento"),
    Column::date("Data_pagamento", "Pagamento"),
    Column::money("Valor", "Valor"),
    Column::text("Status", "Status"),
];

pub(super) const SERVICE_ORDER_COLUMNS: &[Column] = &[
    Column::text("ID", "ID"),
    Column::date("Abertura", "Abertura"),
    Column::text("Assunto", "Assunto"),
    Column::text("Status", "Status"),
];

pub(super) const ATTENDANCE_COLUMNS: &[Column] = &[
    Column::text("ID", "ID"),
    Column::date("Criado_em", "Criação"),
    Column::text("Assunto", "Assunto"),
    Column::text("Novo_status", "Status"),
];

pub(super) const LOGIN_COLUMNS: &[Column] = &[
    Column::text("Login", "Login"),
    Column::date("ltima_conex_o_inicial", "Última Conexão"),
    Column::text("Sinal_RX", "Sinal RX"),
    Column::text("ONU_tipo", "ONU/Plano"),
    Column::text("IPV4", "IPV4"),
    Column::text("Transmissor", "Transmissor"),
];

pub(super) const COMODATO_COLUMNS: &[Column] = &[
    Column::text("Descricao_produto", "Produto"),
    Column::text("Status_comodato", "Status"),
];

const EQUIPMENT_HISTORY_COLUMNS: &[Column] = &[
    Column::text("Descricao_produto", "Produto"),
    Column::text("Status_comodato", "Status"),
    Column::date("Data", "Data"),
];

const SERVICE_ORDER_HISTORY_COLUMNS: &[Column] = &[
    Column::text("ID", "ID"),
    Column::date("Abertura", "Abertura"),
    Column::text("Assunto", "Assunto"),
    Column::text("Mensagem", "Mensagem"),
];

const ATTENDANCE_HISTORY_COLUMNS: &[Column] = &[
    Column::text("ID", "ID"),
    Column::date("Criado_em", "Criação"),
    Column::text("Assunto", "Assunto"),
    Column::text("Novo_status", "Status"),
    Column::text("Descri_o", "Descrição"),
];

const CLIENT_TABS: [(&str, AnalysisId); 5] = [
    ("Financeiro", AnalysisId::ClientFinancial),
    ("OS", AnalysisId::ClientServiceOrders),
    ("Atendimentos", AnalysisId::ClientAttendances),
    ("Logins", AnalysisId::ClientLogins),
    ("Comodato", AnalysisId::ClientComodato),
];

/// Sibling views of a client detail in tab order; empty for any other detail.
///
/// Every tab keeps the opening title and identifies the client the same way.
pub fn detail_tabs(drill: &DrillDown) -> Vec<(&'static str, DrillDown)> {
    if !CLIENT_TABS.iter().any(|(_, target)| *target == drill.target) {
        return Vec::new();
    }
    let identity = carry(
        &drill.filters,
        &[FilterField::ContractId, FilterField::ClientName],
    );
    CLIENT_TABS
        .iter()
        .map(|(label, target)| {
            (
                *label,
                DrillDown {
                    target: *target,
                    title: drill.title.clone(),
                    filters: identity.clone(),
                },
            )
        })
        .collect()
}

/// Contract id and client name of a row, when both are present
fn identity(record: &Record, name_key: &str) -> Option<(String, String)> {
    let contract = text_or(record, "Contrato_ID", "");
    let client = text_or(record, name_key, "");
    if contract.is_empty() || client.is_empty() {
        None
    } else {
        Some((contract, client))
    }
}

fn identity_filters(contract: &str, client: &str) -> Filters {
    Filters::new()
        .with_text(FilterField::ContractId, contract)
        .with_text(FilterField::ClientName, client)
}

fn history_drill(record: &Record) -> Option<DrillDown> {
    let (contract, client) = identity(record, "Cliente")?;
    Some(DrillDown {
        target: AnalysisId::CancellationContext,
        title: format!("Histórico de {} (Contrato: {})", client, contract),
        filters: identity_filters(&contract, &client),
    })
}

/// Client name opens the history before cancellation
pub(super) fn history_link(column: &Column, record: &Record) -> Option<DrillDown> {
    if column.key == "Cliente" {
        history_drill(record)
    } else {
        None
    }
}

pub(super) fn churn_link(column: &Column, record: &Record) -> Option<DrillDown> {
    match column.key {
        "Cliente" => history_drill(record),
        "Teve_Contato_Relevante" if text_or(record, column.key, "Não") != "Não" => {
            history_drill(record)
        }
        _ => None,
    }
}

pub(super) fn invoice_link(column: &Column, record: &Record) -> Option<DrillDown> {
    let (kind, caption) = match column.key {
        "Atrasos_Pagos" => ("atrasos_pagos", "Atrasos Pagos"),
        "Faturas_Nao_Pagas" => ("faturas_nao_pagas", "Faturas Vencidas e Não Pagas"),
        _ => return None,
    };
    if num(record, column.key) <= 0.0 {
        return None;
    }
    let contract = text_or(record, "Contrato_ID", "");
    if contract.is_empty() {
        return None;
    }
    Some(DrillDown {
        target: AnalysisId::InvoiceDetails,
        title: format!(
            "Detalhes: {} para {} (Contrato: {})",
            caption,
            text_or(record, "Cliente", "N/A"),
            contract
        ),
        filters: Filters::new()
            .with_text(FilterField::ContractId, contract)
            .with_text(FilterField::ClientType, kind),
    })
}

/// Filled health markers open the matching client tab
pub(super) fn health_link(column: &Column, record: &Record) -> Option<DrillDown> {
    let value = text_or(record, column.key, "");
    let target = match column.key {
        "Primeira_Inadimplencia_Vencimento" if !value.is_empty() => AnalysisId::ClientFinancial,
        "Possui_Reclamacoes" if value == "Sim" => AnalysisId::ClientServiceOrders,
        "Ultima_Conexao" if !value.is_empty() => AnalysisId::ClientLogins,
        _ => return None,
    };
    let (contract, client) = identity(record, "Razao_Social")?;
    Some(DrillDown {
        target,
        title: format!("Detalhes de {} (Contrato: {})", client, contract),
        filters: identity_filters(&contract, &client),
    })
}

pub(super) fn history_plan(payload: &AnalysisPayload) -> RenderPlan {
    let sections = [
        ("Equipamentos em Comodato", "equipamentos", EQUIPMENT_HISTORY_COLUMNS),
        ("Ordens de Serviço (OS)", "os", SERVICE_ORDER_HISTORY_COLUMNS),
        ("Atendimentos", "atendimentos", ATTENDANCE_HISTORY_COLUMNS),
    ];
    let tables: Vec<TableModel> = sections
        .into_iter()
        .filter_map(|(title, key, columns)| {
            let records = payload.records(key);
            if records.is_empty() {
                None
            } else {
                Some(TableModel::from_records(columns, &records).titled(title))
            }
        })
        .collect();

    if tables.is_empty() {
        return RenderPlan {
            notice: Some(
                "Nenhum histórico de OS, atendimentos ou equipamentos encontrado para este \
                 cliente antes do evento."
                    .to_string(),
            ),
            ..Default::default()
        };
    }
    RenderPlan {
        tables,
        ..Default::default()
    }
}
