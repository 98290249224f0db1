use super::filters::{FilterField, Filters};
use serde::{Deserialize, Serialize};

/// Catalogue of reports served by the analytics API
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnalysisId {
    #[serde(rename = "cancellations")]
    Cancellations,
    #[serde(rename = "negativacao")]
    Negativacao,
    #[serde(rename = "atrasos_e_nao_pagos")]
    LatePayments,
    #[serde(rename = "saude_financeira")]
    FinancialHealth,
    #[serde(rename = "saude_financeira_bloqueio")]
    FinancialHealthAutoBlock,
    #[serde(rename = "cancellations_by_city")]
    CancellationsByCity,
    #[serde(rename = "cancellations_by_neighborhood")]
    CancellationsByNeighborhood,
    #[serde(rename = "cancellations_by_equipment")]
    CancellationsByEquipment,
    #[serde(rename = "equipment_by_olt")]
    EquipmentByOlt,
    #[serde(rename = "active_clients_evolution")]
    ActiveClientsEvolution,
    #[serde(rename = "faturamento_por_cidade")]
    BillingByCity,
    #[serde(rename = "vendedores")]
    Sellers,
    #[serde(rename = "activations_by_seller")]
    ActivationsBySeller,
    #[serde(rename = "cohort_retention")]
    CohortRetention,
    #[serde(rename = "daily_evolution_by_city")]
    DailyEvolutionByCity,
    #[serde(rename = "analise_juros_atraso")]
    LateInterest,
    #[serde(rename = "comparativo_diario")]
    DailyComparison,
    #[serde(rename = "complaint_patterns")]
    ComplaintPatterns,
    #[serde(rename = "predictive_churn")]
    PredictiveChurn,
    #[serde(rename = "Contratos")]
    ContractsSummary,
    #[serde(rename = "Clientes")]
    ClientsSummary,
    #[serde(rename = "Contas_a_Receber")]
    ReceivablesSummary,
    #[serde(rename = "Atendimentos")]
    AttendancesSummary,
    #[serde(rename = "OS")]
    ServiceOrdersSummary,
    #[serde(rename = "Logins")]
    LoginsSummary,
    #[serde(rename = "city_clients")]
    CityClients,
    #[serde(rename = "neighborhood_clients")]
    NeighborhoodClients,
    #[serde(rename = "equipment_clients")]
    EquipmentClients,
    #[serde(rename = "active_equipment_clients")]
    ActiveEquipmentClients,
    #[serde(rename = "seller_clients")]
    SellerClients,
    #[serde(rename = "seller_activations")]
    SellerActivations,
    #[serde(rename = "daily_evolution_details")]
    DailyEvolutionDetails,
    #[serde(rename = "invoice_details")]
    InvoiceDetails,
    #[serde(rename = "client_financial")]
    ClientFinancial,
    #[serde(rename = "client_service_orders")]
    ClientServiceOrders,
    #[serde(rename = "client_attendances")]
    ClientAttendances,
    #[serde(rename = "client_logins")]
    ClientLogins,
    #[serde(rename = "client_comodato")]
    ClientComodato,
    #[serde(rename = "cancellation_context")]
    CancellationContext,
    #[serde(rename = "collection_rows")]
    CollectionRows,
}

/// `GET {base}/api/{category}/{endpoint}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiPath {
    pub category: &'static str,
    pub endpoint: &'static str,
}

/// One entry of an analysis filter schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: FilterField,
    pub required: bool,
    /// Sent as a path segment after the endpoint instead of a query parameter
    pub in_path: bool,
}

const fn opt(field: FilterField) -> FieldRule {
    FieldRule {
        field,
        required: false,
        in_path: false,
    }
}

const fn req(field: FilterField) -> FieldRule {
    FieldRule {
        field,
        required: true,
        in_path: false,
    }
}

const fn seg(field: FilterField) -> FieldRule {
    FieldRule {
        field,
        required: true,
        in_path: true,
    }
}

use FilterField::*;

const CHURN_TABLE: &[FieldRule] = &[
    opt(SearchTerm),
    opt(StartDate),
    opt(EndDate),
    opt(Relevance),
    opt(FilterColumn),
    opt(FilterValue),
];
const SEARCH_ONLY: &[FieldRule] = &[opt(SearchTerm)];
const FINANCIAL_HEALTH: &[FieldRule] = &[
    opt(SearchTerm),
    opt(ContractStatus),
    opt(AccessStatus),
    opt(Relevance),
];
const BY_CITY: &[FieldRule] = &[opt(StartDate), opt(EndDate), opt(Relevance)];
// city is picked from the list this analysis itself returns
const BY_NEIGHBORHOOD: &[FieldRule] = &[opt(City), opt(StartDate), opt(EndDate), opt(Relevance)];
const BY_EQUIPMENT: &[FieldRule] = &[opt(StartDate), opt(EndDate), opt(City), opt(Relevance)];
const CITY_ONLY: &[FieldRule] = &[opt(City)];
// the server only matches one access status exactly, so the picker leaves it out
const PREDICTIVE: &[FieldRule] = &[opt(ContractStatus)];
const EVOLUTION: &[FieldRule] = &[
    opt(StartDate),
    opt(EndDate),
    opt(City),
    opt(ContractStatus),
    opt(AccessStatus),
];
const BILLING: &[FieldRule] = &[req(StartDate), req(EndDate), opt(City)];
const DATES: &[FieldRule] = &[opt(StartDate), opt(EndDate)];
const REQUIRED_DATES: &[FieldRule] = &[req(StartDate), req(EndDate)];
const CITY_AND_DATES: &[FieldRule] = &[opt(City), opt(StartDate), opt(EndDate)];
const REFERENCE_DAY: &[FieldRule] = &[opt(Date)];
const CONTRACTS: &[FieldRule] = &[opt(StartDate), opt(EndDate), opt(City)];
const PERIOD: &[FieldRule] = &[opt(Year), opt(Month)];
const PERIOD_AND_CITY: &[FieldRule] = &[opt(Year), opt(Month), opt(City)];
const CITY_CLIENTS: &[FieldRule] = &[
    req(City),
    req(ClientType),
    opt(StartDate),
    opt(EndDate),
    opt(Relevance),
];
const NEIGHBORHOOD_CLIENTS: &[FieldRule] = &[
    req(City),
    req(Neighborhood),
    req(ClientType),
    opt(StartDate),
    opt(EndDate),
    opt(Relevance),
];
const EQUIPMENT_CLIENTS: &[FieldRule] = &[
    req(Equipment),
    opt(StartDate),
    opt(EndDate),
    opt(City),
    opt(Relevance),
];
const ACTIVE_EQUIPMENT_CLIENTS: &[FieldRule] = &[req(Equipment), opt(City)];
const SELLER_CLIENTS: &[FieldRule] = &[req(SellerId), req(ClientType), opt(Year), opt(Month)];
const SELLER_ACTIVATIONS: &[FieldRule] = &[
    req(SellerId),
    req(ClientType),
    opt(City),
    opt(Year),
    opt(Month),
];
const DAILY_EVENTS: &[FieldRule] = &[req(StartDate), req(EndDate), req(City)];
const INVOICES: &[FieldRule] = &[req(ContractId), req(ClientType)];
const BY_CONTRACT: &[FieldRule] = &[seg(ContractId)];
const BY_CLIENT_NAME: &[FieldRule] = &[seg(ClientName)];
const CLIENT_HISTORY: &[FieldRule] = &[seg(ContractId), seg(ClientName)];
const BY_TABLE: &[FieldRule] = &[seg(TableName)];

impl AnalysisId {
    /// Analyses offered in the picker (detail views are reached by drill-down only)
    pub const MAIN: [AnalysisId; 25] = [
        AnalysisId::Cancellations,
        AnalysisId::Negativacao,
        AnalysisId::LatePayments,
        AnalysisId::FinancialHealth,
        AnalysisId::FinancialHealthAutoBlock,
        AnalysisId::CancellationsByCity,
        AnalysisId::CancellationsByNeighborhood,
        AnalysisId::CancellationsByEquipment,
        AnalysisId::EquipmentByOlt,
        AnalysisId::ActiveClientsEvolution,
        AnalysisId::BillingByCity,
        AnalysisId::Sellers,
        AnalysisId::ActivationsBySeller,
        AnalysisId::CohortRetention,
        AnalysisId::DailyEvolutionByCity,
        AnalysisId::LateInterest,
        AnalysisId::DailyComparison,
        AnalysisId::ComplaintPatterns,
        AnalysisId::PredictiveChurn,
        AnalysisId::ContractsSummary,
        AnalysisId::ClientsSummary,
        AnalysisId::ReceivablesSummary,
        AnalysisId::AttendancesSummary,
        AnalysisId::ServiceOrdersSummary,
        AnalysisId::LoginsSummary,
    ];

    pub const DETAILS: [AnalysisId; 15] = [
        AnalysisId::CityClients,
        AnalysisId::NeighborhoodClients,
        AnalysisId::EquipmentClients,
        AnalysisId::ActiveEquipmentClients,
        AnalysisId::SellerClients,
        AnalysisId::SellerActivations,
        AnalysisId::DailyEvolutionDetails,
        AnalysisId::InvoiceDetails,
        AnalysisId::ClientFinancial,
        AnalysisId::ClientServiceOrders,
        AnalysisId::ClientAttendances,
        AnalysisId::ClientLogins,
        AnalysisId::ClientComodato,
        AnalysisId::CancellationContext,
        AnalysisId::CollectionRows,
    ];

    /// Stable key, also the layout storage namespace
    pub fn key(&self) -> &'static str {
        match self {
            AnalysisId::Cancellations => "cancellations",
            AnalysisId::Negativacao => "negativacao",
            AnalysisId::LatePayments => "atrasos_e_nao_pagos",
            AnalysisId::FinancialHealth => "saude_financeira",
            AnalysisId::FinancialHealthAutoBlock => "saude_financeira_bloqueio",
            AnalysisId::CancellationsByCity => "cancellations_by_city",
            AnalysisId::CancellationsByNeighborhood => "cancellations_by_neighborhood",
            AnalysisId::CancellationsByEquipment => "cancellations_by_equipment",
            AnalysisId::EquipmentByOlt => "equipment_by_olt",
            AnalysisId::ActiveClientsEvolution => "active_clients_evolution",
            AnalysisId::BillingByCity => "faturamento_por_cidade",
            AnalysisId::Sellers => "vendedores",
            AnalysisId::ActivationsBySeller => "activations_by_seller",
            AnalysisId::CohortRetention => "cohort_retention",
            AnalysisId::DailyEvolutionByCity => "daily_evolution_by_city",
            AnalysisId::LateInterest => "analise_juros_atraso",
            AnalysisId::DailyComparison => "comparativo_diario",
            AnalysisId::ComplaintPatterns => "complaint_patterns",
            AnalysisId::PredictiveChurn => "predictive_churn",
            AnalysisId::ContractsSummary => "Contratos",
            AnalysisId::ClientsSummary => "Clientes",
            AnalysisId::ReceivablesSummary => "Contas_a_Receber",
            AnalysisId::AttendancesSummary => "Atendimentos",
            AnalysisId::ServiceOrdersSummary => "OS",
            AnalysisId::LoginsSummary => "Logins",
            AnalysisId::CityClients => "city_clients",
            AnalysisId::NeighborhoodClients => "neighborhood_clients",
            AnalysisId::EquipmentClients => "equipment_clients",
            AnalysisId::ActiveEquipmentClients => "active_equipment_clients",
            AnalysisId::SellerClients => "seller_clients",
            AnalysisId::SellerActivations => "seller_activations",
            AnalysisId::DailyEvolutionDetails => "daily_evolution_details",
            AnalysisId::InvoiceDetails => "invoice_details",
            AnalysisId::ClientFinancial => "client_financial",
            AnalysisId::ClientServiceOrders => "client_service_orders",
            AnalysisId::ClientAttendances => "client_attendances",
            AnalysisId::ClientLogins => "client_logins",
            AnalysisId::ClientComodato => "client_comodato",
            AnalysisId::CancellationContext => "cancellation_context",
            AnalysisId::CollectionRows => "collection_rows",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::MAIN
            .iter()
            .chain(Self::DETAILS.iter())
            .copied()
            .find(|a| a.key() == key)
    }

    pub fn title(&self) -> &'static str {
        match self {
            AnalysisId::Cancellations => "Cancelamentos",
            AnalysisId::Negativacao => "Negativação",
            AnalysisId::LatePayments => "Atrasos e Não Pagos",
            AnalysisId::FinancialHealth => "Saúde Financeira",
            AnalysisId::FinancialHealthAutoBlock => "Saúde Financeira (Bloqueio Automático)",
            AnalysisId::CancellationsByCity => "Cancelamentos por Cidade",
            AnalysisId::CancellationsByNeighborhood => "Cancelamentos por Bairro",
            AnalysisId::CancellationsByEquipment => "Cancelamentos por Equipamento",
            AnalysisId::EquipmentByOlt => "Equipamentos por OLT",
            AnalysisId::ActiveClientsEvolution => "Evolução de Clientes Ativos",
            AnalysisId::BillingByCity => "Faturamento por Cidade",
            AnalysisId::Sellers => "Vendedores",
            AnalysisId::ActivationsBySeller => "Ativações por Vendedor",
            AnalysisId::CohortRetention => "Retenção por Coorte",
            AnalysisId::DailyEvolutionByCity => "Evolução Diária por Cidade",
            AnalysisId::LateInterest => "Juros por Atraso",
            AnalysisId::DailyComparison => "Comparativo Diário",
            AnalysisId::ComplaintPatterns => "Padrões de Reclamação",
            AnalysisId::PredictiveChurn => "Análise Preditiva de Churn",
            AnalysisId::ContractsSummary => "Contratos",
            AnalysisId::ClientsSummary => "Clientes",
            AnalysisId::ReceivablesSummary => "Contas a Receber",
            AnalysisId::AttendancesSummary => "Atendimentos",
            AnalysisId::ServiceOrdersSummary => "Ordens de Serviço",
            AnalysisId::LoginsSummary => "Logins",
            AnalysisId::CityClients => "Clientes da Cidade",
            AnalysisId::NeighborhoodClients => "Clientes do Bairro",
            AnalysisId::EquipmentClients => "Clientes do Equipamento",
            AnalysisId::ActiveEquipmentClients => "Clientes Ativos com Equipamento",
            AnalysisId::SellerClients => "Clientes do Vendedor",
            AnalysisId::SellerActivations => "Ativações do Vendedor",
            AnalysisId::DailyEvolutionDetails => "Eventos do Dia",
            AnalysisId::InvoiceDetails => "Faturas do Contrato",
            AnalysisId::ClientFinancial => "Financeiro",
            AnalysisId::ClientServiceOrders => "Ordens de Serviço",
            AnalysisId::ClientAttendances => "Atendimentos",
            AnalysisId::ClientLogins => "Logins",
            AnalysisId::ClientComodato => "Comodato",
            AnalysisId::CancellationContext => "Histórico do Cliente",
            AnalysisId::CollectionRows => "Tabela Completa",
        }
    }

    pub fn path(&self) -> ApiPath {
        let (category, endpoint) = match self {
            AnalysisId::Cancellations => ("custom_analysis", "cancellations"),
            AnalysisId::Negativacao => ("custom_analysis", "negativacao"),
            AnalysisId::LatePayments => ("custom_analysis", "contas_a_receber"),
            AnalysisId::FinancialHealth => ("custom_analysis", "financial_health"),
            AnalysisId::FinancialHealthAutoBlock => {
                ("custom_analysis", "financial_health_auto_block")
            }
            AnalysisId::CancellationsByCity => ("custom_analysis", "cancellations_by_city"),
            AnalysisId::CancellationsByNeighborhood => {
                ("custom_analysis", "cancellations_by_neighborhood")
            }
            AnalysisId::CancellationsByEquipment => {
                ("custom_analysis", "cancellations_by_equipment")
            }
            AnalysisId::EquipmentByOlt => ("custom_analysis", "equipment_by_olt"),
            AnalysisId::ActiveClientsEvolution => ("custom_analysis", "active_clients_evolution"),
            AnalysisId::BillingByCity => ("custom_analysis", "faturamento_por_cidade"),
            AnalysisId::Sellers => ("custom_analysis", "sellers"),
            AnalysisId::ActivationsBySeller => ("custom_analysis", "activations_by_seller"),
            AnalysisId::CohortRetention => ("custom_analysis", "cohort"),
            AnalysisId::DailyEvolutionByCity => ("custom_analysis", "daily_evolution_by_city"),
            AnalysisId::LateInterest => ("custom_analysis", "late_interest_analysis"),
            AnalysisId::DailyComparison => ("comparison", "daily"),
            AnalysisId::ComplaintPatterns => ("behavior", "complaint_patterns"),
            AnalysisId::PredictiveChurn => ("behavior", "predictive_churn"),
            AnalysisId::ContractsSummary => ("summary", "Contratos"),
            AnalysisId::ClientsSummary => ("summary", "Clientes"),
            AnalysisId::ReceivablesSummary => ("finance_summary", "Contas_a_Receber"),
            AnalysisId::AttendancesSummary => ("atendimento_summary", "Atendimentos"),
            AnalysisId::ServiceOrdersSummary => ("os_summary", "OS"),
            AnalysisId::LoginsSummary => ("summary", "Logins"),
            AnalysisId::CityClients => ("details", "city_clients"),
            AnalysisId::NeighborhoodClients => ("details", "neighborhood_clients"),
            AnalysisId::EquipmentClients => ("details", "equipment_clients"),
            AnalysisId::ActiveEquipmentClients => ("details", "active_equipment_clients"),
            AnalysisId::SellerClients => ("details", "seller_clients"),
            AnalysisId::SellerActivations => ("details", "seller_activations"),
            AnalysisId::DailyEvolutionDetails => ("details", "daily_evolution_details"),
            AnalysisId::InvoiceDetails => ("details", "invoice_details"),
            AnalysisId::ClientFinancial => ("details", "financial"),
            AnalysisId::ClientServiceOrders | AnalysisId::ClientAttendances => {
                ("details", "complaints")
            }
            AnalysisId::ClientLogins => ("details", "logins"),
            AnalysisId::ClientComodato => ("details", "comodato"),
            AnalysisId::CancellationContext => ("details", "cancellation_context"),
            AnalysisId::CollectionRows => ("summary", "data"),
        };
        ApiPath { category, endpoint }
    }

    pub fn schema(&self) -> &'static [FieldRule] {
        match self {
            AnalysisId::Cancellations | AnalysisId::Negativacao => CHURN_TABLE,
            AnalysisId::LatePayments => SEARCH_ONLY,
            AnalysisId::FinancialHealth | AnalysisId::FinancialHealthAutoBlock => FINANCIAL_HEALTH,
            AnalysisId::CancellationsByCity => BY_CITY,
            AnalysisId::CancellationsByNeighborhood => BY_NEIGHBORHOOD,
            AnalysisId::CancellationsByEquipment => BY_EQUIPMENT,
            AnalysisId::EquipmentByOlt | AnalysisId::ComplaintPatterns => CITY_ONLY,
            AnalysisId::PredictiveChurn => PREDICTIVE,
            AnalysisId::ActiveClientsEvolution => EVOLUTION,
            AnalysisId::BillingByCity => BILLING,
            AnalysisId::Sellers | AnalysisId::LateInterest => DATES,
            AnalysisId::ActivationsBySeller | AnalysisId::CohortRetention => CITY_AND_DATES,
            AnalysisId::DailyEvolutionByCity => REQUIRED_DATES,
            AnalysisId::DailyComparison => REFERENCE_DAY,
            AnalysisId::ContractsSummary => CONTRACTS,
            AnalysisId::ClientsSummary
            | AnalysisId::AttendancesSummary
            | AnalysisId::LoginsSummary => PERIOD,
            AnalysisId::ReceivablesSummary | AnalysisId::ServiceOrdersSummary => PERIOD_AND_CITY,
            AnalysisId::CityClients => CITY_CLIENTS,
            AnalysisId::NeighborhoodClients => NEIGHBORHOOD_CLIENTS,
            AnalysisId::EquipmentClients => EQUIPMENT_CLIENTS,
            AnalysisId::ActiveEquipmentClients => ACTIVE_EQUIPMENT_CLIENTS,
            AnalysisId::SellerClients => SELLER_CLIENTS,
            AnalysisId::SellerActivations => SELLER_ACTIVATIONS,
            AnalysisId::DailyEvolutionDetails => DAILY_EVENTS,
            AnalysisId::InvoiceDetails => INVOICES,
            AnalysisId::ClientFinancial | AnalysisId::ClientLogins | AnalysisId::ClientComodato => {
                BY_CONTRACT
            }
            AnalysisId::ClientServiceOrders | AnalysisId::ClientAttendances => BY_CLIENT_NAME,
            AnalysisId::CancellationContext => CLIENT_HISTORY,
            AnalysisId::CollectionRows => BY_TABLE,
        }
    }

    /// Query parameters every request of this analysis carries
    pub fn fixed_query(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            AnalysisId::ClientServiceOrders => &[("type", "os")],
            AnalysisId::ClientAttendances => &[("type", "atendimentos")],
            _ => &[],
        }
    }

    pub fn accepts(&self, field: FilterField) -> bool {
        self.schema().iter().any(|rule| rule.field == field)
    }

    /// First required field with no value, if any
    pub fn missing_required(&self, filters: &Filters) -> Option<FilterField> {
        self.schema()
            .iter()
            .filter(|rule| rule.required)
            .map(|rule| rule.field)
            .find(|field| !filters.is_set(*field))
    }

    pub fn is_detail(&self) -> bool {
        Self::DETAILS.contains(self)
    }

    /// Server-side paginated (`limit`/`offset` are sent)
    pub fn is_paginated(&self) -> bool {
        match self {
            AnalysisId::ClientComodato | AnalysisId::CancellationContext => false,
            AnalysisId::Cancellations
            | AnalysisId::Negativacao
            | AnalysisId::LatePayments
            | AnalysisId::FinancialHealth
            | AnalysisId::FinancialHealthAutoBlock
            | AnalysisId::PredictiveChurn => true,
            other => other.is_detail(),
        }
    }

    /// Accepts `sort_order`
    pub fn is_sortable(&self) -> bool {
        matches!(self, AnalysisId::Cancellations | AnalysisId::Negativacao)
    }
}

impl std::fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
