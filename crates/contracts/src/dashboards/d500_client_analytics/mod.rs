//! Wire types of the client analytics dashboard (churn, billing, tickets, sellers).

pub mod analysis;
pub mod filters;
pub mod layout;
pub mod payload;

pub use analysis::{AnalysisId, ApiPath, FieldRule};
pub use filters::{DrillDown, FilterField, FilterValue, Filters, StatusOptions};
pub use layout::{storage_key, LayoutEntry, Rect};
pub use payload::{value_as_f64, value_as_text, AnalysisPayload, ApiErrorBody, Record};
