pub mod dashboard;
pub mod detail_modal;
pub mod filter_bar;
pub mod section;
pub mod sink;

pub use dashboard::ClientAnalyticsDashboard;
