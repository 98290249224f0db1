pub mod d500_client_analytics;

pub use d500_client_analytics::ui::ClientAnalyticsDashboard;
