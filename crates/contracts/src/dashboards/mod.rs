pub mod d500_client_analytics;
