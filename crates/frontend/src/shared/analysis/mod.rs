//! Orchestration core of the client analytics dashboard.
//!
//! Everything here is browser-agnostic: DOM, charting, grid and storage are reached through
//! the capability traits implemented in [`crate::shared::browser`].

pub mod catalog;
pub mod chart;
pub mod error;
pub mod fetch;
pub mod flow;
pub mod layout;
pub mod pagination;
pub mod presentation;
pub mod query;
pub mod view_state;
