//! Browser implementations of the core capability traits.

pub mod chartjs;
pub mod gridstack;
pub mod storage;
pub mod transport;
