//! Library side of the `cadasil` terminal dashboard.

pub mod config;
pub mod dashboard;
pub mod logging;
pub mod views;
