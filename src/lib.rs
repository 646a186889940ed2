//! Live monitoring dashboard for a landslide sensor station.
//!
//! Snapshots pushed over MQTT are fanned out to the dashboard (sliding-window
//! charts and a smoothed orientation indicator) and to a DuckDB history
//! recorder that the history panel pages through.

pub mod app;
pub mod config;
pub mod dashboard;
pub mod database;
pub mod history;
pub mod logger;
pub mod mqtt;
pub mod orientation;
pub mod plotter;
pub mod simulator;
pub mod ticker;
pub mod types;
pub mod utils;
pub mod window;
