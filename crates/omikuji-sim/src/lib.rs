pub mod autopilot;
pub mod config;
pub mod logging;
pub mod runner;
