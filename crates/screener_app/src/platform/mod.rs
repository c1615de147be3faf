mod app;
mod coldstart;
mod config;
mod effects;
mod logging;
mod persistence;

pub use app::run_app;
