// Library interface for the live playground engine

pub mod app;
pub mod config;
pub mod config_io;
pub mod hooks;
pub mod input;
pub mod model;
pub mod services;
pub mod state;

pub use app::Playground;
