pub mod alerts;
pub mod clock;
pub mod config;
pub mod coordinator;
pub mod display;
pub mod error;
pub mod notifier;
pub mod state;
