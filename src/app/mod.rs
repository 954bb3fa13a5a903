//! Owned application state and the main run loop.

pub mod context;
pub mod controller;
pub mod logging;

pub use context::AppState;
pub use controller::run;
