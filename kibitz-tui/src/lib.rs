//! Terminal front end for the AI review panel: the controller that owns the
//! review list and its update stream, persisted preferences, and the ratatui
//! widgets that draw the board overlay, chart, summary table and info panel.

pub mod app;
pub mod controller;
pub mod preferences;
pub mod ui;

pub use app::App;
pub use controller::{selection_order, Followup, ReviewController, DEBOUNCE_WINDOW};
pub use preferences::{load_preferences, save_preferences, Preferences};
