//! spell_tui - terminal front-end for the spell forge
//!
//! The binary in `main.rs` owns the terminal; this library holds the
//! application state and the drawing code so both can be exercised in tests.

pub mod app;
pub mod ecg;
pub mod slider;
pub mod ui;

pub use app::App;
