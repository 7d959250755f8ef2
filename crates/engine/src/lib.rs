//! XHaven Engine library.
//!
//! Mirrors the companion app's game state and pushes local changes back.
//!
//! ## Structure
//!
//! - `stores/` - The mirrored state, sequencing and outbound propagation
//! - `use_cases/` - Tokenized commands and the spoken-phrase interpreter
//! - `infrastructure/` - Outbound port, TCP transport and configuration
//! - `api/` - The operator console
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod stores;
pub mod use_cases;

pub use app::App;
