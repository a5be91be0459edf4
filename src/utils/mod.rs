//! Support code around the parser.
//!
//! - [`app_data`] - Configuration file in the app data directory
//! - [`suggest`] - Edit-distance operator suggestions

pub mod app_data;
pub mod suggest;

pub use app_data::*;
pub use suggest::*;
