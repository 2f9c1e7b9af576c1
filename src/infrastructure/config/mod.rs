//! Infrastructure configuration modules.

pub mod catalog;
pub mod logging;
pub mod refresh;
pub mod settings;
