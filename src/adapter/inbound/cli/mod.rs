//! CLI module graph.

pub mod command;
pub mod config;
pub mod odds;
pub mod operator;
pub mod output;
pub mod run;
pub mod scan;
