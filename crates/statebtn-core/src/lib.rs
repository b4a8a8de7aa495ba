//! Shared types for the statebtn widget: the behavioural state vocabulary,
//! render snapshots for the presentation adapter, and host configuration.

pub mod config;
pub mod state;
