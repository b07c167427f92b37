//! Core of the FlowframTk vector drawing editor without its GUI.
//!
//! Exposes the action applicability engine that decides which commands are
//! available for the current editor state, and the persistence layer for the
//! user's settings and the flat files stored next to them.

pub mod actions;
pub mod io;
pub mod messages;
pub mod settings;

pub use actions::{ActionRegistry, EditorState, StateChange};
pub use settings::{ConfigDir, LoadReport, Profile, Settings};
