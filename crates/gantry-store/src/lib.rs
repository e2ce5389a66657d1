//! `gantry-store` – world model persistence and external-edit detection.
//!
//! The single source of truth for the robot's world model.  Every other
//! component either receives read snapshots from the [`ConfigStore`] or
//! requests mutations through it; nothing else touches the settings file.
//!
//! # Modules
//!
//! - [`store`] – [`ConfigStore`][store::ConfigStore]: loads, validates and
//!   atomically persists the YAML settings document; serializes every
//!   mutation under one store-wide exclusive section and rolls back the
//!   in-memory state when a write fails.
//! - [`watcher`] – [`ChangeWatcher`][watcher::ChangeWatcher]: a cooperative
//!   polling task that detects operator edits to the settings file, reloads
//!   the store, and broadcasts the fresh snapshot to listeners (e.g. a map
//!   refresher).

pub mod store;
pub mod watcher;

pub use store::ConfigStore;
pub use watcher::{ChangeWatcher, FileSignature};
