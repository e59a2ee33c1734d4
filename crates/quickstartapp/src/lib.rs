//! # quickstartapp
//!
//! The storage core of QuickStart: notes, attachments and todos kept in a
//! versioned, workspace-aware tree of plain files. UI shells (the desktop
//! app, the `quickstart` CLI) sit on top of [`api::QuickStartApi`].
//!
//! ## Layers
//!
//! ```text
//! api         QuickStartApi, Outcome<T>          (public boundary, never errors)
//!   │
//! notes / workspaces / todos / maintenance       (repositories, Result<T>)
//!   │
//! paths + sanitize + store                       (path resolution, names, atomic JSON)
//!   │
//! filesystem
//! ```
//!
//! [`migration`] runs once at startup (see [`init::initialize`]) and brings
//! any older tree to the current layout before the repositories touch it.
//!
//! ## On-Disk Layout
//!
//! ```text
//! <dataRoot>/
//!   config.json
//!   workspaces/<folderName>/Notes/{index.json, attachments/, YYYY-MM/*.md}
//!   todos/YYYY-MM-DD.json
//!   backups/*.tar.gz
//! ```
//!
//! Every JSON document goes through [`store`]: writes are atomic and keep one
//! previous generation (`.bak`), reads fall back to it on corruption.

pub mod api;
pub mod config;
pub mod error;
pub mod init;
pub mod maintenance;
pub mod migration;
pub mod model;
pub mod notes;
pub mod paths;
pub mod sanitize;
pub mod store;
pub mod todos;
pub mod workspaces;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
