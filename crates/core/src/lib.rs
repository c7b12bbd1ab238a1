#![warn(clippy::all, missing_docs)]

//! Core domain logic for the Game Hub portal.
//!
//! This crate hosts the catalog models, catalog sources, persistence,
//! configuration and the controller that ties them to a render target
//! and an embedded player. Frontends implement the ports in [`render`]
//! and [`player`].

pub mod carousel;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod messaging;
pub mod models;
pub mod player;
pub mod render;
pub mod store;

pub use crate::catalog::{AnySource, CatalogLocation, CatalogSource};
pub use crate::config::AppConfig;
pub use crate::controller::{CatalogController, ControllerOptions, LoadReport, NewGame};
pub use crate::models::{Game, GameId, Rating};
pub use crate::store::{JsonFileStore, MemoryStore, PersistenceStore};
