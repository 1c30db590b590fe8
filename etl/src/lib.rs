//! Dimensional warehouse loader for a courier dispatch system
//!
//! Every run rebuilds the star schema from scratch: seven dimensions, the
//! accumulating delivery fact, two service aggregates and the incident fact.
//! `domain` holds the transformations, `data` the storage collaborators,
//! `core` the application shell.

pub(crate) mod app;
pub mod core;
pub mod data;
pub mod domain;
pub mod utils;
