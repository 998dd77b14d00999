//! People list with nested address records, validated on input and kept in
//! a namespaced JSON store.

pub mod app;
pub mod collection;
pub mod config;
pub mod diagnostics;
pub mod events;
pub mod form;
pub mod model;
pub mod render;
pub mod router;
pub mod store;

pub type Result<T> = anyhow::Result<T>;
