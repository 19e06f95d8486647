//! Shared data types for Liga de Profetas.
//!
//! `models` mirrors the rows of the hosted tables after validation,
//! `api` holds the JSON request and response bodies of the HTTP surface.

pub mod api;
pub mod models;
