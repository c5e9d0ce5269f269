//! services/api/src/lib.rs
//!
//! The HTTP service around the photo sharing core: concrete adapters for the
//! core's ports, configuration, error mapping and the axum router.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
