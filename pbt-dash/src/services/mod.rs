//! Ingestion, retrieval and admin flows
//!
//! Each flow is a plain async function over the database pool and the
//! dashboard configuration, so the HTTP handlers and the CLI share them.

pub mod admin;
pub mod ingest;
pub mod retrieval;
