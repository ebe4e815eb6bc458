//! HTTP surface: request/response types, routes, and the generate orchestrator

pub mod generate;
pub mod routes;
pub mod types;
