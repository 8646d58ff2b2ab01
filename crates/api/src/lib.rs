//! `pipecrm-api` — HTTP surface: routing, middleware and request mapping.

pub mod app;
pub mod csv;
pub mod middleware;
pub mod ports;
