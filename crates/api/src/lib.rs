//! HTTP API: configuration, request gate, routing and response mapping.

pub mod app;
pub mod config;
pub mod gate;
pub mod middleware;
