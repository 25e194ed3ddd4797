//! HTTP transport for the caregiving severity forecaster

pub mod api;
pub mod config;
