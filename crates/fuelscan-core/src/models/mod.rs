//! Data models for the fuelscan pipeline.

pub mod config;
pub mod receipt;
