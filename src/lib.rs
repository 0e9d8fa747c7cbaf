//! LifeDash Library
//!
//! Academics, productivity and vitality tracking served over MCP.

pub mod build_info;
pub mod catalog;
pub mod config;
pub mod db;
pub mod mcp;
pub mod metrics;
pub mod models;
pub mod tools;
