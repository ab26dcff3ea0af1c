//! Inkwell application library
//!
//! Application modules plus the bootstrap that wires them to the database
//! and the HTTP server.

#![recursion_limit = "256"]

pub mod bootstrap;
pub mod modules;

pub use modules::posts;
