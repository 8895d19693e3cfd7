//! aiswitch console: operator CLI and web dashboard for the aiswitch model
//! gateway backend.

pub mod analytics;
pub mod backend;
pub mod cli;
pub mod config;
pub mod web;
