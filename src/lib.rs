//! Google MCP Server Library
//!
//! A Model Context Protocol (MCP) server for Gmail and Google Calendar.
//! Provides tools for sending and drafting emails and managing calendar
//! events through the Google APIs.

pub mod config;
pub mod error;
pub mod google;
pub mod mcp;

pub use config::Config;
pub use error::{GoogleMcpError, Result};
