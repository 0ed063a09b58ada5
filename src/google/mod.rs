//! Google API integration
//!
//! Authentication plus the Gmail and Calendar clients and their payload
//! builders.

pub mod auth;
pub mod calendar;
pub mod gmail;
pub mod mail;
pub mod types;
