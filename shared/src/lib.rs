//! Shared domain types for the condotel booking platform
//!
//! This crate holds everything the service crates agree on:
//! - [`error`]: unified error codes, `AppError`, and the API response envelope
//! - [`models`]: domain entities (bookings, refund requests, catalog lookups)
//! - [`util`]: small time helpers

pub mod error;
pub mod models;
pub mod util;
