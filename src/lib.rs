//! Benefit Engine for employee schedules
//!
//! This crate detects conflicts between scheduled benefits (overlaps,
//! missing types and pending leave), validates benefits through their
//! lifecycle, and copies validated benefits into resource calendars.

#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod scheduling;
pub mod store;
