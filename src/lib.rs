//! WorkTrack time-accounting engine
//!
//! This crate reconciles employees' planned shifts against their reported
//! attendance and rolls the result up into monthly working-hour balances:
//! worked hours against the working-day fund, plus weekend, holiday and night
//! hours split at calendar-day boundaries.

#![warn(missing_docs)]

pub mod calculation;
pub mod calendar;
pub mod config;
pub mod error;
pub mod models;
pub mod reconciliation;
pub mod repository;
