//! # airtrack-server
//!
//! HTTP server library exposing the airodump-ng presence tracker.
//!
//! This library provides the API handlers and state management for airtrack.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod api;
pub mod logging;
pub mod state;
