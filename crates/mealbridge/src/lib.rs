//! Core library for the MealBridge donation-redistribution service.
//!
//! The interesting part lives in [`lifecycle`]: the forward-only state machine
//! that moves a donation or request from intake through matching, warehousing,
//! and delivery, together with the admin claim bookkeeping those transitions
//! trigger. Everything else here is the ambient plumbing the HTTP service
//! needs: configuration, telemetry, and the top-level error type.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod telemetry;
