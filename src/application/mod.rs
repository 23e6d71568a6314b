//! Application layer containing the core business logic orchestration.
//!
//! This module defines the `RefundEngine`, the primary entry point for refund
//! eligibility checks, refund processing and the cancellation flow. It owns a
//! boxed storage port and ensures consistency by awaiting storage operations
//! for each item.

pub mod engine;
