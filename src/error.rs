//! Error types for the route optimizer.

use std::time::Duration;
use thiserror::Error;

/// Errors returned by the optimization facade.
///
/// Infeasible stops are not errors: they are reported through
/// `OptimizationResult::unassigned_stops` and route warnings.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OptimizationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors raised by an external routing provider.
///
/// These never reach callers of `RouteOptimizer::get_route`; they select the
/// haversine fallback instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProviderError {
    #[error("routing provider is not configured")]
    NotConfigured,

    #[error("routing provider timed out after {0:?}")]
    Timeout(Duration),

    #[error("routing provider request failed: {0}")]
    Failed(String),

    #[error("routing provider worker disconnected")]
    Disconnected,
}
