//! Error types for the routing engine
//!
//! None of these reach callers of the public routing functions: the engine logs
//! them and degrades to a simpler connector.

use thiserror::Error;

use super::types::Point;

/// Which end of a connector a failure concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Start => write!(f, "start"),
            Endpoint::End => write!(f, "end"),
        }
    }
}

/// Errors that can occur inside a routing call
#[derive(Debug, Error, PartialEq)]
pub enum RoutingError {
    /// Obstacle geometry that cannot be routed around
    #[error("invalid obstacle '{id}': {reason}")]
    InvalidObstacle { id: String, reason: String },

    /// An anchor point that is not a finite coordinate
    #[error("invalid {endpoint} point ({}, {})", point.x, point.y)]
    InvalidPoint { endpoint: Endpoint, point: Point },

    /// A nudge node could not be joined to the visibility graph
    #[error("{endpoint} point could not be connected to the visibility graph")]
    DisconnectedEndpoint { endpoint: Endpoint },

    /// The open set ran dry before reaching the end
    #[error("no path found after {iterations} iterations")]
    NoPath { iterations: usize },

    /// The search hit its expansion cap
    #[error("search exceeded the iteration limit of {limit}")]
    IterationLimit { limit: usize },
}

impl RoutingError {
    /// Create an invalid obstacle error
    pub fn invalid_obstacle(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidObstacle {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create a disconnected endpoint error
    pub fn disconnected(endpoint: Endpoint) -> Self {
        Self::DisconnectedEndpoint { endpoint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_obstacle_display() {
        let err = RoutingError::invalid_obstacle("box", "width is negative");
        assert_eq!(err.to_string(), "invalid obstacle 'box': width is negative");
    }

    #[test]
    fn test_disconnected_display() {
        let err = RoutingError::disconnected(Endpoint::End);
        assert!(err.to_string().starts_with("end point"));
    }

    #[test]
    fn test_iteration_limit_display() {
        let err = RoutingError::IterationLimit { limit: 10 };
        assert!(err.to_string().contains("10"));
    }
}
