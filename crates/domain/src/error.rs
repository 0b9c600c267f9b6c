//! Domain error types.

use thiserror::Error;

/// A lookup against the active snapshot missed.
///
/// Always recoverable by the caller. Resolvers never fall back to a default
/// plan or gateway when one of these is returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("Plan not found: {0}")]
    PlanNotFound(String),

    #[error("Storefront product not mapped: {0}")]
    StorefrontProductNotFound(String),

    #[error("Gateway not found: {0}")]
    GatewayNotFound(String),
}

/// The catalog snapshot violates an integrity rule.
///
/// Fatal at startup. On reload the previous snapshot stays active.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Catalog defines no plans")]
    EmptyPlanTable,

    #[error("Invalid plan code: {0:?}")]
    InvalidPlanCode(String),

    #[error("Plan {plan} has invalid session count limit {value}")]
    InvalidSessionLimit { plan: String, value: i64 },

    #[error("Plan {plan} has negative price {value}")]
    NegativePrice { plan: String, value: i64 },

    #[error("Storefront product {product} maps to unknown plan {plan}")]
    UnknownStorefrontPlan { product: String, plan: String },

    #[error("Invalid continent code: {0:?}")]
    InvalidContinentCode(String),

    #[error("Continent {continent} maps to unrecognized region {region}")]
    UnknownRegion { continent: String, region: String },

    #[error("Default region {0} is not a recognized region")]
    UnknownDefaultRegion(String),

    #[error("Default continent code {0} is not a recognized continent")]
    UnknownDefaultContinent(String),

    #[error("Gateway id {0:?} is defined more than once")]
    DuplicateGateway(String),

    #[error("Gateway {gateway} is assigned to unrecognized continent {continent}")]
    UnknownGatewayContinent { gateway: String, continent: String },

    #[error("Gateway {gateway} references unknown fixture {fixture}")]
    UnknownFixture { gateway: String, fixture: String },

    #[error("Fixture {fixture} has an invalid integrity hash: {reason}")]
    InvalidIntegrityHash { fixture: String, reason: String },

    #[error("Invalid allowed host: {0:?}")]
    InvalidHost(String),
}
