//! HTTP route handlers.

pub mod gateways;
pub mod health;
pub mod plans;
pub mod regions;
