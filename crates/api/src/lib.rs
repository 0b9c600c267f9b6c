pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod jobs;
pub mod middleware;
pub mod routes;
pub mod services;
