// Shared library of the bandmate service: domain model, persistence and auth

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod errors;
pub mod media;
pub mod models;
pub mod telemetry;
pub mod validation;
