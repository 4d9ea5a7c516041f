//! AWS-oriented adapters and the Lambda entrypoint for the contact form.
//!
//! This crate owns runtime integration details (environment configuration,
//! Secrets Manager and Lambda invoke adapters, API Gateway event handling,
//! logging setup). Pipeline semantics live in `contact_form_core`.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod runtime;
pub mod telemetry;
