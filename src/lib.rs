//! Phone Check API Library
//!
//! A thin HTTP facade over a telecom-intelligence provider: it normalizes
//! phone numbers, classifies the provider's carrier lookup into a flat
//! accept/reject verdict, and passes one-time passcode verification through.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core business logic.
//! - `integrations`: External service integrations.
//! - `classifier`: Phone validity rule table and policies.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: HTTP request/response models.
//! - `normalizer`: Local phone number normalization.
//! - `openapi`: OpenAPI document and Swagger UI.
//! - `provider_client`: Lookup and Verify API client.
//! - `provider_models`: Provider wire models.
//! - `router`: Route table and app assembly.
//! - `verification`: One-time passcode sessions.

pub mod api;
pub mod core;
pub mod integrations;

pub mod classifier;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod normalizer;
pub mod openapi;
pub mod provider_client;
pub mod provider_models;
pub mod router;
pub mod verification;
