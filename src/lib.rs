//! Email Research API Library
//!
//! This library provides the core functionality for the Email Research API:
//! fetching unread mail from a single mailbox, extracting candidate company
//! names, researching each company via search and language-model
//! collaborators, scoring credibility, and serving cached reports over HTTP.
//!
//! # Modules
//!
//! - `cache_validator`: Checksum validation for cached search responses.
//! - `circuit_breaker`: Circuit breaker for the research pipeline.
//! - `config`: Configuration management.
//! - `credibility`: Credibility scoring from estimated business metrics.
//! - `errors`: Error handling types.
//! - `extract`: Candidate company-name extraction.
//! - `handlers`: HTTP request handlers.
//! - `mailbox`: IMAP mailbox collaborator.
//! - `models`: Core data models.
//! - `prompts`: Language-model prompt builders.
//! - `render`: Markdown report rendering.
//! - `report_store`: Process-lifetime report store.
//! - `research`: Research orchestration.
//! - `services`: External service clients (search, language model).

pub mod cache_validator;
pub mod circuit_breaker;
pub mod config;
pub mod credibility;
pub mod errors;
pub mod extract;
pub mod handlers;
pub mod mailbox;
pub mod models;
pub mod prompts;
pub mod render;
pub mod report_store;
pub mod research;
pub mod services;
