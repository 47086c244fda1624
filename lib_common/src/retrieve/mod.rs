//! # Data Retrieval Module
//!
//! This module provides a centralized location for generic data retrieval
//! clients and utilities, primarily focused on HTTP-based interactions.
//!
//! ## Purpose:
//! The goal of the `retrieve` module is to offer a consistent and robust way
//! to fetch data from external services, encapsulating common concerns such
//! as HTTP request building, cache bypass, error classification, and retry
//! mechanisms. This prevents duplication of networking logic across the
//! roster services that sit on top of it.

/// Generic HTTP API client with cache bypass and retry middleware.
pub mod api_client;

pub use api_client::{ApiClient, FetchError};
