//! Utility functions for code generation, URL processing, and request handling.
//!
//! This module provides helper functions used across the application:
//!
//! - [`code_generator`] - Short code derivation and alias validation
//! - [`url_normalizer`] - Long URL validation and destination normalization
//! - [`client_ip`] - Client address extraction from forwarding headers
//! - [`timestamp`] - Expiration timestamp parsing

pub mod client_ip;
pub mod code_generator;
pub mod timestamp;
pub mod url_normalizer;
