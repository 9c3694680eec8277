//! Test utilities and fixtures for Cinder
//!
//! Shared by the integration tests (tests/ directory) and benches of
//! `cinder-core`.

pub mod compile;
pub mod fixtures;
pub mod mocks;
