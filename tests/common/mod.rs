//! Shared test utilities for integration tests.
#![allow(dead_code)]

pub mod fixtures;
pub mod mock;
