//! Type universe sources

mod json;

pub use json::JsonUniverseSource;
