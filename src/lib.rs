//! plantarch library: relation inference over a type universe and PlantUML rendering of
//! class, entity-relationship and sequence diagrams.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod domain;
pub mod server;
