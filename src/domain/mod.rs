pub mod container;
pub mod diagram;
pub mod erm;
pub mod graph;
pub mod inference;
pub mod model;
pub mod ports;
pub mod recorder;
pub mod relation;
pub mod render;
pub mod type_registry;
