pub mod nesting;
pub mod origin;
pub mod universe;
