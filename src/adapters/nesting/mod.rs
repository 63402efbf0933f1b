//! Nesting detection from binary type names

mod jvm;

pub use jvm::JvmNestingDetector;
