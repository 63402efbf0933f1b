pub mod http;
pub mod mcp;
pub mod stdio;
