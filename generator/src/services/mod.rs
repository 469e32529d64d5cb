//! Generator services implementations

pub mod http_oracle;
pub mod memory_store;

#[cfg(test)]
pub mod tests;

pub use http_oracle::*;
pub use memory_store::*;
