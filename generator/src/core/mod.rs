//! Generator core business logic

pub mod dedup;
pub mod discoveries;
pub mod limiter;
pub mod oracle;
pub mod pairs;
pub mod pipeline;

pub use dedup::DedupFilter;
pub use discoveries::DiscoveryAggregator;
pub use limiter::RateLimiter;
pub use oracle::RateLimitedOracle;
pub use pairs::PairEnumerator;
pub use pipeline::{Generator, GeneratorBuilder};
