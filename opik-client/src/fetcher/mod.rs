//! The request executor and the descriptors it runs.

mod descriptor;
mod executor;
mod retry;

pub use descriptor::{RequestDescriptor, RequestDescriptorBuilder};
pub use executor::{Fetcher, RawResponse};
pub use retry::{
    INITIAL_RETRY_DELAY, MAX_RETRY_DELAY, RETRY_MULTIPLIER, RetryPolicy, parse_retry_after,
};
