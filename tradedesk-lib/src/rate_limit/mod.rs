//! Retry policy for transient backend failures.

mod retry;

pub use retry::RetryConfig;
