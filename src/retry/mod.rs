//! Retry of transient remote failures.
//!
//! - `RetryPolicy`: fixed delay, optional attempt cap
//! - `RetryingInvoker`: applies a policy to one account's calls

mod invoker;
mod policy;

pub use invoker::RetryingInvoker;
pub use policy::RetryPolicy;
