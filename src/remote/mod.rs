//! Remote rewards API access.
//!
//! - `RemoteClient`: one account's session, one method per upstream action
//! - `Outcome`: the four-way classification every call resolves to
//! - `HttpRemoteClient`, `HttpClientFactory`: reqwest-backed sessions
//! - `classify`: status/body interpretation shared by all transports

pub mod classify;
mod client;
mod http;
mod outcome;

pub use client::{ClientFactory, RemoteClient};
pub use http::{HttpClientFactory, HttpRemoteClient};
pub use outcome::{FailureKind, Mission, Outcome};
