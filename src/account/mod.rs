//! Accounts and where they come from.
//!
//! - `Account`: one credential plus its assigned proxy route
//! - `assign_proxy`, `build_accounts`: round-robin route assignment
//! - `CredentialSource`: loads credential and proxy lists (`FileSource`,
//!   `StaticSource`)

mod source;
mod types;

pub use source::{CredentialSource, FileSource, StaticSource, normalize_proxy};
pub use types::{Account, assign_proxy, build_accounts, mask_proxy_password};
