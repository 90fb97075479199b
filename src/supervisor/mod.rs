//! Fleet lifecycle: spawn a worker per account, present, shut down.
//!
//! - `Shutdown` / `ShutdownListener`: the cancellation signal every task races
//! - `Supervisor`: owns the run from credential loading to the final snapshot
//! - `check_credentials`: one-shot validation without starting the fleet

mod check;
mod fleet;
mod shutdown;

pub use check::{CheckVerdict, CredentialCheck, check_credentials};
pub use fleet::Supervisor;
pub use shutdown::{Shutdown, ShutdownListener};
