pub mod account;
pub mod cli;
pub mod config;
pub mod error;
pub mod notification;
pub mod presenter;
pub mod remote;
pub mod retry;
pub mod status;
pub mod supervisor;
pub mod utils;
pub mod worker;

pub use account::{Account, CredentialSource, FileSource, StaticSource, assign_proxy};
pub use config::{AuthFailurePolicy, FleetConfig};
pub use error::{Cancelled, FleetError, Result};
pub use notification::{AlertSink, FleetEvent, Notifier};
pub use presenter::Presenter;
pub use remote::{ClientFactory, FailureKind, Mission, Outcome, RemoteClient};
pub use retry::{RetryPolicy, RetryingInvoker};
pub use status::{BoardSnapshot, FleetSummary, StatusBoard, StatusRecord};
pub use supervisor::{Shutdown, ShutdownListener, Supervisor};
pub use worker::AccountWorker;
