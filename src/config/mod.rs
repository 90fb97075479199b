//! Configuration types and loading.
//!
//! - `FleetConfig`: top-level configuration with validation
//! - Section configs for workers, retries, the remote API, presentation,
//!   notifications and the supervisor

mod settings;

pub use settings::{
    AuthFailurePolicy, DEFAULT_BASE_URL, DEFAULT_CONFIG_FILE, DEFAULT_PING_URL, FleetConfig, NotificationConfig,
    PresenterConfig, RemoteConfig, RetryConfig, SupervisorConfig, WorkerConfig,
};
