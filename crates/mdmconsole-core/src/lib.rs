// mdmconsole-core: Resource store and dispatcher between mdmconsole-api and consumers (CLI).

pub mod action;
pub mod config;
pub mod console;
pub mod error;
pub mod model;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use action::{Action, ActionPhase};
pub use config::{ConsoleConfig, TlsVerification};
pub use console::{Console, Outcome, settle};
pub use error::CoreError;
pub use store::{ResourceState, RootState, Store, StoreSubscription, reduce};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Certificate, DepAccount, DepProfile, Device, DeviceGroup, Entity, KeyUsage, ResourceAttributes,
    ScepConfiguration, Tag,
};
