// ── Resource store ──
//
// Explicit state container: immutable snapshots, one pure reducer,
// push-based change notification.

mod reducer;
mod resource_store;
mod state;

pub use reducer::{reduce, reduce_resource};
pub use resource_store::{Store, StoreSubscription};
pub use state::{ResourceState, RootState};
