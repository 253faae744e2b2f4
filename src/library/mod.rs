pub mod read_state;
pub mod subscriptions;

pub use read_state::ReadStateTracker;
pub use subscriptions::Subscriptions;
