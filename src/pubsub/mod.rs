pub mod bus;
pub mod classify;
pub mod log;

pub use bus::{LimitHitBus, LimitHitListener, ListenerHandle};
pub use classify::classify_error;
pub use log::RecentLimitHits;
