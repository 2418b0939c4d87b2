pub mod adapters;
pub mod banner;
pub mod cmd;
pub mod engine;
pub mod entitlement;
pub mod events;
pub mod pubsub;
pub mod types;
pub mod utils;

pub use engine::PlanEngine;
