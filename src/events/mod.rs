pub mod feed;
pub mod fire_state;
pub mod redis_feed;
pub mod watcher;

pub use feed::{FeedError, JobFeed, MemoryJobFeed, SessionStream};
pub use fire_state::FireState;
pub use redis_feed::RedisJobFeed;
pub use watcher::{AnalysisSessionWatcher, WatchHandle};
