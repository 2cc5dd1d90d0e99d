mod schema;
mod sqlite_store;
mod trait_def;

pub use sqlite_store::{SqliteStore, StoreSession};
pub use trait_def::{EngagementLookup, EngagementStore, FullStore, TrackStore, UserStore};
