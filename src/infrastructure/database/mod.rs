pub mod connection_pool;
pub mod rows;
pub mod sqlite_stores;

pub use connection_pool::ConnectionPool;
pub use sqlite_stores::SqliteRecordStore;
