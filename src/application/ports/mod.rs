pub mod record_store;
pub mod remote_sink;
