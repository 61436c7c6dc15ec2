pub mod entry;
pub mod migrate;
pub mod persist;
pub mod settings;
pub mod store;
