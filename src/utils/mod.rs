pub mod clipboard;
pub mod logger;
pub mod paths;
