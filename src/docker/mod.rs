pub mod command;
pub mod options;
pub mod registry;
pub mod suggest;
