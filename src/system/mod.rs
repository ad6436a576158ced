pub mod arguments;
pub mod collector;
pub mod platform;
pub mod process;
pub mod snapshot;
