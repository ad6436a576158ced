pub mod aggregate;
pub mod builder;
pub mod identifier;
pub mod metrics;
pub mod model;
pub mod render;
