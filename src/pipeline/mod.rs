pub mod collector;
pub mod exporter;
pub mod reporter;
