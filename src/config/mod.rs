mod generation;
mod manager;

pub use generation::{Configuration, PartialConfiguration};
pub use manager::ConfigManager;
