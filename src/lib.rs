pub mod app;
pub mod core;
pub mod debug;
pub mod hive;
pub mod interaction;
pub mod rendering;

// Curated re-exports
pub use app::game::{GameplayBlocked, HivePlugin};
pub use core::config::{GameConfig, WindowConfig};
pub use hive::{HiveEvent, HiveProgress, HiveSession};
