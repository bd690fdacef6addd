pub mod config;

pub use config::{
    BrushConfig, ConveyorConfig, GameConfig, GestureConfig, GestureMode, HiveConfig,
    LinearDragConfig, PlacementConfig, RemovalConfig, RotaryConfig, SessionConfig, SizeConfig,
    SlotConfig, SpawnRange, WindowConfig,
};
