pub mod camera;
pub mod gizmos;
pub mod hud;
