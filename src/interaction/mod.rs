pub mod brush;
pub mod gesture;
pub mod input;
pub mod session;
