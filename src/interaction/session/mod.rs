pub mod config_hot_reload;
pub mod session_keys;
