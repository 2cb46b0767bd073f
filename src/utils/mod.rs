/// Utilities module - platform detection
pub mod platform;

pub use platform::{Platform, detect_platform, user_agent};
