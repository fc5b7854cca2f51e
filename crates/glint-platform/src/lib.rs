//! Windowing and input handling.

pub mod input;
pub mod window;

pub use input::InputState;
pub use window::{Surface, Window};

pub use winit::keyboard::KeyCode;
