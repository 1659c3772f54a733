// CONTROLLER: input mapping and the per-window session
pub mod input;
pub mod session;

pub use input::{HeldKeys, InputEvent, KeyAction, KeyBindings};
pub use session::ViewerSession;
