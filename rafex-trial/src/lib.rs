pub mod controller;
pub mod error;
pub mod input;
pub mod session;
pub use controller::TrialController;
pub use error::TrialError;
pub use input::{KeyDispatcher, KeyPress, KeyResponse, Keyboard, ListenerHandle, ListenerSpec};
pub use session::{Session, SessionRecord};
