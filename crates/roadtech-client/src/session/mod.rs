//! Session state and the controller that owns it.

mod controller;

pub use controller::{Session, SessionController};
