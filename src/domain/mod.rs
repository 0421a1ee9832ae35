//! Domain layer: the user aggregate and its persistence port.

pub mod user;

pub use user::*;
