pub mod hook;
pub mod phase;
pub mod sandbox;
pub mod session;
pub mod validate;
