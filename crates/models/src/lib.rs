//! Domain records shared by the service and HTTP layers.

pub mod errors;
pub mod user;

pub use user::{User, UserInput, ValidUserInput};
