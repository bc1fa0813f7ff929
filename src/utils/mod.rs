pub mod crypto;
pub mod messages;
pub mod time;
pub mod token;
pub mod validation;
