pub mod auth;
pub mod cors;
pub mod funnel;
pub mod validate;
