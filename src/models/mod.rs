pub mod account;
pub mod candidacy;
pub mod enums;
pub mod listing;
pub mod organization;
