pub mod account_service;
pub mod candidacy_service;
pub mod listing_service;
pub mod mail_service;
pub mod organization_service;
pub mod storage_service;
pub mod token_service;
