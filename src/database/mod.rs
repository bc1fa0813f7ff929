pub mod catalog;
pub mod filter;
pub mod list_query;
pub mod pool;
