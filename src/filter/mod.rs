pub mod error;
pub mod filter;
pub mod filter_order;
pub mod types;

pub use filter::Filter;
pub use types::*;
