pub mod config;
pub mod error;
pub mod listing;
pub mod storage;
pub mod utils;

pub use error::{ListingError, Result};
pub use listing::{ListingService, ListingView};
