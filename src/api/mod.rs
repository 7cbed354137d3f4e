pub mod client;
pub mod error;
pub mod records;

pub use error::{FetchError, LoadState};
