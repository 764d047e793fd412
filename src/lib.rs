pub use cache::Cache;
pub use client::{DiveMeetsClient, LivePoller};
pub use error::{DiveMeetsError, Result};
pub use task::{bounded, Outcome, LOAD_TIMEOUT};

pub mod cache;
pub mod client;
pub mod error;
pub mod model;
pub mod rating;
pub mod scraper;
pub mod task;
pub mod text;
