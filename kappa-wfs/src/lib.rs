pub mod client;
pub mod error;
pub mod output;
pub mod pager;
pub mod reproject;
pub mod wkb;

pub use client::{FeatureSource, HttpFeatureSource};
pub use error::WfsError;
pub use pager::{fetch_all, FetchState, DEFAULT_BATCH_SIZE};
