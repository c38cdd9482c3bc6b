pub mod client;
pub mod config;
pub mod error;
pub mod feature;
pub mod fetcher;
pub mod filter;
pub mod protocol;
pub mod request;
pub mod snapshot;

pub use client::*;
pub use config::*;
pub use error::*;
pub use feature::*;
pub use fetcher::*;
pub use filter::*;
pub use protocol::{FeatureBatch, Rejection, parse_feature_collection};
pub use request::*;
pub use snapshot::*;
