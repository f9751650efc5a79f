pub mod classification;
pub mod constructors;
pub mod conversions;
pub mod helpers;
pub mod types;

pub use constructors::*;
pub use helpers::{
    HeaderTooLarge, IncompleteMessage, InvalidContentLength, MalformedHead, NoAddresses,
    TrailersUnsupported,
};
pub use types::{Error, Inner, Kind, Result};

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;
