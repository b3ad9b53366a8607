//! Lookup vendors and geocoders behind capability traits, plus the
//! registry that builds them from configuration.

pub mod error;
pub mod geocoder;
pub mod mock;
pub mod pacificeast;
pub mod registry;
pub mod traits;
pub mod whitepages;
pub mod xml;

pub use error::*;
pub use geocoder::{GoogleGeocoder, GoogleGeocoderConfig, MockGeocoder};
pub use mock::{MockVendor, MockVendorConfig};
pub use pacificeast::{PacificEast, PacificEastConfig, PacificEastEnv, QueryMode};
pub use registry::*;
pub use traits::*;
pub use whitepages::{WhitePages, WhitePagesConfig};
