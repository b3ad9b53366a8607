//! Normalized value types shared by every lookup provider, geocoder and
//! the enrichment passes.

pub mod contact;
pub mod record;
pub mod result;

pub use contact::*;
pub use record::*;
pub use result::*;
