//! CMS data acquisition: paginated fetching, schema and asset resolution,
//! item normalization, value filters and the three backend adapters.

pub mod assets;
pub mod error;
pub mod filter;
pub mod http;
pub mod normalize;
pub mod paginate;
pub mod schema;
pub mod settings;
pub mod sources;

#[cfg(test)]
mod test_support;

pub use assets::*;
pub use error::*;
pub use filter::*;
pub use normalize::*;
pub use paginate::*;
pub use schema::*;
pub use settings::*;
pub use sources::*;
