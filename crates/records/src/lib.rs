//! Normalized CMS record model shared by the fetch pipeline, the GeoJSON
//! projector and the host extensions.

pub mod asset;
pub mod field;
pub mod item;
pub mod value;

pub use asset::*;
pub use field::*;
pub use item::*;
pub use value::*;
