//! Host-side extensions and their UI panels.
//!
//! The host talks to each extension through [`HostBridge`]; extensions and
//! their panels exchange `{action, payload}` messages. [`LocalHost`] runs the
//! whole exchange in process.

pub mod error;
pub mod host;
pub mod inspector;
pub mod message;
pub mod panel;
pub mod runtime;
pub mod visualizer;

#[cfg(test)]
mod test_support;

pub use error::*;
pub use host::*;
pub use inspector::*;
pub use message::*;
pub use panel::*;
pub use runtime::*;
pub use visualizer::*;
