//! Backend adapters producing normalized items.
//!
//! New backends can be added by implementing [`ItemSource`].

pub mod integration;
pub mod public;
pub mod server;

use std::future::Future;
use std::pin::Pin;

use records::Item;
use reqwest::Client;

use crate::{ApiSettings, CmsError, DataSourceKind};

pub use integration::IntegrationSource;
pub use public::PublicSource;
pub use server::ServerSource;

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A configured CMS backend.
///
/// Sources are built from [`ApiSettings`] only once every required setting
/// is present, so `fetch_items` never has to revalidate.
pub trait ItemSource: Send + Sync {
    fn kind(&self) -> DataSourceKind;

    /// Run one fetch cycle.
    ///
    /// Secondary resources (schema, assets) degrade to empty data on failure;
    /// an `Err` means the items themselves could not be obtained.
    fn fetch_items<'a>(&'a self, client: &'a Client) -> BoxFuture<'a, Result<Vec<Item>, CmsError>>;
}

/// Pick and validate the adapter named by `data_source_type`.
///
/// Nothing is fetched here; missing settings are logged and returned as
/// [`CmsError::MissingSettings`].
pub fn source_from_settings(settings: &ApiSettings) -> Result<Box<dyn ItemSource>, CmsError> {
    Ok(match settings.kind()? {
        DataSourceKind::Server => Box::new(ServerSource::from_settings(settings)?),
        DataSourceKind::Integration => Box::new(IntegrationSource::from_settings(settings)?),
        DataSourceKind::Public => Box::new(PublicSource::from_settings(settings)?),
    })
}
