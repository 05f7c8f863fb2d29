use std::error::Error;
use std::future::Future;
use std::pin::Pin;

use incinerator_client::{ApiClient, FetchError, TransportError};
use incinerator_types::{ItemId, Record};

/// Backend call future type alias.
pub type BackendFut<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// The two remote operations the pipeline needs.
///
/// Implementations are shared read-only across every dispatch unit of a run.
pub trait Backend: Send + Sync + 'static {
    type FetchError: Error + Send + Sync + 'static;
    type DispatchError: Error + Send + 'static;

    /// Read the whole item collection.
    fn fetch(&self) -> BackendFut<'_, Vec<Record>, Self::FetchError>;

    /// Incinerate a single item.
    fn dispatch<'a>(&'a self, id: &'a ItemId) -> BackendFut<'a, (), Self::DispatchError>;
}

impl Backend for ApiClient {
    type FetchError = FetchError;
    type DispatchError = TransportError;

    fn fetch(&self) -> BackendFut<'_, Vec<Record>, FetchError> {
        Box::pin(self.fetch_records())
    }

    fn dispatch<'a>(&'a self, id: &'a ItemId) -> BackendFut<'a, (), TransportError> {
        Box::pin(self.incinerate(id))
    }
}
