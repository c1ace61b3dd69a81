//! SoundCloud API client: typed searches over a background transport session

use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;

use super::cancel::CancelFlag;
use super::decode::typed_list;
use super::pipeline::{PendingQuery, QueryFuture};
use super::request::build_request;
use super::session::Session;
use super::transport::{HttpTransport, Transport};
use crate::config::Config;
use crate::error::Result;
use crate::model::{to_query_pairs, SearchKey, Track};
use crate::log_api_request;

/// Keeps HTTP and JSON handling away from whoever presents the results.
///
/// Every query runs on the client's own I/O thread and is delivered through a
/// [`QueryFuture`]; nothing here blocks the caller.
pub struct Client {
    config: Arc<Config>,
    transport: Arc<dyn Transport>,
    cancel: CancelFlag,
    session: Session,
}

impl Client {
    /// Client over the production HTTP transport
    pub fn new(config: Arc<Config>) -> Result<Self> {
        Self::with_transport(config, Arc::new(HttpTransport::new()?))
    }

    pub fn with_transport(config: Arc<Config>, transport: Arc<dyn Transport>) -> Result<Self> {
        let mut session = Session::new()?;
        session.start()?;

        tracing::info!(
            apiroot = %config.apiroot,
            authenticated = config.authenticated,
            "SoundCloud client started"
        );

        Ok(Self {
            config,
            transport,
            cancel: CancelFlag::new(),
            session,
        })
    }

    /// Search tracks. Parameter order is kept in the query string.
    pub fn search_tracks<I, V>(&self, parameters: I) -> QueryFuture<Vec<Track>>
    where
        I: IntoIterator<Item = (SearchKey, V)>,
        V: Into<String>,
    {
        let parameters = to_query_pairs(parameters);
        self.async_get("search_tracks", &["tracks.json"], &parameters, decode_tracks)
    }

    /// Abort every pending and future query of this client.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Issue a GET and decode its JSON body with `decode`.
    pub fn async_get<T, F>(
        &self,
        operation: &'static str,
        path: &[&str],
        parameters: &[(String, String)],
        decode: F,
    ) -> QueryFuture<T>
    where
        T: Send + 'static,
        F: FnOnce(&Value) -> Result<T> + Send + 'static,
    {
        let request = match build_request(&self.config, path, parameters) {
            Ok(request) => request,
            Err(err) => {
                tracing::error!(operation, error = %err, "Could not build request");
                return QueryFuture::failed(err);
            }
        };
        log_api_request!(operation, url = %request.url);

        let (pending, future) = PendingQuery::new(operation, decode, self.cancel.clone());
        let job = pending.run(Arc::clone(&self.transport), request).boxed();

        match self.session.submit(job) {
            Ok(()) => future,
            Err(err) => QueryFuture::failed(err),
        }
    }
}

fn decode_tracks(root: &Value) -> Result<Vec<Track>> {
    let tracks = typed_list::<Track>(Track::KIND, root)?;
    tracing::info!(count = tracks.len(), "Tracks decoded");
    Ok(tracks)
}

impl Drop for Client {
    fn drop(&mut self) {
        self.session.stop();
        tracing::info!(session = ?self.session.state(), "SoundCloud client stopped");
    }
}
