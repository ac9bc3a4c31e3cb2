use crate::catalog::{Catalog, CatalogError};
use amplify_derive::Display;
use log::{error, info};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// An endless game never ends on its own, so only this many track identifiers are remembered.
const MAX_REMEMBERED_TRACKS: usize = 10_000;

#[derive(Error, Display, Debug)]
#[display(Debug)]
pub struct AuthenticationError(pub CatalogError);

/// Remembers the most recent identifiers, forgetting the oldest once full.
struct SeenTracks {
    ids: HashSet<String>,
    order: VecDeque<String>,
    capacity: usize,
}

impl SeenTracks {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: HashSet::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    fn insert(&mut self, track_id: &str) -> bool {
        if self.ids.contains(track_id) {
            return false;
        }

        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.ids.remove(&oldest);
            }
        }
        self.ids.insert(track_id.to_owned());
        self.order.push_back(track_id.to_owned());
        true
    }
}

/// State shared by everything talking to one catalog account: the outcome of the credential
/// exchange and the identifiers of the tracks already handed out. At most
/// `MAX_REMEMBERED_TRACKS` identifiers are kept, so a very long session may repeat a track it
/// has forgotten.
pub struct Session<C: Catalog> {
    catalog: C,
    authenticated: bool,
    seen_tracks: Mutex<SeenTracks>,
}

impl<C: Catalog> Session<C> {
    /// Authenticates against the catalog. A session whose authentication failed is still returned;
    /// it refuses every call that would need the token.
    pub async fn open(catalog: C) -> (Arc<Self>, Result<(), AuthenticationError>) {
        let authentication = catalog.authenticate().await.map_err(AuthenticationError);
        match &authentication {
            Ok(()) => info!("The catalog session is authenticated."),
            Err(error) => error!("Could not authenticate the catalog session: {error}"),
        }

        let session = Arc::new(Self {
            catalog,
            authenticated: authentication.is_ok(),
            seen_tracks: Mutex::new(SeenTracks::with_capacity(MAX_REMEMBERED_TRACKS)),
        });

        (session, authentication)
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Returns whether the identifier was new.
    pub(crate) async fn remember_track(&self, track_id: &str) -> bool {
        self.seen_tracks.lock().await.insert(track_id)
    }

    pub async fn has_seen_track(&self, track_id: &str) -> bool {
        self.seen_tracks.lock().await.ids.contains(track_id)
    }

    pub async fn seen_track_count(&self) -> usize {
        self.seen_tracks.lock().await.ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::FakeCatalog;

    #[tokio::test]
    async fn an_accepted_authentication_opens_an_authenticated_session() {
        let (session, authentication) = Session::open(FakeCatalog::new()).await;

        assert!(authentication.is_ok());
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn a_rejected_authentication_is_reported() {
        let (session, authentication) =
            Session::open(FakeCatalog::rejecting_authentication(401)).await;

        assert!(matches!(
            authentication,
            Err(AuthenticationError(CatalogError::Status(401)))
        ));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn remembers_each_track_once() {
        let (session, _) = Session::open(FakeCatalog::new()).await;

        assert!(session.remember_track("a").await);
        assert!(!session.remember_track("a").await);
        assert!(session.has_seen_track("a").await);
        assert!(!session.has_seen_track("b").await);
        assert_eq!(session.seen_track_count().await, 1);
    }

    #[test]
    fn the_oldest_tracks_are_forgotten_once_full() {
        let mut seen_tracks = SeenTracks::with_capacity(2);

        assert!(seen_tracks.insert("a"));
        assert!(seen_tracks.insert("b"));
        assert!(!seen_tracks.insert("a"));
        assert!(seen_tracks.insert("c"));

        assert_eq!(seen_tracks.ids.len(), 2);
        assert!(!seen_tracks.ids.contains("a"));
        assert!(seen_tracks.insert("a"));
        assert!(!seen_tracks.ids.contains("b"));
    }
}
