pub mod browse;
pub mod catalog;
pub mod env;
pub mod log;
pub mod model;
pub mod search;
pub mod session;
pub mod supplier;

use amplify_derive::Display;
use thiserror::Error;

pub use browse::{artist_catalog, ArtistCatalog, BrowseError};
pub use catalog::{Catalog, CatalogError, SpotifyCatalog};
pub use model::{Album, AlbumSummary, AlbumTrack, ArtistCandidate, TrackRecord};
pub use search::{rank, search_artists};
pub use session::{AuthenticationError, Session};
pub use supplier::{FetchError, Settings, TrackSupplier};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// An endless game opens with this many random tracks.
const ENDLESS_MODE_STARTING_TRACK_COUNT: usize = 3;

#[derive(Error, Display, Debug)]
#[display(Debug)]
pub enum RunError {
    Authentication(AuthenticationError),
    Fetch(FetchError),
}

impl From<AuthenticationError> for RunError {
    fn from(authentication_error: AuthenticationError) -> Self {
        Self::Authentication(authentication_error)
    }
}

impl From<FetchError> for RunError {
    fn from(fetch_error: FetchError) -> Self {
        Self::Fetch(fetch_error)
    }
}

/// Connects to the catalog and draws the starting tracks of an endless game.
pub async fn run<C: Catalog + 'static>(
    catalog: C,
    settings: Settings,
) -> Result<Vec<TrackRecord>, RunError> {
    let (supplier, authentication) = TrackSupplier::connect(catalog, settings).await;

    let tracks = match authentication {
        Err(error) => Err(error.into()),
        Ok(()) => supplier
            .request_tracks(ENDLESS_MODE_STARTING_TRACK_COUNT)
            .await
            .map_err(RunError::from),
    };
    supplier.shutdown().await;

    tracks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::FakeCatalog;

    #[tokio::test]
    async fn an_endless_game_starts_with_three_tracks() {
        let tracks = run(FakeCatalog::new(), Settings::default()).await.unwrap();

        assert_eq!(tracks.len(), ENDLESS_MODE_STARTING_TRACK_COUNT);
    }

    #[tokio::test]
    async fn a_rejected_authentication_fails_the_run() {
        let result = run(FakeCatalog::rejecting_authentication(401), Settings::default()).await;

        assert!(matches!(
            result,
            Err(RunError::Authentication(AuthenticationError(
                CatalogError::Status(401)
            )))
        ));
    }
}
