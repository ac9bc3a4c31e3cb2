use crate::model::{AlbumSummary, AlbumTrack, ArtistCandidate, TrackRecord};
use amplify_derive::Display;
use async_trait::async_trait;
use thiserror::Error;

pub(crate) mod spotify;
#[cfg(test)]
pub(crate) mod testing;

pub use spotify::SpotifyCatalog;

#[derive(Error, Display, Debug)]
#[display(Debug)]
pub enum CatalogError {
    /// The API answered with a non-success HTTP status.
    Status(u16),
    Transport(anyhow::Error),
    /// A field the decoding needs is missing from the response.
    MalformedPayload(&'static str),
}

/// The remote music metadata API.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Exchanges the client credentials for a bearer token used by every other call.
    async fn authenticate(&self) -> Result<(), CatalogError>;

    async fn search_tracks(
        &self,
        query: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<TrackRecord>, CatalogError>;

    async fn search_artists(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<ArtistCandidate>, CatalogError>;

    async fn artist(&self, artist_id: &str) -> Result<ArtistCandidate, CatalogError>;

    /// Albums and singles, plus appearances and compilations when `include_all_albums` is set.
    async fn artist_albums(
        &self,
        artist_id: &str,
        include_all_albums: bool,
    ) -> Result<Vec<AlbumSummary>, CatalogError>;

    async fn album_tracks(&self, album_id: &str) -> Result<Vec<AlbumTrack>, CatalogError>;
}
