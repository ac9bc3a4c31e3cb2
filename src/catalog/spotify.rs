use crate::catalog::{Catalog, CatalogError};
use crate::model::{
    format_duration, release_year, AlbumSummary, AlbumTrack, ArtistCandidate, TrackRecord,
};
use async_trait::async_trait;
use futures::TryStreamExt;
use rspotify::clients::BaseClient;
use rspotify::http::HttpError;
use rspotify::model::{
    AlbumId, AlbumType, ArtistId, FullArtist, FullTrack, Id, SearchResult, SearchType,
    SimplifiedAlbum, SimplifiedTrack,
};
use rspotify::{ClientCredsSpotify, ClientError};

/// The Spotify Web API, authenticated with the client credentials flow.
pub struct SpotifyCatalog {
    spotify_client: ClientCredsSpotify,
}

impl SpotifyCatalog {
    const ALBUM_GROUPS: [AlbumType; 2] = [AlbumType::Album, AlbumType::Single];
    const ALL_ALBUM_GROUPS: [AlbumType; 4] = [
        AlbumType::Album,
        AlbumType::Single,
        AlbumType::AppearsOn,
        AlbumType::Compilation,
    ];

    pub fn new(credentials: rspotify::Credentials) -> Self {
        Self {
            spotify_client: ClientCredsSpotify::new(credentials),
        }
    }
}

#[async_trait]
impl Catalog for SpotifyCatalog {
    async fn authenticate(&self) -> Result<(), CatalogError> {
        Ok(self.spotify_client.request_token().await?)
    }

    async fn search_tracks(
        &self,
        query: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<TrackRecord>, CatalogError> {
        let result = self
            .spotify_client
            .search(
                query,
                SearchType::Track,
                None,
                None,
                Some(limit),
                Some(offset),
            )
            .await?;

        match result {
            SearchResult::Tracks(page) => page
                .items
                .into_iter()
                .map(TrackRecord::try_from)
                .collect(),
            _ => Err(CatalogError::MalformedPayload("tracks")),
        }
    }

    async fn search_artists(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<ArtistCandidate>, CatalogError> {
        let result = self
            .spotify_client
            .search(query, SearchType::Artist, None, None, Some(limit), None)
            .await?;

        match result {
            SearchResult::Artists(page) => Ok(page.items.into_iter().map(Into::into).collect()),
            _ => Err(CatalogError::MalformedPayload("artists")),
        }
    }

    async fn artist(&self, artist_id: &str) -> Result<ArtistCandidate, CatalogError> {
        let id = ArtistId::from_id(artist_id)
            .map_err(|_| CatalogError::MalformedPayload("artist id"))?;

        Ok(self.spotify_client.artist(id).await?.into())
    }

    async fn artist_albums(
        &self,
        artist_id: &str,
        include_all_albums: bool,
    ) -> Result<Vec<AlbumSummary>, CatalogError> {
        let id = ArtistId::from_id(artist_id)
            .map_err(|_| CatalogError::MalformedPayload("artist id"))?;

        let albums = match include_all_albums {
            false => {
                self.spotify_client
                    .artist_albums(id, Self::ALBUM_GROUPS, None)
                    .try_collect::<Vec<_>>()
                    .await?
            }
            true => {
                self.spotify_client
                    .artist_albums(id, Self::ALL_ALBUM_GROUPS, None)
                    .try_collect::<Vec<_>>()
                    .await?
            }
        };

        albums.into_iter().map(AlbumSummary::try_from).collect()
    }

    async fn album_tracks(&self, album_id: &str) -> Result<Vec<AlbumTrack>, CatalogError> {
        let id =
            AlbumId::from_id(album_id).map_err(|_| CatalogError::MalformedPayload("album id"))?;

        let tracks = self
            .spotify_client
            .album_track(id, None)
            .try_collect::<Vec<_>>()
            .await?;

        tracks.into_iter().map(AlbumTrack::try_from).collect()
    }
}

impl From<ClientError> for CatalogError {
    fn from(client_error: ClientError) -> Self {
        // TODO: Use an if-let chain once the crate moves to the 2024 edition.
        if let ClientError::Http(error) = &client_error {
            if let HttpError::StatusCode(response) = error.as_ref() {
                return Self::Status(response.status().as_u16());
            }
        }

        Self::Transport(client_error.into())
    }
}

impl TryFrom<FullTrack> for TrackRecord {
    type Error = CatalogError;

    fn try_from(track: FullTrack) -> Result<Self, Self::Error> {
        let id = track.id.ok_or(CatalogError::MalformedPayload("track id"))?;
        if track.name.is_empty() {
            return Err(CatalogError::MalformedPayload("track name"));
        }
        let artist_name = track
            .artists
            .into_iter()
            .next()
            .map(|artist| artist.name)
            .ok_or(CatalogError::MalformedPayload("track artists"))?;

        Ok(Self::new(
            id.id().to_owned(),
            track.name,
            artist_name,
            track.album.name,
            release_year(track.album.release_date.as_deref()),
            format_duration(u64::try_from(track.duration.num_milliseconds()).unwrap_or(0)),
            track.album.images.into_iter().next().map(|image| image.url),
        ))
    }
}

impl From<FullArtist> for ArtistCandidate {
    fn from(artist: FullArtist) -> Self {
        Self::new(artist.id.id(), artist.name, artist.popularity)
    }
}

impl TryFrom<SimplifiedAlbum> for AlbumSummary {
    type Error = CatalogError;

    fn try_from(album: SimplifiedAlbum) -> Result<Self, Self::Error> {
        Ok(Self {
            id: album
                .id
                .ok_or(CatalogError::MalformedPayload("album id"))?
                .id()
                .to_owned(),
            name: album.name,
            release_year: release_year(album.release_date.as_deref()),
            cover_url: album.images.into_iter().next().map(|image| image.url),
        })
    }
}

impl TryFrom<SimplifiedTrack> for AlbumTrack {
    type Error = CatalogError;

    fn try_from(track: SimplifiedTrack) -> Result<Self, Self::Error> {
        Ok(Self {
            id: track
                .id
                .ok_or(CatalogError::MalformedPayload("track id"))?
                .id()
                .to_owned(),
            name: track.name,
            duration: format_duration(
                u64::try_from(track.duration.num_milliseconds()).unwrap_or(0),
            ),
        })
    }
}
