use crate::catalog::{Catalog, CatalogError};
use crate::model::{AlbumSummary, AlbumTrack, ArtistCandidate, TrackRecord};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub(crate) fn track(id: &str) -> TrackRecord {
    TrackRecord::new(
        id.to_owned(),
        format!("Track {id}"),
        "Artist".to_owned(),
        "Album".to_owned(),
        "2001".to_owned(),
        "3:30".to_owned(),
        None,
    )
}

pub(crate) enum TrackResponse {
    Track(TrackRecord),
    NoResults,
    Failure(CatalogError),
    Panic,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TrackSearch {
    pub(crate) query: String,
    pub(crate) limit: u32,
    pub(crate) offset: u32,
}

/// Replays queued responses and records every call. Once the track responses run out, every
/// search yields a new track with a unique identifier.
#[derive(Default)]
pub(crate) struct FakeCatalog {
    authentication_status: Option<u16>,
    track_responses: Mutex<VecDeque<TrackResponse>>,
    generated_track_count: AtomicUsize,
    track_searches: Mutex<Vec<TrackSearch>>,
    artist_candidates: Vec<ArtistCandidate>,
    artist_searches: Mutex<Vec<(String, u32)>>,
    artist: Option<ArtistCandidate>,
    albums: Vec<AlbumSummary>,
    appearances: Vec<AlbumSummary>,
    album_tracks: HashMap<String, Vec<AlbumTrack>>,
}

impl FakeCatalog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn rejecting_authentication(status: u16) -> Self {
        Self {
            authentication_status: Some(status),
            ..Self::default()
        }
    }

    pub(crate) fn with_track_responses(
        self,
        track_responses: impl IntoIterator<Item = TrackResponse>,
    ) -> Self {
        self.track_responses
            .lock()
            .unwrap()
            .extend(track_responses);
        self
    }

    pub(crate) fn with_artist_candidates(
        mut self,
        artist_candidates: Vec<ArtistCandidate>,
    ) -> Self {
        self.artist_candidates = artist_candidates;
        self
    }

    pub(crate) fn with_artist(
        mut self,
        artist: ArtistCandidate,
        albums: Vec<(AlbumSummary, Vec<AlbumTrack>)>,
    ) -> Self {
        self.artist = Some(artist);
        for (summary, tracks) in albums {
            self.album_tracks.insert(summary.id.clone(), tracks);
            self.albums.push(summary);
        }
        self
    }

    /// Releases listed only when all albums are requested.
    pub(crate) fn with_appearances(
        mut self,
        appearances: Vec<(AlbumSummary, Vec<AlbumTrack>)>,
    ) -> Self {
        for (summary, tracks) in appearances {
            self.album_tracks.insert(summary.id.clone(), tracks);
            self.appearances.push(summary);
        }
        self
    }

    pub(crate) fn track_searches(&self) -> Vec<TrackSearch> {
        self.track_searches.lock().unwrap().clone()
    }

    pub(crate) fn artist_searches(&self) -> Vec<(String, u32)> {
        self.artist_searches.lock().unwrap().clone()
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn authenticate(&self) -> Result<(), CatalogError> {
        match self.authentication_status {
            None => Ok(()),
            Some(status) => Err(CatalogError::Status(status)),
        }
    }

    async fn search_tracks(
        &self,
        query: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<TrackRecord>, CatalogError> {
        self.track_searches.lock().unwrap().push(TrackSearch {
            query: query.to_owned(),
            limit,
            offset,
        });

        let response = self.track_responses.lock().unwrap().pop_front();
        match response {
            Some(TrackResponse::Track(track)) => Ok(vec![track]),
            Some(TrackResponse::NoResults) => Ok(Vec::new()),
            Some(TrackResponse::Failure(error)) => Err(error),
            Some(TrackResponse::Panic) => panic!("scripted catalog panic"),
            None => {
                let index = self.generated_track_count.fetch_add(1, Ordering::SeqCst);
                Ok(vec![track(&format!("generated-{index}"))])
            }
        }
    }

    async fn search_artists(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<ArtistCandidate>, CatalogError> {
        self.artist_searches
            .lock()
            .unwrap()
            .push((query.to_owned(), limit));
        Ok(self.artist_candidates.clone())
    }

    async fn artist(&self, artist_id: &str) -> Result<ArtistCandidate, CatalogError> {
        self.artist
            .clone()
            .filter(|artist| artist.id == artist_id)
            .ok_or(CatalogError::Status(404))
    }

    async fn artist_albums(
        &self,
        artist_id: &str,
        include_all_albums: bool,
    ) -> Result<Vec<AlbumSummary>, CatalogError> {
        match &self.artist {
            Some(artist) if artist.id == artist_id => {
                let mut albums = self.albums.clone();
                if include_all_albums {
                    albums.extend(self.appearances.iter().cloned());
                }
                Ok(albums)
            }
            _ => Err(CatalogError::Status(404)),
        }
    }

    async fn album_tracks(&self, album_id: &str) -> Result<Vec<AlbumTrack>, CatalogError> {
        self.album_tracks
            .get(album_id)
            .cloned()
            .ok_or(CatalogError::Status(404))
    }
}
