use crate::catalog::{Catalog, CatalogError};
use crate::model::{Album, ArtistCandidate, TrackRecord};
use crate::session::Session;
use amplify_derive::Display;
use futures::future::try_join_all;
use log::info;
use std::collections::HashSet;
use thiserror::Error;

/// A game needs at least one pairing.
pub const MIN_GAME_TRACK_COUNT: usize = 2;

#[derive(Error, Display, Debug)]
#[display(Debug)]
pub enum BrowseError {
    Unauthenticated,
    Catalog(CatalogError),
    TooFewTracksSelected(usize),
}

impl From<CatalogError> for BrowseError {
    fn from(catalog_error: CatalogError) -> Self {
        Self::Catalog(catalog_error)
    }
}

/// An artist with their albums, newest first, each with its track list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtistCatalog {
    pub artist: ArtistCandidate,
    pub albums: Vec<Album>,
}

impl ArtistCatalog {
    pub fn track_records(&self) -> Vec<TrackRecord> {
        self.albums
            .iter()
            .flat_map(|album| {
                album.tracks.iter().map(|track| {
                    TrackRecord::new(
                        track.id.clone(),
                        track.name.clone(),
                        self.artist.name.clone(),
                        album.summary.name.clone(),
                        album.summary.release_year.clone(),
                        track.duration.clone(),
                        album.summary.cover_url.clone(),
                    )
                })
            })
            .collect()
    }

    /// The chosen tracks in catalog order, provided there are enough of them for a game.
    pub fn select_for_game<'a>(
        &self,
        track_ids: impl IntoIterator<Item = &'a str>,
    ) -> Result<Vec<TrackRecord>, BrowseError> {
        let track_ids = track_ids.into_iter().collect::<HashSet<_>>();
        let selected_tracks = self
            .track_records()
            .into_iter()
            .filter(|track| track_ids.contains(track.id.as_str()))
            .collect::<Vec<_>>();

        if selected_tracks.len() < MIN_GAME_TRACK_COUNT {
            return Err(BrowseError::TooFewTracksSelected(selected_tracks.len()));
        }

        Ok(selected_tracks)
    }
}

fn numeric_release_year(album: &Album) -> u32 {
    album.summary.release_year.parse().unwrap_or(0)
}

/// Loads the artist's albums and singles, or every release featuring them when
/// `include_all_albums` is set.
pub async fn artist_catalog<C: Catalog>(
    session: &Session<C>,
    artist_id: &str,
    include_all_albums: bool,
) -> Result<ArtistCatalog, BrowseError> {
    if !session.is_authenticated() {
        return Err(BrowseError::Unauthenticated);
    }

    let catalog = session.catalog();
    let (artist, album_summaries) = tokio::try_join!(
        catalog.artist(artist_id),
        catalog.artist_albums(artist_id, include_all_albums)
    )?;

    // Reissues share the name of the original album.
    let mut album_names = HashSet::new();
    let album_summaries = album_summaries
        .into_iter()
        .filter(|summary| album_names.insert(summary.name.clone()))
        .collect::<Vec<_>>();

    let track_lists = try_join_all(
        album_summaries
            .iter()
            .map(|summary| catalog.album_tracks(&summary.id)),
    )
    .await?;

    let mut albums = album_summaries
        .into_iter()
        .zip(track_lists)
        .map(|(summary, tracks)| Album { summary, tracks })
        .collect::<Vec<_>>();
    albums.sort_by(|album, other_album| {
        numeric_release_year(other_album)
            .cmp(&numeric_release_year(album))
            .then_with(|| album.summary.name.cmp(&other_album.summary.name))
    });

    info!(
        "Loaded {} albums of the artist {}.",
        albums.len(),
        artist.name
    );

    Ok(ArtistCatalog { artist, albums })
}
