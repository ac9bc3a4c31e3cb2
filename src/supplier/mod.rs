mod producer;

use crate::catalog::{Catalog, CatalogError};
use crate::model::TrackRecord;
use crate::session::{AuthenticationError, Session};
use amplify_derive::Display;
use log::{debug, error, warn};
use producer::Producer;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};

/// The catalog has no random endpoint, so a random track is approximated by a single-letter
/// wildcard search at a random result offset.
const TRACK_QUERIES: [&str; 5] = ["%a%", "%e%", "%i%", "%o%", "%u%"];

#[derive(Error, Display, Debug)]
#[display(Debug)]
pub enum FetchError {
    Unauthenticated,
    Stopped,
    NoResults,
    Catalog(CatalogError),
}

impl From<CatalogError> for FetchError {
    fn from(catalog_error: CatalogError) -> Self {
        Self::Catalog(catalog_error)
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub buffer_capacity: usize,
    pub failure_pause: Duration,
    /// Used after transport errors and after a fetch that panicked.
    pub exceptional_failure_pause: Duration,
    pub full_buffer_pause: Duration,
    pub buffer_race_pause: Duration,
    pub shutdown_timeout: Duration,
    /// The search API rejects an offset plus limit above 1000.
    pub offsets: RangeInclusive<u32>,
    pub avoid_repeats: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            buffer_capacity: 3,
            failure_pause: Duration::from_millis(500),
            exceptional_failure_pause: Duration::from_secs(1),
            full_buffer_pause: Duration::from_millis(500),
            buffer_race_pause: Duration::from_millis(50),
            shutdown_timeout: Duration::from_secs(2),
            offsets: 1..=999,
            avoid_repeats: true,
        }
    }
}

impl Settings {
    fn pause_after(&self, error: &FetchError) -> Duration {
        match error {
            FetchError::Catalog(CatalogError::Transport(_)) => self.exceptional_failure_pause,
            _ => self.failure_pause,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TrackQuery {
    pub(crate) text: &'static str,
    pub(crate) offset: u32,
}

pub(crate) fn random_track_query(rng: &mut impl Rng, offsets: &RangeInclusive<u32>) -> TrackQuery {
    let text = TRACK_QUERIES.choose(rng).copied().unwrap_or(TRACK_QUERIES[0]);
    let offset = match offsets.is_empty() {
        true => *offsets.start(),
        false => rng.random_range(offsets.clone()),
    };

    TrackQuery { text, offset }
}

pub(crate) async fn fetch_random_track<C: Catalog>(
    session: &Session<C>,
    query: TrackQuery,
) -> Result<TrackRecord, FetchError> {
    if !session.is_authenticated() {
        return Err(FetchError::Unauthenticated);
    }

    session
        .catalog()
        .search_tracks(query.text, 1, query.offset)
        .await?
        .into_iter()
        .next()
        .ok_or(FetchError::NoResults)
}

/// Serves random tracks without network latency by keeping a small buffer filled from a
/// background producer task.
pub struct TrackSupplier<C: Catalog + 'static> {
    session: Arc<Session<C>>,
    settings: Settings,
    receiver: Mutex<mpsc::Receiver<TrackRecord>>,
    stop: Arc<AtomicBool>,
    producer: Mutex<Option<JoinHandle<()>>>,
}

impl<C: Catalog + 'static> TrackSupplier<C> {
    /// Authenticates and starts the supplier. A failed authentication is returned alongside a
    /// supplier that answers every request with [`FetchError::Unauthenticated`].
    pub async fn connect(
        catalog: C,
        settings: Settings,
    ) -> (Self, Result<(), AuthenticationError>) {
        let (session, authentication) = Session::open(catalog).await;
        (Self::start(session, settings), authentication)
    }

    /// Must be called within a Tokio runtime.
    pub fn start(session: Arc<Session<C>>, settings: Settings) -> Self {
        let (sender, receiver) = mpsc::channel(settings.buffer_capacity.max(1));
        let stop = Arc::new(AtomicBool::new(false));

        let producer = match session.is_authenticated() {
            false => {
                warn!("The track producer is not started, the session is not authenticated.");
                None
            }
            true => Some(tokio::spawn(
                Producer::new(session.clone(), settings.clone(), sender, stop.clone()).run(),
            )),
        };

        Self {
            session,
            settings,
            receiver: Mutex::new(receiver),
            stop,
            producer: Mutex::new(producer),
        }
    }

    pub fn session(&self) -> &Arc<Session<C>> {
        &self.session
    }

    /// Takes the oldest buffered track, or fetches one directly when the buffer is empty.
    pub async fn request_track(&self) -> Result<TrackRecord, FetchError> {
        if self.stop.load(Ordering::Acquire) {
            return Err(FetchError::Stopped);
        }

        if let Ok(track) = self.receiver.lock().await.try_recv() {
            debug!("Supplying the buffered track {}.", track.id);
            return Ok(track);
        }

        debug!("The track buffer is empty, fetching a track directly.");
        let query = random_track_query(&mut rand::rng(), &self.settings.offsets);
        let track = fetch_random_track(&self.session, query).await?;
        self.session.remember_track(&track.id).await;

        Ok(track)
    }

    pub async fn request_tracks(&self, count: usize) -> Result<Vec<TrackRecord>, FetchError> {
        let mut tracks = Vec::with_capacity(count);
        for _ in 0..count {
            tracks.push(self.request_track().await?);
        }

        Ok(tracks)
    }

    pub async fn buffered_count(&self) -> usize {
        self.receiver.lock().await.len()
    }

    pub async fn has_buffered(&self) -> bool {
        !self.receiver.lock().await.is_empty()
    }

    pub async fn is_running(&self) -> bool {
        self.producer
            .lock()
            .await
            .as_ref()
            .is_some_and(|producer| !producer.is_finished())
    }

    /// Stops the producer, waiting for it at most [`Settings::shutdown_timeout`], and discards
    /// the buffered tracks. Calling it again does nothing.
    pub async fn shutdown(&self) {
        self.stop.store(true, Ordering::Release);

        let producer = self.producer.lock().await.take();
        if let Some(mut producer) = producer {
            match timeout(self.settings.shutdown_timeout, &mut producer).await {
                Ok(Ok(())) => debug!("The track producer has stopped."),
                Ok(Err(join_error)) => error!("The track producer ended abnormally: {join_error}"),
                Err(_) => warn!(
                    "The track producer did not stop within {:?}, leaving it behind.",
                    self.settings.shutdown_timeout
                ),
            }
        }

        let mut receiver = self.receiver.lock().await;
        receiver.close();
        while receiver.try_recv().is_ok() {}
    }
}

impl<C: Catalog + 'static> Drop for TrackSupplier<C> {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
    }
}
