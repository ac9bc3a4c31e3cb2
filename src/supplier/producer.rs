use super::{fetch_random_track, random_track_query, Settings};
use crate::catalog::Catalog;
use crate::model::TrackRecord;
use crate::session::Session;
use log::{debug, error, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::sleep;

pub(super) struct Producer<C: Catalog + 'static> {
    session: Arc<Session<C>>,
    settings: Settings,
    sender: mpsc::Sender<TrackRecord>,
    stop: Arc<AtomicBool>,
    rng: StdRng,
}

impl<C: Catalog + 'static> Producer<C> {
    pub(super) fn new(
        session: Arc<Session<C>>,
        settings: Settings,
        sender: mpsc::Sender<TrackRecord>,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            session,
            settings,
            sender,
            stop,
            rng: StdRng::from_os_rng(),
        }
    }

    fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire) || self.sender.is_closed()
    }

    pub(super) async fn run(mut self) {
        debug!("The track producer has started.");

        while !self.is_stopped() {
            if self.sender.capacity() == 0 {
                sleep(self.settings.full_buffer_pause).await;
                continue;
            }

            let query = random_track_query(&mut self.rng, &self.settings.offsets);
            let session = self.session.clone();
            // A separate task keeps a panicking fetch from taking the producer down with it.
            let fetch = tokio::spawn(async move { fetch_random_track(&session, query).await });

            match fetch.await {
                Ok(Ok(track)) => self.enqueue(track).await,
                Ok(Err(error)) => {
                    warn!("Could not fetch a random track: {error}");
                    sleep(self.settings.pause_after(&error)).await;
                }
                Err(join_error) => {
                    error!("Fetching a random track failed unexpectedly: {join_error}");
                    sleep(self.settings.exceptional_failure_pause).await;
                }
            }
        }

        debug!("The track producer is exiting.");
    }

    async fn enqueue(&self, mut track: TrackRecord) {
        let is_new = self.session.remember_track(&track.id).await;
        if self.settings.avoid_repeats && !is_new {
            debug!("Skipping the already supplied track {}.", track.id);
            sleep(self.settings.failure_pause).await;
            return;
        }

        loop {
            match self.sender.try_send(track) {
                Ok(()) => return,
                Err(TrySendError::Closed(_)) => return,
                Err(TrySendError::Full(returned_track)) => {
                    if self.stop.load(Ordering::Acquire) {
                        return;
                    }

                    debug!("The track buffer filled up in the meantime, retrying.");
                    track = returned_track;
                    sleep(self.settings.buffer_race_pause).await;
                }
            }
        }
    }
}
