//! Home screen view model
//!
//! Joins the six home rows into one [`HomeState`]. The combinators only
//! accept up to four inputs, so the fan-in runs in two stages over named
//! types: the first four rows become a [`HomeContentPartial`], which is then
//! combined with the Xtream VOD and series rows.

use futures::stream::{BoxStream, StreamExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::home::repository::HomeContentRepository;
use crate::home::types::{HomeContentPartial, HomeState};
use crate::reactive::{combine3, combine4};

/// Combined home snapshots. Re-emits whenever any row changes, once every
/// row has produced its first value.
pub fn home_state_stream(
    repository: &dyn HomeContentRepository,
) -> BoxStream<'static, HomeState> {
    let partial = combine4(
        repository.observe_continue_watching(),
        repository.observe_recently_added(),
        repository.observe_telegram_media(),
        repository.observe_xtream_live(),
        |continue_watching, recently_added, telegram_media, xtream_live| {
            HomeContentPartial {
                continue_watching,
                recently_added,
                telegram_media,
                xtream_live,
            }
        },
    );

    combine3(
        partial,
        repository.observe_xtream_vod(),
        repository.observe_xtream_series(),
        HomeState::from_rows,
    )
}

/// Holds the latest [`HomeState`] for the home screen.
///
/// A background task drives [`home_state_stream`] into a watch channel;
/// dropping the view model stops it.
pub struct HomeViewModel {
    state: watch::Receiver<HomeState>,
    task: JoinHandle<()>,
}

impl std::fmt::Debug for HomeViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HomeViewModel")
            .field("is_loading", &self.state.borrow().is_loading)
            .field("finished", &self.task.is_finished())
            .finish()
    }
}

impl HomeViewModel {
    /// Start collecting. Must be called from within a tokio runtime.
    pub fn new(repository: &dyn HomeContentRepository) -> Self {
        let (sender, state) = watch::channel(HomeState::loading());
        let mut states = home_state_stream(repository);

        let task = tokio::spawn(async move {
            while let Some(next) = states.next().await {
                log::debug!(
                    "Home state: continue={} recent={} telegram={} live={} vod={} series={}",
                    next.continue_watching.len(),
                    next.recently_added.len(),
                    next.telegram_media.len(),
                    next.xtream_live.len(),
                    next.xtream_vod.len(),
                    next.xtream_series.len()
                );
                if sender.send(next).is_err() {
                    break;
                }
            }
            log::debug!("Home state stream ended");
        });

        Self { state, task }
    }

    /// Latest snapshot.
    pub fn state(&self) -> HomeState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<HomeState> {
        self.state.clone()
    }

    /// Wait until the first combined snapshot is available.
    pub async fn loaded(&self) -> HomeState {
        let mut receiver = self.state.clone();
        let loaded = receiver
            .wait_for(|state| !state.is_loading)
            .await
            .map(|state| state.clone());
        // Stream ended before every row emitted
        loaded.unwrap_or_else(|_| receiver.borrow().clone())
    }
}

impl Drop for HomeViewModel {
    fn drop(&mut self) {
        self.task.abort();
    }
}
