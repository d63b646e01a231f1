//! # Asset Load Cache
//!
//! Owns one [`LoadEntry`] per [`ResourceKey`] and moves it through
//!
//! ```text
//! NotAsked -> Loading -> Success
//!                    \-> Error
//! ```
//!
//! `Success` and `Error` are terminal: a key is loaded at most once for the lifetime
//! of the cache and is never fetched again, even if it is requested again or failed.
//!
//! All mutation goes through [`AssetCache::dispatch`]. Loader callbacks arrive on a
//! channel and are applied by [`AssetCache::pump`], so readers holding `&AssetCache`
//! always see whole transitions.

use std::collections::HashMap;

use crossbeam_channel::{Receiver, Sender};

use super::{
    loader::{AssetLoader, LoadMessage, LoadReporter},
    progress::{LoadProgress, ProgressFormula},
    resolver::{resolve, AssetDescriptor, ResourceKey},
};
use crate::error::{LoadError, TransitionError};

/// Coarse state of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadStatus {
    /// Requested, load not started yet
    NotAsked,
    /// Load handed to the loader, waiting for a result
    Loading,
    /// Decoded value available
    Success,
    /// Loader reported a failure
    Error,
}

impl LoadStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, LoadStatus::Success | LoadStatus::Error)
    }
}

#[derive(Debug)]
enum LoadState<A> {
    NotAsked,
    Loading { progress: Option<LoadProgress> },
    Success(A),
    Error(LoadError),
}

/// Load record for one key
#[derive(Debug)]
pub struct LoadEntry<A> {
    state: LoadState<A>,
}

impl<A> LoadEntry<A> {
    fn new() -> Self {
        Self {
            state: LoadState::NotAsked,
        }
    }

    pub fn status(&self) -> LoadStatus {
        match self.state {
            LoadState::NotAsked => LoadStatus::NotAsked,
            LoadState::Loading { .. } => LoadStatus::Loading,
            LoadState::Success(_) => LoadStatus::Success,
            LoadState::Error(_) => LoadStatus::Error,
        }
    }

    /// Latest progress; only set while loading
    pub fn progress(&self) -> Option<&LoadProgress> {
        match &self.state {
            LoadState::Loading { progress } => progress.as_ref(),
            _ => None,
        }
    }

    /// Decoded value; only set on success
    pub fn value(&self) -> Option<&A> {
        match &self.state {
            LoadState::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Failure; only set on error
    pub fn error(&self) -> Option<&LoadError> {
        match &self.state {
            LoadState::Error(error) => Some(error),
            _ => None,
        }
    }
}

/// Every way an entry can change
#[derive(Debug)]
pub enum LoadEvent<A> {
    /// Create a `NotAsked` entry if the key has none
    Request(ResourceKey),
    /// Start the load of a `NotAsked` entry
    BeginLoad(ResourceKey),
    /// Bytes arrived for a `Loading` entry
    Progress {
        key: ResourceKey,
        loaded: u64,
        total: u64,
    },
    /// A `Loading` entry finished
    Success(ResourceKey, A),
    /// A `Loading` entry failed
    Error(ResourceKey, LoadError),
}

impl<A> LoadEvent<A> {
    pub fn key(&self) -> &ResourceKey {
        match self {
            LoadEvent::Request(key)
            | LoadEvent::BeginLoad(key)
            | LoadEvent::Progress { key, .. }
            | LoadEvent::Success(key, _)
            | LoadEvent::Error(key, _) => key,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            LoadEvent::Request(_) => "Request",
            LoadEvent::BeginLoad(_) => "BeginLoad",
            LoadEvent::Progress { .. } => "Progress",
            LoadEvent::Success(..) => "Success",
            LoadEvent::Error(..) => "Error",
        }
    }
}

/// Resource-key to load-entry map plus the loader that fills it
pub struct AssetCache<A> {
    entries: HashMap<ResourceKey, LoadEntry<A>>,
    loader: Box<dyn AssetLoader<A>>,
    progress_formula: ProgressFormula,
    sender: Sender<LoadMessage<A>>,
    receiver: Receiver<LoadMessage<A>>,
}

impl<A> AssetCache<A> {
    /// Create an empty cache driving `loader`
    pub fn new(loader: impl AssetLoader<A> + 'static) -> Self {
        Self::with_loader(Box::new(loader))
    }

    pub fn with_loader(loader: Box<dyn AssetLoader<A>>) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            entries: HashMap::new(),
            loader,
            progress_formula: ProgressFormula::default(),
            sender,
            receiver,
        }
    }

    pub fn with_progress_formula(mut self, formula: ProgressFormula) -> Self {
        self.progress_formula = formula;
        self
    }

    /// Apply one event.
    ///
    /// `Request` for a known key and `BeginLoad` for an entry that already left
    /// `NotAsked` are accepted as no-ops. Progress and completions for entries that
    /// are not `Loading` are rejected and leave the cache unchanged.
    pub fn dispatch(&mut self, event: LoadEvent<A>) -> Result<(), TransitionError> {
        let status = self.entries.get(event.key()).map(LoadEntry::status);

        match (event, status) {
            (LoadEvent::Request(key), None) => {
                log::info!("Request asset: {}", key);
                self.entries.insert(key, LoadEntry::new());
                Ok(())
            }
            (LoadEvent::Request(_), Some(_)) => Ok(()),

            (LoadEvent::BeginLoad(key), Some(LoadStatus::NotAsked)) => {
                self.set_state(&key, LoadState::Loading { progress: None });
                log::info!("Begin load: {}", key);
                let reporter = LoadReporter::new(key.clone(), self.sender.clone());
                self.loader.load(&key, reporter);
                Ok(())
            }
            (LoadEvent::BeginLoad(_), Some(_)) => Ok(()),

            (LoadEvent::Progress { key, loaded, total }, Some(LoadStatus::Loading)) => {
                let progress = LoadProgress::new(loaded, total, self.progress_formula);
                log::debug!("Progress {}: {}/{} ({}%)", key, loaded, total, progress.percent);
                self.set_state(
                    &key,
                    LoadState::Loading {
                        progress: Some(progress),
                    },
                );
                Ok(())
            }

            (LoadEvent::Success(key, value), Some(LoadStatus::Loading)) => {
                log::info!("Loaded asset: {}", key);
                self.set_state(&key, LoadState::Success(value));
                Ok(())
            }

            (LoadEvent::Error(key, error), Some(LoadStatus::Loading)) => {
                log::error!("Failed to load {}: {}", key, error);
                self.set_state(&key, LoadState::Error(error));
                Ok(())
            }

            (event, None) => Err(TransitionError::UnknownKey(event.key().clone())),
            (event, Some(status)) => Err(TransitionError::InvalidTransition {
                key: event.key().clone(),
                status,
                event: event.name(),
            }),
        }
    }

    fn set_state(&mut self, key: &ResourceKey, state: LoadState<A>) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.state = state;
        }
    }

    /// Create an entry for `key` if there is none
    pub fn request(&mut self, key: ResourceKey) {
        // Request never fails
        let _ = self.dispatch(LoadEvent::Request(key));
    }

    /// Start loading `key` if it is `NotAsked`
    pub fn begin_load(&mut self, key: ResourceKey) -> Result<(), TransitionError> {
        self.dispatch(LoadEvent::BeginLoad(key))
    }

    pub fn apply_progress(
        &mut self,
        key: ResourceKey,
        loaded: u64,
        total: u64,
    ) -> Result<(), TransitionError> {
        self.dispatch(LoadEvent::Progress { key, loaded, total })
    }

    pub fn complete(
        &mut self,
        key: ResourceKey,
        result: Result<A, LoadError>,
    ) -> Result<(), TransitionError> {
        match result {
            Ok(value) => self.dispatch(LoadEvent::Success(key, value)),
            Err(error) => self.dispatch(LoadEvent::Error(key, error)),
        }
    }

    /// Bring the cache in line with the current loadable descriptors.
    ///
    /// Every resolvable key without an entry is requested first; only then is every
    /// `NotAsked` entry started. Keys that are loading or finished are left alone.
    pub fn sync(&mut self, descriptors: &[AssetDescriptor]) {
        for key in descriptors.iter().filter_map(resolve) {
            if !self.entries.contains_key(&key) {
                self.request(key);
            }
        }

        let pending: Vec<ResourceKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.status() == LoadStatus::NotAsked)
            .map(|(key, _)| key.clone())
            .collect();

        for key in pending {
            // Only NotAsked keys were collected
            let _ = self.begin_load(key);
        }
    }

    /// Apply every loader message queued since the last call. Returns how many
    /// messages were processed.
    pub fn pump(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(message) = self.receiver.try_recv() {
            let applied = match message {
                LoadMessage::Progress { key, loaded, total } => {
                    self.apply_progress(key, loaded, total)
                }
                LoadMessage::Finished { key, result } => self.complete(key, result),
            };
            if let Err(err) = applied {
                log::warn!("Dropped loader message: {}", err);
            }
            processed += 1;
        }
        processed
    }

    pub fn entry(&self, key: &ResourceKey) -> Option<&LoadEntry<A>> {
        self.entries.get(key)
    }

    pub fn status(&self, key: &ResourceKey) -> Option<LoadStatus> {
        self.entries.get(key).map(LoadEntry::status)
    }

    /// Decoded value for `key`, present only once the load succeeded
    pub fn value(&self, key: &ResourceKey) -> Option<&A> {
        self.entries.get(key).and_then(LoadEntry::value)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&ResourceKey, &LoadEntry<A>)> {
        self.entries.iter()
    }

    /// Number of loads handed to the loader that have not finished yet
    pub fn in_flight(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.status() == LoadStatus::Loading)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
