//! # Asset Loaders
//!
//! A loader receives a resource key together with a [`LoadReporter`] and is free to do
//! its work wherever it likes: inline, on a thread pool, behind a network request.
//! The reporter is the only way back into the cache. It queues progress and the final
//! result on a channel that [`AssetCache::pump`](super::cache::AssetCache::pump)
//! drains once per tick, so the cache itself is only ever mutated on the thread that
//! owns it.
//!
//! `succeed` and `fail` consume the reporter, so a loader cannot report progress
//! after the terminal result. A reporter dropped without a result reports
//! [`LoadError::Disconnected`] in its place.

use std::{
    fs::File,
    io::{ErrorKind, Read},
    path::{Path, PathBuf},
};

use crossbeam_channel::Sender;
use futures::executor::ThreadPool;

use super::{model::DecodedModel, resolver::ResourceKey};
use crate::{config::StageConfig, error::LoadError};

/// Message queued by a reporter for the owning cache
#[derive(Debug)]
pub(crate) enum LoadMessage<A> {
    Progress {
        key: ResourceKey,
        loaded: u64,
        total: u64,
    },
    Finished {
        key: ResourceKey,
        result: Result<A, LoadError>,
    },
}

/// Completion handle for exactly one load
#[derive(Debug)]
pub struct LoadReporter<A> {
    key: ResourceKey,
    sender: Sender<LoadMessage<A>>,
    finished: bool,
}

impl<A> LoadReporter<A> {
    pub(crate) fn new(key: ResourceKey, sender: Sender<LoadMessage<A>>) -> Self {
        Self {
            key,
            sender,
            finished: false,
        }
    }

    /// Key this reporter completes
    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    /// Report that `loaded` of `total` bytes have arrived
    pub fn progress(&self, loaded: u64, total: u64) {
        // A closed channel means the scene view is gone; nobody is listening.
        let _ = self.sender.send(LoadMessage::Progress {
            key: self.key.clone(),
            loaded,
            total,
        });
    }

    /// Report the decoded asset
    pub fn succeed(self, value: A) {
        self.finish(Ok(value));
    }

    /// Report a failure
    pub fn fail(self, error: LoadError) {
        self.finish(Err(error));
    }

    /// Report either outcome
    pub fn finish(mut self, result: Result<A, LoadError>) {
        self.finished = true;
        let _ = self.sender.send(LoadMessage::Finished {
            key: self.key.clone(),
            result,
        });
    }
}

impl<A> Drop for LoadReporter<A> {
    fn drop(&mut self) {
        if !self.finished {
            let key = self.key.clone();
            let _ = self.sender.send(LoadMessage::Finished {
                key: key.clone(),
                result: Err(LoadError::Disconnected { key }),
            });
        }
    }
}

/// Fetches and decodes the asset behind a resource key
pub trait AssetLoader<A> {
    /// Start loading `key`. Must not block on the result; report through `reporter`.
    fn load(&self, key: &ResourceKey, reporter: LoadReporter<A>);
}

impl<A, F> AssetLoader<A> for F
where
    F: Fn(&ResourceKey, LoadReporter<A>),
{
    fn load(&self, key: &ResourceKey, reporter: LoadReporter<A>) {
        self(key, reporter)
    }
}

/// Loads model files from disk on a small worker pool.
///
/// Keys are rooted paths (`/data/...`); they are looked up relative to the
/// configured asset root.
pub struct FileModelLoader {
    asset_root: PathBuf,
    read_chunk_size: usize,
    pool: ThreadPool,
}

impl FileModelLoader {
    /// Create a loader with its own worker pool
    pub fn new(config: &StageConfig) -> std::io::Result<Self> {
        let pool = ThreadPool::builder()
            .pool_size(config.loader_threads.max(1))
            .name_prefix("stagecraft-loader-")
            .create()?;

        Ok(Self {
            asset_root: config.asset_root.clone(),
            read_chunk_size: config.read_chunk_size.max(1),
            pool,
        })
    }

    /// Filesystem location of a key
    pub fn path_for(&self, key: &ResourceKey) -> PathBuf {
        self.asset_root.join(key.as_str().trim_start_matches('/'))
    }
}

impl AssetLoader<DecodedModel> for FileModelLoader {
    fn load(&self, key: &ResourceKey, reporter: LoadReporter<DecodedModel>) {
        let path = self.path_for(key);
        let key = key.clone();
        let chunk_size = self.read_chunk_size;

        self.pool.spawn_ok(async move {
            let result = read_with_progress(&path, chunk_size, &reporter)
                .and_then(|bytes| DecodedModel::decode(&key, &path, &bytes));
            reporter.finish(result);
        });
    }
}

/// Read a whole file, reporting progress after every chunk
pub fn read_with_progress<A>(
    path: &Path,
    chunk_size: usize,
    reporter: &LoadReporter<A>,
) -> Result<Vec<u8>, LoadError> {
    let io_err = |source: std::io::Error| {
        if source.kind() == ErrorKind::NotFound {
            LoadError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    };

    let mut file = File::open(path).map_err(io_err)?;
    let total = file.metadata().map_err(io_err)?.len();

    // Metadata length only drives progress; the buffer grows with what is actually read
    let mut bytes = Vec::new();
    let mut chunk = vec![0u8; chunk_size];
    loop {
        let n = file.read(&mut chunk).map_err(io_err)?;
        if n == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..n]);
        reporter.progress(bytes.len() as u64, total);
    }

    Ok(bytes)
}
