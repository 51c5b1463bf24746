//! Stats service
//!
//! Computes reports over the current snapshot.
//! Implements tower::Service for InProcess calls.

use std::convert::Infallible;
use std::future::{ready, Ready};
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use serde::{Deserialize, Serialize};

use crate::directory::Directory;
use crate::filter::{filter_blocks, BlockFilter};
use crate::models::TimeBlock;
use crate::rollup::{aggregate, Rollups};
use crate::snapshot::Snapshot;

/// Request for one report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRequest {
    pub filter: BlockFilter,
}

impl StatsRequest {
    pub fn new(filter: BlockFilter) -> Self {
        Self { filter }
    }
}

/// Filtered blocks and their rollups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    pub filter: BlockFilter,
    pub snapshot_version: u64,
    /// Matching blocks, most recent first
    pub blocks: Vec<TimeBlock>,
    #[serde(flatten)]
    pub rollups: Rollups,
}

/// Last filter stage result, keyed on filter and snapshot version
struct CachedFilter {
    filter: BlockFilter,
    version: u64,
    blocks: Arc<Vec<TimeBlock>>,
}

/// Stats service over an immutable snapshot
#[derive(Clone)]
pub struct StatsService {
    snapshot: Arc<Snapshot>,
    directory: Arc<Directory>,
    version: u64,
    cache: Arc<Mutex<Option<CachedFilter>>>,
}

impl StatsService {
    /// Create a new stats service over `snapshot`
    pub fn new(snapshot: Snapshot) -> Self {
        let directory = snapshot.directory();
        Self {
            snapshot: Arc::new(snapshot),
            directory: Arc::new(directory),
            version: 1,
            cache: Arc::new(Mutex::new(None)),
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Monotonic snapshot version, bumped on every replacement
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Swap in a new snapshot
    pub fn replace_snapshot(&mut self, snapshot: Snapshot) {
        self.directory = Arc::new(snapshot.directory());
        self.snapshot = Arc::new(snapshot);
        self.version += 1;
        self.cache = Arc::new(Mutex::new(None));
        tracing::info!(version = self.version, "Replaced time block snapshot");
    }

    /// Filter stage, memoized on (filter, snapshot version)
    fn filtered(&self, filter: &BlockFilter) -> Arc<Vec<TimeBlock>> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(cached) = cache.as_ref() {
            if cached.version == self.version && &cached.filter == filter {
                tracing::debug!(version = self.version, "Filter cache hit");
                return cached.blocks.clone();
            }
        }

        let blocks = Arc::new(filter_blocks(
            &self.snapshot.time_blocks,
            &self.directory,
            filter,
        ));
        *cache = Some(CachedFilter {
            filter: filter.clone(),
            version: self.version,
            blocks: blocks.clone(),
        });
        blocks
    }

    /// Compute the full report for `filter`
    pub fn compute(&self, filter: &BlockFilter) -> StatsReport {
        let blocks = self.filtered(filter);
        let rollups = aggregate(&blocks, &self.directory);

        StatsReport {
            filter: filter.clone(),
            snapshot_version: self.version,
            blocks: blocks.as_ref().clone(),
            rollups,
        }
    }
}

impl Default for StatsService {
    fn default() -> Self {
        Self::new(Snapshot::default())
    }
}

impl tower::Service<StatsRequest> for StatsService {
    type Response = StatsReport;
    type Error = Infallible;
    type Future = Ready<Result<StatsReport, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: StatsRequest) -> Self::Future {
        ready(Ok(self.compute(&request.filter)))
    }
}
