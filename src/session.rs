//! Session controller: the current dataset, its facet index, the user's
//! selection, and the load generation guard.
//!
//! Loads are split into `begin_load` (issue a ticket with a new generation)
//! and `finish_load` (commit a result). Only the ticket of the newest
//! generation may commit, so a slow earlier load can never overwrite a
//! later one. Readers get `Arc` snapshots and never observe a partial swap.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::thread;
use tracing::{debug, info, warn};

use crate::constants::source::LOAD_WORKER_STOPPED_REASON;
use crate::data::Dataset;
use crate::errors::{FilterError, LoadError};
use crate::facets::{Facet, FacetIndex, extract_facets};
use crate::filter::{FilterSpec, filter_records};
use crate::metrics::{FacetDistribution, facet_distribution};
use crate::render::{RenderRecord, project_all};
use crate::sort::{SortDirection, sort_by_activation};
use crate::source::DatasetLoader;
use crate::types::DatasetId;

/// Current filter and sort direction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    /// Active facet constraints.
    pub filter: FilterSpec,
    /// Activation score ordering.
    pub direction: SortDirection,
}

/// Permission to commit the result of one load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    dataset_id: DatasetId,
}

impl LoadTicket {
    /// Generation assigned when the load began.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Dataset the load targets.
    pub fn dataset_id(&self) -> &str {
        &self.dataset_id
    }
}

/// What happened to a finished load.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadOutcome {
    /// The dataset replaced the previous one.
    Applied { generation: u64, records: usize },
    /// The load failed; the session now holds an empty dataset.
    Failed(LoadError),
    /// A newer load began first; this result was discarded.
    Superseded { generation: u64, latest: u64 },
}

impl LoadOutcome {
    /// True for `Applied`.
    pub fn is_applied(&self) -> bool {
        matches!(self, LoadOutcome::Applied { .. })
    }
}

struct SessionState {
    dataset: Arc<Dataset>,
    facets: Arc<FacetIndex>,
    selection: Selection,
    last_error: Option<LoadError>,
    applied_generation: u64,
}

struct SessionShared {
    loader: DatasetLoader,
    generation: AtomicU64,
    state: RwLock<SessionState>,
}

/// Cloneable handle to one dashboard session.
#[derive(Clone)]
pub struct Session {
    shared: Arc<SessionShared>,
}

impl Session {
    /// Create a session with an empty dataset.
    pub fn new(loader: DatasetLoader) -> Self {
        Self {
            shared: Arc::new(SessionShared {
                loader,
                generation: AtomicU64::new(0),
                state: RwLock::new(SessionState {
                    dataset: Arc::new(Dataset::empty("")),
                    facets: Arc::new(FacetIndex::default()),
                    selection: Selection::default(),
                    last_error: None,
                    applied_generation: 0,
                }),
            }),
        }
    }

    /// Loader used by this session.
    pub fn loader(&self) -> &DatasetLoader {
        &self.shared.loader
    }

    /// Start a load of `dataset_id`, superseding any load in flight.
    pub fn begin_load(&self, dataset_id: impl Into<DatasetId>) -> LoadTicket {
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let dataset_id = dataset_id.into();
        debug!(generation, dataset = %dataset_id, "load started");
        LoadTicket {
            generation,
            dataset_id,
        }
    }

    /// Commit the result of the load identified by `ticket`.
    ///
    /// Results of tickets that are no longer the newest are discarded,
    /// whether they succeeded or failed.
    pub fn finish_load(
        &self,
        ticket: LoadTicket,
        result: Result<Dataset, LoadError>,
    ) -> LoadOutcome {
        let mut state = self.shared.state.write().expect("session state poisoned");
        let latest = self.shared.generation.load(Ordering::SeqCst);
        if ticket.generation != latest {
            debug!(
                generation = ticket.generation,
                latest,
                dataset = %ticket.dataset_id,
                "discarding stale load"
            );
            return LoadOutcome::Superseded {
                generation: ticket.generation,
                latest,
            };
        }
        state.applied_generation = ticket.generation;
        state.selection.filter = FilterSpec::new();
        match result {
            Ok(dataset) => {
                let records = dataset.len();
                let facets = extract_facets(&dataset.records, &self.shared.loader.schema().facets);
                state.dataset = Arc::new(dataset);
                state.facets = Arc::new(facets);
                state.last_error = None;
                info!(
                    generation = ticket.generation,
                    dataset = %ticket.dataset_id,
                    records,
                    "dataset applied"
                );
                LoadOutcome::Applied {
                    generation: ticket.generation,
                    records,
                }
            }
            Err(err) => {
                warn!(
                    generation = ticket.generation,
                    dataset = %ticket.dataset_id,
                    resource = %err.resource(),
                    error = %err,
                    "dataset load failed; showing no data"
                );
                state.dataset = Arc::new(Dataset::empty(ticket.dataset_id));
                state.facets = Arc::new(FacetIndex::default());
                state.last_error = Some(err.clone());
                LoadOutcome::Failed(err)
            }
        }
    }

    /// Load `dataset_id` on the calling thread.
    pub fn load(&self, dataset_id: impl Into<DatasetId>) -> LoadOutcome {
        let ticket = self.begin_load(dataset_id);
        let result = self.shared.loader.load(ticket.dataset_id());
        self.finish_load(ticket, result)
    }

    /// Load `dataset_id` on a worker thread.
    ///
    /// The session can be read while the load runs; the returned handle
    /// reports whether the result was applied or superseded.
    pub fn load_in_background(&self, dataset_id: impl Into<DatasetId>) -> LoadHandle {
        let ticket = self.begin_load(dataset_id);
        let generation = ticket.generation;
        let resource = self.shared.loader.schema().resource_for(ticket.dataset_id());
        let session = self.clone();
        let handle = thread::spawn(move || {
            let result = session.shared.loader.load(ticket.dataset_id());
            session.finish_load(ticket, result)
        });
        LoadHandle {
            generation,
            resource,
            handle,
        }
    }

    /// Snapshot of the current dataset.
    pub fn dataset(&self) -> Arc<Dataset> {
        Arc::clone(&self.read().dataset)
    }

    /// Snapshot of the current facet index.
    pub fn facets(&self) -> Arc<FacetIndex> {
        Arc::clone(&self.read().facets)
    }

    /// Error of the most recently applied load, if it failed.
    pub fn last_error(&self) -> Option<LoadError> {
        self.read().last_error.clone()
    }

    /// Newest generation issued by `begin_load`.
    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::SeqCst)
    }

    /// Generation whose result is currently shown (0 before any load).
    pub fn applied_generation(&self) -> u64 {
        self.read().applied_generation
    }

    /// Current selection.
    pub fn selection(&self) -> Selection {
        self.read().selection.clone()
    }

    /// Set or clear (`""` / `"all"`) the constraint on `facet` from a control value.
    pub fn select(&self, facet: Facet, raw: &str) -> Result<(), FilterError> {
        let mut state = self.write();
        state.selection.filter = state.selection.filter.clone().with_raw(facet, raw)?;
        Ok(())
    }

    /// Remove every facet constraint.
    pub fn clear_filters(&self) {
        self.write().selection.filter = FilterSpec::new();
    }

    /// Change the sort direction.
    pub fn set_direction(&self, direction: SortDirection) {
        self.write().selection.direction = direction;
    }

    /// Filter, sort and project the current dataset with the current selection.
    ///
    /// Dataset and selection are read under one lock, so a concurrent commit
    /// is seen either entirely or not at all.
    pub fn view(&self) -> Vec<RenderRecord> {
        let (dataset, selection) = {
            let state = self.read();
            (Arc::clone(&state.dataset), state.selection.clone())
        };
        project_view(&dataset, &selection)
    }

    /// Filter, sort and project the current dataset with `selection`.
    pub fn view_with(&self, selection: &Selection) -> Vec<RenderRecord> {
        project_view(&self.dataset(), selection)
    }

    /// Distribution of `facet` over the current dataset.
    pub fn distribution(&self, facet: Facet) -> Option<FacetDistribution> {
        let dataset = self.dataset();
        facet_distribution(&dataset.records, facet)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.shared.state.read().expect("session state poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.shared.state.write().expect("session state poisoned")
    }
}

fn project_view(dataset: &Dataset, selection: &Selection) -> Vec<RenderRecord> {
    let matching = filter_records(&dataset.records, &selection.filter);
    let ordered = sort_by_activation(matching, selection.direction);
    project_all(ordered)
}

/// Handle to a background load.
pub struct LoadHandle {
    generation: u64,
    resource: String,
    handle: thread::JoinHandle<LoadOutcome>,
}

impl LoadHandle {
    /// Generation of this load.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True once the worker has finished.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the load finishes.
    pub fn wait(self) -> LoadOutcome {
        self.handle.join().unwrap_or_else(|_| {
            LoadOutcome::Failed(LoadError::Fetch {
                resource: self.resource,
                reason: LOAD_WORKER_STOPPED_REASON.into(),
            })
        })
    }
}
