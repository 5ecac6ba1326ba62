//! Debounced, reactive search controller.
//!
//! The controller owns one record store snapshot, one result cache and the current
//! query/filter selection. Input methods are synchronous and return immediately;
//! the actual search runs on the tokio runtime the controller was built on:
//!
//! ```text
//! set_query / set_filters ─▶ Debouncing ──(quiet)──▶ Searching ─┬─▶ Idle (result)
//!          ▲                     │                              └─▶ Idle (error)
//!          └─────── new input ───┘  cache hit skips the record fetch
//! ```
//!
//! Every input bumps a request sequence number. A search compares its sequence with
//! the latest one before publishing and silently drops its result if it has been
//! superseded, so a slow fetch can never overwrite a newer result.

mod builder;
mod subscription;

pub use builder::SearchControllerBuilder;
pub use subscription::Subscription;

use crate::cache::{CacheKey, CacheStats, ResultCache};
use crate::config::SearchOptions;
use crate::debounce::Debouncer;
use crate::error::{KineticError, Result};
use crate::index::{parse_query, run_search};
use crate::models::{
    summarize, FilterPatch, SearchFilters, SearchPhase, SearchResult, SearchState,
};
use crate::store::{Facets, RecordSource, RecordStore};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

type Callback = Arc<dyn Fn(&SearchState) + Send + Sync>;

/// Counters describing controller activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerStats {
    /// Searches that started executing (cache hits included).
    pub searches: u64,
    pub cache_hits: u64,
    /// Record fetches attempted.
    pub fetches: u64,
    /// Completed searches whose result was dropped because newer input arrived.
    pub stale_discarded: u64,
    pub failures: u64,
}

/// Mutable selection plus the last published state.
struct Session {
    query: String,
    filters: SearchFilters,
    state: SearchState,
    revision: u64,
}

/// The loaded snapshot and the generation it was installed under.
struct LoadedStore {
    records: Arc<RecordStore>,
    generation: u64,
}

struct Shared {
    source: Arc<dyn RecordSource>,
    options: SearchOptions,
    session: Mutex<Session>,
    store: RwLock<Option<LoadedStore>>,
    cache: Mutex<ResultCache>,
    debouncer: Debouncer,
    sequence: AtomicU64,
    generation: AtomicU64,
    delivered: AtomicU64,
    subscribers: Mutex<Vec<(u64, Callback)>>,
    next_subscriber: AtomicU64,
    state_tx: watch::Sender<SearchState>,
    stats: Mutex<ControllerStats>,
    disposed: AtomicBool,
}

// Lock poisoning only means another thread panicked mid-update; every guarded value
// here is replaced wholesale, so continuing with the inner value is sound.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn current_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Store `state` as the latest state. Caller must deliver it after unlocking.
    fn commit(&self, session: &mut Session, mut state: SearchState) -> (SearchState, u64) {
        session.revision += 1;
        state.revision = session.revision;
        session.state = state.clone();
        self.state_tx.send_replace(state.clone());
        (state, session.revision)
    }

    /// Invoke subscriber callbacks unless a newer state was already delivered.
    fn deliver(&self, state: &SearchState, revision: u64) {
        if self.delivered.fetch_max(revision, Ordering::SeqCst) >= revision {
            return;
        }
        let callbacks: Vec<Callback> = lock(&self.subscribers)
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in callbacks {
            callback(state);
        }
    }

    fn remove_subscriber(&self, id: u64) -> bool {
        let mut subscribers = lock(&self.subscribers);
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }

    /// Apply an input change, publish `Debouncing` and (re)schedule the search.
    ///
    /// The timer is replaced under the session lock, so the pending timer always
    /// belongs to the latest sequence.
    fn request(self: &Arc<Self>, mutate: impl FnOnce(&mut Session) -> Result<()>) -> Result<()> {
        let (state, revision) = {
            let mut session = lock(&self.session);
            if self.is_disposed() {
                return Err(KineticError::Disposed);
            }
            mutate(&mut session)?;
            let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
            let state = SearchState {
                phase: SearchPhase::Debouncing,
                sequence,
                query: session.query.clone(),
                filters: session.filters.clone(),
                ..session.state.clone()
            };

            let weak = Arc::downgrade(self);
            self.debouncer.schedule(async move {
                if let Some(shared) = weak.upgrade() {
                    shared.execute(sequence).await;
                }
            });

            self.commit(&mut session, state)
        };
        self.deliver(&state, revision);
        Ok(())
    }

    /// Run the search for `sequence`. Never cancelled once started.
    async fn execute(self: Arc<Self>, sequence: u64) {
        let started = Instant::now();

        let (query, filters, state, revision) = {
            let mut session = lock(&self.session);
            if self.current_sequence() != sequence {
                return;
            }
            let query = session.query.clone();
            let filters = session.filters.clone();
            let state = SearchState {
                phase: SearchPhase::Searching,
                ..session.state.clone()
            };
            let (state, revision) = self.commit(&mut session, state);
            (query, filters, state, revision)
        };
        self.deliver(&state, revision);

        let parsed = parse_query(&query);
        let key = CacheKey::new(&parsed, &filters);
        lock(&self.stats).searches += 1;

        let cached = lock(&self.cache).get(&key);
        if let Some(result) = cached {
            debug!("Cache hit for search '{}'", key);
            lock(&self.stats).cache_hits += 1;
            self.finish(sequence, Ok(result), started, true);
            return;
        }
        debug!("Cache miss for search '{}'", key);

        let outcome = match self.ensure_store().await {
            Ok((store, generation)) => {
                let result = Arc::new(run_search(&store, &parsed, &filters));
                self.cache_result(key, Arc::clone(&result), generation);
                Ok(result)
            }
            Err(err) => Err(err),
        };
        self.finish(sequence, outcome, started, false);
    }

    /// Cache a result unless the store it was computed from has since been replaced.
    fn cache_result(&self, key: CacheKey, result: Arc<SearchResult>, generation: u64) {
        let mut cache = lock(&self.cache);
        let current = read(&self.store).as_ref().map(|loaded| loaded.generation);
        if current == Some(generation) {
            cache.put(key, result);
        }
    }

    /// Publish the outcome of `sequence` if it is still the latest request.
    fn finish(
        &self,
        sequence: u64,
        outcome: Result<Arc<SearchResult>>,
        started: Instant,
        from_cache: bool,
    ) {
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let mut session = lock(&self.session);
        if self.current_sequence() != sequence {
            drop(session);
            lock(&self.stats).stale_discarded += 1;
            debug!("Discarding stale result for request {}", sequence);
            return;
        }

        let state = match outcome {
            Ok(result) => SearchState {
                phase: SearchPhase::Idle,
                // Stamped by `commit`.
                revision: 0,
                sequence,
                query: session.query.clone(),
                filters: session.filters.clone(),
                elapsed_ms,
                summary: summarize(
                    result.total,
                    &session.query,
                    session.filters.active_count(),
                    elapsed_ms,
                ),
                from_cache,
                error: None,
                last_success: Some(Arc::clone(&result)),
                result,
            },
            Err(err) => {
                lock(&self.stats).failures += 1;
                warn!("Search for '{}' failed: {}", session.query, err);
                SearchState {
                    phase: SearchPhase::Idle,
                    sequence,
                    result: Arc::new(SearchResult::empty()),
                    elapsed_ms,
                    summary: format!("Search failed: {}", err),
                    from_cache: false,
                    error: Some(err.to_failure()),
                    ..session.state.clone()
                }
            }
        };

        let (state, revision) = self.commit(&mut session, state);
        drop(session);
        self.deliver(&state, revision);
    }

    /// Publish a failure that is not tied to a particular search (load or refresh).
    fn report_failure(&self, err: &KineticError) {
        lock(&self.stats).failures += 1;
        let (state, revision) = {
            let mut session = lock(&self.session);
            let state = SearchState {
                result: Arc::new(SearchResult::empty()),
                summary: format!("Search failed: {}", err),
                from_cache: false,
                error: Some(err.to_failure()),
                ..session.state.clone()
            };
            self.commit(&mut session, state)
        };
        self.deliver(&state, revision);
    }

    async fn ensure_store(&self) -> Result<(Arc<RecordStore>, u64)> {
        let loaded = read(&self.store)
            .as_ref()
            .map(|loaded| (Arc::clone(&loaded.records), loaded.generation));
        if let Some(loaded) = loaded {
            return Ok(loaded);
        }

        let store = self.fetch_store().await?;
        Ok(self.install_store(store, false))
    }

    async fn fetch_store(&self) -> Result<RecordStore> {
        lock(&self.stats).fetches += 1;
        let source = self.source.describe();

        let fetched = match self.options.fetch_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.source.fetch()).await {
                Ok(fetched) => fetched,
                Err(_) => Err(KineticError::DataSourceUnavailable {
                    message: format!("{} timed out after {:?}", source, limit),
                    cause: None,
                }),
            },
            None => self.source.fetch().await,
        };

        match fetched {
            Ok(records) => {
                let store = RecordStore::from_records(records);
                info!("Loaded {} exercise records from {}", store.len(), source);
                Ok(store)
            }
            Err(err) => {
                warn!("Record fetch from {} failed: {}", source, err);
                Err(err)
            }
        }
    }

    /// Install a freshly fetched store.
    ///
    /// With `replace == false` an already installed store wins (two searches raced
    /// to perform the first load). Replacing clears the result cache.
    fn install_store(&self, store: RecordStore, replace: bool) -> (Arc<RecordStore>, u64) {
        let mut cache = lock(&self.cache);
        let mut slot = write(&self.store);

        if !replace {
            if let Some(loaded) = slot.as_ref() {
                return (Arc::clone(&loaded.records), loaded.generation);
            }
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let records = Arc::new(store);
        *slot = Some(LoadedStore {
            records: Arc::clone(&records),
            generation,
        });
        cache.clear();
        (records, generation)
    }
}

/// Debounced search over an exercise corpus.
///
/// Cloning yields another handle to the same controller.
#[derive(Clone)]
pub struct SearchController {
    shared: Arc<Shared>,
}

impl SearchController {
    /// Create a builder for a controller reading from `source`.
    pub fn builder(source: impl RecordSource + 'static) -> SearchControllerBuilder {
        SearchControllerBuilder::new(Arc::new(source))
    }

    /// Create a controller with default options and load the corpus.
    ///
    /// A failed load does not fail construction: the controller publishes an error
    /// state and fetches again on the next search.
    pub async fn initialize(source: impl RecordSource + 'static) -> Self {
        Self::builder(source).build().await
    }

    pub(crate) fn from_parts(source: Arc<dyn RecordSource>, options: SearchOptions) -> Self {
        let (state_tx, _) = watch::channel(SearchState::initial());
        let shared = Shared {
            source,
            session: Mutex::new(Session {
                query: String::new(),
                filters: SearchFilters::default(),
                state: SearchState::initial(),
                revision: 0,
            }),
            store: RwLock::new(None),
            cache: Mutex::new(ResultCache::new(options.cache_capacity, options.cache_max_age)),
            debouncer: Debouncer::on_current_runtime(options.debounce),
            sequence: AtomicU64::new(0),
            generation: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            subscribers: Mutex::new(Vec::new()),
            next_subscriber: AtomicU64::new(1),
            state_tx,
            stats: Mutex::new(ControllerStats::default()),
            disposed: AtomicBool::new(false),
            options,
        };
        Self {
            shared: Arc::new(shared),
        }
    }

    /// Fetch the corpus now, publishing an error state on failure.
    pub(crate) async fn preload(&self) {
        match self.shared.fetch_store().await {
            Ok(store) => {
                self.shared.install_store(store, false);
            }
            Err(err) => self.shared.report_failure(&err),
        }
    }

    /// Replace the query text and schedule a debounced search.
    pub fn set_query(&self, text: impl Into<String>) {
        if self.shared.is_disposed() {
            warn!("set_query called on a disposed search controller");
            return;
        }
        let text = text.into();
        // Only fails when a concurrent `dispose` won the session lock.
        let _ = self.shared.request(move |session| {
            session.query = text;
            Ok(())
        });
    }

    /// Merge `patch` into the current filters and schedule a debounced search.
    ///
    /// A rejected patch leaves the filters untouched and schedules nothing.
    pub fn set_filters(&self, patch: FilterPatch) -> Result<()> {
        if self.shared.is_disposed() {
            return Err(KineticError::Disposed);
        }
        self.shared
            .request(|session| {
                session.filters = session.filters.merged(&patch)?;
                Ok(())
            })
            .inspect_err(|err| debug!("Rejected filter patch: {}", err))
    }

    /// Reset query, filters and displayed results; cancel any pending search.
    ///
    /// The result cache is kept.
    pub fn clear(&self) {
        if self.shared.is_disposed() {
            warn!("clear called on a disposed search controller");
            return;
        }
        let (state, revision) = {
            let mut session = lock(&self.shared.session);
            self.shared.debouncer.cancel();
            session.query.clear();
            session.filters = SearchFilters::default();
            let sequence = self.shared.sequence.fetch_add(1, Ordering::SeqCst) + 1;
            let state = SearchState {
                sequence,
                ..SearchState::initial()
            };
            self.shared.commit(&mut session, state)
        };
        self.shared.deliver(&state, revision);
    }

    /// Reload the corpus wholesale, clear the cache and re-run the current search.
    ///
    /// Returns the number of records loaded. On failure the previous store is kept
    /// and an error state is published as well.
    pub async fn refresh(&self) -> Result<usize> {
        if self.shared.is_disposed() {
            return Err(KineticError::Disposed);
        }

        let store = match self.shared.fetch_store().await {
            Ok(store) => store,
            Err(err) => {
                self.shared.report_failure(&err);
                return Err(err);
            }
        };

        let (store, _) = self.shared.install_store(store, true);
        if self.shared.current_sequence() > 0 {
            self.shared.request(|_| Ok(()))?;
        }
        Ok(store.len())
    }

    /// Register a callback invoked with every published state.
    ///
    /// The callback stays registered until the returned [`Subscription`] is dropped
    /// or unsubscribed. Callbacks run on whichever task publishes, so they should be
    /// quick.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&SearchState) + Send + Sync + 'static,
    {
        let id = self.shared.next_subscriber.fetch_add(1, Ordering::SeqCst);
        lock(&self.shared.subscribers).push((id, Arc::new(callback)));
        Subscription::new(id, Arc::downgrade(&self.shared))
    }

    /// A watch channel that always holds the latest state.
    pub fn watch(&self) -> watch::Receiver<SearchState> {
        self.shared.state_tx.subscribe()
    }

    /// Latest published state.
    pub fn state(&self) -> SearchState {
        lock(&self.shared.session).state.clone()
    }

    /// Wait until the most recent request has finished, then return its state.
    pub async fn settled(&self) -> SearchState {
        let mut rx = self.watch();
        loop {
            {
                let state = rx.borrow_and_update();
                if state.phase == SearchPhase::Idle
                    && state.sequence == self.shared.current_sequence()
                {
                    return state.clone();
                }
            }
            if rx.changed().await.is_err() {
                return self.state();
            }
        }
    }

    /// Cancel pending work and release subscribers and cached results.
    ///
    /// Subsequent input calls are ignored.
    pub fn dispose(&self) {
        if self.shared.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        lock(&self.shared.subscribers).clear();
        lock(&self.shared.cache).clear();

        let mut session = lock(&self.shared.session);
        self.shared.debouncer.cancel();
        let sequence = self.shared.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let state = SearchState {
            phase: SearchPhase::Idle,
            sequence,
            ..session.state.clone()
        };
        self.shared.commit(&mut session, state);
        info!("Search controller disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.is_disposed()
    }

    pub fn query(&self) -> String {
        lock(&self.shared.session).query.clone()
    }

    pub fn filters(&self) -> SearchFilters {
        lock(&self.shared.session).filters.clone()
    }

    pub fn options(&self) -> &SearchOptions {
        &self.shared.options
    }

    /// Number of records in the loaded store, if any.
    pub fn record_count(&self) -> Option<usize> {
        read(&self.shared.store)
            .as_ref()
            .map(|loaded| loaded.records.len())
    }

    /// Filter values present in the loaded store, if any.
    pub fn facets(&self) -> Option<Facets> {
        read(&self.shared.store)
            .as_ref()
            .map(|loaded| loaded.records.facets())
    }

    pub fn cache_stats(&self) -> CacheStats {
        lock(&self.shared.cache).stats()
    }

    pub fn stats(&self) -> ControllerStats {
        lock(&self.shared.stats).clone()
    }
}

impl std::fmt::Debug for SearchController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchController")
            .field("source", &self.shared.source.describe())
            .field("sequence", &self.shared.current_sequence())
            .field("disposed", &self.shared.is_disposed())
            .finish()
    }
}
