//! Debounced search-as-you-type over a [`Geocoder`].
//!
//! Every input bumps a request id and cancels the pending search (timer or
//! in-flight request). A finished search only updates the shared state when
//! its id is still the latest, so overlapping responses can never apply out
//! of order.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::config::get_config;
use crate::dto::geocode_dto::GeocodeResult;
use crate::services::geocode_service::Geocoder;

pub const MIN_QUERY_LEN: usize = 3;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSnapshot {
    pub query: String,
    pub results: Vec<GeocodeResult>,
    pub open: bool,
}

#[derive(Default)]
struct SearchState {
    query: String,
    results: Vec<GeocodeResult>,
    open: bool,
    latest: u64,
    pending: Option<JoinHandle<()>>,
}

impl SearchState {
    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

fn lock(state: &Mutex<SearchState>) -> MutexGuard<'_, SearchState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct LocationSearch<G: Geocoder> {
    geocoder: Arc<G>,
    delay: Duration,
    state: Arc<Mutex<SearchState>>,
}

impl<G: Geocoder> LocationSearch<G> {
    pub fn new(geocoder: Arc<G>, delay: Duration) -> Self {
        Self {
            geocoder,
            delay,
            state: Arc::new(Mutex::new(SearchState::default())),
        }
    }

    /// Uses the `SEARCH_DEBOUNCE_MS` delay.
    pub fn with_configured_delay(geocoder: Arc<G>) -> Self {
        Self::new(geocoder, Duration::from_millis(get_config().search_debounce_ms))
    }

    /// Must be called from within a Tokio runtime.
    pub fn input(&self, query: &str) {
        let mut state = lock(&self.state);
        state.query = query.to_string();
        state.latest += 1;
        state.cancel_pending();

        let trimmed = query.trim();
        if trimmed.chars().count() < MIN_QUERY_LEN {
            state.results.clear();
            state.open = false;
            return;
        }

        let request_id = state.latest;
        let geocoder = Arc::clone(&self.geocoder);
        let shared = Arc::clone(&self.state);
        let delay = self.delay;
        let query = trimmed.to_string();

        state.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let outcome = geocoder.search(&query).await;

            let mut state = lock(&shared);
            if state.latest != request_id {
                tracing::debug!(request_id, latest = state.latest, "discarding stale location search");
                return;
            }
            state.pending = None;
            match outcome {
                Ok(results) => {
                    state.open = !results.is_empty();
                    state.results = results;
                }
                Err(e) => {
                    tracing::debug!(error = %e, query = %query, "location search failed");
                    state.results.clear();
                    state.open = false;
                }
            }
        }));
    }

    /// Picks a result, closes the dropdown and puts the place name in the box.
    pub fn select(&self, index: usize) -> Option<GeocodeResult> {
        let mut state = lock(&self.state);
        let picked = state.results.get(index).cloned()?;
        state.latest += 1;
        state.cancel_pending();
        state.query = picked.display_name.clone();
        state.open = false;
        Some(picked)
    }

    /// Outside click: hide the dropdown, keep the query.
    pub fn dismiss(&self) {
        lock(&self.state).open = false;
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        let state = lock(&self.state);
        SearchSnapshot {
            query: state.query.clone(),
            results: state.results.clone(),
            open: state.open,
        }
    }
}

impl<G: Geocoder> Drop for LocationSearch<G> {
    fn drop(&mut self) {
        lock(&self.state).cancel_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::models::company::Address;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeGeocoder {
        calls: AtomicUsize,
        queries: Mutex<Vec<String>>,
    }

    impl FakeGeocoder {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Geocoder for FakeGeocoder {
        async fn search(&self, query: &str) -> Result<Vec<GeocodeResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().unwrap().push(query.to_string());
            if query.starts_with("slow") {
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
            if query == "fail" {
                return Err(Error::Internal("upstream down".into()));
            }
            Ok(vec![GeocodeResult {
                display_name: format!("{}, Spain", query),
                latitude: 36.0,
                longitude: -5.6,
                address: Address {
                    city: Some(query.to_string()),
                    country: Some("ES".into()),
                    ..Address::default()
                },
            }])
        }
    }

    fn search(fake: &Arc<FakeGeocoder>) -> LocationSearch<FakeGeocoder> {
        LocationSearch::new(Arc::clone(fake), DEFAULT_DEBOUNCE)
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_keystrokes_sends_one_request() {
        let fake = Arc::new(FakeGeocoder::default());
        let search = search(&fake);

        for query in ["tari", "tarif", "tarifa", "tarifa ", "tarifa b"] {
            search.input(query);
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(fake.calls(), 1);
        assert_eq!(fake.queries.lock().unwrap().as_slice(), ["tarifa b"]);
        let snapshot = search.snapshot();
        assert!(snapshot.open);
        assert_eq!(snapshot.results[0].display_name, "tarifa b, Spain");
    }

    #[tokio::test(start_paused = true)]
    async fn short_queries_never_search() {
        let fake = Arc::new(FakeGeocoder::default());
        let search = search(&fake);

        search.input("ta");
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(fake.calls(), 0);
        assert!(!search.snapshot().open);
    }

    #[tokio::test(start_paused = true)]
    async fn newer_input_supersedes_in_flight_request() {
        let fake = Arc::new(FakeGeocoder::default());
        let search = search(&fake);

        search.input("slow lagoon");
        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(fake.calls(), 1);

        search.input("dahab");
        tokio::time::sleep(Duration::from_millis(1000)).await;

        assert_eq!(fake.calls(), 2);
        let snapshot = search.snapshot();
        assert_eq!(snapshot.results.len(), 1);
        assert_eq!(snapshot.results[0].display_name, "dahab, Spain");
    }

    #[tokio::test(start_paused = true)]
    async fn failures_are_swallowed() {
        let fake = Arc::new(FakeGeocoder::default());
        let search = search(&fake);

        search.input("fail");
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(fake.calls(), 1);
        let snapshot = search.snapshot();
        assert!(snapshot.results.is_empty());
        assert!(!snapshot.open);
        assert_eq!(snapshot.query, "fail");
    }

    #[tokio::test(start_paused = true)]
    async fn select_and_dismiss() {
        let fake = Arc::new(FakeGeocoder::default());
        let search = search(&fake);

        search.input("tarifa");
        tokio::time::sleep(Duration::from_millis(400)).await;
        search.dismiss();
        let snapshot = search.snapshot();
        assert!(!snapshot.open);
        assert_eq!(snapshot.query, "tarifa");

        let picked = search.select(0).unwrap();
        assert_eq!(picked.address.city.as_deref(), Some("tarifa"));
        assert_eq!(search.snapshot().query, "tarifa, Spain");
        assert!(search.select(5).is_none());
    }
}
