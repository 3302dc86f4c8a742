//! Locator session: the state container driving the locate → fetch → rank →
//! select → route pipeline

use crate::Result;
use crate::coord::Coordinate;
use crate::debounce::{DEFAULT_DEBOUNCE_WINDOW, Debounce};
use crate::place::{Place, RankedPlace, ResultSet};
use crate::sources::{RouteGeometry, RouteRequest};
use instant::Instant;
use std::time::Duration;

/// A debounced places fetch handed to the controller for execution
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FetchJob {
    /// Sequence number to hand back to [`LocatorSession::complete_fetch`]
    pub seq: u64,
    pub origin: Coordinate,
}

/// A route derivation handed to the controller for execution
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RouteJob {
    /// Sequence number to hand back to [`LocatorSession::complete_route`]
    pub seq: u64,
    pub request: RouteRequest,
}

/// State container for the locator pipeline
///
/// All mutation happens through explicit transition methods called from a
/// single thread (the frame loop). Spawned work only hands outcomes back via
/// [`LocatorSession::complete_fetch`] and [`LocatorSession::complete_route`]
/// together with the sequence number of the job that produced them, so a late
/// completion of a superseded job never overwrites newer state.
pub struct LocatorSession {
    origin: Option<Coordinate>,
    gate: Debounce<Coordinate>,
    results: Option<ResultSet>,
    selected: Option<usize>,
    route: Option<RouteGeometry>,
    error: Option<String>,
    loading: bool,
    fetch_seq: u64,
    route_seq: u64,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl LocatorSession {
    pub fn new(debounce_window: Duration) -> Self {
        Self {
            origin: None,
            gate: Debounce::new(debounce_window),
            results: None,
            selected: None,
            route: None,
            error: None,
            loading: false,
            fetch_seq: 0,
            route_seq: 0,
        }
    }

    /// Record a position and submit it to the debounce gate
    ///
    /// Non-finite or out-of-range input sets the user-visible error without
    /// arming the gate, so no downstream fetch is ever issued for it.
    pub fn request_fetch(&mut self, latitude: f64, longitude: f64, now: Instant) {
        match Coordinate::new(latitude, longitude).validated() {
            Ok(origin) => {
                self.origin = Some(origin);
                self.gate.submit(origin, now);
            }
            Err(err) => {
                tracing::warn!("Rejecting fetch request: {err}");
                self.error = Some(err.to_string());
            }
        }
    }

    /// Record a failed position acquisition in the user-visible error slot
    pub fn report_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Advance the debounce gate and start the fetch it releases, if any
    ///
    /// Exactly one loading-flag transition pair happens per released job: the
    /// flag is raised here and lowered by the matching `complete_fetch`.
    pub fn poll_fetch(&mut self, now: Instant) -> Option<FetchJob> {
        let origin = self.gate.poll(now)?;
        self.fetch_seq += 1;
        self.loading = true;
        self.error = None;
        Some(FetchJob {
            seq: self.fetch_seq,
            origin,
        })
    }

    /// Apply the outcome of a fetch job
    ///
    /// Outcomes whose sequence number is not the latest issued one are
    /// dropped entirely. On success the ranked results replace the previous
    /// set wholesale and the selection and route are cleared, since they
    /// referred to the replaced set. On failure the previous results are kept
    /// and the failure message lands in the user-visible error slot.
    pub fn complete_fetch(&mut self, seq: u64, outcome: Result<Vec<Place>>) {
        if seq != self.fetch_seq {
            tracing::debug!(
                "Ignoring stale fetch completion (seq {seq}, current {})",
                self.fetch_seq
            );
            return;
        }

        self.loading = false;
        match outcome {
            Ok(places) => {
                let Some(origin) = self.origin else {
                    tracing::warn!("Fetch completed without an origin; dropping results");
                    return;
                };
                self.results = Some(ResultSet::rank(places, origin));
                self.selected = None;
                self.route = None;
            }
            Err(err) => {
                tracing::warn!("Places fetch failed: {err}");
                self.error = Some(err.to_string());
            }
        }
    }

    /// Select a ranked place and derive the route job for it
    ///
    /// The previously stored route is cleared before the new request goes
    /// out. Returns `None` for an out-of-range index.
    pub fn select(&mut self, index: usize) -> Option<RouteJob> {
        let Some(results) = &self.results else {
            tracing::warn!("Selection with no results present");
            return None;
        };
        let Some(entry) = results.get(index) else {
            tracing::warn!("Selection index {index} out of range ({} results)", results.len());
            return None;
        };
        let Some(origin) = self.origin else {
            tracing::warn!("Selection without an origin position");
            return None;
        };

        self.selected = Some(index);
        self.route = None;
        self.route_seq += 1;
        Some(RouteJob {
            seq: self.route_seq,
            request: RouteRequest {
                origin,
                destination: entry.place.position,
            },
        })
    }

    /// Apply the outcome of a route job
    ///
    /// Stale sequence numbers are dropped. Route failures never reach the
    /// user-visible error slot; they are only logged.
    pub fn complete_route(&mut self, seq: u64, outcome: Result<RouteGeometry>) {
        if seq != self.route_seq {
            tracing::debug!(
                "Ignoring stale route completion (seq {seq}, current {})",
                self.route_seq
            );
            return;
        }

        match outcome {
            Ok(geometry) => self.route = Some(geometry),
            Err(err) => tracing::warn!("{err}"),
        }
    }

    /// The acquired user position, once one exists
    #[inline]
    pub fn origin(&self) -> Option<Coordinate> {
        self.origin
    }

    /// The current ranked results, once a fetch has completed
    #[inline]
    pub fn results(&self) -> Option<&ResultSet> {
        self.results.as_ref()
    }

    #[inline]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_place(&self) -> Option<&RankedPlace> {
        self.results.as_ref()?.get(self.selected?)
    }

    #[inline]
    pub fn route(&self) -> Option<&RouteGeometry> {
        self.route.as_ref()
    }

    /// The user-visible error message, last one wins
    #[inline]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a released fetch is still in flight
    #[inline]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether a submission is waiting on the debounce gate
    #[inline]
    pub fn fetch_pending(&self) -> bool {
        self.gate.is_pending()
    }
}

impl Default for LocatorSession {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_WINDOW)
    }
}
