use log::debug;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::domains::person::FilterCriteria;

/// Identifies one in-flight report request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTag {
    pub view: String,
    pub generation: u64,
    pub criteria: FilterCriteria,
}

#[derive(Debug, Default)]
struct ViewState {
    generation: u64,
    criteria: FilterCriteria,
}

/// Discards report responses that were overtaken by a newer request for the
/// same view or by a change of that view's criteria while they were in flight.
/// Each view is tracked on its own, so dashboards loading side by side do not
/// invalidate each other.
#[derive(Debug, Default)]
pub struct ReportRequestTracker {
    views: Mutex<HashMap<String, ViewState>>,
}

impl ReportRequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, ViewState>> {
        self.views.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start a new request for `criteria` on `view`, superseding every earlier
    /// request for that view
    pub fn begin(&self, view: &str, criteria: &FilterCriteria) -> RequestTag {
        let mut views = self.lock();
        let state = views.entry(view.to_string()).or_default();
        state.generation += 1;
        state.criteria = criteria.clone();
        RequestTag {
            view: view.to_string(),
            generation: state.generation,
            criteria: criteria.clone(),
        }
    }

    /// Record a criteria change on `view` that has not issued a request yet
    pub fn set_criteria(&self, view: &str, criteria: &FilterCriteria) {
        self.lock().entry(view.to_string()).or_default().criteria = criteria.clone();
    }

    /// Latest generation issued for `view`; zero before its first request
    pub fn current_generation(&self, view: &str) -> u64 {
        self.lock().get(view).map(|state| state.generation).unwrap_or(0)
    }

    pub fn is_current(&self, tag: &RequestTag) -> bool {
        self.lock()
            .get(&tag.view)
            .map(|state| tag.generation == state.generation && tag.criteria == state.criteria)
            .unwrap_or(false)
    }

    /// Hand back `response` if its request is still current, otherwise drop it
    pub fn accept<T>(&self, tag: &RequestTag, response: T) -> Option<T> {
        if self.is_current(tag) {
            Some(response)
        } else {
            debug!(
                "Discarding stale '{}' report response (generation {}, latest {})",
                tag.view,
                tag.generation,
                self.current_generation(&tag.view)
            );
            None
        }
    }
}
