//! Employer profile cache, shared by concurrent job-detail handlers.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;

use crate::error::CrawlError;

/// Attribute label → value from an employer's basic-info section,
/// e.g. `"Headquarters" → "Austin, TX"`.
pub type EmployerProfile = BTreeMap<String, String>;

type Slot = Arc<OnceCell<Arc<EmployerProfile>>>;

/// Employer id → profile, for one run.
///
/// Each id has one slot. Handlers that miss on the same id while a fetch is
/// in flight wait for that fetch instead of starting their own, so a
/// profile page is fetched at most once per run unless the fetch fails.
/// Nothing is ever evicted.
#[derive(Debug, Default)]
pub struct EmployerCache {
    slots: Mutex<HashMap<String, Slot>>,
}

impl EmployerCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, employer_id: &str) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(employer_id.to_owned()).or_default())
    }

    #[must_use]
    pub fn get(&self, employer_id: &str) -> Option<Arc<EmployerProfile>> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(employer_id)
            .and_then(|slot| slot.get().cloned())
    }

    /// Returns the cached profile, running `fetch` on a miss.
    ///
    /// Concurrent callers for the same id share one `fetch`. A failed fetch
    /// leaves the id uncached so a later caller tries again.
    ///
    /// # Errors
    ///
    /// Returns the error of the `fetch` this caller ran.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        employer_id: &str,
        fetch: F,
    ) -> Result<Arc<EmployerProfile>, CrawlError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<EmployerProfile, CrawlError>>,
    {
        let slot = self.slot(employer_id);
        slot.get_or_try_init(|| async { fetch().await.map(Arc::new) })
            .await
            .cloned()
    }

    /// Number of employers with a stored profile.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
