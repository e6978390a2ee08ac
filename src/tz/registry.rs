use alloc::{sync::Arc, vec::Vec};

use crate::tz::TimeZoneId;

/// An immutable, sorted snapshot of time zone identifiers.
///
/// A registry holds every canonical and alias identifier known to some
/// external time zone database, sorted by name. Lookups are exact and case
/// sensitive, and are done via binary search. Since a snapshot can never be
/// mutated after construction, searching it concurrently from any number of
/// threads is always safe.
///
/// Cloning a registry is cheap: it only increments a reference count.
///
/// This crate never loads time zone data on its own. Callers build a
/// registry from whatever source they have and hand it to the formatting
/// machinery through [`Attributes::registry`](crate::attr::Attributes::registry).
///
/// # Example
///
/// ```
/// use steptime::tz::Registry;
///
/// let registry = Registry::new([
///     "Europe/Berlin", "America/New_York", "Asia/Tokyo",
/// ]);
/// assert_eq!(registry.len(), 3);
/// assert!(registry.get("Asia/Tokyo").is_some());
/// assert!(registry.get("asia/tokyo").is_none());
/// ```
#[derive(Clone)]
pub struct Registry {
    ids: Arc<[TimeZoneId]>,
}

impl Registry {
    /// Builds a new snapshot from the given identifiers.
    ///
    /// The identifiers may be given in any order and may contain duplicates.
    pub fn new<I, T>(ids: I) -> Registry
    where
        I: IntoIterator<Item = T>,
        T: Into<TimeZoneId>,
    {
        let mut ids: Vec<TimeZoneId> = ids.into_iter().map(Into::into).collect();
        ids.sort();
        ids.dedup();
        Registry { ids: ids.into() }
    }

    /// Returns a registry with no identifiers. Every lookup misses.
    pub fn empty() -> Registry {
        Registry { ids: Arc::from(Vec::new()) }
    }

    /// Returns the identifier exactly equal to `name`, if one exists.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&TimeZoneId> {
        self.search(name, &mut 0)
    }

    /// Returns the number of identifiers in this snapshot.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true when this snapshot has no identifiers.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns an iterator over all identifiers in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &TimeZoneId> + '_ {
        self.ids.iter()
    }

    /// Binary searches for `name`, adding the number of name comparisons
    /// done to `comparisons`.
    pub(crate) fn search(
        &self,
        name: &str,
        comparisons: &mut usize,
    ) -> Option<&TimeZoneId> {
        self.ids
            .binary_search_by(|id| {
                *comparisons += 1;
                id.as_str().cmp(name)
            })
            .ok()
            .map(|i| &self.ids[i])
    }
}

impl Default for Registry {
    fn default() -> Registry {
        Registry::empty()
    }
}

impl Eq for Registry {}

impl PartialEq for Registry {
    fn eq(&self, rhs: &Registry) -> bool {
        Arc::ptr_eq(&self.ids, &rhs.ids) || self.ids == rhs.ids
    }
}

impl core::hash::Hash for Registry {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        // Hashing every name would make hashing a step linear in the size
        // of the registry. The length is consistent with `Eq`.
        self.ids.len().hash(state);
    }
}

impl core::fmt::Debug for Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Registry").field("len", &self.ids.len()).finish()
    }
}

/// A registry handle whose snapshot can be replaced atomically.
///
/// Readers take a [`Registry`] snapshot and search it without holding any
/// lock. Publishing a new snapshot never disturbs searches already running
/// against an older one.
///
/// This is only available when the `std` feature is enabled.
///
/// # Example
///
/// ```
/// use steptime::tz::{Registry, SharedRegistry};
///
/// let shared = SharedRegistry::new(Registry::new(["Europe/Berlin"]));
/// let old = shared.snapshot();
/// shared.publish(Registry::new(["Europe/Berlin", "Europe/Paris"]));
///
/// assert_eq!(old.len(), 1);
/// assert_eq!(shared.snapshot().len(), 2);
/// ```
#[cfg(feature = "std")]
#[derive(Debug, Default)]
pub struct SharedRegistry {
    current: std::sync::RwLock<Registry>,
}

#[cfg(feature = "std")]
impl SharedRegistry {
    /// Creates a new shared handle starting with the given snapshot.
    pub fn new(registry: Registry) -> SharedRegistry {
        SharedRegistry { current: std::sync::RwLock::new(registry) }
    }

    /// Returns the most recently published snapshot.
    pub fn snapshot(&self) -> Registry {
        self.current.read().unwrap().clone()
    }

    /// Replaces the current snapshot with a new one.
    pub fn publish(&self, registry: Registry) {
        debug!(
            "publishing time zone registry snapshot with {} identifiers",
            registry.len(),
        );
        *self.current.write().unwrap() = registry;
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn sorted_and_deduplicated() {
        let registry =
            Registry::new(["Europe/Paris", "Asia/Tokyo", "Europe/Paris"]);
        let names: Vec<&str> = registry.iter().map(|id| id.as_str()).collect();
        assert_eq!(names, ["Asia/Tokyo", "Europe/Paris"]);
    }

    #[test]
    fn exact_case_sensitive_lookup() {
        let registry = Registry::new(["Europe/Berlin", "UTC"]);
        assert_eq!(registry.get("Europe/Berlin").unwrap(), "Europe/Berlin");
        assert!(registry.get("europe/berlin").is_none());
        assert!(registry.get("Europe/Berli").is_none());
        assert!(Registry::empty().get("UTC").is_none());
    }

    #[test]
    fn logarithmic_comparisons() {
        let names: Vec<alloc::string::String> =
            (0..1000).map(|i| alloc::format!("Zone/N{i:04}")).collect();
        let registry = Registry::new(names.iter().map(|s| s.as_str()));
        // ceil(log2(1000 + 1)) == 10
        for name in names.iter() {
            let mut comparisons = 0;
            assert!(registry.search(name, &mut comparisons).is_some());
            assert!(comparisons <= 10, "{name}: {comparisons} comparisons");
        }
        let mut comparisons = 0;
        assert!(registry.search("Zone/n0001", &mut comparisons).is_none());
        assert!(comparisons <= 10);
    }

    #[test]
    fn snapshot_equality() {
        let a = Registry::new(["A/B", "C/D"]);
        let b = Registry::new(["C/D", "A/B"]);
        assert_eq!(a, a.clone());
        assert_eq!(a, b);
        assert_ne!(a, Registry::new(["A/B"]));
    }

    #[cfg(feature = "std")]
    #[test]
    fn shared_publish_is_atomic_for_readers() {
        let shared = SharedRegistry::new(Registry::new(["A/B"]));
        let before = shared.snapshot();
        shared.publish(Registry::new(["A/B", "C/D"]));
        assert!(before.get("C/D").is_none());
        assert!(shared.snapshot().get("C/D").is_some());
    }
}
