/*!
Time zone identifiers, fixed offsets and the registry of known identifiers.

This module deliberately doesn't know anything about time zone transition
rules. A [`TimeZoneId`] is just a validated name, an [`Offset`] is a fixed
distance from UTC and a [`Registry`] is a sorted snapshot of names that the
[`TimeZoneIdProcessor`](crate::fmt::processor::TimeZoneIdProcessor) consults
when parsing.
*/

use alloc::sync::Arc;

pub use self::offset::Offset;
#[cfg(feature = "std")]
pub use self::registry::SharedRegistry;
pub use self::registry::Registry;

pub(crate) mod offset;
mod registry;

/// The name of a time zone, e.g., `Europe/Berlin` or `UTC`.
///
/// Identifiers compare and sort by their name. Cloning is cheap.
///
/// # Example
///
/// ```
/// use steptime::tz::TimeZoneId;
///
/// let id = TimeZoneId::new("America/New_York");
/// assert_eq!(id.as_str(), "America/New_York");
/// assert_eq!(id.to_string(), "America/New_York");
/// ```
#[derive(Clone, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct TimeZoneId(Arc<str>);

impl TimeZoneId {
    /// Creates a new identifier from the given name.
    ///
    /// No validation is done here. Parsing only ever produces identifiers
    /// found in a [`Registry`].
    pub fn new(name: &str) -> TimeZoneId {
        TimeZoneId(Arc::from(name))
    }

    /// Returns the name of this identifier.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TimeZoneId {
    fn from(name: &str) -> TimeZoneId {
        TimeZoneId::new(name)
    }
}

impl From<alloc::string::String> for TimeZoneId {
    fn from(name: alloc::string::String) -> TimeZoneId {
        TimeZoneId(Arc::from(name))
    }
}

impl AsRef<str> for TimeZoneId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for TimeZoneId {
    fn eq(&self, rhs: &str) -> bool {
        self.as_str() == rhs
    }
}

impl core::fmt::Debug for TimeZoneId {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "TimeZoneId({:?})", self.as_str())
    }
}

impl core::fmt::Display for TimeZoneId {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for TimeZoneId {
    #[inline]
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TimeZoneId {
    #[inline]
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<TimeZoneId, D::Error> {
        use serde::de;

        struct TimeZoneIdVisitor;

        impl<'de> de::Visitor<'de> for TimeZoneIdVisitor {
            type Value = TimeZoneId;

            fn expecting(
                &self,
                f: &mut core::fmt::Formatter,
            ) -> core::fmt::Result {
                f.write_str("a time zone identifier")
            }

            #[inline]
            fn visit_str<E: de::Error>(
                self,
                value: &str,
            ) -> Result<TimeZoneId, E> {
                Ok(TimeZoneId::new(value))
            }
        }

        deserializer.deserialize_str(TimeZoneIdVisitor)
    }
}
