use alloc::vec::Vec;

use crate::{
    attr::{AttributeQuery, Attributes},
    element::{Accumulator, Element, Fields, Value},
    error::{element::Error as V, tz::Error as E},
    fmt::{
        processor::{FormatProcessor, OffsetProcessor},
        record, remaining, ElementPosition, ParseLog, Write,
    },
    tz::Offset,
    Error,
};

/// Prints and parses a time zone identifier like `Europe/Berlin`.
///
/// Printing writes the [`Element::TIMEZONE_ID`] field verbatim.
///
/// Parsing reads the longest run of ASCII letters, `-`, `_` and `/`, drops
/// a trailing non-letter and then interprets the name:
///
/// * `Z` is the zero offset.
/// * `UTC`, `GMT` and `UT` are the zero offset, unless they are followed by
/// `+` or `-`, in which case the offset after them is parsed.
/// * Names starting with `Etc/GMT` are rejected, since their sign is the
/// inverse of the sign of the offset they denote.
/// * Everything else must exactly match an identifier in the registry
/// given by the `registry` attribute.
///
/// Offsets are written to [`Element::TIMEZONE_OFFSET`] and identifiers to
/// [`Element::TIMEZONE_ID`].
///
/// # Example
///
/// ```
/// use steptime::{
///     attr::Attributes,
///     element::{Element, FieldMap},
///     fmt::{processor::TimeZoneIdProcessor, step::FormatStep, ParseLog},
///     tz::{Offset, Registry},
/// };
///
/// let step = FormatStep::new(TimeZoneIdProcessor::new(), 0, 0, None)?;
/// let attrs = Attributes::new().registry(Registry::new(["Asia/Tokyo"]));
///
/// let mut cursor = ParseLog::new();
/// let mut parsed = FieldMap::new();
/// step.parse("GMT-03:30", &mut cursor, &attrs, &mut parsed, false);
/// assert_eq!(cursor.position(), 9);
/// assert_eq!(
///     parsed.offset(Element::TIMEZONE_OFFSET),
///     Some(Offset::constant_seconds(-12_600)),
/// );
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct TimeZoneIdProcessor {
    _priv: (),
}

impl TimeZoneIdProcessor {
    /// Creates the time zone identifier processor.
    pub const fn new() -> TimeZoneIdProcessor {
        TimeZoneIdProcessor { _priv: () }
    }
}

impl FormatProcessor for TimeZoneIdProcessor {
    fn print(
        &self,
        fields: &dyn Fields,
        wtr: &mut dyn Write,
        _attrs: &dyn AttributeQuery,
        positions: Option<&mut Vec<ElementPosition>>,
        _quick: bool,
    ) -> Result<usize, Error> {
        let id = match fields.get(Element::TIMEZONE_ID) {
            Some(Value::Zone(id)) => id,
            _ => {
                return Err(Error::from(V::ValueUnavailable {
                    element: Element::TIMEZONE_ID.name(),
                }))
            }
        };
        let start = wtr.len_written();
        wtr.write_str(id.as_str())?;
        record(positions, Element::TIMEZONE_ID, start, id.as_str().len());
        Ok(id.as_str().chars().count())
    }

    fn parse(
        &self,
        text: &str,
        cursor: &mut ParseLog,
        attrs: &dyn AttributeQuery,
        parsed: &mut dyn Accumulator,
        quick: bool,
    ) -> Result<(), Error> {
        let start = cursor.position();
        let rest = remaining(text, start);
        if rest.is_empty() {
            cursor.set_error(
                start,
                Error::from(E::MissingName { position: start }),
            );
            return Ok(());
        }

        let mut name = {
            let len = rest
                .bytes()
                .take_while(|&b| {
                    b.is_ascii_alphabetic() || matches!(b, b'-' | b'_' | b'/')
                })
                .count();
            &rest[..len]
        };
        if name.bytes().last().map_or(false, |b| !b.is_ascii_alphabetic()) {
            name = &name[..name.len() - 1];
        }
        let end = start + name.len();

        if name.is_empty() {
            cursor.set_error(
                start,
                Error::from(E::MissingValidId { position: start }),
            );
            return Ok(());
        }
        if name.starts_with("Etc/GMT") {
            cursor.set_error(start, Error::from(E::inverse_etc_gmt(name, start)));
            return Ok(());
        }
        if name == "Z" {
            parsed.put(Element::TIMEZONE_OFFSET, Value::Offset(Offset::UTC));
            cursor.set_position(end);
            return Ok(());
        }
        if matches!(name, "UTC" | "GMT" | "UT") {
            if matches!(text.as_bytes().get(end), Some(&b'+' | &b'-')) {
                trace!("delegating offset after {name:?} at {end} to offset parser");
                cursor.set_position(end);
                return OffsetProcessor::extended()
                    .parse(text, cursor, attrs, parsed, quick);
            }
            parsed.put(Element::TIMEZONE_OFFSET, Value::Offset(Offset::UTC));
            cursor.set_position(end);
            return Ok(());
        }

        let mut comparisons = 0;
        let found = attrs
            .get_registry()
            .and_then(|registry| registry.search(name, &mut comparisons));
        match found {
            Some(id) => {
                trace!("resolved {name:?} after {comparisons} comparisons");
                parsed.put(Element::TIMEZONE_ID, Value::Zone(id.clone()));
                cursor.set_position(end);
            }
            None => {
                cursor.set_error(start, Error::from(E::unresolved(name, start)));
            }
        }
        Ok(())
    }

    fn element(&self) -> Option<Element> {
        Some(Element::TIMEZONE_ID)
    }

    fn with_element(&self, element: Element) -> Result<TimeZoneIdProcessor, Error> {
        Element::TIMEZONE_ID.check_rebind(element)?;
        Ok(*self)
    }

    fn is_numerical(&self) -> bool {
        false
    }

    fn specialize(&self, _attrs: &Attributes, _reserved: usize) -> TimeZoneIdProcessor {
        *self
    }
}

impl core::fmt::Display for TimeZoneIdProcessor {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str("TimeZoneIdProcessor")
    }
}
