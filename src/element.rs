/*!
Field identities, typed field values and the views used to read and write
them.

An [`Element`] names one field of a temporal value, like the hour of day or
the time zone identifier. Processors read the value they print through the
[`Fields`] trait and write the values they parse through the
[`Accumulator`] trait. [`FieldMap`] implements both and is the simplest way
to drive a print/parse round trip.
*/

use alloc::collections::BTreeMap;

use crate::{
    error::element::Error as E,
    tz::{Offset, TimeZoneId},
    Error,
};

/// The kind of value an element carries.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum ValueKind {
    /// A signed integer, e.g., a year or an hour.
    Integer,
    /// A time zone identifier.
    Zone,
    /// A fixed offset from UTC.
    Offset,
}

/// The identity of a single field of a temporal value.
///
/// Elements are cheap `Copy` keys. Two elements are equal only when their
/// name, value kind and dual flag all agree.
///
/// An element may be declared *dual*. A dual element accepts rebinding from
/// a processor whose current element carries a different value kind. This
/// mirrors fields with two equally valid textual renderings, e.g., a month
/// written either as a number or as text.
///
/// # Example
///
/// ```
/// use steptime::element::{Element, ValueKind};
///
/// const WEEK: Element = Element::new("WEEK_OF_YEAR", ValueKind::Integer);
/// assert_eq!(WEEK.name(), "WEEK_OF_YEAR");
/// assert!(!WEEK.is_dual());
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Element {
    name: &'static str,
    kind: ValueKind,
    dual: bool,
}

impl Element {
    /// The proleptic year.
    pub const YEAR: Element = Element::new("YEAR", ValueKind::Integer);
    /// The month of the year, `1..=12`.
    pub const MONTH: Element = Element::new("MONTH", ValueKind::Integer);
    /// The day of the month, `1..=31`.
    pub const DAY_OF_MONTH: Element =
        Element::new("DAY_OF_MONTH", ValueKind::Integer);
    /// The hour of the day, `0..=23`.
    pub const HOUR_OF_DAY: Element =
        Element::new("HOUR_OF_DAY", ValueKind::Integer);
    /// The minute of the hour, `0..=59`.
    pub const MINUTE_OF_HOUR: Element =
        Element::new("MINUTE_OF_HOUR", ValueKind::Integer);
    /// The second of the minute, `0..=59`.
    pub const SECOND_OF_MINUTE: Element =
        Element::new("SECOND_OF_MINUTE", ValueKind::Integer);
    /// The fraction of the second in nanoseconds, `0..=999_999_999`.
    pub const NANO_OF_SECOND: Element =
        Element::new("NANO_OF_SECOND", ValueKind::Integer);
    /// The time zone identifier, e.g., `Europe/Berlin`.
    pub const TIMEZONE_ID: Element =
        Element::new("TIMEZONE_ID", ValueKind::Zone);
    /// The fixed offset from UTC, e.g., `+02:00`.
    pub const TIMEZONE_OFFSET: Element =
        Element::new("TIMEZONE_OFFSET", ValueKind::Offset);

    /// Creates a new element with the given name and value kind.
    pub const fn new(name: &'static str, kind: ValueKind) -> Element {
        Element { name, kind, dual: false }
    }

    /// Creates a new element that declares dual format compatibility.
    pub const fn dual(name: &'static str, kind: ValueKind) -> Element {
        Element { name, kind, dual: true }
    }

    /// Returns the name of this element.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the kind of value this element carries.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Returns true when this element declares dual format compatibility.
    #[inline]
    pub fn is_dual(&self) -> bool {
        self.dual
    }

    /// Checks that a processor bound to `self` may be rebound to `to`.
    pub(crate) fn check_rebind(&self, to: Element) -> Result<(), Error> {
        if self.kind == to.kind || to.dual {
            return Ok(());
        }
        Err(Error::from(E::Incompatible { from: self.name, to: to.name }))
    }
}

impl core::fmt::Display for Element {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(self.name)
    }
}

/// The value of a single field.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Value {
    /// An integer field value.
    Integer(i64),
    /// A time zone identifier.
    Zone(TimeZoneId),
    /// A fixed offset from UTC.
    Offset(Offset),
}

impl Value {
    /// Returns the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match *self {
            Value::Integer(_) => ValueKind::Integer,
            Value::Zone(_) => ValueKind::Zone,
            Value::Offset(_) => ValueKind::Offset,
        }
    }

    pub(crate) fn as_integer(&self) -> Option<i64> {
        match *self {
            Value::Integer(n) => Some(n),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Value {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Value {
        Value::Integer(i64::from(n))
    }
}

impl From<TimeZoneId> for Value {
    fn from(id: TimeZoneId) -> Value {
        Value::Zone(id)
    }
}

impl From<Offset> for Value {
    fn from(offset: Offset) -> Value {
        Value::Offset(offset)
    }
}

/// A read-only view of the fields of a value being printed.
pub trait Fields {
    /// Returns the value of `element`, if present.
    fn get(&self, element: Element) -> Option<Value>;
}

impl<F: Fields + ?Sized> Fields for &F {
    fn get(&self, element: Element) -> Option<Value> {
        (**self).get(element)
    }
}

/// A write-only sink for the values produced while parsing.
///
/// Later writes for the same element replace earlier ones.
pub trait Accumulator {
    /// Records `value` for `element`.
    fn put(&mut self, element: Element, value: Value);
}

impl<A: Accumulator + ?Sized> Accumulator for &mut A {
    fn put(&mut self, element: Element, value: Value) {
        (**self).put(element, value)
    }
}

/// An ordered map of element values.
///
/// This is both a [`Fields`] view and an [`Accumulator`].
///
/// # Example
///
/// ```
/// use steptime::{element::{Element, FieldMap, Value}, tz::TimeZoneId};
///
/// let fields = FieldMap::new()
///     .with(Element::HOUR_OF_DAY, 9)
///     .with(Element::TIMEZONE_ID, TimeZoneId::new("Asia/Tokyo"));
/// assert_eq!(fields.integer(Element::HOUR_OF_DAY), Some(9));
/// assert_eq!(fields.len(), 2);
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldMap {
    map: BTreeMap<Element, Value>,
}

impl FieldMap {
    /// Creates a new empty field map.
    pub fn new() -> FieldMap {
        FieldMap::default()
    }

    /// Returns this map with `element` set to `value`.
    pub fn with(mut self, element: Element, value: impl Into<Value>) -> FieldMap {
        self.map.insert(element, value.into());
        self
    }

    /// Returns the value recorded for `element`.
    pub fn value(&self, element: Element) -> Option<&Value> {
        self.map.get(&element)
    }

    /// Returns the integer recorded for `element`, if it is an integer.
    pub fn integer(&self, element: Element) -> Option<i64> {
        self.map.get(&element).and_then(Value::as_integer)
    }

    /// Returns the time zone identifier recorded for `element`.
    pub fn zone(&self, element: Element) -> Option<&TimeZoneId> {
        match self.map.get(&element)? {
            Value::Zone(ref id) => Some(id),
            _ => None,
        }
    }

    /// Returns the offset recorded for `element`.
    pub fn offset(&self, element: Element) -> Option<Offset> {
        match *self.map.get(&element)? {
            Value::Offset(offset) => Some(offset),
            _ => None,
        }
    }

    /// Returns the number of recorded fields.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true when no field has been recorded.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Removes every recorded field.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Returns all recorded fields in element order.
    pub fn iter(&self) -> impl Iterator<Item = (Element, &Value)> + '_ {
        self.map.iter().map(|(&e, v)| (e, v))
    }
}

impl Fields for FieldMap {
    fn get(&self, element: Element) -> Option<Value> {
        self.map.get(&element).cloned()
    }
}

impl Accumulator for FieldMap {
    fn put(&mut self, element: Element, value: Value) {
        self.map.insert(element, value);
    }
}
