/*!
Processors print one field of a value and parse it back.

Every processor implements the [`FormatProcessor`] capability trait. The
closed [`Processor`] enum selects among the variants provided by this crate
and is what a [`FormatStep`](crate::fmt::step::FormatStep) wraps.

# Failure contract

Printing fails with an error for which
[`Error::is_value_unavailable`](crate::Error::is_value_unavailable) returns
true when the value doesn't carry the field. Sink failures are returned
unchanged.

Parsing reports every grammar or lookup failure on the
[`ParseLog`](crate::fmt::ParseLog), at the position where the processor
started, and returns `Ok(())`. An `Err` from `parse` denotes an unexpected
fault. Steps contain such faults by converting them into a `ParseLog`
error, so they never reach the caller of a step.
*/

use alloc::vec::Vec;

use crate::{
    attr::{self, AttributeQuery, Attributes, Leniency},
    element::{Accumulator, Element, Fields},
    fmt::{ElementPosition, ParseLog, Write},
    Error,
};

pub use self::{
    composite::CompositeProcessor, fraction::FractionProcessor,
    literal::LiteralProcessor, number::NumberProcessor,
    offset::OffsetProcessor, tzid::TimeZoneIdProcessor,
};

mod composite;
mod fraction;
mod literal;
mod number;
mod offset;
mod tzid;

/// The capability shared by every processor.
pub trait FormatProcessor {
    /// Prints this processor's field of `fields` into `wtr` and returns the
    /// number of characters written.
    ///
    /// When `positions` is given and the sink reports its length, the span
    /// of the printed field is pushed onto it.
    fn print(
        &self,
        fields: &dyn Fields,
        wtr: &mut dyn Write,
        attrs: &dyn AttributeQuery,
        positions: Option<&mut Vec<ElementPosition>>,
        quick: bool,
    ) -> Result<usize, Error>;

    /// Parses this processor's field from `text` at the cursor position.
    ///
    /// On success, the cursor is advanced and the parsed value is written to
    /// `parsed`. On failure, the cursor records an error at the position
    /// where parsing started.
    fn parse(
        &self,
        text: &str,
        cursor: &mut ParseLog,
        attrs: &dyn AttributeQuery,
        parsed: &mut dyn Accumulator,
        quick: bool,
    ) -> Result<(), Error>;

    /// Returns the field this processor is bound to, or `None` for
    /// anonymous processors.
    fn element(&self) -> Option<Element>;

    /// Returns a copy of this processor bound to `element`.
    ///
    /// This fails when the value kind of `element` differs from the kind of
    /// the current element, unless `element` is dual.
    fn with_element(&self, element: Element) -> Result<Self, Error>
    where
        Self: Sized;

    /// Returns true when this processor only ever prints ASCII digits.
    fn is_numerical(&self) -> bool;

    /// Returns a copy of this processor with the given fully merged
    /// attributes and reserved width bound in advance.
    fn specialize(&self, attrs: &Attributes, reserved: usize) -> Self
    where
        Self: Sized;
}

/// One of the processors provided by this crate.
///
/// # Example
///
/// ```
/// use steptime::{
///     element::Element,
///     fmt::processor::{FormatProcessor, NumberProcessor, Processor},
/// };
///
/// let hour: Processor = NumberProcessor::new(Element::HOUR_OF_DAY, 2, 2)?.into();
/// assert!(hour.is_numerical());
/// assert_eq!(hour.element(), Some(Element::HOUR_OF_DAY));
///
/// let minute = hour.with_element(Element::MINUTE_OF_HOUR)?;
/// assert_eq!(minute.element(), Some(Element::MINUTE_OF_HOUR));
/// assert!(hour.with_element(Element::TIMEZONE_ID).is_err());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Processor {
    /// An integer field.
    Number(NumberProcessor),
    /// The fraction of a second.
    Fraction(FractionProcessor),
    /// Fixed text.
    Literal(LiteralProcessor),
    /// A fixed sequence of steps.
    Composite(CompositeProcessor),
    /// A fixed offset from UTC.
    Offset(OffsetProcessor),
    /// A time zone identifier or offset notation.
    TimeZoneId(TimeZoneIdProcessor),
}

macro_rules! dispatch {
    ($processor:expr, $p:ident => $body:expr) => {
        match *$processor {
            Processor::Number(ref $p) => $body,
            Processor::Fraction(ref $p) => $body,
            Processor::Literal(ref $p) => $body,
            Processor::Composite(ref $p) => $body,
            Processor::Offset(ref $p) => $body,
            Processor::TimeZoneId(ref $p) => $body,
        }
    };
}

impl Processor {
    /// Returns true for fraction processors.
    pub fn is_decimal(&self) -> bool {
        matches!(*self, Processor::Fraction(_))
    }
}

impl FormatProcessor for Processor {
    #[inline]
    fn print(
        &self,
        fields: &dyn Fields,
        wtr: &mut dyn Write,
        attrs: &dyn AttributeQuery,
        positions: Option<&mut Vec<ElementPosition>>,
        quick: bool,
    ) -> Result<usize, Error> {
        dispatch!(self, p => p.print(fields, wtr, attrs, positions, quick))
    }

    #[inline]
    fn parse(
        &self,
        text: &str,
        cursor: &mut ParseLog,
        attrs: &dyn AttributeQuery,
        parsed: &mut dyn Accumulator,
        quick: bool,
    ) -> Result<(), Error> {
        dispatch!(self, p => p.parse(text, cursor, attrs, parsed, quick))
    }

    fn element(&self) -> Option<Element> {
        dispatch!(self, p => p.element())
    }

    fn with_element(&self, element: Element) -> Result<Processor, Error> {
        dispatch!(self, p => p.with_element(element).map(Processor::from))
    }

    fn is_numerical(&self) -> bool {
        dispatch!(self, p => p.is_numerical())
    }

    fn specialize(&self, attrs: &Attributes, reserved: usize) -> Processor {
        dispatch!(self, p => Processor::from(p.specialize(attrs, reserved)))
    }
}

impl core::fmt::Display for Processor {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        dispatch!(self, p => core::fmt::Display::fmt(p, f))
    }
}

impl From<NumberProcessor> for Processor {
    fn from(p: NumberProcessor) -> Processor {
        Processor::Number(p)
    }
}

impl From<FractionProcessor> for Processor {
    fn from(p: FractionProcessor) -> Processor {
        Processor::Fraction(p)
    }
}

impl From<LiteralProcessor> for Processor {
    fn from(p: LiteralProcessor) -> Processor {
        Processor::Literal(p)
    }
}

impl From<CompositeProcessor> for Processor {
    fn from(p: CompositeProcessor) -> Processor {
        Processor::Composite(p)
    }
}

impl From<OffsetProcessor> for Processor {
    fn from(p: OffsetProcessor) -> Processor {
        Processor::Offset(p)
    }
}

impl From<TimeZoneIdProcessor> for Processor {
    fn from(p: TimeZoneIdProcessor) -> Processor {
        Processor::TimeZoneId(p)
    }
}

/// Returns the leniency to parse with.
///
/// Specialized processors carry a pre-resolved leniency that is used on the
/// quick path. Otherwise the attributes are consulted.
#[inline]
fn effective_leniency(
    resolved: Option<Leniency>,
    attrs: &dyn AttributeQuery,
    quick: bool,
) -> Leniency {
    match resolved {
        Some(leniency) if quick => leniency,
        _ => attr::leniency(attrs),
    }
}
