/*!
Steptime is a bidirectional format/parse engine for temporal values.

A formatter in Steptime is a sequence of immutable [`FormatStep`]s. Each
step wraps one processor that is responsible for exactly one field, like a
year, a literal separator or a time zone identifier. The step adds what
every field needs on top of that:

* Exact-width padding, with strict and lenient semantics.
* Section-local attributes layered over the attributes of each call.
* A condition that makes a section optional when printing.
* Or-block metadata for the driver that sequences many steps.
* Position tracking, so that callers can map printed fields back to spans
of the output.

Printing and parsing are symmetric. Printing reads the fields of a value
through the [`Fields`](element::Fields) trait and parsing writes them into
an [`Accumulator`](element::Accumulator). The [`FieldMap`](element::FieldMap)
type implements both, which makes round trips direct.

# Example

This formats and parses a padded time zone identifier:

```
use steptime::{
    attr::Attributes,
    element::{Element, FieldMap},
    fmt::{processor::TimeZoneIdProcessor, step::FormatStep, ParseLog},
    tz::{Registry, TimeZoneId},
};

let step = FormatStep::new(TimeZoneIdProcessor::new(), 0, 0, None)?.pad(5, 0)?;
let attrs = Attributes::new()
    .pad_char('0')
    .registry(Registry::new(["EST", "Europe/Berlin"]));

let value = FieldMap::new().with(Element::TIMEZONE_ID, TimeZoneId::new("EST"));
let mut out = String::new();
step.print(&value, &mut out, &attrs, None, false)?;
assert_eq!(out, "00EST");

let mut cursor = ParseLog::new();
let mut parsed = FieldMap::new();
step.parse(&out, &mut cursor, &attrs, &mut parsed, false);
assert_eq!(cursor.position(), 5);
assert_eq!(parsed, value);

# Ok::<(), Box<dyn std::error::Error>>(())
```

# Parse errors

Parsing never returns an error directly. Every failure is recorded on the
[`ParseLog`](fmt::ParseLog) passed in, together with the position it
occurred at. This lets a driver try alternatives (an or-block) without
unwinding.

# Crate features

* **std** (enabled by default) -
  Enables `std::error::Error` for [`Error`], the
  [`StdWrite`](fmt::StdWrite) sink adapter and the
  [`SharedRegistry`](tz::SharedRegistry).
* **logging** -
  Emits log messages through the `log` crate, e.g., when a step contains
  a fault of its processor. This is generally only useful for debugging.
* **serde** -
  Enables `Serialize` and `Deserialize` for
  [`Leniency`](attr::Leniency), [`TimeZoneId`](tz::TimeZoneId) and
  [`Offset`](tz::Offset).
*/

#![no_std]
#![deny(rustdoc::broken_intra_doc_links)]
// This adds Cargo feature annotations to items in the rustdoc output.
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
// We generally want all types to impl Debug.
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]

#[cfg(any(test, feature = "std"))]
extern crate std;

// Errors, identifiers and composite processors all allocate, so there is
// no core-only mode.
extern crate alloc;

pub use crate::{error::Error, fmt::step::FormatStep};

#[macro_use]
mod logging;

pub mod attr;
pub mod element;
mod error;
pub mod fmt;
pub mod tz;

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use crate::{
        attr::{Attributes, Leniency},
        element::{Element, FieldMap},
        fmt::{
            processor::{
                CompositeProcessor, FractionProcessor, LiteralProcessor,
                NumberProcessor, OffsetProcessor, TimeZoneIdProcessor,
            },
            ParseLog,
        },
        tz::{Offset, Registry, TimeZoneId},
    };

    use super::*;

    fn step(p: impl Into<fmt::processor::Processor>) -> FormatStep {
        FormatStep::new(p, 0, 0, None).unwrap()
    }

    #[test]
    fn timestamp_round_trip() {
        let _ = env_logger::try_init();

        let num = |e, min, max| step(NumberProcessor::new(e, min, max).unwrap());
        let lit = |s| step(LiteralProcessor::new(s));
        let steps = [
            num(Element::YEAR, 4, 4),
            lit("-"),
            num(Element::MONTH, 2, 2),
            lit("-"),
            num(Element::DAY_OF_MONTH, 2, 2),
            lit("T"),
            num(Element::HOUR_OF_DAY, 2, 2),
            lit(":"),
            num(Element::MINUTE_OF_HOUR, 2, 2),
            lit(":"),
            num(Element::SECOND_OF_MINUTE, 2, 2),
            step(FractionProcessor::new(0, 9, true).unwrap()),
            step(OffsetProcessor::extended()),
            lit("["),
            step(TimeZoneIdProcessor::new()),
            lit("]"),
        ];
        let formatter = step(CompositeProcessor::new(steps));
        let attrs = Attributes::new()
            .leniency(Leniency::Strict)
            .registry(Registry::new(["America/New_York", "Europe/Berlin"]));
        let value = FieldMap::new()
            .with(Element::YEAR, 2024)
            .with(Element::MONTH, 7)
            .with(Element::DAY_OF_MONTH, 14)
            .with(Element::HOUR_OF_DAY, 17)
            .with(Element::MINUTE_OF_HOUR, 30)
            .with(Element::SECOND_OF_MINUTE, 5)
            .with(Element::NANO_OF_SECOND, 250_000_000)
            .with(Element::TIMEZONE_OFFSET, Offset::constant(2))
            .with(Element::TIMEZONE_ID, TimeZoneId::new("Europe/Berlin"));

        let mut out = String::new();
        formatter.print(&value, &mut out, &attrs, None, false).unwrap();
        insta::assert_snapshot!(
            out,
            @"2024-07-14T17:30:05.25+02:00[Europe/Berlin]",
        );

        let mut cursor = ParseLog::new();
        let mut parsed = FieldMap::new();
        formatter.parse(&out, &mut cursor, &attrs, &mut parsed, false);
        assert!(!cursor.is_error(), "{:?}", cursor.error());
        assert_eq!(cursor.position(), out.len());
        assert_eq!(parsed, value);
    }
}
