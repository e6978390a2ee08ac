/*!
Bidirectional printing and parsing of temporal values, one field at a time.

A formatter in this crate is an ordered sequence of [`FormatStep`]s. Each
step wraps exactly one [`Processor`], which knows how to print one field of
a value and how to parse that field back out of text. The step adds the
things every field needs regardless of its kind: layered attributes,
padding to an exact width, conditional printing and or-block metadata for
the driver that sequences the steps.

# Printing

Printing writes into anything implementing this module's [`Write`] trait.
It's implemented for `String` and `Vec<u8>`, and the [`StdWrite`] and
[`FmtWrite`] adapters cover `std::io::Write` and `core::fmt::Write`. When
the caller asks for them, processors record the [`ElementPosition`] of
every field they print. Spans are only recorded when the sink can report
how much has been written to it so far.

# Parsing

Parsing reads from a `&str` and tracks progress with a [`ParseLog`]. A step
never returns a parse failure. Instead, the failure is recorded on the
`ParseLog` together with the position at which the step started, so a
driver can try an alternative at that same position.

Positions are byte offsets. Widths used for padding are counted in
characters.

# Example

This prints a time zone identifier left-padded to seven characters and
parses it back:

```
use steptime::{
    attr::Attributes,
    element::{Element, FieldMap},
    fmt::{processor::TimeZoneIdProcessor, step::FormatStep, ParseLog},
    tz::{Registry, TimeZoneId},
};

let attrs = Attributes::new()
    .pad_char('*')
    .registry(Registry::new(["EST", "Europe/Berlin"]));
let step = FormatStep::new(TimeZoneIdProcessor::new(), 0, 0, None)?
    .pad(7, 0)?;

let value = FieldMap::new().with(Element::TIMEZONE_ID, TimeZoneId::new("EST"));
let mut out = String::new();
let written = step.print(&value, &mut out, &attrs, None, false)?;
assert_eq!(out, "****EST");
assert_eq!(written, 7);

let mut cursor = ParseLog::new();
let mut parsed = FieldMap::new();
step.parse(&out, &mut cursor, &attrs, &mut parsed, false);
assert!(!cursor.is_error());
assert_eq!(cursor.position(), 7);
assert_eq!(parsed.zone(Element::TIMEZONE_ID).unwrap(), "EST");

# Ok::<(), Box<dyn std::error::Error>>(())
```

[`FormatStep`]: crate::fmt::step::FormatStep
[`Processor`]: crate::fmt::processor::Processor
*/

use alloc::{string::String, vec::Vec};

use crate::{element::Element, Error};

pub mod processor;
pub mod step;
mod util;

/// A trait for printing into an output sink.
///
/// This is a simplified version of `core::fmt::Write` whose errors are this
/// crate's [`Error`] type, so that sink failures can be propagated from
/// every print routine unchanged.
pub trait Write {
    /// Write the given string to this sink.
    fn write_str(&mut self, string: &str) -> Result<(), Error>;

    /// Write the given character to this sink.
    #[inline]
    fn write_char(&mut self, char: char) -> Result<(), Error> {
        self.write_str(char.encode_utf8(&mut [0; 4]))
    }

    /// Returns the number of bytes written to this sink so far, if known.
    ///
    /// Element positions are only recorded for sinks that report this.
    #[inline]
    fn len_written(&self) -> Option<usize> {
        None
    }
}

impl Write for String {
    #[inline]
    fn write_str(&mut self, string: &str) -> Result<(), Error> {
        self.push_str(string);
        Ok(())
    }

    #[inline]
    fn len_written(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl Write for Vec<u8> {
    #[inline]
    fn write_str(&mut self, string: &str) -> Result<(), Error> {
        self.extend_from_slice(string.as_bytes());
        Ok(())
    }

    #[inline]
    fn len_written(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl<W: Write + ?Sized> Write for &mut W {
    #[inline]
    fn write_str(&mut self, string: &str) -> Result<(), Error> {
        (**self).write_str(string)
    }

    #[inline]
    fn write_char(&mut self, char: char) -> Result<(), Error> {
        (**self).write_char(char)
    }

    #[inline]
    fn len_written(&self) -> Option<usize> {
        (**self).len_written()
    }
}

/// An adapter for using `std::io::Write` implementations with this crate.
///
/// Failures of the underlying writer are reported as errors for which
/// [`Error::is_io`] returns true.
///
/// This is only available when the `std` feature is enabled.
///
/// # Example
///
/// ```
/// use steptime::{
///     attr::Attributes,
///     element::{Element, FieldMap},
///     fmt::{processor::LiteralProcessor, step::FormatStep, StdWrite},
/// };
///
/// let step = FormatStep::new(LiteralProcessor::new("T"), 0, 0, None)?;
/// let mut buf = std::io::Cursor::new(Vec::new());
/// step.print(&FieldMap::new(), StdWrite(&mut buf), &Attributes::new(), None, false)?;
/// assert_eq!(buf.into_inner(), b"T");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[cfg(feature = "std")]
#[derive(Clone, Debug)]
pub struct StdWrite<W>(
    /// The wrapped `std::io::Write` implementation.
    pub W,
);

#[cfg(feature = "std")]
impl<W: std::io::Write> Write for StdWrite<W> {
    #[inline]
    fn write_str(&mut self, string: &str) -> Result<(), Error> {
        self.0.write_all(string.as_bytes()).map_err(Error::io)
    }
}

/// An adapter for using `core::fmt::Write` implementations with this crate.
///
/// Since `core::fmt::Error` carries no information, failures are reported
/// as a generic "formatter failed" error.
#[derive(Clone, Debug)]
pub struct FmtWrite<W>(
    /// The wrapped `core::fmt::Write` implementation.
    pub W,
);

impl<W: core::fmt::Write> Write for FmtWrite<W> {
    #[inline]
    fn write_str(&mut self, string: &str) -> Result<(), Error> {
        self.0.write_str(string).map_err(|_| {
            Error::from_args(format_args!("an error occurred when formatting"))
        })
    }
}

/// The state of a parse: a cursor into the input plus at most one error.
///
/// A `ParseLog` that has an error still has a definite position. Recording
/// an error never moves the cursor, which lets a driver reset the error and
/// try an alternative from where the failed attempt started.
///
/// # Example
///
/// ```
/// use steptime::{
///     attr::Attributes,
///     element::FieldMap,
///     fmt::{processor::LiteralProcessor, step::FormatStep, ParseLog},
/// };
///
/// let step = FormatStep::new(LiteralProcessor::new("at"), 0, 0, None)?;
/// let mut cursor = ParseLog::at(3);
/// step.parse("10 on 5", &mut cursor, &Attributes::new(), &mut FieldMap::new(), false);
/// assert!(cursor.is_error());
/// assert_eq!(cursor.error_index(), Some(3));
/// assert_eq!(cursor.position(), 3);
///
/// cursor.clear_error();
/// assert!(!cursor.is_error());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct ParseLog {
    position: usize,
    error: Option<(usize, Error)>,
}

impl ParseLog {
    /// Creates a new parse log positioned at the start of the input.
    pub fn new() -> ParseLog {
        ParseLog::default()
    }

    /// Creates a new parse log positioned at the given byte offset.
    pub fn at(position: usize) -> ParseLog {
        ParseLog { position, error: None }
    }

    /// Returns the current byte offset.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves the cursor to the given byte offset.
    #[inline]
    pub fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    /// Records a failure that occurred at the given byte offset, replacing
    /// any previously recorded failure. The position is left unchanged.
    pub fn set_error(&mut self, index: usize, err: Error) {
        trace!("parse failure recorded at {index}: {err}");
        self.error = Some((index, err));
    }

    /// Returns true when a failure has been recorded.
    #[inline]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Returns the byte offset at which the recorded failure occurred.
    pub fn error_index(&self) -> Option<usize> {
        self.error.as_ref().map(|&(index, _)| index)
    }

    /// Returns the recorded failure.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref().map(|(_, err)| err)
    }

    /// Removes any recorded failure.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Returns this parse log to its initial state.
    pub fn reset(&mut self) {
        *self = ParseLog::new();
    }
}

/// The span of a printed field in the output, in bytes.
///
/// # Example
///
/// ```
/// use steptime::{element::Element, fmt::ElementPosition};
///
/// let span = ElementPosition::new(Element::YEAR, 0, 4);
/// assert_eq!((span.start(), span.end()), (0, 4));
/// assert_eq!(span.element(), Element::YEAR);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ElementPosition {
    element: Element,
    start: usize,
    end: usize,
}

impl ElementPosition {
    /// Creates a new span.
    ///
    /// # Panics
    ///
    /// When `start > end`.
    pub fn new(element: Element, start: usize, end: usize) -> ElementPosition {
        assert!(
            start <= end,
            "element position start {start} must not exceed end {end}",
        );
        ElementPosition { element, start, end }
    }

    /// Returns the element printed in this span.
    #[inline]
    pub fn element(&self) -> Element {
        self.element
    }

    /// Returns the offset of the first byte of this span.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns the offset just past the last byte of this span.
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Returns this span moved forward by `offset` bytes.
    pub(crate) fn shift(self, offset: usize) -> ElementPosition {
        ElementPosition {
            element: self.element,
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

impl core::fmt::Display for ElementPosition {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}[{}..{}]", self.element, self.start, self.end)
    }
}

/// Records the span `start..start + len` for `element`, provided positions
/// were requested, the sink reported its length and something was printed.
pub(crate) fn record(
    positions: Option<&mut Vec<ElementPosition>>,
    element: Element,
    start: Option<usize>,
    len: usize,
) {
    let (Some(positions), Some(start)) = (positions, start) else { return };
    if len > 0 {
        positions.push(ElementPosition::new(element, start, start + len));
    }
}

/// Returns the input remaining at `position`, or an empty string when the
/// position is past the end or not on a character boundary.
pub(crate) fn remaining(text: &str, position: usize) -> &str {
    text.get(position..).unwrap_or("")
}
