use alloc::vec::Vec;

use crate::{
    attr::{self, AttributeQuery, Attributes, Leniency},
    element::{Accumulator, Element, Fields, Value},
    error::element::Error as V,
    fmt::{
        processor::{effective_leniency, FormatProcessor},
        record, remaining,
        util::DecimalFormatter,
        ElementPosition, ParseLog, Write,
    },
    tz::offset,
    Error,
};

static TWO_DIGITS: DecimalFormatter = DecimalFormatter::new().padding(2);

/// Prints and parses a fixed offset from UTC.
///
/// The extended form is `±HH:MM[:SS]` and the basic form is `±HHMM[SS]`.
/// Seconds are only printed when they are non-zero. Parsing accepts either
/// form. Unless parsing is strict, an hour-only offset like `+05` is
/// accepted too.
///
/// The field is [`Element::TIMEZONE_OFFSET`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct OffsetProcessor {
    element: Element,
    extended: bool,
    leniency: Option<Leniency>,
}

impl OffsetProcessor {
    /// Creates a processor that prints offsets like `+05:30`.
    pub fn extended() -> OffsetProcessor {
        OffsetProcessor {
            element: Element::TIMEZONE_OFFSET,
            extended: true,
            leniency: None,
        }
    }

    /// Creates a processor that prints offsets like `+0530`.
    pub fn basic() -> OffsetProcessor {
        OffsetProcessor { extended: false, ..OffsetProcessor::extended() }
    }
}

impl FormatProcessor for OffsetProcessor {
    fn print(
        &self,
        fields: &dyn Fields,
        wtr: &mut dyn Write,
        _attrs: &dyn AttributeQuery,
        positions: Option<&mut Vec<ElementPosition>>,
        _quick: bool,
    ) -> Result<usize, Error> {
        let offset = match fields.get(self.element) {
            Some(Value::Offset(offset)) => offset,
            _ => {
                return Err(Error::from(V::ValueUnavailable {
                    element: self.element.name(),
                }))
            }
        };
        let start = wtr.len_written();
        let (hours, minutes, seconds) = offset.parts();
        let mut len = 0;
        wtr.write_char(if offset.is_negative() { '-' } else { '+' })?;
        wtr.write_str(TWO_DIGITS.format(hours.into()).as_str())?;
        len += 3;
        for part in [Some(minutes), (seconds != 0).then_some(seconds)] {
            let Some(part) = part else { break };
            if self.extended {
                wtr.write_char(':')?;
                len += 1;
            }
            wtr.write_str(TWO_DIGITS.format(part.into()).as_str())?;
            len += 2;
        }
        record(positions, self.element, start, len);
        Ok(len)
    }

    fn parse(
        &self,
        text: &str,
        cursor: &mut ParseLog,
        attrs: &dyn AttributeQuery,
        parsed: &mut dyn Accumulator,
        quick: bool,
    ) -> Result<(), Error> {
        let strict = effective_leniency(self.leniency, attrs, quick).is_strict();
        let start = cursor.position();
        let input = remaining(text, start).as_bytes();
        match offset::parse(input, start, strict) {
            Ok(parsed_offset) => {
                parsed.put(self.element, Value::Offset(parsed_offset.offset));
                cursor.set_position(start + parsed_offset.len);
            }
            Err(err) => cursor.set_error(start, err),
        }
        Ok(())
    }

    fn element(&self) -> Option<Element> {
        Some(self.element)
    }

    fn with_element(&self, element: Element) -> Result<OffsetProcessor, Error> {
        self.element.check_rebind(element)?;
        Ok(OffsetProcessor { element, ..self.clone() })
    }

    fn is_numerical(&self) -> bool {
        false
    }

    fn specialize(&self, attrs: &Attributes, _reserved: usize) -> OffsetProcessor {
        OffsetProcessor {
            leniency: Some(attr::leniency(attrs)),
            ..self.clone()
        }
    }
}

impl core::fmt::Display for OffsetProcessor {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let form = if self.extended { "extended" } else { "basic" };
        write!(f, "OffsetProcessor[{form}]")
    }
}
