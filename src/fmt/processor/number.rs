use alloc::vec::Vec;

use crate::{
    attr::{self, AttributeQuery, Attributes, Leniency},
    element::{Accumulator, Element, Fields, Value},
    error::{config::Error as C, element::Error as V, processor::Error as E},
    fmt::{
        processor::{effective_leniency, FormatProcessor},
        record, remaining,
        util::DecimalFormatter,
        ElementPosition, ParseLog, Write,
    },
    Error,
};

/// The most digits accepted in a configured digit range.
const MAX_DIGITS: u8 = 18;

/// The most digits read by lax parsing. An `i64` can't hold every number
/// of this many digits.
const LAX_MAX_DIGITS: usize = 19;

/// Prints and parses an integer field as decimal digits.
///
/// Printing zero pads the number to the minimum digit count and fails when
/// it needs more than the maximum digit count. Parsing reads at most the
/// maximum digit count, except in lax mode where any run of digits is read.
/// Strict parsing requires at least the minimum digit count.
///
/// When a step reserves trailing characters for the digits of adjacent
/// numeric steps, a specialized number processor leaves that many digits
/// unconsumed.
///
/// # Example
///
/// ```
/// use steptime::{
///     attr::Attributes,
///     element::{Element, FieldMap},
///     fmt::{processor::NumberProcessor, step::FormatStep},
/// };
///
/// let step = FormatStep::new(NumberProcessor::new(Element::MONTH, 2, 2)?, 0, 0, None)?;
/// let mut out = String::new();
/// step.print(&FieldMap::new().with(Element::MONTH, 7), &mut out, &Attributes::new(), None, false)?;
/// assert_eq!(out, "07");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct NumberProcessor {
    element: Element,
    min_digits: u8,
    max_digits: u8,
    signed: bool,
    reserved: usize,
    leniency: Option<Leniency>,
}

impl NumberProcessor {
    /// Creates a processor for `element` with the given digit range.
    ///
    /// # Errors
    ///
    /// Unless `1 <= min_digits <= max_digits <= 18`.
    pub fn new(
        element: Element,
        min_digits: u8,
        max_digits: u8,
    ) -> Result<NumberProcessor, Error> {
        if min_digits == 0 || min_digits > max_digits || max_digits > MAX_DIGITS
        {
            return Err(Error::from(C::DigitRange {
                min: min_digits,
                max: max_digits,
                limit: MAX_DIGITS,
            }));
        }
        Ok(NumberProcessor {
            element,
            min_digits,
            max_digits,
            signed: false,
            reserved: 0,
            leniency: None,
        })
    }

    /// Whether a leading `+` or `-` is accepted when parsing, and a `+` is
    /// printed for non-negative values.
    ///
    /// Negative values are always printed with a `-`.
    pub fn signed(self, yes: bool) -> NumberProcessor {
        NumberProcessor { signed: yes, ..self }
    }

    /// Returns the minimum number of digits.
    pub fn get_min_digits(&self) -> u8 {
        self.min_digits
    }

    /// Returns the maximum number of digits.
    pub fn get_max_digits(&self) -> u8 {
        self.max_digits
    }
}

impl FormatProcessor for NumberProcessor {
    fn print(
        &self,
        fields: &dyn Fields,
        wtr: &mut dyn Write,
        _attrs: &dyn AttributeQuery,
        positions: Option<&mut Vec<ElementPosition>>,
        _quick: bool,
    ) -> Result<usize, Error> {
        let value = fields
            .get(self.element)
            .and_then(|v| v.as_integer())
            .ok_or(V::ValueUnavailable { element: self.element.name() })?;
        let decimal = DecimalFormatter::new()
            .padding(self.min_digits)
            .force_sign(self.signed)
            .format(value);
        let text = decimal.as_str();
        let digits = text.trim_start_matches(['+', '-']).len();
        if digits > usize::from(self.max_digits) {
            return Err(Error::from(E::NumberTooWide {
                element: self.element.name(),
                digits,
                max: self.max_digits,
            }));
        }
        let start = wtr.len_written();
        wtr.write_str(text)?;
        record(positions, self.element, start, text.len());
        Ok(text.len())
    }

    fn parse(
        &self,
        text: &str,
        cursor: &mut ParseLog,
        attrs: &dyn AttributeQuery,
        parsed: &mut dyn Accumulator,
        quick: bool,
    ) -> Result<(), Error> {
        let leniency = effective_leniency(self.leniency, attrs, quick);
        let start = cursor.position();
        let input = remaining(text, start).as_bytes();

        let mut pos = 0;
        let mut negative = false;
        if self.signed {
            match input.first() {
                Some(&b'-') => {
                    negative = true;
                    pos += 1;
                }
                Some(&b'+') => pos += 1,
                _ => {}
            }
        }
        let available =
            input[pos..].iter().take_while(|b| b.is_ascii_digit()).count();
        let reserved = if quick { self.reserved } else { 0 };
        let limit = if leniency.is_lax() && reserved == 0 {
            LAX_MAX_DIGITS
        } else {
            usize::from(self.max_digits)
        };
        let take = available.min(limit).min(available.saturating_sub(reserved));
        if take == 0 {
            cursor.set_error(
                start,
                Error::from(E::MissingDigits {
                    element: self.element.name(),
                    position: start,
                }),
            );
            return Ok(());
        }
        if leniency.is_strict() && take < usize::from(self.min_digits) {
            cursor.set_error(
                start,
                Error::from(E::TooFewDigits {
                    element: self.element.name(),
                    found: take,
                    min: self.min_digits,
                }),
            );
            return Ok(());
        }

        let mut value: i64 = 0;
        for &digit in &input[pos..pos + take] {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(i64::from(digit - b'0')))
                .ok_or(E::NumberOverflow { element: self.element.name() })?;
        }
        if negative {
            value = -value;
        }
        parsed.put(self.element, Value::Integer(value));
        cursor.set_position(start + pos + take);
        Ok(())
    }

    fn element(&self) -> Option<Element> {
        Some(self.element)
    }

    fn with_element(&self, element: Element) -> Result<NumberProcessor, Error> {
        self.element.check_rebind(element)?;
        Ok(NumberProcessor { element, ..self.clone() })
    }

    fn is_numerical(&self) -> bool {
        !self.signed
    }

    fn specialize(&self, attrs: &Attributes, reserved: usize) -> NumberProcessor {
        NumberProcessor {
            reserved,
            leniency: Some(attr::leniency(attrs)),
            ..self.clone()
        }
    }
}

impl core::fmt::Display for NumberProcessor {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "NumberProcessor[element={}, min-digits={}, max-digits={}]",
            self.element, self.min_digits, self.max_digits,
        )
    }
}
