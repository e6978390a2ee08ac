use alloc::vec::Vec;

use crate::{
    attr::{self, AttributeQuery, Attributes, Leniency},
    element::{Accumulator, Element, Fields, Value},
    error::{config::Error as C, element::Error as V, processor::Error as E},
    fmt::{
        processor::{effective_leniency, FormatProcessor},
        record, remaining,
        util::{fraction_to_nanos, Fractional},
        ElementPosition, ParseLog, Write,
    },
    Error,
};

/// Prints and parses the fraction of a second.
///
/// The value printed is the [`Element::NANO_OF_SECOND`] field. Trailing
/// zeros are dropped down to the minimum digit count, and digits beyond the
/// maximum are truncated.
///
/// A *decimal* fraction processor writes the decimal separator (the
/// `decimal_separator` attribute, `.` by default) before the digits, but
/// only when there are digits to write. When parsing, a missing separator is
/// fine if the minimum digit count is zero. Lax parsing accepts both `.`
/// and `,` as separator.
///
/// # Example
///
/// ```
/// use steptime::{
///     attr::Attributes,
///     element::{Element, FieldMap},
///     fmt::{processor::FractionProcessor, step::FormatStep},
/// };
///
/// let step = FormatStep::new(FractionProcessor::new(0, 9, true)?, 0, 0, None)?;
/// let value = FieldMap::new().with(Element::NANO_OF_SECOND, 250_000_000);
///
/// let mut out = String::new();
/// step.print(&value, &mut out, &Attributes::new(), None, false)?;
/// assert_eq!(out, ".25");
///
/// let mut out = String::new();
/// let attrs = Attributes::new().decimal_separator(',');
/// step.print(&value, &mut out, &attrs, None, false)?;
/// assert_eq!(out, ",25");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct FractionProcessor {
    element: Element,
    min_digits: u8,
    max_digits: u8,
    decimal: bool,
    separator: Option<char>,
    leniency: Option<Leniency>,
}

impl FractionProcessor {
    /// Creates a new fraction processor.
    ///
    /// # Errors
    ///
    /// Unless `min_digits <= max_digits` and `1 <= max_digits <= 9`.
    pub fn new(
        min_digits: u8,
        max_digits: u8,
        decimal: bool,
    ) -> Result<FractionProcessor, Error> {
        if max_digits == 0 || min_digits > max_digits || max_digits > 9 {
            return Err(Error::from(C::DigitRange {
                min: min_digits,
                max: max_digits,
                limit: 9,
            }));
        }
        Ok(FractionProcessor {
            element: Element::NANO_OF_SECOND,
            min_digits,
            max_digits,
            decimal,
            separator: None,
            leniency: None,
        })
    }

    /// Returns true when this processor writes a decimal separator.
    pub fn is_decimal(&self) -> bool {
        self.decimal
    }

    fn separator(&self, attrs: &dyn AttributeQuery, quick: bool) -> char {
        match self.separator {
            Some(ch) if quick => ch,
            _ => attr::decimal_separator(attrs),
        }
    }
}

impl FormatProcessor for FractionProcessor {
    fn print(
        &self,
        fields: &dyn Fields,
        wtr: &mut dyn Write,
        attrs: &dyn AttributeQuery,
        positions: Option<&mut Vec<ElementPosition>>,
        quick: bool,
    ) -> Result<usize, Error> {
        let nanos = fields
            .get(self.element)
            .and_then(|v| v.as_integer())
            .ok_or(V::ValueUnavailable { element: self.element.name() })?;
        let nanos = u32::try_from(nanos)
            .ok()
            .filter(|&n| n <= 999_999_999)
            .ok_or(E::FractionRange { given: nanos })?;
        let fraction = Fractional::new(nanos, self.min_digits, self.max_digits);
        let digits = fraction.as_str();
        if digits.is_empty() {
            return Ok(0);
        }

        let start = wtr.len_written();
        let mut count = digits.len();
        let mut bytes = digits.len();
        if self.decimal {
            let sep = self.separator(attrs, quick);
            wtr.write_char(sep)?;
            count += 1;
            bytes += sep.len_utf8();
        }
        wtr.write_str(digits)?;
        record(positions, self.element, start, bytes);
        Ok(count)
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
        let rest = remaining(text, start);

        let mut pos = 0;
        if self.decimal {
            let sep = self.separator(attrs, quick);
            match rest.chars().next() {
                Some(ch)
                    if ch == sep
                        || (leniency.is_lax() && (ch == '.' || ch == ',')) =>
                {
                    pos += ch.len_utf8();
                }
                _ if self.min_digits == 0 => return Ok(()),
                _ => {
                    cursor.set_error(
                        start,
                        Error::from(E::MissingSeparator { position: start }),
                    );
                    return Ok(());
                }
            }
        }

        let digits = &rest.as_bytes()[pos..];
        let available = digits.iter().take_while(|b| b.is_ascii_digit()).count();
        let limit = if leniency.is_lax() { 9 } else { usize::from(self.max_digits) };
        let take = available.min(limit);
        if take == 0 {
            // Without a separator, an absent fraction is just an absent
            // optional field.
            if !self.decimal && self.min_digits == 0 {
                return Ok(());
            }
            cursor.set_error(
                start,
                Error::from(E::MissingDigits {
                    element: self.element.name(),
                    position: start + pos,
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

        let nanos = fraction_to_nanos(&digits[..take]);
        parsed.put(self.element, Value::Integer(i64::from(nanos)));
        cursor.set_position(start + pos + take);
        Ok(())
    }

    fn element(&self) -> Option<Element> {
        Some(self.element)
    }

    fn with_element(&self, element: Element) -> Result<FractionProcessor, Error> {
        self.element.check_rebind(element)?;
        Ok(FractionProcessor { element, ..self.clone() })
    }

    fn is_numerical(&self) -> bool {
        !self.decimal
    }

    fn specialize(&self, attrs: &Attributes, _reserved: usize) -> FractionProcessor {
        FractionProcessor {
            separator: Some(attr::decimal_separator(attrs)),
            leniency: Some(attr::leniency(attrs)),
            ..self.clone()
        }
    }
}

impl core::fmt::Display for FractionProcessor {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "FractionProcessor[min-digits={}, max-digits={}, decimal={}]",
            self.min_digits, self.max_digits, self.decimal,
        )
    }
}
