use alloc::{sync::Arc, vec::Vec};

use crate::{
    attr::{self, AttributeQuery, Attributes, Leniency},
    element::{Accumulator, Element, Fields},
    error::processor::Error as E,
    fmt::{
        processor::{effective_leniency, FormatProcessor},
        remaining, ElementPosition, ParseLog, Write,
    },
    Error,
};

/// Prints and parses fixed text, like the `T` between a date and a time.
///
/// Parsing requires an exact match, except in lax mode where ASCII letters
/// match regardless of case. Literals are anonymous: they aren't bound to
/// any element and never record positions.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct LiteralProcessor {
    text: Arc<str>,
    leniency: Option<Leniency>,
}

impl LiteralProcessor {
    /// Creates a processor for the given fixed text.
    pub fn new(text: &str) -> LiteralProcessor {
        LiteralProcessor { text: Arc::from(text), leniency: None }
    }

    /// Returns the fixed text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl FormatProcessor for LiteralProcessor {
    fn print(
        &self,
        _fields: &dyn Fields,
        wtr: &mut dyn Write,
        _attrs: &dyn AttributeQuery,
        _positions: Option<&mut Vec<ElementPosition>>,
        _quick: bool,
    ) -> Result<usize, Error> {
        wtr.write_str(&self.text)?;
        Ok(self.text.chars().count())
    }

    fn parse(
        &self,
        text: &str,
        cursor: &mut ParseLog,
        attrs: &dyn AttributeQuery,
        _parsed: &mut dyn Accumulator,
        quick: bool,
    ) -> Result<(), Error> {
        let start = cursor.position();
        let expected = self.text.as_bytes();
        let found = remaining(text, start).as_bytes().get(..expected.len());
        let matched = match found {
            None => false,
            Some(found) if effective_leniency(self.leniency, attrs, quick).is_lax() => {
                found.eq_ignore_ascii_case(expected)
            }
            Some(found) => found == expected,
        };
        if !matched {
            cursor.set_error(
                start,
                Error::from(E::LiteralMismatch {
                    expected: self.text.as_ref().into(),
                    position: start,
                }),
            );
            return Ok(());
        }
        cursor.set_position(start + expected.len());
        Ok(())
    }

    fn element(&self) -> Option<Element> {
        None
    }

    fn with_element(&self, _element: Element) -> Result<LiteralProcessor, Error> {
        Ok(self.clone())
    }

    fn is_numerical(&self) -> bool {
        !self.text.is_empty() && self.text.bytes().all(|b| b.is_ascii_digit())
    }

    fn specialize(&self, attrs: &Attributes, _reserved: usize) -> LiteralProcessor {
        LiteralProcessor {
            leniency: Some(attr::leniency(attrs)),
            ..self.clone()
        }
    }
}

impl core::fmt::Display for LiteralProcessor {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "LiteralProcessor[{:?}]", &*self.text)
    }
}
