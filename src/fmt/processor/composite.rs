use alloc::{sync::Arc, vec::Vec};

use crate::{
    attr::{AttributeQuery, Attributes},
    element::{Accumulator, Element, Fields},
    error::ErrorContext,
    fmt::{
        processor::FormatProcessor, step::FormatStep, ElementPosition,
        ParseLog, Write,
    },
    Error,
};

/// Runs a fixed sequence of steps as if it were a single field.
///
/// The steps are printed and parsed in order. There is no alternation: the
/// first step that fails to parse fails the whole sequence, and the cursor
/// is moved back to where the sequence started. The recorded error keeps
/// the index reported by the failing step. A print failure names the index
/// of the failing step, except failures of the sink, which are returned
/// unchanged.
///
/// The steps are shared, so cloning a composite processor is cheap.
///
/// # Example
///
/// ```
/// use steptime::{
///     attr::Attributes,
///     element::{Element, FieldMap},
///     fmt::{
///         processor::{CompositeProcessor, LiteralProcessor, NumberProcessor},
///         step::FormatStep,
///     },
/// };
///
/// let hh = FormatStep::new(NumberProcessor::new(Element::HOUR_OF_DAY, 2, 2)?, 0, 0, None)?;
/// let colon = FormatStep::new(LiteralProcessor::new(":"), 0, 0, None)?;
/// let mm = FormatStep::new(NumberProcessor::new(Element::MINUTE_OF_HOUR, 2, 2)?, 0, 0, None)?;
/// let time = FormatStep::new(CompositeProcessor::new([hh, colon, mm]), 0, 0, None)?;
///
/// let value = FieldMap::new()
///     .with(Element::HOUR_OF_DAY, 9)
///     .with(Element::MINUTE_OF_HOUR, 5);
/// let mut out = String::new();
/// time.print(&value, &mut out, &Attributes::new(), None, false)?;
/// assert_eq!(out, "09:05");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct CompositeProcessor {
    steps: Arc<[FormatStep]>,
}

impl CompositeProcessor {
    /// Creates a composite of the given steps.
    pub fn new<I: IntoIterator<Item = FormatStep>>(steps: I) -> CompositeProcessor {
        let steps: Vec<FormatStep> = steps.into_iter().collect();
        CompositeProcessor { steps: steps.into() }
    }

    /// Returns the steps of this composite.
    pub fn steps(&self) -> &[FormatStep] {
        &self.steps
    }
}

impl FormatProcessor for CompositeProcessor {
    fn print(
        &self,
        fields: &dyn Fields,
        wtr: &mut dyn Write,
        attrs: &dyn AttributeQuery,
        mut positions: Option<&mut Vec<ElementPosition>>,
        quick: bool,
    ) -> Result<usize, Error> {
        let mut printed = 0;
        for (i, step) in self.steps.iter().enumerate() {
            let result = step.print(
                fields,
                &mut *wtr,
                attrs,
                positions.as_deref_mut(),
                quick,
            );
            printed += match result {
                // Sink failures are passed through unchanged.
                Err(err) if err.is_io() => return Err(err),
                result => result.with_context(|| {
                    Error::from_args(format_args!(
                        "failed to print step {i} of composite",
                    ))
                })?,
            };
        }
        Ok(printed)
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
        for step in self.steps.iter() {
            step.parse(text, cursor, attrs, parsed, quick);
            if cursor.is_error() {
                cursor.set_position(start);
                return Ok(());
            }
        }
        Ok(())
    }

    fn element(&self) -> Option<Element> {
        None
    }

    fn with_element(&self, _element: Element) -> Result<CompositeProcessor, Error> {
        Ok(self.clone())
    }

    fn is_numerical(&self) -> bool {
        !self.steps.is_empty() && self.steps.iter().all(|s| s.is_numerical())
    }

    fn specialize(&self, attrs: &Attributes, _reserved: usize) -> CompositeProcessor {
        CompositeProcessor::new(self.steps.iter().map(|s| s.specialize(attrs)))
    }
}

impl core::fmt::Display for CompositeProcessor {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "CompositeProcessor[steps={}]", self.steps.len())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        element::FieldMap,
        fmt::processor::{LiteralProcessor, NumberProcessor},
    };

    use super::*;

    fn hh_mm() -> CompositeProcessor {
        let step = |p: crate::fmt::processor::Processor| {
            FormatStep::new(p, 0, 0, None).unwrap()
        };
        CompositeProcessor::new([
            step(NumberProcessor::new(Element::HOUR_OF_DAY, 2, 2).unwrap().into()),
            step(LiteralProcessor::new(":").into()),
            step(NumberProcessor::new(Element::MINUTE_OF_HOUR, 2, 2).unwrap().into()),
        ])
    }

    #[test]
    fn positions_are_absolute() {
        let fields = FieldMap::new()
            .with(Element::HOUR_OF_DAY, 23)
            .with(Element::MINUTE_OF_HOUR, 59);
        let mut out = alloc::string::String::from("at ");
        let mut positions = Vec::new();
        let n = hh_mm()
            .print(&fields, &mut out, &Attributes::new(), Some(&mut positions), false)
            .unwrap();
        assert_eq!(n, 5);
        assert_eq!(out, "at 23:59");
        assert_eq!(
            positions,
            [
                ElementPosition::new(Element::HOUR_OF_DAY, 3, 5),
                ElementPosition::new(Element::MINUTE_OF_HOUR, 6, 8),
            ],
        );
    }

    #[test]
    fn print_failure_names_the_step() {
        let fields = FieldMap::new().with(Element::HOUR_OF_DAY, 7);
        let mut out = alloc::string::String::new();
        let err = hh_mm()
            .print(&fields, &mut out, &Attributes::new(), None, false)
            .unwrap_err();
        assert!(err.is_value_unavailable());
        insta::assert_snapshot!(
            err,
            @"failed to print step 2 of composite: value to print has no 'MINUTE_OF_HOUR' field",
        );
    }

    #[test]
    fn failure_rewinds_to_start() {
        let mut cursor = ParseLog::at(1);
        let mut parsed = FieldMap::new();
        hh_mm()
            .parse("T12-30", &mut cursor, &Attributes::new(), &mut parsed, false)
            .unwrap();
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.error_index(), Some(3));
        assert!(!hh_mm().is_numerical());
    }
}
