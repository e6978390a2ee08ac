/*!
The orchestration of a single processor within a formatter.

A [`FormatStep`] wraps one [`Processor`] and adds what every field needs:
sectional attributes layered over the attributes of each call, exact-width
padding, a print condition that makes a section optional, and or-block
metadata for the driver that sequences many steps.

Steps are immutable. Every operation that changes a step returns a new one,
which makes a formatter (a sequence of steps) safe to share between threads
and cheap to compare.

# The quick path

A formatter that is built once and used many times can call
[`FormatStep::specialize`] on each of its steps with its base attributes.
The specialized step keeps the fully merged attributes and a processor
with those attributes bound in advance. Passing `quick = true` to
[`FormatStep::print`] or [`FormatStep::parse`] then skips the per-call
attribute layering. The output is identical to the ordinary path given the
same base attributes. A step that was never specialized silently falls
back to the ordinary path.
*/

use alloc::{string::String, vec::Vec};

use crate::{
    attr::{self, AttributeQuery, Attributes, MergedAttributes},
    element::{Accumulator, Element, Fields},
    error::{config::Error as C, step::Error as E},
    fmt::{
        processor::{FormatProcessor, Processor},
        remaining, ElementPosition, ParseLog, Write,
    },
    Error,
};

/// One field of a formatter, plus padding, layering and alternation
/// metadata.
///
/// # Example
///
/// Padding with a custom pad character, printed and parsed back:
///
/// ```
/// use steptime::{
///     attr::Attributes,
///     element::{Element, FieldMap},
///     fmt::{processor::NumberProcessor, step::FormatStep, ParseLog},
/// };
///
/// let day = NumberProcessor::new(Element::DAY_OF_MONTH, 1, 2)?;
/// let step = FormatStep::new(day, 0, 0, None)?.pad(4, 0)?;
/// let attrs = Attributes::new().pad_char('_');
///
/// let mut out = String::new();
/// step.print(&FieldMap::new().with(Element::DAY_OF_MONTH, 7), &mut out, &attrs, None, false)?;
/// assert_eq!(out, "___7");
///
/// let mut cursor = ParseLog::new();
/// let mut parsed = FieldMap::new();
/// step.parse(&out, &mut cursor, &attrs, &mut parsed, false);
/// assert_eq!(cursor.position(), 4);
/// assert_eq!(parsed.integer(Element::DAY_OF_MONTH), Some(7));
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FormatStep {
    processor: Processor,
    level: u32,
    section: u32,
    sectional: Option<Attributes>,
    /// Sectional attributes merged over the base attributes. Only set by
    /// `specialize`.
    full: Option<Attributes>,
    reserved: usize,
    pad_left: usize,
    pad_right: usize,
    or_marker: bool,
    /// Only meaningful when `or_marker` is set.
    last_or_block_index: Option<usize>,
}

impl FormatStep {
    /// Creates a new step wrapping `processor`.
    ///
    /// `level` is the nesting depth of optional sections and `section`
    /// identifies the section this step belongs to.
    ///
    /// # Errors
    ///
    /// When `level` or `section` is negative.
    pub fn new(
        processor: impl Into<Processor>,
        level: i32,
        section: i32,
        sectional: Option<Attributes>,
    ) -> Result<FormatStep, Error> {
        Ok(FormatStep {
            processor: processor.into(),
            level: non_negative("level", level)?,
            section: non_negative("section", section)?,
            sectional,
            full: None,
            reserved: 0,
            pad_left: 0,
            pad_right: 0,
            or_marker: false,
            last_or_block_index: None,
        })
    }

    /// Prints the field of `fields` this step is responsible for.
    ///
    /// Nothing is printed, and zero is returned, when the sectional
    /// attributes carry a condition that `fields` doesn't satisfy.
    /// Otherwise the number of characters written is returned, including
    /// padding.
    ///
    /// # Errors
    ///
    /// When the processor fails, when the sink fails, or when strict
    /// leniency is in effect and the printed field is wider than a
    /// non-zero pad width.
    pub fn print<W: Write>(
        &self,
        fields: &dyn Fields,
        mut wtr: W,
        attrs: &dyn AttributeQuery,
        positions: Option<&mut Vec<ElementPosition>>,
        quick: bool,
    ) -> Result<usize, Error> {
        if !self.is_printing(fields) {
            return Ok(0);
        }
        self.with_query(attrs, quick, |aq| {
            self.print_padded(fields, &mut wtr, aq, positions, quick)
        })
    }

    fn print_padded(
        &self,
        fields: &dyn Fields,
        wtr: &mut dyn Write,
        attrs: &dyn AttributeQuery,
        positions: Option<&mut Vec<ElementPosition>>,
        quick: bool,
    ) -> Result<usize, Error> {
        if self.pad_left == 0 && self.pad_right == 0 {
            return self.processor.print(fields, wtr, attrs, positions, quick);
        }

        let strict = attr::leniency(attrs).is_strict();
        let pad = attr::pad_char(attrs);
        let start = wtr.len_written();
        // Positions can only be made absolute when the sink knows its
        // length.
        let positions = positions.filter(|_| start.is_some());

        let mut content = String::new();
        let mut spans = Vec::new();
        self.processor.print(
            fields,
            &mut content,
            attrs,
            positions.is_some().then_some(&mut spans),
            quick,
        )?;
        let len = content.chars().count();
        if strict
            && ((self.pad_left > 0 && len > self.pad_left)
                || (self.pad_right > 0 && len > self.pad_right))
        {
            return Err(self.pad_exceeded());
        }

        let left = self.pad_left.saturating_sub(len);
        let right = self.pad_right.saturating_sub(len);
        for _ in 0..left {
            wtr.write_char(pad)?;
        }
        wtr.write_str(&content)?;
        for _ in 0..right {
            wtr.write_char(pad)?;
        }
        if let (Some(positions), Some(start)) = (positions, start) {
            let shift = start + left * pad.len_utf8();
            positions.extend(spans.into_iter().map(|span| span.shift(shift)));
        }
        Ok(left + len + right)
    }

    /// Parses the field this step is responsible for from `text` at the
    /// cursor position.
    ///
    /// This never fails. Every failure, including a fault of the wrapped
    /// processor, is recorded on `cursor`. Strict width failures are
    /// recorded at the position the step started from, except a mismatch
    /// of the right padding, which is recorded where the right padding
    /// begins.
    pub fn parse(
        &self,
        text: &str,
        cursor: &mut ParseLog,
        attrs: &dyn AttributeQuery,
        parsed: &mut dyn Accumulator,
        quick: bool,
    ) {
        self.with_query(attrs, quick, |aq| {
            self.parse_padded(text, cursor, aq, parsed, quick)
        })
    }

    fn parse_padded(
        &self,
        text: &str,
        cursor: &mut ParseLog,
        attrs: &dyn AttributeQuery,
        parsed: &mut dyn Accumulator,
        quick: bool,
    ) {
        if self.pad_left == 0 && self.pad_right == 0 {
            self.parse_contained(text, cursor, attrs, parsed, quick);
            return;
        }

        let strict = attr::leniency(attrs).is_strict();
        let pad = attr::pad_char(attrs);
        let start = cursor.position();

        let (left_count, left_bytes) = count_pad(remaining(text, start), pad, usize::MAX);
        if strict && left_count > self.pad_left {
            cursor.set_error(start, self.pad_exceeded());
            return;
        }

        let content_start = start + left_bytes;
        cursor.set_position(content_start);
        self.parse_contained(text, cursor, attrs, parsed, quick);
        if cursor.is_error() {
            return;
        }
        let content_end = cursor.position();
        let width = text
            .get(content_start..content_end)
            .map_or(0, |content| content.chars().count());
        if strict && self.pad_left > 0 && width + left_count != self.pad_left {
            cursor.set_error(start, self.pad_mismatched());
            return;
        }

        let budget = if strict {
            self.pad_right.saturating_sub(width)
        } else {
            usize::MAX
        };
        let (right_count, right_bytes) =
            count_pad(remaining(text, content_end), pad, budget);
        if strict && self.pad_right > 0 && width + right_count != self.pad_right
        {
            cursor.set_error(content_end, self.pad_mismatched());
            return;
        }
        cursor.set_position(content_end + right_bytes);
    }

    /// Runs the wrapped processor, turning any fault into a cursor error at
    /// the position the processor started from.
    fn parse_contained(
        &self,
        text: &str,
        cursor: &mut ParseLog,
        attrs: &dyn AttributeQuery,
        parsed: &mut dyn Accumulator,
        quick: bool,
    ) {
        let current = cursor.position();
        if let Err(err) = self.processor.parse(text, cursor, attrs, parsed, quick)
        {
            debug!("contained fault of {} at {current}: {err}", self.processor);
            cursor.set_error(current, err);
        }
    }

    /// Returns a copy of this step prepared for the quick path.
    ///
    /// The sectional attributes of this step, if any, are merged over
    /// `base` once, and the wrapped processor is specialized with the
    /// merged attributes and this step's reserved width.
    ///
    /// # Example
    ///
    /// ```
    /// use steptime::{
    ///     attr::{Attributes, Leniency},
    ///     element::{Element, FieldMap},
    ///     fmt::{processor::NumberProcessor, step::FormatStep},
    /// };
    ///
    /// let step = FormatStep::new(
    ///     NumberProcessor::new(Element::YEAR, 4, 4)?,
    ///     0,
    ///     0,
    ///     Some(Attributes::new().pad_char('0')),
    /// )?.pad(6, 0)?;
    /// let base = Attributes::new().leniency(Leniency::Strict);
    /// let quick = step.specialize(&base);
    /// assert!(quick.is_specialized());
    ///
    /// let value = FieldMap::new().with(Element::YEAR, 2024);
    /// let (mut a, mut b) = (String::new(), String::new());
    /// step.print(&value, &mut a, &base, None, false)?;
    /// quick.print(&value, &mut b, &Attributes::new(), None, true)?;
    /// assert_eq!(a, "002024");
    /// assert_eq!(a, b);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn specialize(&self, base: &Attributes) -> FormatStep {
        let full = match self.sectional {
            Some(ref sectional) => sectional.layered_over(base),
            None => base.clone(),
        };
        trace!("specializing step {self} over {full:?}");
        FormatStep {
            processor: self.processor.specialize(&full, self.reserved),
            full: Some(full),
            ..self.clone()
        }
    }

    /// Rebinds the wrapped processor to `element`.
    ///
    /// Anonymous processors are left unchanged.
    ///
    /// # Errors
    ///
    /// When the value kind of `element` differs from the kind of the
    /// processor's current element and `element` isn't dual.
    pub fn update_element(&self, element: Element) -> Result<FormatStep, Error> {
        if self.processor.element().is_none() {
            return Ok(self.clone());
        }
        let processor = self.processor.with_element(element)?;
        Ok(FormatStep { processor, ..self.clone() })
    }

    /// Returns a copy of this step with `reserved` more characters reserved
    /// for adjacent numeric steps.
    ///
    /// The reserved width is bound into the processor by
    /// [`FormatStep::specialize`], so it only limits parsing on the quick
    /// path. An ordinary `parse` call (or a step that isn't specialized)
    /// ignores it.
    ///
    /// # Errors
    ///
    /// When the resulting reserved width is negative.
    pub fn reserve(&self, reserved: i32) -> Result<FormatStep, Error> {
        Ok(FormatStep {
            reserved: add_width("reserved", self.reserved, reserved)?,
            full: None,
            ..self.clone()
        })
    }

    /// Returns a copy of this step with the given widths added to its left
    /// and right pad widths.
    ///
    /// Parsing consumes every leading pad character before handing the
    /// rest to the processor. When the pad character can also start the
    /// field itself, e.g., `0` for a number, the field can be consumed as
    /// padding: the value `0` printed with pad character `0` and
    /// `pad(5, 0)` is `00000`, which doesn't parse back.
    ///
    /// # Errors
    ///
    /// When a resulting pad width is negative.
    pub fn pad(&self, left: i32, right: i32) -> Result<FormatStep, Error> {
        Ok(FormatStep {
            pad_left: add_width("pad-left", self.pad_left, left)?,
            pad_right: add_width("pad-right", self.pad_right, right)?,
            full: None,
            ..self.clone()
        })
    }

    /// Returns a copy of this step marked as the first step of a new
    /// or-block.
    ///
    /// # Errors
    ///
    /// When this step already starts an or-block.
    pub fn start_new_or_block(&self) -> Result<FormatStep, Error> {
        if self.or_marker {
            return Err(Error::from(C::OrBlockAlreadyStarted));
        }
        Ok(FormatStep {
            or_marker: true,
            last_or_block_index: None,
            full: None,
            ..self.clone()
        })
    }

    /// Returns a copy of this step recording the index of the step just
    /// past the last alternative of the or-block it starts.
    ///
    /// # Errors
    ///
    /// When this step doesn't start an or-block.
    pub fn mark_last_or_block(&self, index: usize) -> Result<FormatStep, Error> {
        if !self.or_marker {
            return Err(Error::from(C::OrBlockNotStarted));
        }
        Ok(FormatStep { last_or_block_index: Some(index), ..self.clone() })
    }

    /// Returns true when this step starts an or-block.
    pub fn is_new_or_block_started(&self) -> bool {
        self.or_marker
    }

    /// Returns the index recorded by [`FormatStep::mark_last_or_block`].
    ///
    /// This is always `None` for steps that don't start an or-block.
    pub fn last_or_block_index(&self) -> Option<usize> {
        self.last_or_block_index.filter(|_| self.or_marker)
    }

    /// Returns the nesting depth of the optional section of this step.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Returns the identifier of the section this step belongs to.
    pub fn section(&self) -> u32 {
        self.section
    }

    /// Returns the processor wrapped by this step.
    pub fn processor(&self) -> &Processor {
        &self.processor
    }

    /// Returns the attributes that apply only to this step's section.
    pub fn sectional_attributes(&self) -> Option<&Attributes> {
        self.sectional.as_ref()
    }

    /// Returns the number of characters reserved for adjacent numeric steps.
    pub fn reserved(&self) -> usize {
        self.reserved
    }

    /// Returns the left pad width, in characters.
    pub fn pad_left(&self) -> usize {
        self.pad_left
    }

    /// Returns the right pad width, in characters.
    pub fn pad_right(&self) -> usize {
        self.pad_right
    }

    /// Returns true when the wrapped processor only prints digits.
    pub fn is_numerical(&self) -> bool {
        self.processor.is_numerical()
    }

    /// Returns true when the wrapped processor prints a fraction.
    pub fn is_decimal(&self) -> bool {
        self.processor.is_decimal()
    }

    /// Returns true when this step was produced by
    /// [`FormatStep::specialize`] and not modified since.
    pub fn is_specialized(&self) -> bool {
        self.full.is_some()
    }

    fn is_printing(&self, fields: &dyn Fields) -> bool {
        match self.sectional.as_ref().and_then(|s| s.get_condition()) {
            Some(condition) => condition.test(fields),
            None => true,
        }
    }

    fn with_query<T>(
        &self,
        attrs: &dyn AttributeQuery,
        quick: bool,
        f: impl FnOnce(&dyn AttributeQuery) -> T,
    ) -> T {
        match (quick, &self.full, &self.sectional) {
            (true, Some(full), _) => f(full),
            (_, _, Some(sectional)) => f(&MergedAttributes::new(sectional, attrs)),
            _ => f(attrs),
        }
    }

    fn element_name(&self) -> &'static str {
        self.processor.element().map_or("anonymous", |e| e.name())
    }

    fn pad_exceeded(&self) -> Error {
        Error::from(E::PadExceeded { element: self.element_name() })
    }

    fn pad_mismatched(&self) -> Error {
        Error::from(E::PadMismatched { element: self.element_name() })
    }
}

impl core::hash::Hash for FormatStep {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.processor.hash(state);
        self.sectional.hash(state);
    }
}

impl core::fmt::Display for FormatStep {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "[processor={}, level={}, section={}",
            self.processor, self.level, self.section,
        )?;
        if let Some(ref sectional) = self.sectional {
            write!(f, ", attributes={sectional:?}")?;
        }
        write!(
            f,
            ", reserved={}, pad-left={}, pad-right={}",
            self.reserved, self.pad_left, self.pad_right,
        )?;
        if self.or_marker {
            f.write_str(", or-block-started")?;
        }
        f.write_str("]")
    }
}

fn non_negative(what: &'static str, given: i32) -> Result<u32, Error> {
    u32::try_from(given).map_err(|_| {
        Error::from(C::Negative { what, given: i64::from(given) })
    })
}

fn add_width(
    what: &'static str,
    current: usize,
    delta: i32,
) -> Result<usize, Error> {
    let current = i64::try_from(current)
        .map_err(|_| C::TooBig { what, given: i64::MAX })?;
    let sum = current.saturating_add(i64::from(delta));
    if sum < 0 {
        return Err(Error::from(C::Negative { what, given: sum }));
    }
    usize::try_from(sum).map_err(|_| Error::from(C::TooBig { what, given: sum }))
}

/// Counts the leading run of `pad` in `input`, stopping after `limit`
/// characters. Returns the number of characters and bytes counted.
fn count_pad(input: &str, pad: char, limit: usize) -> (usize, usize) {
    let count = input.chars().take(limit).take_while(|&ch| ch == pad).count();
    (count, count * pad.len_utf8())
}

#[cfg(test)]
mod tests {
    use alloc::{string::ToString, vec};

    use crate::{
        attr::{Condition, Leniency},
        element::FieldMap,
        fmt::processor::{
            CompositeProcessor, FractionProcessor, LiteralProcessor,
            NumberProcessor, OffsetProcessor, TimeZoneIdProcessor,
        },
        tz::{Offset, Registry, TimeZoneId},
    };

    use super::*;

    fn tzid() -> FormatStep {
        FormatStep::new(TimeZoneIdProcessor::new(), 0, 0, None).unwrap()
    }

    fn zone(name: &str) -> FieldMap {
        FieldMap::new().with(Element::TIMEZONE_ID, TimeZoneId::new(name))
    }

    fn registry() -> Registry {
        Registry::new(["EST", "Europe/Berlin", "Asia/Tokyo"])
    }

    fn print(step: &FormatStep, fields: &FieldMap, attrs: &Attributes) -> Result<String, Error> {
        let mut out = String::new();
        let n = step.print(fields, &mut out, attrs, None, false)?;
        assert_eq!(n, out.chars().count());
        Ok(out)
    }

    fn parse(step: &FormatStep, text: &str, attrs: &Attributes) -> (ParseLog, FieldMap) {
        let mut cursor = ParseLog::new();
        let mut parsed = FieldMap::new();
        step.parse(text, &mut cursor, attrs, &mut parsed, false);
        (cursor, parsed)
    }

    quickcheck::quickcheck! {
        fn prop_construction_validates_non_negative(
            level: i32,
            section: i32,
            reserved: i32,
            left: i32,
            right: i32
        ) -> bool {
            let all_ok = level >= 0
                && section >= 0
                && reserved >= 0
                && left >= 0
                && right >= 0;
            let got = FormatStep::new(LiteralProcessor::new("-"), level, section, None)
                .and_then(|s| s.reserve(reserved))
                .and_then(|s| s.pad(left, right));
            match got {
                Ok(step) => {
                    all_ok
                        && step.level() == level as u32
                        && step.pad_left() == left as usize
                        && step.pad_right() == right as usize
                }
                Err(err) => !all_ok && err.is_invalid_configuration(),
            }
        }
    }

    #[test]
    fn negative_configuration() {
        let err = FormatStep::new(TimeZoneIdProcessor::new(), 0, -3, None)
            .unwrap_err();
        insta::assert_snapshot!(
            err,
            @"parameter 'section' must not be negative, but got -3",
        );
        let err = tzid().pad(2, 0).unwrap().pad(-3, 0).unwrap_err();
        insta::assert_snapshot!(
            err,
            @"parameter 'pad-left' must not be negative, but got -1",
        );
        assert!(tzid().reserve(-1).unwrap_err().is_invalid_configuration());
    }

    #[test]
    fn left_padding_round_trip() {
        let step = tzid().pad(5, 0).unwrap();
        let attrs = Attributes::new().pad_char('0').registry(registry());

        let out = print(&step, &zone("EST"), &attrs).unwrap();
        assert_eq!(out, "00EST");

        let (cursor, parsed) = parse(&step, &out, &attrs);
        assert!(!cursor.is_error());
        assert_eq!(cursor.position(), 5);
        assert_eq!(parsed, zone("EST"));
    }

    #[test]
    fn right_padding() {
        let step = tzid().pad(0, 6).unwrap();
        let attrs = Attributes::new().registry(registry());
        assert_eq!(print(&step, &zone("EST"), &attrs).unwrap(), "EST   ");

        let step = tzid().pad(4, 6).unwrap();
        assert_eq!(print(&step, &zone("EST"), &attrs).unwrap(), " EST   ");

        let (cursor, parsed) = parse(&step, " EST   |", &attrs);
        assert_eq!(cursor.position(), 7);
        assert_eq!(parsed, zone("EST"));
    }

    #[test]
    fn strict_width_exceeded_on_print() {
        let step = tzid().pad(5, 0).unwrap();
        let strict = Attributes::new().leniency(Leniency::Strict);
        let lax = Attributes::new().leniency(Leniency::Lax);

        let err = print(&step, &zone("Europe/Berlin"), &strict).unwrap_err();
        assert!(err.is_pad_exceeded());
        insta::assert_snapshot!(
            err,
            @"pad width exceeded for element 'TIMEZONE_ID'",
        );
        assert_eq!(
            print(&step, &zone("Europe/Berlin"), &lax).unwrap(),
            "Europe/Berlin",
        );

        let step = tzid().pad(0, 2).unwrap();
        assert!(print(&step, &zone("EST"), &strict).unwrap_err().is_pad_exceeded());
    }

    #[test]
    fn strict_parse_widths() {
        let strict = Attributes::new()
            .leniency(Leniency::Strict)
            .registry(registry());
        let step = tzid().pad(5, 0).unwrap();

        let (cursor, _) = parse(&step, "000000EST", &strict.clone().pad_char('0'));
        assert!(cursor.error().unwrap().is_pad_exceeded());
        assert_eq!(cursor.error_index(), Some(0));

        let (cursor, _) = parse(&step, " EST", &strict);
        let err = cursor.error().unwrap();
        assert!(err.is_pad_mismatched());
        assert_eq!(cursor.error_index(), Some(0));

        let step = tzid().pad(0, 5).unwrap();
        let (cursor, _) = parse(&step, "EST |", &strict);
        assert!(cursor.error().unwrap().is_pad_mismatched());
        assert_eq!(cursor.error_index(), Some(3));

        // The right padding stops once the width is reached.
        let (cursor, _) = parse(&step, "EST     ", &strict);
        assert!(!cursor.is_error());
        assert_eq!(cursor.position(), 5);
    }

    #[test]
    fn lenient_parse_eats_trailing_pad() {
        let attrs = Attributes::new().registry(registry());
        let step = tzid().pad(1, 0).unwrap();
        let (cursor, _) = parse(&step, "EST   x", &attrs);
        assert!(!cursor.is_error());
        assert_eq!(cursor.position(), 6);
    }

    #[test]
    fn positions_shift_by_left_padding() {
        let step = tzid().pad(6, 0).unwrap();
        let attrs = Attributes::new().pad_char('·');
        let mut out = String::from("tz=");
        let mut positions = vec![];
        let n = step
            .print(&zone("EST"), &mut out, &attrs, Some(&mut positions), false)
            .unwrap();
        assert_eq!(n, 6);
        assert_eq!(out, "tz=···EST");
        // Each `·` is two bytes.
        assert_eq!(positions, [ElementPosition::new(Element::TIMEZONE_ID, 9, 12)]);
        assert_eq!(&out[positions[0].start()..positions[0].end()], "EST");
    }

    #[test]
    fn positions_need_known_sink_length() {
        let step = tzid().pad(4, 0).unwrap();
        let mut positions = vec![];
        step.print(
            &zone("EST"),
            crate::fmt::FmtWrite(String::new()),
            &Attributes::new(),
            Some(&mut positions),
            false,
        )
        .unwrap();
        assert!(positions.is_empty());
    }

    #[test]
    fn reserved_width_only_applies_on_quick_path() {
        let year = FormatStep::new(
            NumberProcessor::new(Element::YEAR, 1, 9).unwrap(),
            0,
            0,
            None,
        )
        .unwrap()
        .reserve(2)
        .unwrap();
        let attrs = Attributes::new();

        let (cursor, parsed) = parse(&year, "202407", &attrs);
        assert_eq!(cursor.position(), 6);
        assert_eq!(parsed.integer(Element::YEAR), Some(202407));

        let quick = year.specialize(&attrs);
        let mut cursor = ParseLog::new();
        let mut parsed = FieldMap::new();
        quick.parse("202407", &mut cursor, &attrs, &mut parsed, true);
        assert_eq!(cursor.position(), 4);
        assert_eq!(parsed.integer(Element::YEAR), Some(2024));
    }

    #[test]
    fn pad_char_that_starts_the_field_is_ambiguous() {
        let year = FormatStep::new(
            NumberProcessor::new(Element::YEAR, 1, 4).unwrap(),
            0,
            0,
            None,
        )
        .unwrap()
        .pad(5, 0)
        .unwrap();
        let attrs = Attributes::new().pad_char('0');

        let out = print(&year, &FieldMap::new().with(Element::YEAR, 0), &attrs)
            .unwrap();
        assert_eq!(out, "00000");

        let (cursor, parsed) = parse(&year, &out, &attrs);
        assert_eq!(cursor.error_index(), Some(5));
        assert!(cursor.error().unwrap().is_unresolved_token());
        assert!(parsed.is_empty());
    }

    #[test]
    fn faults_are_contained() {
        let step = FormatStep::new(
            NumberProcessor::new(Element::YEAR, 1, 4).unwrap(),
            0,
            0,
            Some(Attributes::new().leniency(Leniency::Lax)),
        )
        .unwrap();
        let mut cursor = ParseLog::at(2);
        step.parse("y=99999999999999999999", &mut cursor, &Attributes::new(), &mut FieldMap::new(), false);
        assert!(cursor.is_error());
        assert_eq!(cursor.error_index(), Some(2));
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn condition_suppresses_printing() {
        let has_zone = Condition::new(|fields: &dyn Fields| {
            fields.get(Element::TIMEZONE_ID).is_some()
        });
        let step = FormatStep::new(
            LiteralProcessor::new(" in "),
            1,
            1,
            Some(Attributes::new().condition(has_zone)),
        )
        .unwrap();

        let mut out = String::new();
        let n = step
            .print(&FieldMap::new(), &mut out, &Attributes::new(), None, false)
            .unwrap();
        assert_eq!((n, out.as_str()), (0, ""));
        assert_eq!(print(&step, &zone("EST"), &Attributes::new()).unwrap(), " in ");
    }

    #[test]
    fn sectional_attributes_override_call_attributes() {
        let step = FormatStep::new(
            TimeZoneIdProcessor::new(),
            0,
            0,
            Some(Attributes::new().pad_char('*')),
        )
        .unwrap()
        .pad(4, 0)
        .unwrap();
        let attrs = Attributes::new().pad_char('0');
        assert_eq!(print(&step, &zone("EST"), &attrs).unwrap(), "*EST");
    }

    #[test]
    fn quick_path_is_equivalent() {
        let bases = [
            Attributes::new(),
            Attributes::new().leniency(Leniency::Lax).pad_char('_'),
            Attributes::new().decimal_separator(',').registry(registry()),
        ];
        let steps = [
            tzid().pad(7, 1).unwrap(),
            FormatStep::new(FractionProcessor::new(3, 9, true).unwrap(), 0, 0, None).unwrap(),
            FormatStep::new(OffsetProcessor::basic(), 0, 0, Some(Attributes::new().pad_char('.')))
                .unwrap()
                .pad(0, 8)
                .unwrap(),
        ];
        let value = zone("Asia/Tokyo")
            .with(Element::NANO_OF_SECOND, 120_000_000)
            .with(Element::TIMEZONE_OFFSET, Offset::constant(9));
        for base in bases.iter() {
            for step in steps.iter() {
                let quick = step.specialize(base);
                let (mut slow_out, mut quick_out) = (String::new(), String::new());
                step.print(&value, &mut slow_out, base, None, false).unwrap();
                quick
                    .print(&value, &mut quick_out, &Attributes::new(), None, true)
                    .unwrap();
                assert_eq!(slow_out, quick_out, "step: {step}");

                let (slow_cursor, slow_parsed) = parse(step, &slow_out, base);
                let mut quick_cursor = ParseLog::new();
                let mut quick_parsed = FieldMap::new();
                quick.parse(&quick_out, &mut quick_cursor, &Attributes::new(), &mut quick_parsed, true);
                assert_eq!(slow_cursor.position(), quick_cursor.position());
                assert_eq!(slow_parsed, quick_parsed);
            }
        }
    }

    #[test]
    fn quick_without_specialization_falls_back() {
        let step = tzid().pad(4, 0).unwrap();
        let attrs = Attributes::new().pad_char('-');
        let mut out = String::new();
        step.print(&zone("EST"), &mut out, &attrs, None, true).unwrap();
        assert_eq!(out, "-EST");
    }

    #[test]
    fn modifications_drop_specialization() {
        let step = tzid().specialize(&Attributes::new());
        assert!(step.is_specialized());
        assert!(!step.pad(1, 0).unwrap().is_specialized());
        assert!(!step.reserve(1).unwrap().is_specialized());
        assert!(!step.start_new_or_block().unwrap().is_specialized());

        let marked = step.start_new_or_block().unwrap().specialize(&Attributes::new());
        assert!(marked.mark_last_or_block(4).unwrap().is_specialized());
    }

    #[test]
    fn update_element() {
        let hour = FormatStep::new(
            NumberProcessor::new(Element::HOUR_OF_DAY, 2, 2).unwrap(),
            0,
            0,
            None,
        )
        .unwrap();
        let minute = hour.update_element(Element::MINUTE_OF_HOUR).unwrap();
        assert_eq!(minute.processor().element(), Some(Element::MINUTE_OF_HOUR));
        assert_ne!(minute, hour);

        let err = hour.update_element(Element::TIMEZONE_ID).unwrap_err();
        assert!(err.is_incompatible_element());

        let literal = FormatStep::new(LiteralProcessor::new(":"), 0, 0, None).unwrap();
        assert_eq!(literal.update_element(Element::TIMEZONE_ID).unwrap(), literal);

        let composite = FormatStep::new(CompositeProcessor::new([hour]), 0, 0, None).unwrap();
        assert_eq!(composite.update_element(Element::YEAR).unwrap(), composite);
    }

    #[test]
    fn or_blocks() {
        let step = tzid();
        assert!(!step.is_new_or_block_started());
        let err = step.mark_last_or_block(3).unwrap_err();
        assert!(err.is_invalid_configuration());
        insta::assert_snapshot!(
            err,
            @"cannot mark the last or-block on a step that doesn't start an or-block",
        );

        let started = step.start_new_or_block().unwrap();
        assert!(started.is_new_or_block_started());
        assert_eq!(started.last_or_block_index(), None);
        insta::assert_snapshot!(
            started.start_new_or_block().unwrap_err(),
            @"cannot start an or-block twice on the same step",
        );

        let marked = started.mark_last_or_block(3).unwrap();
        assert_eq!(marked.last_or_block_index(), Some(3));
        assert_ne!(marked, started);
    }

    #[test]
    fn equality_and_hash() {
        use std::collections::HashSet;

        let a = tzid().pad(2, 0).unwrap();
        let b = FormatStep::new(TimeZoneIdProcessor::new(), 0, 0, None)
            .unwrap()
            .pad(1, 0)
            .unwrap()
            .pad(1, 0)
            .unwrap();
        assert_eq!(a, b);
        assert_ne!(a, a.reserve(1).unwrap());
        assert_ne!(a, FormatStep::new(TimeZoneIdProcessor::new(), 1, 0, None).unwrap().pad(2, 0).unwrap());
        assert_ne!(a, a.specialize(&Attributes::new()));

        let set: HashSet<FormatStep> = [a.clone(), b, a.reserve(1).unwrap()].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn display() {
        let step = FormatStep::new(
            LiteralProcessor::new("T"),
            1,
            2,
            None,
        )
        .unwrap()
        .pad(0, 3)
        .unwrap()
        .start_new_or_block()
        .unwrap();
        insta::assert_snapshot!(
            step.to_string(),
            @r###"[processor=LiteralProcessor["T"], level=1, section=2, reserved=0, pad-left=0, pad-right=3, or-block-started]"###,
        );
    }

    #[test]
    fn steps_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FormatStep>();
    }
}
