use std::io;

use steptime::{
    attr::{Attributes, Condition, Leniency},
    element::{Element, FieldMap, Fields},
    fmt::{
        processor::{
            CompositeProcessor, LiteralProcessor, NumberProcessor,
            OffsetProcessor, TimeZoneIdProcessor,
        },
        ElementPosition, ParseLog, StdWrite,
    },
    tz::{Offset, Registry, TimeZoneId},
    FormatStep,
};

use crate::{init_logging, step};

fn registry() -> Registry {
    Registry::new([
        "America/New_York",
        "Asia/Kolkata",
        "EST",
        "Europe/Berlin",
        "Pacific/Chatham",
    ])
}

fn zone(name: &str) -> FieldMap {
    FieldMap::new().with(Element::TIMEZONE_ID, TimeZoneId::new(name))
}

fn parse(
    step: &FormatStep,
    text: &str,
    attrs: &Attributes,
) -> (ParseLog, FieldMap) {
    let mut cursor = ParseLog::new();
    let mut parsed = FieldMap::new();
    step.parse(text, &mut cursor, attrs, &mut parsed, false);
    (cursor, parsed)
}

#[test]
fn every_registered_zone_round_trips() -> anyhow::Result<()> {
    init_logging();

    let attrs = Attributes::new().registry(registry());
    for padded in [step(TimeZoneIdProcessor::new()).pad(20, 0)?, step(TimeZoneIdProcessor::new())] {
        for id in registry().iter() {
            let value = zone(id.as_str());
            let mut out = String::new();
            padded.print(&value, &mut out, &attrs, None, false)?;

            let (cursor, parsed) = parse(&padded, &out, &attrs);
            assert!(!cursor.is_error(), "{out:?}: {:?}", cursor.error());
            assert_eq!(cursor.position(), out.len());
            assert_eq!(parsed, value);
        }
    }
    Ok(())
}

#[test]
fn zone_grammar() {
    init_logging();

    let attrs = Attributes::new().registry(registry());
    let tzid = step(TimeZoneIdProcessor::new());
    let offset = |text: &str| {
        let (cursor, parsed) = parse(&tzid, text, &attrs);
        assert!(!cursor.is_error(), "{text:?}: {:?}", cursor.error());
        (cursor.position(), parsed.offset(Element::TIMEZONE_OFFSET))
    };

    assert_eq!(offset("Z"), (1, Some(Offset::UTC)));
    assert_eq!(offset("UT"), (2, Some(Offset::UTC)));
    assert_eq!(offset("GMT+05:45"), (9, Some(Offset::constant_seconds(20_700))));
    assert_eq!(offset("UTC-0330"), (8, Some(Offset::constant_seconds(-12_600))));

    let (cursor, _) = parse(&tzid, "Etc/GMT+3", &attrs);
    let err = cursor.error().unwrap();
    assert!(err.is_unsupported());
    assert_eq!(cursor.error_index(), Some(0));

    let (cursor, _) = parse(&tzid, "Europe/Paris", &attrs);
    assert!(cursor.error().unwrap().is_unresolved_token());

    // Lookups are exact and case sensitive.
    let (cursor, _) = parse(&tzid, "europe/berlin", &attrs);
    assert!(cursor.is_error());
}

#[test]
fn optional_zone_section() -> anyhow::Result<()> {
    let has_zone = Condition::new(|fields: &dyn Fields| {
        fields.get(Element::TIMEZONE_ID).is_some()
    });
    let section = Some(Attributes::new().condition(has_zone));
    let formatter = step(CompositeProcessor::new([
        step(NumberProcessor::new(Element::HOUR_OF_DAY, 2, 2)?),
        step(LiteralProcessor::new(":")),
        step(NumberProcessor::new(Element::MINUTE_OF_HOUR, 2, 2)?),
        FormatStep::new(LiteralProcessor::new(" "), 1, 1, section.clone())?,
        FormatStep::new(TimeZoneIdProcessor::new(), 1, 1, section)?,
    ]));
    let attrs = Attributes::new().registry(registry());
    let time = FieldMap::new()
        .with(Element::HOUR_OF_DAY, 8)
        .with(Element::MINUTE_OF_HOUR, 15);

    let mut out = String::new();
    formatter.print(&time, &mut out, &attrs, None, false)?;
    assert_eq!(out, "08:15");

    let zoned = time.with(Element::TIMEZONE_ID, TimeZoneId::new("Asia/Kolkata"));
    let mut out = String::new();
    let mut positions = vec![];
    let n = formatter.print(&zoned, &mut out, &attrs, Some(&mut positions), false)?;
    assert_eq!(n, out.len());
    assert_eq!(out, "08:15 Asia/Kolkata");
    assert_eq!(
        positions.last(),
        Some(&ElementPosition::new(Element::TIMEZONE_ID, 6, 18)),
    );
    Ok(())
}

/// A minimal driver that tries the alternatives of an or-block in order.
fn parse_first_of(
    steps: &[FormatStep],
    text: &str,
    attrs: &Attributes,
) -> (ParseLog, FieldMap) {
    assert!(steps[0].is_new_or_block_started());
    let end = steps[0].last_or_block_index().unwrap();
    let mut cursor = ParseLog::new();
    let mut parsed = FieldMap::new();
    for alternative in &steps[..end] {
        cursor.reset();
        parsed.clear();
        alternative.parse(text, &mut cursor, attrs, &mut parsed, false);
        if !cursor.is_error() {
            break;
        }
    }
    (cursor, parsed)
}

#[test]
fn or_block_alternatives() -> anyhow::Result<()> {
    let steps = [
        step(OffsetProcessor::basic()).start_new_or_block()?.mark_last_or_block(2)?,
        step(TimeZoneIdProcessor::new()),
    ];
    let attrs = Attributes::new()
        .leniency(Leniency::Strict)
        .registry(registry());

    let (cursor, parsed) = parse_first_of(&steps, "-0500", &attrs);
    assert_eq!(cursor.position(), 5);
    assert_eq!(
        parsed.offset(Element::TIMEZONE_OFFSET),
        Some(Offset::constant(-5)),
    );

    let (cursor, parsed) = parse_first_of(&steps, "EST", &attrs);
    assert_eq!(cursor.position(), 3);
    assert_eq!(parsed, zone("EST"));

    let (cursor, _) = parse_first_of(&steps, "???", &attrs);
    assert!(cursor.error().unwrap().is_unresolved_token());
    Ok(())
}

#[test]
fn io_sink() -> anyhow::Result<()> {
    let tzid = step(TimeZoneIdProcessor::new()).pad(0, 16)?;
    let value = zone("Europe/Berlin");

    let mut buf = std::io::Cursor::new(Vec::new());
    tzid.print(&value, StdWrite(&mut buf), &Attributes::new(), None, false)?;
    assert_eq!(buf.into_inner(), b"Europe/Berlin   ");

    let mut full = [0u8; 4];
    let err = tzid
        .print(
            &value,
            StdWrite(&mut full[..]),
            &Attributes::new(),
            None,
            false,
        )
        .unwrap_err();
    assert!(err.is_io());
    Ok(())
}

/// A sink whose reader went away.
struct ClosedPipe;

impl io::Write for ClosedPipe {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn sink_errors_pass_through_composites() -> anyhow::Result<()> {
    let literal = step(LiteralProcessor::new("T"));
    let composite = step(CompositeProcessor::new([
        step(LiteralProcessor::new("")),
        literal.clone(),
    ]));
    let attrs = Attributes::new();
    let value = FieldMap::new();

    let direct = literal
        .print(&value, StdWrite(ClosedPipe), &attrs, None, false)
        .unwrap_err();
    let nested = composite
        .print(&value, StdWrite(ClosedPipe), &attrs, None, false)
        .unwrap_err();
    assert!(nested.is_io());
    assert_eq!(nested.to_string(), "pipe closed");
    assert_eq!(nested.to_string(), direct.to_string());

    // Other failures still name the failing step.
    let missing = step(CompositeProcessor::new([
        literal,
        step(TimeZoneIdProcessor::new()),
    ]))
    .print(&value, &mut String::new(), &attrs, None, false)
    .unwrap_err();
    assert!(missing.is_value_unavailable());
    assert!(missing.to_string().starts_with("failed to print step 1 of composite: "));
    Ok(())
}
