use std::sync::Arc;

use steptime::{
    attr::{Attributes, Leniency},
    element::{Element, FieldMap},
    fmt::{
        processor::{
            FractionProcessor, LiteralProcessor, NumberProcessor,
            TimeZoneIdProcessor,
        },
        ParseLog,
    },
    tz::{Registry, SharedRegistry, TimeZoneId},
    FormatStep,
};

use crate::{init_logging, step};

fn formatter(base: &Attributes) -> anyhow::Result<Arc<[FormatStep]>> {
    let steps = [
        step(NumberProcessor::new(Element::HOUR_OF_DAY, 2, 2)?),
        step(LiteralProcessor::new(":")),
        step(NumberProcessor::new(Element::MINUTE_OF_HOUR, 2, 2)?),
        step(LiteralProcessor::new(":")),
        step(NumberProcessor::new(Element::SECOND_OF_MINUTE, 2, 2)?),
        step(FractionProcessor::new(3, 3, true)?),
        step(LiteralProcessor::new(" ")),
        step(TimeZoneIdProcessor::new()).pad(0, 18)?,
    ];
    Ok(steps.iter().map(|s| s.specialize(base)).collect())
}

fn print_all(steps: &[FormatStep], value: &FieldMap) -> String {
    let mut out = String::new();
    for step in steps {
        step.print(value, &mut out, &Attributes::new(), None, true).unwrap();
    }
    out
}

#[test]
fn shared_formatter_is_deterministic() -> anyhow::Result<()> {
    init_logging();

    let base = Attributes::new().leniency(Leniency::Strict).pad_char('.');
    let steps = formatter(&base)?;
    let value = FieldMap::new()
        .with(Element::HOUR_OF_DAY, 23)
        .with(Element::MINUTE_OF_HOUR, 59)
        .with(Element::SECOND_OF_MINUTE, 1)
        .with(Element::NANO_OF_SECOND, 7_000_000)
        .with(Element::TIMEZONE_ID, TimeZoneId::new("America/New_York"));
    let expected = print_all(&steps, &value);
    assert_eq!(expected, "23:59:01.007 America/New_York..");

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let steps = Arc::clone(&steps);
                let value = value.clone();
                scope.spawn(move || {
                    (0..100).map(|_| print_all(&steps, &value)).collect::<Vec<_>>()
                })
            })
            .collect();
        for handle in handles {
            for got in handle.join().unwrap() {
                assert_eq!(got, expected);
            }
        }
    });
    Ok(())
}

#[test]
fn readers_see_published_snapshots() {
    init_logging();

    let shared = SharedRegistry::new(Registry::new(["EST"]));
    let tzid = step(TimeZoneIdProcessor::new());
    let lookup = |registry: Registry| {
        let attrs = Attributes::new().registry(registry);
        let mut cursor = ParseLog::new();
        tzid.parse("Asia/Tokyo", &mut cursor, &attrs, &mut FieldMap::new(), false);
        !cursor.is_error()
    };

    let before = shared.snapshot();
    std::thread::scope(|scope| {
        scope.spawn(|| shared.publish(Registry::new(["EST", "Asia/Tokyo"])));
    });
    // A snapshot taken earlier is unaffected by the publication.
    assert!(!lookup(before));
    assert!(lookup(shared.snapshot()));
}
