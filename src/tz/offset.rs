use crate::{error::tz::Error as E, Error};

/// Represents a fixed offset from UTC.
///
/// Negative offsets correspond to time zones west of the prime meridian,
/// while positive offsets correspond to time zones east of the prime
/// meridian. Equivalently, in all cases, `civil-time - offset = UTC`.
///
/// Offsets are limited to the range `-18:00..=+18:00`.
///
/// # Display format
///
/// This type implements `core::fmt::Display` using the extended format
/// `{sign}{hours}:{minutes}[:{seconds}]`, where seconds are only present
/// when non-zero. The zero offset is written as `+00:00`.
///
/// ```
/// use steptime::tz::Offset;
///
/// assert_eq!(Offset::constant(-5).to_string(), "-05:00");
/// assert_eq!(Offset::constant_seconds(19_830).to_string(), "+05:30:30");
/// assert_eq!(Offset::UTC.to_string(), "+00:00");
/// ```
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Offset {
    seconds: i32,
}

impl Offset {
    /// The minimum possible offset, `-18:00`.
    pub const MIN: Offset = Offset { seconds: -Offset::MAX_SECONDS };

    /// The maximum possible offset, `+18:00`.
    pub const MAX: Offset = Offset { seconds: Offset::MAX_SECONDS };

    /// The offset corresponding to UTC. That is, no offset at all.
    pub const UTC: Offset = Offset { seconds: 0 };

    const MAX_SECONDS: i32 = 18 * 60 * 60;

    /// Creates a new offset in a `const` context from a number of hours.
    ///
    /// # Panics
    ///
    /// When `hours` is not in the range `-18..=18`.
    #[inline]
    pub const fn constant(hours: i8) -> Offset {
        Offset::constant_seconds((hours as i32) * 60 * 60)
    }

    /// Creates a new offset in a `const` context from a number of seconds.
    ///
    /// # Panics
    ///
    /// When `seconds` is not in the range `-64_800..=64_800`.
    #[inline]
    pub const fn constant_seconds(seconds: i32) -> Offset {
        if seconds < -Offset::MAX_SECONDS || seconds > Offset::MAX_SECONDS {
            panic!("invalid offset seconds")
        }
        Offset { seconds }
    }

    /// Creates a new offset from a number of seconds.
    ///
    /// # Errors
    ///
    /// When `seconds` is not in the range `-64_800..=64_800`.
    ///
    /// # Example
    ///
    /// ```
    /// use steptime::tz::Offset;
    ///
    /// assert_eq!(Offset::new_seconds(7_200)?, Offset::constant(2));
    /// assert!(Offset::new_seconds(64_801).is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[inline]
    pub fn new_seconds(seconds: i32) -> Result<Offset, Error> {
        if seconds < -Offset::MAX_SECONDS || seconds > Offset::MAX_SECONDS {
            return Err(Error::from(E::OffsetRange {
                seconds: i64::from(seconds),
            }));
        }
        Ok(Offset { seconds })
    }

    /// Returns the total number of seconds in this offset.
    #[inline]
    pub fn seconds(self) -> i32 {
        self.seconds
    }

    /// Returns true if this offset is west of UTC.
    #[inline]
    pub fn is_negative(self) -> bool {
        self.seconds < 0
    }

    /// Returns the absolute hour, minute and second components.
    pub(crate) fn parts(self) -> (u8, u8, u8) {
        let abs = self.seconds.unsigned_abs();
        ((abs / 3600) as u8, ((abs / 60) % 60) as u8, (abs % 60) as u8)
    }
}

impl core::fmt::Debug for Offset {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let (hours, minutes, seconds) = self.parts();
        write!(f, "Offset({sign}{hours:02}:{minutes:02}:{seconds:02})")
    }
}

impl core::fmt::Display for Offset {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let sign = if self.is_negative() { "-" } else { "+" };
        let (hours, minutes, seconds) = self.parts();
        if seconds == 0 {
            write!(f, "{sign}{hours:02}:{minutes:02}")
        } else {
            write!(f, "{sign}{hours:02}:{minutes:02}:{seconds:02}")
        }
    }
}

impl core::str::FromStr for Offset {
    type Err = Error;

    /// Parses an offset in the extended (`+05:30`) or basic (`+0530`)
    /// format. The hour-only form `+05` is accepted too.
    fn from_str(s: &str) -> Result<Offset, Error> {
        let parsed = parse(s.as_bytes(), 0, false)?;
        if parsed.len != s.len() {
            return Err(Error::from(E::OffsetDigits {
                what: "end",
                position: parsed.len,
            }));
        }
        Ok(parsed.offset)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Offset {
    #[inline]
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Offset {
    #[inline]
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Offset, D::Error> {
        use serde::de;

        struct OffsetVisitor;

        impl<'de> de::Visitor<'de> for OffsetVisitor {
            type Value = Offset;

            fn expecting(
                &self,
                f: &mut core::fmt::Formatter,
            ) -> core::fmt::Result {
                f.write_str("an offset string like `+05:30`")
            }

            #[inline]
            fn visit_bytes<E: de::Error>(
                self,
                value: &[u8],
            ) -> Result<Offset, E> {
                let parsed = parse(value, 0, false).map_err(de::Error::custom)?;
                if parsed.len != value.len() {
                    return Err(de::Error::invalid_length(value.len(), &self));
                }
                Ok(parsed.offset)
            }

            #[inline]
            fn visit_str<E: de::Error>(self, value: &str) -> Result<Offset, E> {
                self.visit_bytes(value.as_bytes())
            }
        }

        deserializer.deserialize_str(OffsetVisitor)
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for Offset {
    fn arbitrary(g: &mut quickcheck::Gen) -> Offset {
        let seconds =
            <i32 as quickcheck::Arbitrary>::arbitrary(g) % (Offset::MAX_SECONDS + 1);
        Offset { seconds }
    }

    fn shrink(&self) -> alloc::boxed::Box<dyn Iterator<Item = Offset>> {
        alloc::boxed::Box::new(
            quickcheck::Arbitrary::shrink(&self.seconds)
                .map(|seconds| Offset { seconds }),
        )
    }
}

/// The result of parsing an offset from the beginning of some input.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ParsedOffset {
    pub(crate) offset: Offset,
    /// The number of bytes consumed.
    pub(crate) len: usize,
}

/// Parses `±HH[[:]MM[[:]SS]]` from the beginning of `input`.
///
/// `base` is only used to report absolute positions in errors. When
/// `require_minutes` is set, the hour-only form is rejected.
pub(crate) fn parse(
    input: &[u8],
    base: usize,
    require_minutes: bool,
) -> Result<ParsedOffset, Error> {
    let negative = match input.first() {
        Some(&b'+') => false,
        Some(&b'-') => true,
        _ => return Err(Error::from(E::OffsetSign { position: base })),
    };
    let mut pos = 1;
    let hours = two_digits(input, pos)
        .ok_or(E::OffsetDigits { what: "hours", position: base + pos })?;
    pos += 2;

    let mut minutes = 0;
    let mut seconds = 0;
    let extended = input.get(pos) == Some(&b':');
    let minute_pos = if extended { pos + 1 } else { pos };
    match two_digits(input, minute_pos) {
        Some(m) if m < 60 => {
            minutes = m;
            pos = minute_pos + 2;
            let second_pos = if extended { pos + 1 } else { pos };
            let has_sep = input.get(pos) == Some(&b':');
            if has_sep == extended {
                if let Some(s) = two_digits(input, second_pos) {
                    if s < 60 {
                        seconds = s;
                        pos = second_pos + 2;
                    }
                }
            }
        }
        _ if require_minutes || extended => {
            return Err(Error::from(E::OffsetDigits {
                what: "minutes",
                position: base + minute_pos,
            }));
        }
        _ => {}
    }

    let mut total =
        i32::from(hours) * 3600 + i32::from(minutes) * 60 + i32::from(seconds);
    if negative {
        total = -total;
    }
    let offset = Offset::new_seconds(total)?;
    Ok(ParsedOffset { offset, len: pos })
}

fn two_digits(input: &[u8], at: usize) -> Option<u8> {
    let tens = *input.get(at)?;
    let ones = *input.get(at + 1)?;
    if !tens.is_ascii_digit() || !ones.is_ascii_digit() {
        return None;
    }
    Some((tens - b'0') * 10 + (ones - b'0'))
}
