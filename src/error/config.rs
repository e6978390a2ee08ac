use alloc::boxed::Box;

use crate::error;

#[derive(Clone, Debug)]
pub(crate) enum Error {
    DigitRange { min: u8, max: u8, limit: u8 },
    Negative { what: &'static str, given: i64 },
    OrBlockAlreadyStarted,
    OrBlockNotStarted,
    TooBig { what: &'static str, given: i64 },
    UnknownLeniency { given: Box<str> },
}

impl Error {
    pub(crate) fn unknown_leniency(given: &str) -> Error {
        Error::UnknownLeniency { given: given.into() }
    }
}

impl From<Error> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: Error) -> error::Error {
        error::ErrorKind::Config(err).into()
    }
}

impl error::IntoError for Error {
    fn into_error(self) -> error::Error {
        self.into()
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::Error::*;

        match *self {
            DigitRange { min, max, limit } => write!(
                f,
                "digit counts must satisfy 1 <= min <= max <= {limit}, \
                 but got min={min} and max={max}",
            ),
            Negative { what, given } => write!(
                f,
                "parameter '{what}' must not be negative, but got {given}",
            ),
            OrBlockAlreadyStarted => {
                f.write_str("cannot start an or-block twice on the same step")
            }
            OrBlockNotStarted => f.write_str(
                "cannot mark the last or-block on a step \
                 that doesn't start an or-block",
            ),
            TooBig { what, given } => write!(
                f,
                "parameter '{what}' with value {given} is too big",
            ),
            UnknownLeniency { ref given } => write!(
                f,
                "unrecognized leniency {given:?} \
                 (expected one of `strict`, `smart` or `lax`)",
            ),
        }
    }
}
