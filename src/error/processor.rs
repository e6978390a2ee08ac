use alloc::boxed::Box;

use crate::error;

#[derive(Clone, Debug)]
pub(crate) enum Error {
    FractionRange { given: i64 },
    LiteralMismatch { expected: Box<str>, position: usize },
    MissingDigits { element: &'static str, position: usize },
    MissingSeparator { position: usize },
    NumberOverflow { element: &'static str },
    NumberTooWide { element: &'static str, digits: usize, max: u8 },
    TooFewDigits { element: &'static str, found: usize, min: u8 },
}

impl From<Error> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: Error) -> error::Error {
        error::ErrorKind::Processor(err).into()
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
            FractionRange { given } => write!(
                f,
                "fraction of second {given} is not in the required \
                 range of 0..=999999999 nanoseconds",
            ),
            LiteralMismatch { ref expected, position } => write!(
                f,
                "expected literal {expected:?} at position {position}",
            ),
            MissingDigits { element, position } => write!(
                f,
                "expected digits for element '{element}' \
                 at position {position}",
            ),
            MissingSeparator { position } => write!(
                f,
                "expected decimal separator at position {position}",
            ),
            NumberOverflow { element } => write!(
                f,
                "number parsed for element '{element}' is too big",
            ),
            NumberTooWide { element, digits, max } => write!(
                f,
                "value of element '{element}' needs {digits} digits, \
                 but at most {max} are allowed",
            ),
            TooFewDigits { element, found, min } => write!(
                f,
                "found {found} digits for element '{element}', \
                 but at least {min} are required",
            ),
        }
    }
}
