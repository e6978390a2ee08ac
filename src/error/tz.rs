use alloc::boxed::Box;

use crate::error;

#[derive(Clone, Debug)]
pub(crate) enum Error {
    InverseEtcGmt { name: Box<str>, position: usize },
    MissingName { position: usize },
    MissingValidId { position: usize },
    OffsetDigits { what: &'static str, position: usize },
    OffsetRange { seconds: i64 },
    OffsetSign { position: usize },
    Unresolved { name: Box<str>, position: usize },
}

impl Error {
    pub(crate) fn inverse_etc_gmt(name: &str, position: usize) -> Error {
        Error::InverseEtcGmt { name: name.into(), position }
    }

    pub(crate) fn unresolved(name: &str, position: usize) -> Error {
        Error::Unresolved { name: name.into(), position }
    }
}

impl From<Error> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: Error) -> error::Error {
        error::ErrorKind::Tz(err).into()
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
            InverseEtcGmt { ref name, position } => write!(
                f,
                "inverse offset notation {name:?} at position {position} \
                 is not supported, use a UTC offset like `UTC+03` instead",
            ),
            MissingName { position } => write!(
                f,
                "expected time zone name at position {position}, \
                 but found end of input",
            ),
            MissingValidId { position } => write!(
                f,
                "missing valid time zone identifier at position {position}",
            ),
            OffsetDigits { what, position } => write!(
                f,
                "expected two digit offset {what} at position {position}",
            ),
            OffsetRange { seconds } => write!(
                f,
                "offset of {seconds} seconds is not in the required \
                 range of -18:00..=+18:00",
            ),
            OffsetSign { position } => write!(
                f,
                "expected `+` or `-` sign for offset at position {position}",
            ),
            Unresolved { ref name, position } => write!(
                f,
                "time zone identifier {name:?} at position {position} \
                 is not in the registry",
            ),
        }
    }
}
