use crate::error;

#[derive(Clone, Debug)]
pub(crate) enum Error {
    PadExceeded { element: &'static str },
    PadMismatched { element: &'static str },
}

impl From<Error> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: Error) -> error::Error {
        error::ErrorKind::Step(err).into()
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
            PadExceeded { element } => {
                write!(f, "pad width exceeded for element '{element}'")
            }
            PadMismatched { element } => {
                write!(f, "pad width mismatched for element '{element}'")
            }
        }
    }
}
