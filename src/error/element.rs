use crate::error;

#[derive(Clone, Debug)]
pub(crate) enum Error {
    Incompatible { from: &'static str, to: &'static str },
    ValueUnavailable { element: &'static str },
}

impl From<Error> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: Error) -> error::Error {
        error::ErrorKind::Element(err).into()
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
            Incompatible { from, to } => write!(
                f,
                "cannot rebind processor from element '{from}' to \
                 element '{to}' because their value types differ",
            ),
            ValueUnavailable { element } => write!(
                f,
                "value to print has no '{element}' field",
            ),
        }
    }
}
