use alloc::{boxed::Box, sync::Arc};

pub(crate) mod config;
pub(crate) mod element;
pub(crate) mod processor;
pub(crate) mod step;
pub(crate) mod tz;

/// An error that can occur in this crate.
///
/// The errors produced by this crate fall into a handful of categories:
///
/// * Invalid configuration when building a step or processor, for example a
/// negative pad width. See [`Error::is_invalid_configuration`].
/// * A value lacking a field that a processor needs to print. See
/// [`Error::is_value_unavailable`].
/// * Strict-mode width violations while padding. See
/// [`Error::is_pad_exceeded`] and [`Error::is_pad_mismatched`].
/// * Parse failures, which are almost always reported through a
/// [`ParseLog`](crate::fmt::ParseLog) rather than returned directly.
/// * Failures of the output sink, e.g., an I/O error when printing into a
/// `std::io::Write` implementation.
///
/// # Introspection is limited
///
/// Other than the `is_*` predicates, this error type provides no way to
/// inspect what went wrong. The predicates are not exhaustive. That is, some
/// errors return `false` for all of them.
///
/// # Design
///
/// There is exactly one error type for every operation in this crate. Finer
/// grained error types compose poorly once a step wraps a processor that
/// wraps other steps.
#[derive(Clone)]
pub struct Error {
    /// The internal representation of an error.
    ///
    /// This is in an `Arc` so that `Error` is cheap to clone and one word in
    /// size. The size matters because almost every print and parse routine
    /// returns a `Result<T, Error>`.
    inner: Option<Arc<ErrorInner>>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

impl Error {
    /// Creates a new error value from `core::fmt::Arguments`.
    ///
    /// This is mostly useful for implementations of
    /// [`Write`](crate::fmt::Write) that need to report a failure that
    /// doesn't correspond to any other kind of error in this crate.
    ///
    /// # Example
    ///
    /// ```
    /// use steptime::Error;
    ///
    /// let err = Error::from_args(format_args!("sink is closed"));
    /// assert_eq!(err.to_string(), "sink is closed");
    /// ```
    pub fn from_args<'a>(message: core::fmt::Arguments<'a>) -> Error {
        Error::from(ErrorKind::Adhoc(AdhocError::from_args(message)))
    }

    /// Returns true when printing failed because the value being printed
    /// doesn't carry the field a processor needs.
    ///
    /// # Example
    ///
    /// ```
    /// use steptime::{
    ///     attr::Attributes, element::FieldMap,
    ///     fmt::processor::TimeZoneIdProcessor, fmt::step::FormatStep,
    /// };
    ///
    /// let step = FormatStep::new(TimeZoneIdProcessor::new(), 0, 0, None)?;
    /// let mut out = String::new();
    /// let err = step.print(
    ///     &FieldMap::new(), &mut out, &Attributes::new(), None, false,
    /// ).unwrap_err();
    /// assert!(err.is_value_unavailable());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn is_value_unavailable(&self) -> bool {
        use self::element::Error as ElementError;

        matches!(
            *self.root().kind(),
            ErrorKind::Element(ElementError::ValueUnavailable { .. })
        )
    }

    /// Returns true when a step or processor was configured with values that
    /// violate its invariants, such as a negative pad width or starting an
    /// or-block twice.
    ///
    /// # Example
    ///
    /// ```
    /// use steptime::fmt::{processor::LiteralProcessor, step::FormatStep};
    ///
    /// let err = FormatStep::new(LiteralProcessor::new("-"), -1, 0, None)
    ///     .unwrap_err();
    /// assert!(err.is_invalid_configuration());
    /// ```
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(*self.root().kind(), ErrorKind::Config(_))
    }

    /// Returns true when strict padding found content wider than the
    /// declared pad width.
    pub fn is_pad_exceeded(&self) -> bool {
        matches!(
            *self.root().kind(),
            ErrorKind::Step(self::step::Error::PadExceeded { .. })
        )
    }

    /// Returns true when strict parsing found a padded field whose total
    /// width doesn't match the declared pad width exactly.
    pub fn is_pad_mismatched(&self) -> bool {
        matches!(
            *self.root().kind(),
            ErrorKind::Step(self::step::Error::PadMismatched { .. })
        )
    }

    /// Returns true when parsing found no text matching the grammar of a
    /// processor, or when a time zone identifier wasn't in the registry.
    pub fn is_unresolved_token(&self) -> bool {
        use self::{processor::Error as P, tz::Error as T};

        matches!(
            *self.root().kind(),
            ErrorKind::Tz(
                T::MissingName { .. }
                    | T::MissingValidId { .. }
                    | T::Unresolved { .. }
                    | T::OffsetSign { .. }
                    | T::OffsetDigits { .. }
            ) | ErrorKind::Processor(
                P::MissingDigits { .. }
                    | P::TooFewDigits { .. }
                    | P::MissingSeparator { .. }
                    | P::LiteralMismatch { .. }
            )
        )
    }

    /// Returns true when parsing recognized a construct that is explicitly
    /// rejected, such as the inverse `Etc/GMT+3` offset notation.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            *self.root().kind(),
            ErrorKind::Tz(self::tz::Error::InverseEtcGmt { .. })
        )
    }

    /// Returns true when rebinding a processor to a different element failed
    /// because the value types of the two elements differ.
    pub fn is_incompatible_element(&self) -> bool {
        use self::element::Error as ElementError;

        matches!(
            *self.root().kind(),
            ErrorKind::Element(ElementError::Incompatible { .. })
        )
    }

    /// Returns true when this error originated from an I/O failure of the
    /// output sink.
    pub fn is_io(&self) -> bool {
        matches!(*self.root().kind(), ErrorKind::IO(_))
    }
}

impl Error {
    /// A convenience constructor for building an I/O error.
    ///
    /// This is only available when the `std` feature is enabled.
    #[cfg(feature = "std")]
    #[inline(never)]
    #[cold]
    pub(crate) fn io(err: std::io::Error) -> Error {
        Error::from(ErrorKind::IO(IOError { err }))
    }

    #[inline(never)]
    #[cold]
    fn context_impl(self, consequent: Error) -> Error {
        let mut err = consequent;
        if err.inner.is_none() {
            err = Error::from(ErrorKind::Unknown);
        }
        let inner = err.inner.as_mut().unwrap();
        assert!(inner.cause.is_none(), "cause of consequence must be `None`");
        // OK because we just created this error so the Arc has one
        // reference.
        Arc::get_mut(inner).unwrap().cause = Some(self);
        err
    }

    /// Returns the root error in this chain.
    fn root(&self) -> &Error {
        // OK because `Error::chain` always yields at least one error.
        self.chain().last().unwrap()
    }

    /// Returns a chain of error values, starting with the highest level
    /// context and ending with the root cause.
    fn chain(&self) -> impl Iterator<Item = &Error> {
        let mut err = self;
        core::iter::once(err).chain(core::iter::from_fn(move || {
            err = err.inner.as_ref().and_then(|inner| inner.cause.as_ref())?;
            Some(err)
        }))
    }

    /// Returns the kind of this error.
    fn kind(&self) -> &ErrorKind {
        self.inner
            .as_ref()
            .map(|inner| &inner.kind)
            .unwrap_or(&ErrorKind::Unknown)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut it = self.chain().peekable();
        while let Some(err) = it.next() {
            core::fmt::Display::fmt(err.kind(), f)?;
            if it.peek().is_some() {
                f.write_str(": ")?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if !f.alternate() {
            core::fmt::Display::fmt(self, f)
        } else {
            let Some(ref inner) = self.inner else {
                return f
                    .debug_struct("Error")
                    .field("kind", &"None")
                    .finish();
            };
            f.debug_struct("Error")
                .field("kind", &inner.kind)
                .field("cause", &inner.cause)
                .finish()
        }
    }
}

/// The underlying kind of a [`Error`].
#[derive(Debug)]
enum ErrorKind {
    Adhoc(AdhocError),
    Config(self::config::Error),
    Element(self::element::Error),
    #[allow(dead_code)] // not constructed without `std`
    IO(IOError),
    Processor(self::processor::Error),
    Step(self::step::Error),
    Tz(self::tz::Error),
    Unknown,
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::ErrorKind::*;

        match *self {
            Adhoc(ref msg) => msg.fmt(f),
            Config(ref err) => err.fmt(f),
            Element(ref err) => err.fmt(f),
            IO(ref err) => err.fmt(f),
            Processor(ref err) => err.fmt(f),
            Step(ref err) => err.fmt(f),
            Tz(ref err) => err.fmt(f),
            Unknown => f.write_str("unknown steptime error"),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error { inner: Some(Arc::new(ErrorInner { kind, cause: None })) }
    }
}

/// A generic error message.
///
/// Only used to support the `Error::from_args` public API.
struct AdhocError {
    message: Box<str>,
}

impl AdhocError {
    fn from_args<'a>(message: core::fmt::Arguments<'a>) -> AdhocError {
        use alloc::string::ToString;

        let message = message.to_string().into_boxed_str();
        AdhocError { message }
    }
}

impl core::fmt::Display for AdhocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.message, f)
    }
}

impl core::fmt::Debug for AdhocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.message, f)
    }
}

/// A `std::io::Error`.
///
/// This type is always available, but can only be constructed when the
/// `std` feature is enabled.
struct IOError {
    #[cfg(feature = "std")]
    err: std::io::Error,
}

impl core::fmt::Display for IOError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        #[cfg(feature = "std")]
        {
            write!(f, "{}", self.err)
        }
        #[cfg(not(feature = "std"))]
        {
            write!(f, "<BUG: SHOULD NOT EXIST>")
        }
    }
}

impl core::fmt::Debug for IOError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        #[cfg(feature = "std")]
        {
            f.debug_struct("IOError").field("err", &self.err).finish()
        }
        #[cfg(not(feature = "std"))]
        {
            write!(f, "<BUG: SHOULD NOT EXIST>")
        }
    }
}

/// A simple trait to encapsulate automatic conversion to `Error`.
///
/// This keeps the structured error enums crate-private while still letting
/// `ErrorContext::with_context` accept any of them.
pub(crate) trait IntoError {
    fn into_error(self) -> Error;
}

impl IntoError for Error {
    #[inline(always)]
    fn into_error(self) -> Error {
        self
    }
}

/// A trait for contextualizing error values.
///
/// This makes it easy to contextualize either `Error` or `Result<T, Error>`
/// without calling `map_err` everywhere.
pub(crate) trait ErrorContext<T, E> {
    /// Contextualize the consequent error returned by the closure with this
    /// (`self`) error as the cause. The closure only runs on failure.
    fn with_context<C: IntoError>(
        self,
        consequent: impl FnOnce() -> C,
    ) -> Result<T, Error>;
}

impl<T, E> ErrorContext<T, E> for Result<T, E>
where
    E: IntoError,
{
    #[inline(always)]
    fn with_context<C: IntoError>(
        self,
        consequent: impl FnOnce() -> C,
    ) -> Result<T, Error> {
        self.map_err(|err| {
            err.into_error().context_impl(consequent().into_error())
        })
    }
}
