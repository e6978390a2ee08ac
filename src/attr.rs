/*!
Layered, read-only configuration for printing and parsing.

Every print and parse call receives an [`AttributeQuery`]. Lookups return
`Option` so that a missing attribute can fall through to a lower layer, and
callers apply the documented default only after every layer has been
consulted.

A step may carry its own *sectional* [`Attributes`]. These take precedence
over the global attributes given to the call. The combination is expressed
by [`MergedAttributes`], or precomputed into a single flat `Attributes` via
[`Attributes::layered_over`].
*/

use alloc::sync::Arc;

use crate::{element::Fields, error::config::Error as E, tz::Registry, Error};

/// How strictly text is matched while parsing, and how strictly widths are
/// enforced while printing.
///
/// The default is [`Leniency::Smart`].
///
/// # Example
///
/// ```
/// use steptime::attr::Leniency;
///
/// let leniency: Leniency = "lax".parse()?;
/// assert!(leniency.is_lax());
/// assert_eq!(Leniency::default(), Leniency::Smart);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Leniency {
    /// Exact widths and exact grammar.
    Strict,
    /// Tolerates surplus padding and unambiguous deviations.
    #[default]
    Smart,
    /// Tolerates everything that can still be interpreted.
    Lax,
}

impl Leniency {
    /// Returns true for [`Leniency::Strict`].
    #[inline]
    pub fn is_strict(self) -> bool {
        matches!(self, Leniency::Strict)
    }

    /// Returns true for [`Leniency::Smart`].
    #[inline]
    pub fn is_smart(self) -> bool {
        matches!(self, Leniency::Smart)
    }

    /// Returns true for [`Leniency::Lax`].
    #[inline]
    pub fn is_lax(self) -> bool {
        matches!(self, Leniency::Lax)
    }

    fn as_str(self) -> &'static str {
        match self {
            Leniency::Strict => "strict",
            Leniency::Smart => "smart",
            Leniency::Lax => "lax",
        }
    }
}

impl core::fmt::Display for Leniency {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Leniency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Leniency, Error> {
        match s {
            "strict" => Ok(Leniency::Strict),
            "smart" => Ok(Leniency::Smart),
            "lax" => Ok(Leniency::Lax),
            _ => Err(Error::from(E::unknown_leniency(s))),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Leniency {
    #[inline]
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Leniency {
    #[inline]
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Leniency, D::Error> {
        use serde::de;

        struct LeniencyVisitor;

        impl<'de> de::Visitor<'de> for LeniencyVisitor {
            type Value = Leniency;

            fn expecting(
                &self,
                f: &mut core::fmt::Formatter,
            ) -> core::fmt::Result {
                f.write_str("one of `strict`, `smart` or `lax`")
            }

            #[inline]
            fn visit_str<E: de::Error>(
                self,
                value: &str,
            ) -> Result<Leniency, E> {
                value.parse().map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(LeniencyVisitor)
    }
}

/// A predicate deciding whether a step prints for a given value.
///
/// Conditions compare equal only when they are the same shared closure.
///
/// # Example
///
/// ```
/// use steptime::{attr::Condition, element::{Element, FieldMap, Fields}};
///
/// let has_seconds = Condition::new(|fields: &dyn Fields| {
///     fields.get(Element::SECOND_OF_MINUTE).is_some()
/// });
/// assert!(!has_seconds.test(&FieldMap::new()));
/// assert_eq!(has_seconds, has_seconds.clone());
/// ```
#[derive(Clone)]
pub struct Condition(Arc<dyn Fn(&dyn Fields) -> bool + Send + Sync>);

impl Condition {
    /// Wraps the given predicate.
    pub fn new(
        predicate: impl Fn(&dyn Fields) -> bool + Send + Sync + 'static,
    ) -> Condition {
        Condition(Arc::new(predicate))
    }

    /// Evaluates this condition against the fields of a value.
    #[inline]
    pub fn test(&self, fields: &dyn Fields) -> bool {
        (self.0)(fields)
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0) as *const ()
    }
}

impl Eq for Condition {}

impl PartialEq for Condition {
    fn eq(&self, rhs: &Condition) -> bool {
        core::ptr::eq(self.addr(), rhs.addr())
    }
}

impl core::hash::Hash for Condition {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl core::fmt::Debug for Condition {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "Condition({:p})", self.addr())
    }
}

/// Typed, read-only lookup of formatting attributes.
///
/// Each getter returns `None` when the attribute isn't set at this layer.
pub trait AttributeQuery {
    /// The leniency. Defaults to [`Leniency::Smart`].
    fn get_leniency(&self) -> Option<Leniency>;

    /// The pad character. Defaults to a space.
    fn get_pad_char(&self) -> Option<char>;

    /// The decimal separator used before fractions. Defaults to `.`.
    fn get_decimal_separator(&self) -> Option<char>;

    /// The registry of time zone identifiers consulted when parsing.
    /// Without one, no identifier resolves.
    fn get_registry(&self) -> Option<&Registry>;

    /// The condition a step must satisfy in order to print.
    fn get_condition(&self) -> Option<&Condition>;
}

/// Returns the effective leniency, applying the default.
#[inline]
pub(crate) fn leniency(attrs: &dyn AttributeQuery) -> Leniency {
    attrs.get_leniency().unwrap_or_default()
}

/// Returns the effective pad character, applying the default.
#[inline]
pub(crate) fn pad_char(attrs: &dyn AttributeQuery) -> char {
    attrs.get_pad_char().unwrap_or(' ')
}

/// Returns the effective decimal separator, applying the default.
#[inline]
pub(crate) fn decimal_separator(attrs: &dyn AttributeQuery) -> char {
    attrs.get_decimal_separator().unwrap_or('.')
}

/// A flat set of formatting attributes.
///
/// Attributes are built by value. Unset attributes fall through to
/// whatever layer sits below them.
///
/// # Example
///
/// ```
/// use steptime::{
///     attr::{AttributeQuery, Attributes, Leniency},
///     tz::Registry,
/// };
///
/// let global = Attributes::new()
///     .leniency(Leniency::Lax)
///     .registry(Registry::new(["Europe/Berlin"]));
/// let section = Attributes::new().pad_char('0');
///
/// let full = section.layered_over(&global);
/// assert_eq!(full.get_pad_char(), Some('0'));
/// assert_eq!(full.get_leniency(), Some(Leniency::Lax));
/// assert!(full.get_registry().is_some());
/// ```
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Attributes {
    leniency: Option<Leniency>,
    pad_char: Option<char>,
    decimal_separator: Option<char>,
    registry: Option<Registry>,
    condition: Option<Condition>,
}

impl Attributes {
    /// Creates an empty set of attributes.
    pub fn new() -> Attributes {
        Attributes::default()
    }

    /// Sets the leniency.
    pub fn leniency(self, leniency: Leniency) -> Attributes {
        Attributes { leniency: Some(leniency), ..self }
    }

    /// Sets the pad character.
    pub fn pad_char(self, ch: char) -> Attributes {
        Attributes { pad_char: Some(ch), ..self }
    }

    /// Sets the decimal separator.
    pub fn decimal_separator(self, ch: char) -> Attributes {
        Attributes { decimal_separator: Some(ch), ..self }
    }

    /// Sets the registry of time zone identifiers.
    pub fn registry(self, registry: Registry) -> Attributes {
        Attributes { registry: Some(registry), ..self }
    }

    /// Sets the print condition.
    ///
    /// This is only meaningful on the sectional attributes of a step.
    pub fn condition(self, condition: Condition) -> Attributes {
        Attributes { condition: Some(condition), ..self }
    }

    /// Returns a flat copy of these attributes where every unset attribute
    /// is taken from `base`.
    pub fn layered_over(&self, base: &dyn AttributeQuery) -> Attributes {
        Attributes {
            leniency: self.leniency.or_else(|| base.get_leniency()),
            pad_char: self.pad_char.or_else(|| base.get_pad_char()),
            decimal_separator: self
                .decimal_separator
                .or_else(|| base.get_decimal_separator()),
            registry: self
                .registry
                .clone()
                .or_else(|| base.get_registry().cloned()),
            condition: self
                .condition
                .clone()
                .or_else(|| base.get_condition().cloned()),
        }
    }
}

impl AttributeQuery for Attributes {
    fn get_leniency(&self) -> Option<Leniency> {
        self.leniency
    }

    fn get_pad_char(&self) -> Option<char> {
        self.pad_char
    }

    fn get_decimal_separator(&self) -> Option<char> {
        self.decimal_separator
    }

    fn get_registry(&self) -> Option<&Registry> {
        self.registry.as_ref()
    }

    fn get_condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }
}

/// Sectional attributes layered over global attributes without copying.
#[derive(Clone, Copy)]
pub struct MergedAttributes<'a> {
    sectional: &'a Attributes,
    global: &'a dyn AttributeQuery,
}

impl<'a> MergedAttributes<'a> {
    /// Layers `sectional` over `global`.
    pub fn new(
        sectional: &'a Attributes,
        global: &'a dyn AttributeQuery,
    ) -> MergedAttributes<'a> {
        MergedAttributes { sectional, global }
    }
}

impl<'a> AttributeQuery for MergedAttributes<'a> {
    fn get_leniency(&self) -> Option<Leniency> {
        self.sectional.leniency.or_else(|| self.global.get_leniency())
    }

    fn get_pad_char(&self) -> Option<char> {
        self.sectional.pad_char.or_else(|| self.global.get_pad_char())
    }

    fn get_decimal_separator(&self) -> Option<char> {
        self.sectional
            .decimal_separator
            .or_else(|| self.global.get_decimal_separator())
    }

    fn get_registry(&self) -> Option<&Registry> {
        self.sectional.registry.as_ref().or_else(|| self.global.get_registry())
    }

    fn get_condition(&self) -> Option<&Condition> {
        self.sectional
            .condition
            .as_ref()
            .or_else(|| self.global.get_condition())
    }
}

impl<'a> core::fmt::Debug for MergedAttributes<'a> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("MergedAttributes")
            .field("sectional", self.sectional)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_after_all_layers() {
        let empty = Attributes::new();
        assert_eq!(leniency(&empty), Leniency::Smart);
        assert_eq!(pad_char(&empty), ' ');
        assert_eq!(decimal_separator(&empty), '.');
        assert!(empty.get_registry().is_none());
    }

    #[test]
    fn sectional_overrides_global() {
        let global = Attributes::new().leniency(Leniency::Lax).pad_char('*');
        let sectional = Attributes::new().leniency(Leniency::Strict);
        let merged = MergedAttributes::new(&sectional, &global);
        assert_eq!(merged.get_leniency(), Some(Leniency::Strict));
        assert_eq!(merged.get_pad_char(), Some('*'));
        assert_eq!(merged.get_decimal_separator(), None);
        assert_eq!(sectional.layered_over(&global), Attributes::new()
            .leniency(Leniency::Strict)
            .pad_char('*'));
    }

    #[test]
    fn leniency_parse() {
        assert_eq!("strict".parse::<Leniency>().unwrap(), Leniency::Strict);
        let err = "STRICT".parse::<Leniency>().unwrap_err();
        assert!(err.is_invalid_configuration());
        insta::assert_snapshot!(
            err,
            @r###"unrecognized leniency "STRICT" (expected one of `strict`, `smart` or `lax`)"###,
        );
    }

    #[test]
    fn condition_identity() {
        let a = Condition::new(|_| true);
        let b = Condition::new(|_| true);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_ne!(
            Attributes::new().condition(a.clone()),
            Attributes::new().condition(b),
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn leniency_serde() {
        let json = serde_json::to_string(&Leniency::Lax).unwrap();
        assert_eq!(json, r#""lax""#);
        let got: Leniency = serde_json::from_str(r#""strict""#).unwrap();
        assert_eq!(got, Leniency::Strict);
        assert!(serde_json::from_str::<Leniency>(r#""loose""#).is_err());
    }
}
