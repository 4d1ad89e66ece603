//! Raising and wrapping errors on behalf of a component
//!
//! An [`ErrorFactory`] is closed over the [`Origin`] of the component that
//! owns it, so every error it produces names that component. Components
//! obtain one through [`Helpers`], on the type (`Self::error_factory()`) or on
//! an instance (`self.errors()`), or build one at initialization and keep it.

use crate::{Details, Error, Origin, Result, Variant};
use std::any::TypeId;
use std::panic::Location;

/// Constructs and signals errors originating in one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorFactory {
    origin: Origin,
}

impl ErrorFactory {
    pub fn new(origin: Origin) -> Self {
        Self { origin }
    }

    /// Factory for errors originating in the type `T`
    pub fn for_type<T: ?Sized + 'static>() -> Self {
        Self::new(Origin::of::<T>())
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Construct an error without signaling it
    pub fn build<V: Variant>(
        &self,
        _variant: V,
        details: impl Into<Details>,
        options: impl Into<V::Options>,
    ) -> Error {
        Error::of::<V>(self.origin.clone(), details, options)
    }

    /// Construct an error wrapping `original` without signaling it.
    ///
    /// The details get `msg` set to the original's description, replacing
    /// any `msg` already present. The original becomes the cause and the
    /// source of the error's location and backtrace. An original that is
    /// neither an `anyhow::Error` nor a yeti [`Error`] is converted here, so
    /// its backtrace would be this call's and is not reported.
    pub fn wrapped<V: Variant, E>(
        &self,
        original: E,
        variant: V,
        details: impl Into<Details>,
        options: impl Into<V::Options>,
    ) -> Error
    where
        E: Into<anyhow::Error> + 'static,
    {
        let (cause, keeps_backtrace) = into_cause(original);
        self.wrap_cause(cause, keeps_backtrace, variant, details, options)
    }

    fn wrap_cause<V: Variant>(
        &self,
        cause: anyhow::Error,
        keeps_backtrace: bool,
        variant: V,
        details: impl Into<Details>,
        options: impl Into<V::Options>,
    ) -> Error {
        let mut details = details.into();
        details.set_message(cause.to_string());
        self.build(variant, details, options)
            .caused_by(cause, keeps_backtrace)
    }

    /// Construct an error with the variant's default options and signal it
    #[track_caller]
    pub fn raise<V: Variant, T>(&self, variant: V, details: impl Into<Details>) -> Result<T> {
        self.raise_with(variant, details, V::Options::default())
    }

    /// Construct an error and signal it
    #[track_caller]
    pub fn raise_with<V: Variant, T>(
        &self,
        variant: V,
        details: impl Into<Details>,
        options: impl Into<V::Options>,
    ) -> Result<T> {
        let error = self
            .build(variant, details, options)
            .raised_at(Location::caller());
        tracing::debug!(
            origin = %error.origin(),
            variant = error.variant(),
            status = error.status(),
            transient = error.is_transient(),
            "raising error: {}",
            error.message()
        );
        Err(error)
    }

    /// Wrap `original` with the variant's default options and signal it
    pub fn wrap<V: Variant, E, T>(
        &self,
        original: E,
        variant: V,
        details: impl Into<Details>,
    ) -> Result<T>
    where
        E: Into<anyhow::Error> + 'static,
    {
        self.wrap_with(original, variant, details, V::Options::default())
    }

    /// Wrap `original` and signal it
    pub fn wrap_with<V: Variant, E, T>(
        &self,
        original: E,
        variant: V,
        details: impl Into<Details>,
        options: impl Into<V::Options>,
    ) -> Result<T>
    where
        E: Into<anyhow::Error> + 'static,
    {
        let (cause, keeps_backtrace) = into_cause(original);
        tracing::debug!(
            origin = %self.origin,
            variant = V::NAME,
            cause = %cause,
            "wrapping error"
        );
        Err(self.wrap_cause(cause, keeps_backtrace, variant, details, options))
    }
}

/// Convert `original` into a cause, telling whether its backtrace predates
/// the conversion. Only an `anyhow::Error` arrives with one already; a yeti
/// [`Error`] keeps its own trace through downcasting.
fn into_cause<E>(original: E) -> (anyhow::Error, bool)
where
    E: Into<anyhow::Error> + 'static,
{
    let keeps_backtrace = TypeId::of::<E>() == TypeId::of::<anyhow::Error>();
    (original.into(), keeps_backtrace)
}

/// Attach raise/wrap capabilities to a component.
///
/// ```rust
/// use yeti_error::{details, ClientError, Helpers, Result};
///
/// struct Invoices;
///
/// impl Helpers for Invoices {}
///
/// impl Invoices {
///     fn load(&self, id: Option<u64>) -> Result<u64> {
///         match id {
///             Some(id) => Ok(id),
///             None => self.errors().raise(ClientError, details! { "msg" => "id is missing" }),
///         }
///     }
/// }
///
/// let err = Invoices.load(None).unwrap_err();
/// assert!(err.origin().is::<Invoices>());
/// assert_eq!(err.status(), 400);
/// ```
pub trait Helpers: 'static {
    /// Factory for errors originating in this type
    fn error_factory() -> ErrorFactory
    where
        Self: Sized,
    {
        ErrorFactory::for_type::<Self>()
    }

    /// Factory for errors originating in this instance's type
    fn errors(&self) -> ErrorFactory
    where
        Self: Sized,
    {
        Self::error_factory()
    }
}

/// Wrap the error of a `Result` into a structured error.
pub trait WrapErr<T> {
    fn wrap_err<V: Variant>(
        self,
        factory: &ErrorFactory,
        variant: V,
        details: impl Into<Details>,
    ) -> Result<T>;
}

impl<T, E> WrapErr<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error> + 'static,
{
    fn wrap_err<V: Variant>(
        self,
        factory: &ErrorFactory,
        variant: V,
        details: impl Into<Details>,
    ) -> Result<T> {
        self.or_else(|err| factory.wrap(err, variant, details))
    }
}
