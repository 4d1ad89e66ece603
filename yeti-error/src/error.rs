//! The structured Error type

use crate::variant::{self, BaseError, ClientError, FinalError, Variant};
use crate::{Details, Origin};
use std::any::TypeId;
use std::backtrace::Backtrace;
use std::fmt;
use std::panic::Location;

/// A structured, immutable error.
///
/// Every error carries:
/// - `origin`: the component in which it was constructed
/// - `details`: ordered key/value pairs describing the circumstances
/// - `transient`: whether the operation may succeed if retried
/// - `status`: the corresponding HTTP-style status code
/// - `message`: `key=<json>` pairs rendered once from the details
///
/// # Example
///
/// ```rust
/// use yeti_error::{details, Error, Origin};
///
/// let err = Error::new(Origin::named("billing"), details! { "a" => "x", "b" => 2 });
///
/// assert_eq!(err.message(), r#"a="x" b=2"#);
/// assert!(err.is_transient());
/// assert_eq!(err.status(), 500);
/// ```
pub struct Error {
    origin: Origin,
    variant: &'static str,
    variant_id: TypeId,
    details: Details,
    transient: bool,
    status: u16,
    message: String,
    location: Option<&'static Location<'static>>,
    backtrace: Option<Backtrace>,
    cause: Option<anyhow::Error>,
    // false when the cause's backtrace was captured while wrapping it
    cause_backtrace: bool,
}

impl Error {
    /// Create an error of variant `V`.
    ///
    /// If `V` defines a default message and `details` has no `msg` entry,
    /// the default is merged in before the message is rendered.
    pub fn of<V: Variant>(
        origin: Origin,
        details: impl Into<Details>,
        options: impl Into<V::Options>,
    ) -> Self {
        let mut details = details.into();
        if let Some(message) = V::default_message() {
            details.fill_message(message);
        }
        let (transient, status) = variant::resolve::<V>(options.into());
        let message = details.render();

        Self {
            origin,
            variant: V::NAME,
            variant_id: TypeId::of::<V>(),
            details,
            transient,
            status,
            message,
            location: None,
            backtrace: None,
            cause: None,
            cause_backtrace: false,
        }
    }

    /// Create a base error: transient, status 500
    pub fn new(origin: Origin, details: impl Into<Details>) -> Self {
        Self::of::<BaseError>(origin, details, variant::Overrides::new())
    }

    /// Create a client error: not transient, status 400
    pub fn client(origin: Origin, details: impl Into<Details>) -> Self {
        Self::of::<ClientError>(origin, details, variant::StatusOverride::new())
    }

    /// Create a final error: not transient, status 500
    pub fn final_error(origin: Origin, details: impl Into<Details>) -> Self {
        Self::of::<FinalError>(origin, details, variant::StatusOverride::new())
    }

    // =========================================================================
    // Getters
    // =========================================================================

    /// The component in which the error was constructed
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// The final details, after any default message was merged in
    pub fn details(&self) -> &Details {
        &self.details
    }

    /// Whether the error may succeed if retried later
    pub fn is_transient(&self) -> bool {
        self.transient
    }

    /// Whether retrying will not help
    pub fn is_final(&self) -> bool {
        !self.transient
    }

    /// The HTTP-style status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The message rendered from the details
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Name of the variant this error was constructed as
    pub fn variant(&self) -> &'static str {
        self.variant
    }

    /// Check whether this error was constructed as variant `V`
    pub fn is<V: Variant>(&self) -> bool {
        self.variant_id == TypeId::of::<V>()
    }

    /// The wrapped failure (if any)
    pub fn cause(&self) -> Option<&anyhow::Error> {
        self.cause.as_ref()
    }

    /// Where the failure occurred.
    ///
    /// For a wrapped error this is the location of the original failure,
    /// which is only known when the original is itself a yeti error.
    pub fn location(&self) -> Option<&'static Location<'static>> {
        match &self.cause {
            Some(cause) => cause.downcast_ref::<Error>().and_then(Error::location),
            None => self.location,
        }
    }

    /// The backtrace of the failure.
    ///
    /// For a wrapped error this is the original failure's backtrace: the one
    /// of a wrapped yeti error, or of an `anyhow::Error` handed to the wrap
    /// as is. Any other foreign failure had no backtrace before it was
    /// wrapped, so there is none to report. Whether frames are actually
    /// captured follows `RUST_BACKTRACE` and `RUST_LIB_BACKTRACE`.
    pub fn backtrace(&self) -> Option<&Backtrace> {
        match &self.cause {
            Some(cause) => match cause.downcast_ref::<Error>() {
                Some(original) => original.backtrace(),
                None if self.cause_backtrace => Some(cause.backtrace()),
                None => None,
            },
            None => self.backtrace.as_ref(),
        }
    }

    // =========================================================================
    // Signaling
    // =========================================================================

    /// Signal this error to the caller.
    ///
    /// Records the caller's location and a backtrace unless the error
    /// already carries a trace.
    #[track_caller]
    pub fn raise<T>(self) -> Result<T, Error> {
        Err(self.raised_at(Location::caller()))
    }

    pub(crate) fn raised_at(mut self, location: &'static Location<'static>) -> Self {
        if self.cause.is_none() && self.location.is_none() {
            self.location = Some(location);
            self.backtrace = Some(Backtrace::capture());
        }
        self
    }

    /// Attach the original failure; its trace replaces this error's own.
    ///
    /// `keeps_backtrace` tells whether the cause's backtrace predates the
    /// wrap, rather than having been captured by converting it.
    pub(crate) fn caused_by(mut self, cause: anyhow::Error, keeps_backtrace: bool) -> Self {
        debug_assert!(self.cause.is_none(), "cause already set");
        self.cause = Some(cause);
        self.cause_backtrace = keeps_backtrace;
        self.location = None;
        self.backtrace = None;
        self
    }
}

// =============================================================================
// Display - the rendered message
// =============================================================================

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

// =============================================================================
// Debug - verbose, multi-line format for debugging
// =============================================================================

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let transience = if self.transient { "transient" } else { "final" };
        writeln!(
            f,
            "{} ({}, {}) at {}",
            self.variant, self.status, transience, self.origin
        )?;

        if !self.message.is_empty() {
            writeln!(f)?;
            writeln!(f, "    Message: {}", self.message)?;
        }

        if let Some(location) = self.location() {
            writeln!(f)?;
            writeln!(f, "    Location: {}", location)?;
        }

        if let Some(cause) = &self.cause {
            writeln!(f)?;
            writeln!(f, "    Cause: {:?}", cause)?;
        }

        Ok(())
    }
}

// =============================================================================
// std::error::Error implementation
// =============================================================================

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| &**e as &(dyn std::error::Error + 'static))
    }
}

/// Errors compare by origin, details, transience, status and message.
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.origin == other.origin
            && self.details == other.details
            && self.transient == other.transient
            && self.status == other.status
            && self.message == other.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::{Overrides, StatusOverride};
    use crate::details;
    use serde_json::json;

    struct Boom;

    impl Variant for Boom {
        const NAME: &'static str = "Boom";
        type Options = Overrides;

        fn default_message() -> Option<String> {
            Some("BOOM!".to_string())
        }
    }

    fn origin() -> Origin {
        Origin::named("test")
    }

    fn here_are_some() -> Details {
        details! { "here" => "are", "some" => "details" }
    }

    #[test]
    fn test_sets_attributes() {
        let err = Error::of::<BaseError>(origin(), here_are_some(), (false, 418u16));
        assert_eq!(err.origin(), &origin());
        assert_eq!(err.details(), &here_are_some());
        assert!(!err.is_transient());
        assert!(err.is_final());
        assert_eq!(err.status(), 418);
    }

    #[test]
    fn test_sets_message() {
        let err = Error::new(origin(), here_are_some());
        assert_eq!(err.message(), r#"here="are" some="details""#);
        assert_eq!(err.to_string(), err.message());

        let err = Error::new(origin(), details! { "a" => "x", "b" => 2 });
        assert_eq!(err.message(), r#"a="x" b=2"#);
    }

    #[test]
    fn test_base_defaults() {
        let err = Error::new(origin(), here_are_some());
        assert!(err.is_transient());
        assert_eq!(err.status(), 500);
        assert!(err.is::<BaseError>());
        assert_eq!(err.variant(), "Error");

        let err = Error::of::<BaseError>(origin(), here_are_some(), false);
        assert!(!err.is_transient());
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn test_client_error() {
        let err = Error::client(origin(), here_are_some());
        assert!(!err.is_transient());
        assert_eq!(err.status(), 400);
        assert!(err.is::<ClientError>());
        assert_eq!(err.details(), &here_are_some());

        let err = Error::of::<ClientError>(origin(), here_are_some(), 418u16);
        assert!(!err.is_transient());
        assert_eq!(err.status(), 418);
    }

    #[test]
    fn test_final_error() {
        let err = Error::final_error(origin(), here_are_some());
        assert!(!err.is_transient());
        assert_eq!(err.status(), 500);
        assert!(err.is::<FinalError>());
        assert!(!err.is::<ClientError>());

        let err = Error::of::<FinalError>(origin(), here_are_some(), StatusOverride::new().status(503));
        assert_eq!(err.status(), 503);
    }

    #[test]
    fn test_default_message_merged() {
        let err = Error::of::<Boom>(origin(), here_are_some(), Overrides::new());
        assert_eq!(
            err.details(),
            &here_are_some().with("msg", "BOOM!")
        );
        assert_eq!(err.message(), r#"msg="BOOM!" here="are" some="details""#);
    }

    #[test]
    fn test_default_message_keeps_explicit_msg() {
        let details = here_are_some().with("msg", "keep me");
        let err = Error::of::<Boom>(origin(), details.clone(), Overrides::new());
        assert_eq!(err.details(), &details);
        assert_eq!(err.details().get("msg"), Some(&json!("keep me")));
    }

    #[test]
    fn test_equality_over_core_fields() {
        let a = Error::new(origin(), here_are_some());
        let b = Error::new(origin(), here_are_some());
        assert_eq!(a, b);

        let c = Error::of::<BaseError>(origin(), here_are_some(), Overrides::new().status(503));
        assert_ne!(a, c);

        let d = Error::new(Origin::named("other"), here_are_some());
        assert_ne!(a, d);
    }

    #[test]
    fn test_repeated_reads() {
        let err = Error::new(origin(), here_are_some());
        assert_eq!(err.message(), err.message());
        assert_eq!(err.details(), err.details());
        assert_eq!(err.status(), err.status());
        assert_eq!(err.is_transient(), err.is_transient());
        assert_eq!(err.origin(), err.origin());
    }

    #[test]
    fn test_construction_records_no_trace() {
        let err = Error::new(origin(), here_are_some());
        assert!(err.location().is_none());
        assert!(err.backtrace().is_none());
        assert!(err.cause().is_none());
    }

    #[test]
    fn test_raise_records_location() {
        let expected_line = line!() + 1;
        let result: Result<(), Error> = Error::new(origin(), here_are_some()).raise();
        let err = result.unwrap_err();

        let location = err.location().unwrap();
        assert_eq!(location.file(), file!());
        assert_eq!(location.line(), expected_line);
        assert!(err.backtrace().is_some());
    }

    #[test]
    fn test_raise_keeps_first_location() {
        let first: Result<(), Error> = Error::new(origin(), here_are_some()).raise();
        let err = first.unwrap_err();
        let location = err.location().unwrap();

        let second: Result<(), Error> = err.raise();
        assert_eq!(second.unwrap_err().location(), Some(location));
    }

    #[test]
    fn test_cause_becomes_source() {
        let err = Error::new(origin(), here_are_some())
            .caused_by(anyhow::anyhow!("OOPS!"), true);
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "OOPS!");
    }

    #[test]
    fn test_debug_report() {
        let err = Error::client(origin(), here_are_some());
        let debug = format!("{:?}", err);
        assert!(debug.contains("ClientError (400, final) at test"));
        assert!(debug.contains(r#"Message: here="are" some="details""#));
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<Error>();
    }
}
