//! Error variants and their construction options

/// Per-call overrides for an error's transience and status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    pub transient: Option<bool>,
    pub status: Option<u16>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether the error may succeed if retried
    pub fn transient(mut self, transient: bool) -> Self {
        self.transient = Some(transient);
        self
    }

    /// Set the protocol (HTTP-style) status code
    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

impl From<(bool, u16)> for Overrides {
    fn from((transient, status): (bool, u16)) -> Self {
        Self {
            transient: Some(transient),
            status: Some(status),
        }
    }
}

impl From<u16> for Overrides {
    fn from(status: u16) -> Self {
        Self::new().status(status)
    }
}

impl From<bool> for Overrides {
    fn from(transient: bool) -> Self {
        Self::new().transient(transient)
    }
}

/// Status-only override for variants whose transience is fixed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusOverride {
    pub status: Option<u16>,
}

impl StatusOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

impl From<u16> for StatusOverride {
    fn from(status: u16) -> Self {
        Self::new().status(status)
    }
}

impl From<StatusOverride> for Overrides {
    fn from(status: StatusOverride) -> Self {
        Self {
            transient: None,
            status: status.status,
        }
    }
}

/// A kind of structured error.
///
/// Variants are marker types. They decide the defaults applied when an
/// [`Error`](crate::Error) is constructed, which options a caller may pass,
/// and optionally a default message merged into the details under `msg`.
///
/// ```rust
/// use yeti_error::{details, Error, Origin, Overrides, Variant};
///
/// struct Timeout;
///
/// impl Variant for Timeout {
///     const NAME: &'static str = "Timeout";
///     const STATUS: u16 = 504;
///     type Options = Overrides;
///
///     fn default_message() -> Option<String> {
///         Some("upstream timed out".to_string())
///     }
/// }
///
/// let err = Error::of::<Timeout>(Origin::named("gateway"), details! { "ms" => 3000 }, Overrides::new());
/// assert_eq!(err.message(), r#"msg="upstream timed out" ms=3000"#);
/// assert_eq!(err.status(), 504);
/// assert!(err.is_transient());
/// ```
pub trait Variant: 'static {
    /// Name recorded on constructed errors
    const NAME: &'static str;

    /// Transience applied when the options leave it unset
    const TRANSIENT: bool = true;

    /// Status applied when the options leave it unset
    const STATUS: u16 = 500;

    /// Options accepted at construction
    type Options: Default + Into<Overrides>;

    /// Message merged into the details when they carry no `msg`
    fn default_message() -> Option<String> {
        None
    }
}

/// The base error: transient unless told otherwise, status 500.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BaseError;

impl Variant for BaseError {
    const NAME: &'static str = "Error";
    type Options = Overrides;
}

/// An invalid request from a client. Never transient, status 400 by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientError;

impl Variant for ClientError {
    const NAME: &'static str = "ClientError";
    const TRANSIENT: bool = false;
    const STATUS: u16 = 400;
    type Options = StatusOverride;
}

/// A final error that should not be retried. Status 500 by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FinalError;

impl Variant for FinalError {
    const NAME: &'static str = "FinalError";
    const TRANSIENT: bool = false;
    type Options = StatusOverride;
}

/// Resolve a variant's transience and status for the given options
pub(crate) fn resolve<V: Variant>(options: V::Options) -> (bool, u16) {
    let Overrides { transient, status } = options.into();
    (
        transient.unwrap_or(V::TRANSIENT),
        status.unwrap_or(V::STATUS),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_defaults() {
        assert_eq!(resolve::<BaseError>(Overrides::new()), (true, 500));
        assert_eq!(resolve::<BaseError>((false, 418u16).into()), (false, 418));
        assert_eq!(resolve::<BaseError>(false.into()), (false, 500));
        assert_eq!(resolve::<BaseError>(Overrides::new().status(503)), (true, 503));
        assert_eq!(resolve::<BaseError>(503u16.into()), (true, 503));
    }

    #[test]
    fn test_fixed_transience() {
        assert_eq!(resolve::<ClientError>(StatusOverride::new()), (false, 400));
        assert_eq!(resolve::<ClientError>(418u16.into()), (false, 418));
        assert_eq!(resolve::<FinalError>(StatusOverride::new()), (false, 500));
        assert_eq!(resolve::<FinalError>(StatusOverride::new().status(502)), (false, 502));
    }

    #[test]
    fn test_names() {
        assert_eq!(BaseError::NAME, "Error");
        assert_eq!(ClientError::NAME, "ClientError");
        assert_eq!(FinalError::NAME, "FinalError");
        assert!(BaseError::default_message().is_none());
    }
}
