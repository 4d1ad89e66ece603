//! # yeti-error
//!
//! Structured errors that carry classification metadata, plus helpers for
//! raising them and for wrapping foreign failures.
//!
//! ## Design Philosophy
//!
//! - **Origin**: Know which component produced the error
//! - **Details**: Ordered key/value context, rendered into the message
//! - **Transience**: Record whether a retry may succeed; the caller decides
//! - **Status**: Carry the HTTP-style code a protocol layer should answer with
//! - **Cause**: Wrap foreign failures without losing where they happened
//!
//! ## Usage
//!
//! ```rust
//! use yeti_error::{details, BaseError, Helpers, Result};
//!
//! struct Ledger;
//!
//! impl Helpers for Ledger {}
//!
//! impl Ledger {
//!     fn post(&self, amount: i64) -> Result<i64> {
//!         if amount < 0 {
//!             return self.errors().raise_with(
//!                 BaseError,
//!                 details! { "msg" => "negative amount", "amount" => amount },
//!                 (false, 422u16),
//!             );
//!         }
//!         Ok(amount)
//!     }
//! }
//!
//! let err = Ledger.post(-5).unwrap_err();
//! assert_eq!(err.message(), r#"msg="negative amount" amount=-5"#);
//! assert_eq!(err.status(), 422);
//! assert!(!err.is_transient());
//! ```
//!
//! ## Principles
//!
//! - Errors are immutable once constructed
//! - The message is derived from the details, never set on its own
//! - Foreign failures are wrapped with `wrap`, keeping their trace

mod details;
mod error;
mod helpers;
mod origin;
mod variant;

pub use details::{Details, DetailsError, MSG_KEY};
pub use error::Error;
pub use helpers::{ErrorFactory, Helpers, WrapErr};
pub use origin::Origin;
pub use variant::{BaseError, ClientError, FinalError, Overrides, StatusOverride, Variant};

/// Result type alias using yeti Error
pub type Result<T> = std::result::Result<T, Error>;
