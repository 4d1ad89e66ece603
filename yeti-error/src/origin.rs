//! Identity of the component that produced an error

use std::any::type_name;
use std::borrow::Cow;
use std::fmt;

/// The component (type or module) in which an error was constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Origin(Cow<'static, str>);

impl Origin {
    /// Origin for the type `T`, named by its fully qualified type name
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self(Cow::Borrowed(type_name::<T>()))
    }

    /// Origin with an explicit identifier
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Check whether this origin names the type `T`
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.0 == type_name::<T>()
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
