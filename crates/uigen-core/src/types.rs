//! Strong domain types shared across crates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A short-lived locator through which the preview runtime can import a
/// module's transformed source.
///
/// References are minted per build by an
/// [`EphemeralStore`](crate::traits::EphemeralStore) and released when the
/// build is superseded.
///
/// # Examples
///
/// ```
/// use uigen_core::EphemeralRef;
///
/// let reference = EphemeralRef::new("blob:preview/1234");
/// assert_eq!(reference.as_str(), "blob:preview/1234");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EphemeralRef(String);

impl EphemeralRef {
    /// Wraps a locator string.
    #[must_use]
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    /// Returns the locator as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the reference, returning the locator.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for EphemeralRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EphemeralRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
