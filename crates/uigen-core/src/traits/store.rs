//! Ephemeral reference store trait.
//!
//! The preview core never fetches or serves modules itself. It asks an
//! `EphemeralStore` for a locator per transformed module, writes those
//! locators into the import map, and releases them once a newer build has
//! replaced the bundle that used them.

use crate::{EphemeralRef, Result};
use std::fmt::Debug;

/// Mints and releases single-build module locators.
///
/// # Examples
///
/// ```
/// use uigen_core::traits::EphemeralStore;
/// use uigen_core::{EphemeralRef, Result};
/// use std::collections::HashMap;
///
/// #[derive(Debug, Default)]
/// struct CountingStore {
///     next: usize,
///     live: HashMap<EphemeralRef, String>,
/// }
///
/// impl EphemeralStore for CountingStore {
///     fn mint(&mut self, _module: &str, source: &str) -> Result<EphemeralRef> {
///         self.next += 1;
///         let reference = EphemeralRef::new(format!("mem:{}", self.next));
///         self.live.insert(reference.clone(), source.to_string());
///         Ok(reference)
///     }
///
///     fn release(&mut self, reference: &EphemeralRef) {
///         self.live.remove(reference);
///     }
///
///     fn resolve(&self, reference: &EphemeralRef) -> Option<&str> {
///         self.live.get(reference).map(String::as_str)
///     }
///
///     fn live_count(&self) -> usize {
///         self.live.len()
///     }
/// }
///
/// let mut store = CountingStore::default();
/// let r = store.mint("/App.jsx", "export default 1;").unwrap();
/// assert_eq!(store.resolve(&r), Some("export default 1;"));
/// store.release(&r);
/// assert_eq!(store.live_count(), 0);
/// ```
pub trait EphemeralStore: Debug + Send {
    /// Mints a locator for `source`, which is the executable code of the
    /// module at virtual path `module`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot hold another reference.
    fn mint(&mut self, module: &str, source: &str) -> Result<EphemeralRef>;

    /// Releases a locator minted earlier. Unknown references are ignored.
    fn release(&mut self, reference: &EphemeralRef);

    /// Returns the source behind a live locator.
    fn resolve(&self, reference: &EphemeralRef) -> Option<&str>;

    /// Number of locators currently live.
    fn live_count(&self) -> usize;

    /// Releases every locator in `references`.
    fn release_all<'a, I>(&mut self, references: I)
    where
        I: IntoIterator<Item = &'a EphemeralRef>,
        Self: Sized,
    {
        for reference in references {
            self.release(reference);
        }
    }
}
