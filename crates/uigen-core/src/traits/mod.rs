//! Traits at the seams between the preview core and its host runtime.
//!
//! - `store` - minting and releasing ephemeral module references

mod store;

pub use store::EphemeralStore;
