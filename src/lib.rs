//! `adblock-scriptlets` resolves the scriptlets and redirect resources requested by ad blocking
//! filter rules, assembles the Javascript to inject for them, and converts scriptlet and redirect
//! rules between the AdGuard, uBlock Origin and Adblock Plus syntaxes.
//!
//! See [`engine::Engine`] for the main entry point.

pub mod engine;
pub mod filters;
pub mod lists;
pub mod resources;
#[doc(hidden)]
pub mod utils;

#[doc(inline)]
pub use engine::Engine;
