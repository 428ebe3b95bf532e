//! Parsing and conversion of individual filter rules. Scriptlet rules live in [`scriptlet`],
//! redirect resource rules in [`redirect`].

pub mod redirect;
pub mod scriptlet;
