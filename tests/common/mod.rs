//! Shared test infrastructure for the integration suite.

// Not every test binary touches every fixture field.
#![allow(dead_code)]

pub mod fixtures;

pub use fixtures::*;
