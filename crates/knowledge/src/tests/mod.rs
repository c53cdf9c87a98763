//! Cross-module tests and shared test doubles.

pub(crate) mod support;
