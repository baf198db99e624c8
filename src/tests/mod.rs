//! Cross-module test suite
//!
//! Unit tests live next to the code they cover. These exercise the
//! dispatch pipeline end to end: manifests, registry, executor, sequences
//! and the HTTP layer.

mod property_tests;
mod sequence_tests;
mod support;
