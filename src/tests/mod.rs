//! Dispatcher Tests
//!
//! Crate-level tests that exercise the dispatcher through complete server
//! variants and purpose-built hooks.
