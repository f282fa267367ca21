//! Integration tests for `CaptureCore`
//!
//! This crate contains integration tests that drive the capturecore lifecycle
//! against the in-memory host from capturecore-memory, checking resource
//! balance across whole event sequences.

// This is a test-only crate
#![cfg(test)]
