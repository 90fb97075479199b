//! Shared test doubles for fleet integration tests.

#![allow(dead_code)]

pub mod fake_remote;
pub mod recorders;
