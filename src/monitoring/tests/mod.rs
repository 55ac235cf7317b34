//! Unit tests for monitoring passes and controls.

mod trigger_tests;
