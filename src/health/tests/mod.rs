//! Unit tests for health tracking.

mod state_tests;
