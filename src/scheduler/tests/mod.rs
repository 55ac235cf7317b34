//! Unit tests for background task registration.
