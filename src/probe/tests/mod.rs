//! Unit tests for the health prober.
