//! Integration tests and shared test fixtures.
