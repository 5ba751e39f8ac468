//! Shared test utilities for pw-db unit tests.
