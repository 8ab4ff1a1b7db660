//! Property-based tests for the IR data model.
