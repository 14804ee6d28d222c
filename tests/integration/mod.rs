//! Integration Tests Module
//!
//! Drives the analysis pipeline end to end with scripted providers and the
//! in-memory and SQLite stores.

// Scripted chat provider shared by the tests below
mod support;

// Pipeline caching, single-flight and fallback behavior
mod pipeline_test;

// Premium/free merge and per-half fallback
mod assembler_test;

// Response sanitizer properties on realistic completions
mod sanitizer_test;

// SQLite store and config file round trips
mod storage_test;
