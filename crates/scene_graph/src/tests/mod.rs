//! Cross-module scenario tests

mod scenarios;
