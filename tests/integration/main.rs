//! Integration tests for Thread-Tally
//!
//! These tests run complete crawls against wiremock servers.

mod crawl_tests;
mod report_tests;
