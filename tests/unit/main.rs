//! Unit tests for individual components

mod catalog_test;
mod cli_test;
mod config_test;
mod error_test;
mod record_test;
mod report_test;
mod sink_test;
