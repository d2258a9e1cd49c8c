//! Integration tests for poly-alpha

mod config_test;
mod pipeline_test;
mod scan_test;
