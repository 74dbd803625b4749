//! Integration tests for hubquick.

pub mod app_test;
pub mod dispatch_test;
pub mod http_client_test;
pub mod resolution_test;
