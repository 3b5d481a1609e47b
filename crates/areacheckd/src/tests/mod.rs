//! Test suites for the area check service.

mod request_loop;
mod support;
