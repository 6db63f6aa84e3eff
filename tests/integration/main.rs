//! Gatekeeper integration tests.

mod flow_test;
mod helpers;
mod reload_test;
