//! HTTP-level tests over in-memory stores.

mod helpers;

mod account_test;
mod admin_test;
mod auth_test;
mod middleware_test;
