//! HTTP request handlers.

pub(crate) mod files;
