//! HTTP access to the CRM backend.

mod client;
mod resources;

pub use client::{ApiClient, Method};
pub use resources::{camelize_keys, snake_to_camel, Resource};
