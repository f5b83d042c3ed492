//! Resilient HTTP dispatch.
//!
//! [`HttpCall`] describes one logical outbound request; [`HttpExecutor`]
//! sends it under a [`RetryPolicy`], retrying transient failures and
//! classifying the rest as fatal.

mod call;
mod executor;

pub use call::{CallBody, HttpCall};
pub use executor::{Backoff, HttpExecutor, HttpResponse, RetryPolicy};
