//! Client for the banking platform REST API.
//!
//! [`Client`] executes list and retrieve calls over HTTP and decodes the
//! answers with the forward-compatible codec of [`api_types`]. List
//! endpoints are walked with a [`Pager`], which works with any [`Lister`].
//!
//! The client never retries and has no rate limiting: a failed call is
//! reported to the caller, who decides what to do with
//! [`ApiError::is_retryable`].

mod error;
mod http;
pub mod pagination;

pub use api_types;
pub use error::ApiError;
pub use http::{
    CardDisputesPage, CheckTransfersPage, Client, ClientBuilder, Environment, TransactionsPage,
};
pub use pagination::{Lister, PageError, Pager, PagerState};
