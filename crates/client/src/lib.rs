//! `hrdesk-client`
//!
//! **Responsibility:** the authenticated request pipeline between a UI shell
//! and the HR backend.
//!
//! This crate provides:
//! - a [`Dispatcher`] that performs one HTTP call with an optional bearer token
//! - the [`ReauthInterceptor`], which refreshes the session once on `401` and
//!   replays the request once
//! - a tag-invalidated [`QueryCache`]
//! - the typed operation catalog under [`api`]
//!
//! The backend remains the authority on every business rule; only request
//! shape is validated here.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod dispatcher;
pub mod endpoint;
pub mod error;
pub mod interceptor;
pub mod request;

pub use cache::{CacheKey, Cached, QueryCache, Tag};
pub use client::{ApiClient, HttpApiClient};
pub use config::ClientConfig;
pub use dispatcher::{Dispatcher, HttpDispatcher};
pub use endpoint::{Endpoint, EndpointKind};
pub use error::{ApiError, ErrorKind};
pub use interceptor::{ReauthInterceptor, SessionEvent};
pub use request::{ApiRequest, HttpMethod};
