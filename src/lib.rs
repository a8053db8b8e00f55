//! Async client for the KLADR address-lookup API.
//!
//! Builds validated query URLs for the two search modes the service
//! offers, performs a single HTTP GET per call and decodes the JSON body
//! into a generic [`ApiResult`] value. HTTP sits behind the
//! [`HttpTransport`] trait with a `reqwest`-backed default, so the network
//! layer can be swapped or stubbed.
//!
//! Without an API token the client talks to the free tier of the service;
//! with a token it talks to the paid tier and attaches the token to every
//! request.
//!
//! # Examples
//!
//! ## Free-text search
//!
//! ```rust,no_run
//! use kladr_client::{Client, ClientConfig, Page, StringSearchParams};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(None, ClientConfig::default());
//! let params = StringSearchParams {
//!     with_parent: Some(true.into()),
//!     ..Default::default()
//! };
//! let found = client.query_string("тверская", &params, Page::default()).await?;
//! println!("{found}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Field-scoped search
//!
//! ```rust,no_run
//! use kladr_client::{Client, ClientConfig, ContentType, FieldSearchParams, Page};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(Some("my-token"), ClientConfig::default());
//! let params = FieldSearchParams {
//!     content_type: Some(ContentType::City),
//!     ..Default::default()
//! };
//! let found = client.query_field("мос", &params, Page::new(5, 0)).await?;
//! println!("{found}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{Client, ClientConfig, Page, FREE_API_URL, PAID_API_URL};
pub use error::{Error, Result};
pub use models::{
    ApiResult, ContentType, FieldSearchParams, StringSearchParams, TypeCode, WithParent, Zip,
};
pub use transport::{BoxError, HttpResponse, HttpTransport, ReqwestTransport};
