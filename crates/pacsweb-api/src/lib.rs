//! HTTP client for the pacs ledger REST API
//!
//! [`LedgerApi`] is what the rest of the application depends on;
//! [`HttpClient`] implements it over `reqwest`.

pub mod client;
pub mod context;
pub mod endpoints;
pub mod error;
pub mod ledger;
pub mod login;
pub mod wire;

pub use client::{ClientOptions, HttpClient};
pub use context::fetch_app_context;
pub use error::{ApiError, Result, REQUEST_ERROR_MSG};
pub use ledger::{FeatureToggles, LedgerApi, LedgerApiRef};
pub use login::LoginService;
