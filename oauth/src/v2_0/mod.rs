//! OAuth 2.0 client and refresh token flow, see
//! [RFC6749](https://datatracker.ietf.org/doc/html/rfc6749).
//!
//! Refreshing a Gmail access token:
//!
//! ```rust,ignore
#![doc = include_str!("../../examples/gmail.rs")]
//! ```

pub mod client;
mod error;
pub mod refresh_access_token;

#[doc(inline)]
pub use self::{
    client::Client,
    error::{Error, Result},
    refresh_access_token::RefreshAccessToken,
};
