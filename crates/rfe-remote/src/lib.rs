//! Network transport for rfe.
//!
//! [`HttpRemote`] implements [`rfe_core::RemoteFs`] over the file service's
//! JSON API with reqwest. [`WsWatchTransport`] opens the change-notification
//! WebSocket used by [`rfe_client::start_watch`].

mod http;
mod wire;
mod ws;

pub use http::{HttpRemote, parse_base};
pub use wire::{error_detail, status_error};
pub use ws::{WATCH_ENDPOINT, WsWatchTransport, watch_url};
