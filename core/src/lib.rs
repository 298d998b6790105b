//! Blocking client for a kanban board service's HTTP API (boards, stacks,
//! cards, labels).
//!
//! # Overview
//! Responses arrive as JSON with camelCase keys. Typed operations pass the
//! decoded body through a two-stage pipeline: [`normalize`] renames every
//! key to underscore form, then a [`Converter`] structures the result into
//! immutable records ([`Board`], [`Stack`], [`Card`], [`Label`], [`User`]).
//! Raw operations return the decoded JSON untouched.
//!
//! # Design
//! - `DeckRequests` builds requests as plain data; `Session` sends them
//!   through a pluggable `Transport` and checks the status in one place.
//! - Each record declares its fields and defaults once, in its `Structure`
//!   impl. Endpoints never parse JSON themselves.
//! - `Converter` is a registry of per-type hooks consulted before the
//!   built-in rules; date-time parsing is registered by default.
//! - No caching, no retries, no pagination: every call is one round trip.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod normalize;
pub mod pipeline;
pub mod requests;
pub mod session;
pub mod structure;
pub mod transport;
pub mod types;

pub use client::DeckClient;
pub use config::DeckConfig;
pub use error::{DeckError, StructureError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use normalize::normalize;
pub use pipeline::{deserialize, deserialized};
pub use requests::{CardAction, DeckRequests};
pub use session::Session;
pub use structure::{parse_datetime, Converter, Fields, Structure};
pub use transport::{Transport, UreqTransport};
pub use types::{
    AclEntry, AclPermissions, AclRuleInput, Board, BoardInput, BoardUpdate, Card, CardInput,
    CardUpdate, Label, LabelInput, Stack, StackInput, User,
};
