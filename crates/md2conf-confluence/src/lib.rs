//! Confluence Cloud integration for md2conf.
//!
//! - [`ConfluenceClient`]: blocking REST client (v2 API, v1 for uploads and labels)
//! - [`Publisher`]: create/update/delete workflow built on the client
//! - [`PreparedPage`]: a converted document with its attachments

mod auth;
mod client;
mod error;
mod publisher;
mod types;

pub use client::ConfluenceClient;
pub use error::ConfluenceError;
pub use publisher::{
    DeleteResult, DryRunResult, PreparedPage, PublishConfig, PublishError, PublishResult,
    Publisher,
};
pub use types::{Attachment, Links, Page, Property, Space, Version};
