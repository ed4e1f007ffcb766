//! Confluence API types.

mod attachment;
mod page;
mod property;
mod space;

pub use attachment::{Attachment, AttachmentsResponse};
pub use page::{Links, Page, PagesResponse, Version};
pub use property::{PropertiesResponse, Property};
pub use space::{Space, SpacesResponse};

pub(crate) use page::{BodyWrite, CreatePageRequest, UpdatePageRequest, VersionWrite};
pub(crate) use property::{CreatePropertyRequest, UpdatePropertyRequest};
