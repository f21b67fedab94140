//! Articles and projects shown on the public site.
//!
//! Both kinds share one table layout, one set of handlers and the tag tables.
//! The router tells the handlers which kind a request is for.

mod core;
mod db;
mod endpoints;

pub use core::{Content, ContentForm, ContentKind, ContentStatus, ContentSummary};
pub use db::{
    create_content, create_content_tables, get_active_content, get_content, get_related_content,
};
pub use endpoints::{
    DEFAULT_LIST_LIMIT, ListQuery, create_content_endpoint,
    delete_content_endpoint, get_content_endpoint, get_content_list_endpoint,
    select_content_endpoint, update_content_endpoint,
};
