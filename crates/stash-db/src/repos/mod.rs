//! Repository methods on [`crate::service::StashService`].

pub mod entry;
pub mod resource;
