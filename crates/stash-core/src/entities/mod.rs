//! Entity structs for stored form submissions.
//!
//! An [`Entry`] maps to one row of the `entries` table. Its properties are a
//! [`Properties`] map whose values are [`PropertyValue`]s, persisted as JSON.

mod entry;
mod properties;
mod value;

pub use entry::Entry;
pub use properties::Properties;
pub use value::{DateDescriptor, PropertyValue, ResourceRef};
