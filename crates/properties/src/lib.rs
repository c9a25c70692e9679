//! `rentaldesk-properties`: property listings and their ownership-gated store.

pub mod payload;
pub mod property;
pub mod query;
pub mod repository;

pub use payload::{NewProperty, PropertyPatch};
pub use property::{PropertyRecord, PropertyStatus, PropertyType};
pub use query::{EnumFilter, ListQuery, Page, PageRequest, RawListQuery, SortField, SortOrder, SortSpec};
pub use repository::PropertyRepository;
