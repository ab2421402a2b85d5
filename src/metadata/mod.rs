mod container;
mod store;

pub use container::MetadataContainer;
pub use store::{InMemoryMetadataStore, MetadataStore, ReadOnlyMetadataStore, new_metadata_id};
