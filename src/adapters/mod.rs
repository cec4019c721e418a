// Adapters layer: concrete implementations of the domain ports.

pub mod contentful;

pub use contentful::ContentfulClient;
