//! Collaborator interfaces the core consumes.
//!
//! The classifier and ranking never do I/O; they take whatever these traits
//! produced. [`crate::infra::portal::PortalClient`] implements both over REST.

pub mod forms_api;
pub mod station_repository;

pub use forms_api::FormsApi;
pub use station_repository::StationRepository;
