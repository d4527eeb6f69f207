//! Concrete collaborators: environment config and the REST client.

pub mod config;
pub mod portal;
