mod client;

pub use client::PortalClient;
