pub mod client;
pub mod discovery;
pub mod resource;

pub use client::create_client;
pub use discovery::{DiscoveredResource, ResolveError};
pub use resource::{annotation_patch, ClientError, KubeResourceClient, ResourceClient};
