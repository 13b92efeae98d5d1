//! Stratus Core - Provider-neutral resource model
//!
//! Provider clients hand back resources in this shape; the graph and sync
//! crates never look at provider-specific types.
//!
//! # Example
//!
//! ```
//! use stratus_core::{Resource, ResourceKey};
//!
//! let subnet = Resource::new("subnet", "subnet-1a").with_property("cidr", "10.0.1.0/24");
//! assert_eq!(subnet.key(), ResourceKey::new("subnet", "subnet-1a"));
//! ```

mod error;
mod resource;

pub use error::{ResourceError, Result};
pub use resource::{PropertyValue, Resource, ResourceKey};
