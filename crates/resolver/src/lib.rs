//! LAND ownership and authorization resolution.
//!
//! [`LandResolver`] answers ownership, operator and containment questions
//! about LAND parcels and Estates by reading the two registries, and gates
//! metadata updates through [`LandDataProvider::validate_authorization`].
//! A parcel that belongs to an Estate is always authorized through that
//! Estate, never directly.

pub mod authorization;
pub mod errors;
pub mod logging;
pub mod provider;
pub mod resolver;
pub mod settings;

pub use authorization::AuthorizationPath;
pub use errors::*;
pub use provider::LandDataProvider;
pub use resolver::LandResolver;
pub use settings::{LogFormat, LoggingConfig, Network, RegistryAddresses, ResolverConfig};

pub use land_types::{Address, Coordinate, EstateId, MetadataRecord};
