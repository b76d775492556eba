//! Container identifiers, creation specs, and security option parsing for berth.
//!
//! This crate defines the schema layer: string newtypes for container IDs and
//! names (`ContainerId`, `ContainerName`), the TOML creation request
//! (`ContainerSpec`), and the `SecurityProfile` built from raw `key=value`
//! confinement directives by `parse_security_opts`.

pub mod security;
pub mod spec;
pub mod types;

pub use security::{parse_security_opts, SecurityOptError, SecurityProfile};
pub use spec::{parse_spec_file, parse_spec_str, ContainerSpec, SpecError};
pub use types::{is_container_id, ContainerId, ContainerIdentity, ContainerName, CONTAINER_ID_LEN};
