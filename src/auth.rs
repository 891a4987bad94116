//! Auth-domain identifiers, token models, and user profiles.

pub mod id;
pub mod profile;
pub mod token;

pub use id::*;
pub use profile::*;
pub use token::{access::*, request::*, secret::*};
