//! Credential domain module.
//!
//! - `store`: persistence trait for the API credential (`CredentialStore`)
//! - `status`: observable credential state (`CredentialStatus`)
//! - `gate`: check/load/save operations and status transitions (`CredentialGate`)

mod gate;
mod status;
mod store;

pub use gate::{CredentialError, CredentialGate};
pub use status::CredentialStatus;
pub use store::CredentialStore;
