//! Types shared by every wayfinder crate: identities, the message protocol
//! exchanged between coordinators, and the error taxonomy.

pub mod domain;
pub mod error;
pub mod protocol;
