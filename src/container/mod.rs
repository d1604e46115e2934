//! The container format: the fixed-layout header that binds KDF
//! parameters, algorithm selection, salt, and nonce seed together, and the
//! codec that reads and writes it (component B).

pub mod header;

pub use header::{Header, HeaderWarning};
