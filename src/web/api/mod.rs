pub mod epochs;
pub mod error;
pub mod metadata;
pub mod status;
