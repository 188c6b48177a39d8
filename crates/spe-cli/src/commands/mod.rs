//! CLI subcommand implementations.

pub mod attest;
pub mod keygen;
pub mod proof;
pub mod verify;
