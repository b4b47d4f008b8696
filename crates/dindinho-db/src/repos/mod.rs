//! Repository modules for every persisted entity.
//!
//! Each module adds methods to `DindinhoService` via `impl DindinhoService` blocks.

pub mod access;
pub mod account;
pub mod audit;
pub mod invite;
pub mod user;
