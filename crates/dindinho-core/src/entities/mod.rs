//! Entity structs for the persisted Dindinho domain objects.
//!
//! Each entity maps to a table in the libSQL database (see `dindinho-db/migrations`).
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema`, and serialize
//! with camelCase keys to match the API payloads.

mod account;
mod account_access;
mod audit;
mod invite;
mod user;

pub use account::Account;
pub use account_access::AccountAccess;
pub use audit::AuditEntry;
pub use invite::{Invite, InviteAccount};
pub use user::User;
