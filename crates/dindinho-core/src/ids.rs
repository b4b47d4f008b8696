//! ID prefix constants.
//!
//! IDs are generated by the database as `{prefix}-{16 hex chars}`, e.g. `inv-a3f8b2c1d4e5f6a7`.

pub const PREFIX_USER: &str = "usr";
pub const PREFIX_ACCOUNT: &str = "acc";
pub const PREFIX_INVITE: &str = "inv";
pub const PREFIX_AUDIT: &str = "aud";

/// Every prefix in use, for exhaustive ID generation tests.
pub const ALL_PREFIXES: &[&str] = &[PREFIX_USER, PREFIX_ACCOUNT, PREFIX_INVITE, PREFIX_AUDIT];

/// Length of the random hex part of an ID (8 random bytes).
pub const ID_HEX_LEN: usize = 16;

/// Returns `true` if `id` has the shape `{prefix}-{16 hex chars}`.
#[must_use]
pub fn has_prefix(id: &str, prefix: &str) -> bool {
    id.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|hex| hex.len() == ID_HEX_LEN && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
