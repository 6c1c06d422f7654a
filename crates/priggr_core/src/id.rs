//! Paste identifier issuance.

use uuid::Uuid;

/// Source of candidate paste ids.
///
/// Candidates only need to be collision-resistant; the store's key check
/// inside the insert transaction is what enforces uniqueness.
pub trait IdIssuer: Send + Sync {
    fn issue(&self) -> String;
}

/// Random UUIDv4 ids (122 bits from the OS CSPRNG) in 32-char lowercase hex.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIssuer;

impl IdIssuer for UuidIssuer {
    fn issue(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}
