use sha2::{Digest, Sha256};
use std::fmt;

/// Domain-separation string for the harness admin permission set.
pub const PERMISSIONS_DOMAIN: &str = "harness.admin.permissions.storage";

/// Fixed identifier of a component's section in the shared state document.
///
/// Derived as `sha256(domain) - 1`, hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageSlot {
    key: String,
}

impl StorageSlot {
    #[must_use]
    pub fn derive(domain: &str) -> Self {
        let mut digest: [u8; 32] = Sha256::digest(domain.as_bytes()).into();

        for byte in digest.iter_mut().rev() {
            let (value, borrow) = byte.overflowing_sub(1);
            *byte = value;
            if !borrow {
                break;
            }
        }

        Self {
            key: hex::encode(digest),
        }
    }

    #[must_use]
    pub fn permissions() -> Self {
        Self::derive(PERMISSIONS_DOMAIN)
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for StorageSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}
