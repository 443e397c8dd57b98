//! The two 32-byte identifiers everything hangs off: object references
//! (BLAKE3 content hashes) and owner keys (root addresses)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Address of an immutable stored object: the BLAKE3 hash of its encoding
///
/// Equal bytes, equal reference, so a reference never dangles and never
/// changes meaning. Mutation elsewhere in the graph produces new references
/// instead of rewriting old ones.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Reference([u8; 32]);

impl Reference {
    /// Sentinel for a link that points at nothing yet
    pub const ZERO: Reference = Reference([0u8; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Reference(bytes)
    }

    /// Address a byte string by content
    pub fn digest(data: &[u8]) -> Self {
        let hash = blake3::hash(data);
        Reference(*hash.as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex, 64 characters
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Inverse of [`to_hex`](Self::to_hex); rejects anything but 64 hex chars
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Reference(arr))
    }

    /// Abbreviated 7-char prefix for logs and traces
    pub fn short(&self) -> String {
        self.to_hex()[..7].to_string()
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ref({})", self.short())
    }
}

impl Default for Reference {
    fn default() -> Self {
        Reference::ZERO
    }
}

impl AsRef<[u8]> for Reference {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Public key of a root's owner
///
/// Each owner publishes at most one root. Signing and verification of roots
/// belong to the store; the walker only uses the key to address them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerKey([u8; 32]);

impl OwnerKey {
    /// Create an owner key from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        OwnerKey(bytes)
    }

    /// Derive a deterministic owner key from a seed
    pub fn from_seed(seed: &[u8]) -> Self {
        OwnerKey(*blake3::hash(seed).as_bytes())
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Get a short prefix for display
    pub fn short(&self) -> String {
        self.to_hex()[..7].to_string()
    }
}

impl fmt::Display for OwnerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for OwnerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OwnerKey({})", self.short())
    }
}
