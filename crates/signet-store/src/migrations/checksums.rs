//! SHA-256 checksums of migration SQL, recorded so edited migrations are caught

use sha2::{Digest, Sha256};

pub fn compute_checksum(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
