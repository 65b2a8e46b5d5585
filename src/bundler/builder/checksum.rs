//! Bundle checksum calculation.
//!
//! A framework is a directory tree, so the checksum covers every regular
//! file's relative path and content in sorted order. Symlinks are not
//! followed; their targets are already hashed through the real files.

use crate::bundler::{Result, error::ErrorExt};
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Digest of a bundle tree.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TreeDigest {
    /// Hex-encoded SHA-256 (64 characters)
    pub sha256: String,
    /// Total size of regular files in bytes
    pub size: u64,
}

/// Calculates the SHA-256 and size of a directory tree.
///
/// # Algorithm
///
/// 1. Recursively collect all regular files using walkdir
/// 2. Sort paths lexicographically for deterministic order
/// 3. For each file: hash(relative_path, NUL, content length, content)
/// 4. Return final combined hash
pub async fn calculate_tree_digest(dir_path: &Path) -> Result<TreeDigest> {
    let mut entries = Vec::new();
    for entry in walkdir::WalkDir::new(dir_path).follow_links(false) {
        let entry = entry?;
        if entry.file_type().is_file() {
            entries.push(entry.into_path());
        }
    }
    entries.sort();

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];
    let mut size = 0u64;

    for path in entries {
        // Include relative path in hash (preserves directory structure)
        let rel_path = path.strip_prefix(dir_path)?;
        hasher.update(rel_path.to_string_lossy().as_bytes());
        hasher.update([0u8]);

        let mut file = tokio::fs::File::open(&path)
            .await
            .fs_context("opening file for hashing", &path)?;
        let len = file
            .metadata()
            .await
            .fs_context("reading file metadata", &path)?
            .len();
        hasher.update(len.to_le_bytes());

        loop {
            let n = file
                .read(&mut buffer)
                .await
                .fs_context("reading file for hash calculation", &path)?;
            if n == 0 {
                break;
            }
            size += n as u64;
            hasher.update(&buffer[..n]);
        }
    }

    Ok(TreeDigest {
        sha256: format!("{:x}", hasher.finalize()),
        size,
    })
}
