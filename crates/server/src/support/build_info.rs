#![forbid(unsafe_code)]

use std::sync::OnceLock;
use std::time::UNIX_EPOCH;

pub(crate) fn build_profile_label() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}

pub(crate) fn build_git_sha() -> Option<&'static str> {
    option_env!("PM_GIT_SHA")
        .map(str::trim)
        .filter(|sha| !sha.is_empty())
}

fn fnv1a_update(mut hash: u64, bytes: &[u8]) -> u64 {
    const FNV_PRIME: u64 = 1099511628211;
    for b in bytes {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Tag for this exact binary on disk: path, size and mtime.
fn binary_tag() -> &'static str {
    static TAG: OnceLock<String> = OnceLock::new();
    TAG.get_or_init(|| {
        const FNV_OFFSET: u64 = 14695981039346656037;

        let mut hash = FNV_OFFSET;
        if let Ok(exe) = std::env::current_exe() {
            hash = fnv1a_update(hash, exe.to_string_lossy().as_bytes());
            if let Ok(meta) = std::fs::metadata(&exe) {
                hash = fnv1a_update(hash, &meta.len().to_le_bytes());
                if let Ok(modified) = meta.modified()
                    && let Ok(dur) = modified.duration_since(UNIX_EPOCH)
                {
                    hash = fnv1a_update(hash, &dur.as_nanos().to_le_bytes());
                }
            }
        }
        format!("bin.{hash:016x}")
    })
    .as_str()
}

/// `0.1.0+git.<sha>.<profile>.<bin>`, or `0.1.0+<profile>.<bin>` outside a checkout.
pub(crate) fn build_fingerprint() -> String {
    let version = crate::SERVER_VERSION;
    let profile = build_profile_label();
    let bin = binary_tag();
    match build_git_sha() {
        Some(sha) => format!("{version}+git.{sha}.{profile}.{bin}"),
        None => format!("{version}+{profile}.{bin}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_semver_metadata() {
        let first = build_fingerprint();
        assert_eq!(first, build_fingerprint());
        let (version, meta) = first.split_once('+').unwrap();
        assert_eq!(version, crate::SERVER_VERSION);
        assert!(meta.contains(build_profile_label()));
        assert!(
            meta.split('.')
                .all(|part| part.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'))
        );
    }
}
