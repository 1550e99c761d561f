//! Partition enumeration and usage.
//!
//! Partitions come from `/proc/mounts`; usage comes from `statvfs(3)`.

use std::ffi::CString;
use std::io;
use std::mem;

use crate::error::ProbeError;
use crate::sources::procfs::unescape_mount_path;
use crate::sources::{DiskUsage, Partition};

/// Pseudo/virtual filesystem types that never back a real disk.
const SKIP_FSTYPES: [&str; 20] = [
    "proc",
    "sysfs",
    "devpts",
    "devtmpfs",
    "tmpfs",
    "cgroup",
    "cgroup2",
    "pstore",
    "bpf",
    "debugfs",
    "tracefs",
    "fusectl",
    "configfs",
    "securityfs",
    "hugetlbfs",
    "mqueue",
    "autofs",
    "binfmt_misc",
    "nsfs",
    "efivarfs",
];

/// Kernel interface trees; anything mounted at or below them is not a disk.
const SKIP_MOUNT_ROOTS: [&str; 3] = ["/proc", "/sys", "/dev"];

/// Parses `/proc/mounts` into partitions, in file order, skipping pseudo filesystems.
pub fn parse_mounts(content: &str) -> Vec<Partition> {
    let mut partitions = Vec::new();

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            continue;
        }

        let device = unescape_mount_path(parts[0]);
        let mountpoint = unescape_mount_path(parts[1]);
        let fstype = parts[2].to_string();

        if should_skip_filesystem(&fstype, &mountpoint) {
            continue;
        }

        partitions.push(Partition {
            device,
            mountpoint,
            fstype,
        });
    }

    partitions
}

/// Checks if a filesystem should be skipped based on type and mount point.
fn should_skip_filesystem(fstype: &str, mountpoint: &str) -> bool {
    if SKIP_FSTYPES.contains(&fstype) {
        return true;
    }

    SKIP_MOUNT_ROOTS.iter().any(|root| {
        mountpoint
            .strip_prefix(root)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

/// Reads usage of the filesystem mounted at `path` with `statvfs`.
pub fn statvfs_usage(path: &str) -> Result<DiskUsage, ProbeError> {
    let c_path = CString::new(path)
        .map_err(|e| ProbeError::parse(path, format!("invalid path: {}", e)))?;

    // SAFETY: statvfs is a plain C struct of integers; zeroed memory is valid
    // and the kernel fills it in on success.
    let stat = unsafe {
        let mut stat: libc::statvfs = mem::zeroed();
        if libc::statvfs(c_path.as_ptr(), &mut stat) != 0 {
            return Err(ProbeError::from_io(path, io::Error::last_os_error()));
        }
        stat
    };

    usage_from_blocks(
        path,
        stat.f_frsize as u64,
        stat.f_blocks as u64,
        stat.f_bfree as u64,
        stat.f_bavail as u64,
    )
}

/// Converts `statvfs` block counts to bytes.
///
/// Counts come from the filesystem driver, so a product that does not fit in
/// `u64` is a parse error for this partition only.
fn usage_from_blocks(
    path: &str,
    block_size: u64,
    blocks: u64,
    free: u64,
    available: u64,
) -> Result<DiskUsage, ProbeError> {
    let to_bytes = |count: u64| {
        block_size
            .checked_mul(count)
            .ok_or_else(|| ProbeError::parse(path, "size overflow"))
    };

    let total_bytes = to_bytes(blocks)?;
    let free_bytes = to_bytes(free)?;
    let available_bytes = to_bytes(available)?;

    Ok(DiskUsage {
        total_bytes,
        used_bytes: total_bytes.saturating_sub(free_bytes),
        available_bytes,
    })
}
