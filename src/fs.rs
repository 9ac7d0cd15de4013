use {
    crate::{
        error::*,
        *,
    },
    std::path::PathBuf,
};

/// The filesystem types for which mkfs must be forced, as it would
/// otherwise ask for a confirmation on whole disks
const FORCED_MKFS_TYPES: &[&str] = &["ext3", "ext4"];

/// The filesystem created when none is asked
const DEFAULT_FS_TYPE: &str = "ext4";

/// Entry point of all queries and mount operations, holding the
/// options telling how the mount table is read and which utilities
/// are called.
///
/// The crate level functions use `Fs::default()`.
#[derive(Debug, Clone, Default)]
pub struct Fs {
    pub options: Options,
}

impl From<Options> for Fs {
    fn from(options: Options) -> Self {
        Self { options }
    }
}

impl Fs {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// Return all the mounted filesystems, using the default scan policy
    pub fn get_mounts(
        &self,
        ctx: &Context,
    ) -> Result<Vec<Info>> {
        self.get_mounts_with_scan(ctx, &default_scan)
    }

    /// Return the mounted filesystems the given policy accepts
    pub fn get_mounts_with_scan(
        &self,
        ctx: &Context,
        scan: &dyn EntryScan,
    ) -> Result<Vec<Info>> {
        let entries = table::read_entries(ctx, &self.options)?;
        scan::scan_entries(ctx, &entries, scan)
    }

    /// Return the mounts of the given device
    pub fn get_dev_mounts(
        &self,
        ctx: &Context,
        dev: &str,
    ) -> Result<Vec<Info>> {
        self.get_dev_mounts_with_scan(ctx, dev, &default_scan)
    }

    /// Return the mounts of the given device among the ones the
    /// given policy accepts
    pub fn get_dev_mounts_with_scan(
        &self,
        ctx: &Context,
        dev: &str,
        scan: &dyn EntryScan,
    ) -> Result<Vec<Info>> {
        let filter = scan::DeviceFilter {
            device: dev,
            inner: scan,
        };
        self.get_mounts_with_scan(ctx, &filter)
    }

    /// Return the filesystem type of the disk, as reported by lsblk,
    /// or an empty string when the disk isn't formatted
    pub fn get_disk_format(
        &self,
        ctx: &Context,
        disk: &str,
    ) -> Result<String> {
        match self.options.resolved_strategy() {
            Some(Strategy::Mountinfo) => {
                disk_format::read_disk_format(ctx, &self.options.lsblk, disk)
            }
            _ => NotImplementedSnafu {
                operation: "detecting the disk format",
            }
            .fail(),
        }
    }

    /// Return the filesystem type of the disk, looking first in the
    /// mount table (filtered by the given policy) whether the disk is
    /// mounted, then asking lsblk
    pub fn get_disk_format_with_scan(
        &self,
        ctx: &Context,
        disk: &str,
        scan: &dyn EntryScan,
    ) -> Result<String> {
        let mounts = self.get_dev_mounts_with_scan(ctx, disk, scan)?;
        if let Some(info) = mounts.iter().find(|info| !info.fs_type.is_empty()) {
            return Ok(info.fs_type.clone());
        }
        self.get_disk_format(ctx, disk)
    }

    /// Format the source device if it isn't formatted, then mount it.
    ///
    /// Nothing is done when the device is already mounted on the target,
    /// and a device already formatted with another filesystem than the
    /// asked one is neither formatted nor mounted. When `fs_type` is empty,
    /// an unformatted device gets ext4 and a formatted one is mounted
    /// with whatever it holds.
    pub fn format_and_mount(
        &self,
        ctx: &Context,
        source: &str,
        target: &str,
        fs_type: &str,
        options: &[&str],
    ) -> Result<()> {
        // the kernel records the resolved device and mount point
        let device = resolved_path(source);
        let mount_point = resolved_path(target);
        let already_mounted = self
            .get_dev_mounts(ctx, &device.to_string_lossy())?
            .iter()
            .any(|info| info.path == mount_point);
        if already_mounted {
            tracing::info!(source, target, "already mounted");
            return Ok(());
        }
        let existing = self.get_disk_format(ctx, source)?;
        let mut fs_type = fs_type;
        if existing.is_empty() {
            if fs_type.is_empty() {
                fs_type = DEFAULT_FS_TYPE;
            }
            tracing::info!(source, fs_type, "disk appears unformatted, formatting");
            self.options.mkfs.exec(ctx, &mkfs_args(source, fs_type))?;
        } else if !fs_type.is_empty() && existing != fs_type {
            return FormatMismatchSnafu {
                device: source,
                fs_type,
                existing,
            }
            .fail();
        }
        let mut options = options.to_vec();
        options.push("defaults");
        self.mount(ctx, source, target, fs_type, &options)
    }

    /// Mount source on target as fs_type with the given options.
    ///
    /// `source` and `fs_type` may be empty when they're not needed, for
    /// example for a remount or when the kernel can guess the type.
    /// The options are the ones of mount(8), passed verbatim.
    pub fn mount(
        &self,
        ctx: &Context,
        source: &str,
        target: &str,
        fs_type: &str,
        options: &[&str],
    ) -> Result<()> {
        let args = mount_args(source, target, fs_type, options);
        tracing::info!(source, target, fs_type, options = ?options, "mounting");
        self.options.mount.exec(ctx, &args)
    }

    /// Mount as if "bind" was in the options
    pub fn bind_mount(
        &self,
        ctx: &Context,
        source: &str,
        target: &str,
        options: &[&str],
    ) -> Result<()> {
        self.mount(ctx, source, target, "", &bind_options(options))
    }

    pub fn unmount(
        &self,
        ctx: &Context,
        target: &str,
    ) -> Result<()> {
        tracing::info!(target, "unmounting");
        self.options.umount.exec(ctx, &exec::args([target]))
    }
}

/// the path with its symlinks resolved, or the path as given
/// when it can't be resolved (e.g. it doesn't exist)
fn resolved_path(path: &str) -> PathBuf {
    let mut resolved = PathBuf::from(path);
    if let Err(e) = eval_symlinks(&mut resolved) {
        tracing::debug!(path, "not resolved: {e}");
    }
    resolved
}

/// the arguments of mount(8), empty parts being omitted
pub(crate) fn mount_args(
    source: &str,
    target: &str,
    fs_type: &str,
    options: &[&str],
) -> Vec<String> {
    let mut args = Vec::new();
    if !fs_type.is_empty() {
        args.push("-t".to_string());
        args.push(fs_type.to_string());
    }
    if !options.is_empty() {
        args.push("-o".to_string());
        args.push(options.join(","));
    }
    if !source.is_empty() {
        args.push(source.to_string());
    }
    args.push(target.to_string());
    args
}

pub(crate) fn bind_options<'o>(options: &[&'o str]) -> Vec<&'o str> {
    let mut options = options.to_vec();
    options.push("bind");
    options
}

pub(crate) fn mkfs_args(
    source: &str,
    fs_type: &str,
) -> Vec<String> {
    let mut args = exec::args(["-t", fs_type]);
    if FORCED_MKFS_TYPES.contains(&fs_type) {
        args.push("-F".to_string());
    }
    args.push(source.to_string());
    args
}

#[test]
fn test_mount_args() {
    assert_eq!(
        mount_args("/dev/sdb1", "/mnt/data", "xfs", &["ro", "noatime"]),
        vec!["-t", "xfs", "-o", "ro,noatime", "/dev/sdb1", "/mnt/data"]
    );
    assert_eq!(mount_args("", "/mnt/data", "", &[]), vec!["/mnt/data"]);
    assert_eq!(
        mount_args("", "/mnt/data", "", &["remount", "ro"]),
        vec!["-o", "remount,ro", "/mnt/data"]
    );
}

#[test]
fn test_bind_options() {
    assert_eq!(bind_options(&[]), vec!["bind"]);
    assert_eq!(bind_options(&["ro"]), vec!["ro", "bind"]);
    assert_eq!(
        mount_args("/src", "/dst", "", &bind_options(&[])),
        vec!["-o", "bind", "/src", "/dst"]
    );
}

#[test]
fn test_mkfs_args() {
    assert_eq!(mkfs_args("/dev/sdb", "ext4"), vec!["-t", "ext4", "-F", "/dev/sdb"]);
    assert_eq!(mkfs_args("/dev/sdb", "xfs"), vec!["-t", "xfs", "/dev/sdb"]);
}
