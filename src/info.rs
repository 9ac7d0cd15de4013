use {
    crate::*,
    std::path::PathBuf,
};

/// A mount point, as returned by the queries of this crate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Info {
    /// the device on which the filesystem is mounted
    pub device: String,

    /// the path to which the device is mounted
    pub path: PathBuf,

    /// Either of two values:
    ///
    /// 1. for a bind mount recognized by the scan policy, the path
    ///    bind mounted to `path`
    /// 2. for any other mount, the mount source followed by the root
    ///    of the mount within its filesystem (fields 10 and 4 of a
    ///    mountinfo line)
    ///
    /// A native bind mount can't be told apart from a plain mount once
    /// it has been created. So even though `source` holds the bound path
    /// for bind mounts, its value can't be used to decide *whether*
    /// a mount is a bind mount.
    pub source: String,

    /// the filesystem type
    pub fs_type: String,

    /// the mount options used to create this mount point
    pub opts: Vec<String>,
}

impl Info {
    pub fn has_option(
        &self,
        name: &str,
    ) -> bool {
        self.opts.iter().any(|o| o == name)
    }
}

impl From<&Entry> for Info {
    /// direct copy of the entry fields, with the device being the
    /// mount source and the source being the mount source followed
    /// by the root
    fn from(entry: &Entry) -> Self {
        Self {
            device: entry.mount_source.clone(),
            path: entry.mount_point.clone(),
            source: entry.source_with_root(),
            fs_type: entry.fs_type.clone(),
            opts: entry.mount_opts.clone(),
        }
    }
}
