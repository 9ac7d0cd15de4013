use std::path::{
    Path,
    PathBuf,
};

/// One record of the mount table, as read from the host.
///
/// On Linux this is the subset of a `/proc/self/mountinfo` line
/// the rest of the crate needs:
///
/// ```text
/// 36 35 98:0 /mnt1 /mnt2 rw,noatime master:1 - ext3 /dev/root rw,errors=continue
/// (1)(2)(3)   (4)   (5)      (6)      (7)   (8) (9)     (10)         (11)
/// ```
///
/// root is field 4, mount point field 5, mount options field 6,
/// fs type field 9 and mount source field 10. The optional fields
/// (7), the ids and the super block options aren't kept.
///
/// On Darwin the record comes from a line of the `mount` command output
/// and the root is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// root of the mount within the filesystem
    pub root: PathBuf,
    /// where the filesystem is mounted, always absolute
    pub mount_point: PathBuf,
    /// per mount options
    pub mount_opts: Vec<String>,
    /// name of the filesystem, of the form "type[.subtype]"
    pub fs_type: String,
    /// filesystem specific information, or "none"
    pub mount_source: String,
}

impl Entry {
    /// whether the kernel reported no source for this mount
    pub fn has_no_source(&self) -> bool {
        self.mount_source == "none"
    }
    pub fn has_option(
        &self,
        name: &str,
    ) -> bool {
        self.mount_opts.iter().any(|o| o == name)
    }
    /// the source followed by the root of the mount, which is
    /// what identifies the mounted tree (the root adds nothing when
    /// the whole filesystem is mounted)
    pub fn source_with_root(&self) -> String {
        concat_source(&self.mount_source, &self.root)
    }
}

pub(crate) fn concat_source(
    source: &str,
    root: &Path,
) -> String {
    let root = root.to_string_lossy();
    let root = root.trim_start_matches('/');
    if root.is_empty() {
        source.to_string()
    } else {
        format!("{}/{}", source.trim_end_matches('/'), root)
    }
}

#[test]
fn test_source_with_root() {
    let mut entry = Entry {
        root: PathBuf::from("/"),
        mount_point: PathBuf::from("/home"),
        mount_opts: vec!["rw".to_string()],
        fs_type: "ext4".to_string(),
        mount_source: "/dev/sda2".to_string(),
    };
    assert_eq!(entry.source_with_root(), "/dev/sda2");
    entry.root = PathBuf::from("/var/lib/data");
    assert_eq!(entry.source_with_root(), "/dev/sda2/var/lib/data");
    entry.root = PathBuf::new();
    assert_eq!(entry.source_with_root(), "/dev/sda2");
    assert!(entry.has_option("rw"));
    assert!(!entry.has_option("ro"));
    assert!(!entry.has_no_source());
}
