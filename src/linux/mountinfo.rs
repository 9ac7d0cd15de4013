use {
    crate::{
        error::*,
        *,
    },
    snafu::prelude::*,
    std::path::{
        Path,
        PathBuf,
    },
};

#[derive(Debug, Snafu)]
#[snafu(display("Could not parse {line} as mount info"))]
pub struct ParseMountInfoError {
    line: String,
}

/// parse a line of /proc/self/mountinfo.
///
/// This parsing is based on `man 5 proc`. Structure is also visible at
///  https://man7.org/linux/man-pages/man5/proc_pid_mountinfo.5.html
pub fn parse_mountinfo_line(line: &str) -> Result<Entry, ParseMountInfoError> {
    (|| {
        let mut tokens = line.split_whitespace();

        // mount id, parent id, major:minor
        for _ in 0..3 {
            tokens.next()?;
        }

        let root = str_to_pathbuf(tokens.next()?);
        let mount_point = str_to_pathbuf(tokens.next()?);
        if !mount_point.is_absolute() {
            return None;
        }

        let mount_opts = tokens
            .next()?
            .split(',')
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        // skip optional fields in the form name:value where
        // name can be "shared", "master", "propagate_from", or "unbindable"
        loop {
            let token = tokens.next()?;
            if token == "-" {
                break;
            }
        }

        let fs_type = tokens.next()?.to_string();
        let mount_source = sys::decode_string(tokens.next()?);

        // the super options, when present, aren't kept

        Some(Entry {
            root,
            mount_point,
            mount_opts,
            fs_type,
            mount_source,
        })
    })()
    .with_context(|| ParseMountInfoSnafu { line })
}

/// convert a string to a pathbuf, converting ascii-octal encoded
/// chars.
fn str_to_pathbuf(s: &str) -> PathBuf {
    PathBuf::from(sys::decode_string(s))
}

/// read the mount table of the current process
pub fn read_mountinfo(
    ctx: &Context,
    path: &Path,
    policy: ParsePolicy,
) -> Result<Vec<Entry>, Error> {
    ctx.check()?;
    tracing::debug!(path = %path.display(), "reading mount table");
    let content = sys::read_file(path).context(CantReadFileSnafu { path })?;
    ctx.check()?;
    table::parse_lines(&content, policy, parse_mountinfo_line, |source| {
        Error::ParseMountInfo { source }
    })
}

#[allow(clippy::bool_assert_comparison)]
#[test]
fn test_parse_mountinfo_line() {
    let e = parse_mountinfo_line(
        "47 21 0:41 / /dev/hugepages rw,relatime shared:27 - hugetlbfs hugetlbfs rw,pagesize=2M",
    )
    .unwrap();
    assert_eq!(e.root, PathBuf::from("/"));
    assert_eq!(e.mount_point, PathBuf::from("/dev/hugepages"));
    assert_eq!(e.mount_opts, vec!["rw", "relatime"]);
    assert_eq!(&e.fs_type, "hugetlbfs");
    assert_eq!(&e.mount_source, "hugetlbfs");

    let e = parse_mountinfo_line(
        "106 26 8:17 / /home/dys/dev rw,noatime,compress=zstd:3 shared:57 - btrfs /dev/sdb1 rw,attr2,inode64,noquota"
    ).unwrap();
    assert_eq!(&e.mount_source, "/dev/sdb1");
    assert_eq!(&e.fs_type, "btrfs");
    assert_eq!(e.mount_opts, vec!["rw", "noatime", "compress=zstd:3"]);
    assert_eq!(e.has_option("noatime"), true);

    let e = parse_mountinfo_line(
        "73 2 0:33 /root / rw,relatime shared:1 - btrfs /dev/vda3 rw,seclabel,compress=zstd:1,ssd,space_cache=v2,subvolid=256,subvol=/root"
    ).unwrap();
    assert_eq!(e.root, PathBuf::from("/root"));
    assert_eq!(e.mount_point, PathBuf::from("/"));
    assert_eq!(e.source_with_root(), "/dev/vda3/root");
}

#[test]
fn test_optional_fields_and_escapes() {
    // no optional field at all
    let e = parse_mountinfo_line("36 35 98:0 /mnt1 /mnt2 rw,noatime - ext3 /dev/root rw").unwrap();
    assert_eq!(e.root, PathBuf::from("/mnt1"));
    assert_eq!(&e.fs_type, "ext3");
    // several optional fields, a subtype, no super options
    let e = parse_mountinfo_line(
        "41 29 0:38 / /media/dys/USB\\040DISK rw,nosuid shared:3 master:1 - fuse.sshfs me@host:/x",
    )
    .unwrap();
    assert_eq!(e.mount_point, PathBuf::from("/media/dys/USB DISK"));
    assert_eq!(&e.fs_type, "fuse.sshfs");
    assert_eq!(&e.mount_source, "me@host:/x");
    // escapes in the source too
    let e = parse_mountinfo_line(
        "52 29 0:45 / /mnt/share rw - cifs //server/My\040Share rw",
    )
    .unwrap();
    assert_eq!(&e.mount_source, "//server/My Share");
}

#[test]
fn test_bad_mountinfo_lines() {
    for line in [
        "47 21 0:41 / /dev/hugepages rw,relatime shared:27",
        "47 21 0:41 / /dev/hugepages rw,relatime shared:27 - hugetlbfs",
        "47 21 0:41 / relative rw - ext4 /dev/sda1 rw",
        "garbage",
    ] {
        assert!(parse_mountinfo_line(line).is_err(), "{line:?} should fail");
    }
}
