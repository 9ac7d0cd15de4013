use {
    crate::{
        error::*,
        *,
    },
    lazy_regex::*,
    snafu::prelude::*,
    std::path::PathBuf,
};

#[derive(Debug, Snafu)]
#[snafu(display("Could not parse {line} as mount output"))]
pub struct ParseMountLineError {
    line: String,
}

/// parse a line of the output of the `mount` command, which looks like
///
/// ```text
/// /dev/disk3s1s1 on / (apfs, sealed, local, read-only, journaled)
/// ```
///
/// The first token between parentheses is the filesystem type, the
/// following ones are the mount options. There's no root.
pub fn parse_mount_line(line: &str) -> Result<Entry, ParseMountLineError> {
    (|| {
        let (_, device, mount_point, options) =
            regex_captures!(r"^(.+) on (.+) \((.+)\)$", line.trim_end())?;
        let mount_point = PathBuf::from(mount_point);
        if !mount_point.is_absolute() {
            return None;
        }
        let mut tokens = options
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty());
        let fs_type = tokens.next()?.to_string();
        let mount_opts = tokens.map(str::to_string).collect();
        Some(Entry {
            root: PathBuf::new(),
            mount_point,
            mount_opts,
            fs_type,
            mount_source: device.to_string(),
        })
    })()
    .with_context(|| ParseMountLineSnafu { line })
}

/// read the mount table from the output of the mount command
pub fn read_mount_output(
    ctx: &Context,
    mount: &Utility,
    policy: ParsePolicy,
) -> Result<Vec<Entry>, Error> {
    let output = mount.output(ctx, &[])?;
    table::parse_lines(&output, policy, parse_mount_line, |source| {
        Error::ParseMountLine { source }
    })
}

#[test]
fn test_parse_mount_line() {
    let e = parse_mount_line("/dev/disk3s1s1 on / (apfs, sealed, local, read-only, journaled)")
        .unwrap();
    assert_eq!(&e.mount_source, "/dev/disk3s1s1");
    assert_eq!(e.mount_point, PathBuf::from("/"));
    assert_eq!(&e.fs_type, "apfs");
    assert_eq!(e.mount_opts, vec!["sealed", "local", "read-only", "journaled"]);
    assert_eq!(e.root, PathBuf::new());
    assert_eq!(e.source_with_root(), "/dev/disk3s1s1");

    let e = parse_mount_line("map auto_home on /System/Volumes/Data/home (autofs, automounted, nobrowse)")
        .unwrap();
    assert_eq!(&e.mount_source, "map auto_home");
    assert_eq!(e.mount_point, PathBuf::from("/System/Volumes/Data/home"));
    assert_eq!(&e.fs_type, "autofs");

    let e = parse_mount_line("/dev/disk4s2 on /Volumes/My Disk (msdos)").unwrap();
    assert_eq!(e.mount_point, PathBuf::from("/Volumes/My Disk"));
    assert_eq!(&e.fs_type, "msdos");
    assert!(e.mount_opts.is_empty());
}

#[test]
fn test_bad_mount_lines() {
    for line in [
        "",
        "/dev/disk3s1s1 on /",
        "/dev/disk3s1s1 on relative (apfs)",
        "/dev/disk3s1s1 on / ()",
    ] {
        assert!(parse_mount_line(line).is_err(), "{line:?} should fail");
    }
}
