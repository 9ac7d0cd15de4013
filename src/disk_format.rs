use {
    crate::{
        error::*,
        *,
    },
    lazy_regex::*,
};

/// What's returned for a disk without filesystem but holding
/// other devices, most probably partitions
pub const PARTITIONED: &str = "unknown data, probably partitions";

/// the lsblk arguments listing the disk and its dependents,
/// as KEY="value" pairs
pub(crate) fn lsblk_args(disk: &str) -> Vec<String> {
    exec::args(["-n", "-P", "-o", "NAME,FSTYPE", disk])
}

/// Read the filesystem type in the output of `lsblk -P -o NAME,FSTYPE`.
///
/// The first row describes the disk itself. An empty string means the
/// disk is unformatted.
pub(crate) fn parse_lsblk_output(output: &str) -> Result<String> {
    let mut rows = output.lines().filter(|l| !l.trim().is_empty());
    let Some(first) = rows.next() else {
        return Ok(String::new());
    };
    let mut pairs = regex_captures_iter!(r#"([A-Z:_-]+)="([^"]*)""#, first).peekable();
    if pairs.peek().is_none() {
        return ParseDiskFormatSnafu { line: first }.fail();
    }
    let fs_type = pairs
        .filter_map(|c| {
            let (_, [key, value]) = c.extract();
            (key == "FSTYPE").then(|| value.trim().to_string())
        })
        .next()
        .unwrap_or_default();
    if !fs_type.is_empty() {
        return Ok(fs_type);
    }
    if rows.next().is_some() {
        return Ok(PARTITIONED.to_string());
    }
    Ok(String::new())
}

/// Get the filesystem type of a disk with lsblk, an empty string
/// meaning the disk isn't formatted
pub(crate) fn read_disk_format(
    ctx: &Context,
    lsblk: &Utility,
    disk: &str,
) -> Result<String> {
    let output = lsblk.output(ctx, &lsblk_args(disk))?;
    let format = parse_lsblk_output(&output)?;
    tracing::debug!(disk, format = %format, "disk format");
    Ok(format)
}

#[test]
fn test_formatted_disk() {
    let output = "NAME=\"sdb\" FSTYPE=\"ext4\"\n";
    assert_eq!(parse_lsblk_output(output).unwrap(), "ext4");
    let output = "NAME=\"sdb\" FSTYPE=\"crypto_LUKS\"\nNAME=\"luks-1\" FSTYPE=\"xfs\"\n";
    assert_eq!(parse_lsblk_output(output).unwrap(), "crypto_LUKS");
}

#[test]
fn test_unformatted_disk() {
    assert_eq!(parse_lsblk_output("NAME=\"sdb\" FSTYPE=\"\"\n").unwrap(), "");
    // no fstype column at all
    assert_eq!(parse_lsblk_output("NAME=\"sdb\"\n").unwrap(), "");
    assert_eq!(parse_lsblk_output("").unwrap(), "");
}

#[test]
fn test_partitioned_disk() {
    let output = "NAME=\"sda\" FSTYPE=\"\"\nNAME=\"sda1\" FSTYPE=\"vfat\"\nNAME=\"sda2\" FSTYPE=\"ext4\"\n";
    assert_eq!(parse_lsblk_output(output).unwrap(), PARTITIONED);
}

#[test]
fn test_unparsable_listing() {
    assert!(matches!(
        parse_lsblk_output("lsblk: /dev/nope: not a block device\n"),
        Err(Error::ParseDiskFormat { .. })
    ));
}

#[test]
fn test_lsblk_args() {
    assert_eq!(
        lsblk_args("/dev/sdb"),
        vec!["-n", "-P", "-o", "NAME,FSTYPE", "/dev/sdb"]
    );
}
