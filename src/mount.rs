//! The crate level API, running on the default [`Fs`]

use {
    crate::{
        error::*,
        *,
    },
    snafu::prelude::*,
    std::path::PathBuf,
};

/// Use lsblk to get the filesystem type of a disk, an empty string
/// meaning the disk isn't formatted
pub fn get_disk_format(
    ctx: &Context,
    disk: &str,
) -> Result<String> {
    Fs::default().get_disk_format(ctx, disk)
}

/// `get_disk_format`, but a disk found mounted in the mount table
/// filtered by `scan` gets the type of its mount
pub fn get_disk_format_with_scan(
    ctx: &Context,
    disk: &str,
    scan: &dyn EntryScan,
) -> Result<String> {
    Fs::default().get_disk_format_with_scan(ctx, disk, scan)
}

/// Format the disk when it's not, then mount it
pub fn format_and_mount(
    ctx: &Context,
    source: &str,
    target: &str,
    fs_type: &str,
    options: &[&str],
) -> Result<()> {
    Fs::default().format_and_mount(ctx, source, target, fs_type, options)
}

/// Mount source to target as fs_type with the given options.
///
/// `source` and `fs_type` must be empty strings when they're not
/// required, for example for a remount, or for an auto filesystem
/// type where the kernel handles the type.
///
/// The options are the ones of mount(8). Use an empty slice when
/// none is needed.
pub fn mount(
    source: &str,
    target: &str,
    fs_type: &str,
    options: &[&str],
) -> Result<()> {
    Fs::default().mount(&Context::background(), source, target, fs_type, options)
}

/// Mount with "bind" added to the options
pub fn bind_mount(
    source: &str,
    target: &str,
    options: &[&str],
) -> Result<()> {
    Fs::default().bind_mount(&Context::background(), source, target, options)
}

pub fn unmount(target: &str) -> Result<()> {
    Fs::default().unmount(&Context::background(), target)
}

/// Return all the mounted filesystems.
///
/// * Linux hosts read the mount table of the current process in
///   /proc/self/mountinfo, documented in `man 5 proc_pid_mountinfo`
///
/// * Darwin hosts parse the output of the mount command
pub fn get_mounts(ctx: &Context) -> Result<Vec<Info>> {
    Fs::default().get_mounts(ctx)
}

pub fn get_mounts_with_scan(
    ctx: &Context,
    scan: &dyn EntryScan,
) -> Result<Vec<Info>> {
    Fs::default().get_mounts_with_scan(ctx, scan)
}

/// Return all the mounts of the given device
pub fn get_dev_mounts(
    ctx: &Context,
    dev: &str,
) -> Result<Vec<Info>> {
    Fs::default().get_dev_mounts(ctx, dev)
}

pub fn get_dev_mounts_with_scan(
    ctx: &Context,
    dev: &str,
    scan: &dyn EntryScan,
) -> Result<Vec<Info>> {
    Fs::default().get_dev_mounts_with_scan(ctx, dev, scan)
}

/// Replace the path with its canonical form, without any symlink.
///
/// The canonical form is always absolute: a relative path is first
/// taken relative to the current directory.
pub fn eval_symlinks(path: &mut PathBuf) -> Result<()> {
    let real_path = path
        .canonicalize()
        .with_context(|_| CantEvalSymlinksSnafu { path: path.clone() })?;
    *path = real_path;
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use {
        super::*,
        std::os::unix::fs::symlink,
    };

    #[test]
    fn eval_symlinks_resolves_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().canonicalize().unwrap().join("real");
        std::fs::create_dir(&real).unwrap();
        let link = dir.path().join("link");
        symlink(&real, &link).unwrap();
        let mut path = link.join(".");
        eval_symlinks(&mut path).unwrap();
        assert_eq!(path, real);
    }

    #[test]
    fn eval_symlinks_makes_relative_paths_absolute() {
        let mut path = PathBuf::from(".");
        eval_symlinks(&mut path).unwrap();
        assert!(path.is_absolute());
        assert_eq!(path, std::env::current_dir().unwrap().canonicalize().unwrap());
    }

    #[test]
    fn eval_symlinks_keeps_path_on_error() {
        let mut path = PathBuf::from("/nonexistent/for/sure");
        let res = eval_symlinks(&mut path);
        assert!(matches!(res, Err(Error::CantEvalSymlinks { .. })));
        assert_eq!(path, PathBuf::from("/nonexistent/for/sure"));
    }
}
