use {
    crate::*,
    lazy_regex::*,
    std::collections::HashMap,
};

/// Entries already seen during one scan of the mount table, keyed by
/// whatever the scan policy chooses (mount point, source, device...).
///
/// A new cache is made for every scan and dropped when it ends.
pub type ScanCache = HashMap<String, Entry>;

/// Error a scan policy may return to abort the whole scan
pub type ScanError = Box<dyn std::error::Error + Send + Sync>;

/// `Ok(Some(info))` keeps the entry, `Ok(None)` skips it
pub type ScanResult = Result<Option<Info>, ScanError>;

/// The policy deciding, for each entry of the mount table,
/// whether and how it becomes an [`Info`].
///
/// The policy is called once per entry, in table order, with the
/// cache of the current scan, which it may read and update freely.
/// Returning an error aborts the scan: no partial list is returned.
///
/// Any `Fn(&Context, &Entry, &mut ScanCache) -> ScanResult` is a policy.
pub trait EntryScan {
    fn scan(
        &self,
        ctx: &Context,
        entry: &Entry,
        cache: &mut ScanCache,
    ) -> ScanResult;
}

impl<F> EntryScan for F
where
    F: Fn(&Context, &Entry, &mut ScanCache) -> ScanResult,
{
    fn scan(
        &self,
        ctx: &Context,
        entry: &Entry,
        cache: &mut ScanCache,
    ) -> ScanResult {
        self(ctx, entry, cache)
    }
}

/// The policy used when none is given: every entry with a mount point
/// is kept, as a direct copy (see `Info::from(&Entry)`)
pub fn default_scan(
    _ctx: &Context,
    entry: &Entry,
    _cache: &mut ScanCache,
) -> ScanResult {
    if entry.mount_point.as_os_str().is_empty() {
        return Ok(None);
    }
    Ok(Some(Info::from(entry)))
}

/// A policy keeping only the mounts backed by a device (or by a fuse or
/// nfs filesystem) and resolving bind mounts.
///
/// Mounts without source ("none") are never kept, whatever their type.
///
/// The first entry seen for a source is considered the plain mount of
/// that source and cached. Later entries for the same source are taken
/// as bind mounts: their info source is the path of the first mount
/// followed by their own root.
pub fn device_scan(
    _ctx: &Context,
    entry: &Entry,
    cache: &mut ScanCache,
) -> ScanResult {
    if entry.has_no_source() {
        return Ok(None);
    }
    let wanted_fs_type = regex_is_match!(r"^(?:devtmpfs|fuse\..+|nfs\d?)$", &entry.fs_type);
    if !wanted_fs_type && !entry.mount_source.starts_with('/') {
        return Ok(None);
    }
    let mut info = Info::from(entry);
    info.source = match cache.get(&entry.mount_source) {
        Some(first) => {
            crate::entry::concat_source(&first.mount_point.to_string_lossy(), &entry.root)
        }
        None => {
            cache.insert(entry.mount_source.clone(), entry.clone());
            entry.mount_source.clone()
        }
    };
    Ok(Some(info))
}

/// Wraps a policy to only keep the infos of one device.
///
/// The inner policy still sees every entry so that its cache evolves
/// exactly as in an unfiltered scan.
pub(crate) struct DeviceFilter<'s> {
    pub device: &'s str,
    pub inner: &'s dyn EntryScan,
}

impl EntryScan for DeviceFilter<'_> {
    fn scan(
        &self,
        ctx: &Context,
        entry: &Entry,
        cache: &mut ScanCache,
    ) -> ScanResult {
        Ok(self
            .inner
            .scan(ctx, entry, cache)?
            .filter(|info| info.device == self.device))
    }
}

/// Run the policy over the entries, in order, with a fresh cache
pub(crate) fn scan_entries(
    ctx: &Context,
    entries: &[Entry],
    policy: &dyn EntryScan,
) -> Result<Vec<Info>> {
    let mut cache = ScanCache::new();
    let mut infos = Vec::new();
    for entry in entries {
        ctx.check()?;
        match policy.scan(ctx, entry, &mut cache) {
            Ok(Some(info)) => infos.push(info),
            Ok(None) => {}
            Err(source) => {
                return Err(Error::ScanAborted {
                    source,
                    mount_point: entry.mount_point.clone(),
                });
            }
        }
    }
    Ok(infos)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        std::path::PathBuf,
    };

    fn entry(
        root: &str,
        mount_point: &str,
        fs_type: &str,
        mount_source: &str,
    ) -> Entry {
        Entry {
            root: PathBuf::from(root),
            mount_point: PathBuf::from(mount_point),
            mount_opts: vec!["rw".to_string(), "relatime".to_string()],
            fs_type: fs_type.to_string(),
            mount_source: mount_source.to_string(),
        }
    }

    fn table() -> Vec<Entry> {
        vec![
            entry("/", "/", "ext4", "/dev/sda1"),
            entry("/", "/proc", "proc", "proc"),
            entry("/", "/data", "xfs", "/dev/sdb1"),
            entry("/volumes/a", "/srv/a", "xfs", "/dev/sdb1"),
            entry("/", "/dev", "devtmpfs", "udev"),
            entry("/", "/mnt/remote", "fuse.sshfs", "me@host:/home"),
        ]
    }

    #[test]
    fn default_scan_keeps_everything() {
        let ctx = Context::background();
        let infos = scan_entries(&ctx, &table(), &default_scan).unwrap();
        assert_eq!(infos.len(), 6);
        for (info, entry) in infos.iter().zip(table()) {
            assert_eq!(info.path, entry.mount_point);
            assert_eq!(info.fs_type, entry.fs_type);
            assert_eq!(info.device, entry.mount_source);
            assert_eq!(info.opts, entry.mount_opts);
        }
        assert_eq!(infos[3].source, "/dev/sdb1/volumes/a");
        assert_eq!(infos[1].source, "proc");
    }

    #[test]
    fn default_scan_skips_empty_mount_point() {
        let ctx = Context::background();
        let mut cache = ScanCache::new();
        let e = entry("/", "", "ext4", "/dev/sda1");
        assert_eq!(default_scan(&ctx, &e, &mut cache).unwrap(), None);
    }

    #[test]
    fn device_scan_resolves_bind_mounts() {
        let ctx = Context::background();
        let infos = scan_entries(&ctx, &table(), &device_scan).unwrap();
        let paths: Vec<&str> = infos.iter().map(|i| i.path.to_str().unwrap()).collect();
        assert_eq!(paths, vec!["/", "/data", "/srv/a", "/dev", "/mnt/remote"]);
        assert_eq!(infos[1].source, "/dev/sdb1");
        assert_eq!(infos[2].source, "/data/volumes/a");
        assert_eq!(infos[2].device, "/dev/sdb1");
    }

    #[test]
    fn device_scan_skips_sourceless_mounts() {
        let ctx = Context::background();
        let entries = vec![
            entry("/", "/dev", "devtmpfs", "none"),
            entry("/", "/mnt/fuse", "fuse.test", "none"),
            entry("/", "/data", "xfs", "/dev/sdb1"),
        ];
        let infos = scan_entries(&ctx, &entries, &device_scan).unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].path, PathBuf::from("/data"));
    }

    #[test]
    fn device_filter_matches_filtered_scan() {
        let ctx = Context::background();
        let all = scan_entries(&ctx, &table(), &device_scan).unwrap();
        let filter = DeviceFilter {
            device: "/dev/sdb1",
            inner: &device_scan,
        };
        let filtered = scan_entries(&ctx, &table(), &filter).unwrap();
        let expected: Vec<Info> = all
            .into_iter()
            .filter(|i| i.device == "/dev/sdb1")
            .collect();
        assert_eq!(filtered, expected);
        // the bind mount was still resolved through the cache
        assert_eq!(filtered[1].source, "/data/volumes/a");
    }

    #[test]
    fn policy_error_discards_partial_results() {
        let ctx = Context::background();
        let policy = |_: &Context, entry: &Entry, _: &mut ScanCache| -> ScanResult {
            if entry.fs_type == "xfs" {
                return Err("no xfs allowed".into());
            }
            Ok(Some(Info::from(entry)))
        };
        match scan_entries(&ctx, &table(), &policy) {
            Err(Error::ScanAborted { mount_point, .. }) => {
                assert_eq!(mount_point, PathBuf::from("/data"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn policy_can_deduplicate_with_cache() {
        let ctx = Context::background();
        // keep only the first mount on a given mount point
        let mut entries = table();
        entries.push(entry("/", "/data", "overlay", "overlay"));
        let policy = |_: &Context, entry: &Entry, cache: &mut ScanCache| -> ScanResult {
            let key = entry.mount_point.to_string_lossy().to_string();
            let seen = cache.insert(key, entry.clone()).is_some();
            Ok((!seen).then(|| Info::from(entry)))
        };
        let infos = scan_entries(&ctx, &entries, &policy).unwrap();
        assert_eq!(infos.len(), 6);
        assert_eq!(infos[2].fs_type, "xfs");
    }

    #[test]
    fn cancelled_scan_fails() {
        let ctx = Context::background();
        ctx.cancel();
        assert!(matches!(
            scan_entries(&ctx, &table(), &default_scan),
            Err(Error::Cancelled)
        ));
    }
}
