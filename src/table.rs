use {
    crate::{
        error::*,
        *,
    },
    snafu::prelude::*,
    std::fmt,
};

/// read and parse the mount table the way the options tell
pub(crate) fn read_entries(
    ctx: &Context,
    options: &Options,
) -> Result<Vec<Entry>> {
    let strategy = options.resolved_strategy().context(NotImplementedSnafu {
        operation: "reading the mount table",
    })?;
    let policy = options.resolved_parse_policy(strategy);
    match strategy {
        Strategy::Mountinfo => linux::read_mountinfo(ctx, &options.mountinfo_path, policy),
        Strategy::MountCommand => macos::read_mount_output(ctx, &options.mount, policy),
    }
}

/// Parse the non blank lines of a mount table, in order.
///
/// With `ParsePolicy::Fail` the first bad line fails everything,
/// with `ParsePolicy::Skip` bad lines are logged and ignored.
pub(crate) fn parse_lines<E, P, W>(
    content: &str,
    policy: ParsePolicy,
    parse: P,
    wrap: W,
) -> Result<Vec<Entry>>
where
    E: fmt::Display,
    P: Fn(&str) -> Result<Entry, E>,
    W: Fn(E) -> Error,
{
    let mut entries = Vec::new();
    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        match parse(line) {
            Ok(entry) => entries.push(entry),
            Err(e) => match policy {
                ParsePolicy::Fail => return Err(wrap(e)),
                ParsePolicy::Skip => {
                    tracing::warn!("skipping mount table line: {e}");
                }
            },
        }
    }
    Ok(entries)
}
