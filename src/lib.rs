//! Read the mount table, detect the format of disks, format,
//! mount and unmount them, on Linux and Darwin.
//!
//! Reading the mount table goes through a scan policy ([`EntryScan`])
//! deciding, for each raw [`Entry`], whether and how it becomes an
//! [`Info`]. Policies get a cache shared by all the calls of a scan,
//! which lets them merge, deduplicate or resolve related entries.

mod context;
mod disk_format;
mod entry;
mod error;
mod exec;
mod fs;
mod info;
mod linux;
mod macos;
mod mount;
mod read_options;
mod scan;
mod sys;
mod table;

pub use {
    context::Context,
    disk_format::PARTITIONED,
    entry::Entry,
    error::{Error, Result},
    exec::Utility,
    fs::Fs,
    info::Info,
    linux::{ParseMountInfoError, parse_mountinfo_line},
    macos::{ParseMountLineError, parse_mount_line},
    mount::*,
    read_options::*,
    scan::{EntryScan, ScanCache, ScanError, ScanResult, default_scan, device_scan},
};
