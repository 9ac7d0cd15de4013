use {
    crate::{
        linux::ParseMountInfoError,
        macos::ParseMountLineError,
        scan::ScanError,
    },
    std::path::PathBuf,
};

/// mount-table error type
#[derive(Debug, snafu::Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    /// The current platform has no implementation of the operation
    #[snafu(display("not implemented: {operation}"))]
    NotImplemented { operation: &'static str },

    #[snafu(display("Couldn't execute {exe}"))]
    CantExecute { source: std::io::Error, exe: String },

    #[snafu(display("{exe} failed ({status})\narguments: {args}\noutput: {output}"))]
    CommandFailed {
        exe: String,
        args: String,
        status: String,
        output: String,
    },

    #[snafu(display("Could not read file {path:?}"))]
    CantReadFile {
        source: std::io::Error,
        path: PathBuf,
    },

    #[snafu(display("Unexpected format"))]
    UnexpectedFormat,

    #[snafu(display("Could not parse mountinfo"))]
    ParseMountInfo { source: ParseMountInfoError },

    #[snafu(display("Could not parse mount output"))]
    ParseMountLine { source: ParseMountLineError },

    #[snafu(display("Could not parse {line:?} as a block device listing"))]
    ParseDiskFormat { line: String },

    /// The scan policy refused the table; partial results are dropped
    #[snafu(display("Mount table scan aborted at {mount_point:?}"))]
    ScanAborted {
        source: ScanError,
        mount_point: PathBuf,
    },

    #[snafu(display("Failed to mount {device} as {fs_type}: it already contains {existing}"))]
    FormatMismatch {
        device: String,
        fs_type: String,
        existing: String,
    },

    #[snafu(display("Operation cancelled"))]
    Cancelled,

    #[snafu(display("Deadline exceeded"))]
    DeadlineExceeded,

    #[snafu(display("Could not resolve symlinks of {path:?}"))]
    CantEvalSymlinks {
        source: std::io::Error,
        path: PathBuf,
    },
}

impl Error {
    /// true when the platform lacks the requested operation, which
    /// callers usually treat as a capability check rather than a failure
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented { .. })
    }
    /// true when the error comes from the context (cancellation or deadline)
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
