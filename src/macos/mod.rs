mod mount_output;

pub use mount_output::*;
