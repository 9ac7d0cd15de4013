mod mountinfo;

pub use mountinfo::*;
