//! Utility modules shared by the compiler and the build.

pub mod exec;
pub mod slug;
