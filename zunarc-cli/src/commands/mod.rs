//! Command implementations for the ZunArc CLI.

pub mod decrypt;
pub mod extract;
pub mod info;
pub mod list;
pub mod unlzss;

pub use decrypt::{DecryptOptions, cmd_decrypt};
pub use extract::{ExtractOptions, cmd_extract};
pub use info::cmd_info;
pub use list::{ListOptions, cmd_list};
pub use test::cmd_test;
pub use unlzss::cmd_unlzss;
