//! CLI command implementations

pub mod add;
pub mod admin;
pub mod completions;
pub mod delete;
pub mod departments;
pub mod group;
pub mod init;
pub mod list;
pub mod login;
pub mod modify;
pub mod search;
