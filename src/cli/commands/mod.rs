//! CLI command implementations

pub mod backup;
pub mod completions;
pub mod config;
pub mod decl;
pub mod doctor;
pub mod emp;
pub mod init;
pub mod inv;
pub mod order;
pub mod pros;
pub mod status;
pub mod sup;
