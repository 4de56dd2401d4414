//! themeship - Draft theme releases with a generated changelog
//!
//! Looks up the previous release on GitHub, rewrites the changelog from the
//! git history since that release, and submits a draft release that states
//! which Ghost versions the theme ships with and supports.

pub mod changelog;
pub mod cli;
pub mod config;
pub mod host;
pub mod release;
pub mod util;
pub mod version;
