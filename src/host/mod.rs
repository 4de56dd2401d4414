//! Remote release hosting: the `ReleaseHost` seam, the GitHub client and
//! in-memory hosts for dry runs and tests.

pub mod client;
pub mod factory;
pub mod github;

pub use client::{
    CreatedRelease, DraftRelease, DryRunHost, HostCall, MockReleaseHost, ReleaseHost,
    ReleaseRecord,
};
pub use github::GithubClient;
