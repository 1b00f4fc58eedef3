//! Clone a GitHub user's public repositories into per-language directories.
//!
//! The pipeline is linear:
//!
//! 1. Ask the [`GitHub`] API for (at most 20 of) the user's repositories
//! 2. Sort them by size and group them by their primary language
//! 3. Clone every group concurrently, one [`CloneJob`] per language, with
//!    the repositories inside a group cloned one after another
//!
//! Each clone gets a [`StallReporter`] which prints a heartbeat every so often
//! so a large repository doesn't look like a frozen process.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

mod config;
mod driver;
mod git;
mod github;
#[cfg(test)]
mod mock_github;
mod progress;
mod repo;
mod scheduler;

pub use crate::config::{Config, General, GitHubConfig, ProgressConfig};
pub use crate::driver::{CloneFailure, Driver};
pub use crate::git::{Cloner, DestinationNotEmpty, Git2Cloner};
pub use crate::github::{FailedRequest, GitHub, RawRepo};
pub use crate::progress::{Progress, StallReporter};
pub use crate::repo::{
    group_by_language, normalize, LanguageGroup, Repository, UNKNOWN_LANGUAGE,
};
pub use crate::scheduler::{CloneJob, Scheduler};
