use crate::progress::Progress;
use failure::{Error, Fail, ResultExt};
use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{FetchOptions, RemoteCallbacks};
use std::cell::{Cell, RefCell};
use std::fmt::{self, Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Something which can make a full clone of a repository.
pub trait Cloner: Sync {
    /// Clone `url` into `dest`, keeping `progress` informed along the way.
    fn clone_repo(
        &self,
        url: &str,
        dest: &Path,
        progress: &mut dyn Progress,
    ) -> Result<(), Error>;
}

/// Clone using `libgit2`.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Git2Cloner;

impl Cloner for Git2Cloner {
    fn clone_repo(
        &self,
        url: &str,
        dest: &Path,
        progress: &mut dyn Progress,
    ) -> Result<(), Error> {
        debug!("Cloning {} into {}", url, dest.display());
        ensure_empty(dest)?;

        let started = Instant::now();
        let received = Cell::new((0, 0));
        progress.start(0);
        let progress = RefCell::new(progress);

        let mut callbacks = RemoteCallbacks::new();
        callbacks.transfer_progress(|stats| {
            received.set((stats.received_objects(), stats.received_bytes()));
            progress.borrow_mut().update(stats.received_objects());
            true
        });

        let mut fetch_opts = FetchOptions::new();
        fetch_opts.remote_callbacks(callbacks);

        let mut checkout = CheckoutBuilder::new();
        checkout.progress(|_path, completed, _total| {
            progress.borrow_mut().update(completed);
        });

        RepoBuilder::new()
            .fetch_options(fetch_opts)
            .with_checkout(checkout)
            .clone(url, dest)
            .with_context(|_| format!("Unable to clone {}", url))?;

        let (objects, bytes) = received.get();
        debug!(
            "Received {} objects in {} bytes for {} ({:.1?})",
            objects,
            bytes,
            url,
            started.elapsed()
        );

        Ok(())
    }
}

/// Make sure we won't be cloning on top of something.
fn ensure_empty(dest: &Path) -> Result<(), Error> {
    if !dest.exists() {
        return Ok(());
    }

    let mut entries = fs::read_dir(dest)
        .with_context(|_| format!("Unable to inspect {}", dest.display()))?;

    if entries.next().is_some() {
        Err(DestinationNotEmpty {
            path: dest.to_path_buf(),
        }
        .into())
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Fail)]
pub struct DestinationNotEmpty {
    pub path: PathBuf,
}

impl Display for DestinationNotEmpty {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} already exists and is not empty", self.path.display())
    }
}
