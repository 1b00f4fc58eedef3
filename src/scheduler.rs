use crate::config::Config;
use crate::git::Cloner;
use crate::progress::StallReporter;
use crate::repo::{LanguageGroup, Repository};
use failure::{Error, ResultExt};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Clone every repository for a single language, one after the other.
#[derive(Debug, Clone, PartialEq)]
pub struct CloneJob {
    pub language: String,
    pub base_dir: PathBuf,
    pub members: Vec<Repository>,
}

impl CloneJob {
    pub fn new(group: LanguageGroup, root: &Path) -> CloneJob {
        let base_dir = group.base_dir(root);

        CloneJob {
            language: group.key,
            base_dir,
            members: group.members,
        }
    }

    /// Where a particular repository will be cloned to.
    pub fn clone_path(&self, repo: &Repository) -> PathBuf {
        self.base_dir.join(&repo.name)
    }

    /// Make sure the job's base directory exists.
    pub fn prepare(&self) -> Result<(), Error> {
        fs::create_dir_all(&self.base_dir).with_context(|_| {
            format!("Couldn't create the target directory ({})", self.base_dir.display())
        })?;

        Ok(())
    }

    /// Create the base directory then clone each member in turn, bailing out
    /// on the first failure.
    ///
    /// Returns the job's language once everything has been cloned.
    pub fn run<C>(&self, cloner: &C, threshold: Duration) -> Result<String, Error>
    where
        C: Cloner + ?Sized,
    {
        debug!(
            "Cloning {} {} repositories into {}",
            self.members.len(),
            self.language,
            self.base_dir.display()
        );
        self.prepare()?;

        for repo in &self.members {
            let clone_path = self.clone_path(repo);
            println!("Cloning {} to: {}", repo.clone_url, clone_path.display());

            let mut reporter = StallReporter::with_threshold(repo.name.as_str(), threshold);
            cloner.clone_repo(&repo.clone_url, &clone_path, &mut reporter)?;

            println!("Done cloning {} to: {}", repo.clone_url, clone_path.display());
        }

        Ok(self.language.clone())
    }
}

/// Runs each [`CloneJob`] concurrently on a pool it owns.
#[derive(Debug, Clone, PartialEq)]
pub struct Scheduler {
    threads: usize,
    threshold: Duration,
}

impl Scheduler {
    /// Create a new scheduler. A `threads` of `0` gives every job its own
    /// worker.
    pub fn new(threads: usize, threshold: Duration) -> Scheduler {
        Scheduler { threads, threshold }
    }

    pub fn from_config(cfg: &Config) -> Scheduler {
        Scheduler::new(cfg.general.threads, cfg.progress.threshold())
    }

    /// Turn each group into a job rooted at `root`.
    ///
    /// Directories are only created once a job runs, so a directory which
    /// can't be created fails that language alone.
    pub fn jobs<I>(&self, root: &Path, groups: I) -> Vec<CloneJob>
    where
        I: IntoIterator<Item = LanguageGroup>,
    {
        groups
            .into_iter()
            .map(|group| CloneJob::new(group, root))
            .collect()
    }

    /// Run every job to completion.
    ///
    /// A failing job never stops its siblings. Each job's outcome is returned
    /// alongside its language, in the same order as `jobs`.
    pub fn run<C>(
        &self,
        jobs: &[CloneJob],
        cloner: &C,
    ) -> Result<Vec<(String, Result<String, Error>)>, Error>
    where
        C: Cloner + ?Sized,
    {
        if jobs.is_empty() {
            return Ok(Vec::new());
        }

        let pool = self.pool(jobs.len())?;
        let threshold = self.threshold;

        let outcomes: Vec<(String, Result<String, Error>)> = pool.install(|| {
            jobs.par_iter()
                .map(|job| {
                    let outcome = job.run(cloner, threshold);
                    match &outcome {
                        Ok(_) => info!("Finished cloning the {} repositories", job.language),
                        Err(e) => warn!("Cloning the {} repositories failed, {}", job.language, e),
                    }
                    (job.language.clone(), outcome)
                })
                .collect()
        });

        Ok(outcomes)
    }

    pub fn worker_count(&self, jobs: usize) -> usize {
        let wanted = if self.threads == 0 {
            jobs
        } else {
            self.threads.min(jobs)
        };

        wanted.max(1)
    }

    fn pool(&self, jobs: usize) -> Result<ThreadPool, Error> {
        let workers = self.worker_count(jobs);
        debug!("Starting {} workers for {} jobs", workers, jobs);

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("clone-worker-{}", i))
            .build()
            .context("Unable to start the worker pool")?;

        Ok(pool)
    }
}
