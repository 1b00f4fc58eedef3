use crate::config::Config;
use crate::git::{Cloner, Git2Cloner};
use crate::github::GitHub;
use crate::repo::{group_by_language, Repository};
use crate::scheduler::Scheduler;
use failure::{Error, Fail};
use std::fmt::{self, Debug, Formatter};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Ties everything together: list, group, clone, report.
#[derive(Clone)]
pub struct Driver {
    config: Config,
    token: String,
    username: String,
    root: PathBuf,
}

impl Driver {
    pub fn new<T, U, P>(config: Config, token: T, username: U, root: P) -> Driver
    where
        T: Into<String>,
        U: Into<String>,
        P: Into<PathBuf>,
    {
        Driver {
            config,
            token: token.into(),
            username: username.into(),
            root: root.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn run(&self) -> Result<(), Error> {
        let github = GitHub::new(self.config.github.clone(), self.token.as_str());

        let login = github.authenticate()?;
        if !login.eq_ignore_ascii_case(&self.username) {
            warn!(
                "Authenticated as {} but cloning the public repositories of {}",
                login, self.username
            );
        }

        let raw = github.repositories(&self.username)?;
        let repos = Repository::from_listing(raw);
        info!("Found {} repositories for {}", repos.len(), self.username);

        self.clone_all(repos, &Git2Cloner)?;

        println!(
            "Done cloning public repositories of {}, navigate to: {} to witness this magic",
            self.username,
            self.root.display()
        );

        Ok(())
    }

    /// Group `repos` by language and clone every group concurrently,
    /// returning the languages which were cloned successfully.
    ///
    /// Every group is allowed to finish before any failures are reported.
    pub fn clone_all<C>(&self, repos: Vec<Repository>, cloner: &C) -> Result<Vec<String>, Error>
    where
        C: Cloner + ?Sized,
    {
        let groups = group_by_language(repos);
        debug!("Sorted the repositories into {} languages", groups.len());

        let scheduler = Scheduler::from_config(&self.config);
        let jobs = scheduler.jobs(&self.root, groups);
        let outcomes = scheduler.run(&jobs, cloner)?;

        let mut cloned = Vec::new();
        let mut errors = Vec::new();

        for (language, outcome) in outcomes {
            match outcome {
                Ok(lang) => cloned.push(lang),
                Err(e) => errors.push((language, e)),
            }
        }

        if errors.is_empty() {
            Ok(cloned)
        } else {
            Err(CloneFailure { errors }.into())
        }
    }
}

impl Debug for Driver {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Driver")
            .field("config", &self.config)
            .field("username", &self.username)
            .field("root", &self.root)
            .finish()
    }
}

#[derive(Debug, Fail)]
#[fail(display = "One or more languages couldn't be cloned")]
pub struct CloneFailure {
    errors: Vec<(String, Error)>,
}

impl CloneFailure {
    /// The languages whose clones failed.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|(lang, _)| lang.as_str())
    }

    pub fn display<W: Write>(&self, writer: &mut W) -> Result<(), Error> {
        writeln!(
            writer,
            "There were {} errors cloning repositories",
            self.errors.len()
        )?;

        for (language, err) in &self.errors {
            writeln!(writer, "Error: {} failed with {}", language, err)?;
            for cause in err.iter_causes() {
                writeln!(writer, "\tCaused By: {}", cause)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::FailedRequest;
    use crate::mock_github::{self, Route};
    use crate::progress::Progress;
    use failure::ResultExt;
    use std::fs;
    use tempfile::TempDir;

    /// Clones by creating an empty directory, unless the URL says otherwise.
    struct DirCloner;

    impl Cloner for DirCloner {
        fn clone_repo(
            &self,
            url: &str,
            dest: &Path,
            progress: &mut dyn Progress,
        ) -> Result<(), Error> {
            progress.start(0);

            if url.contains("broken") {
                let err: Result<(), Error> = Err(format_err!("connection reset"));
                err.context("Unable to clone")?;
            }

            fs::create_dir_all(dest)?;
            Ok(())
        }
    }

    fn repo(name: &str, language: &str) -> Repository {
        Repository::new(name, language, format!("https://github.com/someone/{}", name))
    }

    fn driver() -> (Driver, TempDir) {
        let temp = tempfile::tempdir().unwrap();
        let driver = Driver::new(Config::default(), "token", "someone", temp.path());
        (driver, temp)
    }

    #[test]
    fn clone_into_language_directories() {
        let (driver, temp) = driver();
        let repos = vec![
            repo("dotfiles", "unknown"),
            repo("notebooks", "Jupyter Notebook"),
            repo("githuber", "Rust"),
        ];

        let cloned = driver.clone_all(repos, &DirCloner).unwrap();

        assert_eq!(cloned, vec!["unknown", "Jupyter Notebook", "Rust"]);
        assert!(temp.path().join("unknown").join("dotfiles").is_dir());
        assert!(temp.path().join("jupyter-notebook").join("notebooks").is_dir());
        assert!(temp.path().join("rust").join("githuber").is_dir());
    }

    #[test]
    fn failures_are_reported_after_everything_settles() {
        let (driver, temp) = driver();
        let repos = vec![
            repo("fine", "Go"),
            repo("broken", "Go"),
            repo("never-cloned", "Go"),
            repo("also-fine", "Rust"),
            repo("script", "Shell"),
        ];

        let err = driver.clone_all(repos, &DirCloner).unwrap_err();

        let failure = err.downcast_ref::<CloneFailure>().unwrap();
        assert_eq!(failure.languages().collect::<Vec<_>>(), vec!["Go"]);

        assert!(temp.path().join("go").join("fine").is_dir());
        assert!(!temp.path().join("go").join("never-cloned").exists());
        assert!(temp.path().join("rust").join("also-fine").is_dir());
        assert!(temp.path().join("shell").join("script").is_dir());
    }

    #[test]
    fn failure_report_includes_causes() {
        let (driver, _temp) = driver();

        let err = driver
            .clone_all(vec![repo("broken", "C++")], &DirCloner)
            .unwrap_err();
        let failure = err.downcast_ref::<CloneFailure>().unwrap();

        let mut buffer = Vec::new();
        failure.display(&mut buffer).unwrap();
        let got = String::from_utf8(buffer).unwrap();

        assert!(got.contains("There were 1 errors"));
        assert!(got.contains("Error: C++ failed with Unable to clone"));
        assert!(got.contains("Caused By: connection reset"));
    }

    #[test]
    fn no_repositories_is_not_an_error() {
        let (driver, _temp) = driver();

        let cloned = driver.clone_all(Vec::new(), &DirCloner).unwrap();

        assert!(cloned.is_empty());
    }

    #[test]
    fn debug_output_hides_the_token() {
        let driver = Driver::new(Config::default(), "hunter2", "someone", "/tmp");

        let got = format!("{:?}", driver);

        assert!(!got.contains("hunter2"));
        assert!(got.contains("someone"));
    }

    fn driver_against(routes: Vec<Route>) -> (Driver, TempDir) {
        let temp = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.github.api_root = mock_github::serve(routes);
        let driver = Driver::new(config, "token", "someone", temp.path().join("backups"));
        (driver, temp)
    }

    #[test]
    fn a_rejected_token_stops_before_anything_is_cloned() {
        let (driver, _temp) = driver_against(vec![Route::new(
            "/user",
            401,
            r#"{"message": "Bad credentials"}"#,
        )]);

        let err = driver.run().unwrap_err();

        assert!(err.downcast_ref::<CloneFailure>().is_none());
        let got = err
            .iter_chain()
            .filter_map(|cause| cause.downcast_ref::<FailedRequest>())
            .next()
            .unwrap();
        assert_eq!(got.status.as_u16(), 401);
        assert!(!driver.root().exists());
    }

    #[test]
    fn a_failed_listing_stops_before_anything_is_cloned() {
        let (driver, _temp) = driver_against(vec![
            Route::new("/user", 200, r#"{"login": "someone"}"#),
            Route::new("/users/someone/repos", 500, r#"{"message": "Server Error"}"#),
        ]);

        let err = driver.run().unwrap_err();

        assert!(err.downcast_ref::<CloneFailure>().is_none());
        assert!(!driver.root().exists());
    }

    #[test]
    fn a_different_login_still_clones_the_requested_user() {
        let (driver, _temp) = driver_against(vec![
            Route::new("/user", 200, r#"{"login": "somebody-else"}"#),
            Route::new("/users/someone/repos", 200, "[]"),
        ]);

        driver.run().unwrap();

        assert!(!driver.root().exists());
    }

    #[test]
    fn the_login_comparison_ignores_case() {
        let (driver, _temp) = driver_against(vec![
            Route::new("/user", 200, r#"{"login": "SomeOne"}"#),
            Route::new("/users/someone/repos", 200, "[]"),
        ]);

        assert!(driver.run().is_ok());
    }
}
