use crate::github::RawRepo;
use std::path::{Path, PathBuf};

/// The language assigned to repositories GitHub couldn't classify.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// A repository we want to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub name: String,
    pub language: String,
    pub clone_url: String,
}

impl Repository {
    pub fn new<N, L, U>(name: N, language: L, clone_url: U) -> Repository
    where
        N: Into<String>,
        L: Into<String>,
        U: Into<String>,
    {
        Repository {
            name: name.into(),
            language: language.into(),
            clone_url: clone_url.into(),
        }
    }

    /// Turn a raw listing into repositories, smallest first.
    ///
    /// The sort is stable, so repositories with the same size keep the order
    /// GitHub returned them in.
    pub fn from_listing(mut raw: Vec<RawRepo>) -> Vec<Repository> {
        raw.sort_by_key(|r| r.size);
        raw.into_iter().map(Repository::from).collect()
    }
}

impl From<RawRepo> for Repository {
    fn from(raw: RawRepo) -> Repository {
        let language = match raw.language {
            Some(ref lang) if !lang.is_empty() => lang.clone(),
            _ => UNKNOWN_LANGUAGE.to_string(),
        };

        Repository {
            name: raw.name,
            language,
            clone_url: raw.clone_url,
        }
    }
}

/// Every repository sharing the same (raw) primary language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageGroup {
    pub key: String,
    pub members: Vec<Repository>,
}

impl LanguageGroup {
    /// The directory this group's repositories get cloned into.
    pub fn base_dir(&self, root: &Path) -> PathBuf {
        root.join(normalize(&self.key))
    }
}

/// Group repositories by their *raw* language, keeping both the order groups
/// were first seen and the order of members within a group.
///
/// Normalisation is only applied when building paths, so `"Go"` and `"go"`
/// end up as two groups sharing one directory.
pub fn group_by_language<I>(repos: I) -> Vec<LanguageGroup>
where
    I: IntoIterator<Item = Repository>,
{
    let mut groups: Vec<LanguageGroup> = Vec::new();

    for repo in repos {
        match groups.iter_mut().find(|g| g.key == repo.language) {
            Some(group) => group.members.push(repo),
            None => groups.push(LanguageGroup {
                key: repo.language.clone(),
                members: vec![repo],
            }),
        }
    }

    groups
}

/// Turn a language name into something usable as a directory name.
///
/// Only lower-cases and swaps spaces for hyphens, so `"C++"` stays `"c++"`.
pub fn normalize(language: &str) -> String {
    language.to_lowercase().replace(' ', "-")
}
