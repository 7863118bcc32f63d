//! Newtype wrappers for domain identifiers.
//!
//! These types prevent accidental mixing of different ID types (e.g., using a
//! MemoryId where a ProjectId is expected) and make the code more
//! self-documenting.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A git commit SHA (40 hex characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitSha(pub String);

impl CommitSha {
    /// Creates a new CommitSha from a string.
    ///
    /// Note: This does not validate the format. Valid SHAs are 40 hex characters.
    pub fn new(s: impl Into<String>) -> Self {
        CommitSha(s.into())
    }

    /// Returns the SHA as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a short (7-character) version of the SHA for display.
    pub fn short(&self) -> &str {
        // Use get() to avoid panic on short or non-ASCII input.
        self.0.get(..7).unwrap_or(&self.0)
    }
}

impl fmt::Display for CommitSha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CommitSha {
    fn from(s: String) -> Self {
        CommitSha(s)
    }
}

impl From<&str> for CommitSha {
    fn from(s: &str) -> Self {
        CommitSha(s.to_string())
    }
}

/// A tracked project's identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub String);

impl ProjectId {
    /// Generates a fresh, globally unique project identifier.
    pub fn generate() -> Self {
        ProjectId(format!("project_{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        ProjectId(s.to_string())
    }
}

/// A saved pet memory's identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryId(pub String);

impl MemoryId {
    /// Generates a fresh, globally unique memory identifier.
    pub fn generate() -> Self {
        MemoryId(format!("memory_{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MemoryId {
    fn from(s: &str) -> Self {
        MemoryId(s.to_string())
    }
}

/// Error returned when a repository URL cannot be parsed into owner + name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a recognizable GitHub repository URL: {url}")]
pub struct InvalidRepoUrl {
    /// The input that failed to parse.
    pub url: String,
}

/// A repository reference (owner/name format).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        RepoRef {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parses a `github.com/<owner>/<repo>` URL into a reference.
    ///
    /// Accepts https/ssh-ish prefixes and trailing path segments; a trailing
    /// `.git` on the repository name is stripped. Fails fast (no network) on
    /// anything that doesn't contain an owner and repo after `github.com/`.
    pub fn parse_url(url: &str) -> Result<Self, InvalidRepoUrl> {
        let invalid = || InvalidRepoUrl {
            url: url.to_string(),
        };

        let idx = url.find("github.com/").ok_or_else(invalid)?;
        let rest = &url[idx + "github.com/".len()..];

        let mut segments = rest.split('/').filter(|s| !s.is_empty());
        let owner = segments.next().ok_or_else(invalid)?;
        let name = segments.next().ok_or_else(invalid)?;
        let name = name.strip_suffix(".git").unwrap_or(name);

        if owner.is_empty() || name.is_empty() {
            return Err(invalid());
        }

        Ok(RepoRef::new(owner, name))
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod commit_sha {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn serde_roundtrip(s in "[0-9a-f]{40}") {
                let sha = CommitSha::new(&s);
                let json = serde_json::to_string(&sha).unwrap();
                let parsed: CommitSha = serde_json::from_str(&json).unwrap();
                prop_assert_eq!(sha, parsed);
            }

            #[test]
            fn short_returns_7_chars(s in "[0-9a-f]{40}") {
                let sha = CommitSha::new(&s);
                prop_assert_eq!(sha.short().len(), 7);
                prop_assert_eq!(sha.short(), &s[..7]);
            }
        }

        #[test]
        fn short_handles_short_input() {
            let sha = CommitSha::new("abc");
            assert_eq!(sha.short(), "abc");
        }
    }

    mod repo_ref {
        use super::*;
        use proptest::prelude::*;

        #[test]
        fn parses_https_url() {
            let r = RepoRef::parse_url("https://github.com/octocat/hello-world").unwrap();
            assert_eq!(r, RepoRef::new("octocat", "hello-world"));
        }

        #[test]
        fn strips_dot_git_suffix() {
            let r = RepoRef::parse_url("https://github.com/octocat/hello-world.git").unwrap();
            assert_eq!(r.name, "hello-world");
        }

        #[test]
        fn ignores_trailing_path_segments() {
            let r = RepoRef::parse_url("https://github.com/octocat/hello-world/tree/main").unwrap();
            assert_eq!(r, RepoRef::new("octocat", "hello-world"));
        }

        #[test]
        fn accepts_bare_host_form() {
            let r = RepoRef::parse_url("github.com/octocat/hello-world").unwrap();
            assert_eq!(r, RepoRef::new("octocat", "hello-world"));
        }

        #[test]
        fn rejects_non_github_urls() {
            assert!(RepoRef::parse_url("https://gitlab.com/foo/bar").is_err());
            assert!(RepoRef::parse_url("hello-world").is_err());
        }

        #[test]
        fn rejects_missing_repo_name() {
            assert!(RepoRef::parse_url("https://github.com/octocat").is_err());
            assert!(RepoRef::parse_url("https://github.com/octocat/").is_err());
        }

        proptest! {
            #[test]
            fn serde_roundtrip(
                owner in "[a-zA-Z][a-zA-Z0-9-]{0,38}",
                name in "[a-zA-Z][a-zA-Z0-9_-]{0,99}"
            ) {
                let r = RepoRef::new(&owner, &name);
                let json = serde_json::to_string(&r).unwrap();
                let parsed: RepoRef = serde_json::from_str(&json).unwrap();
                prop_assert_eq!(r, parsed);
            }

            #[test]
            fn display_format(
                owner in "[a-zA-Z][a-zA-Z0-9-]{0,38}",
                name in "[a-zA-Z][a-zA-Z0-9_-]{0,99}"
            ) {
                let r = RepoRef::new(&owner, &name);
                prop_assert_eq!(format!("{}", r), format!("{}/{}", owner, name));
            }

            #[test]
            fn url_roundtrip(
                owner in "[a-zA-Z][a-zA-Z0-9-]{0,38}",
                name in "[a-zA-Z][a-zA-Z0-9_-]{0,38}"
            ) {
                let url = format!("https://github.com/{}/{}", owner, name);
                let parsed = RepoRef::parse_url(&url).unwrap();
                prop_assert_eq!(parsed, RepoRef::new(&owner, &name));
            }
        }
    }

    mod generated_ids {
        use super::*;

        #[test]
        fn project_ids_are_unique() {
            let a = ProjectId::generate();
            let b = ProjectId::generate();
            assert_ne!(a, b);
            assert!(a.as_str().starts_with("project_"));
        }

        #[test]
        fn memory_ids_are_unique() {
            let a = MemoryId::generate();
            let b = MemoryId::generate();
            assert_ne!(a, b);
            assert!(a.as_str().starts_with("memory_"));
        }
    }
}
