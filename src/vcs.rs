use clap::ValueEnum;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

/// Order in which git tags are returned, newest first in both cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortCriteria {
    Version,
    Alphabetic,
}

impl SortCriteria {
    fn git_sort_key(self) -> &'static str {
        match self {
            SortCriteria::Version => "-v:refname",
            SortCriteria::Alphabetic => "-refname",
        }
    }
}

/// Reads commit hashes and tags from a local repository through the `git` binary.
#[derive(Debug, Clone)]
pub struct GitRepository {
    path: PathBuf,
}

impl GitRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Commit hashes reachable from HEAD, newest first. A `limit` of 0 means all.
    pub async fn commit_hashes(&self, limit: usize) -> Result<Vec<String>> {
        let max_count = format!("--max-count={}", limit);
        let mut args = vec!["rev-list"];
        if limit > 0 {
            args.push(&max_count);
        }
        args.push("HEAD");
        self.git(&args).await
    }

    pub async fn tags(&self, sort: SortCriteria) -> Result<Vec<String>> {
        let sort_arg = format!("--sort={}", sort.git_sort_key());
        self.git(&["tag", "--list", &sort_arg]).await
    }

    async fn git(&self, args: &[&str]) -> Result<Vec<String>> {
        let command = args.join(" ");
        debug!("Running git {} in {}", command, self.path.display());
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.path)
            .args(args)
            .output()
            .await
            .map_err(|e| Error::Vcs {
                command: command.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(Error::Vcs {
                command,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(parse_lines(&String::from_utf8_lossy(&output.stdout)))
    }
}

fn parse_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lines() {
        assert_eq!(
            parse_lines("v1.2.0\n v1.1.0 \n\nv1.0.0\n"),
            vec!["v1.2.0", "v1.1.0", "v1.0.0"]
        );
        assert!(parse_lines("").is_empty());
    }

    #[test]
    fn test_sort_keys() {
        assert_eq!(SortCriteria::Version.git_sort_key(), "-v:refname");
        assert_eq!(SortCriteria::Alphabetic.git_sort_key(), "-refname");
    }

    #[tokio::test]
    async fn test_missing_repository_is_an_error() {
        let repo = GitRepository::new("/nonexistent/seiso-test-repo");
        assert!(matches!(repo.tags(SortCriteria::Version).await, Err(Error::Vcs { .. })));
    }
}
