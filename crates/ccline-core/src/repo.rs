//! Repository identity resolution with per-run caching.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Resolves a working directory to a stable, human-readable project
/// identity: the repository name from the git remote URL, or the
/// directory basename when no repository is found.
///
/// Results are memoized per path for the lifetime of the resolver. One
/// resolver is created per run and discarded with it, so state never
/// leaks across runs. The cache is a `Mutex` so resolution can happen
/// from parallel workers.
#[derive(Debug, Default)]
pub struct RepoResolver {
    cache: Mutex<HashMap<PathBuf, Option<String>>>,
}

impl RepoResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a directory to its project identity.
    ///
    /// Walks parent directories until a git marker with a usable remote
    /// is found; a missing or malformed marker is a normal case that
    /// collapses to the basename of the original directory. Never fails.
    #[must_use]
    pub fn resolve(&self, directory: &str) -> String {
        self.repository_name(Path::new(directory))
            .unwrap_or_else(|| directory_basename(directory))
    }

    /// Repository name for `directory` itself or any of its ancestors,
    /// or `None` when nothing up to the filesystem root has one.
    #[must_use]
    pub fn repository_name(&self, path: &Path) -> Option<String> {
        // Relative paths (notably the "unknown" placeholder) would probe
        // the filesystem relative to the process cwd; never do that.
        if !path.is_absolute() {
            return None;
        }

        if let Some(cached) = self.cache().get(path) {
            return cached.clone();
        }

        let resolved = repo_name_at(path)
            .or_else(|| path.parent().and_then(|parent| self.repository_name(parent)));

        self.cache()
            .insert(path.to_path_buf(), resolved.clone());
        resolved
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<PathBuf, Option<String>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Whether `directory` hosts a canonical checkout: a `.git` directory,
/// as opposed to the `.git` file of a linked worktree.
#[must_use]
pub fn is_canonical_checkout(directory: &str) -> bool {
    Path::new(directory).join(".git").is_dir()
}

/// Repository name from the git marker at exactly this path, if any.
fn repo_name_at(path: &Path) -> Option<String> {
    let marker = path.join(".git");
    let meta = fs::metadata(&marker).ok()?;

    let config_path = if meta.is_dir() {
        marker.join("config")
    } else {
        // Linked worktree: `.git` is a file pointing at the real git dir.
        let content = fs::read_to_string(&marker).ok()?;
        let git_dir = content.trim().strip_prefix("gitdir: ")?;
        let git_dir = if Path::new(git_dir).is_absolute() {
            PathBuf::from(git_dir)
        } else {
            path.join(git_dir)
        };

        // A worktree git dir keeps no config of its own; `commondir`
        // points at the shared storage that does.
        match fs::read_to_string(git_dir.join("commondir")) {
            Ok(common) => git_dir.join(common.trim()).join("config"),
            Err(_) => git_dir.join("config"),
        }
    };

    let config = fs::read_to_string(&config_path).ok()?;
    remote_name_from_config(&config)
}

/// First usable repository name from the `url = ...` lines of a git
/// config file.
fn remote_name_from_config(content: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            let rest = line.strip_prefix("url")?.trim_start();
            rest.strip_prefix('=').map(str::trim)
        })
        .find_map(parse_remote_name)
}

/// Extract the repository name from a git remote URL.
///
/// Handles both URL forms (`https://host/user/repo.git`) and scp-like
/// forms (`git@host:user/repo.git`), stripping the conventional `.git`
/// suffix.
#[must_use]
pub fn parse_remote_name(url: &str) -> Option<String> {
    let tail = url.rsplit('/').next().unwrap_or(url);
    let tail = tail.rsplit(':').next().unwrap_or(tail);
    let name = tail.trim_end_matches(".git");

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Final path component of a directory, tolerating trailing slashes.
fn directory_basename(directory: &str) -> String {
    Path::new(directory.trim_end_matches('/'))
        .file_name()
        .and_then(|n| n.to_str())
        .map_or_else(|| "unknown".to_string(), str::to_string)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn write_git_config(repo_dir: &Path, url: &str) {
        let git_dir = repo_dir.join(".git");
        fs::create_dir_all(&git_dir).unwrap();
        fs::write(
            git_dir.join("config"),
            format!("[remote \"origin\"]\n\turl = {url}\n\tfetch = +refs/heads/*:refs/remotes/origin/*\n"),
        )
        .unwrap();
    }

    #[test]
    fn test_parse_remote_name_url_forms() {
        assert_eq!(
            parse_remote_name("https://github.com/user/ccline.git"),
            Some("ccline".to_string())
        );
        assert_eq!(
            parse_remote_name("git@github.com:user/dotfiles.git"),
            Some("dotfiles".to_string())
        );
        assert_eq!(
            parse_remote_name("git@host:flat-repo.git"),
            Some("flat-repo".to_string())
        );
        assert_eq!(
            parse_remote_name("https://github.com/user/no-suffix"),
            Some("no-suffix".to_string())
        );
        assert_eq!(parse_remote_name(""), None);
    }

    #[test]
    fn test_resolve_reads_remote_from_config() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("checkout");
        fs::create_dir(&repo).unwrap();
        write_git_config(&repo, "git@github.com:user/upstream-name.git");

        let resolver = RepoResolver::new();
        assert_eq!(resolver.resolve(repo.to_str().unwrap()), "upstream-name");
    }

    #[test]
    fn test_resolve_walks_parent_directories() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("checkout");
        let nested = repo.join("src").join("deep");
        fs::create_dir_all(&nested).unwrap();
        write_git_config(&repo, "https://github.com/user/walked.git");

        let resolver = RepoResolver::new();
        assert_eq!(resolver.resolve(nested.to_str().unwrap()), "walked");
    }

    #[test]
    fn test_resolve_falls_back_to_basename() {
        let temp = TempDir::new().unwrap();
        let plain = temp.path().join("just-a-dir");
        fs::create_dir(&plain).unwrap();

        let resolver = RepoResolver::new();
        assert_eq!(resolver.resolve(plain.to_str().unwrap()), "just-a-dir");
    }

    #[test]
    fn test_resolve_missing_directory_uses_basename() {
        let resolver = RepoResolver::new();
        assert_eq!(resolver.resolve("/no/such/place/anywhere"), "anywhere");
    }

    #[test]
    fn test_resolve_marker_without_remote_falls_back() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("local-only");
        let git_dir = repo.join(".git");
        fs::create_dir_all(&git_dir).unwrap();
        fs::write(git_dir.join("config"), "[core]\n\tbare = false\n").unwrap();

        let resolver = RepoResolver::new();
        assert_eq!(resolver.resolve(repo.to_str().unwrap()), "local-only");
    }

    #[test]
    fn test_resolve_linked_worktree_with_commondir() {
        let temp = TempDir::new().unwrap();

        // Canonical checkout with the shared config.
        let main = temp.path().join("main");
        write_git_config(&main, "git@github.com:user/shared-repo.git");

        // Worktree metadata lives under the main .git dir.
        let worktree_git_dir = main.join(".git").join("worktrees").join("wt1");
        fs::create_dir_all(&worktree_git_dir).unwrap();
        fs::write(worktree_git_dir.join("commondir"), "../..\n").unwrap();

        // The worktree itself has a .git *file* pointing at that dir.
        let worktree = temp.path().join("wt1");
        fs::create_dir(&worktree).unwrap();
        fs::write(
            worktree.join(".git"),
            format!("gitdir: {}\n", worktree_git_dir.display()),
        )
        .unwrap();

        let resolver = RepoResolver::new();
        assert_eq!(resolver.resolve(worktree.to_str().unwrap()), "shared-repo");
    }

    #[test]
    fn test_resolve_worktree_file_without_gitdir_prefix() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("odd");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join(".git"), "not a pointer\n").unwrap();

        let resolver = RepoResolver::new();
        assert_eq!(resolver.resolve(dir.to_str().unwrap()), "odd");
    }

    #[test]
    fn test_resolution_is_memoized_and_deterministic() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("repo");
        let nested = repo.join("sub");
        fs::create_dir_all(&nested).unwrap();
        write_git_config(&repo, "https://github.com/user/cached.git");

        let resolver = RepoResolver::new();
        let first = resolver.resolve(nested.to_str().unwrap());

        // Removing the marker must not change cached answers within a run.
        fs::remove_dir_all(repo.join(".git")).unwrap();
        let second = resolver.resolve(nested.to_str().unwrap());
        assert_eq!(first, second);

        // A fresh resolver sees the new filesystem state.
        let fresh = RepoResolver::new();
        assert_eq!(fresh.resolve(nested.to_str().unwrap()), "sub");
    }

    #[test]
    fn test_is_canonical_checkout() {
        let temp = TempDir::new().unwrap();
        let main = temp.path().join("main");
        write_git_config(&main, "git@github.com:user/r.git");
        let worktree = temp.path().join("wt");
        fs::create_dir(&worktree).unwrap();
        fs::write(worktree.join(".git"), "gitdir: /elsewhere\n").unwrap();

        assert!(is_canonical_checkout(main.to_str().unwrap()));
        assert!(!is_canonical_checkout(worktree.to_str().unwrap()));
        assert!(!is_canonical_checkout(temp.path().to_str().unwrap()));
    }

    #[test]
    fn test_directory_basename_handles_trailing_slash() {
        assert_eq!(directory_basename("/home/sami/project/"), "project");
        assert_eq!(directory_basename("/"), "unknown");
        assert_eq!(directory_basename("unknown"), "unknown");
    }
}
