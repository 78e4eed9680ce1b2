// file: src/sync/synchronizer.rs
// description: bounded-concurrency clone/update orchestration over a command runner
// reference: orchestrates ssh verification and per-repository git subprocess chains

use crate::config::{Config, RepositoryDescriptor};
use crate::error::{Result, SyncError};
use crate::process::{CommandOutput, CommandRunner};
use crate::sync::outcome::SyncOutcome;
use crate::sync::progress::{ProgressTracker, SyncStats};
use crate::utils::logging::format_success;
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

pub struct Synchronizer {
    config: Config,
    runner: Arc<dyn CommandRunner>,
}

impl Synchronizer {
    pub fn new(config: Config, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    /// Probe SSH authentication against the Git host. The host answers the
    /// `-T` probe with a greeting on stderr and a non-zero exit even when
    /// authentication succeeds, so success is detected by scanning stderr
    /// for the configured marker.
    pub async fn verify_access(&self) -> Result<bool> {
        let target = format!("{}@{}", self.config.git.ssh_user, self.config.git.host);
        let output = self.runner.run("ssh", &["-T", &target], None).await?;

        let marker = self.config.git.auth_marker.to_lowercase();
        Ok(output.stderr.to_lowercase().contains(&marker))
    }

    /// Bring one repository into sync. Every failure is converted into a
    /// terminal [`SyncOutcome`] here; nothing propagates out of the task.
    pub async fn sync_repository(&self, repo: &RepositoryDescriptor) -> SyncOutcome {
        let path = self.config.repo_path(&repo.name);
        let expected = self.config.remote_url(&repo.name);

        info!("Processing repository: {}", repo.name);

        if !path.exists() {
            debug!("{} not present, cloning", repo.name);
            return match self.clone_repository(&repo.name, &path).await {
                Ok(()) => SyncOutcome::Cloned,
                Err(reason) => SyncOutcome::CloneFailed(reason),
            };
        }

        debug!("{} exists, verifying remote", repo.name);
        let actual = match self.current_remote(&path).await {
            Ok(url) => url,
            Err(reason) => {
                // Existing directory whose remote cannot be read is left
                // alone, same as a wrong remote.
                return SyncOutcome::RemoteMismatch {
                    expected,
                    actual: format!("(unreadable: {})", reason),
                };
            }
        };

        if actual != expected {
            return SyncOutcome::RemoteMismatch { expected, actual };
        }

        match self.update(&path).await {
            Ok(()) => SyncOutcome::Updated,
            Err(reason) => SyncOutcome::UpdateFailed(reason),
        }
    }

    /// Ensure the base directory exists, gate on SSH access, then fan out
    /// one task per descriptor under the shared semaphore. Individual
    /// failures are reported and counted, never fatal.
    pub async fn run(&self) -> Result<SyncStats> {
        info!("Initializing project: {}", self.config.project.name);

        let base_dir = &self.config.workspace.base_dir;
        tokio::fs::create_dir_all(base_dir)
            .await
            .map_err(|e| SyncError::Workspace {
                path: base_dir.clone(),
                source: e,
            })?;

        info!("Verifying SSH access to {}", self.config.git.host);
        match self.verify_access().await {
            Ok(true) => info!("SSH access verified"),
            Ok(false) => {
                return Err(SyncError::SshVerification(format!(
                    "could not authenticate to {}@{}; check your SSH configuration",
                    self.config.git.ssh_user, self.config.git.host
                )));
            }
            Err(e) => return Err(SyncError::SshVerification(e.to_string())),
        }

        let total = self.config.repositories.len();
        let limit = self.config.git.max_concurrent.max(1);
        info!(
            "Synchronizing {} repositories with {} concurrent tasks",
            total, limit
        );

        let tracker = ProgressTracker::new(total);
        let tracker = &tracker;
        let semaphore = Arc::new(Semaphore::new(limit));

        let outcomes: Vec<SyncOutcome> = stream::iter(self.config.repositories.iter().map(
            |repo| {
                let semaphore = Arc::clone(&semaphore);

                async move {
                    let outcome = match semaphore.acquire_owned().await {
                        Ok(_permit) => self.sync_repository(repo).await,
                        Err(_) => {
                            SyncOutcome::UpdateFailed("concurrency limiter closed".to_string())
                        }
                    };

                    tracker.println(&outcome.render(&repo.name));
                    tracker.record(&outcome);
                    outcome
                }
            },
        ))
        .buffer_unordered(limit)
        .collect()
        .await;

        debug!("all {} repository tasks finished", outcomes.len());

        tracker.finish();
        let stats = tracker.get_stats();

        if stats.failed() > 0 {
            warn!(
                "{} of {} repositories reported failures",
                stats.failed(),
                total
            );
        }
        self.log_summary(&stats);

        println!("\n{}", format_success("Project initialization complete"));

        Ok(stats)
    }

    async fn current_remote(&self, path: &Path) -> std::result::Result<String, String> {
        let output = self
            .run_git(&["remote", "get-url", "origin"], path, "remote get-url")
            .await?;
        Ok(output.stdout_trimmed().to_string())
    }

    async fn update(&self, path: &Path) -> std::result::Result<(), String> {
        self.run_git(&["fetch"], path, "fetch").await?;

        let branch_output = self
            .run_git(&["rev-parse", "--abbrev-ref", "HEAD"], path, "rev-parse")
            .await?;
        let branch = branch_output.stdout_trimmed().to_string();
        if branch.is_empty() {
            return Err("could not determine current branch".to_string());
        }

        self.run_git(&["pull", "origin", &branch], path, "pull").await?;
        Ok(())
    }

    async fn clone_repository(
        &self,
        repo_name: &str,
        path: &Path,
    ) -> std::result::Result<(), String> {
        let url = self.config.remote_url(repo_name);
        let target = path.display().to_string();

        let output = self
            .runner
            .run("git", &["clone", &url, &target], None)
            .await
            .map_err(|e| e.to_string())?;

        if !output.success() {
            return Err(stderr_summary(&output));
        }

        Ok(())
    }

    async fn run_git(
        &self,
        args: &[&str],
        cwd: &Path,
        what: &str,
    ) -> std::result::Result<CommandOutput, String> {
        let output = self
            .runner
            .run("git", args, Some(cwd))
            .await
            .map_err(|e| e.to_string())?;

        if !output.success() {
            return Err(format!("git {} failed: {}", what, stderr_summary(&output)));
        }

        Ok(output)
    }

    fn log_summary(&self, stats: &SyncStats) {
        info!("=== Workspace Sync Summary ===");
        info!("Duration: {} seconds", stats.duration_secs);
        info!("Repositories cloned: {}", stats.cloned);
        info!("Repositories updated: {}", stats.updated);
        info!("Remote mismatches: {}", stats.mismatched);
        info!("Clone failures: {}", stats.clone_failures);
        info!("Update failures: {}", stats.update_failures);
        info!("Success rate: {:.2}%", stats.success_rate());
        info!("==============================");
    }
}

fn stderr_summary(output: &CommandOutput) -> String {
    match output.stderr.lines().find(|line| !line.trim().is_empty()) {
        Some(line) => line.trim().to_string(),
        None => format!("exit code {:?}", output.exit_code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GitConfig, ProjectConfig, WorkspaceConfig};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    /// Scripted command runner that records every invocation and tracks the
    /// concurrent-call high-water mark.
    struct FakeRunner {
        ssh_ok: bool,
        origin_url: Option<String>,
        branch: String,
        fail_clone: bool,
        fail_pull: bool,
        delay: Duration,
        calls: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        high_water: AtomicUsize,
    }

    impl FakeRunner {
        fn new() -> Self {
            Self {
                ssh_ok: true,
                origin_url: None,
                branch: "main".to_string(),
                fail_clone: false,
                fail_pull: false,
                delay: Duration::ZERO,
                calls: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                high_water: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn count_matching(&self, needle: &str) -> usize {
            self.calls()
                .iter()
                .filter(|call| call.contains(needle))
                .count()
        }

        fn ok(stdout: &str) -> crate::error::Result<CommandOutput> {
            Ok(CommandOutput {
                exit_code: Some(0),
                stdout: stdout.to_string(),
                stderr: String::new(),
            })
        }

        fn failure(stderr: &str) -> crate::error::Result<CommandOutput> {
            Ok(CommandOutput {
                exit_code: Some(128),
                stdout: String::new(),
                stderr: stderr.to_string(),
            })
        }
    }

    #[async_trait]
    impl CommandRunner for FakeRunner {
        async fn run(
            &self,
            program: &str,
            args: &[&str],
            _cwd: Option<&Path>,
        ) -> crate::error::Result<CommandOutput> {
            let signature = format!("{} {}", program, args.join(" "));
            self.calls.lock().unwrap().push(signature.clone());

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.high_water.fetch_max(now, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let result = if program == "ssh" {
                if self.ssh_ok {
                    Ok(CommandOutput {
                        exit_code: Some(1),
                        stdout: String::new(),
                        stderr: "Hi dev! You've successfully authenticated, but GitHub does \
                                 not provide shell access."
                            .to_string(),
                    })
                } else {
                    Ok(CommandOutput {
                        exit_code: Some(255),
                        stdout: String::new(),
                        stderr: "git@github.com: Permission denied (publickey).".to_string(),
                    })
                }
            } else if signature.starts_with("git remote get-url") {
                match &self.origin_url {
                    Some(url) => Self::ok(&format!("{}\n", url)),
                    None => Self::failure("fatal: not a git repository"),
                }
            } else if signature.starts_with("git fetch") {
                Self::ok("")
            } else if signature.starts_with("git rev-parse") {
                Self::ok(&format!("{}\n", self.branch))
            } else if signature.starts_with("git pull") {
                if self.fail_pull {
                    Self::failure("fatal: couldn't find remote ref")
                } else {
                    Self::ok("")
                }
            } else if signature.starts_with("git clone") {
                if self.fail_clone {
                    Self::failure("ERROR: Repository not found.")
                } else {
                    Self::ok("")
                }
            } else {
                Self::failure("unexpected command")
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    fn test_config(base: &Path, names: &[&str]) -> Config {
        Config {
            project: ProjectConfig {
                name: "gcp-kubernetes".to_string(),
                organization: "HappyPathway".to_string(),
            },
            workspace: WorkspaceConfig {
                base_dir: base.to_path_buf(),
            },
            git: GitConfig {
                host: "github.com".to_string(),
                ssh_user: "git".to_string(),
                max_concurrent: 5,
                auth_marker: "successfully authenticated".to_string(),
            },
            repositories: names
                .iter()
                .map(|name| RepositoryDescriptor::named(name))
                .collect(),
        }
    }

    fn synchronizer(config: Config, runner: Arc<FakeRunner>) -> Synchronizer {
        Synchronizer::new(config, runner)
    }

    #[test]
    fn test_verify_access_scans_stderr_marker() {
        tokio_test::block_on(async {
            let temp = TempDir::new().unwrap();

            let runner = Arc::new(FakeRunner::new());
            let sync = synchronizer(test_config(temp.path(), &[]), runner);
            assert!(sync.verify_access().await.unwrap());

            let runner = Arc::new(FakeRunner {
                ssh_ok: false,
                ..FakeRunner::new()
            });
            let sync = synchronizer(test_config(temp.path(), &[]), runner);
            assert!(!sync.verify_access().await.unwrap());
        });
    }

    #[tokio::test]
    async fn test_absent_path_clones_and_never_updates() {
        let temp = TempDir::new().unwrap();
        let runner = Arc::new(FakeRunner::new());
        let sync = synchronizer(test_config(temp.path(), &["new-repo"]), runner.clone());

        let repo = RepositoryDescriptor::named("new-repo");
        let outcome = sync.sync_repository(&repo).await;

        assert_eq!(outcome, SyncOutcome::Cloned);
        assert_eq!(runner.count_matching("git clone"), 1);
        assert_eq!(runner.count_matching("git fetch"), 0);
        assert_eq!(runner.count_matching("git pull"), 0);
        assert_eq!(runner.count_matching("git remote get-url"), 0);

        let clone_call = runner
            .calls()
            .into_iter()
            .find(|call| call.contains("git clone"))
            .unwrap();
        assert!(clone_call.contains("git@github.com:HappyPathway/new-repo.git"));
    }

    #[tokio::test]
    async fn test_matching_remote_runs_full_update_chain() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("existing")).unwrap();

        let runner = Arc::new(FakeRunner {
            origin_url: Some("git@github.com:HappyPathway/existing.git".to_string()),
            ..FakeRunner::new()
        });
        let sync = synchronizer(test_config(temp.path(), &["existing"]), runner.clone());

        let repo = RepositoryDescriptor::named("existing");
        let outcome = sync.sync_repository(&repo).await;

        assert_eq!(outcome, SyncOutcome::Updated);
        assert_eq!(runner.count_matching("git remote get-url"), 1);
        assert_eq!(runner.count_matching("git fetch"), 1);
        assert_eq!(runner.count_matching("git rev-parse --abbrev-ref HEAD"), 1);
        assert_eq!(runner.count_matching("git pull origin main"), 1);
        assert_eq!(runner.count_matching("git clone"), 0);
    }

    #[tokio::test]
    async fn test_mismatched_remote_performs_no_mutations() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("forked")).unwrap();

        let runner = Arc::new(FakeRunner {
            origin_url: Some("git@github.com:someone-else/forked.git".to_string()),
            ..FakeRunner::new()
        });
        let sync = synchronizer(test_config(temp.path(), &["forked"]), runner.clone());

        let repo = RepositoryDescriptor::named("forked");
        let outcome = sync.sync_repository(&repo).await;

        assert_eq!(
            outcome,
            SyncOutcome::RemoteMismatch {
                expected: "git@github.com:HappyPathway/forked.git".to_string(),
                actual: "git@github.com:someone-else/forked.git".to_string(),
            }
        );
        assert_eq!(runner.count_matching("git fetch"), 0);
        assert_eq!(runner.count_matching("git pull"), 0);
        assert_eq!(runner.count_matching("git clone"), 0);
    }

    #[tokio::test]
    async fn test_unreadable_remote_is_treated_as_mismatch() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("not-a-repo")).unwrap();

        let runner = Arc::new(FakeRunner::new());
        let sync = synchronizer(test_config(temp.path(), &["not-a-repo"]), runner.clone());

        let repo = RepositoryDescriptor::named("not-a-repo");
        let outcome = sync.sync_repository(&repo).await;

        assert!(matches!(outcome, SyncOutcome::RemoteMismatch { .. }));
        assert_eq!(runner.count_matching("git fetch"), 0);
        assert_eq!(runner.count_matching("git clone"), 0);
    }

    #[tokio::test]
    async fn test_clone_failure_becomes_outcome() {
        let temp = TempDir::new().unwrap();
        let runner = Arc::new(FakeRunner {
            fail_clone: true,
            ..FakeRunner::new()
        });
        let sync = synchronizer(test_config(temp.path(), &["missing"]), runner);

        let repo = RepositoryDescriptor::named("missing");
        let outcome = sync.sync_repository(&repo).await;

        match outcome {
            SyncOutcome::CloneFailed(reason) => assert!(reason.contains("Repository not found")),
            other => panic!("expected CloneFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_pull_failure_becomes_outcome() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("existing")).unwrap();

        let runner = Arc::new(FakeRunner {
            origin_url: Some("git@github.com:HappyPathway/existing.git".to_string()),
            fail_pull: true,
            ..FakeRunner::new()
        });
        let sync = synchronizer(test_config(temp.path(), &["existing"]), runner);

        let repo = RepositoryDescriptor::named("existing");
        let outcome = sync.sync_repository(&repo).await;

        match outcome {
            SyncOutcome::UpdateFailed(reason) => assert!(reason.contains("git pull failed")),
            other => panic!("expected UpdateFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_clones_all_new_repositories() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("workspace");

        let runner = Arc::new(FakeRunner::new());
        let config = test_config(&base, &["repo-a", "repo-b", "repo-c"]);
        let sync = synchronizer(config, runner.clone());

        let stats = sync.run().await.unwrap();

        assert_eq!(stats.cloned, 3);
        assert_eq!(stats.failed(), 0);
        assert_eq!(runner.count_matching("git clone"), 3);
        assert_eq!(runner.count_matching("git pull"), 0);
        assert!(base.is_dir());
    }

    #[tokio::test]
    async fn test_run_updates_single_matching_repository() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("repo-a")).unwrap();

        let runner = Arc::new(FakeRunner {
            origin_url: Some("git@github.com:HappyPathway/repo-a.git".to_string()),
            ..FakeRunner::new()
        });
        let sync = synchronizer(test_config(temp.path(), &["repo-a"]), runner.clone());

        let stats = sync.run().await.unwrap();

        assert_eq!(stats.updated, 1);
        assert_eq!(runner.count_matching("git fetch"), 1);
        assert_eq!(runner.count_matching("git rev-parse"), 1);
        assert_eq!(runner.count_matching("git pull origin main"), 1);
        assert_eq!(runner.count_matching("git clone"), 0);
    }

    #[tokio::test]
    async fn test_run_aborts_before_any_repository_work_when_ssh_fails() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("workspace");

        let runner = Arc::new(FakeRunner {
            ssh_ok: false,
            ..FakeRunner::new()
        });
        let config = test_config(&base, &["repo-a", "repo-b"]);
        let sync = synchronizer(config, runner.clone());

        let result = sync.run().await;

        assert!(matches!(result, Err(SyncError::SshVerification(_))));
        assert_eq!(runner.count_matching("git "), 0, "no git command may run");
        assert_eq!(runner.calls().len(), 1);
        assert!(base.is_dir());
        assert!(!base.join("repo-a").exists());
        assert!(!base.join("repo-b").exists());
    }

    #[tokio::test]
    async fn test_run_bounds_concurrent_subprocess_chains() {
        let temp = TempDir::new().unwrap();

        let names: Vec<String> = (0..12).map(|i| format!("repo-{}", i)).collect();
        let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();

        let mut config = test_config(temp.path(), &name_refs);
        config.git.max_concurrent = 3;

        let runner = Arc::new(FakeRunner {
            delay: Duration::from_millis(25),
            ..FakeRunner::new()
        });
        let sync = synchronizer(config, runner.clone());

        let stats = sync.run().await.unwrap();

        assert_eq!(stats.cloned, 12);
        assert!(
            runner.high_water.load(Ordering::SeqCst) <= 3,
            "high-water mark {} exceeded limit",
            runner.high_water.load(Ordering::SeqCst)
        );
    }

    #[tokio::test]
    async fn test_run_reports_failures_without_aborting_siblings() {
        let temp = TempDir::new().unwrap();

        let runner = Arc::new(FakeRunner {
            fail_clone: true,
            ..FakeRunner::new()
        });
        let config = test_config(temp.path(), &["repo-a", "repo-b", "repo-c"]);
        let sync = synchronizer(config, runner.clone());

        let stats = sync.run().await.unwrap();

        assert_eq!(stats.clone_failures, 3);
        assert_eq!(stats.succeeded(), 0);
        assert_eq!(runner.count_matching("git clone"), 3);
    }
}
