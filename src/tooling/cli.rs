//! CLI Tooling
//!
//! Command-line access to the task tree. Each command resolves a path from the
//! root and performs one node operation, the same calls a host filesystem driver
//! makes. `run` executes a script of commands against a single tree so cached
//! listings and `ctl` refreshes carry over between lines.

use crate::concurrency::Cancellation;
use crate::config::{ConfigLoader, TaskfsConfig};
use crate::error::{ApiError, FsError};
use crate::tooling::format::{
    format_listing_json, format_listing_text, format_stat_text, format_walk_text, info_json,
};
use crate::tree::{lookup, walk, write_file, FileInfo, Node, Root};
use clap::{Parser, Subcommand};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info};

/// taskfs - task trackers as a synthetic filesystem tree
#[derive(Parser, Debug)]
#[command(name = "taskfs")]
#[command(about = "Browse remote task trackers as a synthetic filesystem tree")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Load configuration and apply the logging flags on top of it.
    pub fn load_config(&self) -> Result<TaskfsConfig, ApiError> {
        let mut config = match &self.config {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load()?,
        };
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }
        Ok(config)
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List a directory
    Ls {
        /// Path from the root
        #[arg(default_value = "/")]
        path: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print a file's content
    Cat {
        path: String,
    },
    /// Show a node's metadata
    Stat {
        path: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Write to a control file, e.g. `write github/ctl refresh`
    Write {
        path: String,
        /// Payload; words are joined with single spaces
        #[arg(trailing_var_arg = true, num_args = 0..)]
        data: Vec<String>,
    },
    /// List everything below a directory
    Tree {
        #[arg(default_value = "/")]
        path: String,
    },
    /// Run commands from a script file (or stdin) against one tree
    Run {
        script: Option<PathBuf>,
    },
}

/// A single script line, parsed with the same grammar as the command line
#[derive(Parser, Debug)]
#[command(name = "taskfs", no_binary_name = true)]
struct ScriptLine {
    #[command(subcommand)]
    command: Commands,
}

/// Parse one script line. Blank lines and `#` comments yield `None`.
pub fn parse_script_line(line: &str) -> Result<Option<Commands>, ApiError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let parsed = ScriptLine::try_parse_from(line.split_whitespace())
        .map_err(|e| ApiError::Usage(format!("Invalid command {:?}: {}", line, e)))?;
    if matches!(parsed.command, Commands::Run { .. }) {
        return Err(nested_run());
    }
    Ok(Some(parsed.command))
}

/// CLI context holding the served tree
pub struct CliContext {
    root: Arc<dyn Node>,
    cancel: Cancellation,
}

impl CliContext {
    /// Build the tree from configuration
    pub fn new(config: &TaskfsConfig) -> Result<Self, ApiError> {
        let root = config.build_root()?;
        info!(services = root.services().count(), "Tree ready");
        Ok(Self::from_root(root))
    }

    pub fn from_root(root: Root) -> Self {
        Self {
            root: Arc::new(root),
            cancel: Cancellation::new(),
        }
    }

    async fn resolve(&self, path: &str) -> Result<Arc<dyn Node>, ApiError> {
        Ok(lookup(Arc::clone(&self.root), path, &self.cancel).await?)
    }

    /// Execute a CLI command
    pub async fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Run { script } => self.run_script(script.as_ref()).await,
            other => self.execute_single(other).await,
        }
    }

    /// Execute a command unless `interrupt` resolves first. The in-flight command,
    /// including any upstream fetch, is dropped on interrupt.
    pub async fn execute_until<F>(&self, command: &Commands, interrupt: F) -> Result<String, ApiError>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            result = self.execute(command) => result,
            _ = interrupt => Err(ApiError::Interrupted),
        }
    }

    async fn execute_single(&self, command: &Commands) -> Result<String, ApiError> {
        debug!(?command, "Executing command");
        match command {
            Commands::Ls { path, format } => {
                let node = self.resolve(path).await?;
                let children = node.read_dir(&self.cancel).await?;
                let infos: Vec<FileInfo> = children.iter().map(|c| c.stat().clone()).collect();
                match format.as_str() {
                    "json" => Ok(format_listing_json(&infos)),
                    "text" => Ok(format_listing_text(&infos)),
                    other => Err(invalid_format(other)),
                }
            }
            Commands::Cat { path } => {
                let node = self.resolve(path).await?;
                let data = node.read_file()?;
                Ok(String::from_utf8_lossy(&data).into_owned())
            }
            Commands::Stat { path, format } => {
                let node = self.resolve(path).await?;
                match format.as_str() {
                    "json" => Ok(info_json(node.stat()).to_string()),
                    "text" => Ok(format_stat_text(node.stat())),
                    other => Err(invalid_format(other)),
                }
            }
            Commands::Write { path, data } => {
                let node = self.resolve(path).await?;
                let payload = data.join(" ");
                write_file(node.as_ref(), payload.as_bytes()).await?;
                Ok(format!("Wrote {} bytes to {}", payload.len(), path))
            }
            Commands::Tree { path } => {
                let node = self.resolve(path).await?;
                let entries = walk(node, &self.cancel).await?;
                Ok(format_walk_text(&entries))
            }
            Commands::Run { .. } => Err(nested_run()),
        }
    }

    async fn run_script(&self, script: Option<&PathBuf>) -> Result<String, ApiError> {
        match script {
            Some(path) => {
                let file = tokio::fs::File::open(path).await?;
                self.run_lines(BufReader::new(file)).await
            }
            None => self.run_lines(BufReader::new(tokio::io::stdin())).await,
        }
    }

    /// Execute each line in turn. A failing line is reported in the output and
    /// the script continues, so a later line can retry it.
    pub async fn run_lines<R>(&self, reader: R) -> Result<String, ApiError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut out = Vec::new();
        let mut number = 0usize;
        while let Some(line) = lines.next_line().await? {
            number += 1;
            let command = match parse_script_line(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    out.push(format!("error (line {}): {}", number, e));
                    continue;
                }
            };
            match self.execute_single(&command).await {
                Ok(output) => out.push(output),
                Err(e) => out.push(format!("error (line {}): {}", number, e)),
            }
        }
        Ok(out.join("\n"))
    }
}

fn nested_run() -> ApiError {
    ApiError::Usage("run cannot be nested inside a script".to_string())
}

fn invalid_format(format: &str) -> ApiError {
    ApiError::Usage(format!(
        "Invalid output format: {} (must be 'text' or 'json')",
        format
    ))
}

/// Exit status for an error: 2 for usage and configuration problems, 130 on
/// interrupt, 1 otherwise.
pub fn exit_code(err: &ApiError) -> i32 {
    match err {
        ApiError::ConfigError(_) | ApiError::Usage(_) => 2,
        ApiError::Interrupted => 130,
        ApiError::Fs(FsError::UnknownCommand(_)) => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{MemoryService, TaskRecord};
    use chrono::Utc;

    fn context() -> (CliContext, Arc<MemoryService>) {
        let service = Arc::new(MemoryService::new("tracker1"));
        service.set_tasks(vec![
            TaskRecord::new("1", "First task", Utc::now()).with_permalink("https://t.example/1"),
            TaskRecord::new("2", "Second task", Utc::now()),
        ]);
        let mut root = Root::new();
        root.create_service(service.clone()).unwrap();
        (CliContext::from_root(root), service)
    }

    #[test]
    fn test_parse_script_line() {
        assert_eq!(parse_script_line("  # comment").unwrap(), None);
        assert_eq!(parse_script_line("").unwrap(), None);
        assert_eq!(
            parse_script_line("cat tracker1/1/subject").unwrap(),
            Some(Commands::Cat {
                path: "tracker1/1/subject".to_string()
            })
        );
        assert_eq!(
            parse_script_line("write tracker1/ctl refresh").unwrap(),
            Some(Commands::Write {
                path: "tracker1/ctl".to_string(),
                data: vec!["refresh".to_string()],
            })
        );
        assert!(parse_script_line("run other.txt").is_err());
        assert!(parse_script_line("frobnicate").is_err());
    }

    #[tokio::test]
    async fn test_cat_and_stat() {
        let (ctx, _) = context();
        let out = ctx
            .execute(&Commands::Cat {
                path: "tracker1/1/url".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(out, "https://t.example/1");

        let out = ctx
            .execute(&Commands::Stat {
                path: "tracker1/1/subject".to_string(),
                format: "json".to_string(),
            })
            .await
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["size"], "First task".len());
        assert_eq!(parsed["kind"], "file");
    }

    #[tokio::test]
    async fn test_cat_directory_is_a_protocol_violation() {
        let (ctx, _) = context();
        let err = ctx
            .execute(&Commands::Cat {
                path: "tracker1".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Fs(FsError::ProtocolViolation { .. })));
        assert_eq!(exit_code(&err), 1);
    }

    #[tokio::test]
    async fn test_write_unknown_command() {
        let (ctx, _) = context();
        let err = ctx
            .execute(&Commands::Write {
                path: "tracker1/ctl".to_string(),
                data: vec!["bogus".to_string()],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Fs(FsError::UnknownCommand(_))));
        assert_eq!(exit_code(&err), 2);
    }

    #[tokio::test]
    async fn test_script_refresh_picks_up_changes() {
        let (ctx, service) = context();
        let script = "ls tracker1 --format json\nwrite tracker1/ctl refresh\nls tracker1 --format json\n";

        let out = ctx.run_lines(script.as_bytes()).await.unwrap();
        let listings: Vec<serde_json::Value> = out
            .lines()
            .filter(|line| line.starts_with('['))
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].as_array().unwrap().len(), 3);
        assert_eq!(service.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_script_reports_errors_and_continues() {
        let (ctx, _) = context();
        let script = "cat tracker1/9/subject\ncat tracker1/2/subject\n";
        let out = ctx.run_lines(script.as_bytes()).await.unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("error (line 1): no such file or directory"));
        assert_eq!(lines[1], "Second task");
    }

    #[tokio::test]
    async fn test_interrupt_abandons_command_and_context_stays_usable() {
        let (ctx, service) = context();
        service.set_latency(Some(std::time::Duration::from_secs(3600)));
        let ls = Commands::Ls {
            path: "tracker1".to_string(),
            format: "json".to_string(),
        };

        let err = ctx
            .execute_until(&ls, tokio::time::sleep(std::time::Duration::from_millis(20)))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Interrupted));
        assert_eq!(exit_code(&err), 130);

        service.set_latency(None);
        let out = ctx
            .execute_until(&ls, std::future::pending::<()>())
            .await
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 3);
        assert_eq!(service.fetch_count(), 2);
    }

    #[test]
    fn test_cli_parses_commands() {
        let cases: Vec<Vec<&str>> = vec![
            vec!["taskfs", "ls"],
            vec!["taskfs", "ls", "github", "--format", "json"],
            vec!["taskfs", "cat", "github/1/subject"],
            vec!["taskfs", "stat", "github/1"],
            vec!["taskfs", "write", "github/ctl", "refresh"],
            vec!["taskfs", "write", "github/ctl"],
            vec!["taskfs", "tree"],
            vec!["taskfs", "--config", "taskfs.toml", "run", "script.txt"],
            vec!["taskfs", "--log-level", "debug", "run"],
        ];
        for args in cases {
            assert!(Cli::try_parse_from(args.clone()).is_ok(), "expected valid parse for {args:?}");
        }
        assert!(Cli::try_parse_from(["taskfs", "cat"]).is_err());
    }
}
