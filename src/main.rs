use crate::{
    builder::{clean, dist},
    config::{PackConfig, ReleaseOverrides},
    release::stage,
    utils::{
        logger::{LogLevel, Logger},
        signature::get_signature,
        version::get_version,
    },
};
use anyhow::Context;
use clap::CommandFactory;
use clap::FromArgMatches;
use clap::{Args, Parser, Subcommand};
use std::env;
use std::path::PathBuf;

mod addon;
mod builder;
mod config;
mod release;
mod types;
mod utils;

#[derive(Parser)]
#[command(name = "kodipack")]
#[command(about = "Package Kodi addons and stage them into a repo-plugins checkout")]
struct Cli {
    /// Addon directory (defaults to the current directory)
    #[arg(short = 'C', long, global = true)]
    dir: Option<PathBuf>,

    /// Config file (defaults to kodipack.toml in the addon directory, if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build <addon-id>-<version>.zip (default)
    Dist {},

    /// Stage the addon into the repo-plugins checkout
    #[command(alias = "prepare-release", alias = "prepare_release")]
    Release(ReleaseArgs),

    /// Delete every zip archive in the addon directory
    Clean {},

    /// Show manifest and packaging details
    Info {},

    /// Bump the addon version in the manifest
    Bump {
        /// Bump type: major | minor | patch
        #[arg(value_parser = ["major", "minor", "patch"])]
        bump: String,
    },
}

#[derive(Args)]
struct ReleaseArgs {
    /// Path of the repo-plugins checkout
    #[arg(long, env = "REPO_PLUGINS")]
    repo_plugins: Option<PathBuf>,

    /// Branch to stage on
    #[arg(long, env = "RELEASE_BRANCH")]
    branch: Option<String>,

    /// Remote cloned when the checkout is missing
    #[arg(long)]
    remote: Option<String>,

    /// Copy files but do not run `git add`
    #[arg(long, default_value_t = false)]
    no_stage: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let version = get_version();
    let signature = get_signature(&version);

    let version_static: &'static str = Box::leak(format!("v{}", version).into_boxed_str());
    let signature_static: &'static str = Box::leak(signature.into_boxed_str());

    let raw_args: Vec<String> = env::args().collect();
    if raw_args.iter().any(|a| a == "--version" || a == "-V") {
        println!("{}", signature_static);
        return Ok(());
    }

    let cmd = Cli::command()
        .version(version_static)
        .before_help(signature_static);
    let matches = cmd.get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    let cwd = env::current_dir().context("Failed to get current dir")?;
    let addon_dir = match cli.dir {
        Some(d) if d.is_absolute() => d,
        Some(d) => cwd.join(d),
        None => cwd,
    };
    if !addon_dir.is_dir() {
        anyhow::bail!("Addon directory not found: {}", addon_dir.display());
    }

    let mut config =
        PackConfig::load(&addon_dir, cli.config.as_deref()).map_err(anyhow::Error::msg)?;

    match cli.command.unwrap_or(Commands::Dist {}) {
        Commands::Dist {} => {
            let out = blocking(move || dist::build_dist(&addon_dir, &config)).await?;
            Logger::new().log_message(
                LogLevel::Success,
                &format!("Addon packaged at {}", out.display()),
            );
            if let Err(e) = addon::summary::print_archive_summary(&out) {
                Logger::new().log_message(
                    LogLevel::Warning,
                    &format!("Failed to print summary: {}", e),
                );
            }
        }

        Commands::Release(args) => {
            config.apply_overrides(ReleaseOverrides {
                repo_plugins: args.repo_plugins,
                branch: args.branch,
                remote: args.remote,
                no_stage: args.no_stage,
            });
            let staged = blocking(move || stage::prepare_release(&addon_dir, &config)).await?;

            let logger = Logger::new();
            if staged.cloned {
                logger.log_message(
                    LogLevel::Info,
                    &format!("Fresh checkout created at {}", staged.checkout.display()),
                );
            }
            if !staged.pruned.is_empty() {
                logger.log_message_with_trace(
                    LogLevel::Info,
                    "Pruned from staged copy:",
                    staged.pruned.iter().map(|s| s.as_str()).collect(),
                );
            }
            if !staged.changes.is_empty() {
                logger.log_message_with_trace(
                    LogLevel::Info,
                    "Staged changes:",
                    staged.changes.iter().map(|s| s.as_str()).collect(),
                );
            }
            logger.log_message(
                LogLevel::Success,
                &format!(
                    "{} v{} staged in {}",
                    staged.addon.id,
                    staged.addon.version,
                    staged.destination.display()
                ),
            );
            logger.log_message(
                LogLevel::Info,
                &format!(
                    "Review and commit from {}",
                    staged.checkout.display()
                ),
            );
        }

        Commands::Clean {} => {
            let removed = clean::clean_archives(&addon_dir).map_err(anyhow::Error::msg)?;
            let logger = Logger::new();
            if removed.is_empty() {
                logger.log_message(LogLevel::Info, "No zip archives to remove");
            } else {
                let names: Vec<String> = removed
                    .iter()
                    .map(|p| {
                        p.file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_default()
                    })
                    .collect();
                logger.log_message_with_trace(
                    LogLevel::Success,
                    &format!("Removed {} archive(s)", removed.len()),
                    names.iter().map(|s| s.as_str()).collect(),
                );
            }
        }

        Commands::Info {} => {
            addon::manage::show_info(&addon_dir, &config).map_err(anyhow::Error::msg)?;
        }

        Commands::Bump { bump } => {
            addon::manage::bump_version(&addon_dir, &config, &bump)
                .map_err(anyhow::Error::msg)?;
        }
    }

    Ok(())
}

/// Runs blocking packaging work off the async runtime.
async fn blocking<T, F>(f: F) -> anyhow::Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, String> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .context("Join error")?
        .map_err(anyhow::Error::msg)
}
