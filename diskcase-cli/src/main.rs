use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use serde_json::json;

use diskcase_core::{Config, PathCaseResolver};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Prints each path with its letter-casing corrected to match disk
    Resolve {
        #[clap(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Prints whether a path lies inside a version-controlled working tree
    Check {
        /// Directory to probe (defaults to the current directory)
        path: Option<PathBuf>,
    },
    /// Prints the root of the working tree enclosing a path
    Root {
        /// Directory to probe (defaults to the current directory)
        path: Option<PathBuf>,
    },
    /// Registers a file in the enclosing repository's ignore-file
    Ignore {
        file: PathBuf,
        /// Create the ignore-file when it does not exist yet
        #[clap(long)]
        create: bool,
    },
}

#[derive(Parser)]
#[clap(version, about)]
pub struct Cli {
    /// Output results as JSON
    #[clap(long, global = true)]
    pub json: bool,

    #[clap(subcommand)]
    pub command: Command,
}

fn try_main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let current_dir = std::env::current_dir()?;
    let config = match Config::find(&current_dir) {
        Some(found) => found?,
        None => Config::default(),
    };

    match cli.command {
        Command::Resolve { paths } => {
            let resolver = PathCaseResolver::default();
            if cli.json {
                let resolved: Vec<_> = paths
                    .iter()
                    .map(|p| json!({"input": p, "resolved": resolver.resolve(p)}))
                    .collect();
                println!("{}", serde_json::to_string(&resolved)?);
            } else {
                for path in &paths {
                    println!("{}", resolver.resolve(path).display());
                }
            }
        }
        Command::Check { path } => {
            let target = path.unwrap_or(current_dir);
            let inside = config.probe().is_inside_work_tree(&target);
            if cli.json {
                println!("{}", json!({"path": target, "inside_work_tree": inside}));
            } else {
                println!("{inside}");
            }
        }
        Command::Root { path } => {
            let target = path.unwrap_or(current_dir);
            let root = config
                .probe()
                .repository_root(&target)
                .ok_or_else(|| anyhow!("{} is not inside a working tree", target.display()))?;
            if cli.json {
                println!("{}", json!({"root": root}));
            } else {
                println!("{}", root.display());
            }
        }
        Command::Ignore { file, create } => {
            let absolute = if file.is_absolute() {
                file
            } else {
                current_dir.join(file)
            };
            // probe from the file's directory; the file itself may not
            // exist yet
            let start = absolute.parent().unwrap_or(&absolute);
            let root = config
                .probe()
                .repository_root(start)
                .ok_or_else(|| anyhow!("{} is not inside a working tree", absolute.display()))?;

            let ignore = config.ignore_file_in(&root);
            let added = ignore.add_entry_if_missing(&absolute, create)?;
            if cli.json {
                println!(
                    "{}",
                    json!({"file": absolute, "ignore_file": ignore.path(), "added": added})
                );
            } else if added {
                println!(
                    "Registered {} in {}",
                    absolute.display(),
                    ignore.path().display()
                );
            } else {
                println!(
                    "{} already covered by {}",
                    absolute.display(),
                    ignore.path().display()
                );
            }
        }
    }
    Ok(())
}

fn main() {
    if let Err(e) = try_main() {
        eprintln!("{e:?}");
        ::std::process::exit(1)
    }
}
