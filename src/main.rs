//! gamearc CLI - browse and extract FSGIMG and Seven45 game archives.

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use gamearc::prelude::*;

/// gamearc - read-only access to FSGIMG and Seven45 game archives
#[derive(Parser)]
#[command(name = "gamearc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List files in an archive
    List {
        /// Archive file (FSGIMG image or Seven45 `.hdr.e.2` header)
        #[arg(env = "GAMEARC_ARCHIVE")]
        archive: PathBuf,

        /// Filter pattern (glob-style)
        #[arg(short, long)]
        filter: Option<String>,

        /// Show stream, offset and size of each file
        #[arg(short, long)]
        detailed: bool,

        /// Print one JSON object per line
        #[arg(long, conflicts_with = "detailed")]
        json: bool,
    },

    /// Print the directory tree of an archive
    Tree {
        /// Archive file
        #[arg(env = "GAMEARC_ARCHIVE")]
        archive: PathBuf,
    },

    /// Extract files from an archive
    Extract {
        /// Archive file
        #[arg(env = "GAMEARC_ARCHIVE")]
        archive: PathBuf,

        /// Output directory
        #[arg(short, long, env = "GAMEARC_OUTPUT")]
        output: PathBuf,

        /// Filter pattern (glob-style)
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Report the detected format of each file
    Probe {
        /// Candidate files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::List {
            archive,
            filter,
            detailed,
            json,
        } => {
            cmd_list(&archive, filter.as_deref(), detailed, json)?;
        }
        Commands::Tree { archive } => {
            cmd_tree(&archive)?;
        }
        Commands::Extract {
            archive,
            output,
            filter,
        } => {
            cmd_extract(&archive, &output, filter.as_deref())?;
        }
        Commands::Probe { files } => {
            cmd_probe(&files);
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn open(path: &Path) -> Result<Archive> {
    let start = Instant::now();
    let archive = open_archive(path)
        .with_context(|| format!("Failed to open archive {}", path.display()))?;

    info!(
        format = archive.format(),
        files = archive.file_count(),
        dirs = archive.dir_count(),
        elapsed = ?start.elapsed(),
        "archive loaded"
    );
    Ok(archive)
}

fn matching_files<'a>(archive: &'a Archive, filter: Option<&str>) -> Vec<File<'a>> {
    archive
        .walk()
        .filter_map(|node| node.as_file())
        .filter(|file| filter.map_or(true, |pattern| glob_match(pattern, &file.path())))
        .collect()
}

#[derive(Serialize)]
struct ListEntry {
    path: String,
    size: u64,
    stream: StreamRef,
    offset: u64,
}

fn cmd_list(path: &Path, filter: Option<&str>, detailed: bool, json: bool) -> Result<()> {
    let archive = open(path)?;
    let files = matching_files(&archive, filter);

    for file in &files {
        let locator = file.locator();
        if json {
            let entry = ListEntry {
                path: file.path(),
                size: locator.length,
                stream: locator.stream,
                offset: locator.offset,
            };
            println!("{}", serde_json::to_string(&entry)?);
        } else if detailed {
            let stream = match locator.stream {
                StreamRef::Header => "hdr".to_string(),
                StreamRef::Volume(n) => format!("pk{n}"),
            };
            println!(
                "{:>12} {:>5} {:>#12x} {}",
                locator.length,
                stream,
                locator.offset,
                file.path()
            );
        } else {
            println!("{}", file.path());
        }
    }

    if !json {
        println!("\nTotal: {} files", files.len());
    }

    Ok(())
}

fn cmd_tree(path: &Path) -> Result<()> {
    let archive = open(path)?;
    println!("{}", archive.name());
    print_dir(archive.root(), "");
    Ok(())
}

fn print_dir(dir: Directory<'_>, prefix: &str) {
    let children: Vec<Node<'_>> = dir.children().collect();
    for (i, node) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        let branch = if last { "└── " } else { "├── " };
        match node {
            Node::Dir(sub) => {
                println!("{prefix}{branch}{}/", sub.name());
                let next = format!("{prefix}{}", if last { "    " } else { "│   " });
                print_dir(*sub, &next);
            }
            Node::File(file) => println!("{prefix}{branch}{} ({} bytes)", file.name(), file.len()),
        }
    }
}

fn cmd_extract(path: &Path, output: &Path, filter: Option<&str>) -> Result<()> {
    let archive = open(path)?;
    let files = matching_files(&archive, filter);

    println!("Extracting {} files...", files.len());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;

    let archive_paths: Vec<String> = files.iter().map(|file| file.path()).collect();
    let targets = unique_output_paths(archive_paths.iter().map(String::as_str));

    let start = Instant::now();
    let failures: Vec<(String, anyhow::Error)> = files
        .par_iter()
        .zip(targets.par_iter())
        .filter_map(|(file, target)| {
            let result = extract_file(file, &output.join(target));
            pb.inc(1);
            result.err().map(|err| (file.path(), err))
        })
        .collect();

    pb.finish_with_message("Done");
    for (name, err) in &failures {
        warn!(file = %name, "extraction failed: {err:#}");
    }
    println!(
        "Extracted {} files in {:?} ({} errors)",
        files.len() - failures.len(),
        start.elapsed(),
        failures.len()
    );

    Ok(())
}

fn extract_file(file: &File<'_>, output_path: &Path) -> Result<()> {
    debug!(path = %output_path.display(), size = file.len(), "writing");

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output_path, file.read())
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    Ok(())
}

/// Archive path as a relative file system path, dropping `.`, `..` and
/// root components so extraction stays inside the output directory.
fn safe_relative_path(path: &str) -> PathBuf {
    Path::new(path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}

/// Output path for every archive path, in order. Repeats (compared without
/// case) become `name~1.ext`, `name~2.ext`, ... so no two files share a target.
fn unique_output_paths<'a>(paths: impl IntoIterator<Item = &'a str>) -> Vec<PathBuf> {
    let mut taken = HashSet::new();
    paths
        .into_iter()
        .map(|path| {
            let base = safe_relative_path(path);
            let mut candidate = base.clone();
            let mut n = 0;
            while !taken.insert(candidate.to_string_lossy().to_lowercase()) {
                n += 1;
                candidate = numbered_path(&base, n);
            }
            if n > 0 {
                warn!(path, renamed = %candidate.display(), "duplicate path in archive");
            }
            candidate
        })
        .collect()
}

fn numbered_path(path: &Path, n: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}~{n}.{}", ext.to_string_lossy()),
        None => format!("{stem}~{n}"),
    };
    path.with_file_name(name)
}

fn cmd_probe(files: &[PathBuf]) {
    for path in files {
        match probe_format(path) {
            Some(format) => println!("{}: {format}", path.display()),
            None => println!("{}: unknown", path.display()),
        }
    }
}

/// Simple glob matching for filtering.
///
/// Case-insensitive. `*` matches any run of characters; a pattern without
/// `*` matches any path containing it.
fn glob_match(pattern: &str, name: &str) -> bool {
    let pattern_lower = pattern.to_lowercase();
    let name_lower = name.to_lowercase();

    if !pattern_lower.contains('*') {
        return name_lower.contains(&pattern_lower);
    }

    let parts: Vec<&str> = pattern_lower.split('*').collect();
    let (first, rest) = (parts[0], &parts[1..]);
    let Some(mut remaining) = name_lower.strip_prefix(first) else {
        return false;
    };

    let Some((last, middle)) = rest.split_last() else {
        return remaining.is_empty();
    };

    for part in middle {
        match remaining.find(part) {
            Some(found) => remaining = &remaining[found + part.len()..],
            None => return false,
        }
    }

    remaining.ends_with(*last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_match() {
        assert!(glob_match("*.ogg", "songs/intro.ogg"));
        assert!(glob_match("*.ogg", "a.ogg.ogg"));
        assert!(!glob_match("*.ogg", "a.ogg.bak"));
        assert!(glob_match("songs/*", "Songs/Intro.OGG"));
        assert!(glob_match("s*/*.ogg", "songs/rock/a.ogg"));
        assert!(!glob_match("rock/*", "songs/rock/a.ogg"));
        assert!(glob_match("intro", "songs/intro.ogg"));
        assert!(glob_match("*", "anything"));
    }

    #[test]
    fn test_safe_relative_path() {
        assert_eq!(safe_relative_path("a/b.txt"), PathBuf::from("a/b.txt"));
        assert_eq!(safe_relative_path("/a/../b.txt"), PathBuf::from("a/b.txt"));
        assert_eq!(safe_relative_path("./x"), PathBuf::from("x"));
    }

    #[test]
    fn test_duplicate_paths_get_distinct_targets() {
        let targets = unique_output_paths([
            "d/ERROR_FILENAME",
            "d/ERROR_FILENAME",
            "d/ERROR_FILENAME",
            "d/x.txt",
            "D/X.TXT",
            "other/x.txt",
        ]);
        let expected: Vec<PathBuf> = [
            "d/ERROR_FILENAME",
            "d/ERROR_FILENAME~1",
            "d/ERROR_FILENAME~2",
            "d/x.txt",
            "D/X~1.TXT",
            "other/x.txt",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();
        assert_eq!(targets, expected);
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["gamearc", "-vv", "extract", "x.img", "-o", "out"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Extract { .. }));

        assert!(Cli::try_parse_from(["gamearc", "probe"]).is_err());
    }
}
