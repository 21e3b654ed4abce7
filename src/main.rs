//! e15sum - compute and verify SHA-1 and CRC-32 checksums.
//!
//! This is the main entry point for the e15 command-line application.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

use e15_hash::stream::open_file;
use e15_hash::{
    manifest, Algorithm, Checksum, Crc32Core, HashEngine, HashingReader, HashingWriter, Sha1Core,
};

/// e15sum - SHA-1 and CRC-32 checksum tool
#[derive(Parser)]
#[command(name = "e15sum")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Hash algorithm: sha1 or crc32
    #[arg(short, long, global = true, env = "E15SUM_ALGORITHM", default_value = "sha1")]
    algorithm: Algorithm,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash files and print one checksum line per file
    Hash {
        /// Files or directories to hash
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Descend into directories
        #[arg(short, long)]
        recursive: bool,

        /// Only hash files whose name matches this glob pattern
        #[arg(short, long)]
        filter: Option<String>,

        /// Read files through a memory map instead of buffered reads
        #[arg(long)]
        mmap: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Number of worker threads (defaults to one per core)
        #[arg(short = 'j', long, env = "E15SUM_THREADS")]
        threads: Option<usize>,
    },

    /// Hash strings given on the command line
    String {
        /// Strings to hash
        #[arg(required = true)]
        texts: Vec<String>,
    },

    /// Verify files against a checksum manifest
    Check {
        /// Manifest file with one `<digest>  <path>` line per file
        manifest: PathBuf,

        /// Only report failures
        #[arg(short, long)]
        quiet: bool,
    },

    /// Copy a file while hashing the bytes in flight
    Copy {
        /// Source file
        #[arg(short, long)]
        input: PathBuf,

        /// Destination file
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// One hashed file in `--json` output.
#[derive(Serialize)]
struct HashRecord {
    path: String,
    algorithm: Algorithm,
    digest: Checksum,
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let algorithm = cli.algorithm;

    match cli.command {
        Commands::Hash {
            paths,
            recursive,
            filter,
            mmap,
            json,
            threads,
        } => {
            if let Some(threads) = threads {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build_global()
                    .context("Failed to configure thread pool")?;
            }
            cmd_hash(algorithm, &paths, recursive, filter.as_deref(), mmap, json)
        }
        Commands::String { texts } => cmd_string(algorithm, &texts),
        Commands::Check { manifest, quiet } => cmd_check(algorithm, &manifest, quiet),
        Commands::Copy { input, output } => cmd_copy(algorithm, &input, &output),
    }
}

fn cmd_hash(
    algorithm: Algorithm,
    paths: &[PathBuf],
    recursive: bool,
    filter: Option<&str>,
    mmap: bool,
    json: bool,
) -> Result<ExitCode> {
    let pattern = filter
        .map(glob::Pattern::new)
        .transpose()
        .context("Invalid filter pattern")?;
    let (files, skipped) = collect_files(paths, recursive, pattern.as_ref())?;

    let pb = progress_bar(files.len())?;
    let start = Instant::now();

    // One core per file; files are hashed independently on the rayon pool.
    let results: Vec<(&PathBuf, e15_hash::Result<Checksum>)> = files
        .par_iter()
        .map(|path| {
            let result = if mmap {
                algorithm.hash_file_mapped(path)
            } else {
                algorithm.hash_file(path)
            };
            pb.inc(1);
            (path, result)
        })
        .collect();

    pb.finish_and_clear();
    log::info!("Hashed {} files with {} in {:?}", files.len(), algorithm, start.elapsed());

    let mut out = BufWriter::new(io::stdout().lock());
    let mut records = Vec::new();
    let mut errors = skipped;

    for (path, result) in results {
        match result {
            Ok(digest) if json => records.push(HashRecord {
                path: path.display().to_string(),
                algorithm,
                digest,
            }),
            Ok(digest) => {
                writeln!(out, "{}", manifest::format_line(&digest, &path.display().to_string()))?;
            }
            Err(e) => {
                eprintln!("e15sum: {}", e);
                errors += 1;
            }
        }
    }

    if json {
        serde_json::to_writer_pretty(&mut out, &records)?;
        writeln!(out)?;
    }
    out.flush()?;

    Ok(exit_code(errors))
}

fn cmd_string(algorithm: Algorithm, texts: &[String]) -> Result<ExitCode> {
    for text in texts {
        let digest = algorithm.hash_bytes(text.as_bytes());
        println!("{}  \"{}\"", digest, text.escape_debug());
    }

    Ok(ExitCode::SUCCESS)
}

/// Outcome of verifying one manifest.
#[derive(Debug, Default, PartialEq, Eq)]
struct CheckSummary {
    ok: usize,
    mismatched: usize,
    unreadable: usize,
}

impl CheckSummary {
    fn failures(&self) -> usize {
        self.mismatched + self.unreadable
    }
}

fn cmd_check(algorithm: Algorithm, manifest_path: &Path, quiet: bool) -> Result<ExitCode> {
    let summary = check_manifest(algorithm, manifest_path, quiet)?;

    if summary.unreadable > 0 {
        eprintln!("e15sum: WARNING: {} listed file(s) could not be read", summary.unreadable);
    }
    if summary.mismatched > 0 {
        eprintln!("e15sum: WARNING: {} computed checksum(s) did NOT match", summary.mismatched);
    }

    Ok(exit_code(summary.failures()))
}

fn check_manifest(algorithm: Algorithm, manifest_path: &Path, quiet: bool) -> Result<CheckSummary> {
    let text = fs::read_to_string(manifest_path)
        .with_context(|| format!("Failed to read manifest {}", manifest_path.display()))?;
    let entries = manifest::parse_manifest(&text)
        .with_context(|| format!("Failed to parse manifest {}", manifest_path.display()))?;

    // Relative paths in a manifest are relative to the manifest itself.
    let base = manifest_path.parent().unwrap_or_else(|| Path::new("."));

    let results: Vec<_> = entries
        .par_iter()
        .map(|entry| {
            let algorithm = entry.algorithm().unwrap_or(algorithm);
            (entry, algorithm.hash_file(base.join(&entry.path)))
        })
        .collect();

    let mut summary = CheckSummary::default();

    for (entry, result) in results {
        match result {
            Ok(actual) if entry.matches(&actual) => {
                if !quiet {
                    println!("{}: OK", entry.path);
                }
                summary.ok += 1;
            }
            Ok(actual) => {
                println!("{}: FAILED", entry.path);
                log::debug!("{}: expected {}, got {}", entry.path, entry.digest, actual);
                summary.mismatched += 1;
            }
            Err(e) => {
                println!("{}: FAILED open or read", entry.path);
                log::warn!("line {}: {}", entry.line, e);
                summary.unreadable += 1;
            }
        }
    }

    Ok(summary)
}

fn cmd_copy(algorithm: Algorithm, input: &Path, output: &Path) -> Result<ExitCode> {
    let reader = open_file(input)?;
    // Creating the output truncates it, so it must not be the input.
    if is_same_file(input, output)? {
        anyhow::bail!(
            "{} and {} are the same file",
            input.display(),
            output.display()
        );
    }
    let writer = File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;

    let start = Instant::now();
    let (copied, digest) = match algorithm {
        Algorithm::Sha1 => {
            let (copied, hash) = copy_hashed::<Sha1Core>(reader, writer)?;
            (copied, Checksum::from(hash))
        }
        Algorithm::Crc32 => {
            let (copied, hash) = copy_hashed::<Crc32Core>(reader, writer)?;
            (copied, Checksum::from(hash))
        }
    };

    println!("{}", manifest::format_line(&digest, &output.display().to_string()));
    log::info!("Copied {} bytes in {:?}", copied, start.elapsed());

    Ok(ExitCode::SUCCESS)
}

fn is_same_file(a: &Path, b: &Path) -> Result<bool> {
    if !b.exists() {
        return Ok(false);
    }
    let a = fs::canonicalize(a).with_context(|| format!("Failed to resolve {}", a.display()))?;
    let b = fs::canonicalize(b).with_context(|| format!("Failed to resolve {}", b.display()))?;
    Ok(a == b)
}

/// Copy `reader` into `writer`, hashing both sides of the transfer.
fn copy_hashed<E>(reader: File, writer: File) -> Result<(u64, E::Hash)>
where
    E: HashEngine,
    E::Hash: PartialEq,
{
    let mut reader = HashingReader::<_, E>::new(reader);
    let mut writer = HashingWriter::<_, E>::new(BufWriter::new(writer));

    let copied = writer.copy_from(&mut reader)?;

    let (_, read_hash) = reader.finish();
    let (_, written_hash) = writer.finish();
    if read_hash != written_hash {
        anyhow::bail!("Bytes written differ from bytes read");
    }

    Ok((copied, written_hash))
}

/// Expand directories and apply the file-name filter.
///
/// Also returns the number of directories given without `recursive`, which
/// count as failures.
fn collect_files(
    paths: &[PathBuf],
    recursive: bool,
    pattern: Option<&glob::Pattern>,
) -> Result<(Vec<PathBuf>, usize)> {
    let mut files = Vec::new();
    let mut skipped = 0;

    for path in paths {
        if path.is_dir() {
            if !recursive {
                eprintln!("e15sum: {}: Is a directory", path.display());
                log::debug!("use --recursive to hash the contents of {}", path.display());
                skipped += 1;
                continue;
            }

            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.with_context(|| format!("Failed to walk {}", path.display()))?;
                if entry.file_type().is_file() && name_matches(pattern, entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else if name_matches(pattern, path) {
            files.push(path.clone());
        }
    }

    Ok((files, skipped))
}

fn name_matches(pattern: Option<&glob::Pattern>, path: &Path) -> bool {
    let Some(pattern) = pattern else {
        return true;
    };

    path.file_name()
        .and_then(|n| n.to_str())
        .map_or(false, |name| pattern.matches(name))
}

fn progress_bar(len: usize) -> Result<ProgressBar> {
    if len < 2 {
        return Ok(ProgressBar::hidden());
    }

    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn exit_code(failures: usize) -> ExitCode {
    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_files_recursive_with_filter() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();
        fs::write(dir.path().join("b.bin"), b"b").unwrap();
        fs::write(dir.path().join("nested/c.txt"), b"c").unwrap();

        let pattern = glob::Pattern::new("*.txt").unwrap();
        let paths = vec![dir.path().to_path_buf()];

        let (files, skipped) = collect_files(&paths, true, Some(&pattern)).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, ["a.txt", "c.txt"]);
        assert_eq!(skipped, 0);
    }

    #[test]
    fn test_directory_without_recursive_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, b"a").unwrap();

        let paths = vec![dir.path().to_path_buf(), file.clone()];
        let (files, skipped) = collect_files(&paths, false, None).unwrap();
        assert_eq!(files, [file]);
        assert_eq!(skipped, 1);

        let code = cmd_hash(Algorithm::Crc32, &paths, false, None, false, false).unwrap();
        assert_eq!(format!("{:?}", code), format!("{:?}", ExitCode::FAILURE));
    }

    #[test]
    fn test_check_manifest() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/good.txt"), b"123").unwrap();
        fs::write(dir.path().join("bad.txt"), b"124").unwrap();

        let manifest = dir.path().join("sums.txt");
        fs::write(&manifest, "884863d2  sub/good.txt\n").unwrap();

        let summary = check_manifest(Algorithm::Sha1, &manifest, true).unwrap();
        assert_eq!(summary, CheckSummary { ok: 1, mismatched: 0, unreadable: 0 });
        let code = cmd_check(Algorithm::Sha1, &manifest, true).unwrap();
        assert_eq!(format!("{:?}", code), format!("{:?}", ExitCode::SUCCESS));

        fs::write(
            &manifest,
            "884863D2  sub/good.txt\n\
             884863d2  bad.txt\n\
             40bd001563085fc35165329ea1ff5c5ecbdbbeef *missing.bin\n",
        )
        .unwrap();

        let summary = check_manifest(Algorithm::Sha1, &manifest, false).unwrap();
        assert_eq!(summary, CheckSummary { ok: 1, mismatched: 1, unreadable: 1 });
        assert_eq!(summary.failures(), 2);
        let code = cmd_check(Algorithm::Sha1, &manifest, false).unwrap();
        assert_eq!(format!("{:?}", code), format!("{:?}", ExitCode::FAILURE));
    }

    #[test]
    fn test_copy_onto_itself_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, b"do not truncate").unwrap();

        let err = cmd_copy(Algorithm::Crc32, &path, &path).unwrap_err();
        assert!(err.to_string().contains("same file"), "{err}");

        let alias = dir.path().join(".").join("f.txt");
        assert!(cmd_copy(Algorithm::Crc32, &path, &alias).is_err());
        assert_eq!(fs::read(&path).unwrap(), b"do not truncate");

        let copy = dir.path().join("g.txt");
        cmd_copy(Algorithm::Crc32, &path, &copy).unwrap();
        assert_eq!(fs::read(&copy).unwrap(), b"do not truncate");
    }

    #[test]
    fn test_copy_hashed() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let output = dir.path().join("out.txt");
        fs::write(&input, b"The quick brown fox jumps over the lazy dog").unwrap();

        let reader = File::open(&input).unwrap();
        let writer = File::create(&output).unwrap();
        let (copied, hash) = copy_hashed::<Crc32Core>(reader, writer).unwrap();

        assert_eq!(copied, 43);
        assert_eq!(hash.to_hex(), "414fa339");
        assert_eq!(fs::read(&output).unwrap(), fs::read(&input).unwrap());
    }

    #[test]
    fn test_cli_parses_algorithm() {
        let cli = Cli::try_parse_from(["e15sum", "-a", "crc32", "string", "123"]).unwrap();
        assert_eq!(cli.algorithm, Algorithm::Crc32);
        assert!(matches!(cli.command, Commands::String { .. }));

        assert!(Cli::try_parse_from(["e15sum", "-a", "md5", "string", "123"]).is_err());
    }
}
