//! `gzipd` -- the CLI collaborator around the `gzip_core_rs` library.
//!
//! Everything here is exactly the kind of thing the core crate refuses to
//! do itself (argument parsing, opening/removing files, naming output
//! paths): see the core's "Out of scope" note. This binary owns that
//! policy layer and leans on `gzip_core_rs::{decompress_gzip, inspect_gzip}`
//! for the actual format work.

use filebuffer::FileBuffer;
use gzip_core_rs::{decompress_gzip, inspect_gzip, GzipError};
use log::{error, warn};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(name = "gzipd", about = "Uncompress gzip files (by default, in-place)")]
struct Opt {
    /// File(s) to uncompress. With no FILE, read standard input.
    #[structopt(name = "FILE")]
    inputs: Vec<PathBuf>,

    /// Write on standard output, keep original files unchanged.
    #[structopt(short = "c", long = "stdout")]
    stdout: bool,

    /// Force overwrite of output file.
    #[structopt(short = "f", long = "force")]
    force: bool,

    /// Keep (don't delete) input files.
    #[structopt(short = "k", long = "keep")]
    keep: bool,

    /// List compressed file contents.
    #[structopt(short = "l", long = "list")]
    list: bool,

    /// Use suffix SUF on compressed files.
    #[structopt(short = "S", long = "suffix", default_value = ".gz")]
    suffix: String,

    /// Test compressed file integrity.
    #[structopt(short = "t", long = "test")]
    test: bool,

    /// Suppress all warnings.
    #[structopt(short = "q", long = "quiet")]
    quiet: bool,
}

fn output_path(input: &Path, suffix: &str, embedded_name: Option<&str>) -> PathBuf {
    if let Some(name) = embedded_name {
        if !name.is_empty() {
            return input.with_file_name(name);
        }
    }
    let file_name = input.file_name().unwrap_or_default().to_string_lossy();
    match file_name.strip_suffix(suffix) {
        Some(stripped) => input.with_file_name(stripped),
        None => input.with_extension("out"),
    }
}

fn list_one(path: &Path, quiet: bool) -> Result<(), GzipError> {
    let mapped = FileBuffer::open(path).map_err(|e| GzipError::FileError(e.to_string()))?;
    let srclen = mapped.len();
    match inspect_gzip(&mapped) {
        Ok(info) => {
            let ratio = if info.uncompressed_size as usize > srclen {
                1.0 - srclen as f64 / info.uncompressed_size as f64
            } else {
                -(info.uncompressed_size as f64) / srclen as f64
            };
            let display_name = path.display().to_string();
            println!(
                "{}\t{}\t{:.1}%\t{}",
                srclen,
                info.uncompressed_size,
                ratio * 100.0,
                info.original_filename.as_deref().unwrap_or(&display_name)
            );
            Ok(())
        }
        Err(e) => {
            if !quiet {
                error!("{}: {e}", path.display());
            }
            Err(e)
        }
    }
}

fn decompress_one(opt: &Opt, input: &Path) -> Result<(), GzipError> {
    let mapped = FileBuffer::open(input).map_err(|e| GzipError::FileError(e.to_string()))?;

    let info = inspect_gzip(&mapped)?;
    let mut dest = vec![0u8; info.uncompressed_size as usize];
    let written = decompress_gzip(&mapped, &mut dest)?;
    dest.truncate(written);

    if opt.stdout {
        io::stdout()
            .write_all(&dest)
            .map_err(|e| GzipError::FileError(e.to_string()))?;
    } else {
        let out_path = output_path(input, &opt.suffix, info.original_filename.as_deref());
        if out_path.exists() && !opt.force {
            return Err(GzipError::FileError(format!(
                "{} already exists, use -f to overwrite",
                out_path.display()
            )));
        }
        fs::write(&out_path, &dest).map_err(|e| GzipError::FileError(e.to_string()))?;
        if !opt.keep {
            let _ = fs::remove_file(input);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let opt = Opt::from_args();

    if opt.inputs.is_empty() && !opt.quiet {
        warn!("You did not specify any files!");
    }

    let mut exit_code = GzipError::OK;

    for input in &opt.inputs {
        let result = if opt.test || opt.list {
            list_one(input, opt.quiet)
        } else {
            decompress_one(&opt, input)
        };

        if let Err(e) = result {
            if !opt.quiet {
                error!("{}: {e}", input.display());
            }
            exit_code = i32::from(&e);
        }
    }

    if exit_code == GzipError::OK {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
