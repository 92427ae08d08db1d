//! Fetch and put commands

use crate::cli::output::format_size;
use crate::remote::LocalFs;
use crate::transfer;
use anyhow::Context;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

#[derive(Debug)]
pub struct FetchArgs {
    /// Filesystem prefix remote paths resolve under.
    pub store_root: PathBuf,
    /// Remote path of the file to fetch.
    pub path: String,
    /// Local destination, stdout when absent.
    pub output: Option<PathBuf>,
}

pub fn fetch(args: FetchArgs) -> anyhow::Result<()> {
    let remote = LocalFs::new(&args.store_root);
    let copied = match &args.output {
        Some(output) => {
            let file = File::create(output)
                .with_context(|| format!("creating {}", output.display()))?;
            let mut writer = BufWriter::new(file);
            let copied = transfer::fetch(&remote, &args.path, &mut writer)?;
            writer.flush()?;
            copied
        }
        None => transfer::fetch(&remote, &args.path, &mut io::stdout().lock())?,
    };
    eprintln!("fetched {} ({})", args.path, format_size(copied));
    Ok(())
}

#[derive(Debug)]
pub struct PutArgs {
    pub store_root: PathBuf,
    /// Remote directory to write into.
    pub directory: String,
    /// Name of the file to create; defaults to the input file name.
    pub name: Option<String>,
    /// Local file to upload, stdin when absent.
    pub input: Option<PathBuf>,
}

pub fn put(args: PutArgs) -> anyhow::Result<()> {
    let name = match (&args.name, &args.input) {
        (Some(name), _) => name.clone(),
        (None, Some(input)) => input
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .context("input path has no usable file name, pass --name")?,
        (None, None) => anyhow::bail!("reading from stdin requires --name"),
    };

    let remote = LocalFs::new(&args.store_root);
    let written = match &args.input {
        Some(input) => {
            let file =
                File::open(input).with_context(|| format!("opening {}", input.display()))?;
            transfer::put(&remote, &args.directory, &name, &mut BufReader::new(file))?
        }
        None => transfer::put(&remote, &args.directory, &name, &mut io::stdin().lock())?,
    };
    eprintln!("put {}/{name} ({})", args.directory.trim_end_matches('/'), format_size(written));
    Ok(())
}
