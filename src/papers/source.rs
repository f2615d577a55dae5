//! Source-archive strategy
//!
//! Downloads the submission's typesetting source, unpacks it into a scoped temporary
//! directory and reads the main `.tex` file. When the archive holds several candidates,
//! the one declaring a document class wins; if none does, the archive is ambiguous.
//!
//! The working directory is a `TempDir`, so it is removed on every return path.

use super::arxiv::Endpoints;
use super::{join_lines, AttemptFailure};
use crate::remote_client::Fetch;
use crate::settings::Settings;
use crate::tools::ToolRunner;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Fetch, unpack and read the main source file for `id`
pub fn fetch_source_text(
    fetcher: &dyn Fetch,
    tools: &dyn ToolRunner,
    settings: &Settings,
    endpoints: &Endpoints,
    id: &str,
) -> Result<String, AttemptFailure> {
    let url = endpoints.source_url(id);
    let response = fetcher.get(&url)?;
    if !response.is_success() {
        return Err(AttemptFailure::Status { url, status: response.status });
    }

    let workdir = tempfile::Builder::new().prefix("astroscrape-src-").tempdir()?;
    let archive_name = format!("{}.tar.gz", id.replace('/', "_"));
    fs::write(workdir.path().join(&archive_name), &response.body)?;

    let unpack_args: Vec<OsString> = vec!["-x".into(), "-f".into(), "--".into(), archive_name.into()];
    let unpacked = tools
        .run(&settings.tools.tar, &unpack_args, Some(workdir.path()))
        .map_err(|source| AttemptFailure::ToolSpawn { program: settings.tools.tar.clone(), source })?;
    if !unpacked.success {
        return Err(AttemptFailure::ToolFailed {
            program: settings.tools.tar.clone(),
            stderr: unpacked.stderr,
        });
    }

    let main_file = pick_main_source(tools, settings, workdir.path())?;
    read_source(&main_file)
}

/// Top-level regular files in `dir` with the configured source extension, sorted by name
///
/// Symlinks are never candidates: an archive could point one outside the working directory.
pub fn source_candidates(dir: &Path, extension: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file() && path.extension().and_then(|e| e.to_str()) == Some(extension) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Choose the main source file among the unpacked candidates
///
/// One candidate is taken as-is. Several are searched for the document-class marker and
/// the first match wins; no match, or a failing search, is ambiguous.
pub fn pick_main_source(
    tools: &dyn ToolRunner,
    settings: &Settings,
    dir: &Path,
) -> Result<PathBuf, AttemptFailure> {
    let candidates = source_candidates(dir, &settings.source_extension)?;

    match candidates.len() {
        0 => Err(AttemptFailure::NoSourceFiles(settings.source_extension.clone())),
        1 => Ok(candidates[0].clone()),
        n => {
            let mut args: Vec<OsString> = vec![
                "-l".into(),
                "-e".into(),
                settings.document_class_marker.clone().into(),
                "--".into(),
            ];
            args.extend(
                candidates
                    .iter()
                    .filter_map(|p| p.file_name())
                    .map(|name| name.to_os_string()),
            );

            // grep exits 1 on no match and 2 on error; both mean we cannot choose
            let search = match tools.run(&settings.tools.grep, &args, Some(dir)) {
                Ok(output) if output.success => output,
                _ => return Err(AttemptFailure::AmbiguousSource(n)),
            };

            search
                .stdout
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(|name| dir.join(name))
                .ok_or(AttemptFailure::AmbiguousSource(n))
        }
    }
}

fn read_source(path: &Path) -> Result<String, AttemptFailure> {
    let content = fs::read_to_string(path).map_err(|source| AttemptFailure::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(join_lines(&content))
}
