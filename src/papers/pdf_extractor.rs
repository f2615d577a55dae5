//! PDF text extraction
//!
//! Downloads the PDF with an external downloader and renders it to text with
//! ghostscript's `txtwrite` device. Both files live in a scoped temporary directory that
//! is removed whichever step fails.

use super::arxiv::Endpoints;
use super::{join_lines, AttemptFailure};
use crate::settings::Settings;
use crate::tools::ToolRunner;
use std::ffi::OsString;
use std::fs;
use std::path::Path;

/// Download the PDF for `id` and return its rendered text
pub fn render_pdf_text(
    tools: &dyn ToolRunner,
    settings: &Settings,
    endpoints: &Endpoints,
    id: &str,
) -> Result<String, AttemptFailure> {
    let workdir = tempfile::Builder::new().prefix("astroscrape-pdf-").tempdir()?;
    let stem = id.replace('/', "_");
    let pdf_path = workdir.path().join(format!("{}.pdf", stem));
    let text_path = workdir.path().join(format!("{}_gs.txt", stem));

    let download_args: Vec<OsString> = vec![
        "-q".into(),
        "-O".into(),
        pdf_path.clone().into_os_string(),
        endpoints.pdf_url(id).into(),
    ];
    run_step(tools, &settings.tools.wget, &download_args, workdir.path())?;

    let mut output_arg = OsString::from("-sOutputFile=");
    output_arg.push(&text_path);
    let render_args: Vec<OsString> = vec![
        "-q".into(),
        "-dNOPAUSE".into(),
        "-dBATCH".into(),
        "-sDEVICE=txtwrite".into(),
        output_arg,
        pdf_path.into_os_string(),
    ];
    run_step(tools, &settings.tools.gs, &render_args, workdir.path())?;

    let content = fs::read_to_string(&text_path).map_err(|source| AttemptFailure::Read {
        path: text_path.clone(),
        source,
    })?;
    Ok(join_lines(&content))
}

fn run_step(
    tools: &dyn ToolRunner,
    program: &str,
    args: &[OsString],
    cwd: &Path,
) -> Result<(), AttemptFailure> {
    let output = tools
        .run(program, args, Some(cwd))
        .map_err(|source| AttemptFailure::ToolSpawn { program: program.to_string(), source })?;
    if !output.success {
        return Err(AttemptFailure::ToolFailed {
            program: program.to_string(),
            stderr: output.stderr,
        });
    }
    Ok(())
}

/// Path passed to ghostscript's `-sOutputFile=`, if any
#[cfg(test)]
pub(crate) fn output_file_arg(args: &[OsString]) -> Option<std::path::PathBuf> {
    args.iter()
        .filter_map(|a| a.to_str())
        .find_map(|a| a.strip_prefix("-sOutputFile="))
        .map(std::path::PathBuf::from)
}
