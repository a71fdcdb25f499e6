//! Rendering a written project with Quarto and opening the result.
//!
//! The renderer runs inside the project directory so `_quarto.yml` is picked
//! up. Failures keep everything already written on disk.

use crate::{
    config::OpenMode,
    error::ExternalToolError,
    log,
    utils::exec::{QUARTO_FILTER, SILENT_FILTER, exec, internal::to_cmd_vec, spawn},
};
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::Child,
};

/// Run `<command> render` in `project_dir`.
pub fn render_project(project_dir: &Path, command: &[String]) -> Result<(), ExternalToolError> {
    log!("render"; "{}", project_dir.display());
    crate::exec!(filter=&QUARTO_FILTER; project_dir; command; "render")?;
    Ok(())
}

/// Entry page of the rendered site.
pub fn site_index(project_dir: &Path, output_dir: &str) -> PathBuf {
    project_dir.join(output_dir).join("index.html")
}

/// Open the rendered site.
///
/// `Browser` hands the index page to the platform opener and returns at
/// once. `Viewer` starts `<command> preview` and returns the running
/// process so the caller decides whether to wait for it.
pub fn open_site(
    mode: OpenMode,
    project_dir: &Path,
    output_dir: &str,
    command: &[String],
) -> Result<Option<Child>, ExternalToolError> {
    match mode {
        OpenMode::None => Ok(None),
        OpenMode::Browser => {
            let index = site_index(project_dir, output_dir);
            log!("open"; "{}", index.display());
            exec(None, &opener(), &[index.into_os_string()], &SILENT_FILTER)?;
            Ok(None)
        }
        OpenMode::Viewer => {
            log!("open"; "starting preview in {}", project_dir.display());
            let child = spawn(
                Some(project_dir),
                &to_cmd_vec(command),
                &[OsString::from("preview")],
            )?;
            Ok(Some(child))
        }
    }
}

/// Platform command that opens a file with its default application.
fn opener() -> Vec<OsString> {
    let cmd: &[&str] = if cfg!(target_os = "macos") {
        &["open"]
    } else if cfg!(windows) {
        // the empty argument is the window title `start` expects
        &["cmd", "/C", "start", ""]
    } else {
        &["xdg-open"]
    };
    cmd.iter().map(OsString::from).collect()
}
