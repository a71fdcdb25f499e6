//! External command execution utilities.
//!
//! Runs the renderer and the browser opener, filters their output and turns
//! failures into [`ExternalToolError`]s carrying what the program printed.

use crate::{error::ExternalToolError, log};
use regex::Regex;
use std::{
    ffi::OsString,
    path::Path,
    process::{Child, Command, Output, Stdio},
    sync::OnceLock,
};

// ============================================================================
// Macros
// ============================================================================

/// Run an external command with arguments and capture its output.
///
/// # Examples
/// ```ignore
/// // Without working directory
/// exec!(["quarto"]; "--version")?;
///
/// // With working directory
/// exec!(project_dir; &config.render.command; "render")?;
///
/// // With custom filter
/// const MY_FILTER: FilterRule = FilterRule::new(&["WARNING:"]);
/// exec!(filter=&MY_FILTER; project_dir; ["quarto"]; "render")?;
/// ```
#[macro_export]
macro_rules! exec {
    (filter=$filter:expr; $($rest:tt)*) => {
        $crate::exec_internal!(@parse_root $filter; $($rest)*)
    };
    ($($rest:tt)*) => {
        $crate::exec_internal!(@parse_root &$crate::utils::exec::EMPTY_FILTER; $($rest)*)
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! exec_internal {
    // Parse root and command (with root)
    (@parse_root $filter:expr; $root:expr; $cmd:expr; $($arg:expr),* $(,)?) => {
        $crate::utils::exec::exec(
            Some($root),
            &$crate::utils::exec::internal::to_cmd_vec($cmd),
            &$crate::utils::exec::internal::filter_args(&[$($crate::utils::exec::internal::to_os($arg)),*]),
            $filter,
        )
    };
    // Parse command (without root)
    (@parse_root $filter:expr; $cmd:expr; $($arg:expr),* $(,)?) => {
        $crate::utils::exec::exec(
            None,
            &$crate::utils::exec::internal::to_cmd_vec($cmd),
            &$crate::utils::exec::internal::filter_args(&[$($crate::utils::exec::internal::to_os($arg)),*]),
            $filter,
        )
    };
}

// ============================================================================
// Argument Conversion
// ============================================================================

#[doc(hidden)]
pub mod internal {
    use std::ffi::OsString;

    /// Convert to `OsString`.
    #[inline]
    pub fn to_os<S: Into<OsString>>(s: S) -> OsString {
        s.into()
    }

    /// Trait for converting to command vector.
    pub trait ToCmd {
        fn to_cmd(self) -> Vec<OsString>;
    }

    impl<const N: usize> ToCmd for [&str; N] {
        #[inline]
        fn to_cmd(self) -> Vec<OsString> {
            self.into_iter().map(OsString::from).collect()
        }
    }

    impl ToCmd for &[String] {
        #[inline]
        fn to_cmd(self) -> Vec<OsString> {
            self.iter().map(OsString::from).collect()
        }
    }

    impl ToCmd for &Vec<String> {
        #[inline]
        fn to_cmd(self) -> Vec<OsString> {
            self.iter().map(OsString::from).collect()
        }
    }

    /// Convert command to Vec<OsString>.
    #[inline]
    pub fn to_cmd_vec<C: ToCmd>(cmd: C) -> Vec<OsString> {
        cmd.to_cmd()
    }

    /// Filter out empty args.
    #[inline]
    pub fn filter_args(args: &[OsString]) -> Vec<OsString> {
        args.iter().filter(|a| !a.is_empty()).cloned().collect()
    }
}

// ============================================================================
// Command Execution
// ============================================================================

/// Execute a command and capture its output.
///
/// # Errors
/// Returns error if command fails to start or returns non-zero exit code.
pub fn exec(
    root: Option<&Path>,
    cmd: &[OsString],
    args: &[OsString],
    filter: &'static FilterRule,
) -> Result<Output, ExternalToolError> {
    let (name, mut command) = prepare(root, cmd, args)?;

    let output = command.output().map_err(|err| ExternalToolError {
        command: name.clone(),
        status: "not started".into(),
        output: err.to_string(),
    })?;

    log_output(&name, &output, filter)?;
    Ok(output)
}

/// Start a command in the background with inherited stdout/stderr.
///
/// Used for long-running viewers that outlive the build.
pub fn spawn(
    root: Option<&Path>,
    cmd: &[OsString],
    args: &[OsString],
) -> Result<Child, ExternalToolError> {
    let (name, mut command) = prepare(root, cmd, args)?;
    command.stdin(Stdio::null());

    command.spawn().map_err(|err| ExternalToolError {
        command: name,
        status: "not started".into(),
        output: err.to_string(),
    })
}

/// Prepare a Command from components.
fn prepare(
    root: Option<&Path>,
    cmd: &[OsString],
    args: &[OsString],
) -> Result<(String, Command), ExternalToolError> {
    let Some(program) = cmd.first() else {
        return Err(ExternalToolError {
            command: String::new(),
            status: "not started".into(),
            output: "empty command".into(),
        });
    };
    let name = program.to_string_lossy().into_owned();

    let mut command = Command::new(program);
    command.args(&cmd[1..]).args(args);

    if let Some(dir) = root {
        command.current_dir(dir);
    }

    Ok((name, command))
}

// ============================================================================
// Output Filtering
// ============================================================================

fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        #[allow(clippy::unwrap_used)]
        Regex::new(r"\x1b\[[0-9;]*m").unwrap()
    });
    re.replace_all(s, "")
}

/// Filter rule for skipping noisy output lines by prefix.
pub struct FilterRule {
    /// Prefixes to match at the start of output lines.
    pub skip_prefixes: &'static [&'static str],
}

impl FilterRule {
    /// Create a new filter rule with the given prefixes.
    pub const fn new(skip_prefixes: &'static [&'static str]) -> Self {
        Self { skip_prefixes }
    }

    /// Check if a line should be skipped.
    fn should_skip(&self, line: &str) -> bool {
        line.is_empty() || self.skip_prefixes.iter().any(|p| line.starts_with(p))
    }

    /// Lines of `output` that survive the filter, without ANSI colors.
    fn keep(&self, output: &str) -> Vec<String> {
        output
            .lines()
            .map(|line| strip_ansi(line).trim_end().to_owned())
            .filter(|line| !self.should_skip(line.trim()))
            .collect()
    }

    /// Log output lines if not skipped.
    fn log(&self, name: &str, output: &str) {
        let lines = self.keep(output);
        if !lines.is_empty() {
            log!(name; "{}", lines.join("\n"));
        }
    }
}

/// Empty filter (no skipping).
pub const EMPTY_FILTER: FilterRule = FilterRule::new(&[]);

/// Silent filter: skip all output.
pub const SILENT_FILTER: FilterRule = FilterRule::new(&[""]);

/// Quarto progress chatter printed for every file.
pub const QUARTO_FILTER: FilterRule = FilterRule::new(&[
    "[",
    "Output created:",
    "Watching files for changes",
    "pandoc",
    "to:",
    "output-file:",
    "standalone:",
    "metadata",
    "title:",
    "Browse at",
]);

/// Log command output, filtering known noise.
fn log_output(name: &str, output: &Output, filter: &'static FilterRule) -> Result<(), ExternalToolError> {
    if !output.status.success() {
        return Err(ExternalToolError {
            command: name.to_owned(),
            status: output.status.to_string(),
            output: failure_output(output),
        });
    }

    // On success, only log stderr (warnings) to reduce noise
    let stderr = String::from_utf8_lossy(&output.stderr);
    filter.log(name, stderr.trim());

    Ok(())
}

/// Everything a failed command printed, stderr first. Never filtered: a
/// failure report must not lose the line that explains it.
fn failure_output(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let mut msg = strip_ansi(stderr.trim()).into_owned();
    let stdout = strip_ansi(stdout.trim());
    if !stdout.is_empty() {
        if !msg.is_empty() {
            msg.push_str("\n");
        }
        msg.push_str("Stdout:\n");
        msg.push_str(&stdout);
    }
    msg
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::exec::internal::*;

    #[test]
    fn test_to_os() {
        assert_eq!(to_os("hello"), OsString::from("hello"));
        assert_eq!(to_os(String::from("world")), OsString::from("world"));
    }

    #[test]
    fn test_to_cmd_vec() {
        let cmd = to_cmd_vec(["quarto", "render"]);
        assert_eq!(cmd, [OsString::from("quarto"), OsString::from("render")]);

        let v = vec!["quarto".to_string(), "--quiet".to_string()];
        assert_eq!(to_cmd_vec(&v).len(), 2);
    }

    #[test]
    fn test_filter_args() {
        let args = [OsString::from("a"), OsString::from(""), OsString::from("b")];
        assert_eq!(filter_args(&args), [OsString::from("a"), OsString::from("b")]);
    }

    #[test]
    fn test_prepare_empty() {
        let err = prepare(None, &[], &[]).unwrap_err();
        assert_eq!(err.output, "empty command");
    }

    #[test]
    fn test_filter_rule() {
        let filter = FilterRule::new(&["WARN:", "[ 1/3]"]);

        assert!(filter.should_skip("WARN: something"));
        assert!(!filter.should_skip("ERROR: something"));
        assert!(filter.should_skip(""));

        let kept = filter.keep("[ 1/3] index.qmd\n\x1b[31mERROR: bad\x1b[0m\n\nWARN: x");
        assert_eq!(kept, ["ERROR: bad"]);
        assert!(SILENT_FILTER.keep("anything\nat all").is_empty());
    }

    #[test]
    fn test_quarto_filter() {
        let kept = QUARTO_FILTER.keep("[1/2] index.qmd\nOutput created: _site/index.html\nWARNING: unknown key");
        assert_eq!(kept, ["WARNING: unknown key"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_exec_success() {
        let output = exec!(["sh"]; "-c", "echo hello").unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_exec_failure_keeps_output() {
        let err = exec!(["sh"]; "-c", "echo out; echo 'ERROR: broken' >&2; exit 3").unwrap_err();
        assert_eq!(err.command, "sh");
        assert!(err.status.contains('3'));
        assert!(err.output.starts_with("ERROR: broken"));
        assert!(err.output.contains("Stdout:\nout"));
    }

    #[cfg(unix)]
    #[test]
    fn test_exec_in_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker"), "").unwrap();
        let output = exec!(dir.path(); ["ls"];).unwrap();
        assert!(String::from_utf8_lossy(&output.stdout).contains("marker"));
    }

    #[test]
    fn test_exec_missing_program() {
        let err = exec!(["vizdeck-no-such-program"]; "--version").unwrap_err();
        assert_eq!(err.status, "not started");
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[31mRed\x1b[0m"), "Red");
        assert_eq!(strip_ansi("\x1b[1;32mGreen Bold\x1b[0m"), "Green Bold");
        assert_eq!(strip_ansi("Plain text"), "Plain text");
    }
}
