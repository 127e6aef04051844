//! Bridge to the external PDF to Word conversion program.
//!
//! The conversion itself is opaque: a [`DocumentConverter`] receives a source
//! PDF, a destination path and a page range, and either writes the document
//! or fails. [`Pdf2DocxCommand`] drives the `pdf2docx` command line tool.

use std::env;
use std::ffi::OsString;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};

use crate::common;
use crate::error::Failure;

/// Zero-based page range, `end` is exclusive and `None` means "until the last page".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: usize,
    pub end: Option<usize>,
}

impl PageRange {
    pub const fn new(start: usize, end: Option<usize>) -> Self {
        Self { start, end }
    }

    pub const fn full() -> Self {
        Self::new(0, None)
    }
}

impl Default for PageRange {
    fn default() -> Self {
        Self::full()
    }
}

pub trait DocumentConverter: Send + Sync {
    fn convert(&self, input_path: &Path, output_path: &Path, pages: PageRange) -> Result<(), Failure>;
}

/// Finds the converter executable.
///
/// Lookup order is the `PDF2WORD_CONVERTER` environment variable, then the
/// configured path, then `pdf2docx` on the `PATH`.
pub fn locate_converter(configured_path: Option<&str>) -> Result<PathBuf, Failure> {
    if let Ok(env_path) = env::var(common::ENV_VAR_PDF2WORD_CONVERTER) {
        if !env_path.trim().is_empty() {
            return Ok(PathBuf::from(env_path.trim()));
        }
    }

    if let Some(cfg_path) = configured_path {
        if !cfg_path.trim().is_empty() {
            return Ok(PathBuf::from(cfg_path.trim()));
        }
    }

    common::executable_find(common::DEFAULT_CONVERTER_EXE).ok_or_else(|| {
        Failure::ConverterMissing(format!(
            "No '{}' executable found! Please install it (pip install pdf2docx) or set {}.",
            common::DEFAULT_CONVERTER_EXE,
            common::ENV_VAR_PDF2WORD_CONVERTER
        ))
    })
}

#[derive(Debug, Clone)]
pub struct Pdf2DocxCommand {
    exec_path: PathBuf,
}

impl Pdf2DocxCommand {
    pub fn new(exec_path: PathBuf) -> Self {
        Self { exec_path }
    }

    pub fn exec_path(&self) -> &Path {
        &self.exec_path
    }

    fn command_args(input_path: &Path, output_path: &Path, pages: PageRange) -> Vec<OsString> {
        let mut args = vec![
            OsString::from("convert"),
            input_path.as_os_str().to_os_string(),
            output_path.as_os_str().to_os_string(),
            OsString::from(format!("--start={}", pages.start)),
        ];

        if let Some(end) = pages.end {
            args.push(OsString::from(format!("--end={}", end)));
        }

        args
    }
}

impl DocumentConverter for Pdf2DocxCommand {
    fn convert(&self, input_path: &Path, output_path: &Path, pages: PageRange) -> Result<(), Failure> {
        if !input_path.exists() {
            return Err(Failure::InvalidInput(format!("The selected file does not exist: {}!", input_path.display())));
        }

        let args = Self::command_args(input_path, output_path, pages);
        tracing::debug!("Running command: {} {:?}", self.exec_path.display(), args);

        let mut cmd = spawn_command(&self.exec_path, args).map_err(|ex| {
            Failure::ConverterMissing(format!("Cannot run {}: {}", self.exec_path.display(), ex))
        })?;

        let mut output_handles = Vec::with_capacity(2);

        if let Some(stdout) = cmd.stdout.take() {
            output_handles.push(read_cmd_output("pdf2word.stdout", stdout)?);
        }

        if let Some(stderr) = cmd.stderr.take() {
            output_handles.push(read_cmd_output("pdf2word.stderr", stderr)?);
        }

        for output_handle in output_handles {
            match output_handle.join() {
                Ok(Err(ex)) => tracing::debug!("Converter output capture stopped: {}", ex),
                Err(_)      => tracing::debug!("Converter output capture thread panicked"),
                Ok(Ok(()))  => {},
            }
        }

        let exit_status = cmd.wait()?;

        if !exit_status.success() {
            let exit_code = exit_status
                .code()
                .map(|code| code.to_string())
                .unwrap_or_else(|| "signal".to_string());

            return Err(Failure::ConversionFailed(format!("Converter exited with status {} for {}", exit_code, input_path.display())));
        }

        if !output_path.exists() {
            return Err(Failure::ConversionFailed(format!("Converter reported success but {} was not created", output_path.display())));
        }

        Ok(())
    }
}

fn read_cmd_output<R>(thread_name: &str, stream: R) -> Result<JoinHandle<io::Result<()>>, io::Error>
where
    R: Read + Send + 'static {
    let source = thread_name.to_string();

    thread::Builder::new()
        .name(thread_name.to_string())
        .spawn(move || {
            let reader = BufReader::new(stream);
            reader.lines()
                .try_for_each(|line| {
                    tracing::debug!(target: "pdf2word::converter", "{}: {}", source, line?);
                    Ok(())
                })
        })
}

#[cfg(not(any(target_os = "windows")))]
fn spawn_command(cmd: &Path, cmd_args: Vec<OsString>) -> io::Result<Child> {
    Command::new(cmd)
        .args(cmd_args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
}

#[cfg(target_os = "windows")]
fn spawn_command(cmd: &Path, cmd_args: Vec<OsString>) -> io::Result<Child> {
    use std::os::windows::process::CommandExt;
    Command::new(cmd)
        .args(cmd_args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .creation_flags(0x08000000)
        .spawn()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_range_only_passes_start_page() {
        let args = Pdf2DocxCommand::command_args(Path::new("/docs/a.pdf"), Path::new("/docs/a.docx"), PageRange::full());

        let expected: Vec<OsString> = ["convert", "/docs/a.pdf", "/docs/a.docx", "--start=0"].iter().map(OsString::from).collect();

        assert_eq!(args, expected);
    }

    #[test]
    fn bounded_range_passes_end_page() {
        let args = Pdf2DocxCommand::command_args(Path::new("a.pdf"), Path::new("a.docx"), PageRange::new(1, Some(4)));

        assert_eq!(&args[3..], &[OsString::from("--start=1"), OsString::from("--end=4")]);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_paths_reach_the_converter_unchanged() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let input = Path::new("/docs").join(OsStr::from_bytes(b"r\xFFport.pdf"));
        let output = Path::new("/docs").join(OsStr::from_bytes(b"r\xFFport.docx"));
        let args = Pdf2DocxCommand::command_args(&input, &output, PageRange::full());

        assert_eq!(args[1].as_os_str(), input.as_os_str());
        assert_eq!(args[2].as_os_str(), output.as_os_str());
    }

    #[test]
    fn missing_input_is_rejected_before_spawning() {
        let converter = Pdf2DocxCommand::new(PathBuf::from("/nonexistent/pdf2docx"));
        let input = env::temp_dir().join(format!("{}.pdf", uuid::Uuid::new_v4()));
        let ret = converter.convert(&input, &input.with_extension("docx"), PageRange::full());

        assert!(matches!(ret, Err(Failure::InvalidInput(_))));
    }

    #[test]
    fn unknown_executable_is_reported_as_missing_converter() {
        let dir = env::temp_dir().join(uuid::Uuid::new_v4().to_string());
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("a.pdf");
        std::fs::write(&input, b"%PDF-1.4").unwrap();

        let converter = Pdf2DocxCommand::new(dir.join("no-such-converter"));
        let ret = converter.convert(&input, &dir.join("a.docx"), PageRange::full());

        assert!(matches!(ret, Err(Failure::ConverterMissing(_))));
        let _ = std::fs::remove_dir_all(&dir);
    }

    // Lookup tests share the process environment.
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    fn with_converter_env<F>(value: Option<&str>, test_fn: F)
    where
        F: FnOnce() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let previous = env::var_os(common::ENV_VAR_PDF2WORD_CONVERTER);

        match value {
            Some(v) => env::set_var(common::ENV_VAR_PDF2WORD_CONVERTER, v),
            None    => env::remove_var(common::ENV_VAR_PDF2WORD_CONVERTER),
        }

        test_fn();

        match previous {
            Some(v) => env::set_var(common::ENV_VAR_PDF2WORD_CONVERTER, v),
            None    => env::remove_var(common::ENV_VAR_PDF2WORD_CONVERTER),
        }
    }

    #[test]
    fn environment_wins_over_configuration() {
        with_converter_env(Some("/opt/env/pdf2docx"), || {
            let found = locate_converter(Some("/opt/cfg/pdf2docx")).unwrap();
            assert_eq!(found, PathBuf::from("/opt/env/pdf2docx"));

            let found = locate_converter(None).unwrap();
            assert_eq!(found, PathBuf::from("/opt/env/pdf2docx"));
        });
    }

    #[test]
    fn configuration_is_used_without_environment() {
        with_converter_env(None, || {
            let found = locate_converter(Some("  /opt/cfg/pdf2docx ")).unwrap();
            assert_eq!(found, PathBuf::from("/opt/cfg/pdf2docx"));
        });
    }

    #[test]
    fn blank_values_are_skipped() {
        with_converter_env(Some("   "), || {
            let found = locate_converter(Some("/opt/cfg/pdf2docx")).unwrap();
            assert_eq!(found, PathBuf::from("/opt/cfg/pdf2docx"));
        });
    }

    #[cfg(unix)]
    #[test]
    fn search_path_is_the_last_resort() {
        use std::os::unix::fs::PermissionsExt;

        let bin_dir = env::temp_dir().join(uuid::Uuid::new_v4().to_string());
        std::fs::create_dir_all(&bin_dir).unwrap();
        let exe = bin_dir.join(common::DEFAULT_CONVERTER_EXE);
        std::fs::write(&exe, b"#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();

        with_converter_env(Some(""), || {
            let previous_path = env::var_os("PATH");
            env::set_var("PATH", &bin_dir);

            let found = locate_converter(Some(" "));
            let missing_dir = bin_dir.join("empty");
            env::set_var("PATH", &missing_dir);
            let missing = locate_converter(None);

            match previous_path {
                Some(v) => env::set_var("PATH", v),
                None    => env::remove_var("PATH"),
            }

            assert_eq!(found.unwrap(), exe);
            assert!(matches!(missing, Err(Failure::ConverterMissing(_))));
        });

        let _ = std::fs::remove_dir_all(&bin_dir);
    }
}
