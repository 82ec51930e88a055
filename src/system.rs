//! External collaborators: the file system, the shell and content-type
//! detection.
//!
//! The builder only needs "read this file", "run this command, capture
//! stdout and exit status" and "given a path, return zero or more MIME
//! types". These live behind traits so tests can substitute in-memory fakes;
//! the OS-backed implementations are the defaults.

use std::collections::HashMap;
use std::io;
use std::process::{Command, Stdio};

/// Result of running a shell command. Always produced; a non-zero exit code
/// or a failed spawn is still a result, never an error.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub stdout: String,
    pub exit_code: i32,
    pub working_directory: String,
}

/// Reads file contents for `file` directives and the structured-data
/// loaders.
pub trait FileSystem {
    fn read(&self, path: &str) -> io::Result<String>;
}

/// Runs shell commands for `command` directives.
pub trait Shell {
    fn run(&self, command: &str) -> CommandOutput;
}

/// Resolves a path to zero or more MIME-type strings.
pub trait ContentTypes {
    fn types_for(&self, path: &str) -> Vec<String>;
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read(&self, path: &str) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// [`Shell`] running commands through `sh -c`, capturing stdout.
#[derive(Debug, Default)]
pub struct OsShell;

impl Shell for OsShell {
    fn run(&self, command: &str) -> CommandOutput {
        let working_directory = std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        match Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
        {
            Ok(output) => CommandOutput {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                exit_code: output.status.code().unwrap_or(-1),
                working_directory,
            },
            // Same convention as a shell that cannot find its command.
            Err(_) => CommandOutput {
                stdout: String::new(),
                exit_code: 127,
                working_directory,
            },
        }
    }
}

/// [`ContentTypes`] mapping file extensions to MIME types. Unknown
/// extensions resolve to no types at all.
#[derive(Debug)]
pub struct ExtensionTypes {
    table: HashMap<&'static str, &'static str>,
}

impl Default for ExtensionTypes {
    fn default() -> Self {
        let table = HashMap::from([
            ("rs", "text/x-rust"),
            ("rb", "text/x-ruby"),
            ("gemspec", "text/x-ruby"),
            ("py", "text/x-python"),
            ("js", "text/javascript"),
            ("ts", "text/x-typescript"),
            ("json", "application/json"),
            ("yaml", "application/yaml"),
            ("yml", "application/yaml"),
            ("toml", "application/toml"),
            ("md", "text/markdown"),
            ("txt", "text/plain"),
            ("html", "text/html"),
            ("css", "text/css"),
            ("sh", "application/x-sh"),
            ("c", "text/x-c"),
            ("h", "text/x-c"),
            ("cpp", "text/x-c++"),
            ("go", "text/x-go"),
            ("java", "text/x-java"),
            ("xml", "application/xml"),
            ("csv", "text/csv"),
        ]);
        ExtensionTypes { table }
    }
}

impl ContentTypes for ExtensionTypes {
    fn types_for(&self, path: &str) -> Vec<String> {
        let extension = path.rsplit('/').next().and_then(|name| {
            let (stem, ext) = name.rsplit_once('.')?;
            if stem.is_empty() {
                None
            } else {
                Some(ext)
            }
        });
        extension
            .and_then(|ext| self.table.get(ext))
            .map(|mime| vec![(*mime).to_string()])
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_lookup() {
        let types = ExtensionTypes::default();
        assert_eq!(types.types_for("src/lib.rs"), vec!["text/x-rust"]);
        assert_eq!(types.types_for("README.md"), vec!["text/markdown"]);
        assert!(types.types_for("Makefile").is_empty());
        assert!(types.types_for("weird.unknownext").is_empty());
    }

    #[test]
    fn dotfiles_have_no_extension() {
        let types = ExtensionTypes::default();
        assert!(types.types_for(".gitignore").is_empty());
        assert!(types.types_for("dir/.yaml").is_empty());
    }

    #[test]
    fn shell_captures_output_and_exit_code() {
        let shell = OsShell;
        let ok = shell.run("echo hello");
        assert_eq!(ok.stdout, "hello\n");
        assert_eq!(ok.exit_code, 0);
        assert!(!ok.working_directory.is_empty());

        let failed = shell.run("exit 3");
        assert_eq!(failed.exit_code, 3);
    }
}
