//! The scoped builder: replays a directive list into a [`Document`].
//!
//! A specification is a flat sequence of [`Directive`]s, either constructed
//! programmatically or parsed from a context script
//! ([`script::parse`](crate::script::parse)); both paths converge on the
//! same [`Builder::build`] call.
//!
//! Directives run strictly in order. Each directive's I/O failure is
//! isolated: a missing file or unparseable loader input degrades to a
//! warning on the reporter and the build continues. Only structural misuse
//! (a second root document on the same builder) is a hard error.

use crate::document::{CommandEntry, Document, FileEntry};
use crate::error::{Error, Result};
use crate::report::{format_size, Reporter};
use crate::system::{ContentTypes, ExtensionTypes, FileSystem, OsFileSystem, OsShell, Shell};
use crate::value::Value;

/// One declarative instruction of a specification.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Evaluate the body with `name` as the current namespace. Only the
    /// innermost active name stamps entries.
    Namespace(String, Vec<Directive>),
    /// Merge key/value pairs into `variables`, overwriting existing keys.
    Variable(Vec<(String, ValueSource)>),
    /// Merge key/value pairs into `metadata`, overwriting existing keys.
    Meta(Vec<(String, ValueSource)>),
    /// Read a file and record a [`FileEntry`]. A missing file is non-fatal.
    File { path: String, tags: Vec<String> },
    /// Run a shell command and record a [`CommandEntry`] unconditionally.
    Command { command: String, tags: Vec<String> },
}

/// Where a `variable`/`meta` value comes from: an inline literal or a
/// structured-data file loaded at execution time.
///
/// Loader failures (missing file, parse error) resolve to no value: the key
/// is omitted with a warning rather than failing the build.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueSource {
    Literal(Value),
    JsonFile(String),
    YamlFile(String),
}

/// Executes directive lists against exactly one [`Document`].
pub struct Builder<'r> {
    fs: Box<dyn FileSystem>,
    shell: Box<dyn Shell>,
    types: Box<dyn ContentTypes>,
    reporter: &'r mut Reporter,
    built: bool,
}

impl<'r> Builder<'r> {
    /// Creates a builder with the OS-backed collaborators.
    pub fn new(reporter: &'r mut Reporter) -> Self {
        Builder::with_collaborators(
            Box::new(OsFileSystem),
            Box::new(OsShell),
            Box::new(ExtensionTypes::default()),
            reporter,
        )
    }

    /// Creates a builder with custom collaborators (used by tests to
    /// substitute in-memory fakes).
    pub fn with_collaborators(
        fs: Box<dyn FileSystem>,
        shell: Box<dyn Shell>,
        types: Box<dyn ContentTypes>,
        reporter: &'r mut Reporter,
    ) -> Self {
        Builder {
            fs,
            shell,
            types,
            reporter,
            built: false,
        }
    }

    /// Builds the document by executing the directives in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MultipleDocuments`] when called a second time on the
    /// same builder. Resource failures inside directives never error; they
    /// degrade to warnings.
    pub fn build(&mut self, directives: &[Directive]) -> Result<Document> {
        if self.built {
            return Err(Error::MultipleDocuments);
        }
        self.built = true;
        let mut document = Document::default();
        self.run_all(directives, None, &mut document);
        Ok(document)
    }

    fn run_all(&mut self, directives: &[Directive], namespace: Option<&str>, doc: &mut Document) {
        for directive in directives {
            self.run(directive, namespace, doc);
        }
    }

    fn run(&mut self, directive: &Directive, namespace: Option<&str>, doc: &mut Document) {
        match directive {
            Directive::Namespace(name, body) => self.run_all(body, Some(name), doc),
            Directive::Variable(pairs) => {
                for (key, source) in pairs {
                    if let Some(value) = self.resolve(source) {
                        doc.variables.insert(key.clone(), value);
                    }
                }
            }
            Directive::Meta(pairs) => {
                for (key, source) in pairs {
                    if let Some(value) = self.resolve(source) {
                        doc.metadata.insert(key.clone(), value);
                    }
                }
            }
            Directive::File { path, tags } => match self.fs.read(path) {
                Ok(content) => {
                    let entry = FileEntry::new(
                        content,
                        namespace.map(str::to_string),
                        self.types.types_for(path),
                        tags.clone(),
                    );
                    self.reporter.info(format!(
                        "Read {path:?} ({}) for context.",
                        format_size(entry.size)
                    ));
                    doc.files.insert(path.clone(), entry);
                }
                Err(e) => {
                    self.reporter.warn(format!("Reading {path:?} caused {e}."));
                }
            },
            Directive::Command { command, tags } => {
                let output = self.shell.run(command);
                if output.exit_code != 0 {
                    self.reporter.warn(format!(
                        "Executing {command:?} resulted in exit code {}.",
                        output.exit_code
                    ));
                }
                self.reporter.info(format!(
                    "Executed {command:?} with output ({}) for context.",
                    format_size(output.stdout.len())
                ));
                let entry = CommandEntry {
                    namespace: namespace.map(str::to_string),
                    output: output.stdout,
                    exit_code: output.exit_code,
                    working_directory: output.working_directory,
                    tags: if tags.is_empty() {
                        None
                    } else {
                        Some(tags.clone())
                    },
                };
                doc.commands.insert(command.clone(), entry);
            }
        }
    }

    fn resolve(&mut self, source: &ValueSource) -> Option<Value> {
        match source {
            ValueSource::Literal(value) => Some(value.clone()),
            ValueSource::JsonFile(path) => {
                let text = self.load(path, "JSON")?;
                match serde_json::from_str::<Value>(&text) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        self.reporter
                            .warn(format!("Parsing {path:?} as JSON caused {e}."));
                        None
                    }
                }
            }
            ValueSource::YamlFile(path) => {
                let text = self.load(path, "YAML")?;
                match serde_yaml_ng::from_str::<Value>(&text) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        self.reporter
                            .warn(format!("Parsing {path:?} as YAML caused {e}."));
                        None
                    }
                }
            }
        }
    }

    fn load(&mut self, path: &str, kind: &str) -> Option<String> {
        match self.fs.read(path) {
            Ok(text) => {
                self.reporter.info(format!(
                    "Read {path:?} as {kind} ({}) for context.",
                    format_size(text.len())
                ));
                Some(text)
            }
            Err(e) => {
                self.reporter
                    .warn(format!("Reading {path:?} as {kind} caused {e}."));
                None
            }
        }
    }
}
