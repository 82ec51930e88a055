//! The context document and its entry types.
//!
//! A [`Document`] aggregates everything one build collects: file contents,
//! command outputs, variables and metadata. It is populated once by the
//! [`Builder`](crate::Builder) and treated as read-only from the moment a
//! codec or size computation touches it; rendering is idempotent.
//!
//! Optional entry fields that are absent are omitted from every
//! serialization, never emitted as `null`.

use crate::map::Map;
use crate::value::Value;
use indexmap::IndexMap;
use serde::Serialize;

/// The root aggregate for one build: files, commands, metadata and
/// variables, each keyed by string with insertion order preserved.
///
/// Duplicate `file`/`command` declarations overwrite the prior entry (last
/// write wins) while keeping the key's original position.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Document {
    pub files: IndexMap<String, FileEntry>,
    pub commands: IndexMap<String, CommandEntry>,
    pub metadata: Map,
    pub variables: Map,
}

/// One collected file: its content plus derived size and line counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub content: String,
    pub size: usize,
    pub lines: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// One executed command: captured stdout, exit code and working directory.
///
/// Commands are recorded unconditionally; a non-zero exit code is data, not
/// a failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub output: String,
    pub exit_code: i32,
    pub working_directory: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl FileEntry {
    /// Builds an entry from file content, deriving `size` (byte length) and
    /// `lines` at creation time. Empty `content_types`/`tags` become absent.
    #[must_use]
    pub fn new(
        content: String,
        namespace: Option<String>,
        content_types: Vec<String>,
        tags: Vec<String>,
    ) -> Self {
        let size = content.len();
        let lines = count_lines(&content);
        FileEntry {
            namespace,
            content,
            size,
            lines,
            content_types: some_if_nonempty(content_types),
            tags: some_if_nonempty(tags),
        }
    }
}

/// Lines as the source file itself counts them: one per line break, plus one
/// for a non-empty final line without a trailing newline.
pub(crate) fn count_lines(content: &str) -> usize {
    if content.is_empty() {
        return 0;
    }
    let breaks = content.matches('\n').count();
    if content.ends_with('\n') {
        breaks
    } else {
        breaks + 1
    }
}

fn some_if_nonempty(list: Vec<String>) -> Option<Vec<String>> {
    if list.is_empty() {
        None
    } else {
        Some(list)
    }
}

impl Document {
    /// Converts the document into the generic [`Value`] tree the TOON
    /// encoder renders, with the fixed section order `files, commands,
    /// metadata, variables` and fixed entry field order.
    ///
    /// Entry bodies omit `namespace` (entries stay flat, keyed by
    /// path/command) and omit absent or empty list fields entirely.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut root = Map::new();

        let mut files = Map::new();
        for (path, entry) in &self.files {
            let mut body = Map::new();
            body.insert("content".to_string(), Value::from(entry.content.clone()));
            body.insert("size".to_string(), Value::from(entry.size));
            body.insert("lines".to_string(), Value::from(entry.lines));
            if let Some(types) = &entry.content_types {
                body.insert("content_types".to_string(), string_list(types));
            }
            if let Some(tags) = &entry.tags {
                body.insert("tags".to_string(), string_list(tags));
            }
            files.insert(path.clone(), Value::Object(body));
        }
        root.insert("files".to_string(), Value::Object(files));

        let mut commands = Map::new();
        for (command, entry) in &self.commands {
            let mut body = Map::new();
            body.insert("output".to_string(), Value::from(entry.output.clone()));
            body.insert("exit_code".to_string(), Value::from(entry.exit_code as i64));
            body.insert(
                "working_directory".to_string(),
                Value::from(entry.working_directory.clone()),
            );
            if let Some(tags) = &entry.tags {
                body.insert("tags".to_string(), string_list(tags));
            }
            commands.insert(command.clone(), Value::Object(body));
        }
        root.insert("commands".to_string(), Value::Object(commands));

        root.insert("metadata".to_string(), Value::Object(self.metadata.clone()));
        root.insert(
            "variables".to_string(),
            Value::Object(self.variables.clone()),
        );

        Value::Object(root)
    }
}

fn string_list(items: &[String]) -> Value {
    Value::Array(items.iter().map(|s| Value::from(s.clone())).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_counts_match_the_source_file() {
        assert_eq!(count_lines(""), 0);
        assert_eq!(count_lines("one line, no newline"), 1);
        assert_eq!(count_lines("one line\n"), 1);
        assert_eq!(count_lines("a\nb\nc\n"), 3);
        assert_eq!(count_lines("a\nb\nc"), 3);
        assert_eq!(count_lines("\n"), 1);
    }

    #[test]
    fn file_entry_derives_size_and_lines() {
        let entry = FileEntry::new("hello\nworld\n".to_string(), None, vec![], vec![]);
        assert_eq!(entry.size, 12);
        assert_eq!(entry.lines, 2);
        assert!(entry.content_types.is_none());
        assert!(entry.tags.is_none());
    }

    #[test]
    fn empty_lists_become_absent() {
        let entry = FileEntry::new(
            "x".to_string(),
            Some("lib".to_string()),
            vec![],
            vec!["lib".to_string()],
        );
        assert!(entry.content_types.is_none());
        assert_eq!(entry.tags.as_deref(), Some(&["lib".to_string()][..]));
    }

    #[test]
    fn to_value_omits_namespace_and_empty_lists() {
        let mut document = Document::default();
        document.files.insert(
            "a.txt".to_string(),
            FileEntry::new("hi\n".to_string(), Some("docs".to_string()), vec![], vec![]),
        );
        let value = document.to_value();
        let root = value.as_object().unwrap();
        let keys: Vec<_> = root.keys().cloned().collect();
        assert_eq!(keys, vec!["files", "commands", "metadata", "variables"]);

        let files = root.get("files").unwrap().as_object().unwrap();
        let body = files.get("a.txt").unwrap().as_object().unwrap();
        let body_keys: Vec<_> = body.keys().cloned().collect();
        assert_eq!(body_keys, vec!["content", "size", "lines"]);
    }
}
