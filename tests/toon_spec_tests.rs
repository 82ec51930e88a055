//! Byte-level TOON output checks and document round-trips through the
//! public encode/decode surface.

use context_pack::{decode_toon, encode_toon, Document, Error, FileEntry, CommandEntry, Value};

fn sample_document() -> Document {
    let mut document = Document::default();
    document.files.insert(
        "src/lib.rs".to_string(),
        FileEntry::new(
            "fn main() {}\n".to_string(),
            Some("code".to_string()),
            vec!["text/x-rust".to_string()],
            vec!["lib".to_string()],
        ),
    );
    document.commands.insert(
        "git log".to_string(),
        CommandEntry {
            namespace: None,
            output: "abc\n".to_string(),
            exit_code: 0,
            working_directory: "/repo".to_string(),
            tags: None,
        },
    );
    document
        .metadata
        .insert("version".to_string(), Value::from("1.0"));
    document
        .variables
        .insert("foo".to_string(), Value::from("bar"));
    document
}

#[test]
fn empty_document_renders_four_bare_sections() {
    assert_eq!(
        encode_toon(&Document::default()),
        "files:\ncommands:\nmetadata:\nvariables:\n"
    );
}

#[test]
fn populated_document_is_byte_exact() {
    let expected = concat!(
        "files:\n",
        "  \"src/lib.rs\":\n",
        "    content: \"fn main() {}\\n\"\n",
        "    size: 13\n",
        "    lines: 1\n",
        "    content_types[1]: text/x-rust\n",
        "    tags[1]: lib\n",
        "commands:\n",
        "  \"git log\":\n",
        "    output: \"abc\\n\"\n",
        "    exit_code: 0\n",
        "    working_directory: \"/repo\"\n",
        "metadata:\n",
        "  version: \"1.0\"\n",
        "variables:\n",
        "  foo: bar\n",
    );
    assert_eq!(encode_toon(&sample_document()), expected);
}

#[test]
fn encoding_is_deterministic() {
    let document = sample_document();
    assert_eq!(encode_toon(&document), encode_toon(&document));
}

#[test]
fn document_round_trips_as_a_value_tree() {
    let document = sample_document();
    let decoded = decode_toon(&encode_toon(&document)).unwrap();
    assert_eq!(decoded, document.to_value());
}

#[test]
fn multiline_content_survives_the_round_trip() {
    let mut document = Document::default();
    document.files.insert(
        "notes.txt".to_string(),
        FileEntry::new("line one\nline \"two\"\n\ttabbed\n".to_string(), None, vec![], vec![]),
    );
    let decoded = decode_toon(&encode_toon(&document)).unwrap();
    let files = decoded.as_object().unwrap().get("files").unwrap();
    let entry = files.as_object().unwrap().get("notes.txt").unwrap();
    assert_eq!(
        entry.as_object().unwrap().get("content").unwrap().as_str(),
        Some("line one\nline \"two\"\n\ttabbed\n")
    );
}

#[test]
fn numeric_looking_metadata_keeps_its_type() {
    let mut document = Document::default();
    document
        .metadata
        .insert("revision".to_string(), Value::from("42"));
    document
        .metadata
        .insert("count".to_string(), Value::from(42i64));
    let decoded = decode_toon(&encode_toon(&document)).unwrap();
    let metadata = decoded.as_object().unwrap().get("metadata").unwrap();
    let metadata = metadata.as_object().unwrap();
    assert_eq!(metadata.get("revision"), Some(&Value::from("42")));
    assert_eq!(metadata.get("count"), Some(&Value::from(42i64)));
}

#[test]
fn float_metadata_survives_the_round_trip() {
    let mut document = Document::default();
    document
        .metadata
        .insert("ratio".to_string(), Value::from(1.0f64));
    document
        .metadata
        .insert("big".to_string(), Value::from(1e300f64));
    document
        .metadata
        .insert("covered_percent".to_string(), Value::from(87.0f64));
    document
        .variables
        .insert("tiny".to_string(), Value::from(2.5e-300f64));
    let decoded = decode_toon(&encode_toon(&document)).unwrap();
    assert_eq!(decoded, document.to_value());
}

#[test]
fn count_annotation_must_match() {
    let err = decode_toon("tags[4]: a,b\n").unwrap_err();
    assert!(matches!(
        err,
        Error::CountMismatch {
            line: 1,
            declared: 4,
            found: 2,
        }
    ));
}

#[test]
fn syntax_errors_carry_line_numbers() {
    let err = decode_toon("ok: 1\n\tbad: 2\n").unwrap_err();
    assert!(matches!(err, Error::Syntax { line: 2, .. }));
}
