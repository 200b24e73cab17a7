use beacon::brain::{BrainUpdate, TroubleEntry, apply};
use beacon::codec::{decode, encode};
use beacon::vcs::{ChangeEntry, parse_name_status, render_name_status};
use beacon::{BeaconBuilder, BeaconError, NoVcs, SourceControl, VersionControl};
use serde_json::json;
#[test]
fn test_encode_layout() {
    let doc = json!({
        "name": "demo",
        "count": 2,
        "tags": ["a", "b"],
        "files": [{"path": "a.rs", "inline": false}],
        "empty": {},
        "none": [],
        "weird key": null
    });
    let expected = "\
name: \"demo\"
count: 2
tags:
  - \"a\"
  - \"b\"
files:
  -
    path: \"a.rs\"
    inline: false
empty: {}
none: []
\"weird key\": null
";
    assert_eq!(encode(&doc), expected);
}
#[test]
fn test_decode_inverts_encode() {
    let doc = json!({
        "format_version": "beacon-snapshot/1",
        "text": "line one\nline two: with colon\n\t- and a dash",
        "nested": {"deep": {"deeper": [1, 2.5, -3, true, null]}},
        "matrix": [[1, 2], [], [[{"k": "v"}]]],
        "": "empty key",
        "-dash": "leading dash",
        "unicode": "héllo ✓",
        "empties": [{}, [], ""]
    });
    let text = encode(&doc);
    assert_eq!(decode(&text).unwrap(), doc);
}
#[test]
fn test_decode_preserves_key_order() {
    let text = "zeta: 1\nalpha: 2\nmid: 3\n";
    let value = decode(text).unwrap();
    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["zeta", "alpha", "mid"]);
    assert_eq!(encode(&value), text);
}
#[test]
fn test_decode_bare_key_is_null() {
    let value = decode("a:\nb: 1\nlist:\n  -\n  - 2\n").unwrap();
    assert_eq!(value, json!({"a": null, "b": 1, "list": [null, 2]}));
}
#[test]
fn test_decode_skips_blank_and_comment_lines() {
    let value = decode("# header\n\nproject:\n  # inner\n  name: \"x\"\n\n").unwrap();
    assert_eq!(value, json!({"project": {"name": "x"}}));
}
#[test]
fn test_decode_top_level_scalar_and_sequence() {
    assert_eq!(decode("\"just text\"\n").unwrap(), json!("just text"));
    assert_eq!(decode("- 1\n- \"two\"\n").unwrap(), json!([1, "two"]));
}
fn parse_line(text: &str) -> usize {
    match decode(text) {
        Err(BeaconError::Parse { line, .. }) => line,
        other => panic!("expected parse error, got {:?}", other),
    }
}
#[test]
fn test_decode_rejects_malformed_input() {
    assert_eq!(parse_line(""), 1);
    assert_eq!(parse_line("a: 1\n\tb: 2\n"), 2);
    assert_eq!(parse_line("a:\n   b: 1\n"), 2);
    assert_eq!(parse_line("a: 1\n  b: 2\n"), 2);
    assert_eq!(parse_line("a: 1\na: 2\n"), 2);
    assert_eq!(parse_line("a: not-json\n"), 1);
    assert_eq!(parse_line("- 1\nkey: 2\n"), 2);
    assert_eq!(parse_line("key: 1\n- 2\n"), 2);
    assert_eq!(parse_line("\"a\"\n\"b\"\n"), 2);
    assert_eq!(parse_line("a:\n    b: 1\n"), 2);
}
#[test]
fn test_inline_extension_matching() {
    let config = BeaconBuilder::new(".").build();
    assert!(config.is_inline_extension("main.rs"));
    assert!(config.is_inline_extension("README.MD"));
    assert!(config.is_inline_extension(".gitignore"));
    assert!(config.is_inline_extension(".env"));
    assert!(config.is_inline_extension("archive.tar.toml"));
    assert!(!config.is_inline_extension("Makefile"));
    assert!(!config.is_inline_extension("image.png"));
    assert!(!config.is_inline_extension("trailing."));
    let custom = BeaconBuilder::new(".").inline_extensions([".CSV"]).build();
    assert!(custom.is_inline_extension("data.csv"));
    assert!(!custom.is_inline_extension("main.rs"));
}
#[test]
fn test_parse_name_status() {
    let raw = "M\0src/lib.rs\0A\0docs/café menu.md\0D\0old.txt\0R087\0src/a.rs\0src/b.rs\0C100\0x.rs\0";
    let entries = parse_name_status(raw);
    assert_eq!(
        entries,
        vec![
            ChangeEntry {
                status: "M".into(),
                path: "src/lib.rs".into(),
                previous_path: None,
            },
            ChangeEntry {
                status: "A".into(),
                path: "docs/café menu.md".into(),
                previous_path: None,
            },
            ChangeEntry {
                status: "D".into(),
                path: "old.txt".into(),
                previous_path: None,
            },
            ChangeEntry {
                status: "R087".into(),
                path: "src/b.rs".into(),
                previous_path: Some("src/a.rs".into()),
            },
        ]
    );
    assert_eq!(
        render_name_status(&entries),
        "M\tsrc/lib.rs\nA\tdocs/café menu.md\nD\told.txt\nR087\tsrc/a.rs\tsrc/b.rs"
    );
    assert!(parse_name_status("").is_empty());
}
#[test]
fn test_no_vcs_is_empty() {
    let vcs = NoVcs;
    assert_eq!(vcs.repo_info(), SourceControl::default());
    assert!(vcs.current_commit().is_none());
    assert!(vcs.latest_checkpoint_tag().is_none());
    assert!(vcs.changes_since("checkpoint-1").is_none());
}
#[test]
fn test_error_reasons() {
    assert_eq!(BeaconError::NotFound("dist/snapshot.yaml".into()).reason(), "not_found");
    let parse = decode("a: ?").unwrap_err();
    assert_eq!(parse.reason(), "parse_error");
    assert!(parse.to_string().starts_with("Parse error on line 1"));
}
#[test]
fn test_brain_new_notebook_layout() {
    let mut doc = serde_json::Map::new();
    apply(&mut doc, &BrainUpdate::default(), "2024-05-01T12:00:00Z").unwrap();
    assert_eq!(
        encode(&serde_json::Value::Object(doc)),
        "current_step: {}\ncommands_recent: []\ntroubleshooting: []\n"
    );
}
#[test]
fn test_brain_dedupes_steps_and_done_items() {
    let mut doc = decode("owner: \"ana\"\nnext_steps:\n  - \"ship\"\n").unwrap();
    let doc = doc.as_object_mut().unwrap();
    let update = BrainUpdate {
        step: Some("M2: server".into()),
        definition_of_done: vec!["tests pass".into(), "tests pass".into(), "docs".into()],
        next_steps: vec!["ship".into(), "review".into()],
        ..Default::default()
    };
    apply(doc, &update, "2024-05-01T12:00:00Z").unwrap();
    apply(doc, &update, "2024-05-01T12:00:00Z").unwrap();
    assert_eq!(
        serde_json::Value::Object(doc.clone()),
        json!({
            "owner": "ana",
            "next_steps": ["ship", "review"],
            "current_step": {"name": "M2: server", "definition_of_done": ["tests pass", "docs"]},
            "commands_recent": [],
            "troubleshooting": []
        })
    );
}
#[test]
fn test_brain_recent_commands_are_most_recent_first_and_capped() {
    let mut doc = decode("commands_recent:\n  - \"make\"\n  - \"ls\"\n  - \"cargo test\"\n").unwrap();
    let doc = doc.as_object_mut().unwrap();
    let update = BrainUpdate {
        commands: vec!["cargo test".into(), "  ".into(), "git status".into()],
        max_recent: 3,
        ..Default::default()
    };
    apply(doc, &update, "2024-05-01T12:00:00Z").unwrap();
    assert_eq!(doc["commands_recent"], json!(["git status", "cargo test", "make"]));

    let unchanged = BrainUpdate {
        max_recent: 1,
        ..Default::default()
    };
    apply(doc, &unchanged, "2024-05-01T12:00:00Z").unwrap();
    assert_eq!(doc["commands_recent"].as_array().unwrap().len(), 3);
}
#[test]
fn test_brain_trouble_parsing() {
    assert_eq!(
        TroubleEntry::parse(" port busy | old server running | kill it; ; restart |extra", "T"),
        TroubleEntry {
            date_utc: "T".into(),
            issue: "port busy".into(),
            cause: "old server running".into(),
            fix: vec!["kill it".into(), "restart".into()],
        }
    );
    let bare = TroubleEntry::parse("flaky test", "T");
    assert_eq!(bare.issue, "flaky test");
    assert_eq!(bare.cause, "");
    assert!(bare.fix.is_empty());

    let mut doc = serde_json::Map::new();
    for (trouble, now) in [("first|a|b", "2024-05-01T12:00:00Z"), ("second||", "2024-05-02T12:00:00Z")] {
        let update = BrainUpdate {
            trouble: Some(trouble.into()),
            ..Default::default()
        };
        apply(&mut doc, &update, now).unwrap();
    }
    assert_eq!(
        doc["troubleshooting"],
        json!([
            {"date_utc": "2024-05-02T12:00:00Z", "issue": "second", "cause": "", "fix": []},
            {"date_utc": "2024-05-01T12:00:00Z", "issue": "first", "cause": "a", "fix": ["b"]}
        ])
    );
}
#[test]
fn test_brain_rejects_wrong_node_kinds() {
    let mut doc = decode("current_step: \"not a mapping\"\n").unwrap();
    let err = apply(doc.as_object_mut().unwrap(), &BrainUpdate::default(), "T").unwrap_err();
    assert!(matches!(err, BeaconError::InvalidDocument(_)));
    assert_eq!(err.reason(), "invalid_document");
}
