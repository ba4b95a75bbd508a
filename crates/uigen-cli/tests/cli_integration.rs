//! Integration tests for the pack, apply, preview, and unpack workflow.

use std::fs;
use tempfile::TempDir;
use uigen_cli::commands::{apply, common, pack, preview, unpack};
use uigen_cli::settings;
use uigen_core::cli::{ExitCode, OutputFormat};

fn write(dir: &std::path::Path, name: &str, text: &str) {
    let path = dir.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

#[test]
fn test_full_workflow() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    write(
        &src,
        "App.jsx",
        "import Button from '@/components/Button';\n\
         export default function App() {\n  return <Button label=\"Go\" />;\n}\n",
    );
    write(
        &src,
        "components/Button.jsx",
        "export default function Button({ label }) {\n  return <button>{label}</button>;\n}\n",
    );

    let project = temp.path().join("project.json");
    let code = pack::run(&src, Some(&project), OutputFormat::Json).unwrap();
    assert_eq!(code, ExitCode::SUCCESS);

    let calls = temp.path().join("calls.json");
    fs::write(
        &calls,
        r#"[
  {"tool": "str_replace_editor",
   "input": {"command": "str_replace", "path": "/components/Button.jsx",
             "old_str": "<button>", "new_str": "<button className=\"btn\">"}},
  {"tool": "str_replace_editor",
   "input": {"command": "create", "path": "/styles.css", "file_text": ".btn { color: red; }"}},
  {"tool": "str_replace_editor",
   "input": {"command": "insert", "path": "/App.jsx", "insert_line": 1, "new_str": "import './styles.css';"}}
]"#,
    )
    .unwrap();
    let code = apply::run(&project, &calls, true, OutputFormat::Json).unwrap();
    assert_eq!(code, ExitCode::SUCCESS);

    let vfs = common::load_project(&project).unwrap();
    assert!(vfs.read("/components/Button.jsx").unwrap().contains("className=\"btn\""));
    assert!(vfs.is_file("/styles.css"));

    let html = temp.path().join("preview.html");
    let code = preview::run(
        &project,
        Some(&html),
        None,
        settings::load_config(None).unwrap(),
        OutputFormat::Json,
    )
    .unwrap();
    assert_eq!(code, ExitCode::SUCCESS);
    let document = fs::read_to_string(&html).unwrap();
    assert!(document.contains(".btn { color: red; }"));
    assert!(document.contains("data:text/javascript;base64,"));

    let out = temp.path().join("out");
    unpack::run(&project, &out, true, OutputFormat::Text).unwrap();
    assert_eq!(
        fs::read_to_string(out.join("styles.css")).unwrap(),
        ".btn { color: red; }"
    );
}

#[test]
fn test_rejected_batch_leaves_project_untouched() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    write(&src, "App.jsx", "export default () => <p>one</p>;");

    let project = temp.path().join("project.json");
    pack::run(&src, Some(&project), OutputFormat::Text).unwrap();
    let before = fs::read_to_string(&project).unwrap();

    let calls = temp.path().join("calls.json");
    fs::write(
        &calls,
        r#"[
  {"tool": "str_replace_editor",
   "input": {"command": "create", "path": "/New.jsx", "file_text": "x"}},
  {"tool": "file_manager",
   "input": {"command": "delete", "path": "/Missing.jsx"}}
]"#,
    )
    .unwrap();

    let code = apply::run(&project, &calls, true, OutputFormat::Text).unwrap();
    assert_eq!(code, ExitCode::EDIT_REJECTED);
    assert_eq!(fs::read_to_string(&project).unwrap(), before);
}

#[test]
fn test_preview_without_entry_exits_with_diagnostic() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    write(&src, "Widget.jsx", "export default () => null;");

    let project = temp.path().join("project.json");
    pack::run(&src, Some(&project), OutputFormat::Text).unwrap();

    let html = temp.path().join("preview.html");
    let code = preview::run(
        &project,
        Some(&html),
        None,
        settings::load_config(None).unwrap(),
        OutputFormat::Text,
    )
    .unwrap();
    assert_eq!(code, ExitCode::DIAGNOSTIC);
    assert!(fs::read_to_string(&html).unwrap().contains("Nothing to render"));
}

#[test]
fn test_blob_preview_writes_manifest() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src");
    write(&src, "App.jsx", "export default () => <p>hi</p>;");

    let project = temp.path().join("project.json");
    pack::run(&src, Some(&project), OutputFormat::Text).unwrap();

    let html = temp.path().join("preview.html");
    let config = settings::parse_config("tailwind = false\n").unwrap();
    preview::run(&project, Some(&html), Some("http://localhost:5173"), config, OutputFormat::Text)
        .unwrap();

    let manifest = fs::read_to_string(preview::manifest_path(&html)).unwrap();
    let modules: serde_json::Value = serde_json::from_str(&manifest).unwrap();
    let (locator, code) = modules.as_object().unwrap().iter().next().unwrap();
    assert!(locator.starts_with("blob:http://localhost:5173/"));
    assert!(code.as_str().unwrap().contains("_jsx"));
    assert!(!fs::read_to_string(&html).unwrap().contains("tailwindcss"));
}
