//! Transforming whole trees the way the preview does.

use uigen_core::{Location, PreviewConfig};
use uigen_files::{FilePath, FilesBuilder, VirtualFileSystem};
use uigen_transform::{ImportTarget, RUNTIME_IMPORT, TransformEngine};

fn path(p: &str) -> FilePath {
    FilePath::new(p).unwrap()
}

fn engine() -> TransformEngine {
    TransformEngine::new(&PreviewConfig::default()).unwrap()
}

fn project() -> VirtualFileSystem {
    FilesBuilder::new()
        .add_file(
            "/App.jsx",
            "import './styles.css';\nimport Button from '@/components/Button';\n\nexport default function App() {\n  return (\n    <main className=\"p-4\">\n      <h1>Hello</h1>\n      <Button label=\"Go\" />\n    </main>\n  );\n}\n",
        )
        .add_file(
            "/components/Button.jsx",
            "import { cn } from '../lib/cn';\nexport default function Button({ label }) {\n  return <button className={cn('btn')}>{label}</button>;\n}\n",
        )
        .add_file("/lib/cn.js", "export const cn = (...c) => c.join(' ');\n")
        .add_file("/styles.css", ".btn { color: red; }")
        .add_file("/data.json", "{\"a\": 1}")
        .build()
        .unwrap()
}

#[test]
fn test_only_module_files_are_transformed() {
    let results = engine().transform_all(&project());
    let paths: Vec<&str> = results.keys().map(FilePath::as_str).collect();
    assert_eq!(paths, vec!["/App.jsx", "/components/Button.jsx", "/lib/cn.js"]);
    assert!(results.values().all(Result::is_ok));
}

#[test]
fn test_hello_app_shape() {
    let results = engine().transform_all(&project());
    let app = results[&path("/App.jsx")].as_ref().unwrap();

    assert!(app.code.starts_with(RUNTIME_IMPORT));
    assert!(!app.code.contains("styles.css"));
    assert!(!app.code.contains('<'));
    assert!(app.code.contains(r#"_jsx("h1", { children: "Hello" })"#));
    assert!(app.code.contains(r#"_jsx(Button, { label: "Go" })"#));
    assert!(app.code.contains("from '/components/Button'"));
    assert_eq!(app.stylesheets, vec![path("/styles.css")]);
}

#[test]
fn test_relative_import_in_nested_file() {
    let results = engine().transform_all(&project());
    let button = results[&path("/components/Button.jsx")].as_ref().unwrap();
    assert!(button.code.contains("from '/lib/cn'"));
    assert!(
        button
            .imports
            .iter()
            .any(|i| i.target == ImportTarget::Local(path("/lib/cn")))
    );
}

#[test]
fn test_broken_file_does_not_block_sibling() {
    let vfs = FilesBuilder::new()
        .add_file(
            "/Broken.jsx",
            "export default function Broken() {\n  return <div className=\"x\"\n}\n",
        )
        .add_file("/Fine.jsx", "export default () => <p>fine</p>;")
        .build()
        .unwrap();

    let results = engine().transform_all(&vfs);

    let err = results[&path("/Broken.jsx")].as_ref().unwrap_err();
    assert_eq!(err.path, "/Broken.jsx");
    assert!(err.location.is_some());
    assert!(results[&path("/Fine.jsx")].is_ok());
}

#[test]
fn test_only_changed_file_is_retransformed() {
    let mut vfs = project();
    let mut engine = engine();

    engine.transform_all(&vfs);
    assert_eq!(engine.stats().misses, 3);

    vfs.update("/lib/cn.js", "export const cn = (...c) => c.filter(Boolean).join(' ');")
        .unwrap();
    engine.transform_all(&vfs);

    let stats = engine.stats();
    assert_eq!(stats.misses, 4);
    assert_eq!(stats.hits, 2);
}

#[test]
fn test_error_location_is_one_based() {
    let mut engine = engine();
    let err = engine
        .transform(&path("/A.jsx"), "const a = 1;\nconst b = (<div></span>);")
        .unwrap_err();
    assert_eq!(err.location, Some(Location::new(2, 17)));
}

#[test]
fn test_custom_alias_prefix() {
    let config = PreviewConfig::builder().alias_prefix("~/").build();
    let mut engine = TransformEngine::new(&config).unwrap();
    let module = engine
        .transform(&path("/App.jsx"), "import x from '~/lib/x';\nimport y from '@/y';")
        .unwrap();
    assert!(module.code.contains("from '/lib/x'"));
    assert!(module.code.contains("from '@/y'"));
}
