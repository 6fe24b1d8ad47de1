//! End-to-end resolution against real layout directories.

use std::fs;
use std::path::{Path, PathBuf};

use layout_resolver::adapters::live::filesystem::LiveFileSystem;
use layout_resolver::cli::PolicyArgs;
use layout_resolver::commands::aggregate::{aggregate, AggregateOptions};
use layout_resolver::context::ServiceContext;
use layout_resolver::emit;
use layout_resolver::loader;
use layout_resolver::module::ModuleName;
use layout_resolver::policy::{ConflictPolicy, Namespacing, Policy, Traversal};
use layout_resolver::resolve::resolve_main;
use layout_resolver::rewrite::Identity;
use layout_resolver::{ErrorKind, MergedDocument};

fn write_module(root: &Path, module: &str, text: &str) {
    let path = root.join(format!("{}.yaml", module.replace('.', "/")));
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

/// A small demo tree with a nested module, a shared dependency and a cycle.
fn demo_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_module(
        root,
        "app",
        "import: [widgets.buttons, widgets.text]\n\
         app:\n  title: Hello\n  window: main_window\n\
         widgets:\n  main_window:\n    type: window\n    children: [ok_button, caption]\n",
    );
    write_module(
        root,
        "widgets.buttons",
        "import: [common]\nwidgets:\n  ok_button: {type: button, label: OK}\n",
    );
    write_module(
        root,
        "widgets.text",
        "import: [common, app]\nwidgets:\n  caption: {type: text, value: greeting}\n",
    );
    write_module(
        root,
        "common",
        "# shared data\ndata:\n  greeting: Hello, world\n  count: 3\n",
    );
    dir
}

fn aggregate_policy() -> Policy {
    Policy::aggregate()
}

fn resolve(root: &Path, policy: Policy) -> MergedDocument {
    let search_paths = vec![root.to_path_buf()];
    resolve_main(&LiveFileSystem, None, search_paths, "app", policy).unwrap()
}

#[test]
fn every_reachable_module_is_visited_once() {
    let dir = demo_tree();
    for traversal in [Traversal::BreadthFirst, Traversal::DepthFirst] {
        let policy = Policy {
            traversal,
            ..aggregate_policy()
        };
        let doc = resolve(dir.path(), policy);
        let mut visited: Vec<&str> = doc.visited.iter().map(ModuleName::as_str).collect();
        visited.sort_unstable();
        assert_eq!(
            visited,
            vec!["app", "common", "widgets.buttons", "widgets.text"]
        );
    }
}

#[test]
fn strict_qualified_resolution_of_the_demo_tree() {
    let dir = demo_tree();
    let policy = Policy {
        conflict: ConflictPolicy::Strict,
        traversal: Traversal::BreadthFirst,
        namespacing: Namespacing::Qualified,
        bootstrap: None,
    };
    let doc = resolve(dir.path(), policy);
    let widgets: Vec<&str> = doc.widgets.keys().map(String::as_str).collect();
    assert_eq!(
        widgets,
        vec!["app.main_window", "widgets.buttons.ok_button", "widgets.text.caption"]
    );
    assert_eq!(doc.data.len(), 2);
}

#[test]
fn aggregation_is_byte_identical_across_runs() {
    let dir = demo_tree();
    let render = || {
        let doc = resolve(dir.path(), aggregate_policy()).rewrite(&mut Identity);
        emit::render(&doc, dir.path()).unwrap()
    };
    assert_eq!(render(), render());
}

#[test]
fn aggregated_file_round_trips_as_a_single_module() {
    let dir = demo_tree();
    let out = tempfile::tempdir().unwrap();
    let output = out.path().join("docs/hello.yaml");

    let options = AggregateOptions {
        root: dir.path().to_path_buf(),
        output: Some(output.clone()),
        main: "app".to_string(),
        search_paths: Vec::new(),
        policy: PolicyArgs::default(),
    };
    let summary = aggregate(&ServiceContext::live(), &options).unwrap();
    assert_eq!(summary.modules, 4);
    assert_eq!(summary.output, output);

    let original = resolve(dir.path(), aggregate_policy());
    let reparsed = resolve_main(
        &LiveFileSystem,
        None,
        vec![out.path().join("docs")],
        "hello",
        aggregate_policy(),
    )
    .unwrap();

    assert_eq!(reparsed.visited.len(), 1);
    assert_eq!(reparsed.app.value, original.app.value);
    for (key, definition) in &original.widgets {
        let widget = &reparsed.widgets[key];
        assert_eq!(widget.value, definition.value, "widget {key}");
    }
    for (key, definition) in &original.data {
        assert_eq!(reparsed.data[key].value, definition.value, "data {key}");
    }
    assert_eq!(reparsed.widgets.len(), original.widgets.len());
    assert_eq!(reparsed.data.len(), original.data.len());
}

#[test]
fn extra_search_paths_come_after_the_root() {
    let dir = demo_tree();
    let shared = tempfile::tempdir().unwrap();
    write_module(
        dir.path(),
        "app",
        "import: theme\napp: {}\nwidgets: {w: 1}\n",
    );
    write_module(shared.path(), "theme", "data:\n  accent: blue\n");

    let doc = resolve_main(
        &LiveFileSystem,
        None,
        vec![dir.path().to_path_buf(), shared.path().to_path_buf()],
        "app",
        aggregate_policy(),
    )
    .unwrap();
    assert_eq!(doc.data["accent"].module.as_str(), "theme");
}

#[test]
fn missing_search_directory_is_rejected_up_front() {
    let dir = demo_tree();
    let missing = PathBuf::from("/definitely/missing/layouts");
    let search_paths = vec![dir.path().to_path_buf(), missing];
    let err = resolve_main(
        &LiveFileSystem,
        None,
        search_paths,
        "app",
        aggregate_policy(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSearchPath);
}

#[test]
fn placeholder_module_files_are_accepted() {
    let dir = demo_tree();
    write_module(dir.path(), "common", "");
    let doc = resolve(dir.path(), aggregate_policy());
    assert!(doc.data.is_empty());

    let content = loader::load(
        &LiveFileSystem,
        &ModuleName::parse("common").unwrap(),
        &dir.path().join("common.yaml"),
    )
    .unwrap();
    assert!(content.widgets.is_empty());
}
