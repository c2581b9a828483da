//! Loading feature files and directories from disk

use gherkin_tree::{ElementKind, ModelError, Modeler, NodeId, Tree};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// features/
///   b.feature, a.feature, notes.txt
///   nested/c.feature
///   empty/
fn features() -> TempDir {
    let root = TempDir::new().unwrap();
    write(root.path(), "b.feature", "Feature: b\n  Scenario: one\n  Scenario: two");
    write(root.path(), "a.feature", "Feature: a\n  Scenario: only");
    write(root.path(), "notes.txt", "not a feature");
    write(root.path(), "nested/c.feature", "@nested\nFeature: c");
    fs::create_dir_all(root.path().join("empty")).unwrap();
    root
}

fn names(tree: &Tree, ids: &[NodeId]) -> Vec<String> {
    ids.iter()
        .map(|id| match tree.element(*id).as_feature_file() {
            Some(file) => file.name(),
            None => tree.element(*id).as_directory().unwrap().name(),
        })
        .collect()
}

#[test]
fn test_load_directory() {
    let root = features();
    let mut tree = Tree::new();

    let directory = Modeler::new().load_directory(&mut tree, root.path()).unwrap();
    let element = tree.element(directory).as_directory().unwrap();

    assert_eq!(element.path, root.path());
    assert_eq!(names(&tree, element.feature_files()), vec!["a.feature", "b.feature"]);
    assert_eq!(names(&tree, element.directories()), vec!["empty", "nested"]);
    assert_eq!(tree.test_count(directory), 3);

    let nested = element.directories()[1];
    let file = tree.element(nested).as_directory().unwrap().feature_files()[0];
    assert_eq!(tree.parent(file), Some(nested));
    assert_eq!(tree.get_ancestor(file, ElementKind::Directory), Some(nested));
    assert_eq!(tree.parent(nested), Some(directory));
    assert_eq!(tree.roots().collect::<Vec<_>>(), vec![directory]);
}

#[test]
fn test_load_feature_file_records_path() {
    let root = features();
    let path = root.path().join("a.feature");
    let mut tree = Tree::new();

    let file = Modeler::new().load_feature_file(&mut tree, &path).unwrap();

    let element = tree.element(file).as_feature_file().unwrap();
    assert_eq!(element.path, path);
    assert_eq!(element.name(), "a.feature");
    assert_eq!(tree.test_count(file), 1);
}

#[test]
fn test_missing_paths_are_io_errors() {
    let root = features();
    let modeler = Modeler::new();
    let mut tree = Tree::new();

    let missing = root.path().join("missing.feature");
    let error = modeler.load_feature_file(&mut tree, &missing).unwrap_err();
    assert!(matches!(error, ModelError::Io { ref path, .. } if *path == missing));

    let error = modeler
        .load_directory(&mut tree, root.path().join("missing"))
        .unwrap_err();
    assert!(matches!(error, ModelError::Io { .. }));

    // A file is not a directory
    let error = modeler
        .load_directory(&mut tree, root.path().join("a.feature"))
        .unwrap_err();
    assert!(matches!(error, ModelError::Io { .. }));
    assert!(tree.is_empty());
}

#[test]
fn test_failed_load_leaves_tree_untouched() {
    let root = features();
    write(root.path(), "nested/broken.feature", "Feature: broken\n  Given a step outside any scenario");
    let modeler = Modeler::new();
    let mut tree = Tree::new();
    let existing = modeler
        .model_document(&mut tree, "Feature: kept", "kept.feature")
        .unwrap();
    let before = tree.len();

    let error = modeler.load_directory(&mut tree, root.path()).unwrap_err();

    assert!(matches!(error, ModelError::Syntax(ref syntax) if syntax.file.ends_with("broken.feature")));
    assert_eq!(tree.len(), before);
    assert_eq!(tree.roots().collect::<Vec<_>>(), vec![existing]);
}
