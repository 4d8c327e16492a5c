//! Loads the built `string_tools` library the way a host application does.

use std::env::consts::{DLL_EXTENSION, DLL_PREFIX, DLL_SUFFIX};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use autonode::model::Value;
use autonode::plugin::LoadedUnit;
use autonode::{CatalogConfig, ExtensionCatalog, LibraryError};
use string_tools::StringToolsModule;

/// The cdylib cargo built next to this test binary.
fn built_library() -> PathBuf {
    let file_name = format!("{}string_tools{}", DLL_PREFIX, DLL_SUFFIX);
    let exe = std::env::current_exe().expect("test binary path");
    let deps = exe.parent().expect("deps directory");
    [deps.join(&file_name), deps.join("..").join(&file_name)]
        .into_iter()
        .find(|path| path.is_file())
        .unwrap_or_else(|| panic!("{} was not built next to {}", file_name, deps.display()))
}

fn documentation_file() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("libstring_tools.docs.json")
}

/// Copies the library into `dir` as `<toolbox>.<ext>`, with its docs when asked.
fn install(dir: &Path, toolbox: &str, with_docs: bool) -> PathBuf {
    let target = dir.join(format!("{}.{}", toolbox, DLL_EXTENSION));
    fs::copy(built_library(), &target).expect("copy library");
    if with_docs {
        fs::copy(documentation_file(), dir.join(format!("{}.docs.json", toolbox))).expect("copy docs");
    }
    target
}

fn documented(dir: &Path) -> CatalogConfig {
    CatalogConfig {
        load_documentation: true,
        ..CatalogConfig::builtins_only().with_package_dir(dir)
    }
}

#[test]
fn test_package_directory_indexes_the_library() {
    let dir = tempfile::tempdir().expect("tempdir");
    install(dir.path(), "Text Tools", true);
    let catalog = ExtensionCatalog::new(documented(dir.path()));

    let discovery = catalog.discover().expect("discover");
    assert_eq!(discovery.library_count(), 1);
    assert!(discovery.units().iter().any(|u| u.name == "Text Tools"));
    drop(discovery);

    let reverse = catalog.find("Text Tools", "Reverse").unwrap().expect("Reverse listed");
    assert_eq!(reverse.toolbox, "Text Tools");
    assert_eq!(reverse.tooltip.as_deref(), Some("Reverses the characters of a text."));

    let found = catalog.lookup("StringTools.Text.Reverse(string)").expect("lookup");
    assert_eq!(found.invoke(&[Value::from("abc")]).unwrap(), vec![Value::from("cba")]);
    assert!(catalog.toolbox_names().unwrap().iter().any(|n| n == "Math"));
}

#[test]
fn test_package_named_like_a_frontend_toolbox_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = install(dir.path(), "Basic", false);
    let catalog = ExtensionCatalog::new(CatalogConfig::builtins_only().with_package_dir(dir.path()));

    match catalog.toolbox_names() {
        Err(LibraryError::DuplicateToolbox { name, existing }) => {
            assert_eq!(name, "Basic");
            assert_eq!(existing, path.display().to_string());
        }
        other => panic!("expected DuplicateToolbox, got {:?}", other),
    }
    assert!(!catalog.is_built());
}

#[test]
fn test_package_named_like_a_builtin_module_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    install(dir.path(), "Generator", false);
    let catalog = ExtensionCatalog::new(CatalogConfig::builtins_only().with_package_dir(dir.path()));

    assert!(matches!(
        catalog.toolboxes(),
        Err(LibraryError::DuplicateToolbox { .. })
    ));
}

#[test]
fn test_register_library_appends_a_toolbox() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = install(dir.path(), "Extras", true);
    let mut catalog = ExtensionCatalog::new(documented(Path::new("missing-packages")));

    let name = catalog.register_library(&path).expect("register_library");
    assert_eq!(name, "Extras");
    let snake = catalog.find("Extras", "Snake").unwrap().expect("Snake listed");
    assert_eq!(snake.tooltip.as_deref(), Some("Converts text to snake_case."));
    assert_eq!(
        snake.invoke(&[Value::from("Hello Big World")]).unwrap(),
        vec![Value::from("hello_big_world")]
    );
}

#[test]
fn test_index_reads_documentation_next_to_the_location() {
    let unit = LoadedUnit {
        name: "String Tools".to_string(),
        location: Some(Path::new(env!("CARGO_MANIFEST_DIR")).join(format!("libstring_tools.{}", DLL_EXTENSION))),
        module: Arc::new(StringToolsModule),
    };

    let entries = ExtensionCatalog::index(&unit, true);
    let tooltips: Vec<(&str, Option<&str>)> = entries
        .iter()
        .filter_map(|e| e.descriptor())
        .map(|d| (d.name.as_str(), d.tooltip.as_deref()))
        .collect();
    assert!(tooltips.contains(&("WordCount", Some("Counts whitespace separated words."))));
    assert!(tooltips.contains(&("Kebab", Some("Converts text to kebab-case."))));

    let undocumented = ExtensionCatalog::index(&unit, false);
    assert!(undocumented.iter().filter_map(|e| e.descriptor()).all(|d| d.tooltip.is_none()));
}
