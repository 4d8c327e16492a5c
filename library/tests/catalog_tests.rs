use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use autonode::model::{Value, ValueType};
use autonode::plugin::{
    CallableDescriptor, ExtensionModule, MethodExport, ParameterInfo, ToolboxDefinition, ToolboxEntry,
    TypeExport,
};
use autonode::{CatalogConfig, ExtensionCatalog, LibraryError};

/// Counts how often the catalog asks it for exports.
struct CountingModule {
    calls: Arc<AtomicUsize>,
}

impl ExtensionModule for CountingModule {
    fn exported_types(&self) -> Vec<TypeExport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        vec![
            TypeExport::new("demo.Counter").with_method(MethodExport::function(
                "Zero",
                vec![],
                vec![ValueType::I32],
                |_| Ok(vec![Value::Integer(0)]),
            )),
        ]
    }
}

struct ListedModule;

struct ListedToolbox;

impl ToolboxDefinition for ListedToolbox {
    fn export_nodes(&self) -> Vec<ToolboxEntry> {
        vec![
            ToolboxEntry::callable(CallableDescriptor::function(
                "demo.Listed",
                "Zeta",
                vec![],
                vec![ValueType::Boolean],
                |_| Ok(vec![Value::from(true)]),
            )),
            ToolboxEntry::Divider,
            ToolboxEntry::callable(CallableDescriptor::function(
                "demo.Listed",
                "Alpha",
                vec![],
                vec![ValueType::Boolean],
                |_| Ok(vec![Value::from(false)]),
            )),
        ]
    }
}

impl ExtensionModule for ListedModule {
    fn toolbox_definitions(&self) -> Vec<Box<dyn ToolboxDefinition>> {
        vec![Box::new(ListedToolbox) as Box<dyn ToolboxDefinition>]
    }

    fn exported_types(&self) -> Vec<TypeExport> {
        panic!("definitions take precedence over exported types");
    }
}

fn builtins() -> ExtensionCatalog {
    ExtensionCatalog::new(CatalogConfig::builtins_only())
}

fn empty() -> ExtensionCatalog {
    ExtensionCatalog::new(CatalogConfig {
        include_builtins: false,
        ..CatalogConfig::builtins_only()
    })
}

fn entry_names(entries: &[ToolboxEntry]) -> Vec<&str> {
    entries
        .iter()
        .map(|e| e.descriptor().map(|d| d.name.as_str()).unwrap_or("----"))
        .collect()
}

#[test]
fn test_builtin_toolboxes_are_sorted_by_name() {
    let catalog = builtins();
    let names = catalog.toolbox_names().expect("catalog should build");
    assert_eq!(
        names,
        vec![
            "Basic",
            "Boolean Logic",
            "Data Grid",
            "Date",
            "Generator",
            "Math",
            "String Processing",
            "Vector",
        ]
    );
}

#[test]
fn test_build_is_idempotent() {
    let catalog = builtins();
    assert!(!catalog.is_built());
    let first = catalog.toolboxes().expect("first build") as *const _;
    let second = catalog.toolboxes().expect("second access") as *const _;
    assert!(catalog.is_built());
    assert_eq!(first, second);
    assert_eq!(catalog.toolbox_names().unwrap(), catalog.toolbox_names().unwrap());
}

#[test]
fn test_independent_builds_list_the_same_callables() {
    let listing = |catalog: &ExtensionCatalog| -> Vec<(String, Vec<String>)> {
        let toolboxes = catalog.toolboxes().expect("catalog should build");
        toolboxes
            .iter()
            .map(|(name, entries)| {
                (name.to_string(), entry_names(entries).into_iter().map(str::to_string).collect())
            })
            .collect()
    };
    let first = builtins();
    let second = builtins();
    assert_eq!(listing(&first), listing(&second));
    assert_eq!(listing(&first).len(), 8);
}

#[test]
fn test_generic_strategy_orders_statics_and_appends_dividers() {
    let catalog = builtins();
    let vector = catalog.toolbox("Vector").unwrap().expect("Vector toolbox");
    assert_eq!(
        entry_names(vector),
        vec!["Add", "Dot", "Max", "Min", "Scale", "Sum", "----", "Mean", "Summary", "Variance", "----"]
    );
    for descriptor in vector.iter().filter_map(ToolboxEntry::descriptor) {
        assert_eq!(descriptor.toolbox, "Vector");
    }
}

#[test]
fn test_convention_strategy_keeps_entries_verbatim() {
    let catalog = empty().with_module("Listed", Arc::new(ListedModule));
    let listed = catalog.toolbox("Listed").unwrap().expect("Listed toolbox");
    assert_eq!(entry_names(listed), vec!["Zeta", "----", "Alpha"]);
}

#[test]
fn test_types_sharing_a_toolbox_are_separated() {
    let catalog = builtins();
    let logic = catalog.toolbox("Boolean Logic").unwrap().unwrap();
    assert_eq!(
        entry_names(logic),
        vec!["All", "And", "Any", "Not", "Or", "Xor", "----", "Choose", "Equal", "Greater", "Less"]
    );

    let grid = catalog.toolbox("Data Grid").unwrap().unwrap();
    assert_eq!(
        entry_names(grid),
        vec!["Make DataGrid", "Add Column", "Column", "Size", "Parse CSV"]
    );
}

#[test]
fn test_resource_ids() {
    let catalog = builtins();
    let make = catalog.find("Data Grid", "Make DataGrid").unwrap().unwrap();
    assert_eq!(make.resource_id(), "Standard.DataGrid.#ctor()");
    assert_eq!(make.output_names.as_deref(), Some(&["DataGrid".to_string()][..]));

    let column = catalog.find("Data Grid", "Column").unwrap().unwrap();
    assert_eq!(column.resource_id(), "Standard.DataGrid.Column(string)");
    assert_eq!(column.input_types, vec![ValueType::Table, ValueType::String]);

    let add = catalog.find("Math", "Add").unwrap().unwrap();
    assert_eq!(add.resource_id(), "Standard.Calculator.Add(f64,f64)");
    assert_eq!(add.documentation_signature(), "M:Standard.Calculator.Add(f64,f64)");
}

#[test]
fn test_lookup_distinguishes_empty_catalog_from_missing_node() {
    let catalog = empty();
    match catalog.lookup("Standard.Calculator.Add(f64,f64)") {
        Err(LibraryError::NoToolboxesLoaded { resource_id }) => {
            assert_eq!(resource_id, "Standard.Calculator.Add(f64,f64)")
        }
        other => panic!("expected NoToolboxesLoaded, got {:?}", other.map(|d| d.name.clone())),
    }

    let catalog = builtins();
    let found = catalog
        .lookup("Standard.Calculator.Add(f64,f64)")
        .expect("Add should resolve");
    assert_eq!(found.name, "Add");
    assert_eq!(found.toolbox, "Math");

    match catalog.lookup("Standard.Calculator.Add(f64)") {
        Err(LibraryError::NodeNotFound { toolbox_count, .. }) => assert_eq!(toolbox_count, 8),
        other => panic!("expected NodeNotFound, got {:?}", other.map(|d| d.name.clone())),
    }
}

#[test]
fn test_lookup_skips_frontend_native_entries() {
    let catalog = builtins();
    let number = catalog.find("Basic", "Number").unwrap().expect("Number literal");
    assert!(number.frontend_native);
    assert!(matches!(
        catalog.lookup(&number.resource_id()),
        Err(LibraryError::NodeNotFound { .. })
    ));
}

#[test]
fn test_duplicate_toolbox_fails_before_indexing() {
    let calls = Arc::new(AtomicUsize::new(0));
    let catalog = empty()
        .with_module("Twice", Arc::new(CountingModule { calls: calls.clone() }))
        .with_module("Twice", Arc::new(CountingModule { calls: calls.clone() }));
    match catalog.toolbox_names() {
        Err(LibraryError::DuplicateToolbox { name, .. }) => assert_eq!(name, "Twice"),
        other => panic!("expected DuplicateToolbox, got {:?}", other),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(!catalog.is_built());
}

#[test]
fn test_module_named_like_a_builtin_is_rejected() {
    let calls = Arc::new(AtomicUsize::new(0));
    let catalog = builtins().with_module("Basic", Arc::new(CountingModule { calls: calls.clone() }));
    assert!(matches!(
        catalog.toolboxes(),
        Err(LibraryError::DuplicateToolbox { .. })
    ));

    let catalog = builtins().with_module("Generator", Arc::new(CountingModule { calls: calls.clone() }));
    assert!(matches!(
        catalog.toolboxes(),
        Err(LibraryError::DuplicateToolbox { .. })
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_register_appends_after_a_divider() {
    let mut catalog = builtins();
    let before = catalog.toolbox("Math").unwrap().unwrap().len();
    let half = CallableDescriptor::function("demo.Extra", "Half", vec![ValueType::F64], vec![ValueType::F64], |args| {
        Ok(vec![Value::from(args[0].as_f64().unwrap_or_default() / 2.0)])
    });
    catalog.register("Math", half).expect("register");

    let math = catalog.toolbox("Math").unwrap().unwrap();
    assert_eq!(math.len(), before + 2);
    assert!(math[before].is_divider());
    assert_eq!(math[before + 1].descriptor().unwrap().toolbox, "Math");

    let one = CallableDescriptor::function("demo.Extra", "One", vec![], vec![ValueType::F64], |_| {
        Ok(vec![Value::from(1.0)])
    });
    catalog.register_many("Fresh", vec![one]).expect("register_many");
    let fresh = catalog.toolbox("Fresh").unwrap().unwrap();
    assert_eq!(entry_names(fresh), vec!["One"]);
    assert!(catalog.lookup("demo.Extra.Half(f64)").is_ok());
}

#[test]
fn test_register_type_lists_constructors_then_instance_then_static() {
    let mut catalog = empty();
    let ty = TypeExport::new("demo.Point")
        .with_constructor(MethodExport::constructor(
            vec![ParameterInfo::new("X", ValueType::F64), ParameterInfo::new("Y", ValueType::F64)],
            |args| Ok(Value::from(vec![args[0].clone(), args[1].clone()])),
        ))
        .with_method(MethodExport::function("Origin", vec![], vec![ValueType::object("demo.Point")], |_| {
            Ok(vec![Value::from(vec![0.0, 0.0])])
        }))
        .with_method(MethodExport::method("Length", vec![], vec![ValueType::F64], |_, _| {
            Ok(vec![Value::from(0.0)])
        }))
        .with_method(
            MethodExport::method("Hidden", vec![], vec![ValueType::F64], |_, _| Ok(vec![Value::from(0.0)])).internal(),
        );
    catalog.register_type("Geometry", &ty).expect("register_type");

    let geometry = catalog.toolbox("Geometry").unwrap().unwrap();
    assert_eq!(entry_names(geometry), vec!["Make Point", "Length", "Origin"]);
    let make = geometry[0].descriptor().unwrap();
    assert_eq!(make.input_names.as_deref(), Some(&["X".to_string(), "Y".to_string()][..]));
    let length = geometry[1].descriptor().unwrap();
    assert_eq!(length.input_types, vec![ValueType::object("demo.Point")]);
    assert_eq!(length.resource_id(), "demo.Point.Length()");
}

#[test]
fn test_unloadable_package_is_skipped() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("broken.so"), b"not a library").unwrap();
    fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

    let catalog = ExtensionCatalog::new(CatalogConfig::builtins_only().with_package_dir(dir.path()));
    let names = catalog.toolbox_names().expect("broken packages do not fail the build");
    assert!(!names.iter().any(|n| n == "broken" || n == "notes"));
    assert!(names.iter().any(|n| n == "Math"));
}

#[test]
fn test_register_library_reports_load_failures() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("garbage.so");
    fs::write(&path, b"garbage").unwrap();

    let mut catalog = builtins();
    assert!(catalog.register_library(&path).is_err());
    assert!(catalog.toolbox("garbage").unwrap().is_none());
}
