use autonode::LibraryError;
use autonode::model::{Value, ValueType};
use autonode::plugin::{ExtensionModule, MethodExport, ParameterInfo, TypeExport};

pub struct StringToolsModule;

impl ExtensionModule for StringToolsModule {
    fn exported_types(&self) -> Vec<TypeExport> {
        vec![text_type(), case_type(), scratch_type()]
    }
}

fn text_arg(args: &[Value]) -> Result<&str, LibraryError> {
    args.first()
        .and_then(Value::as_str)
        .ok_or_else(|| LibraryError::InvalidArgument("expected text".to_string()))
}

fn text_fn<T, F>(name: &str, returns: ValueType, f: F) -> MethodExport
where
    T: Into<Value>,
    F: Fn(&str) -> T + Send + Sync + 'static,
{
    MethodExport::function(
        name,
        vec![ParameterInfo::new("Text", ValueType::String)],
        vec![returns],
        move |args| Ok(vec![f(text_arg(args)?).into()]),
    )
}

fn capitalize(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_palindrome(text: &str) -> bool {
    let letters: Vec<char> = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    letters.iter().eq(letters.iter().rev())
}

fn join_words(text: &str, separator: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(separator)
}

fn text_type() -> TypeExport {
    TypeExport::new("StringTools.Text")
        .abstract_type()
        .with_method(text_fn("Reverse", ValueType::String, |t| t.chars().rev().collect::<String>()))
        .with_method(text_fn("Capitalize", ValueType::String, capitalize))
        .with_method(text_fn("WordCount", ValueType::I32, |t| t.split_whitespace().count() as i64))
        .with_method(text_fn("IsPalindrome", ValueType::Boolean, is_palindrome))
}

fn case_type() -> TypeExport {
    TypeExport::new("StringTools.Case")
        .with_method(text_fn("Snake", ValueType::String, |t| join_words(t, "_")))
        .with_method(text_fn("Kebab", ValueType::String, |t| join_words(t, "-")))
        .with_method(
            MethodExport::method("Describe", vec![], vec![ValueType::String], |receiver, _| {
                Ok(vec![Value::from(receiver.to_string())])
            }),
        )
}

/// Not exported: internal helpers stay out of the toolbox.
fn scratch_type() -> TypeExport {
    TypeExport::new("StringTools.Scratch")
        .internal()
        .with_method(text_fn("Echo", ValueType::String, str::to_string))
}

#[allow(improper_ctypes_definitions)]
#[unsafe(no_mangle)]
pub extern "C" fn create_extension_module() -> *mut dyn ExtensionModule {
    let module: Box<dyn ExtensionModule> = Box::new(StringToolsModule);
    Box::into_raw(module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use autonode::plugin::ToolboxEntry;
    use autonode::{CatalogConfig, ExtensionCatalog};
    use std::sync::Arc;

    #[test]
    fn test_helpers() {
        assert_eq!(capitalize("hello big world"), "Hello Big World");
        assert!(is_palindrome("Never odd or even"));
        assert_eq!(join_words("Hello big-World", "_"), "hello_big_world");
    }

    #[test]
    fn test_indexed_in_process() {
        let config = CatalogConfig {
            include_builtins: false,
            ..CatalogConfig::builtins_only()
        };
        let catalog = ExtensionCatalog::new(config).with_module("String Tools", Arc::new(StringToolsModule));
        let entries = catalog.toolbox("String Tools").unwrap().unwrap();
        let names: Vec<Option<&str>> = entries
            .iter()
            .map(|e| e.descriptor().map(|d| d.name.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![
                Some("Capitalize"),
                Some("IsPalindrome"),
                Some("Reverse"),
                Some("WordCount"),
                None,
                Some("Kebab"),
                Some("Snake"),
                None,
            ]
        );
        assert!(entries.last().is_some_and(ToolboxEntry::is_divider));

        let reverse = catalog.lookup("StringTools.Text.Reverse(string)").unwrap();
        assert_eq!(reverse.invoke(&[Value::from("abc")]).unwrap(), vec![Value::from("cba")]);
    }
}
