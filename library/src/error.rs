use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config parsing error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("Libloading error: {0}")]
    Libloading(#[from] libloading::Error),
    #[error("Plugin error: {0}")]
    Plugin(String),
    #[error("Toolbox `{name}` is already registered by {existing}.")]
    DuplicateToolbox { name: String, existing: String },
    #[error(
        "Node `{resource_id}` cannot be resolved because no toolbox is loaded. \
         Loading extensions on demand during deserialization is not supported."
    )]
    NoToolboxesLoaded { resource_id: String },
    #[error(
        "Node `{resource_id}` not found in {toolbox_count} loaded toolbox(es). \
         It may have been renamed or removed from its extension."
    )]
    NodeNotFound {
        resource_id: String,
        toolbox_count: usize,
    },
    #[error("Node `{0}` is not bound to a callable; resolve it against the catalog first.")]
    Unresolved(String),
    #[error("Failed to invoke `{callable}`: {source}")]
    Invocation {
        callable: String,
        #[source]
        source: Box<LibraryError>,
    },
    #[error("Cannot convert {value} to {target}.")]
    Coercion { value: String, target: String },
    #[error("Input `{0}` has no value.")]
    MissingInput(String),
    #[error("Graph error: {0}")]
    Graph(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl LibraryError {
    pub fn plugin(message: impl Into<String>) -> Self {
        LibraryError::Plugin(message.into())
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        LibraryError::Runtime(message.into())
    }

    pub fn coercion(value: impl std::fmt::Display, target: impl std::fmt::Display) -> Self {
        LibraryError::Coercion {
            value: value.to_string(),
            target: target.to_string(),
        }
    }

    /// The most specific message available: one level of `source()` is
    /// unwrapped when present.
    pub fn innermost_message(&self) -> String {
        use std::error::Error as _;
        match self.source() {
            Some(inner) => inner.to_string(),
            None => self.to_string(),
        }
    }
}

impl From<Box<dyn std::error::Error>> for LibraryError {
    fn from(err: Box<dyn std::error::Error>) -> Self {
        LibraryError::Runtime(err.to_string())
    }
}
