//! Export metadata published by extension modules.
//!
//! This is the explicit stand-in for runtime reflection: an extension lists
//! its types and, for each, the constructors and methods it makes callable
//! together with their parameter and return types.

use std::fmt;
use std::sync::Arc;

use crate::error::LibraryError;
use crate::model::{Value, ValueType};

/// Name of the universal base type. Members it declares are never exported.
pub const UNIVERSAL_BASE_TYPE: &str = "Object";

/// Member name used for constructors in identifiers and signatures.
pub const CONSTRUCTOR_MEMBER_NAME: &str = "#ctor";

pub type StaticFn = dyn Fn(&[Value]) -> Result<Vec<Value>, LibraryError> + Send + Sync;
pub type InstanceFn = dyn Fn(&Value, &[Value]) -> Result<Vec<Value>, LibraryError> + Send + Sync;

/// Invocation binding of a callable.
///
/// Both variants are called with one ordered argument list; an instance
/// binding takes its receiver from the front of that list.
#[derive(Clone)]
pub enum Invoker {
    Static(Arc<StaticFn>),
    Instance(Arc<InstanceFn>),
}

impl Invoker {
    pub fn call(&self, args: &[Value]) -> Result<Vec<Value>, LibraryError> {
        match self {
            Invoker::Static(f) => f(args),
            Invoker::Instance(f) => {
                let (receiver, rest) = args.split_first().ok_or_else(|| {
                    LibraryError::InvalidArgument("instance call without a receiver".to_string())
                })?;
                if receiver.is_null() {
                    return Err(LibraryError::InvalidArgument(
                        "instance call on a null receiver".to_string(),
                    ));
                }
                f(receiver, rest)
            }
        }
    }
}

impl fmt::Debug for Invoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invoker::Static(_) => f.write_str("Invoker::Static"),
            Invoker::Instance(_) => f.write_str("Invoker::Instance"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    Static,
    Instance,
}

#[derive(Debug, Clone)]
pub struct ParameterInfo {
    pub name: String,
    pub value_type: ValueType,
    pub default: Option<Value>,
}

impl ParameterInfo {
    pub fn new(name: &str, value_type: ValueType) -> Self {
        Self {
            name: name.to_string(),
            value_type,
            default: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// A constructor or method of an exported type.
#[derive(Debug, Clone)]
pub struct MethodExport {
    pub name: String,
    /// Type that declares the member; `None` means the exporting type itself.
    pub declaring_type: Option<String>,
    pub receiver: Receiver,
    pub visibility: Visibility,
    pub parameters: Vec<ParameterInfo>,
    pub returns: Vec<ValueType>,
    pub return_names: Option<Vec<String>>,
    pub invoker: Invoker,
}

impl MethodExport {
    /// A static callable.
    pub fn function<F>(name: &str, parameters: Vec<ParameterInfo>, returns: Vec<ValueType>, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Vec<Value>, LibraryError> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            declaring_type: None,
            receiver: Receiver::Static,
            visibility: Visibility::Public,
            parameters,
            returns,
            return_names: None,
            invoker: Invoker::Static(Arc::new(f)),
        }
    }

    /// An instance callable; `f` receives the receiver separately.
    pub fn method<F>(name: &str, parameters: Vec<ParameterInfo>, returns: Vec<ValueType>, f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Vec<Value>, LibraryError> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            declaring_type: None,
            receiver: Receiver::Instance,
            visibility: Visibility::Public,
            parameters,
            returns,
            return_names: None,
            invoker: Invoker::Instance(Arc::new(f)),
        }
    }

    /// A constructor. Its single return type is the owning type's value type
    /// and is filled in when the descriptor is built.
    pub fn constructor<F>(parameters: Vec<ParameterInfo>, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, LibraryError> + Send + Sync + 'static,
    {
        Self {
            name: CONSTRUCTOR_MEMBER_NAME.to_string(),
            declaring_type: None,
            receiver: Receiver::Static,
            visibility: Visibility::Public,
            parameters,
            returns: Vec::new(),
            return_names: None,
            invoker: Invoker::Static(Arc::new(move |args: &[Value]| Ok(vec![f(args)?]))),
        }
    }

    pub fn with_return_names(mut self, names: &[&str]) -> Self {
        self.return_names = Some(names.iter().map(|n| n.to_string()).collect());
        self
    }

    pub fn declared_by(mut self, type_name: &str) -> Self {
        self.declaring_type = Some(type_name.to_string());
        self
    }

    pub fn internal(mut self) -> Self {
        self.visibility = Visibility::Internal;
        self
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn is_static(&self) -> bool {
        self.receiver == Receiver::Static
    }

    /// Comma separated parameter type names, receiver excluded.
    pub fn parameter_signature(&self) -> String {
        self.parameters
            .iter()
            .map(|p| p.value_type.type_name())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// An exported type and its callable members.
#[derive(Debug, Clone)]
pub struct TypeExport {
    pub full_name: String,
    pub name: String,
    pub visibility: Visibility,
    /// Abstract types only carry static members.
    pub is_abstract: bool,
    /// How instances travel through pins.
    pub value_type: ValueType,
    pub constructors: Vec<MethodExport>,
    pub methods: Vec<MethodExport>,
}

impl TypeExport {
    pub fn new(full_name: &str) -> Self {
        let name = full_name.rsplit('.').next().unwrap_or(full_name);
        Self {
            full_name: full_name.to_string(),
            name: name.to_string(),
            visibility: Visibility::Public,
            is_abstract: false,
            value_type: ValueType::object(full_name),
            constructors: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn internal(mut self) -> Self {
        self.visibility = Visibility::Internal;
        self
    }

    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn with_constructor(mut self, constructor: MethodExport) -> Self {
        self.constructors.push(constructor);
        self
    }

    pub fn with_method(mut self, method: MethodExport) -> Self {
        self.methods.push(method);
        self
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Full name of the type that declares `method`.
    pub fn declaring_type_of<'a>(&'a self, method: &'a MethodExport) -> &'a str {
        method.declaring_type.as_deref().unwrap_or(&self.full_name)
    }

    fn exported(&self, receiver: Receiver) -> Vec<&MethodExport> {
        let mut methods: Vec<&MethodExport> = self
            .methods
            .iter()
            .filter(|m| m.receiver == receiver && m.is_public())
            .filter(|m| self.declaring_type_of(m) != UNIVERSAL_BASE_TYPE)
            .collect();
        methods.sort_by(|a, b| a.name.cmp(&b.name));
        methods
    }

    /// Public static methods not inherited from the universal base, by name.
    pub fn static_methods(&self) -> Vec<&MethodExport> {
        self.exported(Receiver::Static)
    }

    /// Public instance methods not inherited from the universal base, by name.
    pub fn instance_methods(&self) -> Vec<&MethodExport> {
        self.exported(Receiver::Instance)
    }

    pub fn public_constructors(&self) -> Vec<&MethodExport> {
        self.constructors.iter().filter(|c| c.is_public()).collect()
    }
}
