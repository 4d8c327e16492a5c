//! Callable descriptors: metadata plus invocation binding for one export.

use std::sync::Arc;

use crate::error::LibraryError;
use crate::model::{Value, ValueType};
use crate::plugin::export::{CONSTRUCTOR_MEMBER_NAME, Invoker, MethodExport, Receiver, TypeExport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallableKind {
    Constructor,
    Static,
    Instance,
}

#[derive(Debug, Clone)]
pub struct CallableDescriptor {
    /// Display name, e.g. `Make DataGrid` or `Concat`.
    pub name: String,
    /// Owning toolbox; assigned when the descriptor enters the catalog.
    pub toolbox: String,
    pub kind: CallableKind,
    pub declaring_type: String,
    pub member_name: String,
    pub input_types: Vec<ValueType>,
    pub output_types: Vec<ValueType>,
    pub default_input_values: Option<Vec<Option<Value>>>,
    pub input_names: Option<Vec<String>>,
    pub output_names: Option<Vec<String>>,
    pub tooltip: Option<String>,
    /// Supplied by the host front-end rather than a loaded extension.
    pub frontend_native: bool,
    invoker: Invoker,
}

impl CallableDescriptor {
    pub fn new(
        name: &str,
        declaring_type: &str,
        member_name: &str,
        input_types: Vec<ValueType>,
        output_types: Vec<ValueType>,
        invoker: Invoker,
    ) -> Self {
        let kind = match (&invoker, member_name) {
            (Invoker::Instance(_), _) => CallableKind::Instance,
            (_, CONSTRUCTOR_MEMBER_NAME) => CallableKind::Constructor,
            _ => CallableKind::Static,
        };
        Self {
            name: name.to_string(),
            toolbox: String::new(),
            kind,
            declaring_type: declaring_type.to_string(),
            member_name: member_name.to_string(),
            input_types,
            output_types,
            default_input_values: None,
            input_names: None,
            output_names: None,
            tooltip: None,
            frontend_native: false,
            invoker,
        }
    }

    /// A static callable named after its member.
    pub fn function<F>(
        declaring_type: &str,
        name: &str,
        input_types: Vec<ValueType>,
        output_types: Vec<ValueType>,
        f: F,
    ) -> Self
    where
        F: Fn(&[Value]) -> Result<Vec<Value>, LibraryError> + Send + Sync + 'static,
    {
        Self::new(
            name,
            declaring_type,
            name,
            input_types,
            output_types,
            Invoker::Static(Arc::new(f)),
        )
    }

    /// Descriptor for a constructor of `ty`, named `Make <TypeName>`.
    pub fn from_constructor(ty: &TypeExport, constructor: &MethodExport) -> Self {
        let mut descriptor = Self::new(
            &format!("Make {}", ty.name),
            ty.declaring_type_of(constructor),
            CONSTRUCTOR_MEMBER_NAME,
            constructor.parameters.iter().map(|p| p.value_type.clone()).collect(),
            vec![ty.value_type.clone()],
            constructor.invoker.clone(),
        );
        descriptor.apply_parameters(constructor, None);
        descriptor.output_names = Some(vec![ty.name.clone()]);
        descriptor
    }

    /// Descriptor for a static or instance method of `ty`.
    ///
    /// Instance methods take the receiver as their first input.
    pub fn from_method(ty: &TypeExport, method: &MethodExport) -> Self {
        let receiver = match method.receiver {
            Receiver::Instance => Some((ty.name.as_str(), ty.value_type.clone())),
            Receiver::Static => None,
        };
        let mut input_types: Vec<ValueType> = receiver.iter().map(|(_, t)| t.clone()).collect();
        input_types.extend(method.parameters.iter().map(|p| p.value_type.clone()));

        let mut descriptor = Self::new(
            &method.name,
            ty.declaring_type_of(method),
            &method.name,
            input_types,
            method.returns.clone(),
            method.invoker.clone(),
        );
        descriptor.apply_parameters(method, receiver.map(|(name, _)| name));
        descriptor.output_names = method.return_names.clone();
        descriptor
    }

    fn apply_parameters(&mut self, method: &MethodExport, receiver_name: Option<&str>) {
        let mut names: Vec<String> = receiver_name.iter().map(|n| n.to_string()).collect();
        names.extend(method.parameters.iter().map(|p| p.name.clone()));
        if !names.is_empty() {
            self.input_names = Some(names);
        }

        if method.parameters.iter().any(|p| p.default.is_some()) {
            let mut defaults: Vec<Option<Value>> = receiver_name.iter().map(|_| None).collect();
            defaults.extend(method.parameters.iter().map(|p| p.default.clone()));
            self.default_input_values = Some(defaults);
        }
    }

    pub fn with_input_names(mut self, names: &[&str]) -> Self {
        self.input_names = Some(names.iter().map(|n| n.to_string()).collect());
        self
    }

    pub fn with_output_names(mut self, names: &[&str]) -> Self {
        self.output_names = Some(names.iter().map(|n| n.to_string()).collect());
        self
    }

    pub fn with_defaults(mut self, defaults: Vec<Option<Value>>) -> Self {
        self.default_input_values = Some(defaults);
        self
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn frontend_native(mut self) -> Self {
        self.frontend_native = true;
        self
    }

    pub fn input_arity(&self) -> usize {
        self.input_types.len()
    }

    pub fn output_arity(&self) -> usize {
        self.output_types.len()
    }

    /// Declared parameter types, receiver excluded, as a signature list.
    fn parameter_signature(&self) -> String {
        let skip = usize::from(self.kind == CallableKind::Instance);
        self.input_types
            .iter()
            .skip(skip)
            .map(ValueType::type_name)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Runtime identity used to re-resolve persisted nodes:
    /// `<FullTypeName>.<MemberName>(<ParamType1>,<ParamType2>,...)`.
    pub fn resource_id(&self) -> String {
        format!(
            "{}.{}({})",
            self.declaring_type,
            self.member_name,
            self.parameter_signature()
        )
    }

    /// Key into a documentation artifact: `M:` followed by the resource id.
    pub fn documentation_signature(&self) -> String {
        format!("M:{}", self.resource_id())
    }

    /// Calls the bound callable with ordered arguments.
    pub fn invoke(&self, args: &[Value]) -> Result<Vec<Value>, LibraryError> {
        if args.len() != self.input_arity() {
            return Err(LibraryError::InvalidArgument(format!(
                "`{}` takes {} argument(s) but {} were supplied",
                self.name,
                self.input_arity(),
                args.len()
            )));
        }
        let outputs = self.invoker.call(args)?;
        if outputs.len() != self.output_arity() {
            return Err(LibraryError::runtime(format!(
                "`{}` returned {} value(s), expected {}",
                self.name,
                outputs.len(),
                self.output_arity()
            )));
        }
        Ok(outputs)
    }
}
