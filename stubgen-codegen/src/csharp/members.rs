//! Shared member rendering.
//!
//! Parameter lists, generic declarations and constraint clauses are the same
//! for every type kind; hook slots only appear on class stubs.

use crate::error::CodegenError;
use crate::names::{escape_identifier, render_hook_type, render_type, uses_generic_parameter};
use std::collections::HashSet;
use stubgen_metadata::{
    EventDef, GenericParam, GenericParamAttributes, MetadataSource, MethodDef, Parameter,
    PropertyDef, SYSTEM_NAMESPACE, TypeRef,
};

/// Largest number of inputs the `Func`/`Action` families accept.
pub const MAX_HOOK_INPUTS: usize = 16;

/// Renders a declaration parameter list (`System.Int32 a, out System.String b`).
#[must_use]
pub fn parameter_list(parameters: &[Parameter], current_ns: &str) -> String {
    parameters
        .iter()
        .map(|p| {
            format!(
                "{} {}",
                render_type(&p.ty, current_ns, Some(p)),
                escape_identifier(&p.name)
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders the parameter names as plain call arguments.
#[must_use]
pub fn argument_names(parameters: &[Parameter]) -> Vec<String> {
    parameters
        .iter()
        .map(|p| escape_identifier(&p.name))
        .collect()
}

/// Renders call arguments that forward by-reference parameters as such.
#[must_use]
pub fn forwarding_arguments(parameters: &[Parameter]) -> String {
    parameters
        .iter()
        .map(|p| {
            let name = escape_identifier(&p.name);
            match (&p.ty, p.is_out) {
                (TypeRef::ByRef(_), true) => format!("out {}", name),
                (TypeRef::ByRef(_), false) => format!("ref {}", name),
                _ => name,
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders `<T, U>` for a generic parameter list, or nothing.
///
/// With `variance` set, covariant and contravariant parameters get their
/// `out`/`in` modifier.
#[must_use]
pub fn generic_declaration(params: &[GenericParam], variance: bool) -> String {
    if params.is_empty() {
        return String::new();
    }

    let names: Vec<String> = params
        .iter()
        .map(|p| {
            let modifier = if !variance {
                ""
            } else if p.attributes.contains(GenericParamAttributes::COVARIANT) {
                "out "
            } else if p.attributes.contains(GenericParamAttributes::CONTRAVARIANT) {
                "in "
            } else {
                ""
            };
            format!("{}{}", modifier, p.name)
        })
        .collect();

    format!("<{}>", names.join(", "))
}

/// Renders one `where` clause per constrained generic parameter.
///
/// Constraint order is `class`, `struct`, explicit types, `new()`. A value
/// type constraint already implies the parameterless constructor and the
/// `System.ValueType` base, so both are dropped next to `struct`.
#[must_use]
pub fn constraint_clauses(params: &[GenericParam], current_ns: &str) -> Vec<String> {
    let mut clauses = Vec::new();

    for param in params {
        let is_value_type = param
            .attributes
            .contains(GenericParamAttributes::NOT_NULLABLE_VALUE_TYPE_CONSTRAINT);
        let mut constraints = Vec::new();

        if param
            .attributes
            .contains(GenericParamAttributes::REFERENCE_TYPE_CONSTRAINT)
        {
            constraints.push("class".to_string());
        }
        if is_value_type {
            constraints.push("struct".to_string());
        }
        for constraint in &param.constraints {
            if is_value_type && constraint.is(SYSTEM_NAMESPACE, "ValueType") {
                continue;
            }
            constraints.push(render_type(constraint, current_ns, None));
        }
        if !is_value_type
            && param
                .attributes
                .contains(GenericParamAttributes::DEFAULT_CONSTRUCTOR_CONSTRAINT)
        {
            constraints.push("new()".to_string());
        }

        if !constraints.is_empty() {
            clauses.push(format!("where {} : {}", param.name, constraints.join(", ")));
        }
    }

    clauses
}

/// Writes each clause on its own line at the given indent.
#[must_use]
pub fn constraint_lines(clauses: &[String], indent: &str) -> String {
    clauses
        .iter()
        .map(|c| format!("{}{}\n", indent, c))
        .collect()
}

/// Renders `name = default!;` for every output parameter.
#[must_use]
pub fn out_defaults(parameters: &[Parameter], indent: &str) -> String {
    parameters
        .iter()
        .filter(|p| p.is_out)
        .map(|p| format!("{}{} = default!;\n", indent, escape_identifier(&p.name)))
        .collect()
}

/// Expression thrown when a hook is unset.
#[must_use]
pub fn not_configured(hook: &str) -> String {
    format!(
        "throw new InvalidOperationException(\"{} not configured.\")",
        hook
    )
}

/// What a configuration slot holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookKind {
    /// Nullable `Func`/`Action` property.
    Behavior,
    /// Event plus the internal helper that raises it.
    Event {
        /// Helper method name.
        raise: String,
        /// Helper declaration parameters.
        parameters: String,
        /// Arguments forwarded to the event.
        arguments: String,
    },
}

/// One slot on a configuration type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookSlot {
    /// Slot identifier.
    pub name: String,
    /// Rendered delegate type, without the nullable marker.
    pub delegate_type: String,
    /// Slot kind.
    pub kind: HookKind,
}

impl HookSlot {
    /// Builds the slot for the method at `index` in declaration order.
    ///
    /// Inputs are the parameter types (by-reference stripped, generic types
    /// erased) followed by one `System.Type` per method generic parameter.
    ///
    /// # Errors
    /// Returns `CodegenError::UnsupportedMember` if the hook would need more
    /// inputs than the delegate families provide.
    pub fn for_method(
        type_name: &str,
        method: &MethodDef,
        index: usize,
        current_ns: &str,
    ) -> Result<Self, CodegenError> {
        let type_arg = render_type(&TypeRef::named(SYSTEM_NAMESPACE, "Type"), current_ns, None);
        let mut inputs: Vec<String> = method
            .parameters
            .iter()
            .map(|p| render_hook_type(&p.ty, current_ns))
            .collect();
        inputs.extend(method.generic_params.iter().map(|_| type_arg.clone()));

        let output = if method.returns_void() {
            None
        } else {
            Some(render_hook_type(&method.return_type, current_ns))
        };

        Ok(Self {
            name: format!("{}_{}", method.name, index),
            delegate_type: delegate_type(type_name, &method.name, &inputs, output.as_deref())?,
            kind: HookKind::Behavior,
        })
    }

    /// Builds the `get_` slot of a property or indexer.
    ///
    /// # Errors
    /// Returns `CodegenError::UnsupportedMember` if the indexer has too many
    /// parameters.
    pub fn for_getter(
        type_name: &str,
        property: &PropertyDef,
        current_ns: &str,
    ) -> Result<Self, CodegenError> {
        let inputs = index_inputs(property, current_ns);
        let output = render_hook_type(&property.ty, current_ns);
        Ok(Self {
            name: format!("get_{}", property.name),
            delegate_type: delegate_type(type_name, &property.name, &inputs, Some(&output))?,
            kind: HookKind::Behavior,
        })
    }

    /// Builds the `set_` slot of a property or indexer.
    ///
    /// # Errors
    /// Returns `CodegenError::UnsupportedMember` if the indexer has too many
    /// parameters.
    pub fn for_setter(
        type_name: &str,
        property: &PropertyDef,
        current_ns: &str,
    ) -> Result<Self, CodegenError> {
        let mut inputs = index_inputs(property, current_ns);
        inputs.push(render_hook_type(&property.ty, current_ns));
        Ok(Self {
            name: format!("set_{}", property.name),
            delegate_type: delegate_type(type_name, &property.name, &inputs, None)?,
            kind: HookKind::Behavior,
        })
    }

    /// Builds the event slot and its raise helper.
    #[must_use]
    pub fn for_event(event: &EventDef, signature: &[Parameter], current_ns: &str) -> Self {
        Self {
            name: escape_identifier(&event.name),
            delegate_type: render_type(&event.handler_type, current_ns, None),
            kind: HookKind::Event {
                raise: format!("Raise{}", event.name),
                parameters: parameter_list(signature, current_ns),
                arguments: forwarding_arguments(signature),
            },
        }
    }

    /// Renders the slot as configuration type members.
    #[must_use]
    pub fn render(&self) -> String {
        match &self.kind {
            HookKind::Behavior => format!(
                "        public {}? {} {{ get; set; }}\n",
                self.delegate_type, self.name
            ),
            HookKind::Event {
                raise,
                parameters,
                arguments,
            } => format!(
                "        public event {}? {};\n        internal void {}({}) => {}?.Invoke({});\n",
                self.delegate_type, self.name, raise, parameters, self.name, arguments
            ),
        }
    }
}

fn index_inputs(property: &PropertyDef, current_ns: &str) -> Vec<String> {
    property
        .index_parameters
        .iter()
        .map(|p| render_hook_type(&p.ty, current_ns))
        .collect()
}

/// Picks the `Func`/`Action` shape for a hook.
///
/// # Errors
/// Returns `CodegenError::UnsupportedMember` when `inputs` exceeds
/// [`MAX_HOOK_INPUTS`].
pub fn delegate_type(
    type_name: &str,
    member: &str,
    inputs: &[String],
    output: Option<&str>,
) -> Result<String, CodegenError> {
    if inputs.len() > MAX_HOOK_INPUTS {
        return Err(CodegenError::unsupported(
            type_name,
            member,
            format!(
                "hook needs {} inputs, at most {} are supported",
                inputs.len(),
                MAX_HOOK_INPUTS
            ),
        ));
    }

    Ok(match output {
        Some(output) => {
            let mut args = inputs.to_vec();
            args.push(output.to_string());
            format!("Func<{}>", args.join(", "))
        }
        None if inputs.is_empty() => "Action".to_string(),
        None => format!("Action<{}>", inputs.join(", ")),
    })
}

/// Configuration slots of one stub, checked for name collisions.
#[derive(Debug, Default)]
pub struct HookSet {
    type_name: String,
    names: HashSet<String>,
    stub_names: HashSet<String>,
    slots: Vec<HookSlot>,
}

impl HookSet {
    /// Creates an empty set for the named type.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    /// Adds a slot.
    ///
    /// # Errors
    /// Returns `CodegenError::HookCollision` if the slot name, or the name of
    /// its raise helper, is already taken.
    pub fn insert(&mut self, slot: HookSlot) -> Result<(), CodegenError> {
        self.reserve(&slot.name)?;
        if let HookKind::Event { raise, .. } = &slot.kind {
            self.reserve(raise)?;
        }
        self.slots.push(slot);
        Ok(())
    }

    fn reserve(&mut self, name: &str) -> Result<(), CodegenError> {
        if self.names.insert(name.to_string()) {
            Ok(())
        } else {
            Err(self.collision(name))
        }
    }

    /// Reserves a member the stub type declares for itself, such as
    /// `Configure` or an event's `Raise` method.
    ///
    /// # Errors
    /// Returns `CodegenError::HookCollision` if the name is already reserved.
    pub fn reserve_stub_member(&mut self, name: &str) -> Result<(), CodegenError> {
        if self.stub_names.insert(name.to_string()) {
            Ok(())
        } else {
            Err(self.collision(name))
        }
    }

    /// Checks that a declared member does not reuse a reserved stub member.
    ///
    /// # Errors
    /// Returns `CodegenError::HookCollision` if the name is reserved.
    pub fn check_member(&self, name: &str) -> Result<(), CodegenError> {
        if self.stub_names.contains(name) {
            Err(self.collision(name))
        } else {
            Ok(())
        }
    }

    fn collision(&self, name: &str) -> CodegenError {
        CodegenError::HookCollision {
            type_name: self.type_name.clone(),
            hook: name.to_string(),
        }
    }

    /// Returns the slots in insertion order.
    #[must_use]
    pub fn slots(&self) -> &[HookSlot] {
        &self.slots
    }

    /// Renders every slot, in insertion order.
    #[must_use]
    pub fn render(&self) -> String {
        self.slots.iter().map(HookSlot::render).collect()
    }
}

/// Resolves the invocation signature of an event's handler.
///
/// Parameters recorded on the event win; otherwise the common framework
/// handler shapes are recognized, and finally the handler delegate is looked
/// up in the metadata source and its `Invoke` signature used.
///
/// # Errors
/// Returns `CodegenError::UnsupportedMember` if no signature can be found.
pub fn event_signature(
    source: &dyn MetadataSource,
    type_name: &str,
    event: &EventDef,
) -> Result<Vec<Parameter>, CodegenError> {
    if let Some(parameters) = &event.handler_parameters {
        return Ok(parameters.clone());
    }
    if let Some(parameters) = well_known_signature(&event.handler_type) {
        return Ok(parameters);
    }
    if let Some(parameters) = invoke_signature(source, &event.handler_type) {
        return Ok(parameters);
    }

    Err(CodegenError::unsupported(
        type_name,
        &event.name,
        format!("no invocation signature for handler '{}'", event.handler_type),
    ))
}

/// Returns the substituted `Invoke` parameters of a catalogue delegate.
fn invoke_signature(source: &dyn MetadataSource, handler: &TypeRef) -> Option<Vec<Parameter>> {
    let named = handler.as_named()?;
    let delegate = source.resolve(handler)?;
    let invoke = delegate.find_method("Invoke")?;
    let names: Vec<&str> = delegate
        .generic_params
        .iter()
        .map(|p| p.name.as_str())
        .collect();

    Some(
        invoke
            .parameters
            .iter()
            .map(|p| Parameter {
                name: p.name.clone(),
                ty: p.ty.substitute(&names, &named.type_args),
                is_out: p.is_out,
            })
            .collect(),
    )
}

fn well_known_signature(handler: &TypeRef) -> Option<Vec<Parameter>> {
    let named = handler.as_named()?;
    if named.namespace.as_deref() != Some(SYSTEM_NAMESPACE) {
        return None;
    }

    let sender = || Parameter::new("sender".to_string(), TypeRef::named(SYSTEM_NAMESPACE, "Object"));
    match (named.name.as_str(), named.type_args.as_slice()) {
        ("EventHandler", []) => Some(vec![
            sender(),
            Parameter::new("e".to_string(), TypeRef::named(SYSTEM_NAMESPACE, "EventArgs")),
        ]),
        ("EventHandler`1", [args]) => Some(vec![
            sender(),
            Parameter::new("e".to_string(), args.clone()),
        ]),
        ("Action", []) => Some(Vec::new()),
        (name, args) if name.starts_with("Action`") && !args.is_empty() => Some(
            args.iter()
                .enumerate()
                .map(|(i, ty)| Parameter::new(format!("arg{}", i + 1), ty.clone()))
                .collect(),
        ),
        _ => None,
    }
}

/// Returns true if a value of this type must be cast back from `object?`.
#[must_use]
pub fn needs_cast(ty: &TypeRef) -> bool {
    uses_generic_parameter(ty.strip_by_ref())
}
