//! Class stub and configuration type generation.

use crate::csharp::members::{
    HookSet, HookSlot, argument_names, constraint_clauses, constraint_lines, event_signature,
    forwarding_arguments, generic_declaration, needs_cast, not_configured, out_defaults,
    parameter_list,
};
use crate::csharp::{close_namespace, open_namespace, render_usings};
use crate::error::CodegenError;
use crate::generator::StubKind;
use crate::names::{escape_identifier, render_type, strip_arity};
use crate::namespaces::collect_namespaces;
use stubgen_metadata::{
    EventDef, MetadataSource, MethodDef, Parameter, PropertyDef, TypeDef, TypeRef,
};

const MEMBER_INDENT: &str = "        ";
const BODY_INDENT: &str = "            ";

/// Stub property holding the configuration object.
const CONFIGURE_PROPERTY: &str = "Configure";

/// Generator for a class stub and its configuration type.
///
/// Every public instance member of the class becomes a member of the stub
/// that forwards to a hook on `Configure`. Unset hooks throw
/// `InvalidOperationException`.
pub struct ClassGenerator<'a> {
    source: &'a dyn MetadataSource,
    type_def: &'a TypeDef,
    bases: Vec<TypeRef>,
}

impl<'a> ClassGenerator<'a> {
    /// Creates a new class generator.
    ///
    /// # Arguments
    /// * `source` - Metadata used to resolve event handler signatures
    /// * `type_def` - Class to stub
    /// * `bases` - Base class and interfaces, in declaration order
    #[must_use]
    pub fn new(source: &'a dyn MetadataSource, type_def: &'a TypeDef, bases: Vec<TypeRef>) -> Self {
        Self {
            source,
            type_def,
            bases,
        }
    }

    /// Generates the source file.
    ///
    /// # Errors
    /// Returns `CodegenError` if a member cannot be expressed as a hook or
    /// two members map to the same hook name.
    pub fn generate(&self) -> Result<String, CodegenError> {
        let ns = self.namespace();
        let type_name = self.type_def.full_name();
        let name = strip_arity(&self.type_def.name);
        let generics = generic_declaration(&self.type_def.generic_params, false);
        let clauses = constraint_clauses(&self.type_def.generic_params, ns);
        let config_name = format!("{}Configuration{}", name, generics);

        let mut hooks = HookSet::new(type_name.as_str());
        hooks.reserve_stub_member(CONFIGURE_PROPERTY)?;
        for event in self.type_def.public_instance_events() {
            hooks.reserve_stub_member(&format!("Raise{}", event.name))?;
        }
        let mut members = vec![format!(
            "{}public {} {} {{ get; }} = new();\n",
            MEMBER_INDENT, config_name, CONFIGURE_PROPERTY
        )];

        for (index, method) in self.type_def.public_instance_methods().enumerate() {
            hooks.check_member(&method.name)?;
            let hook = HookSlot::for_method(&type_name, method, index, ns)?;
            members.push(self.generate_method(method, &hook.name));
            hooks.insert(hook)?;
        }

        for property in self.type_def.public_instance_properties() {
            if !property.is_indexer() {
                hooks.check_member(&property.name)?;
            }
            let getter = if property.can_read {
                Some(HookSlot::for_getter(&type_name, property, ns)?)
            } else {
                None
            };
            let setter = if property.can_write {
                Some(HookSlot::for_setter(&type_name, property, ns)?)
            } else {
                None
            };
            members.push(self.generate_property(property, getter.as_ref(), setter.as_ref()));
            for hook in getter.into_iter().chain(setter) {
                hooks.insert(hook)?;
            }
        }

        for event in self.type_def.public_instance_events() {
            hooks.check_member(&event.name)?;
            let signature = event_signature(self.source, &type_name, event)?;
            members.push(self.generate_event(event, &signature));
            hooks.insert(HookSlot::for_event(event, &signature, ns))?;
        }

        let mut output = String::new();
        output.push_str(&render_usings(&collect_namespaces(
            self.type_def,
            StubKind::Class,
        )));
        output.push_str(&open_namespace(ns));

        output.push_str(&format!("    public partial class {}{}", name, generics));
        if !self.bases.is_empty() {
            let bases: Vec<String> = self
                .bases
                .iter()
                .map(|b| render_type(b, ns, None))
                .collect();
            output.push_str(&format!(" : {}", bases.join(", ")));
        }
        output.push('\n');
        output.push_str(&constraint_lines(&clauses, MEMBER_INDENT));
        output.push_str("    {\n");
        output.push_str(&members.join("\n"));
        output.push_str("    }\n\n");

        output.push_str(&format!("    public partial class {}\n", config_name));
        output.push_str(&constraint_lines(&clauses, MEMBER_INDENT));
        output.push_str("    {\n");
        output.push_str(&hooks.render());
        output.push_str("    }\n");
        output.push_str(close_namespace());

        Ok(output)
    }

    fn namespace(&self) -> &'a str {
        self.type_def.namespace.as_deref().unwrap_or_default()
    }

    /// Generates a method that forwards to its hook.
    fn generate_method(&self, method: &MethodDef, hook: &str) -> String {
        let ns = self.namespace();
        let mut output = String::new();
        let return_type = render_type(&method.return_type, ns, None);

        output.push_str(&format!(
            "{}public virtual {} {}{}({})\n",
            MEMBER_INDENT,
            return_type,
            escape_identifier(&method.name),
            generic_declaration(&method.generic_params, false),
            parameter_list(&method.parameters, ns)
        ));
        output.push_str(&constraint_lines(
            &constraint_clauses(&method.generic_params, ns),
            BODY_INDENT,
        ));
        output.push_str(&format!("{}{{\n", MEMBER_INDENT));
        output.push_str(&out_defaults(&method.parameters, BODY_INDENT));

        let mut args = argument_names(&method.parameters);
        args.extend(
            method
                .generic_params
                .iter()
                .map(|p| format!("typeof({})", p.name)),
        );

        if method.returns_void() {
            output.push_str(&void_dispatch(hook, &args, &method.name));
        } else {
            let call = format!(
                "Configure.{}?.Invoke({}) ?? {}",
                hook,
                args.join(", "),
                not_configured(&method.name)
            );
            if needs_cast(&method.return_type) {
                output.push_str(&format!(
                    "{}return ({})({});\n",
                    BODY_INDENT, return_type, call
                ));
            } else {
                output.push_str(&format!("{}return {};\n", BODY_INDENT, call));
            }
        }

        output.push_str(&format!("{}}}\n", MEMBER_INDENT));
        output
    }

    /// Generates a property or indexer whose accessors forward to hooks.
    fn generate_property(
        &self,
        property: &PropertyDef,
        getter: Option<&HookSlot>,
        setter: Option<&HookSlot>,
    ) -> String {
        let ns = self.namespace();
        let mut output = String::new();
        let property_type = render_type(&property.ty, ns, None);
        let index_args = argument_names(&property.index_parameters);

        if property.is_indexer() {
            output.push_str(&format!(
                "{}public virtual {} this[{}]\n",
                MEMBER_INDENT,
                property_type,
                parameter_list(&property.index_parameters, ns)
            ));
        } else {
            output.push_str(&format!(
                "{}public virtual {} {}\n",
                MEMBER_INDENT,
                property_type,
                escape_identifier(&property.name)
            ));
        }
        output.push_str(&format!("{}{{\n", MEMBER_INDENT));

        if let Some(getter) = getter {
            let call = format!(
                "Configure.{}?.Invoke({}) ?? {}",
                getter.name,
                index_args.join(", "),
                not_configured(&getter.name)
            );
            if needs_cast(&property.ty) {
                output.push_str(&format!(
                    "{}get => ({})({});\n",
                    BODY_INDENT, property_type, call
                ));
            } else {
                output.push_str(&format!("{}get => {};\n", BODY_INDENT, call));
            }
        }

        if let Some(setter) = setter {
            let mut args = index_args.clone();
            args.push("value".to_string());
            output.push_str(&format!("{}set\n{}{{\n", BODY_INDENT, BODY_INDENT));
            let body = void_dispatch(&setter.name, &args, &setter.name);
            for line in body.lines() {
                output.push_str(&format!("    {}\n", line));
            }
            output.push_str(&format!("{}}}\n", BODY_INDENT));
        }

        output.push_str(&format!("{}}}\n", MEMBER_INDENT));
        output
    }

    /// Generates an event forwarded to the configuration type plus its raiser.
    fn generate_event(&self, event: &EventDef, signature: &[Parameter]) -> String {
        let ns = self.namespace();
        let name = escape_identifier(&event.name);
        let mut output = String::new();

        output.push_str(&format!(
            "{}public event {}? {}\n",
            MEMBER_INDENT,
            render_type(&event.handler_type, ns, None),
            name
        ));
        output.push_str(&format!("{}{{\n", MEMBER_INDENT));
        output.push_str(&format!(
            "{}add => Configure.{} += value;\n",
            BODY_INDENT, name
        ));
        output.push_str(&format!(
            "{}remove => Configure.{} -= value;\n",
            BODY_INDENT, name
        ));
        output.push_str(&format!("{}}}\n\n", MEMBER_INDENT));

        output.push_str(&format!(
            "{}public void Raise{}({})\n",
            MEMBER_INDENT,
            event.name,
            parameter_list(signature, ns)
        ));
        output.push_str(&format!("{}{{\n", MEMBER_INDENT));
        output.push_str(&format!(
            "{}Configure.Raise{}({});\n",
            BODY_INDENT,
            event.name,
            forwarding_arguments(signature)
        ));
        output.push_str(&format!("{}}}\n", MEMBER_INDENT));
        output
    }
}

/// Calls a void hook if set, throws otherwise.
///
/// The hook is read into a local whose name no argument uses.
fn void_dispatch(hook: &str, args: &[String], member: &str) -> String {
    let mut local = "del".to_string();
    while args.contains(&local) {
        local.insert(0, '_');
    }

    let mut output = String::new();
    output.push_str(&format!("{}var {} = Configure.{};\n", BODY_INDENT, local, hook));
    output.push_str(&format!("{}if ({} != null)\n", BODY_INDENT, local));
    output.push_str(&format!("{}{{\n", BODY_INDENT));
    output.push_str(&format!("{}    {}({});\n", BODY_INDENT, local, args.join(", ")));
    output.push_str(&format!("{}    return;\n", BODY_INDENT));
    output.push_str(&format!("{}}}\n", BODY_INDENT));
    output.push_str(&format!("{}{};\n", BODY_INDENT, not_configured(member)));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use stubgen_metadata::{Catalog, parse_catalog};

    fn generate(xml: &str) -> String {
        let catalog: Catalog = parse_catalog(xml).expect("Failed to parse");
        let type_def = &catalog.types[0];
        let bases = type_def.base_type.iter().cloned().collect();
        ClassGenerator::new(&catalog, type_def, bases)
            .generate()
            .expect("Failed to generate")
    }

    #[test]
    fn test_class_stub_layout() {
        let xml = r#"<catalog module="Test.dll">
    <type name="Calculator" namespace="Acme.Math" kind="class">
        <method name="Add" returns="System.Int32">
            <parameter name="a" type="System.Int32"/>
            <parameter name="b" type="System.Int32"/>
        </method>
        <method name="Clear"/>
    </type>
</catalog>"#;
        let code = generate(xml);

        let expected = r#"using System;

namespace Acme.Math
{
    public partial class Calculator
    {
        public CalculatorConfiguration Configure { get; } = new();

        public virtual System.Int32 Add(System.Int32 a, System.Int32 b)
        {
            return Configure.Add_0?.Invoke(a, b) ?? throw new InvalidOperationException("Add not configured.");
        }

        public virtual void Clear()
        {
            var del = Configure.Clear_1;
            if (del != null)
            {
                del();
                return;
            }
            throw new InvalidOperationException("Clear not configured.");
        }
    }

    public partial class CalculatorConfiguration
    {
        public Func<System.Int32, System.Int32, System.Int32>? Add_0 { get; set; }
        public Action? Clear_1 { get; set; }
    }
}
"#;
        assert_eq!(code, expected);
    }

    #[test]
    fn test_overloads_get_distinct_hooks() {
        let xml = r#"<catalog module="Test.dll">
    <type name="Printer" namespace="Acme" kind="class">
        <method name="Print">
            <parameter name="text" type="System.String"/>
        </method>
        <method name="Print">
            <parameter name="value" type="System.Int32"/>
        </method>
        <method name="Helper" static="true"/>
        <method name="Print">
            <parameter name="value" type="System.Double"/>
        </method>
    </type>
</catalog>"#;
        let code = generate(xml);

        assert!(code.contains("public Action<System.String>? Print_0 { get; set; }"));
        assert!(code.contains("public Action<System.Int32>? Print_1 { get; set; }"));
        assert!(code.contains("public Action<System.Double>? Print_2 { get; set; }"));
        assert!(!code.contains("Helper"));
    }

    #[test]
    fn test_by_ref_parameters() {
        let xml = r#"<catalog module="Test.dll">
    <type name="Parser" namespace="Acme" kind="class">
        <method name="TryParse" returns="System.Boolean">
            <parameter name="text" type="System.String"/>
            <parameter name="result" type="System.Int32&amp;" out="true"/>
        </method>
        <method name="Bump">
            <parameter name="counter" type="System.Int32&amp;"/>
        </method>
    </type>
</catalog>"#;
        let code = generate(xml);

        assert!(code.contains(
            "public virtual System.Boolean TryParse(System.String text, out System.Int32 result)"
        ));
        assert!(code.contains("            result = default!;\n"));
        assert!(code.contains("public virtual void Bump(ref System.Int32 counter)"));
        assert!(code.contains("public Func<System.String, System.Int32, System.Boolean>? TryParse_0"));
        assert!(code.contains("public Action<System.Int32>? Bump_1"));
    }

    #[test]
    fn test_generic_method_erasure() {
        let xml = r#"<catalog module="Test.dll">
    <type name="Cache" namespace="Acme" kind="class">
        <method name="Get" returns="!!T">
            <genericParameter name="T" referenceType="true"/>
            <parameter name="key" type="System.String"/>
        </method>
        <method name="Put">
            <genericParameter name="T"/>
            <parameter name="key" type="System.String"/>
            <parameter name="items" type="System.Collections.Generic.List`1[!!T]"/>
        </method>
    </type>
</catalog>"#;
        let code = generate(xml);

        assert!(code.contains("public virtual T Get<T>(System.String key)\n            where T : class\n"));
        assert!(code.contains(
            "return (T)(Configure.Get_0?.Invoke(key, typeof(T)) ?? throw new InvalidOperationException(\"Get not configured.\"));"
        ));
        assert!(code.contains("public Func<System.String, System.Type, object?>? Get_0 { get; set; }"));
        assert!(code.contains("del(key, items, typeof(T));"));
        assert!(code.contains("public Action<System.String, object?, System.Type>? Put_1 { get; set; }"));
    }

    #[test]
    fn test_properties_and_indexers() {
        let xml = r#"<catalog module="Test.dll">
    <type name="Settings" namespace="Acme" kind="class">
        <property name="Name" type="System.String" set="true"/>
        <property name="Version" type="System.Int32"/>
        <property name="Item" type="System.String" set="true">
            <parameter name="key" type="System.String"/>
        </property>
    </type>
</catalog>"#;
        let code = generate(xml);

        let name_property = r#"        public virtual System.String Name
        {
            get => Configure.get_Name?.Invoke() ?? throw new InvalidOperationException("get_Name not configured.");
            set
            {
                var del = Configure.set_Name;
                if (del != null)
                {
                    del(value);
                    return;
                }
                throw new InvalidOperationException("set_Name not configured.");
            }
        }
"#;
        assert!(code.contains(name_property));
        assert!(code.contains("public Func<System.Int32>? get_Version { get; set; }"));
        assert!(!code.contains("set_Version"));
        assert!(code.contains("public virtual System.String this[System.String key]"));
        assert!(code.contains("get => Configure.get_Item?.Invoke(key) ?? throw"));
        assert!(code.contains("del(key, value);"));
        assert!(code.contains("public Action<System.String, System.String>? set_Item { get; set; }"));
    }

    #[test]
    fn test_events_forward_to_configuration() {
        let xml = r#"<catalog module="Test.dll">
    <type name="Button" namespace="Acme.Ui" kind="class">
        <event name="Clicked" type="System.EventHandler"/>
    </type>
</catalog>"#;
        let code = generate(xml);

        let event = r#"        public event System.EventHandler? Clicked
        {
            add => Configure.Clicked += value;
            remove => Configure.Clicked -= value;
        }

        public void RaiseClicked(System.Object sender, System.EventArgs e)
        {
            Configure.RaiseClicked(sender, e);
        }
"#;
        assert!(code.contains(event));
        assert!(code.contains("        public event System.EventHandler? Clicked;\n"));
        assert!(code.contains(
            "        internal void RaiseClicked(System.Object sender, System.EventArgs e) => Clicked?.Invoke(sender, e);\n"
        ));
    }

    #[test]
    fn test_generic_class_configuration_carries_parameters() {
        let xml = r#"<catalog module="Test.dll">
    <type name="Repository`1" namespace="Acme" kind="class">
        <genericParameter name="TEntity" referenceType="true" defaultConstructor="true"/>
        <method name="Find" returns="!TEntity">
            <parameter name="id" type="System.Int32"/>
        </method>
    </type>
</catalog>"#;
        let code = generate(xml);

        assert!(code.contains(
            "    public partial class Repository<TEntity>\n        where TEntity : class, new()\n    {\n"
        ));
        assert!(code.contains("public RepositoryConfiguration<TEntity> Configure { get; } = new();"));
        assert!(code.contains(
            "    public partial class RepositoryConfiguration<TEntity>\n        where TEntity : class, new()\n"
        ));
        assert!(code.contains("return (TEntity)(Configure.Find_0?.Invoke(id)"));
    }

    #[test]
    fn test_base_class_listed() {
        let xml = r#"<catalog module="Test.dll">
    <type name="Derived" namespace="Acme" kind="class">
        <base type="Acme.Shapes.Shape"/>
    </type>
</catalog>"#;
        let code = generate(xml);

        assert!(code.contains("using Acme.Shapes;\nusing System;\n"));
        assert!(code.contains("    public partial class Derived : Acme.Shapes.Shape\n"));
    }

    #[test]
    fn test_hook_collision_fails_type() {
        let xml = r#"<catalog module="Test.dll">
    <type name="Clash" namespace="Acme" kind="class">
        <method name="Run"/>
        <property name="Run_0" type="System.Int32"/>
        <event name="get_Run_0" type="System.Action"/>
    </type>
</catalog>"#;
        let catalog = parse_catalog(xml).unwrap();
        let result = ClassGenerator::new(&catalog, &catalog.types[0], Vec::new()).generate();
        assert!(matches!(result, Err(CodegenError::HookCollision { .. })));
    }

    #[test]
    fn test_stub_member_names_reserved() {
        let raise_clash = r#"<catalog module="Test.dll">
    <type name="Button" namespace="Acme" kind="class">
        <method name="RaiseClicked"/>
        <event name="Clicked" type="System.EventHandler"/>
    </type>
</catalog>"#;
        let catalog = parse_catalog(raise_clash).unwrap();
        let result = ClassGenerator::new(&catalog, &catalog.types[0], Vec::new()).generate();
        assert!(matches!(
            result,
            Err(CodegenError::HookCollision { ref hook, .. }) if hook == "RaiseClicked"
        ));

        let configure_clash = r#"<catalog module="Test.dll">
    <type name="Service" namespace="Acme" kind="class">
        <property name="Configure" type="System.String"/>
    </type>
</catalog>"#;
        let catalog = parse_catalog(configure_clash).unwrap();
        let result = ClassGenerator::new(&catalog, &catalog.types[0], Vec::new()).generate();
        assert!(matches!(
            result,
            Err(CodegenError::HookCollision { ref hook, .. }) if hook == "Configure"
        ));
    }

    #[test]
    fn test_void_dispatch_avoids_parameter_names() {
        let xml = r#"<catalog module="Test.dll">
    <type name="Remover" namespace="Acme" kind="class">
        <method name="Remove">
            <parameter name="del" type="System.Int32"/>
        </method>
    </type>
</catalog>"#;
        let code = generate(xml);

        assert!(code.contains("            var _del = Configure.Remove_0;\n"));
        assert!(code.contains("                _del(del);\n"));
        assert!(!code.contains("var del ="));
    }
}
