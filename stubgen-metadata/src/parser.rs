//! Catalogue XML parser.
//!
//! This module reads a module's type catalogue, as exported by a metadata
//! reader, into the in-memory [`Catalog`] representation.

use crate::error::ParseError;
use crate::members::{ConstructorDef, EventDef, FieldDef, MethodDef, Parameter, PropertyDef};
use crate::typeref::{SYSTEM_NAMESPACE, TypeRef};
use crate::types::{
    Catalog, EnumValue, GenericParam, GenericParamAttributes, TypeDef, TypeFlavor, Visibility,
};
use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};

/// Parses a catalogue from a string.
///
/// # Arguments
/// * `xml` - Catalogue XML content
///
/// # Returns
/// Parsed catalogue or parse error.
///
/// # Errors
/// Returns `ParseError` if the XML is malformed or contains invalid catalogue elements.
pub fn parse_catalog(xml: &str) -> Result<Catalog, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut catalog: Option<Catalog> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                if tag_name(e)? == "catalog" {
                    let mut parsed = parse_catalog_element(e)?;
                    read_children(&mut reader, |reader, child, has_children| {
                        if tag_name(child)? == "type" {
                            parsed.add_type(parse_type(reader, child, has_children)?);
                            Ok(())
                        } else {
                            skip_unless_empty(reader, has_children)
                        }
                    })?;
                    catalog = Some(parsed);
                }
            }
            Event::Empty(ref e) => {
                if tag_name(e)? == "catalog" {
                    catalog = Some(parse_catalog_element(e)?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    catalog.ok_or_else(|| ParseError::InvalidStructure {
        message: "No catalog element found".to_string(),
    })
}

/// Parses a catalogue file.
///
/// # Errors
/// Returns `ParseError` if the file cannot be read or parsed.
pub fn parse_catalog_file(path: &std::path::Path) -> Result<Catalog, ParseError> {
    let xml = std::fs::read_to_string(path)?;
    parse_catalog(&xml)
}

/// Parses the catalog element attributes.
fn parse_catalog_element(e: &BytesStart<'_>) -> Result<Catalog, ParseError> {
    let mut module = String::new();

    for attr in e.attributes().flatten() {
        if std::str::from_utf8(attr.key.as_ref())? == "module" {
            module = attr_value(&attr)?;
        }
    }

    Ok(Catalog::new(module))
}

/// Parses a type definition.
fn parse_type(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
    has_children: bool,
) -> Result<TypeDef, ParseError> {
    let mut name = None;
    let mut namespace = None;
    let mut flavor = None;
    let mut visibility = Visibility::Public;
    let mut is_nested = false;
    let mut is_external = false;
    let mut underlying_type = None;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = attr_value(&attr)?;

        match key {
            "name" => name = Some(value),
            "namespace" => namespace = (!value.is_empty()).then_some(value),
            "kind" => flavor = Some(TypeFlavor::parse(&value)),
            "visibility" => visibility = parse_visibility("type", &value)?,
            "nested" => is_nested = parse_bool("type", "nested", &value)?,
            "external" => is_external = parse_bool("type", "external", &value)?,
            "underlying" => underlying_type = Some(TypeRef::parse(&value)?),
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ParseError::missing_attr("type", "name"))?;
    let flavor = flavor.ok_or_else(|| ParseError::missing_attr("type", "kind"))?;

    let mut type_def = TypeDef::new(name, namespace, flavor);
    type_def.visibility = visibility;
    type_def.is_nested = is_nested;
    type_def.is_external = is_external;
    type_def.underlying_type = underlying_type;

    if !has_children {
        return Ok(type_def);
    }

    read_children(reader, |reader, child, has_children| {
        match tag_name(child)?.as_str() {
            "base" => {
                type_def.base_type = Some(required_type_attr(child, "base")?);
                skip_unless_empty(reader, has_children)?;
            }
            "interface" => {
                type_def.interfaces.push(required_type_attr(child, "interface")?);
                skip_unless_empty(reader, has_children)?;
            }
            "genericParameter" => {
                let param = parse_generic_param(reader, child, has_children)?;
                type_def.generic_params.push(param);
            }
            "method" => {
                let method = parse_method(reader, child, has_children)?;
                type_def.methods.push(method);
            }
            "property" => {
                let property = parse_property(reader, child, has_children)?;
                type_def.properties.push(property);
            }
            "event" => {
                let event = parse_event(reader, child, has_children)?;
                type_def.events.push(event);
            }
            "field" => {
                let field = parse_field(child)?;
                type_def.fields.push(field);
                skip_unless_empty(reader, has_children)?;
            }
            "constructor" => {
                let ctor = parse_constructor(reader, child, has_children)?;
                type_def.constructors.push(ctor);
            }
            "value" => {
                let value = parse_enum_value(reader, child, has_children)?;
                type_def.enum_values.push(value);
            }
            _ => skip_unless_empty(reader, has_children)?,
        }
        Ok(())
    })?;

    Ok(type_def)
}

/// Parses a generic parameter and its constraints.
fn parse_generic_param(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
    has_children: bool,
) -> Result<GenericParam, ParseError> {
    let mut name = None;
    let mut attributes = GenericParamAttributes::empty();

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = attr_value(&attr)?;

        let flag = match key {
            "name" => {
                name = Some(value);
                continue;
            }
            "referenceType" => GenericParamAttributes::REFERENCE_TYPE_CONSTRAINT,
            "valueType" => GenericParamAttributes::NOT_NULLABLE_VALUE_TYPE_CONSTRAINT,
            "defaultConstructor" => GenericParamAttributes::DEFAULT_CONSTRUCTOR_CONSTRAINT,
            "variance" => {
                match value.as_str() {
                    "out" => attributes |= GenericParamAttributes::COVARIANT,
                    "in" => attributes |= GenericParamAttributes::CONTRAVARIANT,
                    "none" | "" => {}
                    _ => {
                        return Err(ParseError::invalid_attr(
                            "genericParameter",
                            "variance",
                            value,
                        ));
                    }
                }
                continue;
            }
            _ => continue,
        };
        attributes.set(flag, parse_bool("genericParameter", key, &value)?);
    }

    let name = name.ok_or_else(|| ParseError::missing_attr("genericParameter", "name"))?;
    let mut param = GenericParam::new(name);
    param.attributes = attributes;

    if has_children {
        read_children(reader, |reader, child, has_children| {
            if tag_name(child)? == "constraint" {
                param.add_constraint(required_type_attr(child, "constraint")?);
            }
            skip_unless_empty(reader, has_children)
        })?;
    }

    Ok(param)
}

/// Parses a method definition.
fn parse_method(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
    has_children: bool,
) -> Result<MethodDef, ParseError> {
    let mut name = None;
    let mut return_type = TypeRef::named(SYSTEM_NAMESPACE, "Void");
    let mut visibility = Visibility::Public;
    let mut is_static = false;
    let mut is_special_name = false;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = attr_value(&attr)?;

        match key {
            "name" => name = Some(value),
            "returns" => return_type = TypeRef::parse(&value)?,
            "visibility" => visibility = parse_visibility("method", &value)?,
            "static" => is_static = parse_bool("method", "static", &value)?,
            "special" => is_special_name = parse_bool("method", "special", &value)?,
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ParseError::missing_attr("method", "name"))?;
    let mut method = MethodDef::new(name, return_type);
    method.visibility = visibility;
    method.is_static = is_static;
    method.is_special_name = is_special_name;

    if has_children {
        read_children(reader, |reader, child, has_children| {
            match tag_name(child)?.as_str() {
                "parameter" => {
                    method.add_parameter(parse_parameter(child)?);
                    skip_unless_empty(reader, has_children)?;
                }
                "genericParameter" => {
                    let param = parse_generic_param(reader, child, has_children)?;
                    method.generic_params.push(param);
                }
                _ => skip_unless_empty(reader, has_children)?,
            }
            Ok(())
        })?;
    }

    Ok(method)
}

/// Parses a property or indexer definition.
fn parse_property(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
    has_children: bool,
) -> Result<PropertyDef, ParseError> {
    let mut name = None;
    let mut ty = None;
    let mut can_read = true;
    let mut can_write = false;
    let mut visibility = Visibility::Public;
    let mut is_static = false;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = attr_value(&attr)?;

        match key {
            "name" => name = Some(value),
            "type" => ty = Some(TypeRef::parse(&value)?),
            "get" => can_read = parse_bool("property", "get", &value)?,
            "set" => can_write = parse_bool("property", "set", &value)?,
            "visibility" => visibility = parse_visibility("property", &value)?,
            "static" => is_static = parse_bool("property", "static", &value)?,
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ParseError::missing_attr("property", "name"))?;
    let ty = ty.ok_or_else(|| ParseError::missing_attr("property", "type"))?;

    let mut property = PropertyDef::new(name, ty);
    property.can_read = can_read;
    property.can_write = can_write;
    property.visibility = visibility;
    property.is_static = is_static;

    if has_children {
        read_children(reader, |reader, child, has_children| {
            if tag_name(child)? == "parameter" {
                property.index_parameters.push(parse_parameter(child)?);
            }
            skip_unless_empty(reader, has_children)
        })?;
    }

    Ok(property)
}

/// Parses an event definition.
fn parse_event(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
    has_children: bool,
) -> Result<EventDef, ParseError> {
    let mut name = None;
    let mut handler_type = None;
    let mut visibility = Visibility::Public;
    let mut is_static = false;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = attr_value(&attr)?;

        match key {
            "name" => name = Some(value),
            "type" => handler_type = Some(TypeRef::parse(&value)?),
            "visibility" => visibility = parse_visibility("event", &value)?,
            "static" => is_static = parse_bool("event", "static", &value)?,
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ParseError::missing_attr("event", "name"))?;
    let handler_type = handler_type.ok_or_else(|| ParseError::missing_attr("event", "type"))?;

    let mut event = EventDef::new(name, handler_type);
    event.visibility = visibility;
    event.is_static = is_static;

    if has_children {
        let mut parameters = Vec::new();
        read_children(reader, |reader, child, has_children| {
            if tag_name(child)? == "parameter" {
                parameters.push(parse_parameter(child)?);
            }
            skip_unless_empty(reader, has_children)
        })?;
        if !parameters.is_empty() {
            event.handler_parameters = Some(parameters);
        }
    }

    Ok(event)
}

/// Parses a field definition.
fn parse_field(e: &BytesStart<'_>) -> Result<FieldDef, ParseError> {
    let mut name = None;
    let mut ty = None;
    let mut visibility = Visibility::Public;
    let mut is_static = false;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = attr_value(&attr)?;

        match key {
            "name" => name = Some(value),
            "type" => ty = Some(TypeRef::parse(&value)?),
            "visibility" => visibility = parse_visibility("field", &value)?,
            "static" => is_static = parse_bool("field", "static", &value)?,
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ParseError::missing_attr("field", "name"))?;
    let ty = ty.ok_or_else(|| ParseError::missing_attr("field", "type"))?;

    let mut field = FieldDef::new(name, ty);
    field.visibility = visibility;
    field.is_static = is_static;
    Ok(field)
}

/// Parses a constructor definition.
fn parse_constructor(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
    has_children: bool,
) -> Result<ConstructorDef, ParseError> {
    let mut ctor = ConstructorDef::default();

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = attr_value(&attr)?;

        match key {
            "visibility" => ctor.visibility = parse_visibility("constructor", &value)?,
            "static" => ctor.is_static = parse_bool("constructor", "static", &value)?,
            _ => {}
        }
    }

    if has_children {
        read_children(reader, |reader, child, has_children| {
            if tag_name(child)? == "parameter" {
                ctor.parameters.push(parse_parameter(child)?);
            }
            skip_unless_empty(reader, has_children)
        })?;
    }

    Ok(ctor)
}

/// Parses a method, indexer or constructor parameter.
fn parse_parameter(e: &BytesStart<'_>) -> Result<Parameter, ParseError> {
    let mut name = None;
    let mut ty = None;
    let mut is_out = false;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = attr_value(&attr)?;

        match key {
            "name" => name = Some(value),
            "type" => ty = Some(TypeRef::parse(&value)?),
            "out" => is_out = parse_bool("parameter", "out", &value)?,
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ParseError::missing_attr("parameter", "name"))?;
    let ty = ty.ok_or_else(|| ParseError::missing_attr("parameter", "type"))?;

    let mut parameter = Parameter::new(name, ty);
    parameter.is_out = is_out;
    Ok(parameter)
}

/// Parses an enum constant.
fn parse_enum_value(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
    has_children: bool,
) -> Result<EnumValue, ParseError> {
    let mut name = None;

    for attr in e.attributes().flatten() {
        if std::str::from_utf8(attr.key.as_ref())? == "name" {
            name = Some(attr_value(&attr)?);
        }
    }

    let name = name.ok_or_else(|| ParseError::missing_attr("value", "name"))?;

    // Read the value content
    let mut value_str = String::new();
    if has_children {
        let mut buf = Vec::new();
        let mut depth = 1;
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Text(ref t) => {
                    value_str = std::str::from_utf8(t.as_ref())?.trim().to_string();
                }
                Event::Start(_) => depth += 1,
                Event::End(_) => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
    }

    let value = value_str
        .parse::<i128>()
        .map_err(|_| ParseError::invalid_attr("value", name.as_str(), value_str.as_str()))?;

    Ok(EnumValue::new(name, value))
}

/// Reads child elements until the end tag of the current element.
///
/// `on_child` receives each child start tag and whether it has content; it
/// must consume that content (including the end tag) when it does.
fn read_children(
    reader: &mut Reader<&[u8]>,
    mut on_child: impl FnMut(&mut Reader<&[u8]>, &BytesStart<'_>, bool) -> Result<(), ParseError>,
) -> Result<(), ParseError> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => on_child(reader, e, true)?,
            Event::Empty(ref e) => on_child(reader, e, false)?,
            Event::End(_) | Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

/// Skips to the end of the current element if it has content.
fn skip_unless_empty(reader: &mut Reader<&[u8]>, has_children: bool) -> Result<(), ParseError> {
    if !has_children {
        return Ok(());
    }

    let mut buf = Vec::new();
    let mut depth = 1;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

fn tag_name(e: &BytesStart<'_>) -> Result<String, ParseError> {
    Ok(std::str::from_utf8(e.name().as_ref())?.to_string())
}

fn attr_value(attr: &Attribute<'_>) -> Result<String, ParseError> {
    let raw = std::str::from_utf8(&attr.value)?;
    Ok(unescape(raw)?.into_owned())
}

/// Reads the mandatory `type` attribute of a `base`/`interface`/`constraint` element.
fn required_type_attr(e: &BytesStart<'_>, element: &str) -> Result<TypeRef, ParseError> {
    for attr in e.attributes().flatten() {
        if std::str::from_utf8(attr.key.as_ref())? == "type" {
            return TypeRef::parse(&attr_value(&attr)?);
        }
    }
    Err(ParseError::missing_attr(element, "type"))
}

fn parse_bool(element: &str, attribute: &str, value: &str) -> Result<bool, ParseError> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ParseError::invalid_attr(element, attribute, value)),
    }
}

fn parse_visibility(element: &str, value: &str) -> Result<Visibility, ParseError> {
    Visibility::parse(value).ok_or_else(|| ParseError::invalid_attr(element, "visibility", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CATALOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<catalog module="Sample.dll">
    <type name="SampleClass" namespace="Samples" kind="class">
        <base type="System.Object"/>
        <interface type="System.IDisposable"/>
        <method name="Echo" returns="System.String">
            <parameter name="text" type="System.String"/>
        </method>
        <method name="TryParse" returns="System.Boolean">
            <parameter name="text" type="System.String"/>
            <parameter name="value" type="System.Int32&amp;" out="true"/>
        </method>
        <method name="get_Number" returns="System.Int32" special="true"/>
        <method name="GetValue" returns="!!T">
            <genericParameter name="T" referenceType="true" defaultConstructor="true">
                <constraint type="System.IComparable`1[!!T]"/>
            </genericParameter>
            <parameter name="key" type="System.String"/>
        </method>
        <property name="Number" type="System.Int32" get="true" set="true"/>
        <property name="Item" type="System.String" get="true">
            <parameter name="index" type="System.Int32"/>
        </property>
        <event name="Happened" type="System.EventHandler">
            <parameter name="sender" type="System.Object"/>
            <parameter name="e" type="System.EventArgs"/>
        </event>
        <unknown><nested/></unknown>
    </type>
    <type name="SampleEnum" namespace="Samples" kind="enum" underlying="System.Byte">
        <value name="One">1</value>
        <value name="Two">2</value>
    </type>
    <type name="Hidden" namespace="Samples" kind="class" visibility="internal"/>
</catalog>"#;

    #[test]
    fn test_parse_catalog() {
        let catalog = parse_catalog(SAMPLE_CATALOG).expect("Failed to parse catalog");

        assert_eq!(catalog.module, "Sample.dll");
        assert_eq!(catalog.types.len(), 3);
        assert!(catalog.get_type("Samples.SampleClass").is_some());
        assert_eq!(
            catalog.get_type("Samples.Hidden").unwrap().visibility,
            Visibility::Internal
        );
    }

    #[test]
    fn test_parse_class_members() {
        let catalog = parse_catalog(SAMPLE_CATALOG).expect("Failed to parse catalog");
        let class = catalog.get_type("Samples.SampleClass").unwrap();

        assert_eq!(class.flavor, TypeFlavor::Class);
        assert!(class.base_type.as_ref().unwrap().is_object());
        assert_eq!(class.interfaces.len(), 1);
        assert_eq!(class.methods.len(), 4);
        assert_eq!(class.public_instance_methods().count(), 3);

        let try_parse = class.find_method("TryParse").unwrap();
        let out_param = &try_parse.parameters[1];
        assert!(out_param.is_out);
        assert!(out_param.ty.is_by_ref());

        let get_value = class.find_method("GetValue").unwrap();
        let param = &get_value.generic_params[0];
        assert!(
            param
                .attributes
                .contains(GenericParamAttributes::REFERENCE_TYPE_CONSTRAINT)
        );
        assert!(
            param
                .attributes
                .contains(GenericParamAttributes::DEFAULT_CONSTRUCTOR_CONSTRAINT)
        );
        assert_eq!(param.constraints.len(), 1);

        assert_eq!(class.properties.len(), 2);
        assert!(class.properties[0].can_write);
        assert!(class.properties[1].is_indexer());
        assert!(!class.properties[1].can_write);

        let event = &class.events[0];
        assert_eq!(event.handler_parameters.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_parse_enum() {
        let catalog = parse_catalog(SAMPLE_CATALOG).expect("Failed to parse catalog");
        let enum_def = catalog.get_type("Samples.SampleEnum").unwrap();

        assert_eq!(enum_def.flavor, TypeFlavor::Enum);
        assert!(enum_def.enum_underlying_type().is("System", "Byte"));
        assert_eq!(
            enum_def.enum_values,
            vec![
                EnumValue::new("One".to_string(), 1),
                EnumValue::new("Two".to_string(), 2)
            ]
        );
    }

    #[test]
    fn test_missing_catalog_element() {
        let result = parse_catalog("<other/>");
        assert!(matches!(result, Err(ParseError::InvalidStructure { .. })));
    }

    #[test]
    fn test_missing_required_attribute() {
        let xml = r#"<catalog><type namespace="A" kind="class"/></catalog>"#;
        let err = parse_catalog(xml).unwrap_err();
        assert!(err.to_string().contains("'name'"));
    }

    #[test]
    fn test_invalid_type_expression() {
        let xml = r#"<catalog><type name="A" namespace="N" kind="class">
            <base type="System.Collections.Generic.List`1[System.Int32"/>
        </type></catalog>"#;
        assert!(matches!(
            parse_catalog(xml),
            Err(ParseError::InvalidTypeExpression { .. })
        ));
    }

    #[test]
    fn test_invalid_enum_value() {
        let xml = r#"<catalog><type name="E" namespace="N" kind="enum">
            <value name="Bad">one</value>
        </type></catalog>"#;
        assert!(matches!(
            parse_catalog(xml),
            Err(ParseError::InvalidAttribute { .. })
        ));
    }
}
