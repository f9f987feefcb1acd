use super::{lower::const_value, CoercedVariables, RequestError};
use crate::{schema, Location};
use graphql_parser::query::{Type, VariableDefinition};
use serde_json::{Map, Value};
use std::collections::HashSet;

pub(super) fn type_name<'a>(ty: &Type<'a, &'a str>) -> String {
    match ty {
        Type::NamedType(name) => name.to_string(),
        Type::ListType(inner) => format!("[{}]", type_name(inner)),
        Type::NonNullType(inner) => format!("{}!", type_name(inner))
    }
}

fn named<'t, 'a>(ty: &'t Type<'a, &'a str>) -> &'a str {
    match ty {
        Type::NamedType(name) => *name,
        Type::ListType(inner) | Type::NonNullType(inner) => named(inner)
    }
}

fn coerce_scalar(name: &str, value: &Value) -> Result<Value, String> {
    match (name, value) {
        ("String", Value::String(_)) => Ok(value.clone()),
        ("String", _) => Err(format!("String cannot represent a non string value: {}", value)),
        ("ID", Value::String(_)) => Ok(value.clone()),
        ("ID", _) => Err(format!("ID cannot represent value: {}", value)),
        ("Int", Value::Number(n))
            if n.as_i64().map_or(false, |i| i32::MIN as i64 <= i && i <= i32::MAX as i64) =>
        {
            Ok(value.clone())
        }
        ("Int", _) => Err(format!("Int cannot represent non 32-bit signed integer value: {}", value)),
        ("Float", Value::Number(_)) => Ok(value.clone()),
        ("Float", _) => Err(format!("Float cannot represent non numeric value: {}", value)),
        ("Boolean", Value::Bool(_)) => Ok(value.clone()),
        ("Boolean", _) => Err(format!("Boolean cannot represent a non boolean value: {}", value)),
        (other, _) => Err(format!("Unknown type \"{}\".", other))
    }
}

/// Coerce an input value according to the GraphQL input coercion rules.
pub(super) fn coerce_input<'a>(ty: &Type<'a, &'a str>, value: &Value) -> Result<Value, String> {
    match ty {
        Type::NonNullType(inner) => {
            if value.is_null() {
                Err(format!(
                    "Expected non-nullable type \"{}\" not to be null.",
                    type_name(ty)
                ))
            } else {
                coerce_input(inner, value)
            }
        }
        Type::ListType(inner) => match value {
            Value::Null => Ok(Value::Null),
            Value::Array(items) => items
                .iter()
                .map(|item| coerce_input(inner, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            single => coerce_input(inner, single).map(|item| Value::Array(vec![item]))
        },
        Type::NamedType(name) => {
            if value.is_null() {
                Ok(Value::Null)
            } else {
                coerce_scalar(name, value)
            }
        }
    }
}

pub(super) fn coerce_variables<'a>(
    definitions: &[VariableDefinition<'a, &'a str>],
    provided: &Map<String, Value>
) -> Result<CoercedVariables, Vec<RequestError>> {
    let mut coerced = Map::new();
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for definition in definitions {
        let name = definition.name;
        let location = Location::from(definition.position);

        if !seen.insert(name) {
            errors.push(RequestError::validation(
                format!("There can be only one variable named \"${}\".", name),
                vec![location]
            ));
            continue;
        }

        let input_type = named(&definition.var_type);
        if !schema::is_known_type(input_type) {
            errors.push(RequestError::validation(
                format!("Unknown type \"{}\".", input_type),
                vec![location]
            ));
            continue;
        }
        if !schema::SCALARS.contains(&input_type) {
            errors.push(RequestError::validation(
                format!(
                    "Variable \"${}\" cannot be non-input type \"{}\".",
                    name,
                    type_name(&definition.var_type)
                ),
                vec![location]
            ));
            continue;
        }

        let non_null = matches!(definition.var_type, Type::NonNullType(_));
        match (provided.get(name), &definition.default_value) {
            (Some(Value::Null), _) if non_null => errors.push(RequestError::Variable {
                message: format!(
                    "Variable \"${}\" of non-null type \"{}\" must not be null.",
                    name,
                    type_name(&definition.var_type)
                ),
                locations: vec![location]
            }),
            (Some(value), _) => match coerce_input(&definition.var_type, value) {
                Ok(value) => {
                    coerced.insert(name.to_string(), value);
                }
                Err(reason) => errors.push(RequestError::Variable {
                    message: format!(
                        "Variable \"${}\" got invalid value {}; {}",
                        name, value, reason
                    ),
                    locations: vec![location]
                })
            },
            (None, Some(default)) => {
                match const_value(default).and_then(|value| coerce_input(&definition.var_type, &value)) {
                    Ok(value) => {
                        coerced.insert(name.to_string(), value);
                    }
                    Err(reason) => errors.push(RequestError::validation(
                        format!("Variable \"${}\" has an invalid default value: {}", name, reason),
                        vec![location]
                    ))
                }
            }
            (None, None) if non_null => errors.push(RequestError::Variable {
                message: format!(
                    "Variable \"${}\" of required type \"{}\" was not provided.",
                    name,
                    type_name(&definition.var_type)
                ),
                locations: vec![location]
            }),
            (None, None) => {}
        }
    }

    if errors.is_empty() {
        Ok(coerced)
    } else {
        Err(errors)
    }
}
