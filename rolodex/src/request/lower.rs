use super::{variables::type_name, CoercedVariables, Fragments, RequestError};
use crate::{
    schema::{self, FieldDef, ObjectDef, TypeRef},
    types::{Arguments, Field, FieldSelector},
    Location
};
use graphql_parser::query::{
    Directive, Field as QueryField, Selection, SelectionSet, Type, TypeCondition,
    Value as QueryValue, VariableDefinition
};
use graphql_parser::Pos;
use serde_json::{Map, Number, Value};
use std::collections::{HashMap, HashSet};

/// Convert a literal that must not reference variables, such as a default value.
pub(super) fn const_value<'a>(value: &QueryValue<'a, &'a str>) -> Result<Value, String> {
    Ok(match value {
        QueryValue::Variable(name) => {
            return Err(format!("variable \"${}\" is not allowed here", name))
        }
        QueryValue::Int(n) => n.as_i64().map(Value::from).unwrap_or(Value::Null),
        QueryValue::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        QueryValue::String(s) => Value::String(s.clone()),
        QueryValue::Boolean(b) => Value::Bool(*b),
        QueryValue::Null => Value::Null,
        QueryValue::Enum(e) => Value::String(e.to_string()),
        QueryValue::List(items) => Value::Array(
            items
                .iter()
                .map(const_value)
                .collect::<Result<Vec<_>, _>>()?
        ),
        QueryValue::Object(fields) => {
            let mut map = Map::new();
            for (key, value) in fields {
                map.insert(key.to_string(), const_value(value)?);
            }
            Value::Object(map)
        }
    })
}

/// Whether a variable of the declared type may be passed where `expected` is wanted.
fn variable_fits<'a>(declared: &Type<'a, &'a str>, expected: &TypeRef) -> bool {
    match (declared, expected) {
        (Type::NonNullType(inner), _) => variable_fits(inner, expected),
        (Type::ListType(inner), TypeRef::List(expected)) => variable_fits(inner, expected),
        (Type::NamedType(name), TypeRef::Named(expected)) => name == expected,
        _ => false
    }
}

fn literal_fits<'a>(literal: &QueryValue<'a, &'a str>, scalar: &str) -> bool {
    match (scalar, literal) {
        ("String", QueryValue::String(_)) | ("ID", QueryValue::String(_)) => true,
        ("ID", QueryValue::Int(_)) | ("Float", QueryValue::Int(_)) => true,
        ("Int", QueryValue::Int(n)) => n
            .as_i64()
            .map_or(false, |i| i32::MIN as i64 <= i && i <= i32::MAX as i64),
        ("Float", QueryValue::Float(_)) => true,
        ("Boolean", QueryValue::Boolean(_)) => true,
        _ => false
    }
}

/// Validates a selection against the schema and flattens it into a
/// [`FieldSelector`](../types/enum.FieldSelector.html) tree.
pub(super) struct Lowering<'d, 'a> {
    fragments: &'d Fragments<'d, 'a>,
    variables: &'d CoercedVariables,
    declared: HashMap<&'a str, &'d Type<'a, &'a str>>,
    spreading: Vec<&'a str>,
    involved_types: Vec<&'static str>,
    errors: Vec<RequestError>
}

impl<'d, 'a> Lowering<'d, 'a> {
    pub(super) fn new(
        fragments: &'d Fragments<'d, 'a>,
        variables: &'d CoercedVariables,
        definitions: &'d [VariableDefinition<'a, &'a str>]
    ) -> Self {
        Lowering {
            fragments,
            variables,
            declared: definitions
                .iter()
                .map(|definition| (definition.name, &definition.var_type))
                .collect(),
            spreading: Vec::new(),
            involved_types: Vec::new(),
            errors: Vec::new()
        }
    }

    /// The types touched by the selection, or every validation error found.
    pub(super) fn finish(self) -> Result<Vec<&'static str>, Vec<RequestError>> {
        if self.errors.is_empty() {
            Ok(self.involved_types)
        } else {
            Err(self.errors)
        }
    }

    fn error<M: Into<String>>(&mut self, message: M, locations: Vec<Location>) {
        self.errors.push(RequestError::validation(message, locations));
    }

    pub(super) fn lower_selection_set(
        &mut self,
        parent: &'static ObjectDef,
        selection_set: &'d SelectionSet<'a, &'a str>
    ) -> Vec<FieldSelector> {
        if !self.involved_types.contains(&parent.name) {
            self.involved_types.push(parent.name);
        }

        let mut selection = Vec::new();
        let mut visited = HashSet::new();
        self.collect(parent, selection_set, &mut visited, &mut selection);
        selection
    }

    /// Each named fragment is expanded at most once per selection set.
    fn collect(
        &mut self,
        parent: &'static ObjectDef,
        selection_set: &'d SelectionSet<'a, &'a str>,
        visited: &mut HashSet<&'a str>,
        out: &mut Vec<FieldSelector>
    ) {
        for item in &selection_set.items {
            match item {
                Selection::Field(field) => {
                    if !self.should_include(&field.directives) {
                        continue;
                    }
                    if let Some(selector) = self.lower_field(parent, field) {
                        self.merge(out, selector);
                    }
                }
                Selection::FragmentSpread(spread) => {
                    if !self.should_include(&spread.directives) {
                        continue;
                    }
                    let name = spread.fragment_name;
                    let location = Location::from(spread.position);
                    let fragments = self.fragments;
                    let fragment = match fragments.get(name) {
                        Some(fragment) => *fragment,
                        None => {
                            self.error(format!("Unknown fragment \"{}\".", name), vec![location]);
                            continue;
                        }
                    };
                    if self.spreading.contains(&name) {
                        self.error(
                            format!("Cannot spread fragment \"{}\" within itself.", name),
                            vec![location]
                        );
                        continue;
                    }
                    if !visited.insert(name) {
                        continue;
                    }
                    let TypeCondition::On(condition) = &fragment.type_condition;
                    if !self.applies(parent, condition, Some(name), spread.position) {
                        continue;
                    }

                    self.spreading.push(name);
                    self.collect(parent, &fragment.selection_set, visited, out);
                    self.spreading.pop();
                }
                Selection::InlineFragment(inline) => {
                    if !self.should_include(&inline.directives) {
                        continue;
                    }
                    if let Some(TypeCondition::On(condition)) = &inline.type_condition {
                        if !self.applies(parent, condition, None, inline.position) {
                            continue;
                        }
                    }
                    self.collect(parent, &inline.selection_set, visited, out);
                }
            }
        }
    }

    /// There are no interfaces or unions, so a fragment applies only on its own type.
    fn applies(
        &mut self,
        parent: &'static ObjectDef,
        condition: &str,
        fragment: Option<&str>,
        position: Pos
    ) -> bool {
        if !schema::is_known_type(condition) {
            self.error(format!("Unknown type \"{}\".", condition), vec![position.into()]);
            return false;
        }
        if condition == parent.name {
            return true;
        }

        let subject = match fragment {
            Some(name) => format!("Fragment \"{}\"", name),
            None => "Fragment".to_string()
        };
        self.error(
            format!(
                "{} cannot be spread here as objects of type \"{}\" can never be of type \"{}\".",
                subject, parent.name, condition
            ),
            vec![position.into()]
        );
        false
    }

    fn lower_field(
        &mut self,
        parent: &'static ObjectDef,
        field: &'d QueryField<'a, &'a str>
    ) -> Option<FieldSelector> {
        let location = Location::from(field.position);
        let response_key = field.alias.unwrap_or(field.name).to_string();

        if field.name == schema::TYPENAME {
            for (argument, _) in &field.arguments {
                self.error(
                    format!(
                        "Unknown argument \"{}\" on field \"{}.{}\".",
                        argument,
                        parent.name,
                        schema::TYPENAME
                    ),
                    vec![location]
                );
            }
            if !field.selection_set.items.is_empty() {
                self.error(
                    "Field \"__typename\" must not have a selection since type \"String!\" has no subfields.",
                    vec![location]
                );
            }
            return Some(FieldSelector::Scalar(Field {
                response_key,
                name: schema::TYPENAME.to_string(),
                arguments: Arguments::new(),
                location
            }));
        }

        let definition = match parent.field(field.name) {
            Some(definition) => definition,
            None => {
                self.error(
                    format!(
                        "Cannot query field \"{}\" on type \"{}\".",
                        field.name, parent.name
                    ),
                    vec![location]
                );
                return None;
            }
        };

        let lowered = Field {
            response_key,
            name: field.name.to_string(),
            arguments: self.lower_arguments(parent, definition, field),
            location
        };

        if definition.ty.is_leaf() {
            if !field.selection_set.items.is_empty() {
                self.error(
                    format!(
                        "Field \"{}\" must not have a selection since type \"{}\" has no subfields.",
                        field.name, definition.ty
                    ),
                    vec![location]
                );
            }
            return Some(FieldSelector::Scalar(lowered));
        }

        if field.selection_set.items.is_empty() {
            self.error(
                format!(
                    "Field \"{name}\" of type \"{ty}\" must have a selection of subfields. Did you mean \"{name} {{ ... }}\"?",
                    name = field.name,
                    ty = definition.ty
                ),
                vec![location]
            );
            return None;
        }

        let object = schema::object(definition.ty.named())?;
        let selection = self.lower_selection_set(object, &field.selection_set);
        Some(FieldSelector::Object(lowered, selection))
    }

    fn lower_arguments(
        &mut self,
        parent: &'static ObjectDef,
        definition: &'static FieldDef,
        field: &'d QueryField<'a, &'a str>
    ) -> Arguments {
        let location = Location::from(field.position);
        let mut arguments = Arguments::new();

        for (name, value) in &field.arguments {
            let argument = match definition.argument(name) {
                Some(argument) => argument,
                None => {
                    self.error(
                        format!(
                            "Unknown argument \"{}\" on field \"{}.{}\".",
                            name, parent.name, definition.name
                        ),
                        vec![location]
                    );
                    continue;
                }
            };
            if arguments.contains_key(*name) {
                self.error(
                    format!("There can be only one argument named \"{}\".", name),
                    vec![location]
                );
                continue;
            }
            self.check_input(value, &argument.ty, location);
            if let Some(value) = self.input_value(value, location) {
                arguments.insert(name.to_string(), value);
            }
        }

        arguments
    }

    /// Literals and variables must have the type of the argument they are passed to.
    fn check_input(&mut self, value: &QueryValue<'a, &'a str>, expected: &TypeRef, location: Location) {
        match (value, expected) {
            (QueryValue::Variable(name), _) => {
                // Undefined variables are reported when the value is substituted.
                let declared = match self.declared.get(name) {
                    Some(declared) => *declared,
                    None => return
                };
                if !variable_fits(declared, expected) {
                    self.error(
                        format!(
                            "Variable \"${}\" of type \"{}\" used in position expecting type \"{}\".",
                            name,
                            type_name(declared),
                            expected
                        ),
                        vec![location]
                    );
                }
            }
            (QueryValue::Null, _) => {}
            (QueryValue::List(items), TypeRef::List(inner)) => {
                for item in items {
                    self.check_input(item, inner, location);
                }
            }
            (_, TypeRef::List(inner)) => self.check_input(value, inner, location),
            (literal, TypeRef::Named(scalar)) => {
                if !literal_fits(literal, scalar) {
                    self.error(
                        format!("Expected value of type \"{}\", found {}.", scalar, literal),
                        vec![location]
                    );
                }
            }
        }
    }

    /// Substitute variables into an argument value. A top-level reference to a variable that
    /// was not provided yields `None`, meaning the argument is left out.
    fn input_value(&mut self, value: &QueryValue<'a, &'a str>, location: Location) -> Option<Value> {
        match value {
            QueryValue::Variable(name) => {
                if !self.declared.contains_key(name) {
                    self.error(format!("Variable \"${}\" is not defined.", name), vec![location]);
                    return None;
                }
                self.variables.get(*name).cloned()
            }
            QueryValue::List(items) => Some(Value::Array(
                items
                    .iter()
                    .map(|item| self.input_value(item, location).unwrap_or(Value::Null))
                    .collect()
            )),
            QueryValue::Object(fields) => {
                let mut map = Map::new();
                for (key, item) in fields {
                    let item = self.input_value(item, location).unwrap_or(Value::Null);
                    map.insert(key.to_string(), item);
                }
                Some(Value::Object(map))
            }
            literal => match const_value(literal) {
                Ok(value) => Some(value),
                Err(reason) => {
                    self.error(reason, vec![location]);
                    None
                }
            }
        }
    }

    fn should_include(&mut self, directives: &[Directive<'a, &'a str>]) -> bool {
        let mut include = true;
        for directive in directives {
            match directive.name {
                "skip" => {
                    if self.directive_condition(directive) == Some(true) {
                        include = false;
                    }
                }
                "include" => {
                    if self.directive_condition(directive) == Some(false) {
                        include = false;
                    }
                }
                other => self.error(
                    format!("Unknown directive \"@{}\".", other),
                    vec![directive.position.into()]
                )
            }
        }
        include
    }

    fn directive_condition(&mut self, directive: &Directive<'a, &'a str>) -> Option<bool> {
        let location = Location::from(directive.position);
        let mut condition = None;

        for (name, value) in &directive.arguments {
            if *name != "if" {
                self.error(
                    format!(
                        "Unknown argument \"{}\" on directive \"@{}\".",
                        name, directive.name
                    ),
                    vec![location]
                );
                continue;
            }
            match self.input_value(value, location) {
                Some(Value::Bool(b)) => condition = Some(b),
                _ => self.error(
                    format!(
                        "Argument \"if\" of directive \"@{}\" must be a Boolean.",
                        directive.name
                    ),
                    vec![location]
                )
            }
        }

        if condition.is_none() && !directive.arguments.iter().any(|(name, _)| *name == "if") {
            self.error(
                format!(
                    "Directive \"@{}\" argument \"if\" of type \"Boolean!\" is required, but it was not provided.",
                    directive.name
                ),
                vec![location]
            );
        }
        condition
    }

    /// Fields sharing a response key are merged. They must be the same field with the same
    /// arguments.
    fn merge(&mut self, out: &mut Vec<FieldSelector>, selector: FieldSelector) {
        let key = selector.field().response_key.clone();
        let existing = match out
            .iter_mut()
            .find(|existing| existing.field().response_key == key)
        {
            Some(existing) => existing,
            None => {
                out.push(selector);
                return;
            }
        };

        let (first, second) = (existing.field(), selector.field());
        let conflict = if first.name != second.name {
            Some(format!(
                "Fields \"{}\" conflict because \"{}\" and \"{}\" are different fields. Use different aliases on the fields to fetch both if this was intentional.",
                key, first.name, second.name
            ))
        } else if first.arguments != second.arguments {
            Some(format!(
                "Fields \"{}\" conflict because they have differing arguments. Use different aliases on the fields to fetch both if this was intentional.",
                key
            ))
        } else {
            None
        };
        if let Some(message) = conflict {
            let locations = vec![first.location, second.location];
            self.error(message, locations);
            return;
        }

        if let (FieldSelector::Object(_, inner), FieldSelector::Object(_, more)) = (existing, selector) {
            for selector in more {
                self.merge(inner, selector);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{request::prepare, types::FieldSelector, ErrorCode, Request, RequestError};

    fn lower(document: &str) -> Result<Vec<FieldSelector>, Vec<RequestError>> {
        prepare(&Request::new(document)).map(|operation| operation.selection)
    }

    fn messages(document: &str) -> Vec<String> {
        lower(document)
            .unwrap_err()
            .into_iter()
            .map(|e| {
                assert_eq!(e.code(), "GRAPHQL_VALIDATION_FAILED");
                e.to_string()
            })
            .collect()
    }

    fn shape(selection: &[FieldSelector]) -> Vec<String> {
        selection
            .iter()
            .map(|selector| match selector {
                FieldSelector::Scalar(field) => field.response_key.clone(),
                FieldSelector::Object(field, inner) => {
                    format!("{} {{ {} }}", field.response_key, shape(inner).join(" "))
                }
            })
            .collect()
    }

    #[test]
    fn flattens_fragments() {
        let selection = lower(
            "query { people { ...Ids ... on Person { name } ... { __typename } } }
             fragment Ids on Person { id }"
        )
        .unwrap();
        assert_eq!(shape(&selection), vec!["people { id name __typename }"]);
    }

    #[test]
    fn merges_repeated_fields() {
        let selection = lower("{ people { id } people { name id } }").unwrap();
        assert_eq!(shape(&selection), vec!["people { id name }"]);
    }

    #[test]
    fn keeps_aliases_apart() {
        let selection = lower("{ everyone: people { who: name } people { id } }").unwrap();
        assert_eq!(shape(&selection), vec!["everyone { who }", "people { id }"]);
    }

    #[test]
    fn honors_skip_and_include() {
        let selection = lower(
            "{ people { id @skip(if: true) name @include(if: false) __typename @include(if: true) } }"
        )
        .unwrap();
        assert_eq!(shape(&selection), vec!["people { __typename }"]);
    }

    #[test]
    fn rejects_unknown_fields_and_arguments() {
        assert_eq!(
            messages("{ people { id email } }"),
            vec!["Cannot query field \"email\" on type \"Person\"."]
        );
        assert_eq!(
            messages("{ people(first: 1) { id } }"),
            vec!["Unknown argument \"first\" on field \"Query.people\"."]
        );
        assert_eq!(
            messages("mutation { people { id } }"),
            vec!["Cannot query field \"people\" on type \"Mutation\"."]
        );
    }

    #[test]
    fn checks_subselections() {
        assert_eq!(
            messages("{ people }"),
            vec!["Field \"people\" of type \"[Person]\" must have a selection of subfields. Did you mean \"people { ... }\"?"]
        );
        assert_eq!(
            messages("{ people { name { first } } }"),
            vec!["Field \"name\" must not have a selection since type \"String\" has no subfields."]
        );
    }

    #[test]
    fn checks_fragments() {
        assert_eq!(messages("{ people { ...Missing } }"), vec!["Unknown fragment \"Missing\"."]);
        assert_eq!(
            messages("{ people { ...Q } } fragment Q on Query { __typename }"),
            vec!["Fragment \"Q\" cannot be spread here as objects of type \"Person\" can never be of type \"Query\"."]
        );
        assert_eq!(
            messages("{ people { ... on Robot { id } } }"),
            vec!["Unknown type \"Robot\"."]
        );
        assert_eq!(
            messages("{ people { ...A } } fragment A on Person { ...B } fragment B on Person { ...A }"),
            vec!["Cannot spread fragment \"A\" within itself."]
        );
    }

    #[test]
    fn rejects_conflicting_fields() {
        assert_eq!(
            messages("{ people { x: id x: name } }"),
            vec!["Fields \"x\" conflict because \"id\" and \"name\" are different fields. Use different aliases on the fields to fetch both if this was intentional."]
        );
        assert_eq!(
            messages("mutation { editPerson(id: \"1\", name: \"a\") { id } editPerson(id: \"2\", name: \"a\") { id } }"),
            vec!["Fields \"editPerson\" conflict because they have differing arguments. Use different aliases on the fields to fetch both if this was intentional."]
        );
    }

    #[test]
    fn rejects_undefined_variables_and_directives() {
        assert_eq!(
            messages("mutation { editPerson(id: $id, name: \"a\") { id } }"),
            vec!["Variable \"$id\" is not defined."]
        );
        assert_eq!(
            messages("{ people { id @deprecated } }"),
            vec!["Unknown directive \"@deprecated\"."]
        );
        assert_eq!(
            messages("{ people { id @skip } }"),
            vec!["Directive \"@skip\" argument \"if\" of type \"Boolean!\" is required, but it was not provided."]
        );
    }

    #[test]
    fn checks_variable_positions() {
        assert_eq!(
            messages("mutation ($id: ID) { editPerson(id: $id, name: \"a\") { id } }"),
            vec!["Variable \"$id\" of type \"ID\" used in position expecting type \"String\"."]
        );
        assert_eq!(
            messages("mutation ($id: Int, $name: [String]) { editPerson(id: $id, name: $name) { id } }"),
            vec![
                "Variable \"$id\" of type \"Int\" used in position expecting type \"String\".",
                "Variable \"$name\" of type \"[String]\" used in position expecting type \"String\"."
            ]
        );
        assert!(prepare(
            &Request::new("mutation ($id: String!) { editPerson(id: $id, name: \"a\") { id } }")
                .with_variables(match serde_json::json!({ "id": "1" }) {
                    serde_json::Value::Object(map) => map,
                    _ => unreachable!()
                })
        )
        .is_ok());
    }

    #[test]
    fn checks_literal_argument_types() {
        assert_eq!(
            messages("mutation { editPerson(id: 2, name: \"a\") { id } }"),
            vec!["Expected value of type \"String\", found 2."]
        );
        assert_eq!(
            messages("mutation { editPerson(id: \"2\", name: true) { id } }"),
            vec!["Expected value of type \"String\", found true."]
        );
        assert!(lower("mutation { editPerson(id: null, name: \"a\") { id } }").is_ok());
    }

    #[test]
    fn expands_each_fragment_once() {
        let depth = 40;
        let mut document = String::from("{ people { ...F0 } }");
        for i in 0..depth {
            document.push_str(&format!(
                " fragment F{i} on Person {{ ...F{next} ...F{next} }}",
                i = i,
                next = i + 1
            ));
        }
        document.push_str(&format!(" fragment F{} on Person {{ id name }}", depth));

        let selection = lower(&document).unwrap();
        assert_eq!(shape(&selection), vec!["people { id name }"]);
    }

    #[test]
    fn directive_conditions_read_variables() {
        let selection = prepare(
            &Request::new("query ($hide: Boolean!) { people { id @skip(if: $hide) name } }")
                .with_variables(match serde_json::json!({ "hide": true }) {
                    serde_json::Value::Object(map) => map,
                    _ => unreachable!()
                })
        )
        .unwrap()
        .selection;
        assert_eq!(shape(&selection), vec!["people { name }"]);
    }
}
