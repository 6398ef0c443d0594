//! OpenAPI 3 / Swagger 2 parsing.
//!
//! The document is decoded into a generic JSON tree (YAML is converted on the
//! way in) and then walked as `paths` → [`PathItem`] → [`Operation`]. Local
//! `$ref`s are followed for path items, parameters, request bodies, responses,
//! examples and schemas.

use super::{Diagnostic, ParseOutcome};
use crate::catalogue::Catalogue;
use crate::error::ParseError;
use crate::model::{Endpoint, ParamLocation, Parameter};
use serde_json::{Map, Value};

const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Upper bound on chained `$ref` hops.
const MAX_REF_DEPTH: usize = 8;

/// Decodes a JSON or YAML document into a JSON tree with a mapping at the root.
pub fn decode(content: &str) -> Result<Value, ParseError> {
    let trimmed = content.trim_start();
    let value = if trimmed.starts_with('{') || trimmed.starts_with('[') {
        serde_json::from_str(trimmed)?
    } else {
        yaml_to_json(serde_yaml::from_str(content)?)
    };

    match value {
        Value::Object(_) => Ok(value),
        _ => Err(ParseError::NotAnObject),
    }
}

/// Converts YAML into JSON, stringifying non-string keys such as bare `200:`
/// response codes.
fn yaml_to_json(value: serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;

    match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(Value::Null, Value::Number)
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(seq) => Value::Array(seq.into_iter().map(yaml_to_json).collect()),
        Yaml::Mapping(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (yaml_key(key), yaml_to_json(value)))
                .collect(),
        ),
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => s,
        Yaml::Number(n) => n.to_string(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

/// One entry of the `paths` mapping.
#[derive(Debug)]
struct PathItem<'a> {
    path: &'a str,
    description: Option<&'a str>,
    parameters: &'a [Value],
    operations: Vec<Operation<'a>>,
}

/// One HTTP-verb entry under a path item.
#[derive(Debug)]
struct Operation<'a> {
    method: &'static str,
    tags: Vec<&'a str>,
    summary: Option<&'a str>,
    operation_id: Option<&'a str>,
    description: Option<&'a str>,
    parameters: &'a [Value],
    request_body: Option<&'a Value>,
    responses: Option<&'a Map<String, Value>>,
}

fn str_field<'a>(node: &'a Value, key: &str) -> Option<&'a str> {
    node.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn array_field<'a>(node: &'a Value, key: &str) -> &'a [Value] {
    node.get(key)
        .and_then(Value::as_array)
        .map_or(&[], Vec::as_slice)
}

impl<'a> Operation<'a> {
    fn from_value(method: &'static str, node: &'a Value) -> Self {
        Self {
            method,
            tags: array_field(node, "tags")
                .iter()
                .filter_map(Value::as_str)
                .collect(),
            summary: str_field(node, "summary"),
            operation_id: str_field(node, "operationId"),
            description: str_field(node, "description"),
            parameters: array_field(node, "parameters"),
            request_body: node.get("requestBody"),
            responses: node.get("responses").and_then(Value::as_object),
        }
    }
}

/// Example text: strings verbatim, anything else pretty-printed JSON.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Walks a decoded document, collecting diagnostics as it goes.
struct Document<'a> {
    root: &'a Value,
    api_name: &'a str,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Document<'a> {
    /// Follows local `$ref`s; `None` when a reference cannot be resolved.
    fn resolve(&self, value: &'a Value) -> Option<&'a Value> {
        let mut current = value;
        for _ in 0..MAX_REF_DEPTH {
            match current.get("$ref").and_then(Value::as_str) {
                Some(reference) => {
                    current = reference
                        .strip_prefix('#')
                        .and_then(|pointer| self.root.pointer(pointer))?;
                }
                None => return Some(current),
            }
        }
        None
    }

    fn resolve_or_report(&mut self, value: &'a Value, context: &str) -> Option<&'a Value> {
        let resolved = self.resolve(value);
        if resolved.is_none() {
            let reference = value.get("$ref").and_then(Value::as_str).unwrap_or("?");
            self.diagnostics.push(Diagnostic::at(
                context,
                format!("unresolved reference '{}'", reference),
            ));
        }
        resolved
    }

    fn base_url(&self) -> Option<String> {
        if let Some(url) = self
            .root
            .get("servers")
            .and_then(Value::as_array)
            .and_then(|servers| servers.first())
            .and_then(|server| str_field(server, "url"))
        {
            return Some(url.to_string());
        }

        let host = str_field(self.root, "host")?;
        let scheme = array_field(self.root, "schemes")
            .first()
            .and_then(Value::as_str)
            .unwrap_or("https");
        let base_path = str_field(self.root, "basePath").unwrap_or("");
        Some(format!("{}://{}{}", scheme, host, base_path))
    }

    fn path_items(&mut self) -> Vec<PathItem<'a>> {
        let Some(paths) = self.root.get("paths") else {
            self.diagnostics
                .push(Diagnostic::at("paths", "document has no paths"));
            return Vec::new();
        };
        let Some(paths) = paths.as_object() else {
            self.diagnostics
                .push(Diagnostic::at("paths", "paths is not a mapping"));
            return Vec::new();
        };

        let mut items = Vec::with_capacity(paths.len());
        for (path, node) in paths {
            let context = format!("paths.{}", path);
            let Some(node) = self.resolve_or_report(node, &context) else {
                continue;
            };
            if !node.is_object() {
                self.diagnostics
                    .push(Diagnostic::at(context, "path item is not a mapping"));
                continue;
            }

            let mut operations = Vec::new();
            for &method in HTTP_METHODS {
                match node.get(method) {
                    Some(op) if op.is_object() => operations.push(Operation::from_value(method, op)),
                    Some(_) => self.diagnostics.push(Diagnostic::at(
                        format!("{}.{}", context, method),
                        "operation is not a mapping",
                    )),
                    None => {}
                }
            }
            if operations.is_empty() {
                self.diagnostics
                    .push(Diagnostic::at(context, "path has no operations"));
            }

            items.push(PathItem {
                path,
                description: str_field(node, "description"),
                parameters: array_field(node, "parameters"),
                operations,
            });
        }
        items
    }

    fn endpoint(&mut self, item: &PathItem<'a>, op: &Operation<'a>) -> Endpoint {
        let context = format!("paths.{}.{}", item.path, op.method);
        let section = op.tags.first().copied().unwrap_or_default();
        let mut endpoint = Endpoint::new(self.api_name, op.method, item.path, section);

        endpoint.summary = op
            .summary
            .or(op.operation_id)
            .map_or_else(|| format!("{} {}", endpoint.method, item.path), str::to_string);
        endpoint.description = op.description.or(item.description).unwrap_or_default().to_string();

        for raw in self.merged_parameters(&context, item.parameters, op.parameters) {
            let Some(param) = self.parameter(raw, &context) else {
                continue;
            };
            // Swagger 2 carries the request body as an `in: body` parameter.
            if raw.get("in").and_then(Value::as_str) == Some("body")
                && let Some(schema) = raw.get("schema").and_then(|s| self.resolve(s))
            {
                endpoint
                    .request_examples
                    .push(render(schema.get("example").unwrap_or(schema)));
            }
            endpoint.parameters.push(param);
        }

        if let Some(body) = op.request_body
            && let Some(body) = self.resolve_or_report(body, &context)
        {
            self.body_parameters(body, &mut endpoint.parameters);
            endpoint.request_examples.extend(self.content_examples(body));
        }

        if let Some(responses) = op.responses {
            for (code, response) in responses {
                let context = format!("{}.responses.{}", context, code);
                if let Some(response) = self.resolve_or_report(response, &context) {
                    endpoint
                        .response_examples
                        .extend(self.response_examples(response));
                }
            }
        }

        endpoint
    }

    /// Path-item parameters first; an operation parameter with the same
    /// `(name, in)` replaces its path-item counterpart in place.
    fn merged_parameters(
        &mut self,
        context: &str,
        shared: &'a [Value],
        own: &'a [Value],
    ) -> Vec<&'a Value> {
        let mut merged: Vec<&'a Value> = Vec::new();
        for raw in shared.iter().chain(own) {
            let Some(param) = self.resolve_or_report(raw, context) else {
                continue;
            };
            let id = (param.get("name"), param.get("in"));
            match merged
                .iter_mut()
                .find(|existing| (existing.get("name"), existing.get("in")) == id)
            {
                Some(slot) => *slot = param,
                None => merged.push(param),
            }
        }
        merged
    }

    fn parameter(&mut self, param: &'a Value, context: &str) -> Option<Parameter> {
        let Some(name) = str_field(param, "name") else {
            self.diagnostics
                .push(Diagnostic::at(context, "parameter without a name"));
            return None;
        };
        let location = param
            .get("in")
            .and_then(Value::as_str)
            .and_then(ParamLocation::from_openapi)
            .unwrap_or(ParamLocation::Query);

        // Swagger 2 puts type information directly on non-body parameters.
        let schema = param
            .get("schema")
            .and_then(|s| self.resolve(s))
            .unwrap_or(param);

        let mut parameter = Parameter::new(name, location);
        parameter.ty = schema_type(schema);
        parameter.required = param
            .get("required")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        parameter.description = str_field(param, "description").unwrap_or_default().to_string();
        parameter.default = schema.get("default").map(scalar_text);
        parameter.example = param
            .get("example")
            .or_else(|| schema.get("example"))
            .map(scalar_text);
        Some(parameter)
    }

    /// Properties of the first request-body schema become `body` parameters.
    fn body_parameters(&self, body: &'a Value, params: &mut Vec<Parameter>) {
        let Some(schema) = body
            .get("content")
            .and_then(Value::as_object)
            .and_then(|content| content.values().find_map(|media| media.get("schema")))
            .and_then(|schema| self.resolve(schema))
        else {
            return;
        };
        let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
            return;
        };
        let required = array_field(schema, "required");

        for (name, property) in properties {
            let property = self.resolve(property).unwrap_or(property);
            let mut param = Parameter::new(name.as_str(), ParamLocation::Body);
            param.ty = schema_type(property);
            param.required = required.iter().any(|r| r.as_str() == Some(name));
            param.description = str_field(property, "description").unwrap_or_default().to_string();
            param.default = property.get("default").map(scalar_text);
            param.example = property.get("example").map(scalar_text);

            match params
                .iter_mut()
                .find(|p| p.name == param.name && p.location == ParamLocation::Body)
            {
                Some(existing) => *existing = param,
                None => params.push(param),
            }
        }
    }

    /// One example per media type under `content`, in document order.
    fn content_examples(&self, node: &'a Value) -> Vec<String> {
        node.get("content")
            .and_then(Value::as_object)
            .map(|content| {
                content
                    .values()
                    .filter_map(|media| self.media_example(media))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn media_example(&self, media: &'a Value) -> Option<String> {
        if let Some(example) = media.get("example") {
            return Some(render(example));
        }
        if let Some(first) = media
            .get("examples")
            .and_then(Value::as_object)
            .and_then(|examples| examples.values().next())
        {
            let first = self.resolve(first)?;
            return Some(render(first.get("value").unwrap_or(first)));
        }
        let schema = self.resolve(media.get("schema")?)?;
        Some(render(schema.get("example").unwrap_or(schema)))
    }

    fn response_examples(&self, response: &'a Value) -> Vec<String> {
        let mut examples = self.content_examples(response);

        // Swagger 2: `examples` keyed by mime type, or a bare `schema`.
        if let Some(by_mime) = response.get("examples").and_then(Value::as_object) {
            examples.extend(by_mime.values().map(render));
        } else if response.get("content").is_none()
            && let Some(schema) = response.get("schema").and_then(|s| self.resolve(s))
        {
            examples.push(render(schema.get("example").unwrap_or(schema)));
        }
        examples
    }
}

fn schema_type(schema: &Value) -> String {
    match schema.get("type") {
        Some(Value::String(ty)) => ty.clone(),
        // OpenAPI 3.1 allows `type: [string, "null"]`.
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|ty| *ty != "null")
            .unwrap_or("string")
            .to_string(),
        _ => "string".to_string(),
    }
}

/// Parses an OpenAPI / Swagger document (JSON or YAML) into a catalogue.
pub fn parse(api_name: &str, content: &str) -> Result<ParseOutcome, ParseError> {
    let root = decode(content)?;
    let mut document = Document {
        root: &root,
        api_name,
        diagnostics: Vec::new(),
    };

    let mut endpoints = Vec::new();
    for item in document.path_items() {
        for op in &item.operations {
            endpoints.push(document.endpoint(&item, op));
        }
    }

    let catalogue = Catalogue::new(api_name, document.base_url(), endpoints);
    tracing::debug!(
        "Parsed OpenAPI '{}': {} endpoints, {} diagnostics",
        api_name,
        catalogue.len(),
        document.diagnostics.len()
    );

    Ok(ParseOutcome {
        catalogue,
        diagnostics: document.diagnostics,
    })
}
