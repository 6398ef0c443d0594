//! API Blueprint parsing.
//!
//! Blueprint documents are hand-written markdown conventions rather than a
//! formal grammar, so this is a line classifier with a small amount of state:
//! the current group, resource and action, plus whichever block (parameter
//! list, payload, fenced code) the scanner is inside. Lines that match nothing
//! become description prose. The scanner never fails; blocks it cannot place are
//! reported as diagnostics.

use super::{Diagnostic, ParseOutcome};
use crate::catalogue::Catalogue;
use crate::model::{Endpoint, ParamLocation, Parameter};
use regex::Regex;
use std::sync::LazyLock;

const HTTP_VERBS: &[&str] = &[
    "GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS", "TRACE", "CONNECT",
];

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.*?)\s*#*\s*$").expect("valid heading regex"));

/// `Name [target]`, where target is a verb, a URI template, or both.
static BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)\s*\[([^\]]+)\]\s*$").expect("valid bracket regex"));

static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([ \t]*)[+*-]\s+(.*?)\s*$").expect("valid list regex"));

/// `name: example (type info) - description`, every part after the name optional.
///
/// A backtick-quoted example is taken verbatim, so identifiers such as
/// `in.c-main.users` keep their hyphens. The description dash needs leading
/// whitespace.
static PARAMETER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^`?(?P<name>[A-Za-z0-9_.\[\]-]+)`?(?:\s*:\s*(?:`(?P<quoted>[^`]*)`|(?P<example>[^`(\s][^(]*?)))?\s*(?:\((?P<info>[^)]*)\))?(?:\s+-\s*(?P<desc>.*))?\s*$",
    )
    .expect("valid parameter regex")
});

static HOST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^HOST:\s*(\S+)").expect("valid host regex"));

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^}]*)\}").expect("valid placeholder regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExampleKind {
    Request,
    Response,
}

impl ExampleKind {
    const fn label(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Response => "response",
        }
    }
}

/// What a heading line declares.
#[derive(Debug, PartialEq, Eq)]
enum Heading<'a> {
    Group(&'a str),
    Resource {
        name: &'a str,
        path: &'a str,
    },
    Action {
        name: &'a str,
        verb: &'a str,
        path: Option<&'a str>,
    },
    Other,
}

fn is_uri_template(text: &str) -> bool {
    text.starts_with('/') || text.starts_with('{') || text.contains("://")
}

/// Classifies a verb and/or URI template, e.g. `POST`, `/tables`, `GET /tables`.
fn classify_target<'a>(name: &'a str, target: &'a str) -> Option<Heading<'a>> {
    let (first, rest) = match target.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim()),
        None => (target, ""),
    };

    if HTTP_VERBS.contains(&first) && (rest.is_empty() || is_uri_template(rest)) {
        return Some(Heading::Action {
            name,
            verb: first,
            path: (!rest.is_empty()).then_some(rest),
        });
    }

    if is_uri_template(first) {
        let name = if name.is_empty() { rest } else { name };
        return Some(Heading::Resource { name, path: first });
    }

    None
}

fn classify_heading(level: usize, text: &str) -> Heading<'_> {
    let target = match BRACKETED.captures(text) {
        Some(caps) => {
            let name = caps.get(1).map_or("", |m| m.as_str());
            let inner = caps.get(2).map_or("", |m| m.as_str()).trim();
            classify_target(name, inner)
        }
        None => classify_target("", text),
    };

    match target {
        Some(heading) => heading,
        None if level == 1 => Heading::Group(text.strip_prefix("Group ").unwrap_or(text).trim()),
        None => Heading::Other,
    }
}

/// List-item keywords that open a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Parameters,
    Attributes,
    Request,
    Response,
    Model,
}

fn keyword(item: &str) -> Option<Keyword> {
    let word = item
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or_default();
    match word {
        "Parameters" => Some(Keyword::Parameters),
        "Attributes" => Some(Keyword::Attributes),
        "Request" => Some(Keyword::Request),
        "Response" => Some(Keyword::Response),
        "Model" => Some(Keyword::Model),
        _ => None,
    }
}

/// Sub-sections of a request or response payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Asset {
    Body,
    Skipped,
}

fn asset_keyword(item: &str) -> Option<Asset> {
    match item.split_whitespace().next().unwrap_or_default() {
        "Body" => Some(Asset::Body),
        "Headers" | "Schema" | "Attributes" => Some(Asset::Skipped),
        _ => None,
    }
}

struct Resource {
    name: String,
    path: String,
    parameters: Vec<Parameter>,
}

struct ParamBlock {
    indent: usize,
    item_indent: Option<usize>,
    body: bool,
}

struct Payload {
    /// `None` for resource models, which are skipped.
    kind: Option<ExampleKind>,
    indent: usize,
    line: usize,
    asset: Asset,
    lines: Vec<String>,
}

struct Fence {
    marker: String,
    kind: Option<ExampleKind>,
    line: usize,
    lines: Vec<String>,
    /// Payload the fence is nested in, resumed when the fence closes.
    outer: Option<Payload>,
    report_untagged: bool,
}

impl Fence {
    fn closes(&self, line: &str) -> bool {
        let trimmed = line.trim();
        let marker_char = self.marker.chars().next().unwrap_or('`');
        trimmed.len() >= self.marker.len() && trimmed.chars().all(|c| c == marker_char)
    }
}

enum Block {
    Prose,
    Parameters(ParamBlock),
    Payload(Payload),
    Fence(Fence),
}

struct Scanner<'a> {
    api_name: &'a str,
    base_url: Option<String>,
    group: String,
    heading: String,
    resource: Option<Resource>,
    action: Option<Endpoint>,
    block: Block,
    endpoints: Vec<Endpoint>,
    diagnostics: Vec<Diagnostic>,
}

/// Parses an API Blueprint document into a catalogue for `api_name`.
pub fn parse(api_name: &str, content: &str) -> ParseOutcome {
    let mut scanner = Scanner::new(api_name);
    for (idx, line) in content.lines().enumerate() {
        scanner.line(idx + 1, line);
    }
    scanner.finish()
}

impl<'a> Scanner<'a> {
    fn new(api_name: &'a str) -> Self {
        Self {
            api_name,
            base_url: None,
            group: String::new(),
            heading: String::new(),
            resource: None,
            action: None,
            block: Block::Prose,
            endpoints: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn line(&mut self, number: usize, line: &str) {
        if let Block::Fence(fence) = &mut self.block {
            if fence.closes(line) {
                self.close_fence();
            } else {
                fence.lines.push(line.to_string());
            }
            return;
        }

        if let Some(marker) = fence_marker(line) {
            self.open_fence(number, line, marker);
            return;
        }

        let consumed = match self.block {
            Block::Parameters(_) => self.parameter_line(number, line),
            Block::Payload(_) => self.payload_line(line),
            Block::Prose | Block::Fence(_) => false,
        };
        if !consumed {
            self.top_level_line(number, line);
        }
    }

    fn top_level_line(&mut self, number: usize, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }

        if let Some(caps) = HEADING.captures(line) {
            let level = caps[1].len();
            let text = caps.get(2).map_or("", |m| m.as_str());
            self.heading_line(number, level, text);
            return;
        }

        if self.action.is_none()
            && let Some(caps) = HOST.captures(line)
        {
            self.base_url = Some(caps[1].to_string());
            return;
        }

        if let Some(caps) = LIST_ITEM.captures(line) {
            let indent = indent_of(line);
            let item = caps.get(2).map_or("", |m| m.as_str());
            match keyword(item) {
                Some(Keyword::Parameters) => self.open_parameters(number, indent, false),
                Some(Keyword::Attributes) => self.open_parameters(number, indent, true),
                Some(Keyword::Request) => self.open_payload(number, indent, Some(ExampleKind::Request)),
                Some(Keyword::Response) => {
                    self.open_payload(number, indent, Some(ExampleKind::Response));
                }
                Some(Keyword::Model) => self.open_payload(number, indent, None),
                None => self.prose(item),
            }
            return;
        }

        self.prose(trimmed);
    }

    fn heading_line(&mut self, number: usize, level: usize, text: &str) {
        self.heading = text.to_string();

        match classify_heading(level, text) {
            Heading::Group(name) => {
                self.close_action();
                self.resource = None;
                self.group = name.to_string();
            }
            Heading::Resource { name, path } => {
                self.close_action();
                self.resource = Some(Resource {
                    name: name.to_string(),
                    path: path.to_string(),
                    parameters: Vec::new(),
                });
            }
            Heading::Action { name, verb, path } => {
                self.close_action();
                // `## Name [VERB /path]` declares the resource and its only action at once.
                if level <= 2
                    && let Some(path) = path
                {
                    self.resource = Some(Resource {
                        name: name.to_string(),
                        path: path.to_string(),
                        parameters: Vec::new(),
                    });
                }
                self.open_action(number, name, verb, path);
            }
            Heading::Other => {
                self.close_action();
                if level <= 2 {
                    self.resource = None;
                }
            }
        }
    }

    fn open_action(&mut self, number: usize, name: &str, verb: &str, path: Option<&str>) {
        let Some(path) = path
            .map(str::to_string)
            .or_else(|| self.resource.as_ref().map(|r| r.path.clone()))
        else {
            self.diagnostics.push(Diagnostic::at_line(
                number,
                &self.heading,
                format!("{} action has no URI template and no enclosing resource", verb),
            ));
            return;
        };

        let mut endpoint = Endpoint::new(self.api_name, verb, path, self.group.clone());
        endpoint.summary = if !name.is_empty() {
            name.to_string()
        } else if let Some(resource) = self.resource.as_ref().filter(|r| !r.name.is_empty()) {
            resource.name.clone()
        } else {
            format!("{} {}", endpoint.method, endpoint.path)
        };
        if let Some(resource) = &self.resource {
            endpoint.parameters = resource.parameters.clone();
        }
        self.action = Some(endpoint);
    }

    fn close_action(&mut self) {
        self.end_block();
        if let Some(endpoint) = self.action.take() {
            self.endpoints.push(endpoint);
        }
    }

    fn prose(&mut self, text: &str) {
        if let Some(action) = &mut self.action {
            append_text(&mut action.description, text);
        }
    }

    /// Parameters land on the open action, or on the resource when declared
    /// before any action so that every action under it inherits them.
    fn current_parameters(&mut self) -> Option<&mut Vec<Parameter>> {
        match (&mut self.action, &mut self.resource) {
            (Some(action), _) => Some(&mut action.parameters),
            (None, Some(resource)) => Some(&mut resource.parameters),
            (None, None) => None,
        }
    }

    fn current_path(&self) -> &str {
        match (&self.action, &self.resource) {
            (Some(action), _) => &action.path,
            (None, Some(resource)) => &resource.path,
            (None, None) => "",
        }
    }

    fn open_parameters(&mut self, number: usize, indent: usize, body: bool) {
        self.end_block();
        if self.current_parameters().is_none() {
            self.diagnostics.push(Diagnostic::at_line(
                number,
                &self.heading,
                "parameter list outside of any resource or action",
            ));
        }
        self.block = Block::Parameters(ParamBlock {
            indent,
            item_indent: None,
            body,
        });
    }

    fn parameter_line(&mut self, number: usize, line: &str) -> bool {
        let Block::Parameters(block) = &mut self.block else {
            return false;
        };
        if line.trim().is_empty() {
            return true;
        }

        let indent = indent_of(line);
        if indent <= block.indent {
            self.end_block();
            return false;
        }

        let body = block.body;
        if let Some(caps) = LIST_ITEM.captures(line) {
            let item = caps.get(2).map_or("", |m| m.as_str());
            let item_indent = *block.item_indent.get_or_insert(indent);
            if indent > item_indent {
                self.nested_parameter_item(item);
            } else {
                self.declare_parameter(number, item, body);
            }
        } else if let Some(param) = self.current_parameters().and_then(|params| params.last_mut()) {
            append_text(&mut param.description, line.trim());
        }
        true
    }

    fn declare_parameter(&mut self, number: usize, item: &str, body: bool) {
        // The orphaned list itself was already reported when it opened.
        if self.current_parameters().is_none() {
            return;
        }
        let Some(caps) = PARAMETER.captures(item) else {
            self.diagnostics.push(Diagnostic::at_line(
                number,
                &self.heading,
                format!("unrecognized parameter declaration '{}'", item),
            ));
            return;
        };

        let name = &caps["name"];
        let mut param = Parameter::new(name, ParamLocation::Query);
        let explicit = caps
            .name("info")
            .and_then(|info| apply_type_info(&mut param, info.as_str()));
        param.location = explicit.unwrap_or_else(|| {
            if body {
                ParamLocation::Body
            } else {
                placeholder_location(name, self.current_path())
            }
        });
        param.example = caps
            .name("quoted")
            .or_else(|| caps.name("example"))
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        param.description = caps
            .name("desc")
            .map_or_else(String::new, |m| m.as_str().trim().to_string());

        if let Some(params) = self.current_parameters() {
            match params.iter_mut().find(|p| p.name == param.name) {
                Some(existing) => *existing = param,
                None => params.push(param),
            }
        }
    }

    /// Nested items under a parameter: defaults and samples are kept, member
    /// lists are dropped.
    fn nested_parameter_item(&mut self, item: &str) {
        let Some(param) = self.current_parameters().and_then(|params| params.last_mut()) else {
            return;
        };
        if let Some(value) = item.strip_prefix("Default:") {
            param.default = Some(value.trim().trim_matches('`').to_string());
        } else if let Some(value) = item.strip_prefix("Sample:") {
            param.example = Some(value.trim().trim_matches('`').to_string());
        }
    }

    fn open_payload(&mut self, number: usize, indent: usize, kind: Option<ExampleKind>) {
        self.end_block();
        self.block = Block::Payload(Payload {
            kind,
            indent,
            line: number,
            asset: Asset::Body,
            lines: Vec::new(),
        });
    }

    fn payload_line(&mut self, line: &str) -> bool {
        let Block::Payload(payload) = &mut self.block else {
            return false;
        };

        if line.trim().is_empty() {
            if payload.asset == Asset::Body {
                payload.lines.push(String::new());
            }
            return true;
        }

        if indent_of(line) <= payload.indent {
            self.end_block();
            return false;
        }

        if let Some(asset) = LIST_ITEM
            .captures(line)
            .and_then(|caps| caps.get(2).and_then(|m| asset_keyword(m.as_str())))
        {
            payload.asset = asset;
            return true;
        }

        if payload.asset == Asset::Body {
            payload.lines.push(line.to_string());
        }
        true
    }

    fn open_fence(&mut self, number: usize, line: &str, marker: String) {
        let info = line.trim_start()[marker.len()..].trim().to_ascii_lowercase();
        // A fence right after `+ Request` / `+ Response` at the same indent
        // still belongs to that payload unless its info string says otherwise.
        let mut flushed_kind = None;
        let outer = match std::mem::replace(&mut self.block, Block::Prose) {
            Block::Payload(payload) if indent_of(line) > payload.indent => Some(payload),
            Block::Payload(payload) => {
                flushed_kind = payload.kind;
                self.flush_payload(payload);
                None
            }
            Block::Prose | Block::Parameters(_) | Block::Fence(_) => None,
        };

        let kind = match &outer {
            Some(payload) => payload.kind,
            None => tagged_kind(&info).or(flushed_kind),
        };
        let report_untagged = outer.is_none() && kind.is_none() && self.action.is_some();

        self.block = Block::Fence(Fence {
            marker,
            kind,
            line: number,
            lines: Vec::new(),
            outer,
            report_untagged,
        });
    }

    fn close_fence(&mut self) {
        let Block::Fence(fence) = std::mem::replace(&mut self.block, Block::Prose) else {
            return;
        };

        let text = dedent(&fence.lines);
        match fence.kind {
            Some(kind) if !text.is_empty() => self.push_example(fence.line, kind, text),
            Some(_) => {}
            None if fence.report_untagged => self.diagnostics.push(Diagnostic::at_line(
                fence.line,
                &self.heading,
                "fenced block is not tagged as request or response; ignored",
            )),
            None => {}
        }

        if let Some(outer) = fence.outer {
            self.block = Block::Payload(outer);
        }
    }

    fn flush_payload(&mut self, payload: Payload) {
        let Some(kind) = payload.kind else {
            return;
        };
        let text = dedent(&payload.lines);
        if !text.is_empty() {
            self.push_example(payload.line, kind, text);
        }
    }

    fn push_example(&mut self, line: usize, kind: ExampleKind, text: String) {
        match (&mut self.action, kind) {
            (Some(action), ExampleKind::Request) => action.request_examples.push(text),
            (Some(action), ExampleKind::Response) => action.response_examples.push(text),
            (None, _) => self.diagnostics.push(Diagnostic::at_line(
                line,
                &self.heading,
                format!("{} example outside of any action", kind.label()),
            )),
        }
    }

    fn end_block(&mut self) {
        match std::mem::replace(&mut self.block, Block::Prose) {
            Block::Payload(payload) => self.flush_payload(payload),
            Block::Fence(fence) => {
                self.block = Block::Fence(fence);
                self.close_fence();
            }
            Block::Prose | Block::Parameters(_) => {}
        }
    }

    fn finish(mut self) -> ParseOutcome {
        if let Block::Fence(fence) = &self.block {
            self.diagnostics.push(Diagnostic::at_line(
                fence.line,
                &self.heading,
                "unterminated fenced block closed at end of document",
            ));
            self.close_fence();
        }
        self.close_action();

        let catalogue = Catalogue::new(self.api_name, self.base_url, self.endpoints);
        tracing::debug!(
            "Parsed blueprint '{}': {} endpoints, {} diagnostics",
            self.api_name,
            catalogue.len(),
            self.diagnostics.len()
        );

        ParseOutcome {
            catalogue,
            diagnostics: self.diagnostics,
        }
    }
}

/// Returns the fence marker (three or more backticks or tildes) opening `line`.
fn fence_marker(line: &str) -> Option<String> {
    let trimmed = line.trim_start();
    let marker_char = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|c| *c == marker_char).count();
    (len >= 3).then(|| marker_char.to_string().repeat(len))
}

/// Example kind from a fence info string such as ```` ```json response ````.
fn tagged_kind(info: &str) -> Option<ExampleKind> {
    let mut words = info.split(|c: char| !c.is_alphanumeric());
    words.find_map(|word| match word {
        "request" => Some(ExampleKind::Request),
        "response" => Some(ExampleKind::Response),
        _ => None,
    })
}

/// Applies `(type, required, header)` style type info and returns an explicit
/// location if one was given.
fn apply_type_info(param: &mut Parameter, info: &str) -> Option<ParamLocation> {
    let mut required = false;
    let mut optional = false;
    let mut location = None;
    let mut ty = None;

    for token in info.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match token.to_ascii_lowercase().as_str() {
            "required" => required = true,
            "optional" => optional = true,
            "path" => location = Some(ParamLocation::Path),
            "query" => location = Some(ParamLocation::Query),
            "header" => location = Some(ParamLocation::Header),
            "body" => location = Some(ParamLocation::Body),
            _ if ty.is_none() => ty = Some(token.to_string()),
            _ => {}
        }
    }

    param.required = required && !optional;
    if let Some(ty) = ty {
        param.ty = ty;
    }
    location
}

/// `path` when `name` is a simple or path-style expansion in `template`,
/// `query` otherwise (including `{?name}` form-style expansions).
fn placeholder_location(name: &str, template: &str) -> ParamLocation {
    for caps in PLACEHOLDER.captures_iter(template) {
        let expr = caps.get(1).map_or("", |m| m.as_str());
        let (is_query, vars) = match expr.chars().next() {
            Some('?' | '&') => (true, &expr[1..]),
            Some('+' | '#' | '.' | '/' | ';') => (false, &expr[1..]),
            _ => (false, expr),
        };
        let matches = vars.split(',').any(|var| {
            let var = var.trim().trim_end_matches('*');
            var.split_once(':').map_or(var, |(name, _)| name) == name
        });
        if matches {
            return if is_query {
                ParamLocation::Query
            } else {
                ParamLocation::Path
            };
        }
    }
    ParamLocation::Query
}

fn indent_of(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

fn append_text(dst: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    if !dst.is_empty() {
        dst.push(' ');
    }
    dst.push_str(text);
}

/// Strips the common leading whitespace and surrounding blank lines.
fn dedent(lines: &[String]) -> String {
    let is_blank = |line: &&String| line.trim().is_empty();
    let start = lines.iter().position(|l| !is_blank(&l)).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !is_blank(&l)).map_or(start, |i| i + 1);
    let lines = &lines[start..end];

    let indent = lines
        .iter()
        .filter(|l| !is_blank(l))
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|l| l.get(indent..).unwrap_or_else(|| l.trim_start()).trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}
