//! Service groups → one Rust module of client-bound service structs.
//!
//! Every generated method builds `path` and `query` locals and finishes with
//! exactly one call on the `ApiClient` boundary.
use std::collections::HashSet;

use crate::codegen::{Codegen, GENERATED_MARKER, GroupPosition, quoted};
use crate::config::GeneratorConfig;
use crate::ir::{Invocation, Operation, ParamLocation, ParamType, Parameter, ResponseType, Scalar, ServiceGroup};
use crate::naming::{self, Case};

const DEFAULT_MODULE_DOC: &str = "API services.";

/// Locals every method body declares; parameters must not shadow them.
const LOCALS: &[&str] = &["path", "query", "body"];

pub fn render(groups: &[ServiceGroup], config: &GeneratorConfig) -> String {
    let mut cg = Codegen::new();
    for (index, group) in groups.iter().enumerate() {
        match GroupPosition::of(index) {
            GroupPosition::Opening => prelude(&mut cg, groups, config),
            GroupPosition::Continuation => cg.blank(),
        }
        service(&mut cg, group);
    }
    cg.into_string()
}

fn prelude(cg: &mut Codegen, groups: &[ServiceGroup], config: &GeneratorConfig) {
    let operations = || groups.iter().flat_map(|g| g.operations.iter());

    cg.line(0, GENERATED_MARKER);
    cg.module_doc(config.services_module_doc.as_deref().unwrap_or(DEFAULT_MODULE_DOC));
    cg.blank();
    if operations().any(|op| op.invocation.takes_body()) {
        cg.line(0, "use serde::Serialize;");
        cg.blank();
    }
    let mut client_items = vec!["ApiClient", "ApiResult"];
    if operations().any(|op| matches!(op.response, ResponseType::List(_))) {
        client_items.push("ListResponse");
    }
    cg.line(0, format!("use {}::{{{}}};", config.client_module, client_items.join(", ")));
    cg.line(0, format!("use {}::*;", config.types_module));
    cg.blank();
}

fn service(cg: &mut Codegen, group: &ServiceGroup) {
    cg.line(0, format!("/// Operations on `{}`.", group.resource));
    cg.line(0, format!("pub struct {}<'a, C> {{", group.name));
    cg.line(1, "client: &'a C,");
    cg.line(0, "}");
    cg.blank();
    cg.line(0, format!("impl<'a, C: ApiClient> {}<'a, C> {{", group.name));
    cg.line(1, "pub fn new(client: &'a C) -> Self {");
    cg.line(2, "Self { client }");
    cg.line(1, "}");
    for op in &group.operations {
        cg.blank();
        method(cg, op);
    }
    cg.line(0, "}");
}

fn method(cg: &mut Codegen, op: &Operation) {
    let endpoint = format!("`{} {}`", op.verb.as_str(), op.path);
    match &op.description {
        Some(description) => cg.doc_comment(1, &format!("{description}\n\n{endpoint}")),
        None => cg.doc_comment(1, &endpoint),
    }

    let takes_body = op.invocation.takes_body();
    let idents = param_idents(op);
    let mut args = vec!["&self".to_string()];
    for (param, ident) in op.parameters.iter().zip(&idents) {
        args.push(format!("{ident}: {}", param_type(param)));
    }
    if takes_body {
        args.push("body: &B".to_string());
    }
    let generics = if takes_body { "<B: Serialize + ?Sized>" } else { "" };
    let response = response_type(&op.response);
    cg.line(
        1,
        format!(
            "pub fn {}{generics}({}) -> ApiResult<{response}> {{",
            method_ident(&op.method_name),
            args.join(", ")
        ),
    );
    path_local(cg, op, &idents);
    query_local(cg, op, &idents);
    cg.line(2, tail_call(op.invocation, &response));
    cg.line(1, "}");
}

fn path_local(cg: &mut Codegen, op: &Operation, idents: &[String]) {
    let substitutions: Vec<(&Parameter, &String)> = op
        .parameters
        .iter()
        .zip(idents)
        .filter(|(p, _)| p.location == ParamLocation::Path)
        .filter(|(p, _)| op.path.contains(&placeholder(p)))
        .collect();
    if substitutions.is_empty() {
        cg.line(2, format!("let path = {}.to_string();", quoted(&op.path)));
        return;
    }
    cg.line(2, format!("let path = {}", quoted(&op.path)));
    for (i, (param, ident)) in substitutions.iter().enumerate() {
        let end = if i + 1 == substitutions.len() { ";" } else { "" };
        cg.line(
            3,
            format!(
                ".replace({}, &{}){end}",
                quoted(&placeholder(param)),
                value_expr(ident, param.ty)
            ),
        );
    }
}

fn query_local(cg: &mut Codegen, op: &Operation, idents: &[String]) {
    let params: Vec<(&Parameter, &String)> = op
        .parameters
        .iter()
        .zip(idents)
        .filter(|(p, _)| p.location == ParamLocation::Query)
        .collect();
    if params.is_empty() {
        cg.line(2, "let query: Vec<(&str, String)> = Vec::new();");
        return;
    }
    cg.line(2, "let mut query: Vec<(&str, String)> = Vec::new();");
    for (param, ident) in params {
        let push = format!("query.push(({}, {}));", quoted(&param.wire_name), value_expr(ident, param.ty));
        if param.required {
            cg.line(2, push);
        } else {
            cg.line(2, format!("if let Some({ident}) = {ident} {{"));
            cg.line(3, push);
            cg.line(2, "}");
        }
    }
}

fn tail_call(invocation: Invocation, response: &str) -> String {
    match invocation {
        Invocation::Get => format!("self.client.get::<{response}>(&path, &query)"),
        Invocation::GetWithParameters => {
            format!("self.client.get_with_parameters::<{response}, B>(&path, &query, body)")
        }
        Invocation::PostWithoutBody => format!("self.client.post::<{response}>(&path, &query)"),
        Invocation::PostWithBody => {
            format!("self.client.post_with_body::<{response}, B>(&path, &query, body)")
        }
        Invocation::Delete => format!("self.client.delete::<{response}>(&path, &query)"),
    }
}

fn response_type(response: &ResponseType) -> String {
    match response {
        ResponseType::Single(name) => name.clone(),
        ResponseType::List(name) => format!("ListResponse<{name}>"),
    }
}

fn placeholder(param: &Parameter) -> String {
    format!("{{{}}}", param.wire_name)
}

fn method_ident(method_name: &str) -> String {
    let ident = naming::escape_identifier(method_name, Case::Snake).ident;
    if ident == "new" { format!("{ident}_") } else { ident }
}

/// Argument identifiers, aligned with `op.parameters`. Distinct wire names
/// can escape to the same identifier (`created`, `Created`), so later ones
/// get a numeric suffix. Locals are never shadowed.
fn param_idents(op: &Operation) -> Vec<String> {
    let mut taken: HashSet<String> = LOCALS.iter().map(|l| l.to_string()).collect();
    op.parameters
        .iter()
        .map(|param| {
            let base = if LOCALS.contains(&param.name.as_str()) {
                format!("{}_", param.name)
            } else {
                param.name.clone()
            };
            let bare = base.trim_start_matches("r#").to_string();
            let mut ident = base;
            let mut n = 2;
            while !taken.insert(ident.trim_start_matches("r#").to_string()) {
                ident = format!("{bare}{n}");
                n += 1;
            }
            ident
        })
        .collect()
}

fn param_type(param: &Parameter) -> String {
    let base = match param.ty {
        ParamType::Scalar(Scalar::String) => "&str",
        ParamType::Scalar(Scalar::Integer) => "i64",
        ParamType::Scalar(Scalar::Number) => "f64",
        ParamType::Scalar(Scalar::Boolean) => "bool",
        ParamType::List => "&[String]",
    };
    if param.required {
        base.to_string()
    } else {
        format!("Option<{base}>")
    }
}

fn value_expr(ident: &str, ty: ParamType) -> String {
    match ty {
        ParamType::List => format!("{ident}.join(\",\")"),
        ParamType::Scalar(_) => format!("{ident}.to_string()"),
    }
}
