//! nlohmann/json glue via ADL `from_json` / `to_json`, so `json.get<T>()`
//! works on the generated structs too.
use crate::codegen::cpp::{element_ty, string_literal, Context};
use crate::codegen::{Backend, CodeGenerator, Emitter};
use crate::ir::{Struct, Ty};

pub struct Nlohmann;

impl CodeGenerator for Nlohmann {
    fn backend(&self) -> Backend {
        Backend::Nlohmann
    }

    fn includes(&self) -> &'static [&'static str] {
        &["<nlohmann/json.hpp>"]
    }

    fn emit_struct(&self, s: &Struct, cx: &Context<'_>, out: &mut Emitter) {
        out.open(format!("inline void from_json(const nlohmann::json& json, {}& out) {{", s.name));
        out.line("if (!json.is_object()) return;");
        for (field, member) in cx.members(s) {
            out.open("{");
            let find = format!("json.find({})", string_literal(&field.source_key));
            if cx.is_legacy() {
                out.line(format!("nlohmann::json::const_iterator it = {find};"));
            } else {
                out.line(format!("const auto it = {find};"));
            }
            out.open("if (it != json.end() && !it->is_null()) {");
            if cx.is_wrapped(field) {
                let target = cx.engage(member, &check(&field.ty, "(*it)"), out);
                read(cx, &field.ty, "(*it)", &target, 0, out);
                out.close("}");
            } else {
                decode(cx, &field.ty, "(*it)", &format!("out.{member}"), 0, out);
            }
            out.close("}");
            out.close("}");
        }
        out.close("}");
        out.blank();

        out.open(format!("inline void to_json(nlohmann::json& json, const {}& in) {{", s.name));
        out.line("json = nlohmann::json::object();");
        for (field, member) in cx.members(s) {
            let source = format!("in.{member}");
            let slot = format!("json[{}]", string_literal(&field.source_key));
            if cx.is_wrapped(field) {
                out.open(format!("if ({}) {{", cx.presence_test(&source)));
                encode(cx, &field.ty, &cx.deref(&source), &slot, 0, out);
                out.reopen("} else {");
                out.line(format!("{slot} = nlohmann::json();"));
                out.close("}");
            } else {
                encode(cx, &field.ty, &source, &slot, 0, out);
            }
        }
        out.close("}");
        out.blank();
    }
}

fn check(ty: &Ty, src: &str) -> String {
    match ty {
        Ty::Bool => format!("{src}.is_boolean()"),
        Ty::Integer => format!("{src}.is_number_integer()"),
        Ty::Float => format!("{src}.is_number()"),
        Ty::Null | Ty::String => format!("{src}.is_string()"),
        Ty::Object { .. } => format!("{src}.is_object()"),
        Ty::Array { .. } => format!("{src}.is_array()"),
    }
}

fn decode(cx: &Context<'_>, ty: &Ty, src: &str, dst: &str, depth: usize, out: &mut Emitter) {
    match ty {
        Ty::Object { .. } => read(cx, ty, src, dst, depth, out),
        Ty::Array { .. } => {
            out.open(format!("if ({}) {{", check(ty, src)));
            read(cx, ty, src, dst, depth, out);
            out.close("}");
        }
        _ => out.line(format!("if ({}) {dst} = {};", check(ty, src), scalar(ty, src))),
    }
}

fn scalar(ty: &Ty, src: &str) -> String {
    match ty {
        Ty::Bool => format!("{src}.get<bool>()"),
        Ty::Integer => format!("{src}.get<int64_t>()"),
        Ty::Float => format!("{src}.get<double>()"),
        _ => format!("{src}.get<std::string>()"),
    }
}

fn read(cx: &Context<'_>, ty: &Ty, src: &str, dst: &str, depth: usize, out: &mut Emitter) {
    match ty {
        Ty::Object { .. } => out.line(format!("from_json({src}, {dst});")),
        Ty::Array { element } => {
            let element = element_ty(element.as_deref());
            let element_type = cx.value_type(element);
            let item = format!("item{depth}");

            out.line(format!("{dst}.clear();"));
            let el = if cx.is_legacy() {
                out.open(format!(
                    "for (std::size_t i{depth} = 0; i{depth} < {src}.size(); ++i{depth}) {{"
                ));
                format!("{src}[i{depth}]")
            } else {
                out.open(format!("for (const auto& e{depth} : {src}) {{"));
                format!("e{depth}")
            };
            out.line(format!("{element_type} {item} = {element_type}();"));
            decode(cx, element, &el, &item, depth + 1, out);
            out.line(format!("{dst}.push_back({item});"));
            out.close("}");
        }
        _ => out.line(format!("{dst} = {};", scalar(ty, src))),
    }
}

fn encode(cx: &Context<'_>, ty: &Ty, src: &str, dst: &str, depth: usize, out: &mut Emitter) {
    match ty {
        Ty::Bool | Ty::Integer | Ty::Float | Ty::Null | Ty::String => {
            out.line(format!("{dst} = {src};"))
        }
        Ty::Object { .. } => out.line(format!("to_json({dst}, {src});")),
        Ty::Array { element } => {
            let element = element_ty(element.as_deref());
            let value = format!("v{depth}");
            out.line(format!("{dst} = nlohmann::json::array();"));
            let el = cx.open_vector_loop(src, depth, out);
            out.line(format!("nlohmann::json {value};"));
            encode(cx, element, &el, &value, depth + 1, out);
            out.line(format!("{dst}.push_back({value});"));
            out.close("}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{Config, Dialect, NullableRepr};
    use crate::inference::{infer, ROOT_NAME};
    use crate::order::order;
    use serde_json::json;

    fn render(doc: serde_json::Value, config: &Config) -> String {
        let schema = order(infer(&doc, ROOT_NAME));
        Nlohmann.generate(&schema, config).unwrap()[1].contents.clone()
    }

    #[test]
    fn adl_functions_per_struct() {
        let src = render(json!({"user": {"name": "n"}, "tags": ["a"]}), &Config::default());
        assert!(src.contains("#include <nlohmann/json.hpp>"));
        assert!(src.contains("inline void from_json(const nlohmann::json& json, User& out) {"));
        assert!(src.contains("inline void to_json(nlohmann::json& json, const Root& in) {"));
        assert!(src.contains("from_json((*it), out.user);"));
        assert!(src.contains("to_json(json[\"user\"], in.user);"));
        assert!(src.contains("for (const auto& e0 : (*it)) {"));
        assert!(src.contains("if (e0.is_string()) item0 = e0.get<std::string>();"));
    }

    #[test]
    fn legacy_wrapped_nulls_write_null() {
        let config = Config {
            target_dialect: Some(Dialect::Legacy),
            nullable: NullableRepr::Wrapper,
            ..Config::default()
        };
        let src = render(json!({"nick": null}), &config);
        assert!(src.contains("nlohmann::json::const_iterator it = json.find(\"nick\");"));
        assert!(src.contains("if ((*it).is_string()) {"));
        assert!(src.contains("out.nick.has_value = true;"));
        assert!(src.contains("out.nick.value = (*it).get<std::string>();"));
        assert!(src.contains("if (in.nick.has_value) {"));
        assert!(src.contains("json[\"nick\"] = in.nick.value;"));
        assert!(src.contains("json[\"nick\"] = nlohmann::json();"));
        assert!(!src.contains("auto"));
    }
}
