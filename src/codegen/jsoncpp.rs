//! JsonCpp glue: `fromJson(const Json::Value&, T&)` and
//! `toJson(const T&, Json::Value&)`.
use crate::codegen::cpp::{element_ty, string_literal, Context};
use crate::codegen::{Backend, CodeGenerator, Emitter};
use crate::ir::{Struct, Ty};

pub struct JsonCpp;

impl CodeGenerator for JsonCpp {
    fn backend(&self) -> Backend {
        Backend::Jsoncpp
    }

    fn includes(&self) -> &'static [&'static str] {
        &["<json/json.h>"]
    }

    fn emit_struct(&self, s: &Struct, cx: &Context<'_>, out: &mut Emitter) {
        out.open(format!("inline bool fromJson(const Json::Value& json, {}& out) {{", s.name));
        out.line("if (!json.isObject()) return false;");
        for (field, member) in cx.members(s) {
            let key = string_literal(&field.source_key);
            let src = format!("json[{key}]");
            out.open(format!("if (json.isMember({key}) && !{src}.isNull()) {{"));
            if cx.is_wrapped(field) {
                let target = cx.engage(member, &check(&field.ty, &src), out);
                read(cx, &field.ty, &src, &target, 0, out);
                out.close("}");
            } else {
                decode(cx, &field.ty, &src, &format!("out.{member}"), 0, out);
            }
            out.close("}");
        }
        out.line("return true;");
        out.close("}");
        out.blank();

        out.open(format!("inline void toJson(const {}& in, Json::Value& json) {{", s.name));
        out.line("json = Json::Value(Json::objectValue);");
        for (field, member) in cx.members(s) {
            let source = format!("in.{member}");
            let slot = format!("json[{}]", string_literal(&field.source_key));
            if cx.is_wrapped(field) {
                out.open(format!("if ({}) {{", cx.presence_test(&source)));
                encode(cx, &field.ty, &cx.deref(&source), &slot, 0, out);
                out.reopen("} else {");
                out.line(format!("{slot} = Json::Value(Json::nullValue);"));
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
        Ty::Bool => format!("{src}.isBool()"),
        Ty::Integer => format!("{src}.isInt64()"),
        Ty::Float => format!("{src}.isNumeric()"),
        Ty::Null | Ty::String => format!("{src}.isString()"),
        Ty::Object { .. } => format!("{src}.isObject()"),
        Ty::Array { .. } => format!("{src}.isArray()"),
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
        Ty::Bool => format!("{src}.asBool()"),
        Ty::Integer => format!("{src}.asInt64()"),
        Ty::Float => format!("{src}.asDouble()"),
        _ => format!("{src}.asString()"),
    }
}

fn read(cx: &Context<'_>, ty: &Ty, src: &str, dst: &str, depth: usize, out: &mut Emitter) {
    match ty {
        Ty::Object { .. } => out.line(format!("fromJson({src}, {dst});")),
        Ty::Array { element } => {
            let element = element_ty(element.as_deref());
            let element_type = cx.value_type(element);
            let item = format!("item{depth}");

            out.line(format!("{dst}.clear();"));
            let el = if cx.is_legacy() {
                out.open(format!(
                    "for (Json::ArrayIndex i{depth} = 0; i{depth} < {src}.size(); ++i{depth}) {{"
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
        Ty::Bool | Ty::Float | Ty::Null | Ty::String => {
            out.line(format!("{dst} = Json::Value({src});"))
        }
        Ty::Integer => out.line(format!("{dst} = Json::Value(static_cast<Json::Int64>({src}));")),
        Ty::Object { .. } => out.line(format!("toJson({src}, {dst});")),
        Ty::Array { element } => {
            let element = element_ty(element.as_deref());
            let value = format!("v{depth}");
            out.line(format!("{dst} = Json::Value(Json::arrayValue);"));
            let el = cx.open_vector_loop(src, depth, out);
            out.line(format!("Json::Value {value};"));
            encode(cx, element, &el, &value, depth + 1, out);
            out.line(format!("{dst}.append({value});"));
            out.close("}");
        }
    }
}
