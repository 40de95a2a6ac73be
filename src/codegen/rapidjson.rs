//! rapidjson glue: `fromJson(const rapidjson::Value&, T&)` and
//! `toJson(const T&, rapidjson::Value&, Allocator&)`.
use crate::codegen::cpp::{element_ty, string_literal, Context};
use crate::codegen::{Backend, CodeGenerator, Emitter};
use crate::ir::{Struct, Ty};

pub struct RapidJson;

impl CodeGenerator for RapidJson {
    fn backend(&self) -> Backend {
        Backend::Rapidjson
    }

    fn includes(&self) -> &'static [&'static str] {
        &["\"rapidjson/document.h\""]
    }

    fn emit_struct(&self, s: &Struct, cx: &Context<'_>, out: &mut Emitter) {
        out.open(format!("inline bool fromJson(const rapidjson::Value& json, {}& out) {{", s.name));
        out.line("if (!json.IsObject()) return false;");
        if !s.fields.is_empty() {
            out.line("rapidjson::Value::ConstMemberIterator it;");
        }
        for (field, member) in cx.members(s) {
            out.line(format!("it = json.FindMember({});", string_literal(&field.source_key)));
            out.open("if (it != json.MemberEnd() && !it->value.IsNull()) {");
            if cx.is_wrapped(field) {
                let target = cx.engage(member, &check(&field.ty, "it->value"), out);
                read(cx, &field.ty, "it->value", &target, 0, out);
                out.close("}");
            } else {
                decode(cx, &field.ty, "it->value", &format!("out.{member}"), 0, out);
            }
            out.close("}");
        }
        out.line("return true;");
        out.close("}");
        out.blank();

        out.open(format!(
            "inline void toJson(const {}& in, rapidjson::Value& json, rapidjson::Document::AllocatorType& allocator) {{",
            s.name
        ));
        out.line("json.SetObject();");
        for (field, member) in cx.members(s) {
            let source = format!("in.{member}");
            out.open("{");
            out.line("rapidjson::Value value;");
            if cx.is_wrapped(field) {
                out.open(format!("if ({}) {{", cx.presence_test(&source)));
                encode(cx, &field.ty, &cx.deref(&source), "value", 0, out);
                out.close("}");
            } else {
                encode(cx, &field.ty, &source, "value", 0, out);
            }
            out.line(format!(
                "json.AddMember(rapidjson::Value({}, allocator).Move(), value, allocator);",
                string_literal(&field.source_key)
            ));
            out.close("}");
        }
        out.close("}");
        out.blank();
    }
}

fn check(ty: &Ty, src: &str) -> String {
    match ty {
        Ty::Bool => format!("{src}.IsBool()"),
        Ty::Integer => format!("{src}.IsInt64()"),
        Ty::Float => format!("{src}.IsNumber()"),
        Ty::Null | Ty::String => format!("{src}.IsString()"),
        Ty::Object { .. } => format!("{src}.IsObject()"),
        Ty::Array { .. } => format!("{src}.IsArray()"),
    }
}

/// Checked read; a value of the wrong type leaves `dst` untouched.
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
        Ty::Bool => format!("{src}.GetBool()"),
        Ty::Integer => format!("{src}.GetInt64()"),
        Ty::Float => format!("{src}.GetDouble()"),
        _ => format!("std::string({src}.GetString(), {src}.GetStringLength())"),
    }
}

/// Read assuming `check(ty, src)` holds.
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
                    "for (rapidjson::SizeType i{depth} = 0; i{depth} < {src}.Size(); ++i{depth}) {{"
                ));
                format!("{src}[i{depth}]")
            } else {
                out.open(format!("for (const auto& e{depth} : {src}.GetArray()) {{"));
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
        Ty::Bool => out.line(format!("{dst}.SetBool({src});")),
        Ty::Integer => out.line(format!("{dst}.SetInt64({src});")),
        Ty::Float => out.line(format!("{dst}.SetDouble({src});")),
        Ty::Null | Ty::String => out.line(format!(
            "{dst}.SetString({src}.c_str(), static_cast<rapidjson::SizeType>({src}.size()), allocator);"
        )),
        Ty::Object { .. } => out.line(format!("toJson({src}, {dst}, allocator);")),
        Ty::Array { element } => {
            let element = element_ty(element.as_deref());
            let value = format!("v{depth}");
            out.line(format!("{dst}.SetArray();"));
            let el = cx.open_vector_loop(src, depth, out);
            out.line(format!("rapidjson::Value {value};"));
            encode(cx, element, &el, &value, depth + 1, out);
            out.line(format!("{dst}.PushBack({value}, allocator);"));
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
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn render(doc: serde_json::Value, config: &Config) -> String {
        let schema = order(infer(&doc, ROOT_NAME));
        let files = RapidJson.generate(&schema, config).unwrap();
        files[1].contents.clone()
    }

    #[test]
    fn modern_scalar_struct() {
        let src = render(json!({"name": "Alice", "age": 30}), &Config::default());
        let expected = r#"// Generated by json2cpp. Do not edit.
#ifndef JSON2CPP_RAPIDJSON_SERIALIZATION_H
#define JSON2CPP_RAPIDJSON_SERIALIZATION_H

#include "rapidjson/document.h"
#include "types.h"

inline bool fromJson(const rapidjson::Value& json, Root& out) {
    if (!json.IsObject()) return false;
    rapidjson::Value::ConstMemberIterator it;
    it = json.FindMember("name");
    if (it != json.MemberEnd() && !it->value.IsNull()) {
        if (it->value.IsString()) out.name = std::string(it->value.GetString(), it->value.GetStringLength());
    }
    it = json.FindMember("age");
    if (it != json.MemberEnd() && !it->value.IsNull()) {
        if (it->value.IsInt64()) out.age = it->value.GetInt64();
    }
    return true;
}

inline void toJson(const Root& in, rapidjson::Value& json, rapidjson::Document::AllocatorType& allocator) {
    json.SetObject();
    {
        rapidjson::Value value;
        value.SetString(in.name.c_str(), static_cast<rapidjson::SizeType>(in.name.size()), allocator);
        json.AddMember(rapidjson::Value("name", allocator).Move(), value, allocator);
    }
    {
        rapidjson::Value value;
        value.SetInt64(in.age);
        json.AddMember(rapidjson::Value("age", allocator).Move(), value, allocator);
    }
}

#endif  // JSON2CPP_RAPIDJSON_SERIALIZATION_H
"#;
        assert_eq!(src, expected);
    }

    #[test]
    fn legacy_arrays_use_index_loops() {
        let config = Config { target_dialect: Some(Dialect::Legacy), ..Config::default() };
        let src = render(json!({"items": [{"id": 1}]}), &config);
        assert!(src.contains("for (rapidjson::SizeType i0 = 0; i0 < it->value.Size(); ++i0) {"));
        assert!(src.contains("ItemsItem item0 = ItemsItem();"));
        assert!(src.contains("fromJson(it->value[i0], item0);"));
        assert!(src.contains("for (std::size_t i0 = 0; i0 < in.items.size(); ++i0) {"));
        assert!(src.contains("toJson(in.items[i0], v0, allocator);"));
        assert!(!src.contains("auto"));
    }

    #[test]
    fn modern_wrapped_optional() {
        let config = Config { nullable: NullableRepr::Wrapper, ..Config::default() };
        let src = render(json!({"nick": null}), &config);
        assert!(src.contains("(*out.nick) = std::string(it->value.GetString(), it->value.GetStringLength());"));
        // engaged only after the type check
        let checked = src.find("if (it->value.IsString()) {").unwrap();
        let engaged = src.find("out.nick.emplace();").unwrap();
        assert!(checked < engaged);
        assert!(src.contains("if (in.nick.has_value()) {"));
        assert!(src.contains("value.SetString((*in.nick).c_str()"));
    }
}
