//! C++ layer shared by all backends: member naming, type mapping, optional
//! access, and the `types.h` declarations.
use std::collections::{HashMap, HashSet};

use crate::codegen::{CodegenError, Config, Dialect, Emitter, NullableRepr, RenderedFile, StringPassing};
use crate::ident::{sanitize, Casing};
use crate::ir::{Field, Schema, Struct, Ty};

pub const TYPES_FILE: &str = "types.h";
const TYPES_GUARD: &str = "JSON2CPP_TYPES_H";

/// Element type assumed for arrays that were only ever seen empty.
static EMPTY_ELEMENT: Ty = Ty::String;

// ————————————————————————————————————————————————————————————————————————————
// CONTEXT
// ————————————————————————————————————————————————————————————————————————————

/// Validated schema + config, with member names resolved once per struct.
pub struct Context<'a> {
    pub schema: &'a Schema,
    pub config: &'a Config,
    pub dialect: Dialect,
    members: HashMap<&'a str, Vec<String>>,
    setters: HashMap<&'a str, Vec<String>>,
}

impl<'a> Context<'a> {
    pub fn new(schema: &'a Schema, config: &'a Config) -> Result<Self, CodegenError> {
        if schema.is_empty() {
            return Err(CodegenError::EmptySchema);
        }
        let dialect = config.target_dialect.ok_or(CodegenError::UndeterminedDialect)?;
        check_containment(schema)?;
        let casing = Casing::from(config.field_casing);
        let mut members = HashMap::new();
        let mut setters = HashMap::new();
        for s in schema.iter() {
            let names = member_names(s, casing);
            setters.insert(s.name.as_str(), setter_names(&names, casing));
            members.insert(s.name.as_str(), names);
        }
        Ok(Self { schema, config, dialect, members, setters })
    }

    pub fn is_legacy(&self) -> bool {
        self.dialect == Dialect::Legacy
    }

    /// Fields of `s` paired with their emitted member names.
    pub fn members<'s>(&'s self, s: &'s Struct) -> impl Iterator<Item = (&'s Field, &'s str)> {
        let names = self.members.get(s.name.as_str()).map(Vec::as_slice).unwrap_or(&[]);
        s.fields.iter().zip(names.iter().map(String::as_str))
    }

    fn setters<'s>(&'s self, s: &'s Struct) -> impl Iterator<Item = &'s str> {
        let names = self.setters.get(s.name.as_str()).map(Vec::as_slice).unwrap_or(&[]);
        names.iter().map(String::as_str)
    }

    // ---- types ----

    pub fn value_type(&self, ty: &Ty) -> String {
        match ty {
            Ty::Null | Ty::String => "std::string".to_string(),
            Ty::Bool => "bool".to_string(),
            Ty::Integer => "int64_t".to_string(),
            Ty::Float => "double".to_string(),
            Ty::Array { element } => {
                self.template("std::vector", &self.value_type(element_ty(element.as_deref())))
            }
            Ty::Object { name } => name.clone(),
        }
    }

    pub fn member_type(&self, field: &Field) -> String {
        let inner = self.value_type(&field.ty);
        if !self.is_wrapped(field) {
            inner
        } else if self.is_legacy() {
            self.template("Optional", &inner)
        } else {
            self.template("std::optional", &inner)
        }
    }

    /// C++98 needs `> >` between closing template brackets.
    fn template(&self, outer: &str, inner: &str) -> String {
        if self.is_legacy() && inner.ends_with('>') {
            format!("{outer}<{inner} >")
        } else {
            format!("{outer}<{inner}>")
        }
    }

    fn param_type(&self, ty: &Ty) -> String {
        match ty {
            Ty::Bool | Ty::Integer | Ty::Float => self.value_type(ty),
            Ty::Null | Ty::String => match self.config.string_passing {
                StringPassing::ByValue => "std::string".to_string(),
                StringPassing::ByConstRef => "const std::string&".to_string(),
            },
            Ty::Array { .. } | Ty::Object { .. } => format!("const {}&", self.value_type(ty)),
        }
    }

    // ---- optional access ----

    pub fn is_wrapped(&self, field: &Field) -> bool {
        field.optional && self.config.nullable == NullableRepr::Wrapper
    }

    fn any_wrapped(&self) -> bool {
        self.schema.iter().flat_map(|s| &s.fields).any(|f| self.is_wrapped(f))
    }

    /// Open `if (check) {` and engage wrapped member `member` of `out` inside
    /// it, so a mistyped JSON value leaves the member empty. Returns the
    /// expression to read into. Close with `out.close("}")`.
    pub fn engage(&self, member: &str, check: &str, out: &mut Emitter) -> String {
        let m = format!("out.{member}");
        out.open(format!("if ({check}) {{"));
        if self.is_legacy() {
            out.line(format!("{m}.has_value = true;"));
            format!("{m}.value")
        } else {
            out.line(format!("{m}.emplace();"));
            format!("(*{m})")
        }
    }

    pub fn presence_test(&self, member_expr: &str) -> String {
        if self.is_legacy() {
            format!("{member_expr}.has_value")
        } else {
            format!("{member_expr}.has_value()")
        }
    }

    pub fn deref(&self, member_expr: &str) -> String {
        if self.is_legacy() {
            format!("{member_expr}.value")
        } else {
            format!("(*{member_expr})")
        }
    }

    /// Open a loop over the `std::vector` expression `vec`; returns the element
    /// expression. Close with `out.close("}")`.
    pub fn open_vector_loop(&self, vec: &str, depth: usize, out: &mut Emitter) -> String {
        if self.is_legacy() {
            out.open(format!("for (std::size_t i{depth} = 0; i{depth} < {vec}.size(); ++i{depth}) {{"));
            format!("{vec}[i{depth}]")
        } else {
            out.open(format!("for (const auto& e{depth} : {vec}) {{"));
            format!("e{depth}")
        }
    }
}

/// Every struct must be complete before another struct holds it. The one
/// exception is a struct holding `std::vector`s of itself, which C++17 allows
/// for an incomplete element type. Anything else means same-name merging
/// folded a struct into its own ancestor and the header would not compile.
fn check_containment(schema: &Schema) -> Result<(), CodegenError> {
    for (at, s) in schema.iter().enumerate() {
        for field in &s.fields {
            let Some(dep) = field.nested_type() else {
                continue;
            };
            let defined_before = schema.position(dep).is_some_and(|p| p < at);
            let self_vector = dep == s.name && matches!(field.ty, Ty::Array { .. });
            if !defined_before && !self_vector {
                return Err(CodegenError::RecursiveStruct {
                    name: s.name.clone(),
                    field: field.source_key.clone(),
                    nested: dep.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Concrete element type of an array, with the placeholder for unknown ones.
pub fn element_ty(element: Option<&Ty>) -> &Ty {
    element.unwrap_or(&EMPTY_ELEMENT)
}

// ————————————————————————————————————————————————————————————————————————————
// NAMING
// ————————————————————————————————————————————————————————————————————————————

/// Member names re-derived from the source keys. Collisions (`a-b` vs `a_b`,
/// symbols-only keys) get `_2`, `_3`, ... in field order.
pub fn member_names(s: &Struct, casing: Casing) -> Vec<String> {
    let mut used = HashSet::new();
    s.fields
        .iter()
        .map(|f| claim(&mut used, sanitize(&f.source_key, casing)))
        .collect()
}

/// One setter per member. A setter never reuses a member's name: with members
/// `x` and `set_x`, the setter of `x` becomes `set_x_2`.
pub fn setter_names(members: &[String], casing: Casing) -> Vec<String> {
    let mut used: HashSet<String> = members.iter().cloned().collect();
    members
        .iter()
        .map(|m| claim(&mut used, setter_name(m, casing)))
        .collect()
}

/// First free name among `base`, `base_2`, `base_3`, ... A base already ending
/// in `_` takes the number directly, which keeps `__` out of identifiers.
fn claim(used: &mut HashSet<String>, base: String) -> String {
    let sep = if base.ends_with('_') { "" } else { "_" };
    let mut name = base.clone();
    let mut n = 2;
    while !used.insert(name.clone()) {
        name = format!("{base}{sep}{n}");
        n += 1;
    }
    name
}

fn setter_name(member: &str, casing: Casing) -> String {
    match casing {
        Casing::LowerCamel => {
            let mut chars = member.chars();
            match chars.next() {
                Some(first) => format!("set{}{}", first.to_uppercase(), chars.as_str()),
                None => "set".to_string(),
            }
        }
        // `_` and `_2` become `set_` and `set_2`, never `set__2`
        Casing::Snake | Casing::UpperCamel if member.starts_with('_') => format!("set{member}"),
        Casing::Snake | Casing::UpperCamel => format!("set_{member}"),
    }
}

/// C++ string literal for an arbitrary JSON key.
pub fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            // `?` would start a trigraph in C++98
            '?' => out.push_str("\\?"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02x}\"\"", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

// ————————————————————————————————————————————————————————————————————————————
// FILE SKELETON
// ————————————————————————————————————————————————————————————————————————————

pub fn preamble(out: &mut Emitter, guard: &str) {
    out.line("// Generated by json2cpp. Do not edit.");
    out.line(format!("#ifndef {guard}"));
    out.line(format!("#define {guard}"));
    out.blank();
}

pub fn open_namespace(cx: &Context<'_>, out: &mut Emitter) {
    let segments = cx.config.namespace_segments();
    for segment in &segments {
        out.line(format!("namespace {segment} {{"));
    }
    if !segments.is_empty() {
        out.blank();
    }
}

pub fn close_namespace(cx: &Context<'_>, out: &mut Emitter) {
    let segments = cx.config.namespace_segments();
    for segment in segments.iter().rev() {
        out.line(format!("}}  // namespace {segment}"));
    }
    if !segments.is_empty() {
        out.blank();
    }
}

// ————————————————————————————————————————————————————————————————————————————
// DECLARATIONS
// ————————————————————————————————————————————————————————————————————————————

/// `types.h`: one struct per schema entry, in schema order.
pub fn render_types(cx: &Context<'_>) -> RenderedFile {
    let mut out = Emitter::new();
    preamble(&mut out, TYPES_GUARD);

    let wrapped = cx.any_wrapped();
    let mut includes = vec!["<cstddef>"];
    includes.push(if cx.is_legacy() { "<stdint.h>" } else { "<cstdint>" });
    if wrapped && !cx.is_legacy() {
        includes.push("<optional>");
    }
    includes.extend(["<string>", "<vector>"]);
    for header in includes {
        out.line(format!("#include {header}"));
    }
    out.blank();

    open_namespace(cx, &mut out);
    if wrapped && cx.is_legacy() {
        emit_optional_template(&mut out);
    }
    for s in cx.schema.iter() {
        emit_declaration(cx, s, &mut out);
        out.blank();
    }
    close_namespace(cx, &mut out);
    out.line(format!("#endif  // {TYPES_GUARD}"));

    RenderedFile {
        name: TYPES_FILE.to_string(),
        contents: out.into_string(),
    }
}

fn emit_optional_template(out: &mut Emitter) {
    out.line("template <typename T>");
    out.open("struct Optional {");
    out.line("bool has_value;");
    out.line("T value;");
    out.blank();
    out.line("Optional() : has_value(false), value() {}");
    out.line("Optional(const T& v) : has_value(true), value(v) {}");
    out.close("};");
    out.blank();
}

fn emit_declaration(cx: &Context<'_>, s: &Struct, out: &mut Emitter) {
    out.open(format!("struct {} {{", s.name));

    for (field, member) in cx.members(s) {
        let ty = cx.member_type(field);
        if cx.is_legacy() {
            out.line(format!("{ty} {member};"));
        } else {
            out.line(format!("{ty} {member}{{}};"));
        }
    }

    if cx.is_legacy() {
        let inits: Vec<String> = cx
            .members(s)
            .filter(|(field, _)| !cx.is_wrapped(field))
            .filter_map(|(field, member)| {
                let zero = match field.ty {
                    Ty::Bool => "false",
                    Ty::Integer => "0",
                    Ty::Float => "0.0",
                    _ => return None,
                };
                Some(format!("{member}({zero})"))
            })
            .collect();
        if !inits.is_empty() {
            out.blank();
            out.line(format!("{}() : {} {{}}", s.name, inits.join(", ")));
        }
    }

    let mut first = true;
    for ((field, member), setter) in cx.members(s).zip(cx.setters(s)) {
        if first {
            out.blank();
            first = false;
        }
        out.line(format!(
            "void {setter}({} value) {{ this->{member} = value; }}",
            cx.param_type(&field.ty),
        ));
    }

    out.close("};");
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{infer, ROOT_NAME};
    use crate::order::order;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn types_for(doc: serde_json::Value, config: &Config) -> String {
        let schema = order(infer(&doc, ROOT_NAME));
        let cx = Context::new(&schema, config).unwrap();
        render_types(&cx).contents
    }

    #[test]
    fn modern_declarations() {
        let src = types_for(json!({"name": "Alice", "age": 30, "pos": {"x": 1.5}}), &Config::default());
        let expected = r#"// Generated by json2cpp. Do not edit.
#ifndef JSON2CPP_TYPES_H
#define JSON2CPP_TYPES_H

#include <cstddef>
#include <cstdint>
#include <string>
#include <vector>

struct Pos {
    double x{};

    void set_x(double value) { this->x = value; }
};

struct Root {
    std::string name{};
    int64_t age{};
    Pos pos{};

    void set_name(std::string value) { this->name = value; }
    void set_age(int64_t value) { this->age = value; }
    void set_pos(const Pos& value) { this->pos = value; }
};

#endif  // JSON2CPP_TYPES_H
"#;
        assert_eq!(src, expected);
    }

    #[test]
    fn legacy_wrapper_namespace_and_camel() {
        let config = Config {
            target_dialect: Some(Dialect::Legacy),
            namespace: Some("acme::model".into()),
            field_casing: crate::codegen::FieldCasing::LowerCamel,
            nullable: NullableRepr::Wrapper,
            string_passing: StringPassing::ByConstRef,
        };
        let src = types_for(json!({"user_id": 7, "nick_name": null, "scores": [[1]]}), &config);
        let expected = r#"// Generated by json2cpp. Do not edit.
#ifndef JSON2CPP_TYPES_H
#define JSON2CPP_TYPES_H

#include <cstddef>
#include <stdint.h>
#include <string>
#include <vector>

namespace acme {
namespace model {

template <typename T>
struct Optional {
    bool has_value;
    T value;

    Optional() : has_value(false), value() {}
    Optional(const T& v) : has_value(true), value(v) {}
};

struct Root {
    int64_t userId;
    Optional<std::string> nickName;
    std::vector<std::vector<int64_t> > scores;

    Root() : userId(0) {}

    void setUserId(int64_t value) { this->userId = value; }
    void setNickName(const std::string& value) { this->nickName = value; }
    void setScores(const std::vector<std::vector<int64_t> >& value) { this->scores = value; }
};

}  // namespace model
}  // namespace acme

#endif  // JSON2CPP_TYPES_H
"#;
        assert_eq!(src, expected);
    }

    #[test]
    fn modern_wrapper_uses_std_optional() {
        let config = Config { nullable: NullableRepr::Wrapper, ..Config::default() };
        let src = types_for(json!({"gone": null}), &config);
        assert!(src.contains("#include <optional>"));
        assert!(src.contains("std::optional<std::string> gone{};"));
    }

    #[test]
    fn colliding_members_get_suffixes() {
        let schema = infer(&json!({"a-b": 1, "a_b": 2, "$": 3, "%": 4}), ROOT_NAME);
        let root = schema.get("Root").unwrap();
        assert_eq!(member_names(root, Casing::Snake), vec!["a_b", "a_b_2", "_", "_2"]);
    }

    #[test]
    fn fallback_members_avoid_double_underscores() {
        let src = types_for(json!({"$": 1, "%": 2, "2": 3}), &Config::default());
        assert!(src.contains("int64_t _{};"));
        assert!(src.contains("int64_t _2{};"));
        assert!(src.contains("int64_t _2_2{};"));
        assert!(src.contains("void set_(int64_t value) { this->_ = value; }"));
        assert!(src.contains("void set_2(int64_t value) { this->_2 = value; }"));
        assert!(!src.contains("__"));
    }

    #[test]
    fn setters_assign_through_this() {
        let src = types_for(json!({"value": 1}), &Config::default());
        assert!(src.contains("void set_value(int64_t value) { this->value = value; }"));
        assert!(!src.contains("{ value = value; }"));
    }

    #[test]
    fn setters_never_shadow_members() {
        let src = types_for(json!({"x": 1, "set_x": 2}), &Config::default());
        assert!(src.contains("int64_t set_x{};"));
        assert!(!src.contains("void set_x("));
        assert!(src.contains("void set_x_2(int64_t value) { this->x = value; }"));
        assert!(src.contains("void set_set_x(int64_t value) { this->set_x = value; }"));

        let camel = Config { field_casing: crate::codegen::FieldCasing::LowerCamel, ..Config::default() };
        let src = types_for(json!({"x": 1, "setX": 2}), &camel);
        assert!(src.contains("void setX_2(int64_t value) { this->x = value; }"));
        assert!(src.contains("void setSetX(int64_t value) { this->setX = value; }"));
    }

    #[test]
    fn struct_holding_its_ancestor_is_rejected() {
        let schema = order(infer(&json!({"node": {"child": {"node": {"x": 1}}}}), ROOT_NAME));
        let err = Context::new(&schema, &Config::default()).err().unwrap();
        assert!(matches!(err, CodegenError::RecursiveStruct { .. }), "{err}");
    }

    #[test]
    fn struct_holding_vectors_of_itself_is_accepted() {
        let doc = json!({"children": [{"id": 1, "children": [{"id": 2}]}]});
        let src = types_for(doc, &Config::default());
        assert!(src.contains("std::vector<ChildrenItem> children{};"));
        assert!(src.find("struct ChildrenItem {").unwrap() < src.find("struct Root {").unwrap());
    }

    #[test]
    fn reserved_and_digit_keys() {
        let src = types_for(json!({"class": "x", "2fa": true}), &Config::default());
        assert!(src.contains("std::string class_{};"));
        assert!(src.contains("bool _2_fa{};"));
    }

    #[test]
    fn literals_are_escaped() {
        assert_eq!(string_literal("plain"), "\"plain\"");
        assert_eq!(string_literal("a\"b\\c"), "\"a\\\"b\\\\c\"");
        assert_eq!(string_literal("line\nbreak"), "\"line\\nbreak\"");
        assert_eq!(string_literal("why?"), "\"why\\?\"");
    }
}
