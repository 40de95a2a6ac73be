//! Schema merge (⊔ over struct graphs).
//!
//! Structs match by name, fields by source key. Matched fields are retyped by
//! [`promote`]; a field missing from either side becomes optional. Fields are
//! never dropped once observed.
//!
//! Promotion does not check that the two shapes are compatible: `Bool` against
//! `Object` yields `Object`. Such crossings are logged at `warn` and otherwise
//! accepted. Unrelated documents whose structs happen to share a name are
//! merged just the same; callers folding unrelated files carry that risk.
use tracing::{debug, warn};

use crate::ir::{Schema, Struct, Ty, ValueKind};

// ------------------------------ Promotion --------------------------------- //

/// Higher-ranked kind of the two: Object > Array > String > Float > Integer >
/// Bool > Null. Commutative and idempotent.
pub fn promote_kind(a: ValueKind, b: ValueKind) -> ValueKind {
    a.max(b)
}

/// Type-level promotion. Same-kind arrays promote their elements; same-kind
/// objects keep the lexically smaller struct name so the result does not
/// depend on argument order.
pub fn promote(a: &Ty, b: &Ty) -> Ty {
    match (a, b) {
        (Ty::Array { element: ea }, Ty::Array { element: eb }) => {
            let element = match (ea, eb) {
                (Some(x), Some(y)) => Some(Box::new(promote(x, y))),
                (Some(x), None) | (None, Some(x)) => Some(x.clone()),
                (None, None) => None,
            };
            Ty::Array { element }
        }
        (Ty::Object { name: x }, Ty::Object { name: y }) => Ty::Object { name: x.min(y).clone() },
        _ if promote_kind(a.kind(), b.kind()) == a.kind() => a.clone(),
        _ => b.clone(),
    }
}

/// True when promoting `a` against `b` loses a shape: anything but
/// null-vs-something and integer-vs-float.
pub fn is_lossy(a: ValueKind, b: ValueKind) -> bool {
    use ValueKind::*;
    match (a, b) {
        _ if a == b => false,
        (Null, _) | (_, Null) => false,
        (Integer, Float) | (Float, Integer) => false,
        _ => true,
    }
}

// -------------------------------- Merge ----------------------------------- //

/// Fold `incoming` into `accumulated`. Structs new to the accumulator are
/// appended as they are, after the existing ones.
pub fn merge(mut accumulated: Schema, incoming: Schema) -> Schema {
    for s in incoming.into_structs() {
        absorb(&mut accumulated, s);
    }
    accumulated
}

/// Add one struct to `schema`, merging it into a same-named struct if present.
pub fn absorb(schema: &mut Schema, incoming: Struct) {
    match schema.get_mut(&incoming.name) {
        Some(existing) => merge_struct(existing, incoming),
        None => schema.insert(incoming),
    }
}

fn merge_struct(acc: &mut Struct, incoming: Struct) {
    for field in &mut acc.fields {
        if incoming.field(&field.source_key).is_none() && !field.optional {
            debug!(name = %acc.name, key = %field.source_key, "absent from incoming, now optional");
            field.optional = true;
        }
    }

    for mut field in incoming.fields {
        match acc.fields.iter_mut().find(|f| f.source_key == field.source_key) {
            Some(existing) => {
                let (from, to) = (existing.ty.kind(), field.ty.kind());
                if is_lossy(from, to) {
                    warn!(
                        name = %acc.name,
                        key = %field.source_key,
                        ?from,
                        ?to,
                        "promoting across incompatible shapes"
                    );
                }
                let promoted = promote(&existing.ty, &field.ty);
                if promoted != existing.ty {
                    debug!(name = %acc.name, key = %field.source_key, ty = ?promoted.kind(), "promoted");
                }
                existing.ty = promoted;
                existing.optional |= field.optional;
            }
            None => {
                debug!(name = %acc.name, key = %field.source_key, "new optional field");
                field.optional = true;
                acc.fields.push(field);
            }
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
