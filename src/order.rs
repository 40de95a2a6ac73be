//! Dependency order: every struct comes after the structs its fields use.
//!
//! Depth-first over nested-type edges, starting from each struct in discovery
//! order; a struct is emitted once all its dependencies have been. Inference
//! descends a tree, but same-name merging can fold a struct into its own
//! ancestor: `{"children": [{"children": [..]}]}` gives a struct holding
//! vectors of itself, `{"node": {"child": {"node": ..}}}` gives a cycle through
//! `Child`. Back edges are skipped so the walk ends; the dependency then does
//! not precede its user, and code generation decides whether that is
//! representable (see `codegen::cpp::Context::new`).
use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::ir::{Schema, Struct};

/// Same structs, permuted so dependencies precede dependents.
pub fn order(schema: Schema) -> Schema {
    let sequence = {
        let mut walk = Walk {
            schema: &schema,
            visited: HashSet::new(),
            in_progress: HashSet::new(),
            out: Vec::with_capacity(schema.len()),
        };
        for name in schema.names() {
            walk.visit(&name);
        }
        walk.out
    };
    debug!(order = ?sequence, "dependency order");

    let mut by_name: HashMap<String, Struct> = schema
        .into_structs()
        .map(|s| (s.name.clone(), s))
        .collect();
    sequence.iter().filter_map(|name| by_name.remove(name)).collect()
}

struct Walk<'a> {
    schema: &'a Schema,
    visited: HashSet<String>,
    in_progress: HashSet<String>,
    out: Vec<String>,
}

impl Walk<'_> {
    fn visit(&mut self, name: &str) {
        if self.visited.contains(name) {
            return;
        }
        // dangling references (no such struct) have nothing to emit
        let Some(s) = self.schema.get(name) else {
            return;
        };
        self.in_progress.insert(name.to_string());
        for dep in s.dependencies() {
            if dep == name {
                debug!(name, "struct refers to itself");
                continue;
            }
            if self.in_progress.contains(dep) {
                warn!(from = name, to = dep, "cycle through same-named structs, edge ignored");
                continue;
            }
            self.visit(dep);
        }
        self.in_progress.remove(name);
        self.visited.insert(name.to_string());
        self.out.push(name.to_string());
    }
}
