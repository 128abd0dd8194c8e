use std::collections::HashSet;

use tracing::debug;

use crate::cdb::{CdbError, Inheritance, ObjectGraph, Result};

/// Copy the resolved base chain of `db_id` into it.
///
/// Bases are resolved deepest first, so every copy is taken from a fully
/// resolved tree. Resolved objects are left alone, which makes repeated calls
/// no-ops. A missing base resolves to "no inheritance".
pub fn resolve_inheritance(graph: &mut ObjectGraph, db_id: u32, max_depth: usize) -> Result<()> {
	let mut chain = Vec::new();
	let mut seen = HashSet::new();
	let mut current = db_id;

	while let Some(base) = graph.get(current).and_then(|record| record.base_object()) {
		if !seen.insert(current) {
			return Err(CdbError::CyclicInheritance { db_id: current });
		}
		if chain.len() >= max_depth {
			return Err(CdbError::InheritanceTooDeep { db_id, max: max_depth });
		}
		chain.push((current, base));
		current = base;
	}

	for (target, base) in chain.into_iter().rev() {
		let inherited = graph.get(base).map(|record| (record.components.clone(), record.root_base));
		let Some(record) = graph.get_mut(target) else {
			continue;
		};
		match inherited {
			Some((components, root_base)) => {
				record.components = components;
				record.root_base = root_base;
			}
			None => {
				debug!(db_id = target, base, "base object not found, dropping inheritance");
				record.root_base = None;
			}
		}
		record.inheritance = Inheritance::Resolved;
	}

	Ok(())
}
