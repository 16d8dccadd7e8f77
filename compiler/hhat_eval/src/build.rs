//! Turning front-end type definitions into type data structures.

use hhat_diagnostic::error::unknown_type;
use hhat_diagnostic::CoreResult;
use hhat_ir::{SymbolPath, TypeDef, TypeDefShape};
use hhat_mem::MemoryManager;
use hhat_types::{resolve_qsize, TdsKind, TypeDataStructure};

/// Build every definition in order, then resolve the qubit maxima of
/// quantum types left unbounded.
///
/// A member type may name a built-in, a type already registered in `mem`,
/// or any type defined earlier in `defs`.
pub fn build_types(mem: &MemoryManager, defs: &[TypeDef]) -> CoreResult<Vec<TypeDataStructure>> {
    let mut built: Vec<TypeDataStructure> = Vec::with_capacity(defs.len());
    for def in defs {
        let tds = {
            let lookup = |ty: &SymbolPath| find(&built, mem, ty);
            build_one(def, lookup)?
        };
        built.push(tds);
    }

    let resolved: Vec<_> = {
        let lookup = |ty: &SymbolPath| find(&built, mem, ty);
        built
            .iter()
            .map(|tds| {
                let unbounded = tds.qsize().is_some_and(|qsize| qsize.max.is_none());
                if unbounded {
                    resolve_qsize(tds, &lookup)
                } else {
                    None
                }
            })
            .collect()
    };
    for (tds, qsize) in built.iter_mut().zip(resolved) {
        if let Some(qsize) = qsize {
            tds.set_qsize(qsize);
        }
    }
    Ok(built)
}

fn find<'a>(
    built: &'a [TypeDataStructure],
    mem: &'a MemoryManager,
    ty: &SymbolPath,
) -> Option<&'a TypeDataStructure> {
    built
        .iter()
        .find(|tds| tds.name() == ty)
        .or_else(|| mem.lookup_type(ty).ok())
}

fn build_one<'a, F>(def: &TypeDef, lookup: F) -> CoreResult<TypeDataStructure>
where
    F: Fn(&SymbolPath) -> Option<&'a TypeDataStructure>,
{
    let member = |ty: &SymbolPath| lookup(ty).ok_or_else(|| unknown_type(ty.clone()));
    let kind = match &def.shape {
        TypeDefShape::Single(_) => TdsKind::Single,
        TypeDefShape::Struct(_) => TdsKind::Struct,
        TypeDefShape::Enum(_) => TdsKind::Enum,
        TypeDefShape::Union(_) => TdsKind::Union,
        TypeDefShape::RemoteUnion => TdsKind::RemoteUnion,
    };

    let mut tds = TypeDataStructure::new(def.name.clone(), kind);
    match &def.shape {
        TypeDefShape::Single(ty) => {
            tds.add_member(member(ty)?, None)?;
        }
        TypeDefShape::Struct(members) | TypeDefShape::Union(members) => {
            for (name, ty) in members {
                tds.add_member(member(ty)?, Some(*name))?;
            }
        }
        TypeDefShape::Enum(variants) => {
            for variant in variants {
                tds.add_variant(*variant)?;
            }
        }
        TypeDefShape::RemoteUnion => {}
    }
    Ok(tds)
}
