//! Byte-size computation over declared types.
//!
//! Sizes follow the shader block layout a pipeline cares about: numeric
//! types take their bit width, aggregates expand recursively, and opaque
//! or handle-like types take 0. Well-formed modules declare types in
//! forward order, so the recursion cannot cycle.
use super::consts::*;
use super::instr::Instr;
use super::module::{Module, UNCALCULATED};
use super::{Error, Result};

pub(super) fn compute_type_sizes(module: &mut Module) -> Result<()> {
    for index in 0..module.types.len() {
        size_of_type(module, index)?;
    }
    Ok(())
}

fn size_of_type(module: &mut Module, index: usize) -> Result<u64> {
    if module.types[index].size != UNCALCULATED {
        return Ok(module.types[index].size);
    }
    let instr = module.id_instrs[module.types[index].id as usize].instr;
    let size = match instr.op() {
        OP_TYPE_INT | OP_TYPE_FLOAT => u64::from(operand(&instr, 2)?) / 8,
        OP_TYPE_VECTOR | OP_TYPE_MATRIX => {
            // A matrix sizes as its column vector times the column count,
            // which expands to component-size x rows x columns.
            let component = size_of_id(module, operand(&instr, 2)?)?;
            component * u64::from(operand(&instr, 3)?)
        }
        OP_TYPE_ARRAY => {
            let element = size_of_id(module, operand(&instr, 2)?)?;
            element * u64::from(array_length(module, operand(&instr, 3)?)?)
        }
        OP_TYPE_STRUCT => struct_size(module, index)?,
        _ => 0,
    };
    module.types[index].size = size;
    Ok(size)
}

fn operand(instr: &Instr, index: usize) -> Result<u32> {
    instr.words.get(index).copied().ok_or(Error::Truncated)
}

fn size_of_id(module: &mut Module, type_id: u32) -> Result<u64> {
    let index = module
        .id_instrs
        .get(type_id as usize)
        .and_then(|slot| slot.extra.type_index())
        .ok_or_else(|| {
            Error::StructuralError(format!("%{} is not a declared type", type_id))
        })?;
    size_of_type(module, index)
}

/// The element count of `OpTypeArray` is an id of an integer constant;
/// its value sits at operand word 3 of that constant's instruction.
fn array_length(module: &Module, length_id: u32) -> Result<u32> {
    let index = module
        .id_instrs
        .get(length_id as usize)
        .and_then(|slot| slot.extra.variable_index())
        .ok_or_else(|| {
            Error::StructuralError(format!(
                "array length %{} is not a declared constant",
                length_id
            ))
        })?;
    let instr = module.id_instrs[module.variables[index].id as usize].instr;
    instr.words.get(3).copied().ok_or_else(|| {
        Error::StructuralError(format!(
            "array length constant %{} carries no value",
            length_id
        ))
    })
}

/// A struct with offset decorations sizes as the max-offset member's
/// offset plus that member's size; padding after the last member is not
/// added. Without offsets the member sizes are summed.
fn struct_size(module: &mut Module, index: usize) -> Result<u64> {
    if module.types[index].members.is_empty() {
        return Ok(0);
    }
    let mut max_offset = 0;
    let mut last_type_id = module.types[index].members[0].type_id;
    for member in &module.types[index].members {
        if member.offset > max_offset {
            max_offset = member.offset;
            last_type_id = member.type_id;
        }
    }
    if max_offset > 0 {
        Ok(max_offset + member_size(module, last_type_id)?)
    } else {
        let member_type_ids: Vec<u32> = module.types[index]
            .members
            .iter()
            .map(|member| member.type_id)
            .collect();
        let mut total = 0;
        for type_id in member_type_ids {
            total += member_size(module, type_id)?;
        }
        Ok(total)
    }
}

/// Member slots grown by a name or decoration fixup past the declared
/// member count have no type; they contribute nothing to the size.
fn member_size(module: &mut Module, type_id: u32) -> Result<u64> {
    let resolves = module
        .id_instrs
        .get(type_id as usize)
        .and_then(|slot| slot.extra.type_index())
        .is_some();
    if resolves {
        size_of_id(module, type_id)
    } else {
        Ok(0)
    }
}
