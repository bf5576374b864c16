//! Human-readable module and pipeline reporting.
use std::fmt::Write;

use super::consts::*;
use super::module::{Module, Type};
use super::reflect::PipelineInfo;

pub fn module_summary(module: &Module) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "version:         {}.{} ({:08x})",
        (module.version >> 16) & 0xff,
        (module.version >> 8) & 0xff,
        module.version
    );
    let _ = writeln!(out, "generator magic: {:08x}", module.generator);
    let _ = writeln!(out, "bound:           {}", module.bound);
    for ep in &module.entry_points {
        let _ = writeln!(
            out,
            "entry point %{} \"{}\" ({}), {} interface ids",
            ep.id,
            ep.name,
            execution_model_name(ep.execution_model),
            ep.interface.len()
        );
    }
    for function in &module.functions {
        let name = module.id_instrs[function.id as usize].name.unwrap_or("");
        let referenced = function
            .referenced_variables
            .iter()
            .map(|&index| format!("%{}", module.variables[index as usize].id))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(
            out,
            "function %{} {} references: {}",
            function.id, name, referenced
        );
    }
    out
}

pub fn type_report(module: &Module) -> String {
    let mut out = String::new();
    for ty in &module.types {
        let _ = writeln!(
            out,
            "%{} [size {:3}] = {}",
            ty.id,
            ty.size,
            format_type(module, ty, 0)
        );
    }
    out
}

fn format_type(module: &Module, ty: &Type, depth: u32) -> String {
    let instr = module.id_instrs[ty.id as usize].instr;
    match instr.op() {
        OP_TYPE_VOID => "void".to_string(),
        OP_TYPE_BOOL => "bool".to_string(),
        OP_TYPE_INT => {
            let width = instr.words.get(2).copied().unwrap_or(0);
            let signed = instr.words.get(3).copied().unwrap_or(0) != 0;
            format!("{}{}", if signed { 's' } else { 'u' }, width)
        }
        OP_TYPE_FLOAT => {
            if instr.words.get(2).copied().unwrap_or(0) > 32 {
                "double".to_string()
            } else {
                "float".to_string()
            }
        }
        OP_TYPE_VECTOR => format!(
            "vec{}<{}>",
            instr.words.get(3).copied().unwrap_or(0),
            format_type_id(module, instr.words.get(2), depth + 1)
        ),
        OP_TYPE_MATRIX => {
            let columns = instr.words.get(3).copied().unwrap_or(0);
            let (rows, component) = match instr.words.get(2).and_then(|&id| module.type_by_id(id))
            {
                Some(column) => {
                    let column_instr = module.id_instrs[column.id as usize].instr;
                    (
                        column_instr.words.get(3).copied().unwrap_or(0),
                        format_type_id(module, column_instr.words.get(2), depth + 1),
                    )
                }
                None => (0, "?".to_string()),
            };
            format!("mat{}x{}<{}>", rows, columns, component)
        }
        OP_TYPE_IMAGE => "image".to_string(),
        OP_TYPE_SAMPLER => "sampler".to_string(),
        OP_TYPE_SAMPLED_IMAGE => "sampled_image".to_string(),
        OP_TYPE_ARRAY => {
            let length = instr
                .words
                .get(3)
                .and_then(|&id| module.id_instr(id))
                .and_then(|slot| slot.instr.words.get(3))
                .map(|length| length.to_string())
                .unwrap_or_else(|| "?".to_string());
            format!(
                "{}[{}]",
                format_type_id(module, instr.words.get(2), depth + 1),
                length
            )
        }
        OP_TYPE_RUNTIME_ARRAY => format!(
            "array<{}>",
            format_type_id(module, instr.words.get(2), depth + 1)
        ),
        OP_TYPE_STRUCT => {
            let name = module.id_instrs[ty.id as usize].name.unwrap_or("");
            if depth > 0 {
                return name.to_string();
            }
            let mut out = format!("struct {}\n{{\n", name);
            for member in &ty.members {
                let (size, rendered) = match module.type_by_id(member.type_id) {
                    Some(member_ty) => (member_ty.size, format_type(module, member_ty, depth + 1)),
                    None => (0, "?".to_string()),
                };
                let _ = writeln!(
                    out,
                    "\t[offset {:3}, size {:3}]\t{} {};",
                    member.offset,
                    size,
                    rendered,
                    member.name.unwrap_or("")
                );
            }
            out.push('}');
            out
        }
        OP_TYPE_OPAQUE => {
            let mut operands = instr.operands();
            let _ = operands.read_u32();
            operands.read_str().unwrap_or("opaque").to_string()
        }
        OP_TYPE_POINTER => {
            let storage = instr
                .words
                .get(2)
                .and_then(|&word| StorageClass::from_word(word))
                .map(StorageClass::name)
                .unwrap_or("");
            format!(
                "{} {}*",
                storage,
                format_type_id(module, instr.words.get(3), depth + 1)
            )
        }
        OP_TYPE_FUNCTION => "function".to_string(),
        OP_TYPE_EVENT => "event".to_string(),
        OP_TYPE_DEVICE_EVENT => "device_event".to_string(),
        OP_TYPE_RESERVE_ID => "reserve_id".to_string(),
        OP_TYPE_QUEUE => "queue".to_string(),
        OP_TYPE_PIPE => "pipe".to_string(),
        OP_TYPE_PIPE_STORAGE => "pipe_storage".to_string(),
        OP_TYPE_NAMED_BARRIER => "named_barrier".to_string(),
        _ => String::new(),
    }
}

fn format_type_id(module: &Module, id: Option<&u32>, depth: u32) -> String {
    id.and_then(|&id| module.type_by_id(id))
        .map(|ty| format_type(module, ty, depth))
        .unwrap_or_else(|| "?".to_string())
}

pub fn pipeline_report(info: &PipelineInfo) -> String {
    let mut out = String::new();
    for range in &info.push_constants {
        let _ = writeln!(
            out,
            "push constant: stages={:?} offset={} size={}",
            range.stage_flags, range.offset, range.size
        );
    }
    for (set, set_info) in info.descriptor_sets.iter().enumerate() {
        let _ = writeln!(out, "descriptor set {}:", set);
        for binding in &set_info.bindings {
            if binding.descriptor_count == 0 {
                continue;
            }
            let _ = writeln!(
                out,
                "  binding {}: {:?} count={} stages={:?}",
                binding.binding, binding.descriptor_type, binding.descriptor_count, binding.stage_flags
            );
        }
    }
    out
}
