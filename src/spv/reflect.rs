//! Entry-point variable collection and pipeline reflection.
use std::ops::Range;

use ash::vk;
use log::debug;

use super::consts::*;
use super::instr::Instr;
use super::module::Module;
use super::{Error, Result};

/// Records which module-scope variables each function body touches, and
/// which functions it calls directly. `OpAccessChain` and `OpLoad` name
/// their base pointer at operand word 3; only ids whose slot resolves
/// into the variables table are collected.
pub(super) fn scan_function_bodies(
    module: &mut Module,
    instrs: &[Instr],
    bodies: &[Range<usize>],
) {
    for index in 0..module.functions.len() {
        for instr in &instrs[bodies[index].clone()] {
            match instr.op() {
                OP_ACCESS_CHAIN | OP_LOAD => {
                    let base = instr.words[3];
                    let variable_index = module
                        .id_instrs
                        .get(base as usize)
                        .and_then(|slot| slot.extra.variable_index());
                    if let Some(variable_index) = variable_index {
                        module.functions[index]
                            .referenced_variables
                            .insert(variable_index as u32);
                    }
                }
                OP_FUNCTION_CALL => {
                    let callee = match instr.words.get(3) {
                        Some(&callee) => callee,
                        None => continue,
                    };
                    let called = module
                        .functions
                        .iter()
                        .position(|function| function.id == callee)
                        .map(|x| x as u32);
                    if let Some(called) = called {
                        let calls = &mut module.functions[index].called_function_indices;
                        if !calls.contains(&called) {
                            calls.push(called);
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

/// Descriptor bindings of one set, indexed by binding number. Slots never
/// written stay zeroed (`descriptor_count == 0`).
#[derive(Debug, Clone, Default)]
pub struct DescriptorSetInfo {
    pub bindings: Vec<vk::DescriptorSetLayoutBinding>,
}

/// Everything a `VkPipelineLayout` needs from the module's entry points.
#[derive(Debug, Clone, Default)]
pub struct PipelineInfo {
    pub push_constants: Vec<vk::PushConstantRange>,
    pub descriptor_sets: Vec<DescriptorSetInfo>,
}

impl PipelineInfo {
    /// Classifies every variable referenced from each entry point into a
    /// push-constant range or a descriptor binding. A `{set, binding}`
    /// reached from several entry points unions its stage flags.
    pub fn reflect(module: &Module) -> Result<PipelineInfo> {
        let mut info = PipelineInfo::default();
        for ep in &module.entry_points {
            let stage_flags = shader_stage_flags(ep.execution_model);
            let function = module
                .functions
                .get(ep.function_index as usize)
                .ok_or_else(|| {
                    Error::StructuralError(format!("entry point {} has no function", ep.name))
                })?;
            for &variable_index in &function.referenced_variables {
                let variable = &module.variables[variable_index as usize];
                let id_instr = &module.id_instrs[variable.id as usize];
                let instr = id_instr.instr;
                if instr.op() != OP_VARIABLE {
                    continue;
                }
                let result_type_id = instr.words[1];
                let storage = StorageClass::from_word(instr.words[3]);

                if storage == Some(StorageClass::PushConstant) {
                    // The range offset would require walking access
                    // chains; every producer seen so far starts at 0.
                    info.push_constants.push(vk::PushConstantRange {
                        stage_flags,
                        offset: 0,
                        size: indirect_type_size(module, result_type_id) as u32,
                    });
                    continue;
                }

                let mut set = None;
                let mut binding = None;
                for &decoration_index in &id_instr.decoration_indices {
                    let decoration = module.decorations[decoration_index as usize];
                    if decoration.op() != OP_DECORATE {
                        continue;
                    }
                    match decoration.words[2] {
                        DECO_BINDING => binding = decoration.words.get(3).copied(),
                        DECO_DESCRIPTOR_SET => set = decoration.words.get(3).copied(),
                        _ => {}
                    }
                    if set.is_some() && binding.is_some() {
                        break;
                    }
                }
                let (set, binding) = match (set, binding) {
                    (Some(set), Some(binding)) => (set as usize, binding as usize),
                    _ => continue,
                };
                let descriptor_type = match classify(module, result_type_id, None) {
                    Some(ty) => ty,
                    None => {
                        debug!(
                            "variable %{} at (set={}, binding={}) has no descriptor type",
                            variable.id, set, binding
                        );
                        continue;
                    }
                };

                if info.descriptor_sets.len() <= set {
                    info.descriptor_sets
                        .resize_with(set + 1, DescriptorSetInfo::default);
                }
                let bindings = &mut info.descriptor_sets[set].bindings;
                if bindings.len() <= binding {
                    bindings.resize_with(binding + 1, vk::DescriptorSetLayoutBinding::default);
                }
                let slot = &mut bindings[binding];
                slot.binding = binding as u32;
                // Arrayed bindings are not expanded.
                slot.descriptor_count = 1;
                slot.stage_flags |= stage_flags;
                slot.descriptor_type = descriptor_type;
                slot.p_immutable_samplers = std::ptr::null();
            }
        }
        Ok(info)
    }
}

/// Stage bit for an execution model. Models from `Kernel` up have no
/// Vulkan pipeline stage.
pub fn shader_stage_flags(execution_model: u32) -> vk::ShaderStageFlags {
    if execution_model >= EXEC_MODEL_KERNEL {
        vk::ShaderStageFlags::empty()
    } else {
        vk::ShaderStageFlags::from_raw(1 << execution_model)
    }
}

/// Size of the type a pointer type ultimately refers to; non-pointer
/// types report their own size.
fn indirect_type_size(module: &Module, type_id: u32) -> u64 {
    let ty = match module.type_by_id(type_id) {
        Some(ty) => ty,
        None => return 0,
    };
    let instr = module.id_instrs[ty.id as usize].instr;
    if instr.op() == OP_TYPE_POINTER {
        return match instr.words.get(3) {
            Some(&pointee) => indirect_type_size(module, pointee),
            None => 0,
        };
    }
    ty.size
}

/// Maps a variable's result type to the Vulkan descriptor type it binds
/// as. Pointers are followed, carrying the pointer's storage class down
/// to the buffer classification. `None` means the variable is not a
/// descriptor and is ignored.
fn classify(
    module: &Module,
    type_id: u32,
    storage: Option<StorageClass>,
) -> Option<vk::DescriptorType> {
    let ty = module.type_by_id(type_id)?;
    let instr = module.id_instrs[ty.id as usize].instr;
    match instr.op() {
        OP_TYPE_POINTER => {
            let pointer_storage = instr
                .words
                .get(2)
                .and_then(|&word| StorageClass::from_word(word));
            classify(module, *instr.words.get(3)?, pointer_storage)
        }
        OP_TYPE_IMAGE => Some(vk::DescriptorType::SAMPLED_IMAGE),
        OP_TYPE_SAMPLER => Some(vk::DescriptorType::SAMPLER),
        OP_TYPE_SAMPLED_IMAGE => Some(vk::DescriptorType::COMBINED_IMAGE_SAMPLER),
        OP_TYPE_BOOL | OP_TYPE_INT | OP_TYPE_FLOAT | OP_TYPE_VECTOR | OP_TYPE_MATRIX
        | OP_TYPE_ARRAY | OP_TYPE_RUNTIME_ARRAY | OP_TYPE_STRUCT => match storage {
            Some(StorageClass::Uniform) => Some(vk::DescriptorType::UNIFORM_BUFFER),
            Some(StorageClass::StorageBuffer) => Some(vk::DescriptorType::STORAGE_BUFFER),
            _ => None,
        },
        _ => None,
    }
}
