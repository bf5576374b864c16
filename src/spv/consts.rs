//! Opcode and enumerant values from the SPIR-V 1.2 unified registry.
use std::ops::RangeInclusive;

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

pub const SPIRV_MAGIC: u32 = 0x0723_0203;
/// Header length in words: magic, version, generator magic, id bound,
/// reserved.
pub const HEADER_LEN: usize = 5;

pub const OP_SOURCE_CONTINUED: u32 = 2;
pub const OP_SOURCE: u32 = 3;
pub const OP_SOURCE_EXTENSION: u32 = 4;
pub const OP_NAME: u32 = 5;
pub const OP_MEMBER_NAME: u32 = 6;
pub const OP_STRING: u32 = 7;
pub const OP_LINE: u32 = 8;
pub const OP_EXTENSION: u32 = 10;
pub const OP_EXT_INST_IMPORT: u32 = 11;
pub const OP_MEMORY_MODEL: u32 = 14;
pub const OP_ENTRY_POINT: u32 = 15;
pub const OP_EXECUTION_MODE: u32 = 16;
pub const OP_CAPABILITY: u32 = 17;

pub const OP_TYPE_VOID: u32 = 19;
pub const OP_TYPE_BOOL: u32 = 20;
pub const OP_TYPE_INT: u32 = 21;
pub const OP_TYPE_FLOAT: u32 = 22;
pub const OP_TYPE_VECTOR: u32 = 23;
pub const OP_TYPE_MATRIX: u32 = 24;
pub const OP_TYPE_IMAGE: u32 = 25;
pub const OP_TYPE_SAMPLER: u32 = 26;
pub const OP_TYPE_SAMPLED_IMAGE: u32 = 27;
pub const OP_TYPE_ARRAY: u32 = 28;
pub const OP_TYPE_RUNTIME_ARRAY: u32 = 29;
pub const OP_TYPE_STRUCT: u32 = 30;
pub const OP_TYPE_OPAQUE: u32 = 31;
pub const OP_TYPE_POINTER: u32 = 32;
pub const OP_TYPE_FUNCTION: u32 = 33;
pub const OP_TYPE_EVENT: u32 = 34;
pub const OP_TYPE_DEVICE_EVENT: u32 = 35;
pub const OP_TYPE_RESERVE_ID: u32 = 36;
pub const OP_TYPE_QUEUE: u32 = 37;
pub const OP_TYPE_PIPE: u32 = 38;
pub const OP_TYPE_FORWARD_POINTER: u32 = 39;
// The two stragglers Khronos added outside the contiguous block.
pub const OP_TYPE_PIPE_STORAGE: u32 = 322;
pub const OP_TYPE_NAMED_BARRIER: u32 = 327;
pub const TYPE_RANGE: RangeInclusive<u32> = OP_TYPE_VOID..=OP_TYPE_FORWARD_POINTER;

pub const OP_CONSTANT_TRUE: u32 = 41;
pub const OP_CONSTANT_FALSE: u32 = 42;
pub const OP_CONSTANT: u32 = 43;
pub const OP_CONSTANT_COMPOSITE: u32 = 44;
pub const OP_CONSTANT_SAMPLER: u32 = 45;
pub const OP_CONSTANT_NULL: u32 = 46;
pub const CONST_RANGE: RangeInclusive<u32> = OP_CONSTANT_TRUE..=OP_CONSTANT_NULL;

pub const OP_SPEC_CONSTANT_TRUE: u32 = 48;
pub const OP_SPEC_CONSTANT_FALSE: u32 = 49;
pub const OP_SPEC_CONSTANT: u32 = 50;
pub const OP_SPEC_CONSTANT_COMPOSITE: u32 = 51;
pub const OP_SPEC_CONSTANT_OP: u32 = 52;
pub const SPEC_CONST_RANGE: RangeInclusive<u32> = OP_SPEC_CONSTANT_TRUE..=OP_SPEC_CONSTANT_OP;

pub const OP_FUNCTION: u32 = 54;
pub const OP_FUNCTION_PARAMETER: u32 = 55;
pub const OP_FUNCTION_END: u32 = 56;
pub const OP_FUNCTION_CALL: u32 = 57;
pub const OP_VARIABLE: u32 = 59;
pub const OP_LOAD: u32 = 61;
pub const OP_STORE: u32 = 62;
pub const OP_ACCESS_CHAIN: u32 = 65;
pub const OP_IN_BOUNDS_ACCESS_CHAIN: u32 = 66;

pub const OP_DECORATE: u32 = 71;
pub const OP_MEMBER_DECORATE: u32 = 72;
pub const OP_DECORATION_GROUP: u32 = 73;
pub const OP_GROUP_DECORATE: u32 = 74;
pub const OP_GROUP_MEMBER_DECORATE: u32 = 75;

pub const OP_LABEL: u32 = 248;
pub const OP_RETURN: u32 = 253;
pub const OP_NO_LINE: u32 = 317;
pub const OP_MODULE_PROCESSED: u32 = 330;
pub const OP_EXECUTION_MODE_ID: u32 = 331;
pub const OP_DECORATE_ID: u32 = 332;

/// The closed set of type-defining opcodes the decoder records.
/// `OpTypeForwardPointer` declares no complete type and is ignored.
pub fn is_type_defining(opcode: u32) -> bool {
    (TYPE_RANGE.contains(&opcode) && opcode != OP_TYPE_FORWARD_POINTER)
        || opcode == OP_TYPE_PIPE_STORAGE
        || opcode == OP_TYPE_NAMED_BARRIER
}

/// The eleven constant-defining opcodes, spec constants included.
pub fn is_constant_defining(opcode: u32) -> bool {
    CONST_RANGE.contains(&opcode) || SPEC_CONST_RANGE.contains(&opcode)
}

pub const DECO_SPEC_ID: u32 = 1;
pub const DECO_BLOCK: u32 = 2;
pub const DECO_BUFFER_BLOCK: u32 = 3;
pub const DECO_ARRAY_STRIDE: u32 = 6;
pub const DECO_MATRIX_STRIDE: u32 = 7;
pub const DECO_BUILT_IN: u32 = 11;
pub const DECO_LOCATION: u32 = 30;
pub const DECO_BINDING: u32 = 33;
pub const DECO_DESCRIPTOR_SET: u32 = 34;
pub const DECO_OFFSET: u32 = 35;
pub const DECO_INPUT_ATTACHMENT_INDEX: u32 = 43;

pub const EXEC_MODEL_VERTEX: u32 = 0;
pub const EXEC_MODEL_TESSELLATION_CONTROL: u32 = 1;
pub const EXEC_MODEL_TESSELLATION_EVALUATION: u32 = 2;
pub const EXEC_MODEL_GEOMETRY: u32 = 3;
pub const EXEC_MODEL_FRAGMENT: u32 = 4;
pub const EXEC_MODEL_GL_COMPUTE: u32 = 5;
/// First execution model with no Vulkan pipeline stage bit.
pub const EXEC_MODEL_KERNEL: u32 = 6;

pub fn execution_model_name(model: u32) -> &'static str {
    match model {
        EXEC_MODEL_VERTEX => "vertex",
        EXEC_MODEL_TESSELLATION_CONTROL => "tessellation_control",
        EXEC_MODEL_TESSELLATION_EVALUATION => "tessellation_evaluation",
        EXEC_MODEL_GEOMETRY => "geometry",
        EXEC_MODEL_FRAGMENT => "fragment",
        EXEC_MODEL_GL_COMPUTE => "compute",
        EXEC_MODEL_KERNEL => "kernel",
        _ => "unknown",
    }
}

/// Where a module-scope variable lives. Reflection only inspects a few of
/// these; the rest are carried for diagnostics.
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageClass {
    UniformConstant = 0,
    Input = 1,
    Uniform = 2,
    Output = 3,
    Workgroup = 4,
    CrossWorkgroup = 5,
    Private = 6,
    Function = 7,
    Generic = 8,
    PushConstant = 9,
    AtomicCounter = 10,
    Image = 11,
    StorageBuffer = 12,
}

impl StorageClass {
    pub fn from_word(word: u32) -> Option<StorageClass> {
        <StorageClass as FromPrimitive>::from_u32(word)
    }

    pub fn name(self) -> &'static str {
        match self {
            StorageClass::UniformConstant => "uniform_constant",
            StorageClass::Input => "input",
            StorageClass::Uniform => "uniform",
            StorageClass::Output => "output",
            StorageClass::Workgroup => "workgroup",
            StorageClass::CrossWorkgroup => "cross_workgroup",
            StorageClass::Private => "private",
            StorageClass::Function => "function",
            StorageClass::Generic => "generic",
            StorageClass::PushConstant => "push_constant",
            StorageClass::AtomicCounter => "atomic_counter",
            StorageClass::Image => "image",
            StorageClass::StorageBuffer => "storage_buffer",
        }
    }
}
