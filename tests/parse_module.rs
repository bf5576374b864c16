//! Structural decoding: header validation, section order, the id table,
//! debug and annotation bookkeeping, and the parse-level invariants.

mod common;

use common::{declare_void_function_type, ModuleBuilder};
use spvscan::spv::consts::*;
use spvscan::spv::{Error, Module, ParseConfig, SideTable, SpirvBinary};

#[test]
fn header_shorter_than_five_words_is_truncated() {
    let bytes = ModuleBuilder::new(0).memory_model().bytes();
    assert!(matches!(
        SpirvBinary::from_bytes(&bytes[..16]),
        Err(Error::Truncated)
    ));
}

#[test]
fn ragged_byte_length_is_truncated() {
    let bytes = ModuleBuilder::new(0).memory_model().bytes();
    assert!(matches!(
        SpirvBinary::from_bytes(&bytes[..bytes.len() - 2]),
        Err(Error::Truncated)
    ));
}

#[test]
fn zero_magic_is_rejected() {
    let binary = SpirvBinary::from_bytes(&[0u8; 20]).unwrap();
    assert!(matches!(Module::parse(&binary), Err(Error::BadMagic(0))));
}

#[test]
fn zero_bound_module_parses_with_empty_tables() {
    let binary = SpirvBinary::from(ModuleBuilder::new(0).memory_model().words());
    let module = Module::parse(&binary).unwrap();
    assert_eq!(module.bound, 0);
    assert_eq!(module.addressing_model, 0);
    assert_eq!(module.memory_model, 1);
    assert!(module.id_instrs.is_empty());
    assert!(module.entry_points.is_empty());
    assert!(module.types.is_empty());
    assert!(module.variables.is_empty());
    assert!(module.functions.is_empty());
}

#[test]
fn missing_memory_model_is_structural() {
    let mut builder = ModuleBuilder::new(4);
    builder.instr(OP_CAPABILITY, &[1]);
    let binary = SpirvBinary::from(builder.words());
    assert!(matches!(
        Module::parse(&binary),
        Err(Error::StructuralError(_))
    ));
}

#[test]
fn execution_mode_for_unknown_entry_point_is_structural() {
    let mut builder = ModuleBuilder::new(8);
    builder.memory_model();
    builder.entry_point(EXEC_MODEL_VERTEX, 4, "main", &[]);
    // LocalSize on an id no OpEntryPoint declared.
    builder.instr(OP_EXECUTION_MODE, &[5, 17, 1, 1, 1]);
    let binary = SpirvBinary::from(builder.words());
    assert!(matches!(
        Module::parse(&binary),
        Err(Error::StructuralError(_))
    ));
}

#[test]
fn execution_modes_attach_to_their_entry_point() {
    let mut builder = ModuleBuilder::new(8);
    builder.memory_model();
    builder.entry_point(EXEC_MODEL_GL_COMPUTE, 4, "main", &[]);
    builder.instr(OP_EXECUTION_MODE, &[4, 17, 8, 8, 1]);
    declare_void_function_type(&mut builder);
    builder.instr(OP_FUNCTION, &[2, 4, 0, 3]);
    builder.instr(OP_LABEL, &[5]);
    builder.instr(OP_RETURN, &[]);
    builder.instr(OP_FUNCTION_END, &[]);

    let binary = SpirvBinary::from(builder.words());
    let module = Module::parse(&binary).unwrap();
    let ep = &module.entry_points[0];
    assert_eq!(ep.name, "main");
    assert_eq!(ep.execution_model, EXEC_MODEL_GL_COMPUTE);
    assert_eq!(ep.execution_modes.len(), 1);
    assert_eq!(ep.execution_modes[0].mode, 17);
    assert_eq!(ep.execution_modes[0].operands, &[8, 8, 1]);
}

#[test]
fn entry_point_without_function_is_structural() {
    let mut builder = ModuleBuilder::new(8);
    builder.memory_model();
    builder.entry_point(EXEC_MODEL_VERTEX, 4, "main", &[]);
    let binary = SpirvBinary::from(builder.words());
    match Module::parse(&binary) {
        Err(Error::StructuralError(what)) => assert!(what.contains("has no function")),
        other => panic!("expected structural error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn entry_point_interface_ids_follow_the_name() {
    let mut builder = ModuleBuilder::new(16);
    builder.memory_model();
    builder.entry_point(EXEC_MODEL_VERTEX, 4, "main", &[9, 10]);
    declare_void_function_type(&mut builder);
    builder.instr(OP_FUNCTION, &[2, 4, 0, 3]);
    builder.instr(OP_LABEL, &[5]);
    builder.instr(OP_RETURN, &[]);
    builder.instr(OP_FUNCTION_END, &[]);

    let binary = SpirvBinary::from(builder.words());
    let module = Module::parse(&binary).unwrap();
    assert_eq!(module.entry_points[0].interface, &[9, 10]);
    assert_eq!(module.entry_points[0].function_index, 0);
}

fn uniform_buffer_module() -> Vec<u32> {
    let mut builder = ModuleBuilder::new(16);
    builder.memory_model();
    builder.entry_point(EXEC_MODEL_VERTEX, 4, "main", &[]);
    builder.instr_str(OP_NAME, &[8], "ubo", &[]);
    builder.decorate(8, DECO_DESCRIPTOR_SET, &[0]);
    builder.decorate(8, DECO_BINDING, &[0]);
    builder.member_decorate(6, 0, DECO_OFFSET, &[0]);
    declare_void_function_type(&mut builder);
    builder.instr(OP_TYPE_FLOAT, &[5, 32]);
    builder.instr(OP_TYPE_INT, &[10, 32, 0]);
    builder.instr(OP_CONSTANT, &[10, 11, 4]);
    builder.instr(OP_TYPE_ARRAY, &[9, 5, 11]);
    builder.instr(OP_TYPE_STRUCT, &[6, 9]);
    builder.instr(OP_TYPE_POINTER, &[7, 2, 6]);
    builder.instr(OP_VARIABLE, &[7, 8, 2]);
    builder.instr(OP_FUNCTION, &[2, 4, 0, 3]);
    builder.instr(OP_LABEL, &[12]);
    builder.instr(OP_ACCESS_CHAIN, &[7, 13, 8, 11]);
    builder.instr(OP_RETURN, &[]);
    builder.instr(OP_FUNCTION_END, &[]);
    builder.words()
}

#[test]
fn id_table_slots_hold_their_own_id_or_stay_vacant() {
    let binary = SpirvBinary::from(uniform_buffer_module());
    let module = Module::parse(&binary).unwrap();
    assert_eq!(module.id_instrs.len(), module.bound as usize);
    for (i, slot) in module.id_instrs.iter().enumerate() {
        assert_eq!(slot.id, i as u32);
        if !slot.is_defined() {
            assert_eq!(slot.extra, SideTable::None);
        }
    }
}

#[test]
fn side_table_indices_agree_with_the_id_table() {
    let binary = SpirvBinary::from(uniform_buffer_module());
    let module = Module::parse(&binary).unwrap();
    assert!(!module.types.is_empty());
    assert!(!module.variables.is_empty());
    for (index, ty) in module.types.iter().enumerate() {
        assert_eq!(
            module.id_instrs[ty.id as usize].extra,
            SideTable::Type(index as u32)
        );
    }
    for (index, variable) in module.variables.iter().enumerate() {
        assert_eq!(
            module.id_instrs[variable.id as usize].extra,
            SideTable::Variable(index as u32)
        );
    }
}

#[test]
fn every_decoration_is_indexed_on_its_target() {
    let binary = SpirvBinary::from(uniform_buffer_module());
    let module = Module::parse(&binary).unwrap();
    assert_eq!(module.decorations.len(), 3);
    for (index, decoration) in module.decorations.iter().enumerate() {
        let target = decoration.words[1];
        assert!(module.id_instrs[target as usize]
            .decoration_indices
            .contains(&(index as u32)));
    }
}

#[test]
fn names_land_on_their_id_slot() {
    let binary = SpirvBinary::from(uniform_buffer_module());
    let module = Module::parse(&binary).unwrap();
    assert_eq!(module.id_instrs[8].name, Some("ubo"));
    let function = &module.functions[0];
    assert_eq!(function.id, 4);
    assert_eq!(
        function.referenced_variables.iter().copied().collect::<Vec<_>>(),
        vec![1]
    );
}

#[test]
fn reparse_is_structurally_identical() {
    let words = uniform_buffer_module();
    let first_binary = SpirvBinary::from(words.clone());
    let second_binary = SpirvBinary::from(words);
    let first = Module::parse(&first_binary).unwrap();
    let second = Module::parse(&second_binary).unwrap();

    assert_eq!(first.bound, second.bound);
    assert_eq!(first.types.len(), second.types.len());
    assert_eq!(first.variables.len(), second.variables.len());
    assert_eq!(first.decorations.len(), second.decorations.len());
    assert_eq!(first.functions.len(), second.functions.len());
    let extras = |module: &Module| {
        module
            .id_instrs
            .iter()
            .map(|slot| slot.extra)
            .collect::<Vec<_>>()
    };
    assert_eq!(extras(&first), extras(&second));
    let sizes = |module: &Module| module.types.iter().map(|ty| ty.size).collect::<Vec<_>>();
    assert_eq!(sizes(&first), sizes(&second));
}

#[test]
fn every_type_size_is_finalized() {
    let binary = SpirvBinary::from(uniform_buffer_module());
    let module = Module::parse(&binary).unwrap();
    for ty in &module.types {
        assert!(ty.size < u64::from(u32::MAX));
    }
}

#[test]
fn member_fixups_grow_member_slots() {
    let mut builder = ModuleBuilder::new(8);
    builder.memory_model();
    // The struct is named and decorated before it is declared; both
    // passes must also widen the member list past the declared count.
    builder.instr_str(OP_MEMBER_NAME, &[6, 1], "pad", &[]);
    builder.member_decorate(6, 2, DECO_OFFSET, &[8]);
    builder.instr(OP_TYPE_FLOAT, &[5, 32]);
    builder.instr(OP_TYPE_STRUCT, &[6, 5]);
    let binary = SpirvBinary::from(builder.words());
    let module = Module::parse(&binary).unwrap();

    let ty = module.type_by_id(6).unwrap();
    assert_eq!(ty.members.len(), 3);
    assert_eq!(ty.members[0].type_id, 5);
    assert_eq!(ty.members[0].name, None);
    assert_eq!(ty.members[1].name, Some("pad"));
    assert_eq!(ty.members[2].offset, 8);
}

#[test]
fn member_name_on_a_non_type_is_structural() {
    let mut builder = ModuleBuilder::new(8);
    builder.memory_model();
    builder.instr_str(OP_MEMBER_NAME, &[6, 0], "x", &[]);
    builder.instr(OP_TYPE_FLOAT, &[5, 32]);
    let binary = SpirvBinary::from(builder.words());
    assert!(matches!(
        Module::parse(&binary),
        Err(Error::StructuralError(_))
    ));
}

#[test]
fn decoration_groups_are_skipped_unless_strict() {
    let mut builder = ModuleBuilder::new(8);
    builder.memory_model();
    builder.instr(OP_DECORATION_GROUP, &[3]);
    builder.instr(OP_GROUP_DECORATE, &[3, 5]);
    let words = builder.words();

    let binary = SpirvBinary::from(words.clone());
    assert!(Module::parse(&binary).is_ok());

    let strict_binary = SpirvBinary::from(words);
    let config = ParseConfig { strict: true };
    assert!(matches!(
        Module::parse_with_config(&strict_binary, &config),
        Err(Error::UnsupportedFeature("decoration groups"))
    ));
}

#[test]
fn decorating_an_id_beyond_the_bound_is_structural() {
    let mut builder = ModuleBuilder::new(4);
    builder.memory_model();
    builder.decorate(9, DECO_BINDING, &[0]);
    let binary = SpirvBinary::from(builder.words());
    assert!(matches!(
        Module::parse(&binary),
        Err(Error::StructuralError(_))
    ));
}

#[test]
fn direct_function_calls_are_recorded() {
    let mut builder = ModuleBuilder::new(16);
    builder.memory_model();
    builder.entry_point(EXEC_MODEL_VERTEX, 4, "main", &[]);
    declare_void_function_type(&mut builder);
    builder.instr(OP_FUNCTION, &[2, 4, 0, 3]);
    builder.instr(OP_LABEL, &[5]);
    builder.instr(OP_FUNCTION_CALL, &[2, 6, 10]);
    builder.instr(OP_RETURN, &[]);
    builder.instr(OP_FUNCTION_END, &[]);
    builder.instr(OP_FUNCTION, &[2, 10, 0, 3]);
    builder.instr(OP_LABEL, &[11]);
    builder.instr(OP_RETURN, &[]);
    builder.instr(OP_FUNCTION_END, &[]);

    let binary = SpirvBinary::from(builder.words());
    let module = Module::parse(&binary).unwrap();
    assert_eq!(module.functions.len(), 2);
    assert_eq!(module.functions[0].called_function_indices, vec![1]);
    assert!(module.functions[1].called_function_indices.is_empty());
}

#[test]
fn stray_opcode_in_the_function_section_is_structural() {
    let mut builder = ModuleBuilder::new(8);
    builder.memory_model();
    declare_void_function_type(&mut builder);
    // A bare OpLabel where only OpFunction may start a block.
    builder.instr(OP_LABEL, &[5]);
    let binary = SpirvBinary::from(builder.words());
    assert!(matches!(
        Module::parse(&binary),
        Err(Error::StructuralError(_))
    ));
}
