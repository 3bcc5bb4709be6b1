//! Compiled class file analysis
//!
//! Reads JVM class files directly at the binary level (no source text) and
//! extracts what dependency analysis needs: the class name, whether it is
//! visible outside its module, and every class it references structurally
//! or from its instructions.

mod class_file;
mod constant_pool;
mod descriptor;
mod instructions;
mod reader;

#[cfg(test)]
#[path = "../../tests/integration/support/class_builder.rs"]
pub(crate) mod testing;

pub use class_file::{
    extract_references, is_visible_class, ClassFile, ClassSummary, Member, ACC_PRIVATE,
    ACC_PUBLIC,
};
pub use descriptor::{object_types, signature_types, to_binary_name};

use thiserror::Error;

/// Class file parse errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassFileError {
    #[error("Unexpected end of class file at offset {offset} (needed {needed} more bytes)")]
    UnexpectedEof { offset: usize, needed: usize },
    #[error("Not a class file (magic 0x{0:08X})")]
    BadMagic(u32),
    #[error("Unknown constant pool tag {tag} at index {index}")]
    UnknownConstantTag { tag: u8, index: usize },
    #[error("Invalid constant pool index {0}")]
    BadConstantIndex(u16),
    #[error("Constant pool entry {index} is not a {expected}")]
    UnexpectedConstant { index: u16, expected: &'static str },
    #[error("Unknown opcode 0x{opcode:02X} at pc {pc}")]
    UnknownOpcode { opcode: u8, pc: usize },
}
