//! Walks a method's `Code` array and reports the instructions that name a
//! class through the constant pool.

use super::reader::ByteReader;
use super::ClassFileError;

const TABLESWITCH: u8 = 0xaa;
const LOOKUPSWITCH: u8 = 0xab;
const GETSTATIC: u8 = 0xb2;
const PUTFIELD: u8 = 0xb5;
const INVOKEVIRTUAL: u8 = 0xb6;
const INVOKEINTERFACE: u8 = 0xb9;
const NEW: u8 = 0xbb;
const ANEWARRAY: u8 = 0xbd;
const CHECKCAST: u8 = 0xc0;
const INSTANCEOF: u8 = 0xc1;
const WIDE: u8 = 0xc4;
const IINC: u8 = 0x84;

/// An instruction operand pointing into the constant pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// `new`, `anewarray`, `checkcast`, `instanceof`: a `Class` constant
    Type(u16),
    /// `getstatic`, `putstatic`, `getfield`, `putfield`: a `Fieldref`
    Field(u16),
    /// `invokevirtual`, `invokespecial`, `invokestatic`, `invokeinterface`
    Method(u16),
}

/// Total encoded length of the instruction at `pc` (opcode included)
fn instruction_len(code: &[u8], pc: usize) -> Result<usize, ClassFileError> {
    let opcode = code[pc];
    let len = match opcode {
        0x00..=0x0f => 1,
        0x10 => 2,
        0x11 => 3,
        0x12 => 2,
        0x13 | 0x14 => 3,
        0x15..=0x19 => 2,
        0x1a..=0x35 => 1,
        0x36..=0x3a => 2,
        0x3b..=0x83 => 1,
        IINC => 3,
        0x85..=0x98 => 1,
        0x99..=0xa8 => 3,
        0xa9 => 2,
        TABLESWITCH | LOOKUPSWITCH => return switch_len(code, pc),
        0xac..=0xb1 => 1,
        0xb2..=0xb8 => 3,
        INVOKEINTERFACE | 0xba => 5,
        NEW => 3,
        0xbc => 2,
        ANEWARRAY => 3,
        0xbe | 0xbf => 1,
        CHECKCAST | INSTANCEOF => 3,
        0xc2 | 0xc3 => 1,
        WIDE => match code.get(pc + 1) {
            Some(&IINC) => 6,
            Some(_) => 4,
            None => {
                return Err(ClassFileError::UnexpectedEof {
                    offset: pc + 1,
                    needed: 1,
                })
            }
        },
        0xc5 => 4,
        0xc6 | 0xc7 => 3,
        0xc8 | 0xc9 => 5,
        0xca | 0xfe | 0xff => 1,
        _ => return Err(ClassFileError::UnknownOpcode { opcode, pc }),
    };
    Ok(len)
}

/// `tableswitch` and `lookupswitch` pad to a 4-byte boundary relative to the
/// start of the code array, then carry a variable-length jump table.
fn switch_len(code: &[u8], pc: usize) -> Result<usize, ClassFileError> {
    let padding = (4 - (pc + 1) % 4) % 4;
    let mut reader = ByteReader::new(code);
    reader.seek(pc + 1 + padding)?;

    let _default = reader.i4()?;
    let table_len = if code[pc] == TABLESWITCH {
        let low = reader.i4()? as i64;
        let high = reader.i4()? as i64;
        let entries = (high - low + 1).max(0) as usize;
        8 + entries * 4
    } else {
        let pairs = reader.i4()?.max(0) as usize;
        4 + pairs * 8
    };

    Ok(1 + padding + 4 + table_len)
}

/// Every class-bearing operand in `code`, in instruction order
pub fn class_operands(code: &[u8]) -> Result<Vec<Operand>, ClassFileError> {
    let mut operands = Vec::new();
    let mut pc = 0;

    while pc < code.len() {
        let opcode = code[pc];
        let len = instruction_len(code, pc)?;
        if pc + len > code.len() {
            return Err(ClassFileError::UnexpectedEof {
                offset: code.len(),
                needed: pc + len - code.len(),
            });
        }

        let index = || u16::from_be_bytes([code[pc + 1], code[pc + 2]]);
        match opcode {
            NEW | ANEWARRAY | CHECKCAST | INSTANCEOF => operands.push(Operand::Type(index())),
            GETSTATIC..=PUTFIELD => operands.push(Operand::Field(index())),
            INVOKEVIRTUAL..=INVOKEINTERFACE => operands.push(Operand::Method(index())),
            _ => {}
        }

        pc += len;
    }

    Ok(operands)
}
