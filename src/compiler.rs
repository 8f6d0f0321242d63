use crate::error::{MontyError, Result};
use crate::instruction::{BinaryOp, Instruction, Opcode};

/// Turns an opcode token and its optional operand into an [Instruction].
///
/// Returns `Ok(None)` for comments, any opcode token starting with `#`. Unknown opcodes and
/// bad `push` operands fail with the line they were found on. Opcodes other than `push`
/// ignore their operand.
pub fn compile(opcode: &str, operand: Option<&str>, line: usize) -> Result<Option<Instruction>> {
    if opcode.starts_with('#') {
        return Ok(None);
    }
    let resolved = opcode
        .parse::<Opcode>()
        .map_err(|_| MontyError::UnknownInstruction {
            line,
            opcode: opcode.to_string(),
        })?;

    let instruction = match resolved {
        Opcode::Push => Instruction::Push(push_operand(operand, line)?),
        Opcode::Pall => Instruction::Pall,
        Opcode::Pint => Instruction::Pint,
        Opcode::Pop => Instruction::Pop,
        Opcode::Nop => Instruction::Nop,
        Opcode::Swap => Instruction::Swap,
        Opcode::Add => Instruction::Binary(BinaryOp::Add),
        Opcode::Sub => Instruction::Binary(BinaryOp::Sub),
        Opcode::Div => Instruction::Binary(BinaryOp::Div),
        Opcode::Mul => Instruction::Binary(BinaryOp::Mul),
        Opcode::Mod => Instruction::Binary(BinaryOp::Mod),
        Opcode::Pchar => Instruction::Pchar,
        Opcode::Pstr => Instruction::Pstr,
        Opcode::Rotl => Instruction::Rotl,
        Opcode::Rotr => Instruction::Rotr,
    };
    Ok(Some(instruction))
}

/// Validates a `push` operand: an optional leading `-` followed by decimal digits, whose
/// value fits in an `i32`. A lone `-` has no digits and pushes 0.
pub fn push_operand(operand: Option<&str>, line: usize) -> Result<i32> {
    let invalid = || MontyError::PushArgument { line };

    let raw = operand.ok_or_else(invalid)?;
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => (-1i64, rest),
        None => (1i64, raw),
    };
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let magnitude: i64 = match digits {
        "" if sign < 0 => 0,
        _ => digits.parse().map_err(|_| invalid())?,
    };
    i32::try_from(sign * magnitude).map_err(|_| invalid())
}
