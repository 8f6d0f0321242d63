use std::fmt;
use std::io::Write;
use std::str::FromStr;

use crate::container::{Container, Mode};
use crate::error::{MontyError, Result};

/// State for one run: the container every instruction works on, the insertion mode set by
/// the `stack`/`queue` lines and the stream program output is printed to.
pub struct ExecutionContext<W: Write> {
    pub container: Container,
    pub mode: Mode,
    pub out: W,
}

impl<W: Write> ExecutionContext<W> {
    pub fn new(out: W) -> Self {
        ExecutionContext {
            container: Container::new(),
            mode: Mode::default(),
            out,
        }
    }
}

///
/// # Opcodes
///
/// The closed set of instruction names. Resolving a name is a single `match`; anything not
/// listed here is an unknown instruction. `stack` and `queue` are not opcodes, the front end
/// consumes them before anything is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Push,
    Pall,
    Pint,
    Pop,
    Nop,
    Swap,
    Add,
    Sub,
    Div,
    Mul,
    Mod,
    Pchar,
    Pstr,
    Rotl,
    Rotr,
}

impl Opcode {
    #[cfg(test)]
    pub(crate) const ALL: [Opcode; 15] = [
        Opcode::Push,
        Opcode::Pall,
        Opcode::Pint,
        Opcode::Pop,
        Opcode::Nop,
        Opcode::Swap,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Div,
        Opcode::Mul,
        Opcode::Mod,
        Opcode::Pchar,
        Opcode::Pstr,
        Opcode::Rotl,
        Opcode::Rotr,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Opcode::Push => "push",
            Opcode::Pall => "pall",
            Opcode::Pint => "pint",
            Opcode::Pop => "pop",
            Opcode::Nop => "nop",
            Opcode::Swap => "swap",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Div => "div",
            Opcode::Mul => "mul",
            Opcode::Mod => "mod",
            Opcode::Pchar => "pchar",
            Opcode::Pstr => "pstr",
            Opcode::Rotl => "rotl",
            Opcode::Rotr => "rotr",
        }
    }
}

impl FromStr for Opcode {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        match s {
            "push" => Ok(Opcode::Push),
            "pall" => Ok(Opcode::Pall),
            "pint" => Ok(Opcode::Pint),
            "pop" => Ok(Opcode::Pop),
            "nop" => Ok(Opcode::Nop),
            "swap" => Ok(Opcode::Swap),
            "add" => Ok(Opcode::Add),
            "sub" => Ok(Opcode::Sub),
            "div" => Ok(Opcode::Div),
            "mul" => Ok(Opcode::Mul),
            "mod" => Ok(Opcode::Mod),
            "pchar" => Ok(Opcode::Pchar),
            "pstr" => Ok(Opcode::Pstr),
            "rotl" => Ok(Opcode::Rotl),
            "rotr" => Ok(Opcode::Rotr),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The arithmetic opcodes. Each consumes the front two values and leaves one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Div,
    Mul,
    Mod,
}

impl BinaryOp {
    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Div => "div",
            BinaryOp::Mul => "mul",
            BinaryOp::Mod => "mod",
        }
    }

    /// `second` is the value under the front, so `sub` is `second - front`. Returns `None`
    /// for `div` and `mod` by zero. Overflow wraps.
    pub fn apply(self, front: i32, second: i32) -> Option<i32> {
        match self {
            BinaryOp::Add => Some(second.wrapping_add(front)),
            BinaryOp::Sub => Some(second.wrapping_sub(front)),
            BinaryOp::Mul => Some(second.wrapping_mul(front)),
            BinaryOp::Div => (front != 0).then(|| second.wrapping_div(front)),
            BinaryOp::Mod => (front != 0).then(|| second.wrapping_rem(front)),
        }
    }
}

/// A resolved instruction, ready to run against an [ExecutionContext]. `push` carries its
/// already validated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Push(i32),
    Pall,
    Pint,
    Pop,
    Nop,
    Swap,
    Binary(BinaryOp),
    Pchar,
    Pstr,
    Rotl,
    Rotr,
}

impl Instruction {
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Push(_) => Opcode::Push,
            Instruction::Pall => Opcode::Pall,
            Instruction::Pint => Opcode::Pint,
            Instruction::Pop => Opcode::Pop,
            Instruction::Nop => Opcode::Nop,
            Instruction::Swap => Opcode::Swap,
            Instruction::Binary(BinaryOp::Add) => Opcode::Add,
            Instruction::Binary(BinaryOp::Sub) => Opcode::Sub,
            Instruction::Binary(BinaryOp::Div) => Opcode::Div,
            Instruction::Binary(BinaryOp::Mul) => Opcode::Mul,
            Instruction::Binary(BinaryOp::Mod) => Opcode::Mod,
            Instruction::Pchar => Opcode::Pchar,
            Instruction::Pstr => Opcode::Pstr,
            Instruction::Rotl => Opcode::Rotl,
            Instruction::Rotr => Opcode::Rotr,
        }
    }

    /// Runs the instruction. On error the container may already have been printed from but
    /// never partially rewritten: every check happens before the first mutation.
    pub fn execute<W: Write>(&self, ctx: &mut ExecutionContext<W>, line: usize) -> Result<()> {
        match *self {
            Instruction::Push(value) => {
                ctx.container.push(ctx.mode, value)?;
            }
            Instruction::Pall => {
                for value in ctx.container.iter() {
                    writeln!(ctx.out, "{}", value)?;
                }
            }
            Instruction::Pint => {
                let value = ctx
                    .container
                    .front_value()
                    .ok_or(MontyError::EmptyPint { line })?;
                writeln!(ctx.out, "{}", value)?;
            }
            Instruction::Pop => {
                ctx.container
                    .pop_front()
                    .ok_or(MontyError::EmptyPop { line })?;
            }
            Instruction::Nop => {}
            Instruction::Swap => {
                if !ctx.container.swap_front() {
                    return Err(MontyError::ShortStack { line, op: "swap" });
                }
            }
            Instruction::Binary(op) => {
                let (front, second) = ctx
                    .container
                    .top_two()
                    .ok_or(MontyError::ShortStack { line, op: op.name() })?;
                let result = op
                    .apply(front, second)
                    .ok_or(MontyError::DivisionByZero { line })?;
                ctx.container.collapse_front(result);
            }
            Instruction::Pchar => {
                let value = ctx
                    .container
                    .front_value()
                    .ok_or(MontyError::PcharEmpty { line })?;
                let byte = u8::try_from(value)
                    .ok()
                    .filter(u8::is_ascii)
                    .ok_or(MontyError::PcharRange { line })?;
                ctx.out.write_all(&[byte, b'\n'])?;
            }
            Instruction::Pstr => {
                let text: Vec<u8> = ctx
                    .container
                    .iter()
                    .map_while(|value| u8::try_from(value).ok())
                    .take_while(|byte| *byte != 0 && byte.is_ascii())
                    .collect();
                ctx.out.write_all(&text)?;
                ctx.out.write_all(b"\n")?;
            }
            Instruction::Rotl => ctx.container.rotate_left(),
            Instruction::Rotr => ctx.container.rotate_right(),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(mode: Mode, items: &[i32]) -> ExecutionContext<Vec<u8>> {
        let mut ctx = ExecutionContext::new(Vec::new());
        ctx.mode = mode;
        for v in items {
            Instruction::Push(*v).execute(&mut ctx, 1).unwrap();
        }
        ctx
    }

    fn output(ctx: &ExecutionContext<Vec<u8>>) -> String {
        String::from_utf8(ctx.out.clone()).unwrap()
    }

    fn values(ctx: &ExecutionContext<Vec<u8>>) -> Vec<i32> {
        ctx.container.iter().collect()
    }

    #[test]
    fn opcode_names_round_trip() {
        for op in Opcode::ALL {
            assert_eq!(op.name().parse::<Opcode>(), Ok(op));
        }
        assert!("froboz".parse::<Opcode>().is_err());
        assert!("stack".parse::<Opcode>().is_err());
        assert!("PUSH".parse::<Opcode>().is_err());
    }

    #[test]
    fn pall_prints_front_to_back() {
        let mut ctx = context(Mode::Stack, &[1, 2, 3]);
        Instruction::Pall.execute(&mut ctx, 4).unwrap();
        assert_eq!(output(&ctx), "3\n2\n1\n");

        let mut queue = context(Mode::Queue, &[1, 2, 3]);
        Instruction::Pall.execute(&mut queue, 4).unwrap();
        assert_eq!(output(&queue), "1\n2\n3\n");
    }

    #[test]
    fn pall_on_empty_prints_nothing() {
        let mut ctx = context(Mode::Stack, &[]);
        Instruction::Pall.execute(&mut ctx, 1).unwrap();
        assert_eq!(output(&ctx), "");
    }

    #[test]
    fn pint_and_pop() {
        let mut ctx = context(Mode::Stack, &[-5, 8]);
        Instruction::Pint.execute(&mut ctx, 3).unwrap();
        Instruction::Pop.execute(&mut ctx, 4).unwrap();
        Instruction::Pint.execute(&mut ctx, 5).unwrap();
        assert_eq!(output(&ctx), "8\n-5\n");
        Instruction::Pop.execute(&mut ctx, 6).unwrap();

        let err = Instruction::Pint.execute(&mut ctx, 7).unwrap_err();
        assert!(matches!(err, MontyError::EmptyPint { line: 7 }));
        let err = Instruction::Pop.execute(&mut ctx, 8).unwrap_err();
        assert!(matches!(err, MontyError::EmptyPop { line: 8 }));
    }

    #[test]
    fn nop_changes_nothing() {
        let mut ctx = context(Mode::Stack, &[1, 2]);
        Instruction::Nop.execute(&mut ctx, 3).unwrap();
        assert_eq!(values(&ctx), vec![2, 1]);
        assert_eq!(output(&ctx), "");
    }

    #[test]
    fn swap() {
        let mut ctx = context(Mode::Stack, &[1, 2, 3]);
        Instruction::Swap.execute(&mut ctx, 4).unwrap();
        assert_eq!(values(&ctx), vec![2, 3, 1]);
        ctx.container.check_links();

        let mut short = context(Mode::Stack, &[1]);
        let err = Instruction::Swap.execute(&mut short, 2).unwrap_err();
        assert_eq!(err.to_string(), "L2: can't swap, stack too short");
        assert_eq!(values(&short), vec![1]);
    }

    #[test]
    fn arithmetic_operand_order() {
        // stack is [front 3, second 10]
        let cases = [
            (BinaryOp::Add, 13),
            (BinaryOp::Sub, 7),
            (BinaryOp::Div, 3),
            (BinaryOp::Mul, 30),
            (BinaryOp::Mod, 1),
        ];
        for (op, expected) in cases {
            let mut ctx = context(Mode::Stack, &[99, 10, 3]);
            Instruction::Binary(op).execute(&mut ctx, 4).unwrap();
            assert_eq!(values(&ctx), vec![expected, 99], "{}", op.name());
            ctx.container.check_links();
        }
    }

    #[test]
    fn arithmetic_truncates_toward_zero() {
        let mut ctx = context(Mode::Stack, &[-7, 2]);
        Instruction::Binary(BinaryOp::Div).execute(&mut ctx, 3).unwrap();
        assert_eq!(values(&ctx), vec![-3]);

        let mut ctx = context(Mode::Stack, &[-7, 2]);
        Instruction::Binary(BinaryOp::Mod).execute(&mut ctx, 3).unwrap();
        assert_eq!(values(&ctx), vec![-1]);
    }

    #[test]
    fn arithmetic_wraps_on_overflow() {
        let mut ctx = context(Mode::Stack, &[i32::MIN, -1]);
        Instruction::Binary(BinaryOp::Div).execute(&mut ctx, 3).unwrap();
        assert_eq!(values(&ctx), vec![i32::MIN]);

        let mut ctx = context(Mode::Stack, &[i32::MAX, 1]);
        Instruction::Binary(BinaryOp::Add).execute(&mut ctx, 3).unwrap();
        assert_eq!(values(&ctx), vec![i32::MIN]);
    }

    #[test]
    fn arithmetic_on_short_stack() {
        for op in [BinaryOp::Add, BinaryOp::Sub, BinaryOp::Div, BinaryOp::Mul, BinaryOp::Mod] {
            let mut ctx = context(Mode::Stack, &[1]);
            let err = Instruction::Binary(op).execute(&mut ctx, 12).unwrap_err();
            assert_eq!(err.to_string(), format!("L12: can't {}, stack too short", op.name()));
            assert_eq!(values(&ctx), vec![1]);
        }
    }

    #[test]
    fn division_by_zero_consumes_nothing() {
        for op in [BinaryOp::Div, BinaryOp::Mod] {
            let mut ctx = context(Mode::Stack, &[4, 5, 0]);
            let err = Instruction::Binary(op).execute(&mut ctx, 6).unwrap_err();
            assert!(matches!(err, MontyError::DivisionByZero { line: 6 }));
            assert_eq!(values(&ctx), vec![0, 5, 4]);
        }
    }

    #[test]
    fn short_stack_is_checked_before_zero() {
        let mut ctx = context(Mode::Stack, &[0]);
        let err = Instruction::Binary(BinaryOp::Div).execute(&mut ctx, 2).unwrap_err();
        assert!(matches!(err, MontyError::ShortStack { line: 2, op: "div" }));
    }

    #[test]
    fn pchar() {
        let mut ctx = context(Mode::Stack, &[65]);
        Instruction::Pchar.execute(&mut ctx, 2).unwrap();
        assert_eq!(output(&ctx), "A\n");

        for bad in [200, 128, -1] {
            let mut ctx = context(Mode::Stack, &[bad]);
            let err = Instruction::Pchar.execute(&mut ctx, 2).unwrap_err();
            assert!(matches!(err, MontyError::PcharRange { line: 2 }));
        }

        let mut empty = context(Mode::Stack, &[]);
        let err = Instruction::Pchar.execute(&mut empty, 9).unwrap_err();
        assert!(matches!(err, MontyError::PcharEmpty { line: 9 }));
    }

    #[test]
    fn pchar_accepts_range_edges() {
        let mut ctx = context(Mode::Stack, &[127, 0]);
        Instruction::Pchar.execute(&mut ctx, 3).unwrap();
        Instruction::Pop.execute(&mut ctx, 4).unwrap();
        Instruction::Pchar.execute(&mut ctx, 5).unwrap();
        assert_eq!(ctx.out, vec![0, b'\n', 127, b'\n']);
    }

    #[test]
    fn pstr_stops_at_zero() {
        let mut ctx = context(Mode::Queue, &[72, 101, 0, 108]);
        Instruction::Pstr.execute(&mut ctx, 5).unwrap();
        assert_eq!(output(&ctx), "He\n");
        assert_eq!(values(&ctx), vec![72, 101, 0, 108]);
    }

    #[test]
    fn pstr_stops_out_of_range() {
        let mut ctx = context(Mode::Queue, &[72, 105, 128, 33]);
        Instruction::Pstr.execute(&mut ctx, 5).unwrap();
        let mut negative = context(Mode::Queue, &[79, 75, -33, 33]);
        Instruction::Pstr.execute(&mut negative, 5).unwrap();
        assert_eq!(output(&ctx), "Hi\n");
        assert_eq!(output(&negative), "OK\n");
    }

    #[test]
    fn pstr_on_empty_prints_newline() {
        let mut ctx = context(Mode::Stack, &[]);
        Instruction::Pstr.execute(&mut ctx, 1).unwrap();
        assert_eq!(output(&ctx), "\n");
    }

    #[test]
    fn rotl_rotr() {
        let mut ctx = context(Mode::Queue, &[1, 2, 3]);
        Instruction::Rotl.execute(&mut ctx, 4).unwrap();
        assert_eq!(values(&ctx), vec![2, 3, 1]);
        Instruction::Rotr.execute(&mut ctx, 5).unwrap();
        Instruction::Rotr.execute(&mut ctx, 6).unwrap();
        assert_eq!(values(&ctx), vec![3, 1, 2]);

        let mut empty = context(Mode::Queue, &[]);
        Instruction::Rotl.execute(&mut empty, 1).unwrap();
        Instruction::Rotr.execute(&mut empty, 2).unwrap();
        assert!(empty.container.is_empty());
    }

    #[test]
    fn instruction_reports_its_opcode() {
        assert_eq!(Instruction::Push(3).opcode(), Opcode::Push);
        assert_eq!(Instruction::Binary(BinaryOp::Mod).opcode(), Opcode::Mod);
        assert_eq!(Instruction::Binary(BinaryOp::Mod).opcode().name(), BinaryOp::Mod.name());
    }
}
