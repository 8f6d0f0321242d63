//!
//! # Monty
//!
//! Monty runs Monty bytecode files: one instruction per line, each working on a single shared
//! [Container](crate::container::Container) of integers that acts as either a stack or a queue.
//!
//! * The [parser](crate::parser) splits each line into an opcode and an optional operand, and
//! intercepts the `stack` and `queue` lines which switch the insertion mode
//! * The [compiler](crate::compiler) resolves an opcode into an
//! [Instruction](crate::instruction::Instruction), validating the operand of `push`
//! * The [Interpreter](crate::interpreter::Interpreter) executes each
//! [Instruction](crate::instruction::Instruction) against the
//! [ExecutionContext](crate::instruction::ExecutionContext) before the next line is read
//!
//! ## Stack or Queue
//!
//! The mode only decides where `push` puts a new value. Everything else reads and removes at
//! the front. For the program
//!
//! ```text
//! push 1
//! push 2
//! push 3
//! ```
//!
//! the container ends up as
//!
//! ```text
//! stack mode:  front (3) <-> (2) <-> (1) back
//! queue mode:  front (1) <-> (2) <-> (3) back
//! ```
//!
//! ## Arithmetic
//!
//! `add`, `sub`, `mul`, `div` and `mod` take the front value and the one behind it, release the
//! front node and leave the result in the node behind it. The front value is the right hand
//! operand:
//!
//! ```text
//! push 10      front (10)
//! push 3       front (3) <-> (10)
//! sub          front (7)          10 - 3
//! ```
//!
//! ## Failure
//!
//! Any failure is terminal. The first bad line ends the run with a single diagnostic on stderr
//! and exit status 1, after the container has been released. Anything already printed stays
//! printed.
//!
//! ```text
//! L<line>: unknown instruction <opcode>
//! L<line>: usage: push integer
//! L<line>: can't pint, stack empty
//! L<line>: can't pop an empty stack
//! L<line>: can't <op>, stack too short
//! L<line>: can't pchar, value out of range
//! L<line>: can't pchar, stack empty
//! Division by zero
//! ```
//!
//! # Examples
//!
//! ```
//! use monty::interpreter::Interpreter;
//!
//! let mut interpreter = Interpreter::new(Vec::new());
//! interpreter.run_source("push 1\npush 2\nadd\npall\n").unwrap();
//!
//! let output = interpreter.release().unwrap();
//! assert_eq!(String::from_utf8(output).unwrap(), "3\n");
//! ```
//!
//! A complete run, including the diagnostic, goes through [run](crate::interpreter::run):
//!
//! ```
//! let mut out = Vec::new();
//! let mut diag = Vec::new();
//!
//! let status = monty::interpreter::run("push 1\npop\npop\n", &mut out, &mut diag);
//!
//! assert_eq!(status, 1);
//! assert_eq!(String::from_utf8(diag).unwrap(), "L3: can't pop an empty stack\n");
//! ```

pub mod compiler;
pub mod container;
pub mod error;
pub mod instruction;
pub mod interpreter;
pub mod parser;
