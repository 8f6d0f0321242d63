use std::io::Write;

use tracing::{debug, trace};

use crate::compiler;
use crate::container::{Container, Mode};
use crate::error::{report, MontyError, Result};
use crate::instruction::ExecutionContext;
use crate::parser::{self, Statement};

/// Runs bytecode one line at a time against a single [ExecutionContext].
///
/// The first failing line stops the run. Output printed before it stays printed. Callers
/// finish with [Interpreter::release] on every path, which empties the container and flushes
/// the output stream.
pub struct Interpreter<W: Write> {
    ctx: ExecutionContext<W>,
}

impl<W: Write> Interpreter<W> {
    pub fn new(out: W) -> Self {
        Interpreter {
            ctx: ExecutionContext::new(out),
        }
    }

    pub fn mode(&self) -> Mode {
        self.ctx.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if self.ctx.mode != mode {
            debug!(%mode, "insertion mode changed");
        }
        self.ctx.mode = mode;
    }

    pub fn container(&self) -> &Container {
        &self.ctx.container
    }

    /// Resolves `opcode`, validates the operand when it is a `push` and runs the instruction.
    pub fn dispatch(&mut self, opcode: &str, operand: Option<&str>, line: usize) -> Result<()> {
        let Some(instruction) = compiler::compile(opcode, operand, line)? else {
            trace!(line, "comment");
            return Ok(());
        };
        trace!(line, opcode = %instruction.opcode(), ?instruction, depth = self.ctx.container.len(), "dispatch");
        instruction.execute(&mut self.ctx, line)
    }

    /// Runs one already parsed line.
    pub fn step(&mut self, line: usize, statement: Statement<'_>) -> Result<()> {
        match statement {
            Statement::Blank => Ok(()),
            Statement::Mode(mode) => {
                self.set_mode(mode);
                Ok(())
            }
            Statement::Op { opcode, operand } => self.dispatch(opcode, operand, line),
        }
    }

    /// Runs every line of `source`, stopping at the first failure.
    pub fn run_source(&mut self, source: &str) -> Result<()> {
        for (line, statement) in parser::lines(source) {
            self.step(line, statement)?;
        }
        Ok(())
    }

    /// Releases every node still held, flushes the output stream and hands it back.
    pub fn release(mut self) -> Result<W> {
        let released = self.ctx.container.release_all();
        debug!(released, "container released");
        self.ctx.out.flush()?;
        Ok(self.ctx.out)
    }
}

/// A whole run: execute `source`, release the container, then report the first failure if
/// there was one. Returns the process exit status.
pub fn run<W: Write, E: Write>(source: &str, out: W, diag: &mut E) -> u8 {
    let mut interpreter = Interpreter::new(out);
    let outcome = interpreter.run_source(source);
    let released = interpreter.release();

    match outcome.and(released.map(drop)) {
        Ok(()) => 0,
        Err(err) => fail(&err, diag),
    }
}

fn fail(err: &MontyError, diag: &mut impl Write) -> u8 {
    debug!(line = ?err.line(), "run aborted");
    report(err, diag)
}
