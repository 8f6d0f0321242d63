use crate::container::Mode;

///
/// # Line Parser
///
/// Bytecode files are line oriented. Each line holds at most one instruction:
///
///```text
///   push 12      # opcode `push`, operand `12`
///   pall extra   # opcode `pall`, the operand is read and later ignored
///   queue        # switches `push` to queue mode, never dispatched
///                # blank, skipped but still counted
///   # anything   # a comment, handed on and skipped by the dispatcher
///```
///
/// Tokens are separated by ASCII whitespace. Only the first two tokens of a line matter,
/// everything after the operand is dropped. Line numbers start at 1 and count every line,
/// blank ones included, so diagnostics point at the line a user sees in an editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statement<'a> {
    Blank,
    Mode(Mode),
    Op {
        opcode: &'a str,
        operand: Option<&'a str>,
    },
}

pub fn parse_line(text: &str) -> Statement<'_> {
    let mut tokens = text.split_ascii_whitespace();
    let Some(opcode) = tokens.next() else {
        return Statement::Blank;
    };
    match opcode {
        "stack" => Statement::Mode(Mode::Stack),
        "queue" => Statement::Mode(Mode::Queue),
        _ => Statement::Op {
            opcode,
            operand: tokens.next(),
        },
    }
}

/// Numbers and parses every line of `source`.
pub fn lines(source: &str) -> impl Iterator<Item = (usize, Statement<'_>)> {
    source
        .lines()
        .enumerate()
        .map(|(index, text)| (index + 1, parse_line(text)))
}
