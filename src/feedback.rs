use std::io::{self, Write};

use crate::tracker::Judgment;

/// Cosmetic feedback fired on keystrokes and on finish.
pub trait Feedback {
    /// Called after each accepted keystroke with the judgment of the typed position.
    fn keystroke(&mut self, judgment: Judgment);
    fn finished(&mut self);
}

#[derive(Debug, Default)]
pub struct Silent;

impl Feedback for Silent {
    fn keystroke(&mut self, _judgment: Judgment) {}
    fn finished(&mut self) {}
}

/// Rings the terminal bell on mistakes and when a session ends.
#[derive(Debug)]
pub struct TerminalBell<W: Write> {
    out: W,
}

impl TerminalBell<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn ring(&mut self) {
        // a failed bell is not worth interrupting the session for
        let _ = self.out.write_all(b"\x07").and_then(|_| self.out.flush());
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Feedback for TerminalBell<W> {
    fn keystroke(&mut self, judgment: Judgment) {
        if judgment == Judgment::Incorrect {
            self.ring();
        }
    }

    fn finished(&mut self) {
        self.ring();
    }
}
