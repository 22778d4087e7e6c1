//! Line-oriented browser over a stored state graph.
//!
//! Starts at the root (the lowest id) and walks parent-to-child edges. The
//! browser only reads; it never changes the store.

use std::io::{self, BufRead, Write};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

use crate::errors::{StoreError, StoreResult};
use crate::storage::state_store::{StateId, StoreHandle};
use crate::utils::render_game_state::render_position;

const HELP: &str = "\
commands:
  show | s      render the current position
  list | l      list children of the current position
  go N | g N    descend to child N
  back | b      return to the previous position
  random | r    descend to a random child
  help | h      show this help
  quit | q      leave the browser";

pub struct TreeBrowser<R, W> {
    handle: StoreHandle,
    input: R,
    out: W,
    current: StateId,
    history: Vec<StateId>,
    rng: StdRng,
}

impl<R: BufRead, W: Write> TreeBrowser<R, W> {
    pub fn open(handle: StoreHandle, input: R, out: W) -> StoreResult<Self> {
        Self::with_rng(handle, input, out, StdRng::from_rng(&mut rand::rng()))
    }

    pub fn with_rng(mut handle: StoreHandle, input: R, out: W, rng: StdRng) -> StoreResult<Self> {
        let root = handle.root_id()?.ok_or(StoreError::Empty)?;
        Ok(Self {
            handle,
            input,
            out,
            current: root,
            history: Vec::new(),
            rng,
        })
    }

    #[inline]
    pub fn current(&self) -> StateId {
        self.current
    }

    /// Steps taken from the root along the current path.
    #[inline]
    pub fn path_len(&self) -> usize {
        self.history.len()
    }

    /// Reads commands until `quit` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.out, "{HELP}")?;
        self.show()?;

        let mut line = String::new();
        loop {
            write!(self.out, "> ")?;
            self.out.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.out)?;
                return Ok(());
            }
            if self.handle_command(&line)? {
                return Ok(());
            }
        }
    }

    /// Runs one command; returns true when the browser should exit.
    pub fn handle_command(&mut self, line: &str) -> io::Result<bool> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(false);
        }

        let mut parts = trimmed.split_whitespace();
        let cmd = parts.next().unwrap_or_default();

        match cmd {
            "show" | "s" => self.show()?,
            "list" | "l" => self.list()?,
            "go" | "g" => match parts.next().map(str::parse::<usize>) {
                Some(Ok(index)) => self.descend_to_index(index)?,
                _ => writeln!(self.out, "usage: go N")?,
            },
            "back" | "b" => match self.history.pop() {
                Some(previous) => {
                    self.current = previous;
                    self.show()?;
                }
                None => writeln!(self.out, "already at the root")?,
            },
            "random" | "r" => self.descend_random()?,
            "help" | "h" => writeln!(self.out, "{HELP}")?,
            "quit" | "q" => return Ok(true),
            other => writeln!(self.out, "unknown command '{other}'; type help")?,
        }

        Ok(false)
    }

    fn show(&mut self) -> io::Result<()> {
        match self.handle.fetch(self.current) {
            Ok(position) => {
                writeln!(self.out, "{}", render_position(&position))?;
                writeln!(
                    self.out,
                    "#{}  {} to move  (depth {} on this path)",
                    self.current,
                    position.side_to_move.name(),
                    self.history.len()
                )
            }
            Err(e) => self.report(e),
        }
    }

    fn list(&mut self) -> io::Result<()> {
        let children = match self.handle.children_of(self.current) {
            Ok(children) => children,
            Err(e) => return self.report(e),
        };
        if children.is_empty() {
            return writeln!(self.out, "no stored children");
        }

        for (index, child) in children.iter().enumerate() {
            match self.handle.fetch(*child) {
                Ok(position) => writeln!(
                    self.out,
                    "{index:>4}  -> #{child}  ({} to move)",
                    position.side_to_move.name()
                )?,
                Err(e) => writeln!(self.out, "{index:>4}  -> #{child}  (unreadable: {e})")?,
            }
        }
        Ok(())
    }

    fn descend_to_index(&mut self, index: usize) -> io::Result<()> {
        let children = match self.handle.children_of(self.current) {
            Ok(children) => children,
            Err(e) => return self.report(e),
        };
        match children.get(index) {
            Some(child) => self.descend(*child),
            None => writeln!(
                self.out,
                "no child {index}; this position has {} children",
                children.len()
            ),
        }
    }

    fn descend_random(&mut self) -> io::Result<()> {
        let children = match self.handle.children_of(self.current) {
            Ok(children) => children,
            Err(e) => return self.report(e),
        };
        if children.is_empty() {
            return writeln!(self.out, "no stored children");
        }
        let pick = children[self.rng.random_range(0..children.len())];
        self.descend(pick)
    }

    fn descend(&mut self, child: StateId) -> io::Result<()> {
        self.history.push(self.current);
        self.current = child;
        self.show()
    }

    fn report(&mut self, e: StoreError) -> io::Result<()> {
        warn!(state_id = self.current, error = %e, "browser store read failed");
        writeln!(self.out, "store error: {e}")
    }
}
