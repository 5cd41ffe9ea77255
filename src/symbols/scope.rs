//! Scope stack used while building the symbol table
//!
//! Scopes are named frames on top of the base `"global"` frame. A frame is opened by a
//! block header and stays *pending* until its body starts: an `Indent` right after the
//! header line binds the frame to that block depth, while a header line followed by
//! anything else (a one-line body) closes the frame at its `Newline`. A `Dedent` closes
//! every frame whose body is deeper than the new depth.
//!
//! Blocks opened by headers that do not create scopes (`try`, `with`, ...) only move the
//! depth, so their `Dedent` never pops a frame it did not open.

use std::rc::Rc;

pub const GLOBAL_SCOPE: &str = "global";

#[derive(Debug, Clone)]
struct Frame {
    name: String,
    /// Block depth of the frame's body; `None` until the body's `Indent` arrives.
    body_depth: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct ScopeStack {
    frames: Vec<Frame>,
    depth: usize,
    /// Names outermost first, rebuilt lazily after the stack changes.
    chain: Option<Rc<[String]>>,
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack {
            frames: vec![Frame {
                name: GLOBAL_SCOPE.to_string(),
                body_depth: Some(0),
            }],
            depth: 0,
            chain: None,
        }
    }

    /// Name of the innermost scope.
    pub fn current(&self) -> &str {
        self.frames
            .last()
            .map_or(GLOBAL_SCOPE, |frame| frame.name.as_str())
    }

    /// Number of open scopes, `"global"` included.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false: the global frame is never popped.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Current block depth (number of unmatched `Indent`s).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Scope names from `"global"` inwards. Shared until the stack changes.
    pub fn chain(&mut self) -> Rc<[String]> {
        if let Some(chain) = &self.chain {
            return Rc::clone(chain);
        }
        let chain: Rc<[String]> = self.frames.iter().map(|f| f.name.clone()).collect();
        self.chain = Some(Rc::clone(&chain));
        chain
    }

    /// Opens a pending scope for a block header.
    pub fn open(&mut self, name: impl Into<String>) {
        self.frames.push(Frame {
            name: name.into(),
            body_depth: None,
        });
        self.chain = None;
    }

    /// An `Indent`: binds pending frames to the new depth.
    pub fn enter_block(&mut self) {
        self.depth += 1;
        for frame in self.frames.iter_mut().rev() {
            if frame.body_depth.is_some() {
                break;
            }
            frame.body_depth = Some(self.depth);
        }
    }

    /// A `Dedent`: closes every frame whose body is deeper than the new depth.
    pub fn leave_block(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        while self.frames.len() > 1
            && self
                .frames
                .last()
                .is_some_and(|f| f.body_depth.map_or(true, |d| d > self.depth))
        {
            self.frames.pop();
            self.chain = None;
        }
    }

    /// A `Newline`: when no `Indent` follows, pending frames had a one-line body and
    /// close here.
    pub fn end_line(&mut self, body_follows: bool) {
        if body_follows {
            return;
        }
        while self.frames.len() > 1 && self.frames.last().is_some_and(|f| f.body_depth.is_none())
        {
            self.frames.pop();
            self.chain = None;
        }
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}
