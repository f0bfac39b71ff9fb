//! Keyword scope checking
//!
//! The compiler keeps a [`ScopeTracker`] while it walks a script and asks it
//! whether a control-flow keyword is legal at the current position. Frames
//! mark function bodies; each frame counts the loops opened inside it, so a
//! loop around a function declaration does not make `BREAK` legal inside the
//! function.

use std::fmt;

use crate::error::{SuffixError, SuffixResult};

/// Kind of lexical frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// Top level of a script file
    Global,
    /// Body of a user FUNCTION
    FunctionBody,
}

/// Control-flow keyword whose legality depends on the enclosing scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// `RETURN`
    Return,
    /// `BREAK`
    Break,
}

impl Keyword {
    /// Parse a keyword name, ignoring case
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "RETURN" => Some(Keyword::Return),
            "BREAK" => Some(Keyword::Break),
            _ => None,
        }
    }

    /// Keyword as written in scripts
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Return => "RETURN",
            Keyword::Break => "BREAK",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
struct Scope {
    frame: Frame,
    loops: usize,
}

/// Stack of lexical frames. The bottom frame is always [`Frame::Global`].
#[derive(Debug, Clone)]
pub struct ScopeTracker {
    frames: Vec<Scope>,
}

impl Default for ScopeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTracker {
    /// Tracker positioned at global scope
    pub fn new() -> Self {
        Self {
            frames: vec![Scope {
                frame: Frame::Global,
                loops: 0,
            }],
        }
    }

    /// Enter a FUNCTION body
    pub fn enter_function(&mut self) {
        self.frames.push(Scope {
            frame: Frame::FunctionBody,
            loops: 0,
        });
    }

    /// Leave the innermost FUNCTION body.
    ///
    /// # Panics
    /// Panics if the innermost frame is the global frame.
    pub fn exit_function(&mut self) {
        match self.frames.last() {
            Some(Scope {
                frame: Frame::FunctionBody,
                ..
            }) => {
                self.frames.pop();
            }
            _ => panic!("exit_function called at global scope"),
        }
    }

    /// Enter a loop body in the current frame
    pub fn enter_loop(&mut self) {
        self.top_mut().loops += 1;
    }

    /// Leave the innermost loop body in the current frame.
    ///
    /// # Panics
    /// Panics if the current frame has no open loop.
    pub fn exit_loop(&mut self) {
        let top = self.top_mut();
        assert!(top.loops > 0, "exit_loop called with no open loop");
        top.loops -= 1;
    }

    /// Innermost frame kind
    pub fn current(&self) -> Frame {
        self.top().frame
    }

    /// Check whether `keyword` is legal at the current position
    pub fn resolve(&self, keyword: Keyword) -> SuffixResult<()> {
        let top = self.top();
        let legal = match keyword {
            Keyword::Return => top.frame == Frame::FunctionBody,
            Keyword::Break => top.loops > 0,
        };
        if legal {
            return Ok(());
        }

        let (actual, expected) = match keyword {
            Keyword::Return => ("outside a FUNCTION", "in a FUNCTION body"),
            Keyword::Break => ("outside a loop", "in a loop body"),
        };
        tracing::debug!(keyword = keyword.as_str(), frame = ?top.frame, "keyword used out of scope");
        Err(SuffixError::command_invalid_here(keyword.as_str(), actual, expected))
    }

    fn top(&self) -> &Scope {
        // The global frame is never popped.
        &self.frames[self.frames.len() - 1]
    }

    fn top_mut(&mut self) -> &mut Scope {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }
}
