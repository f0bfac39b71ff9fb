//! Execution context: the dispatch engine's view of the running CPU
//!
//! The host implements this trait. Dispatch threads it into every member
//! closure so that mutating members can check they are allowed to act on
//! their target, without any ambient global state.

use crate::error::{SuffixError, SuffixResult};

/// Opaque identity of a host subject (for example a vessel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubjectId(pub u64);

/// Registry-wide dispatch policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchPolicy {
    /// Let a bare member name invoke a method whose arity admits zero
    /// arguments, as if it were written with empty parentheses.
    pub zero_arg_call_sugar: bool,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            zero_arg_call_sugar: true,
        }
    }
}

/// Context passed to every member access.
///
/// Implementations must answer without suspending or re-entering the
/// language engine.
pub trait ExecutionContext {
    /// Whether `subject` is the entity the running script controls
    fn is_current_subject(&self, subject: SubjectId) -> bool;

    /// Dispatch policy in effect
    fn policy(&self) -> DispatchPolicy {
        DispatchPolicy::default()
    }
}

/// Fail with `WrongTargetContext` unless `subject` is the current subject.
///
/// Mutating members call this before touching host state.
pub fn ensure_current_subject(ctx: &dyn ExecutionContext, subject: SubjectId) -> SuffixResult<()> {
    if ctx.is_current_subject(subject) {
        Ok(())
    } else {
        tracing::debug!(subject = subject.0, "mutation refused: not the current subject");
        Err(SuffixError::wrong_target())
    }
}

/// Context with no current subject. Every mutation check fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedContext {
    /// Dispatch policy reported by this context
    pub policy: DispatchPolicy,
}

impl ExecutionContext for DetachedContext {
    fn is_current_subject(&self, _subject: SubjectId) -> bool {
        false
    }

    fn policy(&self) -> DispatchPolicy {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(SubjectId);

    impl ExecutionContext for Fixed {
        fn is_current_subject(&self, subject: SubjectId) -> bool {
            subject == self.0
        }
    }

    #[test]
    fn test_ensure_current_subject() {
        let ctx = Fixed(SubjectId(3));
        assert!(ensure_current_subject(&ctx, SubjectId(3)).is_ok());
        let err = ensure_current_subject(&ctx, SubjectId(4)).unwrap_err();
        assert_eq!(err, SuffixError::wrong_target());
    }

    #[test]
    fn test_detached_context_refuses_everything() {
        let ctx = DetachedContext::default();
        assert!(!ctx.is_current_subject(SubjectId(0)));
        assert!(ctx.policy().zero_arg_call_sugar);
    }
}
