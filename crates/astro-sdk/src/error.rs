//! Script-level error taxonomy
//!
//! Every failure a member access can produce is one of the [`SuffixError`]
//! kinds below. All of them are recoverable at the language-engine boundary:
//! the engine turns them into an aborting script error report. Programmer
//! errors (duplicate registration, unbalanced scope frames) panic instead and
//! never appear here.

use std::fmt;

use crate::member::Arity;

/// Result type for dispatch and member closures
pub type SuffixResult<T> = Result<T, SuffixError>;

/// How an existing member was used in the wrong grammatical context
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessViolation {
    /// Assignment to a read-only property
    ReadOnly,
    /// Assignment to a callable member
    NotAssignable,
    /// Bare read of a member that needs arguments (or call sugar is disabled)
    RequiresCall {
        /// Arguments the member accepts
        arity: Arity,
    },
    /// Call with arguments on a plain property
    NotCallable,
    /// Call with an argument count outside the declared range
    Arity {
        /// Arguments the member accepts
        expected: Arity,
        /// Arguments supplied
        got: usize,
    },
    /// An argument could not be converted to the declared parameter type
    ArgumentType {
        /// Zero-based parameter position
        index: usize,
        /// Expected script type
        expected: &'static str,
        /// Supplied script type
        got: &'static str,
    },
    /// An assigned value could not be converted to the property type
    ValueType {
        /// Expected script type
        expected: &'static str,
        /// Supplied script type
        got: &'static str,
    },
}

impl fmt::Display for AccessViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessViolation::ReadOnly => write!(f, "is read-only"),
            AccessViolation::NotAssignable => write!(f, "is a method and cannot be assigned to"),
            AccessViolation::RequiresCall { arity } => {
                write!(f, "must be called with {} argument(s)", arity)
            }
            AccessViolation::NotCallable => write!(f, "is not callable with arguments"),
            AccessViolation::Arity { expected, got } => {
                write!(f, "expects {} argument(s) but was given {}", expected, got)
            }
            AccessViolation::ArgumentType {
                index,
                expected,
                got,
            } => write!(
                f,
                "expects argument {} to be a {} but was given a {}",
                index + 1,
                expected,
                got
            ),
            AccessViolation::ValueType { expected, got } => {
                write!(f, "expects a {} value but was given a {}", expected, got)
            }
        }
    }
}

/// Coarse classification of a [`SuffixError`], for logging and matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`SuffixError::MemberLookup`]
    MemberLookup,
    /// See [`SuffixError::ContextInvalidAccess`]
    ContextInvalidAccess,
    /// See [`SuffixError::WrongTargetContext`]
    WrongTargetContext,
    /// See [`SuffixError::CommandInvalidHere`]
    CommandInvalidHere,
    /// See [`SuffixError::Internal`] and [`SuffixError::Host`]
    Internal,
}

/// Structured error raised by suffix dispatch
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SuffixError {
    /// Name not found on the value (or a named sub-entity such as a module)
    #[error("Tried to look up {target_kind} {name} on {label}, but it was not found")]
    MemberLookup {
        /// What was searched for ("member", "module", ...)
        target_kind: String,
        /// The name exactly as requested
        name: String,
        /// Descriptive label of the value searched
        label: String,
    },

    /// Member exists but was used with the wrong access kind
    #[error("Suffix {member} on {label} {violation}")]
    ContextInvalidAccess {
        /// Canonical member name
        member: String,
        /// Descriptive label of the value
        label: String,
        /// What went wrong
        violation: AccessViolation,
    },

    /// Mutation attempted on an entity the running CPU does not control
    #[error("{member} can only be used on the vessel this CPU is running on, not on {label}")]
    WrongTargetContext {
        /// Canonical member name
        member: String,
        /// Descriptive label of the value
        label: String,
    },

    /// A keyword or command used outside its valid scope
    #[error("{keyword} cannot be used {actual}; it is only valid {expected}")]
    CommandInvalidHere {
        /// The offending keyword or command
        keyword: String,
        /// Where it was used
        actual: String,
        /// Where it may be used
        expected: String,
    },

    /// Unexpected failure inside a member closure
    #[error("Internal failure in suffix {member}: {detail}")]
    Internal {
        /// Canonical member name
        member: String,
        /// Underlying failure
        detail: String,
    },

    /// Failure reported by a host accessor; dispatch rewraps it as `Internal`
    #[error("Host failure: {0}")]
    Host(String),
}

impl SuffixError {
    /// Lookup failure for a named sub-entity of a value
    pub fn lookup(
        target_kind: impl Into<String>,
        name: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        SuffixError::MemberLookup {
            target_kind: target_kind.into(),
            name: name.into(),
            label: label.into(),
        }
    }

    /// Keyword/command scope failure
    pub fn command_invalid_here(
        keyword: impl Into<String>,
        actual: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        SuffixError::CommandInvalidHere {
            keyword: keyword.into(),
            actual: actual.into(),
            expected: expected.into(),
        }
    }

    /// Wrong-target failure; member and label are filled in by dispatch
    pub fn wrong_target() -> Self {
        SuffixError::WrongTargetContext {
            member: String::new(),
            label: String::new(),
        }
    }

    /// Access violation; member and label are filled in by dispatch
    pub fn violation(violation: AccessViolation) -> Self {
        SuffixError::ContextInvalidAccess {
            member: String::new(),
            label: String::new(),
            violation,
        }
    }

    /// Host accessor failure
    pub fn host(err: impl fmt::Display) -> Self {
        SuffixError::Host(err.to_string())
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SuffixError::MemberLookup { .. } => ErrorKind::MemberLookup,
            SuffixError::ContextInvalidAccess { .. } => ErrorKind::ContextInvalidAccess,
            SuffixError::WrongTargetContext { .. } => ErrorKind::WrongTargetContext,
            SuffixError::CommandInvalidHere { .. } => ErrorKind::CommandInvalidHere,
            SuffixError::Internal { .. } | SuffixError::Host(_) => ErrorKind::Internal,
        }
    }

    /// Stable documentation anchor for this error
    pub fn help_ref(&self) -> &'static str {
        match self {
            SuffixError::MemberLookup { .. } => "structures/suffixes#lookup",
            SuffixError::ContextInvalidAccess { .. } => "structures/suffixes#access",
            SuffixError::WrongTargetContext { .. } => "general/cpu-vessel#wrong-vessel",
            SuffixError::CommandInvalidHere { keyword, .. } => {
                match keyword.to_uppercase().as_str() {
                    "RETURN" => "command/flow-control#return",
                    "BREAK" => "command/flow-control#break",
                    _ => "command/flow-control",
                }
            }
            SuffixError::Internal { .. } | SuffixError::Host(_) => "general/errors#internal",
        }
    }

    /// Multi-line explanation shown under the one-line message
    pub fn verbose_message(&self) -> String {
        let explanation = match self {
            SuffixError::MemberLookup { target_kind, .. } => format!(
                "The {} you asked for does not exist on this value.\n\
                 Names are not case sensitive, but they must be spelled in full.\n\
                 Use :SUFFIXNAMES to list what this value supports.",
                target_kind
            ),
            SuffixError::ContextInvalidAccess { violation, .. } => match violation {
                AccessViolation::ReadOnly => {
                    "This suffix can be read but never SET.".to_string()
                }
                AccessViolation::NotAssignable => {
                    "Methods perform an action when called; they do not hold a value to SET."
                        .to_string()
                }
                AccessViolation::RequiresCall { .. } | AccessViolation::Arity { .. } => {
                    "Check the number of arguments in the parentheses after the suffix."
                        .to_string()
                }
                AccessViolation::NotCallable => {
                    "This suffix is a plain value; drop the arguments to read it.".to_string()
                }
                AccessViolation::ArgumentType { .. } | AccessViolation::ValueType { .. } => {
                    "The value supplied has the wrong type for this suffix.".to_string()
                }
            },
            SuffixError::WrongTargetContext { .. } => {
                "Scripts may observe any vessel, but they may only change\n\
                 the vessel their own CPU part is attached to."
                    .to_string()
            }
            SuffixError::CommandInvalidHere {
                keyword, expected, ..
            } => match keyword.to_uppercase().as_str() {
                "RETURN" => "Because RETURN causes the current user function to quit,\n\
                             it doesn't mean anything when it's not inside a\n\
                             user function."
                    .to_string(),
                "BREAK" => "BREAK exits the innermost loop, so it needs a loop\n\
                            around it in the same function."
                    .to_string(),
                _ => format!("{} only makes sense {}.", keyword, expected),
            },
            SuffixError::Internal { .. } | SuffixError::Host(_) => {
                "The simulation refused the operation or something unexpected\n\
                 happened while performing it. This is not a mistake in the script's syntax."
                    .to_string()
            }
        };
        format!("{}\n{}", self, explanation)
    }

    /// Fill in member name and label on errors raised inside member closures.
    ///
    /// `Host` failures become `Internal`. Fields that are already set are kept,
    /// so errors that carry their own context pass through unchanged.
    pub(crate) fn in_member(self, name: &str, label: impl FnOnce() -> String) -> Self {
        match self {
            SuffixError::Host(detail) => SuffixError::Internal {
                member: name.to_string(),
                detail,
            },
            SuffixError::ContextInvalidAccess {
                member,
                label: existing,
                violation,
            } if member.is_empty() || existing.is_empty() => SuffixError::ContextInvalidAccess {
                member: if member.is_empty() { name.to_string() } else { member },
                label: if existing.is_empty() { label() } else { existing },
                violation,
            },
            SuffixError::WrongTargetContext {
                member,
                label: existing,
            } if member.is_empty() || existing.is_empty() => SuffixError::WrongTargetContext {
                member: if member.is_empty() { name.to_string() } else { member },
                label: if existing.is_empty() { label() } else { existing },
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_message_keeps_requested_name() {
        let err = SuffixError::lookup("member", "nOsUcH", "PART(mk1pod,uid=7)");
        assert_eq!(
            err.to_string(),
            "Tried to look up member nOsUcH on PART(mk1pod,uid=7), but it was not found"
        );
        assert_eq!(err.kind(), ErrorKind::MemberLookup);
    }

    #[test]
    fn test_return_help_ref() {
        let err = SuffixError::command_invalid_here("RETURN", "outside a FUNCTION", "in a FUNCTION body");
        assert_eq!(err.help_ref(), "command/flow-control#return");
        assert!(err.verbose_message().contains("user function"));
    }

    #[test]
    fn test_in_member_wraps_host_failure() {
        let err = SuffixError::host("part was destroyed").in_member("MASS", || "PART(x)".into());
        assert_eq!(
            err,
            SuffixError::Internal {
                member: "MASS".into(),
                detail: "part was destroyed".into()
            }
        );
    }

    #[test]
    fn test_in_member_fills_blank_context_only() {
        let err = SuffixError::wrong_target().in_member("TAG", || "PART(a)".into());
        assert_eq!(
            err,
            SuffixError::WrongTargetContext {
                member: "TAG".into(),
                label: "PART(a)".into()
            }
        );

        let lookup = SuffixError::lookup("module", "FOO", "PART(a)");
        assert_eq!(lookup.clone().in_member("GETMODULE", || "ignored".into()), lookup);
    }

    #[test]
    fn test_arity_violation_message() {
        let v = AccessViolation::Arity {
            expected: Arity::exact(0),
            got: 2,
        };
        assert_eq!(v.to_string(), "expects 0 argument(s) but was given 2");
    }
}
