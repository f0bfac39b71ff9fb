//! Dispatch resolver
//!
//! Turns `(name, AccessRequest)` into a call on the matching member's bound
//! closure. The resolver holds no state of its own: everything it needs is in
//! the member table, the target value and the execution context.
//!
//! Resolution order:
//! 1. Case-insensitive lookup; a miss is `MemberLookup` naming the requested
//!    string as written.
//! 2. The request is checked against the member's access kind; a mismatch is
//!    `ContextInvalidAccess`.
//! 3. The closure runs. Structured errors it returns pass through; host
//!    failures and panics become `Internal` carrying the member name.

use std::panic::{self, AssertUnwindSafe};

use crate::context::ExecutionContext;
use crate::error::{AccessViolation, SuffixError, SuffixResult};
use crate::member::{Arity, Binding, Member};
use crate::structure::AccessRequest;
use crate::table::MemberTable;
use crate::value::Value;

/// Resolve and perform one member access on `target`.
///
/// `label` is only evaluated when an error needs it.
pub fn dispatch<T: 'static>(
    table: &MemberTable<T>,
    target: &T,
    label: fn(&T) -> String,
    ctx: &dyn ExecutionContext,
    name: &str,
    request: AccessRequest,
) -> SuffixResult<Value> {
    let Some(member) = table.lookup(name) else {
        tracing::debug!(type_name = table.type_name(), suffix = name, "suffix lookup failed");
        return Err(SuffixError::lookup("member", name, label(target)));
    };

    tracing::trace!(
        type_name = table.type_name(),
        suffix = member.name(),
        request = request_kind(&request),
        "dispatching suffix"
    );

    let result = resolve(member, target, ctx, request)
        .map_err(|err| err.in_member(member.name(), || label(target)));

    if let Err(err) = &result {
        tracing::debug!(
            type_name = table.type_name(),
            suffix = member.name(),
            kind = ?err.kind(),
            "suffix access failed: {}",
            err
        );
    }
    result
}

fn resolve<T>(
    member: &Member<T>,
    target: &T,
    ctx: &dyn ExecutionContext,
    request: AccessRequest,
) -> SuffixResult<Value> {
    let call_sugar = ctx.policy().zero_arg_call_sugar;

    match (member.binding(), request) {
        (Binding::Get(get) | Binding::GetSet(get, _), AccessRequest::Get) => {
            guarded(|| get(target, ctx))
        }
        (Binding::Call0(call), AccessRequest::Get) if call_sugar => guarded(|| call(target, ctx)),
        (Binding::CallN(arity, call), AccessRequest::Get) if call_sugar && arity.admits(0) => {
            guarded(|| call(target, ctx, &[]))
        }
        (Binding::Call0(_), AccessRequest::Get) => Err(violation(AccessViolation::RequiresCall {
            arity: Arity::exact(0),
        })),
        (Binding::CallN(arity, _), AccessRequest::Get) => {
            Err(violation(AccessViolation::RequiresCall { arity: *arity }))
        }

        (Binding::GetSet(_, set), AccessRequest::Set(value)) => {
            guarded(|| set(target, ctx, value).map(|()| Value::None))
        }
        (Binding::Get(_), AccessRequest::Set(_)) => Err(violation(AccessViolation::ReadOnly)),
        (Binding::Call0(_) | Binding::CallN(..), AccessRequest::Set(_)) => {
            Err(violation(AccessViolation::NotAssignable))
        }

        (Binding::Get(get) | Binding::GetSet(get, _), AccessRequest::Call(args)) => {
            if args.is_empty() {
                guarded(|| get(target, ctx))
            } else {
                Err(violation(AccessViolation::NotCallable))
            }
        }
        (Binding::Call0(call), AccessRequest::Call(args)) => {
            if args.is_empty() {
                guarded(|| call(target, ctx))
            } else {
                Err(violation(AccessViolation::Arity {
                    expected: Arity::exact(0),
                    got: args.len(),
                }))
            }
        }
        (Binding::CallN(arity, call), AccessRequest::Call(args)) => {
            if arity.admits(args.len()) {
                guarded(|| call(target, ctx, &args))
            } else {
                Err(violation(AccessViolation::Arity {
                    expected: *arity,
                    got: args.len(),
                }))
            }
        }
    }
}

fn violation(violation: AccessViolation) -> SuffixError {
    SuffixError::violation(violation)
}

/// Run a member closure, turning a panic into a host failure
fn guarded(f: impl FnOnce() -> SuffixResult<Value>) -> SuffixResult<Value> {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        let msg = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        Err(SuffixError::Host(format!("panicked: {}", msg)))
    })
}

fn request_kind(request: &AccessRequest) -> &'static str {
    match request {
        AccessRequest::Get => "get",
        AccessRequest::Set(_) => "set",
        AccessRequest::Call(_) => "call",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{DetachedContext, DispatchPolicy};
    use crate::error::ErrorKind;

    struct Counter {
        value: i64,
    }

    fn label(c: &Counter) -> String {
        format!("COUNTER({})", c.value)
    }

    fn table() -> MemberTable<Counter> {
        let mut b = MemberTable::builder("Counter");
        b.get("VALUE", |c: &Counter, _| Ok(c.value));
        b.call0("DOUBLED", |c: &Counter, _| Ok(c.value * 2));
        b.call_n("ADD", Arity::range(0, 2), |c: &Counter, _, args| {
            Ok(c.value + args.iter().filter_map(Value::as_i64).sum::<i64>())
        });
        b.call1("TIMES", |c: &Counter, _, n: i64| Ok(c.value * n));
        b.call0("EXPLODE", |_: &Counter, _| -> SuffixResult<i64> { panic!("boom") });
        b.build()
    }

    fn run(name: &str, request: AccessRequest, ctx: &dyn ExecutionContext) -> SuffixResult<Value> {
        dispatch(&table(), &Counter { value: 5 }, label, ctx, name, request)
    }

    fn no_sugar() -> DetachedContext {
        DetachedContext {
            policy: DispatchPolicy {
                zero_arg_call_sugar: false,
            },
        }
    }

    #[test]
    fn test_bare_name_calls_zero_arg_method_with_sugar() {
        let ctx = DetachedContext::default();
        assert_eq!(run("doubled", AccessRequest::Get, &ctx).unwrap(), Value::Int(10));
        assert_eq!(run("ADD", AccessRequest::Get, &ctx).unwrap(), Value::Int(5));
    }

    #[test]
    fn test_bare_name_requires_call_without_sugar() {
        let err = run("DOUBLED", AccessRequest::Get, &no_sugar()).unwrap_err();
        assert_eq!(
            err,
            SuffixError::ContextInvalidAccess {
                member: "DOUBLED".into(),
                label: "COUNTER(5)".into(),
                violation: AccessViolation::RequiresCall {
                    arity: Arity::exact(0)
                },
            }
        );
    }

    #[test]
    fn test_bare_name_on_method_with_required_args() {
        let err = run("TIMES", AccessRequest::Get, &DetachedContext::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ContextInvalidAccess);
        assert!(err.to_string().contains("must be called with 1 argument(s)"));
    }

    #[test]
    fn test_call0_with_arguments_reports_arity() {
        let err = run(
            "DOUBLED",
            AccessRequest::Call(vec![Value::Int(1)]),
            &DetachedContext::default(),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Suffix DOUBLED on COUNTER(5) expects 0 argument(s) but was given 1"
        );
    }

    #[test]
    fn test_call_n_arity_range() {
        let ctx = DetachedContext::default();
        let two = AccessRequest::Call(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(run("add", two, &ctx).unwrap(), Value::Int(8));

        let three = AccessRequest::Call(vec![Value::Int(1); 3]);
        let err = run("add", three, &ctx).unwrap_err();
        assert!(err.to_string().contains("expects 0 to 2 argument(s) but was given 3"));
    }

    #[test]
    fn test_argument_type_mismatch() {
        let err = run(
            "TIMES",
            AccessRequest::Call(vec![Value::Str("x".into())]),
            &DetachedContext::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            SuffixError::ContextInvalidAccess {
                member: "TIMES".into(),
                label: "COUNTER(5)".into(),
                violation: AccessViolation::ArgumentType {
                    index: 0,
                    expected: "Scalar",
                    got: "String"
                },
            }
        );
    }

    #[test]
    fn test_set_on_method_is_not_assignable() {
        let err = run("TIMES", AccessRequest::Set(Value::Int(1)), &DetachedContext::default())
            .unwrap_err();
        assert!(matches!(
            err,
            SuffixError::ContextInvalidAccess {
                violation: AccessViolation::NotAssignable,
                ..
            }
        ));
    }

    #[test]
    fn test_property_called_with_empty_parens() {
        let ctx = DetachedContext::default();
        assert_eq!(run("VALUE", AccessRequest::Call(vec![]), &ctx).unwrap(), Value::Int(5));
        let err = run("VALUE", AccessRequest::Call(vec![Value::Int(1)]), &ctx).unwrap_err();
        assert!(matches!(
            err,
            SuffixError::ContextInvalidAccess {
                violation: AccessViolation::NotCallable,
                ..
            }
        ));
    }

    #[test]
    fn test_panic_becomes_internal_failure() {
        let err = run("EXPLODE", AccessRequest::Get, &DetachedContext::default()).unwrap_err();
        assert_eq!(
            err,
            SuffixError::Internal {
                member: "EXPLODE".into(),
                detail: "panicked: boom".into()
            }
        );
    }

    #[test]
    fn test_lookup_failure_keeps_requested_spelling() {
        let err = run("VaLuEs", AccessRequest::Get, &DetachedContext::default()).unwrap_err();
        assert_eq!(err, SuffixError::lookup("member", "VaLuEs", "COUNTER(5)"));
    }
}
