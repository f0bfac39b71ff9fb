//! `astro get|set|call` - Perform one suffix access against a scenario.

use std::path::Path;

use anyhow::Context;
use termcolor::ColorChoice;

use astro_host::{CpuContext, WorldHandle};
use astro_sdk::{AccessRequest, DispatchPolicy, Structure, SubjectId, Value};

use crate::output::StyledOutput;
use crate::target::{parse_literal, Target};

pub struct AccessOptions<'a> {
    pub scenario: &'a Path,
    pub target: &'a str,
    pub member: &'a str,
    pub cpu_vessel: Option<&'a str>,
    pub policy: DispatchPolicy,
    pub color: ColorChoice,
}

/// Kind of access requested on the command line
pub enum Mode {
    Get,
    Set(String),
    Call(Vec<String>),
}

/// Run the access. Returns the process exit code.
pub fn execute(opts: AccessOptions<'_>, mode: Mode) -> anyhow::Result<i32> {
    let world = WorldHandle::load(opts.scenario)
        .with_context(|| format!("Cannot load scenario {}", opts.scenario.display()))?;

    let vessel = match opts.cpu_vessel {
        Some(name) => SubjectId(world.read().vessel_by_name(name)?.id),
        None => world.cpu_subject(),
    };
    let ctx = CpuContext::new(vessel, opts.policy);

    let target: Target = opts.target.parse()?;
    let value = target.resolve(&world)?;
    let structure = value
        .as_structure()
        .context("Target did not resolve to a structure")?;

    let request = match mode {
        Mode::Get => AccessRequest::Get,
        Mode::Set(v) => AccessRequest::Set(parse_literal(&v)),
        Mode::Call(args) => AccessRequest::Call(args.iter().map(|a| parse_literal(a)).collect()),
    };
    tracing::debug!(target = %structure.label(), member = opts.member, "performing access");

    let mut out = StyledOutput::new(opts.color);
    let code = match structure.access(&ctx, opts.member, request) {
        Ok(Value::None) => {
            out.success("ok");
            out.newline();
            0
        }
        Ok(result) => {
            print_value(&mut out, &result);
            0
        }
        Err(err) => {
            out.script_error(&err);
            1
        }
    };
    out.flush();
    Ok(code)
}

fn print_value(out: &mut StyledOutput, value: &Value) {
    match value {
        Value::List(items) => {
            for item in items {
                out.plain("- ");
                out.plain(&item.to_string());
                out.newline();
            }
        }
        Value::Structure(s) => {
            out.info(&s.label());
            out.dim(&format!("  <{}>", s.type_name()));
            out.newline();
        }
        other => {
            out.plain(&other.to_string());
            out.newline();
        }
    }
}
