//! `astro scope` - Check whether a flow-control keyword is legal in a position.

use astro_sdk::{Keyword, ScopeTracker};
use termcolor::ColorChoice;

use crate::output::StyledOutput;

/// Returns the process exit code.
pub fn execute(keyword: &str, in_function: bool, in_loop: bool, color: ColorChoice) -> anyhow::Result<i32> {
    let Some(keyword) = Keyword::parse(keyword) else {
        anyhow::bail!("Unknown keyword '{}'. Expected RETURN or BREAK", keyword);
    };

    let mut scope = ScopeTracker::new();
    if in_function {
        scope.enter_function();
    }
    if in_loop {
        scope.enter_loop();
    }

    let mut out = StyledOutput::new(color);
    let code = match scope.resolve(keyword) {
        Ok(()) => {
            out.success(&format!("{} is valid here", keyword));
            out.newline();
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
