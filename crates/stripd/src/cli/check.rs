//! `check` subcommand — parse a command locally without sending it.

use super::{CheckOutput, Result, StripCommand, print_json};

pub(super) fn cmd_check(text: &str, json: bool) -> Result<()> {
    let parsed = text.parse::<StripCommand>();

    if json {
        let output = match &parsed {
            Ok(cmd) => CheckOutput {
                valid: true,
                canonical: Some(cmd.to_string()),
                parsed: Some(cmd.clone()),
                error: None,
            },
            Err(e) => CheckOutput {
                valid: false,
                canonical: None,
                parsed: None,
                error: Some(e.to_string()),
            },
        };
        print_json(&output)?;
    } else if let Ok(cmd) = &parsed {
        println!("{cmd}");
    }

    parsed?;
    Ok(())
}
