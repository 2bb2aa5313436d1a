//! Multi-character alias expansion.
//!
//! clap short options are single characters, so aliases such as `-fo` are
//! rewritten to their long form before the command line reaches clap.

use std::ffi::OsString;

use crate::compiler::{CompiledCommand, CompiledParser};

/// Rewrites `-<alias>` and `-<alias>=<value>` tokens to `--<long>`.
///
/// Rewriting applies to the tokens of the selected command only and stops
/// at the first `--`.
pub(crate) fn expand_aliases(parser: &CompiledParser, args: Vec<OsString>) -> Vec<OsString> {
    let mut out = Vec::with_capacity(args.len());
    let mut iter = args.into_iter();

    // Program name.
    if let Some(prog) = iter.next() {
        out.push(prog);
    }

    let mut command = if parser.is_multi_command() {
        None
    } else {
        parser.commands().first()
    };

    while let Some(arg) = iter.next() {
        let Some(text) = arg.to_str() else {
            out.push(arg);
            continue;
        };

        if text == "--" {
            out.push(arg);
            out.extend(iter);
            break;
        }

        match command {
            Some(compiled) => match expand_token(compiled, text) {
                Some(expanded) => out.push(expanded.into()),
                None => out.push(arg),
            },
            None => {
                if !text.starts_with('-') {
                    command = parser.commands().iter().find(|cmd| cmd.name() == text);
                }
                out.push(arg);
            }
        }
    }

    out
}

fn expand_token(command: &CompiledCommand, token: &str) -> Option<String> {
    let body = token.strip_prefix('-')?;
    if body.starts_with('-') {
        return None;
    }

    let (alias, value) = match body.split_once('=') {
        Some((alias, value)) => (alias, Some(value)),
        None => (body, None),
    };
    if alias.chars().count() < 2 {
        return None;
    }

    let option = command
        .options()
        .iter()
        .find(|option| option.alias.as_deref() == Some(alias))?;

    Some(match value {
        Some(value) => format!("--{}={value}", option.long()),
        None => format!("--{}", option.long()),
    })
}
