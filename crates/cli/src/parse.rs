//! ArgMatches → LogConfig/CliAction conversion.
//!
//! Global flags override the configuration file; subcommands become a
//! `CliAction`.

use std::path::PathBuf;

use clap::ArgMatches;
use keepsake::{DurabilityMode, LogConfig, MediumSelect};

/// Directory used when neither a config file nor `--root` names one.
pub const DEFAULT_ROOT: &str = ".keepsake";

/// The result of parsing the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    /// Append `text` to `resource`.
    Append { resource: String, text: String },
    /// Stream `resource` to stdout.
    Cat { resource: String },
    /// Request a durable sync and wait for it.
    Sync,
    /// Record a visit and print the visit log.
    Demo,
    /// Draw the centered-text scene headlessly.
    Frames {
        count: u64,
        embedded: bool,
        resize: Option<(i32, i32)>,
    },
}

fn required(matches: &ArgMatches, name: &str) -> Result<String, String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .ok_or_else(|| format!("missing <{}>", name))
}

/// Convert clap ArgMatches into a CliAction.
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction, String> {
    let (sub_name, sub_matches) = matches
        .subcommand()
        .ok_or_else(|| "No command provided".to_string())?;

    match sub_name {
        "append" => {
            let resource = required(sub_matches, "resource")?;
            let mut text = required(sub_matches, "text")?;
            if sub_matches.get_flag("newline") {
                text.push('\n');
            }
            Ok(CliAction::Append { resource, text })
        }
        "cat" => Ok(CliAction::Cat {
            resource: required(sub_matches, "resource")?,
        }),
        "sync" => Ok(CliAction::Sync),
        "demo" => Ok(CliAction::Demo),
        "frames" => Ok(CliAction::Frames {
            count: sub_matches.get_one::<u64>("count").copied().unwrap_or(1),
            embedded: sub_matches.get_flag("embedded"),
            resize: sub_matches
                .get_one::<String>("resize")
                .map(|s| parse_size(s))
                .transpose()?,
        }),
        other => Err(format!("Unknown command: {}", other)),
    }
}

/// Load the configuration file (if any) and apply global flag overrides.
pub fn config_from_matches(matches: &ArgMatches) -> Result<LogConfig, String> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => LogConfig::from_file(path).map_err(|e| e.to_string())?,
        None => {
            let mut config = LogConfig::default();
            config.medium.kind = MediumSelect::Disk;
            config.medium.root = Some(PathBuf::from(DEFAULT_ROOT));
            config
        }
    };

    if let Some(root) = matches.get_one::<String>("root") {
        config.medium.root = Some(PathBuf::from(root));
        config.medium.kind = MediumSelect::Disk;
    }
    if matches.get_flag("virtual") {
        config.medium.kind = MediumSelect::Virtual;
    }
    if let Some(prefix) = matches.get_one::<String>("mount") {
        config.medium.mount = prefix.clone();
    }
    if let Some(name) = matches.get_one::<String>("durability") {
        config.durability = DurabilityMode::from_name(name)
            .ok_or_else(|| format!("Unknown durability mode: {}", name))?;
    }
    if let Some(bytes) = matches.get_one::<usize>("chunk-size") {
        config.chunk_size = *bytes;
    }
    Ok(config)
}

/// Parse `WIDTHxHEIGHT`.
pub fn parse_size(s: &str) -> Result<(i32, i32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("Expected WIDTHxHEIGHT, got '{}'", s))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<i32>()
            .map_err(|_| format!("Invalid dimension '{}' in '{}'", v, s))
    };
    Ok((parse(w)?, parse(h)?))
}
