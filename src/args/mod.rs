//! Argument parser built from declarative specs
//!
//! Each [`ArgSpec`] names an option (`-t`, `--this`, `-lvl`, or a positional) and the
//! parser options for it. In known-args mode unrecognised tokens are handed back
//! instead of failing the parse.

pub mod level;
pub mod spec;

pub use level::{LogArgParser, DEFAULT_LEVEL_STR};
pub use spec::ArgSpec;

use crate::error::{Error, Result};
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use spec::ArgDef;
use std::collections::HashSet;
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::Path;
use tracing::debug;

/// Clap id collecting every positional token; `ArgParse` splits them per argument
const POSITIONALS_ID: &str = "__positionals";

/// Parsed values keyed by destination name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace {
    values: Map<String, Value>,
}

impl Namespace {
    pub fn get(&self, dest: &str) -> Option<&Value> {
        self.values.get(dest)
    }

    pub fn get_str(&self, dest: &str) -> Option<&str> {
        self.get(dest).and_then(Value::as_str)
    }

    pub fn get_i64(&self, dest: &str) -> Option<i64> {
        self.get(dest).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, dest: &str) -> Option<f64> {
        self.get(dest).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, dest: &str) -> Option<bool> {
        self.get(dest).and_then(Value::as_bool)
    }

    pub fn contains(&self, dest: &str) -> bool {
        self.values.contains_key(dest)
    }

    pub fn insert(&mut self, dest: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(dest.into(), value)
    }

    /// Overwrites entries with the ones from `other`
    pub fn update(&mut self, other: Namespace) {
        self.values.extend(other.values);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.values
    }
}

/// Outcome of [`ArgParse::parse`]
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    /// Every token was recognised
    All(Namespace),
    /// Known-args mode: the recognised values plus everything left over
    Known {
        namespace: Namespace,
        remaining: Vec<String>,
    },
}

impl Parsed {
    pub fn namespace(&self) -> &Namespace {
        match self {
            Parsed::All(namespace) => namespace,
            Parsed::Known { namespace, .. } => namespace,
        }
    }

    pub fn into_namespace(self) -> Namespace {
        match self {
            Parsed::All(namespace) => namespace,
            Parsed::Known { namespace, .. } => namespace,
        }
    }

    /// Unrecognised tokens, always empty for `Parsed::All`
    pub fn remaining(&self) -> &[String] {
        match self {
            Parsed::All(_) => &[],
            Parsed::Known { remaining, .. } => remaining,
        }
    }
}

/// Command-line parser assembled from a list of [`ArgSpec`]s
#[derive(Debug, Clone)]
pub struct ArgParse {
    command: Command,
    defs: Vec<ArgDef>,
    parse_all: bool,
    arg_dict: Namespace,
}

impl ArgParse {
    /// Registers every spec in order.
    ///
    /// With `parse_all` unset the parser runs in known-args mode.
    pub fn new(specs: &[ArgSpec], parse_all: bool) -> Result<Self> {
        // A repeated option keeps its last value instead of failing
        let mut command = Command::new(program_name())
            .no_binary_name(true)
            .args_override_self(true);
        let mut defs: Vec<ArgDef> = Vec::with_capacity(specs.len());
        let mut seen_options = HashSet::new();
        let mut seen_ids = HashSet::from([POSITIONALS_ID.to_string()]);

        for spec in specs {
            let mut def = ArgDef::compile(spec)?;

            for option in def.option_strings() {
                if !seen_options.insert(option.clone()) {
                    return Err(Error::DuplicateArgument(option));
                }
            }
            if def.positional && defs.iter().any(|d| d.positional && d.dest == def.dest) {
                return Err(Error::DuplicateArgument(def.dest));
            }

            let mut n = 1;
            while !seen_ids.insert(def.id.clone()) {
                n += 1;
                def.id = format!("{}#{n}", def.dest);
            }

            if !def.positional {
                command = command.arg(def.to_clap());
            }
            defs.push(def);
        }

        let positional_names: Vec<String> = defs
            .iter()
            .filter(|def| def.positional)
            .map(|def| def.metavar.clone().unwrap_or_else(|| def.dest.clone()))
            .collect();
        if !positional_names.is_empty() {
            command = command.arg(
                Arg::new(POSITIONALS_ID)
                    .action(ArgAction::Append)
                    .num_args(1..)
                    .allow_negative_numbers(true)
                    .value_name(positional_names.join(" ")),
            );
        }

        if seen_options.contains("-h") || seen_options.contains("--help") {
            command = command.disable_help_flag(true);
        }

        debug!("Built argument parser with {} arguments", defs.len());
        Ok(Self {
            command,
            defs,
            parse_all,
            arg_dict: Namespace::default(),
        })
    }

    /// Convenience for a spec list stored as YAML
    pub fn from_yaml_file(path: &Path, parse_all: bool) -> Result<Self> {
        Self::new(&ArgSpec::list_from_yaml_file(path)?, parse_all)
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn parse_all(&self) -> bool {
        self.parse_all
    }

    /// Values from the latest successful parse
    pub fn arg_dict(&self) -> &Namespace {
        &self.arg_dict
    }

    /// Parses the process arguments, skipping the program name
    pub fn parse(&mut self) -> Result<Parsed> {
        self.parse_from(env::args_os().skip(1))
    }

    /// Parses `args`; the first item is an argument, not the program name
    pub fn parse_from<I, T>(&mut self, args: I) -> Result<Parsed>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args: Vec<String> = args
            .into_iter()
            .map(|arg| arg.into().to_string_lossy().into_owned())
            .collect();
        let args = self.normalize(args);

        let (kept, remaining) = if self.parse_all {
            (args, Vec::new())
        } else {
            self.partition(args)
        };

        let matches = self.command.clone().try_get_matches_from(kept)?;
        let mut positional_chunks = self.split_positionals(&matches)?.into_iter();
        let mut namespace = Namespace::default();
        for def in &self.defs {
            let value = if def.positional {
                def.positional_value(&positional_chunks.next().unwrap_or_default())?
            } else {
                def.extract(&matches)?
            };
            match value {
                Some(value) => {
                    namespace.insert(def.dest.clone(), value);
                }
                None if !namespace.contains(&def.dest) => {
                    namespace.insert(def.dest.clone(), def.default_value());
                }
                None => {}
            }
        }

        if !remaining.is_empty() {
            debug!("Leaving unrecognised arguments: {:?}", remaining);
        }
        self.arg_dict = namespace.clone();

        Ok(if self.parse_all {
            Parsed::All(namespace)
        } else {
            Parsed::Known {
                namespace,
                remaining,
            }
        })
    }

    /// Hands the positional tokens out in declaration order.
    ///
    /// Each argument takes as many as it accepts while leaving enough for the
    /// minimum of the ones after it.
    fn split_positionals(&self, matches: &ArgMatches) -> Result<Vec<Vec<OsString>>> {
        let positionals: Vec<&ArgDef> = self.defs.iter().filter(|def| def.positional).collect();
        if positionals.is_empty() {
            return Ok(Vec::new());
        }
        let values: Vec<OsString> = matches
            .try_get_raw(POSITIONALS_ID)
            .map_err(|e| Error::InvalidSpec(format!("positional arguments: {e}")))?
            .map(|raw| raw.map(OsStr::to_os_string).collect())
            .unwrap_or_default();

        let mut still_needed: usize = positionals.iter().map(|def| def.min_values()).sum();
        let mut available = values.len();
        let mut values = values.into_iter();
        let mut chunks = Vec::with_capacity(positionals.len());
        for (index, def) in positionals.iter().enumerate() {
            still_needed -= def.min_values();
            let room = available.saturating_sub(still_needed);
            let take = def.max_values().min(room);
            if take < def.min_values() {
                let missing: Vec<&str> = positionals[index..]
                    .iter()
                    .filter(|def| def.min_values() > 0)
                    .map(|def| def.dest.as_str())
                    .collect();
                let message = format!(
                    "the following arguments are required: {}",
                    missing.join(", ")
                );
                return Err(self.usage_error(
                    ErrorKind::MissingRequiredArgument,
                    message,
                ));
            }
            chunks.push(values.by_ref().take(take).collect());
            available -= take;
        }

        let extra: Vec<String> = values
            .map(|value| value.to_string_lossy().into_owned())
            .collect();
        if !extra.is_empty() {
            return Err(self.usage_error(
                ErrorKind::UnknownArgument,
                format!("unrecognized arguments: {}", extra.join(" ")),
            ));
        }
        Ok(chunks)
    }

    fn usage_error(&self, kind: ErrorKind, message: String) -> Error {
        self.command.clone().error(kind, message).into()
    }

    /// Rewrites single-dash long options such as `-lvl` into `--lvl`
    fn normalize(&self, args: Vec<String>) -> Vec<String> {
        let mut normalized = Vec::with_capacity(args.len());
        let mut after_separator = false;
        for arg in args {
            if after_separator || arg == "--" {
                after_separator = true;
                normalized.push(arg);
                continue;
            }
            let is_single_dash_long = arg
                .strip_prefix('-')
                .filter(|rest| !rest.starts_with('-'))
                .map(|rest| rest.split('=').next().unwrap_or(rest))
                .is_some_and(|name| {
                    self.defs
                        .iter()
                        .any(|def| def.single_dash.iter().any(|s| s == name))
                });
            if is_single_dash_long {
                normalized.push(format!("-{arg}"));
            } else {
                normalized.push(arg);
            }
        }
        normalized
    }

    /// Splits `args` into tokens this parser understands and the rest
    fn partition(&self, args: Vec<String>) -> (Vec<String>, Vec<String>) {
        let mut kept = Vec::new();
        let mut remaining = Vec::new();
        let mut positional_room = self
            .defs
            .iter()
            .filter(|def| def.positional)
            .fold(0usize, |room, def| room.saturating_add(def.max_values()));

        let mut iter = args.into_iter().peekable();
        while let Some(arg) = iter.next() {
            if arg == "--" {
                let rest: Vec<String> = iter.by_ref().collect();
                let take = rest.len().min(positional_room);
                let mut rest = rest.into_iter();
                if take > 0 {
                    kept.push(arg);
                    kept.extend(rest.by_ref().take(take));
                }
                remaining.extend(rest);
                break;
            }

            if !is_option_like(&arg) {
                if positional_room > 0 {
                    positional_room -= 1;
                    kept.push(arg);
                } else {
                    remaining.push(arg);
                }
                continue;
            }

            match self.option_for(&arg) {
                Some((def, value_attached)) => {
                    kept.push(arg);
                    if value_attached {
                        continue;
                    }
                    let mut room = def.max_values();
                    while room > 0 {
                        match iter.next_if(|next| !is_option_like(next)) {
                            Some(value) => kept.push(value),
                            None => break,
                        }
                        room -= 1;
                    }
                }
                None => remaining.push(arg),
            }
        }
        (kept, remaining)
    }

    /// The definition `arg` refers to, and whether its value is attached (`--x=1`, `-x1`)
    fn option_for(&self, arg: &str) -> Option<(&ArgDef, bool)> {
        if let Some(long) = arg.strip_prefix("--") {
            let (name, attached) = match long.split_once('=') {
                Some((name, _)) => (name, true),
                None => (long, false),
            };
            return self
                .defs
                .iter()
                .find(|def| def.longs.iter().chain(&def.single_dash).any(|l| l == name))
                .map(|def| (def, attached));
        }

        let mut chars = arg.strip_prefix('-')?.chars();
        let short = chars.next()?;
        let def = self.defs.iter().find(|def| def.shorts.contains(&short))?;
        Some((def, !chars.as_str().is_empty()))
    }
}

/// Negative numbers are values, not options
fn is_option_like(arg: &str) -> bool {
    arg.len() > 1 && arg.starts_with('-') && arg.parse::<f64>().is_err()
}

fn program_name() -> String {
    env::args_os()
        .next()
        .as_deref()
        .map(Path::new)
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| crate::log::DEFAULT_NAME.to_string())
}
