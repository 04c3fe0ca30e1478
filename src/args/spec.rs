//! Declarative flag specifications and their translation to clap arguments

use crate::error::{Error, Result};
use clap::builder::{BoolishValueParser, ValueParser};
use clap::parser::{MatchesError, ValueSource};
use clap::{value_parser, Arg, ArgAction, ArgMatches};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::Path;

/// Options accepted in `ArgSpec::other`
const SUPPORTED_OPTIONS: &[&str] = &[
    "action", "choices", "const", "default", "dest", "help", "metavar", "nargs", "required",
    "type",
];

/// One command-line option: its aliases plus parser options
///
/// ```yaml
/// - names: ["-l", "--level"]
///   other:
///     action: store
///     default: INFO
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArgSpec {
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub other: Map<String, Value>,
}

impl ArgSpec {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            other: Map::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.other.insert(key.into(), value.into());
        self
    }

    pub fn list_from_json(json: &str) -> Result<Vec<ArgSpec>> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn list_from_yaml(yaml: &str) -> Result<Vec<ArgSpec>> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn list_from_yaml_file(path: &Path) -> Result<Vec<ArgSpec>> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::list_from_yaml(&content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    Store,
    StoreTrue,
    StoreFalse,
    StoreConst,
    Append,
    Count,
}

impl Action {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "store" => Some(Action::Store),
            "store_true" => Some(Action::StoreTrue),
            "store_false" => Some(Action::StoreFalse),
            "store_const" => Some(Action::StoreConst),
            "append" => Some(Action::Append),
            "count" => Some(Action::Count),
            _ => None,
        }
    }

    pub(crate) fn takes_values(self) -> bool {
        matches!(self, Action::Store | Action::Append)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueType {
    Str,
    Int,
    Float,
    Bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Nargs {
    Exactly(usize),
    Optional,
    ZeroOrMore,
    OneOrMore,
}

/// A validated `ArgSpec`
#[derive(Debug, Clone)]
pub(crate) struct ArgDef {
    /// Unique clap id; differs from `dest` when several specs share a destination
    pub(crate) id: String,
    pub(crate) dest: String,
    pub(crate) longs: Vec<String>,
    /// Single-dash names longer than one character, like `-lvl`
    pub(crate) single_dash: Vec<String>,
    pub(crate) shorts: Vec<char>,
    pub(crate) positional: bool,
    pub(crate) action: Action,
    pub(crate) value_type: ValueType,
    pub(crate) nargs: Option<Nargs>,
    pub(crate) default: Option<Value>,
    pub(crate) constant: Option<Value>,
    pub(crate) help: Option<String>,
    pub(crate) required: bool,
    pub(crate) choices: Vec<Value>,
    pub(crate) metavar: Option<String>,
}

impl ArgDef {
    pub(crate) fn compile(spec: &ArgSpec) -> Result<Self> {
        let Some(first_name) = spec.names.first() else {
            return Err(Error::InvalidSpec(
                "an argument needs at least one name".to_string(),
            ));
        };

        let mut longs = Vec::new();
        let mut single_dash = Vec::new();
        let mut shorts = Vec::new();
        let mut positionals = Vec::new();
        for name in &spec.names {
            if let Some(long) = name.strip_prefix("--") {
                if long.is_empty() {
                    return Err(Error::InvalidSpec(format!("invalid option name {name:?}")));
                }
                longs.push(long.to_string());
            } else if let Some(rest) = name.strip_prefix('-') {
                let mut chars = rest.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => shorts.push(c),
                    (Some(_), Some(_)) => single_dash.push(rest.to_string()),
                    (None, _) => {
                        return Err(Error::InvalidSpec(format!("invalid option name {name:?}")))
                    }
                }
            } else {
                positionals.push(name.clone());
            }
        }
        let positional = !positionals.is_empty();
        if positional && spec.names.len() > 1 {
            return Err(Error::InvalidSpec(format!(
                "positional argument can only have one name: {:?}",
                spec.names
            )));
        }

        let other = &spec.other;
        let dest = match string_option(other, "dest", first_name)? {
            Some(dest) => dest,
            None => longs
                .first()
                .map(String::as_str)
                .unwrap_or_else(|| first_name.trim_start_matches('-'))
                .replace('-', "_"),
        };

        if let Some(key) = other
            .keys()
            .find(|key| !SUPPORTED_OPTIONS.contains(&key.as_str()))
        {
            return Err(Error::UnsupportedOption {
                dest,
                key: key.clone(),
            });
        }

        let action = match string_option(other, "action", &dest)? {
            None => Action::Store,
            Some(name) => Action::parse(&name).ok_or_else(|| {
                Error::InvalidSpec(format!("unknown action {name:?} for '{dest}'"))
            })?,
        };
        if positional && !action.takes_values() {
            return Err(Error::InvalidSpec(format!(
                "action for positional '{dest}' must store a value"
            )));
        }

        let value_type = match string_option(other, "type", &dest)?.as_deref() {
            None | Some("str" | "string") => ValueType::Str,
            Some("int") => ValueType::Int,
            Some("float") => ValueType::Float,
            Some("bool") => ValueType::Bool,
            Some(name) => {
                return Err(Error::InvalidSpec(format!(
                    "unknown type {name:?} for '{dest}'"
                )))
            }
        };

        let nargs = match other.get("nargs") {
            None => None,
            Some(value) => Some(parse_nargs(value, &dest)?),
        };
        if nargs.is_some() && !action.takes_values() {
            return Err(Error::InvalidSpec(format!(
                "nargs is only allowed for store and append actions ('{dest}')"
            )));
        }
        if nargs == Some(Nargs::Exactly(0)) {
            return Err(Error::InvalidSpec(format!(
                "nargs for '{dest}' must be greater than 0"
            )));
        }

        let required = if positional {
            !matches!(nargs, Some(Nargs::Optional | Nargs::ZeroOrMore))
        } else {
            match other.get("required") {
                None => false,
                Some(Value::Bool(required)) => *required,
                Some(value) => {
                    return Err(Error::InvalidSpec(format!(
                        "required for '{dest}' must be a boolean, got {value}"
                    )))
                }
            }
        };

        let choices = match other.get("choices") {
            None => Vec::new(),
            Some(Value::Array(choices)) => choices.clone(),
            Some(value) => {
                return Err(Error::InvalidSpec(format!(
                    "choices for '{dest}' must be a list, got {value}"
                )))
            }
        };

        Ok(Self {
            id: dest.clone(),
            help: string_option(other, "help", &dest)?,
            metavar: string_option(other, "metavar", &dest)?,
            default: other.get("default").cloned(),
            constant: other.get("const").cloned(),
            dest,
            longs,
            single_dash,
            shorts,
            positional,
            action,
            value_type,
            nargs,
            required,
            choices,
        })
    }

    /// Option strings as typed on the command line
    pub(crate) fn option_strings(&self) -> Vec<String> {
        self.longs
            .iter()
            .chain(&self.single_dash)
            .map(|long| format!("--{long}"))
            .chain(self.shorts.iter().map(|short| format!("-{short}")))
            .collect()
    }

    /// Upper bound of values following the option, `usize::MAX` when unbounded
    pub(crate) fn max_values(&self) -> usize {
        if !self.action.takes_values() {
            return 0;
        }
        match self.nargs {
            None | Some(Nargs::Optional) => 1,
            Some(Nargs::Exactly(n)) => n,
            Some(Nargs::ZeroOrMore | Nargs::OneOrMore) => usize::MAX,
        }
    }

    /// Fewest values the argument accepts
    pub(crate) fn min_values(&self) -> usize {
        if !self.action.takes_values() {
            return 0;
        }
        match self.nargs {
            None | Some(Nargs::OneOrMore) => 1,
            Some(Nargs::Exactly(n)) => n,
            Some(Nargs::Optional | Nargs::ZeroOrMore) => 0,
        }
    }

    /// Clap argument for an option; positionals are collected by `ArgParse`
    pub(crate) fn to_clap(&self) -> Arg {
        let mut arg = Arg::new(self.id.clone());

        let mut longs = self.longs.iter().chain(&self.single_dash);
        if let Some(first) = longs.next() {
            arg = arg.long(first.clone());
        }
        for alias in longs {
            arg = arg.visible_alias(alias.clone());
        }
        let mut shorts = self.shorts.iter();
        if let Some(&first) = shorts.next() {
            arg = arg.short(first);
        }
        for &alias in shorts {
            arg = arg.visible_short_alias(alias);
        }

        arg = match self.action {
            Action::Store => arg.action(ArgAction::Set),
            Action::Append => arg.action(ArgAction::Append),
            Action::StoreTrue | Action::StoreFalse | Action::StoreConst => {
                arg.action(ArgAction::SetTrue)
            }
            Action::Count => arg.action(ArgAction::Count),
        };

        if self.action.takes_values() {
            arg = arg
                .value_parser(self.value_parser())
                .value_name(
                    self.metavar
                        .clone()
                        .unwrap_or_else(|| self.dest.to_uppercase()),
                )
                .allow_negative_numbers(matches!(
                    self.value_type,
                    ValueType::Int | ValueType::Float
                ));
            arg = match self.nargs {
                None => arg.num_args(1),
                Some(Nargs::Exactly(n)) => arg.num_args(n),
                Some(Nargs::Optional) => arg.num_args(0..=1),
                Some(Nargs::ZeroOrMore) => arg.num_args(0..),
                Some(Nargs::OneOrMore) => arg.num_args(1..),
            };
        }

        if let Some(help) = &self.help {
            arg = arg.help(help.clone());
        }
        arg.required(self.required)
    }

    fn value_parser(&self) -> ValueParser {
        match self.value_type {
            ValueType::Str => ValueParser::string(),
            ValueType::Int => value_parser!(i64).into(),
            ValueType::Float => value_parser!(f64).into(),
            ValueType::Bool => BoolishValueParser::new().into(),
        }
    }

    /// The value given on the command line, `None` when the option was absent
    pub(crate) fn extract(&self, matches: &ArgMatches) -> Result<Option<Value>> {
        match self.action {
            Action::StoreTrue | Action::StoreFalse | Action::StoreConst => {
                let present = matches
                    .try_get_one::<bool>(&self.id)
                    .map_err(|e| self.matches_error(e))?
                    .copied()
                    .unwrap_or(false);
                if !present {
                    return Ok(None);
                }
                Ok(Some(match self.action {
                    Action::StoreTrue => Value::Bool(true),
                    Action::StoreFalse => Value::Bool(false),
                    _ => self.constant.clone().unwrap_or(Value::Null),
                }))
            }
            Action::Count => {
                let count = matches
                    .try_get_one::<u8>(&self.id)
                    .map_err(|e| self.matches_error(e))?
                    .copied()
                    .unwrap_or(0);
                if count == 0 {
                    return Ok(None);
                }
                let base = self.default.as_ref().and_then(Value::as_i64).unwrap_or(0);
                Ok(Some(Value::from(base + i64::from(count))))
            }
            Action::Store => {
                if matches.value_source(&self.id) != Some(ValueSource::CommandLine) {
                    return Ok(None);
                }
                let values = match matches
                    .try_get_raw(&self.id)
                    .map_err(|e| self.matches_error(e))?
                {
                    Some(raw) => raw
                        .map(|v| self.convert(v))
                        .collect::<Result<Vec<_>>>()?,
                    None => Vec::new(),
                };
                Ok(Some(self.stored(values)))
            }
            Action::Append => {
                if matches.value_source(&self.id) != Some(ValueSource::CommandLine) {
                    return Ok(None);
                }
                let occurrences = matches
                    .try_get_raw_occurrences(&self.id)
                    .map_err(|e| self.matches_error(e))?;
                let mut converted = Vec::new();
                for occurrence in occurrences.into_iter().flatten() {
                    converted.push(
                        occurrence
                            .map(|v| self.convert(v))
                            .collect::<Result<Vec<_>>>()?,
                    );
                }
                Ok(Some(self.appended(converted)))
            }
        }
    }

    /// Value of a positional from the tokens assigned to it, `None` to use the default
    pub(crate) fn positional_value(&self, raw: &[OsString]) -> Result<Option<Value>> {
        if raw.is_empty() && self.min_values() == 0 {
            return Ok(match (self.nargs, &self.default) {
                (Some(Nargs::ZeroOrMore), None) => Some(Value::Array(Vec::new())),
                _ => None,
            });
        }
        let values = raw
            .iter()
            .map(|v| self.convert(v))
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(match self.action {
            Action::Append => self.appended(vec![values]),
            _ => self.stored(values),
        }))
    }

    fn stored(&self, values: Vec<Value>) -> Value {
        match self.nargs {
            None => values.into_iter().next().unwrap_or(Value::Null),
            Some(Nargs::Optional) => values
                .into_iter()
                .next()
                .or_else(|| self.constant.clone())
                .unwrap_or(Value::Null),
            Some(_) => Value::Array(values),
        }
    }

    // Values are appended to a list default, one push per occurrence
    fn appended(&self, occurrences: Vec<Vec<Value>>) -> Value {
        let mut items = match &self.default {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        };
        for values in occurrences {
            match self.nargs {
                None | Some(Nargs::Optional) => items.extend(values),
                Some(_) => items.push(Value::Array(values)),
            }
        }
        Value::Array(items)
    }

    /// Value used when the option is absent
    pub(crate) fn default_value(&self) -> Value {
        match (&self.default, self.action) {
            (Some(Value::String(text)), _) if self.value_type != ValueType::Str => self
                .convert_str(text)
                .unwrap_or_else(|_| Value::String(text.clone())),
            (Some(default), _) => default.clone(),
            (None, Action::StoreTrue) => Value::Bool(false),
            (None, Action::StoreFalse) => Value::Bool(true),
            (None, Action::Count) => Value::from(0),
            (None, _) => Value::Null,
        }
    }

    fn convert(&self, raw: &OsStr) -> Result<Value> {
        let text = raw
            .to_str()
            .ok_or_else(|| self.invalid(&raw.to_string_lossy(), "not valid UTF-8"))?;
        let value = self.convert_str(text)?;
        if !self.choices.is_empty() && !self.choices.contains(&value) {
            let choices: Vec<String> = self.choices.iter().map(Value::to_string).collect();
            return Err(self.invalid(
                text,
                &format!("invalid choice (choose from {})", choices.join(", ")),
            ));
        }
        Ok(value)
    }

    fn convert_str(&self, text: &str) -> Result<Value> {
        match self.value_type {
            ValueType::Str => Ok(Value::String(text.to_string())),
            ValueType::Int => text
                .parse::<i64>()
                .map(Value::from)
                .map_err(|e| self.invalid(text, &e.to_string())),
            ValueType::Float => {
                let number = text
                    .parse::<f64>()
                    .map_err(|e| self.invalid(text, &e.to_string()))?;
                Number::from_f64(number)
                    .map(Value::Number)
                    .ok_or_else(|| self.invalid(text, "not a finite number"))
            }
            ValueType::Bool => parse_boolish(text)
                .map(Value::Bool)
                .ok_or_else(|| self.invalid(text, "expected a boolean")),
        }
    }

    fn invalid(&self, value: &str, reason: &str) -> Error {
        Error::InvalidValue {
            dest: self.dest.clone(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    fn matches_error(&self, e: MatchesError) -> Error {
        Error::InvalidSpec(format!("argument '{}': {e}", self.dest))
    }
}

fn string_option(other: &Map<String, Value>, key: &str, dest: &str) -> Result<Option<String>> {
    match other.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(value) => Err(Error::InvalidSpec(format!(
            "{key} for '{dest}' must be a string, got {value}"
        ))),
    }
}

fn parse_nargs(value: &Value, dest: &str) -> Result<Nargs> {
    let invalid = || Error::InvalidSpec(format!("invalid nargs {value} for '{dest}'"));
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Nargs::Exactly)
            .ok_or_else(invalid),
        Value::String(s) => match s.as_str() {
            "?" => Ok(Nargs::Optional),
            "*" => Ok(Nargs::ZeroOrMore),
            "+" => Ok(Nargs::OneOrMore),
            digits => digits
                .parse::<usize>()
                .map(Nargs::Exactly)
                .map_err(|_| invalid()),
        },
        _ => Err(invalid()),
    }
}

/// Same spellings as clap's `BoolishValueParser`
fn parse_boolish(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Some(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dest_from_first_long_name() {
        let def = ArgDef::compile(&ArgSpec::new(["-lvl", "--log-level"])).unwrap();
        assert_eq!(def.dest, "log_level");
        assert_eq!(def.longs, vec!["log-level"]);
        assert_eq!(def.single_dash, vec!["lvl"]);
        assert!(def.shorts.is_empty());
    }

    #[test]
    fn test_dest_from_short_or_explicit() {
        let def = ArgDef::compile(&ArgSpec::new(["-t"])).unwrap();
        assert_eq!(def.dest, "t");

        let def = ArgDef::compile(&ArgSpec::new(["-t", "--this"]).with("dest", "that")).unwrap();
        assert_eq!(def.dest, "that");
        assert_eq!(def.shorts, vec!['t']);
    }

    #[test]
    fn test_positional_spec() {
        let def = ArgDef::compile(&ArgSpec::new(["input"])).unwrap();
        assert!(def.positional);
        assert!(def.required);

        let def = ArgDef::compile(&ArgSpec::new(["input"]).with("nargs", "?")).unwrap();
        assert!(!def.required);

        let err = ArgDef::compile(&ArgSpec::new(["input", "--input"])).unwrap_err();
        assert!(matches!(err, Error::InvalidSpec(_)));
    }

    #[test]
    fn test_invalid_specs() {
        assert!(matches!(
            ArgDef::compile(&ArgSpec::default()),
            Err(Error::InvalidSpec(_))
        ));
        assert!(matches!(
            ArgDef::compile(&ArgSpec::new(["--x"]).with("action", "explode")),
            Err(Error::InvalidSpec(_))
        ));
        assert!(matches!(
            ArgDef::compile(&ArgSpec::new(["--x"]).with("type", "complex")),
            Err(Error::InvalidSpec(_))
        ));
        assert!(matches!(
            ArgDef::compile(
                &ArgSpec::new(["--x"])
                    .with("action", "store_true")
                    .with("nargs", 2),
            ),
            Err(Error::InvalidSpec(_))
        ));
        assert!(matches!(
            ArgDef::compile(&ArgSpec::new(["--x"]).with("nargs", 0)),
            Err(Error::InvalidSpec(_))
        ));
    }

    #[test]
    fn test_unsupported_option() {
        let err = ArgDef::compile(&ArgSpec::new(["--x"]).with("widget", true)).unwrap_err();
        match err {
            Error::UnsupportedOption { dest, key } => {
                assert_eq!(dest, "x");
                assert_eq!(key, "widget");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_nargs_forms() {
        assert_eq!(parse_nargs(&json!(2), "x").unwrap(), Nargs::Exactly(2));
        assert_eq!(parse_nargs(&json!("3"), "x").unwrap(), Nargs::Exactly(3));
        assert_eq!(parse_nargs(&json!("?"), "x").unwrap(), Nargs::Optional);
        assert_eq!(parse_nargs(&json!("*"), "x").unwrap(), Nargs::ZeroOrMore);
        assert_eq!(parse_nargs(&json!("+"), "x").unwrap(), Nargs::OneOrMore);
        assert!(parse_nargs(&json!(-1), "x").is_err());
        assert!(parse_nargs(&json!("many"), "x").is_err());
    }

    #[test]
    fn test_default_values() {
        let def = ArgDef::compile(&ArgSpec::new(["--flag"]).with("action", "store_true")).unwrap();
        assert_eq!(def.default_value(), json!(false));

        let def =
            ArgDef::compile(&ArgSpec::new(["--no-cache"]).with("action", "store_false")).unwrap();
        assert_eq!(def.default_value(), json!(true));

        let def = ArgDef::compile(&ArgSpec::new(["-v"]).with("action", "count")).unwrap();
        assert_eq!(def.default_value(), json!(0));

        // String defaults go through the declared type
        let def = ArgDef::compile(
            &ArgSpec::new(["--port"])
                .with("type", "int")
                .with("default", "8080"),
        )
        .unwrap();
        assert_eq!(def.default_value(), json!(8080));

        let def = ArgDef::compile(&ArgSpec::new(["--name"])).unwrap();
        assert_eq!(def.default_value(), Value::Null);
    }

    #[test]
    fn test_convert_checks_type_and_choices() {
        let def = ArgDef::compile(
            &ArgSpec::new(["--mode"]).with("choices", json!(["fast", "slow"])),
        )
        .unwrap();
        assert_eq!(def.convert(OsStr::new("fast")).unwrap(), json!("fast"));
        assert!(matches!(
            def.convert(OsStr::new("medium")),
            Err(Error::InvalidValue { .. })
        ));

        let def = ArgDef::compile(&ArgSpec::new(["--ratio"]).with("type", "float")).unwrap();
        assert_eq!(def.convert(OsStr::new("0.5")).unwrap(), json!(0.5));

        let def = ArgDef::compile(&ArgSpec::new(["--on"]).with("type", "bool")).unwrap();
        assert_eq!(def.convert(OsStr::new("yes")).unwrap(), json!(true));
        assert_eq!(def.convert(OsStr::new("off")).unwrap(), json!(false));
    }

    #[test]
    fn test_positional_value_from_tokens() {
        let files = ArgDef::compile(&ArgSpec::new(["files"]).with("nargs", "*")).unwrap();
        assert_eq!(files.positional_value(&[]).unwrap(), Some(json!([])));
        let tokens = [OsString::from("a"), OsString::from("b")];
        assert_eq!(
            files.positional_value(&tokens).unwrap(),
            Some(json!(["a", "b"]))
        );

        // Nothing given: the caller falls back to the default
        let mode = ArgDef::compile(
            &ArgSpec::new(["mode"])
                .with("nargs", "?")
                .with("default", "copy"),
        )
        .unwrap();
        assert_eq!(mode.positional_value(&[]).unwrap(), None);

        let port = ArgDef::compile(&ArgSpec::new(["port"]).with("type", "int")).unwrap();
        let tokens = [OsString::from("80")];
        assert_eq!(port.positional_value(&tokens).unwrap(), Some(json!(80)));
        let tokens = [OsString::from("eighty")];
        assert!(port.positional_value(&tokens).is_err());
    }

    #[test]
    fn test_spec_from_yaml() {
        let yaml = r#"
- names: ["-t", "--this"]
  other:
    action: store
    default: hello
- names: ["--count"]
  other:
    type: int
    default: 3
"#;
        let specs = ArgSpec::list_from_yaml(yaml).unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(
            specs[0],
            ArgSpec::new(["-t", "--this"])
                .with("action", "store")
                .with("default", "hello")
        );
        assert_eq!(specs[1].other.get("default"), Some(&json!(3)));
    }

    #[test]
    fn test_spec_from_json() {
        let json = r#"[{"names": ["-l", "--level"], "other": {"default": "WARN"}}]"#;
        let specs = ArgSpec::list_from_json(json).unwrap();
        assert_eq!(specs[0].names, vec!["-l", "--level"]);
        assert!(ArgSpec::list_from_json("{").is_err());
    }
}
