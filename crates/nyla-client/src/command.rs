use crate::error::CommandError;
use nyla_core::TrackerConfig;
use nyla_interfaces::PageviewOverrides;
use serde_json::{Map, Value};

/// A command accepted by the tracker facade.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Init(TrackerConfig),
    Pageview(Option<PageviewOverrides>),
    /// Any other command name. Ignored.
    Unsupported(String),
}

impl Command {
    /// Decodes the variadic page-snippet form `nyla(name, ...args)`.
    ///
    /// Only the first argument is read. A missing or `null` argument means
    /// an empty configuration for `init` and no overrides for `pageview`.
    pub fn from_call(name: &str, args: &[Value]) -> Result<Command, CommandError> {
        let first = args.first().filter(|value| !value.is_null());
        match name {
            "init" => match first {
                Some(value) => serde_json::from_value(value.clone())
                    .map(Command::Init)
                    .map_err(CommandError::MalformedConfig),
                None => Ok(Command::Init(TrackerConfig::default())),
            },
            "pageview" => match first {
                Some(Value::Object(fields)) => Ok(Command::Pageview(Some(overrides_from(fields)))),
                Some(other) => Err(CommandError::MalformedOverrides(json_type(other).to_string())),
                None => Ok(Command::Pageview(None)),
            },
            other => Ok(Command::Unsupported(other.to_string())),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Command::Init(_) => "init",
            Command::Pageview(_) => "pageview",
            Command::Unsupported(name) => name,
        }
    }
}

/// Reads each known field on its own, so one oddly typed field does not
/// discard the others. Unknown keys are ignored.
fn overrides_from(fields: &Map<String, Value>) -> PageviewOverrides {
    let text = |key: &str| fields.get(key).map(stringify);
    let clearable = |key: &str| {
        fields
            .get(key)
            .map(|value| (!value.is_null()).then(|| stringify(value)))
    };
    PageviewOverrides {
        url: text("url"),
        title: text("title"),
        referrer: clearable("referrer"),
        timestamp: clearable("timestamp"),
    }
}

/// String conversion of a JSON value as a browser performs it when building
/// query parameters (`String(value)`).
fn stringify(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => stringify(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
