//! `type:value` syntax for contract arguments on the command line.
//!
//! ```text
//! i128:42   bool:true   symbol:isin   string:hello world   address:G...
//! bytes:0xdeadbeef   void   vec:[u32:1,u32:2]   map:{symbol:rate=i128:4}
//! ```
//!
//! Inside `vec:` and `map:`, a string containing `,`, `=` or brackets must be
//! double-quoted: `vec:[string:"a,b",string:c]`. The quotes are stripped.

use anyhow::{anyhow, bail, Context, Result};
use debenture_client::legacy::{coerce_all, AddressHeuristic};
use debenture_client::Value;

/// Parse one typed argument
pub fn parse_value(input: &str) -> Result<Value> {
    let input = input.trim();
    if input == "void" {
        return Ok(Value::Void);
    }

    let (ty, raw) = input
        .split_once(':')
        .ok_or_else(|| anyhow!("argument '{}' must be written as type:value", input))?;

    let value = match ty {
        "void" => Value::Void,
        "bool" => Value::Bool(raw.parse().with_context(|| format!("invalid bool '{}'", raw))?),
        "u32" => Value::U32(parse_int(raw)?),
        "i32" => Value::I32(parse_int(raw)?),
        "u64" => Value::U64(parse_int(raw)?),
        "i64" => Value::I64(parse_int(raw)?),
        "u128" => Value::U128(parse_int(raw)?),
        "i128" => Value::I128(parse_int(raw)?),
        "bytes" => {
            let hex_str = raw.strip_prefix("0x").unwrap_or(raw);
            Value::Bytes(hex::decode(hex_str).with_context(|| format!("invalid hex '{}'", raw))?)
        }
        "string" => Value::String(unquote(raw).to_string()),
        "symbol" => Value::Symbol(unquote(raw).to_string()),
        "address" => Value::Address(unquote(raw).to_string()),
        "vec" => {
            let inner = delimited(raw, '[', ']')?;
            Value::Vec(
                split_top_level(inner, ',')
                    .into_iter()
                    .map(parse_value)
                    .collect::<Result<Vec<_>>>()?,
            )
        }
        "map" => {
            let inner = delimited(raw, '{', '}')?;
            let mut entries = Vec::new();
            for entry in split_top_level(inner, ',') {
                let parts = split_top_level(entry, '=');
                if parts.len() != 2 {
                    bail!("map entry '{}' must be written as key=value", entry);
                }
                entries.push((parse_value(parts[0])?, parse_value(parts[1])?));
            }
            Value::Map(entries)
        }
        other => bail!(
            "unknown argument type '{}' (expected one of void, bool, u32, i32, u64, i64, u128, i128, bytes, string, symbol, address, vec, map)",
            other
        ),
    };
    Ok(value)
}

/// Typed arguments, or the legacy JSON form when `json_args` is given
pub fn parse_args(typed: &[String], json_args: Option<&str>, rule: &AddressHeuristic) -> Result<Vec<Value>> {
    if let Some(json) = json_args {
        if !typed.is_empty() {
            bail!("--json-args cannot be combined with typed arguments");
        }
        let parsed: serde_json::Value =
            serde_json::from_str(json).context("--json-args is not valid JSON")?;
        let items = match parsed {
            serde_json::Value::Array(items) => items,
            other => vec![other],
        };
        return Ok(coerce_all(&items, rule)?);
    }
    typed.iter().map(|arg| parse_value(arg)).collect()
}

fn parse_int<T>(raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let cleaned = raw.trim().replace('_', "");
    cleaned
        .parse::<T>()
        .map_err(|e| anyhow!("invalid integer '{}': {}", raw, e))
}

fn unquote(raw: &str) -> &str {
    raw.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw)
}

fn delimited(raw: &str, open: char, close: char) -> Result<&str> {
    raw.trim()
        .strip_prefix(open)
        .and_then(|s| s.strip_suffix(close))
        .ok_or_else(|| anyhow!("expected '{}...{}', got '{}'", open, close, raw))
}

/// Split on `sep` outside of brackets, braces and double quotes; empty input gives no parts
fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    if s.trim().is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quoted = false;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '"' => quoted = !quoted,
            _ if quoted => {}
            '[' | '{' => depth += 1,
            ']' | '}' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(s[start..].trim());
    parts
}
