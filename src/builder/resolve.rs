use crate::ast::{Location, Type, Value, ValueKind};
use crate::error::BuilderError;
use itertools::Itertools;

/// Marker that introduces a relative location such as `$home`.
pub const LOCATION_MARKER: char = '$';

/// Turns the raw text of a form field into a typed value for parameter `name`.
///
/// `use_upstream` short-circuits to a reference to the upstream output named
/// `raw`. Unsupported types are always rejected.
pub fn resolve_value(
    name: &str,
    ty: &Type,
    raw: &str,
    use_upstream: bool,
) -> Result<Value, BuilderError> {
    if use_upstream {
        return Ok(Value::VarRef(raw.to_string()));
    }

    match ty.kind() {
        ValueKind::String => Ok(Value::String(raw.to_string())),
        ValueKind::Number => parse_integer(raw)
            .map(Value::Number)
            .ok_or_else(|| BuilderError::InvalidNumber {
                name: name.to_string(),
                raw: raw.to_string(),
            }),
        ValueKind::Enum => {
            let entries = ty.enum_entries();
            if entries.iter().any(|e| e == raw) {
                Ok(Value::Enum(raw.to_string()))
            } else {
                Err(BuilderError::InvalidEnum {
                    name: name.to_string(),
                    raw: raw.to_string(),
                    entries: entries.iter().join(", "),
                })
            }
        }
        ValueKind::Location => match raw.strip_prefix(LOCATION_MARKER) {
            Some(relative) if !relative.is_empty() => {
                Ok(Value::Location(Location::Relative(relative.to_string())))
            }
            _ => Err(BuilderError::UnsupportedLocation {
                name: name.to_string(),
                raw: raw.to_string(),
            }),
        },
        ValueKind::Boolean => Ok(Value::Boolean(raw == "true")),
        ValueKind::Entity => {
            let kind = match ty {
                Type::Entity(kind) => kind.clone(),
                other => other.to_string(),
            };
            Ok(Value::Entity {
                value: raw.to_string(),
                kind,
                display: None,
            })
        }
        ValueKind::Unsupported => Err(BuilderError::UnsupportedType {
            name: name.to_string(),
            type_name: ty.to_string(),
        }),
    }
}

/// Largest integer an `f64` holds exactly.
const MAX_EXACT_INTEGER: i64 = (1 << 53) - 1;

/// Integer parse over plain decimal text: an optional sign, digits, and an
/// optional fractional part that is truncated. Exponents and values outside
/// the exactly representable range are rejected.
fn parse_integer(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (trimmed, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    if fraction.is_some_and(|f| !all_digits(f)) {
        return None;
    }
    if !all_digits(whole.strip_prefix(['+', '-']).unwrap_or(whole)) {
        return None;
    }
    whole
        .parse::<i64>()
        .ok()
        .filter(|n| n.abs() <= MAX_EXACT_INTEGER)
        .map(|n| n as f64)
}
