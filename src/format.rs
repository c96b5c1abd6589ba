//! Value formatting and composite templates.
//!
//! ## Examples
//!
//! ```rust
//! use textconv::format::{composite, format};
//! use textconv::{Culture, Value};
//!
//! let de = Culture::resolve(Some("de-DE"));
//! let value = Value::from(1234.5);
//! assert_eq!(format(Some(&value), Some("N2"), "", de).unwrap(), "1.234,50");
//! assert_eq!(format(None, None, "n/a", de).unwrap(), "n/a");
//!
//! let text = composite("{0,-4}|{1:D3}", &[Value::from("ab"), Value::from(7)], de).unwrap();
//! assert_eq!(text, "ab  |007");
//! ```

use crate::culture::Culture;
use crate::error::{Error, Result};
use crate::primitive::Primitive;
use crate::value::Value;

/// Formats `value` with `spec` under `culture`.
///
/// Absent values, `Null` and empty strings render as `empty`. Values without
/// a codec go through a `{0:spec}` composite template, which hands the spec to
/// the [`Opaque`](crate::Opaque) renderer.
pub fn format(value: Option<&Value>, spec: Option<&str>, empty: &str, culture: &Culture) -> Result<String> {
    let Some(value) = value else {
        return Ok(empty.to_string());
    };
    match value {
        Value::Null => Ok(empty.to_string()),
        Value::String(s) if s.is_empty() => Ok(empty.to_string()),
        Value::String(s) => Ok(s.clone()),
        Value::Bool(v) => v.format_with(spec, culture),
        Value::Char(v) => v.format_with(spec, culture),
        Value::I8(v) => v.format_with(spec, culture),
        Value::U8(v) => v.format_with(spec, culture),
        Value::I16(v) => v.format_with(spec, culture),
        Value::U16(v) => v.format_with(spec, culture),
        Value::I32(v) => v.format_with(spec, culture),
        Value::U32(v) => v.format_with(spec, culture),
        Value::I64(v) => v.format_with(spec, culture),
        Value::U64(v) => v.format_with(spec, culture),
        Value::F32(v) => v.format_with(spec, culture),
        Value::F64(v) => v.format_with(spec, culture),
        Value::Decimal(v) => v.format_with(spec, culture),
        Value::Guid(v) => v.format_with(spec, culture),
        Value::Date(v) => v.format_with(spec, culture),
        Value::Time(v) => v.format_with(spec, culture),
        Value::DateTime(v) => v.format_with(spec, culture),
        Value::DateTimeOffset(v) => v.format_with(spec, culture),
        Value::Duration(v) => v.format_with(spec, culture),
        Value::Enum(v) => v.format(spec),
        Value::Other(v) => match spec.filter(|s| !s.is_empty()) {
            None => v.format(None, culture),
            Some(spec) => composite(&fallback_template(spec), std::slice::from_ref(value), culture),
        },
    }
}

fn fallback_template(spec: &str) -> String {
    if spec == "0" {
        "{0}".to_string()
    } else {
        format!("{{0:{spec}}}")
    }
}

fn item(value: &Value, spec: Option<&str>, culture: &Culture) -> Result<String> {
    match value {
        Value::Other(v) => v.format(spec, culture),
        _ => format(Some(value), spec, "", culture),
    }
}

/// Widest composite alignment accepted.
const MAX_ALIGNMENT: u64 = 1_000_000;

fn number_at(chars: &[char], mut i: usize) -> (Option<i64>, usize) {
    let start = i;
    let negative = chars.get(i) == Some(&'-');
    if negative {
        i += 1;
    }
    let digits_start = i;
    while chars.get(i).is_some_and(char::is_ascii_digit) {
        i += 1;
    }
    if i == digits_start {
        return (None, start);
    }
    let text: String = chars[start..i].iter().collect();
    (text.parse().ok(), i)
}

/// Renders a composite template: `{index[,alignment][:spec]}` items with
/// `{{` and `}}` escapes.
///
/// # Errors
///
/// [`Error::InvalidFormat`] for malformed items, an index past `args` or an
/// alignment of a million or more.
pub fn composite(template: &str, args: &[Value], culture: &Culture) -> Result<String> {
    let malformed = |msg: &str| Error::invalid_format(template, msg);
    let chars: Vec<char> = template.chars().collect();
    let mut out = String::with_capacity(template.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '{' if chars.get(i + 1) == Some(&'{') => {
                out.push('{');
                i += 2;
            }
            '}' if chars.get(i + 1) == Some(&'}') => {
                out.push('}');
                i += 2;
            }
            '}' => return Err(malformed("unescaped '}'")),
            '{' => {
                let (index, next) = number_at(&chars, i + 1);
                let index = index
                    .and_then(|n| usize::try_from(n).ok())
                    .ok_or_else(|| malformed("expected an argument index"))?;
                i = next;

                let mut alignment = 0i64;
                if chars.get(i) == Some(&',') {
                    let (width, next) = number_at(&chars, i + 1);
                    alignment = width.ok_or_else(|| malformed("expected an alignment"))?;
                    if alignment.unsigned_abs() >= MAX_ALIGNMENT {
                        return Err(malformed("alignment too large"));
                    }
                    i = next;
                }

                let mut spec = None;
                if chars.get(i) == Some(&':') {
                    let close = chars[i + 1..]
                        .iter()
                        .position(|&c| c == '}')
                        .ok_or_else(|| malformed("unterminated item"))?;
                    spec = Some(chars[i + 1..i + 1 + close].iter().collect::<String>());
                    i += 1 + close;
                }

                if chars.get(i) != Some(&'}') {
                    return Err(malformed("unterminated item"));
                }
                i += 1;

                let arg = args
                    .get(index)
                    .ok_or_else(|| malformed("argument index out of range"))?;
                let text = item(arg, spec.as_deref(), culture)?;
                let width = alignment.unsigned_abs() as usize;
                if alignment < 0 {
                    out.push_str(&format!("{text:<width$}"));
                } else {
                    out.push_str(&format!("{text:>width$}"));
                }
            }
            ch => {
                out.push(ch);
                i += 1;
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Opaque;

    fn inv() -> &'static Culture {
        Culture::invariant()
    }

    #[test]
    fn test_empty_markers() {
        assert_eq!(format(None, Some("N2"), "-", inv()).unwrap(), "-");
        assert_eq!(format(Some(&Value::Null), None, "-", inv()).unwrap(), "-");
        assert_eq!(format(Some(&Value::from("")), None, "-", inv()).unwrap(), "-");
        assert_eq!(format(Some(&Value::from("x")), None, "-", inv()).unwrap(), "x");
    }

    #[test]
    fn test_display_only_opaque_ignores_spec() {
        let value = Value::from(Opaque::new(3.25));
        assert_eq!(format(Some(&value), None, "", inv()).unwrap(), "3.25");
        assert_eq!(format(Some(&value), Some("F1"), "", inv()).unwrap(), "3.25");
    }

    #[test]
    fn test_opaque_spec_reaches_renderer() {
        let value = Value::from(Opaque::formattable(3.75f64, |v, spec, culture| {
            v.format_with(Some(spec), culture)
        }));
        assert_eq!(format(Some(&value), Some("F1"), "", inv()).unwrap(), "3.8");
        assert_eq!(format(Some(&value), Some("00.000"), "", inv()).unwrap(), "03.750");
        assert_eq!(format(Some(&value), Some("0"), "", inv()).unwrap(), "3.75");
        assert_eq!(format(Some(&value), None, "", inv()).unwrap(), "3.75");
        assert_eq!(composite("[{0:F1}|{0}]", &[value], inv()).unwrap(), "[3.8|3.75]");

        let de = Culture::resolve(Some("de-DE"));
        let tagged = Value::from(Opaque::formattable(7u8, |v, spec, _| Ok(format!("<{spec}:{v}>"))));
        assert_eq!(format(Some(&tagged), Some("x"), "", de).unwrap(), "<x:7>");
        assert_eq!(format(Some(&tagged), Some("0"), "", de).unwrap(), "7");
    }

    #[test]
    fn test_fallback_template() {
        assert_eq!(fallback_template("0"), "{0}");
        assert_eq!(fallback_template("N2"), "{0:N2}");
    }

    #[test]
    fn test_composite() {
        let args = [Value::from(5), Value::from(true)];
        assert_eq!(composite("{{{0}}} {1}", &args, inv()).unwrap(), "{5} True");
        assert_eq!(composite("[{0,3}]", &args, inv()).unwrap(), "[  5]");
        assert_eq!(composite("{0:P0}", &[Value::from(0.25)], inv()).unwrap(), "25 %");
    }

    #[test]
    fn test_composite_errors() {
        let args = [Value::from(5)];
        assert!(composite("{1}", &args, inv()).is_err());
        assert!(composite("{0", &args, inv()).is_err());
        assert!(composite("}", &args, inv()).is_err());
        assert!(composite("{x}", &args, inv()).is_err());
    }

    #[test]
    fn test_alignment_is_bounded() {
        let args = [Value::from(5)];
        let err = composite("{0,2000000000}", &args, inv()).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { .. }));
        assert!(composite("{0,-1000000}", &args, inv()).is_err());
        assert_eq!(composite("{0,999999}", &args, inv()).unwrap().len(), 999_999);
    }

    #[test]
    fn test_invalid_spec_propagates() {
        let err = format(Some(&Value::from(5)), Some("Q"), "", inv()).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { .. }));
    }
}
