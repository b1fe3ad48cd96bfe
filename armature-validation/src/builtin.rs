// Built-in rule library

use crate::{FieldLevel, FieldValue, Params, Rule, RuleRegistry};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;

// Common regex patterns
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$").unwrap()
});

static URL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap());

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

static ALPHA_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]+$").unwrap());

static ALPHANUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());

static NUMERIC_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?[0-9]+(?:\.[0-9]+)?$").unwrap());

static ALPHA_SPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z ]*$").unwrap());

/// Kind name of the opt-in letters-and-spaces rule
pub const ALPHA_SPACE: &str = "alpha_space";

/// Register every built-in rule kind.
pub fn register_all(registry: &mut RuleRegistry) {
    registry.register_rule("required", Rule::new(Params::None, required));

    registry.register_rule("email", Rule::new(Params::None, |fl| matches(fl, &EMAIL_REGEX)));
    registry.register_rule("url", Rule::new(Params::None, |fl| matches(fl, &URL_REGEX)));
    registry.register_rule("uuid", Rule::new(Params::None, |fl| matches(fl, &UUID_REGEX)));
    registry.register_rule("alpha", Rule::new(Params::None, |fl| matches(fl, &ALPHA_REGEX)));
    registry.register_rule(
        "alphanum",
        Rule::new(Params::None, |fl| matches(fl, &ALPHANUMERIC_REGEX)),
    );
    registry.register_rule("numeric", Rule::new(Params::None, numeric));

    registry.register_rule("min", Rule::new(Params::Number, |fl| compare(fl, Ordering::is_ge)));
    registry.register_rule("max", Rule::new(Params::Number, |fl| compare(fl, Ordering::is_le)));
    registry.register_rule("len", Rule::new(Params::Number, |fl| compare(fl, Ordering::is_eq)));
    registry.register_rule("gt", Rule::new(Params::Number, |fl| compare(fl, Ordering::is_gt)));
    registry.register_rule("gte", Rule::new(Params::Number, |fl| compare(fl, Ordering::is_ge)));
    registry.register_rule("lt", Rule::new(Params::Number, |fl| compare(fl, Ordering::is_lt)));
    registry.register_rule("lte", Rule::new(Params::Number, |fl| compare(fl, Ordering::is_le)));

    registry.register_rule("eq", Rule::new(Params::Any, equals));
    registry.register_rule("ne", Rule::new(Params::Any, |fl| !equals(fl)));
    registry.register_rule("oneof", Rule::new(Params::Required, one_of));

    registry.register_rule(
        "contains",
        Rule::new(Params::Required, |fl| {
            with_str(fl, |s, param| s.contains(param.as_str()))
        }),
    );
    registry.register_rule(
        "containsany",
        Rule::new(Params::Required, |fl| {
            with_str(fl, |s, param| s.chars().any(|c| param.contains(c)))
        }),
    );
    registry.register_rule(
        "excludesall",
        Rule::new(Params::Required, |fl| {
            with_str(fl, |s, param| !s.chars().any(|c| param.contains(c)))
        }),
    );
    registry.register_rule(
        "startswith",
        Rule::new(Params::Required, |fl| {
            with_str(fl, |s, param| s.starts_with(param.as_str()))
        }),
    );
    registry.register_rule(
        "endswith",
        Rule::new(Params::Required, |fl| {
            with_str(fl, |s, param| s.ends_with(param.as_str()))
        }),
    );
}

/// The `alpha_space` rule: letters and spaces only, empty passes.
pub fn alpha_space() -> Rule {
    Rule::new(Params::None, |fl| matches(fl, &ALPHA_SPACE_REGEX))
}

fn required(fl: &FieldLevel<'_>) -> bool {
    !fl.value().is_zero()
}

fn matches(fl: &FieldLevel<'_>, regex: &Regex) -> bool {
    fl.value().as_str().is_some_and(|s| regex.is_match(s))
}

fn numeric(fl: &FieldLevel<'_>) -> bool {
    match fl.value() {
        FieldValue::Str(s) => NUMERIC_REGEX.is_match(s),
        FieldValue::Int(_) | FieldValue::Uint(_) | FieldValue::Float(_) => true,
        _ => false,
    }
}

/// Order the value's magnitude against the first argument.
///
/// Integer magnitudes against integer arguments compare exactly.
fn ordering(fl: &FieldLevel<'_>) -> Option<Ordering> {
    let value = fl.value();
    if let (Some(value), Ok(param)) = (value.exact_magnitude(), fl.param().parse::<i128>()) {
        return Some(value.cmp(&param));
    }
    match (value.magnitude(), fl.param_f64()) {
        (Some(value), Some(param)) => value.partial_cmp(&param),
        _ => None,
    }
}

fn compare(fl: &FieldLevel<'_>, accept: fn(Ordering) -> bool) -> bool {
    ordering(fl).is_some_and(accept)
}

fn equals(fl: &FieldLevel<'_>) -> bool {
    match fl.value() {
        FieldValue::Str(s) => s == fl.args().join(" "),
        FieldValue::Bool(b) => fl.param().parse::<bool>().is_ok_and(|p| p == b),
        _ => ordering(fl) == Some(Ordering::Equal),
    }
}

fn one_of(fl: &FieldLevel<'_>) -> bool {
    match fl.value() {
        FieldValue::Str(s) => fl.args().iter().any(|a| a == s),
        value @ (FieldValue::Int(_) | FieldValue::Uint(_)) => {
            let rendered = value.to_string();
            fl.args().iter().any(|a| *a == rendered)
        }
        _ => false,
    }
}

/// Run a string check against the arguments re-joined into one parameter.
fn with_str(fl: &FieldLevel<'_>, check: impl Fn(&str, &String) -> bool) -> bool {
    let param = fl.args().join(" ");
    fl.value().as_str().is_some_and(|s| check(s, &param))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> RuleRegistry {
        RuleRegistry::with_builtins()
    }

    fn check(kind: &str, value: FieldValue<'_>, args: &[&str]) -> bool {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        registry().lookup(kind).unwrap().evaluate(value, &args)
    }

    #[test]
    fn test_required() {
        assert!(check("required", "x".into(), &[]));
        assert!(!check("required", "".into(), &[]));
        assert!(!check("required", 0i32.into(), &[]));
        assert!(!check("required", FieldValue::Nil, &[]));
    }

    #[test]
    fn test_email() {
        assert!(check("email", "ok@example.com".into(), &[]));
        assert!(check("email", "user+tag@example.co.uk".into(), &[]));
        assert!(!check("email", "test@testcom".into(), &[]));
        assert!(!check("email", "@example.com".into(), &[]));
        assert!(!check("email", "user@".into(), &[]));
        assert!(!check("email", 5i32.into(), &[]));
    }

    #[test]
    fn test_min_on_strings_counts_characters() {
        assert!(check("min", "securepass".into(), &["8"]));
        assert!(!check("min", "a12".into(), &["4"]));
        assert!(check("min", "ññññ".into(), &["4"]));
    }

    #[test]
    fn test_numeric_bounds() {
        assert!(check("min", 18i32.into(), &["18"]));
        assert!(!check("min", 17i32.into(), &["18"]));
        assert!(check("max", 2.5f64.into(), &["3"]));
        assert!(check("len", (&vec![1, 2]).into(), &["2"]));
        assert!(check("gt", 1u8.into(), &["0"]));
        assert!(!check("gt", 0u8.into(), &["0"]));
        assert!(check("lte", 0u8.into(), &["0"]));
        assert!(!check("lt", 10i64.into(), &["10"]));
    }

    #[test]
    fn test_bounds_reject_valueless_shapes() {
        assert!(!check("min", FieldValue::Nil, &["1"]));
        assert!(!check("max", true.into(), &["1"]));
    }

    #[test]
    fn test_character_sets() {
        assert!(check("containsany", "longpass1!".into(), &["!@#?*"]));
        assert!(!check("containsany", "securepass".into(), &["!@#?*"]));
        assert!(check("excludesall", "plain".into(), &["<>"]));
        assert!(!check("excludesall", "<b>".into(), &["<>"]));
        assert!(check("contains", "hello world".into(), &["lo", "wo"]));
    }

    #[test]
    fn test_prefix_suffix() {
        assert!(check("startswith", "armature".into(), &["arm"]));
        assert!(!check("startswith", "armature".into(), &["ture"]));
        assert!(check("endswith", "armature".into(), &["ture"]));
    }

    #[test]
    fn test_equality() {
        assert!(check("eq", "yes".into(), &["yes"]));
        assert!(check("eq", 3i32.into(), &["3"]));
        assert!(check("eq", true.into(), &["true"]));
        assert!(check("ne", "no".into(), &["yes"]));
        assert!(!check("ne", 3.0f64.into(), &["3"]));
    }

    #[test]
    fn test_equality_against_empty_param() {
        assert!(check("eq", "".into(), &[]));
        assert!(!check("eq", "x".into(), &[]));
        assert!(check("ne", "x".into(), &[]));
        assert!(!check("eq", 0i32.into(), &[]));

        let registry = registry();
        assert!(registry.lookup("eq").unwrap().params().check(&[]).is_ok());
        assert!(registry.lookup("ne").unwrap().params().check(&[]).is_ok());
    }

    #[test]
    fn test_large_integers_compare_exactly() {
        let limit = ["9007199254740992"];
        assert!(!check("max", 9_007_199_254_740_993u64.into(), &limit));
        assert!(check("max", 9_007_199_254_740_992u64.into(), &limit));
        assert!(check("gt", 9_007_199_254_740_993u64.into(), &limit));
        assert!(!check("eq", 9_007_199_254_740_993u64.into(), &limit));
        assert!(check("lt", i64::MIN.into(), &["-9223372036854775807"]));
        assert!(check("len", u64::MAX.into(), &["18446744073709551615"]));
    }

    #[test]
    fn test_fractional_bounds() {
        assert!(check("min", 3i32.into(), &["2.5"]));
        assert!(!check("max", 3i32.into(), &["2.5"]));
        assert!(check("lte", 2.5f64.into(), &["2.5"]));
    }

    #[test]
    fn test_one_of() {
        assert!(check("oneof", "green".into(), &["red", "green"]));
        assert!(!check("oneof", "blue".into(), &["red", "green"]));
        assert!(check("oneof", 2u32.into(), &["1", "2"]));
    }

    #[test]
    fn test_formats() {
        assert!(check("url", "https://example.com".into(), &[]));
        assert!(!check("url", "not a url".into(), &[]));
        assert!(check("uuid", "550e8400-e29b-41d4-a716-446655440000".into(), &[]));
        assert!(!check("uuid", "550e8400e29b41d4a716446655440000".into(), &[]));
        assert!(check("alpha", "abcXYZ".into(), &[]));
        assert!(!check("alpha", "abc xyz".into(), &[]));
        assert!(check("alphanum", "abc123".into(), &[]));
        assert!(check("numeric", "-12.5".into(), &[]));
        assert!(!check("numeric", "12a".into(), &[]));
        assert!(check("numeric", 12i32.into(), &[]));
    }

    #[test]
    fn test_alpha_space() {
        let rule = alpha_space();
        assert!(rule.evaluate("John Smith".into(), &[]));
        assert!(rule.evaluate("OnlyLetters".into(), &[]));
        assert!(rule.evaluate("".into(), &[]));
        assert!(!rule.evaluate("John123".into(), &[]));
        assert!(!rule.evaluate("Jane_Doe".into(), &[]));
    }
}
