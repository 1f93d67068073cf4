//! Cast keyword resolution
//!
//! Cast hints can come from caller-influenced query configuration (for
//! example a metadata clause type). This is the only place a cast keyword
//! reaches generated SQL, so hints are parsed against a fixed allow-list and
//! re-rendered from the parsed form. Anything else becomes `CHAR`.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

static CAST_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(BINARY|CHAR|DATE|DATETIME|SIGNED|UNSIGNED|TIME|NUMERIC|DECIMAL)(?:\((\d+)(?:,\s?(\d+))?\))?$",
    )
    .expect("cast allow-list pattern is valid")
});

/// A validated backend cast keyword.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CastKeyword {
    Binary,
    Char,
    Date,
    DateTime,
    Signed,
    Unsigned,
    Time,
    Numeric { precision: u32, scale: Option<u32> },
    Decimal(Option<(u32, Option<u32>)>),
}

impl fmt::Display for CastKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CastKeyword::Binary => f.write_str("BINARY"),
            CastKeyword::Char => f.write_str("CHAR"),
            CastKeyword::Date => f.write_str("DATE"),
            CastKeyword::DateTime => f.write_str("DATETIME"),
            CastKeyword::Signed => f.write_str("SIGNED"),
            CastKeyword::Unsigned => f.write_str("UNSIGNED"),
            CastKeyword::Time => f.write_str("TIME"),
            CastKeyword::Numeric { precision, scale } => match scale {
                Some(scale) => write!(f, "NUMERIC({precision},{scale})"),
                None => write!(f, "NUMERIC({precision})"),
            },
            CastKeyword::Decimal(None) => f.write_str("DECIMAL"),
            CastKeyword::Decimal(Some((precision, scale))) => match scale {
                Some(scale) => write!(f, "DECIMAL({precision},{scale})"),
                None => write!(f, "DECIMAL({precision})"),
            },
        }
    }
}

/// Map a free-form type hint to an allow-listed cast keyword.
///
/// Never fails: unrecognized hints resolve to [`CastKeyword::Char`], and
/// `NUMERIC` without a precision resolves to [`CastKeyword::Signed`].
pub fn resolve_cast(type_hint: &str) -> CastKeyword {
    let normalized = type_hint.trim().to_ascii_uppercase();
    let Some(caps) = CAST_PATTERN.captures(&normalized) else {
        return CastKeyword::Char;
    };

    let precision = match caps.get(2).map(|m| m.as_str().parse::<u32>()) {
        Some(Ok(p)) => Some(p),
        Some(Err(_)) => return CastKeyword::Char,
        None => None,
    };
    let scale = match caps.get(3).map(|m| m.as_str().parse::<u32>()) {
        Some(Ok(s)) => Some(s),
        Some(Err(_)) => return CastKeyword::Char,
        None => None,
    };

    let keyword = &caps[1];
    // Only NUMERIC and DECIMAL accept a precision
    if precision.is_some() && keyword != "NUMERIC" && keyword != "DECIMAL" {
        return CastKeyword::Char;
    }

    match keyword {
        "BINARY" => CastKeyword::Binary,
        "CHAR" => CastKeyword::Char,
        "DATE" => CastKeyword::Date,
        "DATETIME" => CastKeyword::DateTime,
        "SIGNED" => CastKeyword::Signed,
        "UNSIGNED" => CastKeyword::Unsigned,
        "TIME" => CastKeyword::Time,
        "NUMERIC" => match precision {
            Some(precision) => CastKeyword::Numeric { precision, scale },
            None => CastKeyword::Signed,
        },
        "DECIMAL" => CastKeyword::Decimal(precision.map(|p| (p, scale))),
        _ => CastKeyword::Char,
    }
}
