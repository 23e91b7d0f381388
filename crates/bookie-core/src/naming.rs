//! Canonical naming for markets and market groups.
//!
//! Derives the stable, language-keyed description of a dynamic market by
//! substituting computed values (team names, handicap pair, over/under
//! line) into the authored template, and appends the synthetic `_dynamic`
//! keys so that two differently-parameterized instances of the same
//! template never compare equal.

use crate::types::{
    Description, DynamicParams, KEY_DYNAMIC, KEY_HANDICAP_AWAY, KEY_HANDICAP_HOME, KEY_OVER_UNDER,
};
use crate::{Error, Result};

/// Capitalize the first letter of every whitespace-separated word.
pub fn capitalize_words(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Format a numeric substitution value the way templates expect: integral
/// values without a decimal point, half-integer lines as `3.5`.
pub fn format_num(value: f64) -> String {
    format!("{value}")
}

/// Replace `{name}` placeholders from the variable table. `{{` and `}}`
/// escape literal braces. An unresolved placeholder is an authoring
/// defect.
pub fn substitute(template: &str, vars: &[(&str, String)]) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => name.push(c),
                        None => {
                            return Err(Error::MalformedRule(format!(
                                "unterminated placeholder in template '{template}'"
                            )))
                        }
                    }
                }
                match vars.iter().find(|(k, _)| *k == name) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        return Err(Error::MalformedRule(format!(
                            "unknown placeholder '{{{name}}}' in template '{template}'"
                        )))
                    }
                }
            }
            c => out.push(c),
        }
    }
    Ok(out)
}

/// The substitution table for a market group's templates.
///
/// The score-baseline rule: the opponent's handicap becomes this side's
/// score baseline, floored at zero (`home_score = max(0, away)` and
/// symmetrically).
pub fn market_vars(teams: &[String; 2], dynamic: Option<&DynamicParams>) -> Vec<(&'static str, String)> {
    let mut vars = vec![
        ("teams.home", capitalize_words(&teams[0])),
        ("teams.away", capitalize_words(&teams[1])),
    ];
    match dynamic {
        Some(DynamicParams::Handicap { home, away }) => {
            vars.push(("handicaps.home", home.to_string()));
            vars.push(("handicaps.away", away.to_string()));
            vars.push(("handicaps.home_score", (*away).max(0).to_string()));
            vars.push(("handicaps.away_score", (*home).max(0).to_string()));
        }
        Some(DynamicParams::OverUnder(line)) => {
            vars.push(("overunder", format_num(*line)));
        }
        None => {}
    }
    vars
}

/// Render an authored description template into its comparable form:
/// substituted text per language, plus the synthetic disambiguation keys
/// for dynamic groups.
pub fn render_description(
    template: &Description,
    teams: &[String; 2],
    dynamic: Option<&DynamicParams>,
) -> Result<Description> {
    let vars = market_vars(teams, dynamic);
    let mut out = Description::new();
    for (key, text) in template.iter() {
        out.push(key, substitute(text, &vars)?);
    }
    match dynamic {
        Some(params @ DynamicParams::Handicap { home, away }) => {
            out.push(KEY_DYNAMIC, params.discriminator());
            out.push(KEY_HANDICAP_HOME, home.to_string());
            out.push(KEY_HANDICAP_AWAY, away.to_string());
        }
        Some(params @ DynamicParams::OverUnder(line)) => {
            out.push(KEY_DYNAMIC, params.discriminator());
            out.push(KEY_OVER_UNDER, format_num(*line));
        }
        None => {}
    }
    Ok(out)
}
