//! Scriptlet rules: the native (AdGuard) `#%#//scriptlet(...)` syntax, its argument tokenizer, and
//! conversion from/to the uBlock Origin `##+js(...)` and Adblock Plus `#$#` syntaxes.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::lists::{
    self, RuleDialect, ABP_SCRIPTLET_EXCEPTION_MASK, ABP_SCRIPTLET_MASK, UBO_SCRIPTLET_MASK_RE,
};
use crate::resources::{ResourceStorage, UBO_ALIAS_NAME_MARKER};
use crate::utils::{
    escape_unescaped, split_outside_double_quotes, string_in_braces, substring_after,
    substring_before,
};

pub const ADG_SCRIPTLET_MARKER: &str = "#%#//scriptlet";
pub const ADG_SCRIPTLET_EXCEPTION_MARKER: &str = "#@%#//scriptlet";

pub const UBO_SCRIPTLET_MARKER: &str = "##+js";
pub const UBO_SCRIPTLET_EXCEPTION_MARKER: &str = "#@#+js";

/// Prefix given to Adblock Plus snippet names so they can be registered next to scriptlets.
pub const ABP_NAME_PREFIX: &str = "abp-";

const UBO_NAME_SUFFIX: &str = ".js";

/// A snippet call is a sequence of bare words and single or double quoted phrases.
static ABP_TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"'.*?'|".*?"|\S+"#).unwrap());

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ScriptletRuleError {
    #[error("not a scriptlet rule: {0}")]
    NotScriptletRule(String),
    #[error("invalid rule: {0}")]
    InvalidRule(String),
    #[error("scriptlet name is missing: {0}")]
    MissingScriptletName(String),
    #[error("not a uBlock Origin scriptlet rule: {0}")]
    NotUboScriptletRule(String),
    #[error("not an Adblock Plus snippet rule: {0}")]
    NotAbpSnippetRule(String),
}

/// States of the argument tokenizer. `Opened` is the start state and `Closed` the only accepting
/// one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizerState {
    /// Between arguments; separators are skipped.
    Opened,
    /// Inside a quoted argument.
    Param,
    /// The closing parenthesis was the last character.
    Closed,
}

/// A native scriptlet rule, split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptletRule {
    /// Everything before the scriptlet marker, carried through conversions as is.
    pub domains: String,
    pub exception: bool,
    pub name: String,
    pub args: Vec<String>,
}

impl ScriptletRule {
    pub fn parse(rule: &str) -> Result<Self, ScriptletRuleError> {
        parse_scriptlet_rule(rule)
    }
}

/// Parses `example.org#%#//scriptlet("name", "arg1", 'arg2')` and its `#@%#` exception form.
/// Any rule containing `#//scriptlet` is accepted; a missing `#%`/`#@%` leaves it a plain rule.
///
/// Inside an argument, a quote matching its delimiter only closes the argument when it is not
/// preceded by a backslash; an escaped delimiter is kept without the backslash.
pub fn parse_scriptlet_rule(rule: &str) -> Result<ScriptletRule, ScriptletRuleError> {
    let i = rule
        .find(lists::ADG_SCRIPTLET_MASK)
        .ok_or_else(|| ScriptletRuleError::NotScriptletRule(rule.to_string()))?;
    let (prefix, call) = (&rule[..i], &rule[i + lists::ADG_SCRIPTLET_MASK.len()..]);
    let (domains, exception) = if let Some(domains) = prefix.strip_suffix("#@%") {
        (domains, true)
    } else if let Some(domains) = prefix.strip_suffix("#%") {
        (domains, false)
    } else {
        (prefix, false)
    };

    let mut state = TokenizerState::Opened;
    let mut quote: Option<char> = None;
    let mut previous: Option<char> = None;
    let mut current = String::new();
    let mut args: Vec<String> = vec![];

    let mut chars = call.chars().peekable();
    while let Some(c) = chars.next() {
        match state {
            TokenizerState::Opened => match c {
                ' ' | '(' | ',' => (),
                '\'' | '"' => {
                    quote = Some(c);
                    state = TokenizerState::Param;
                }
                ')' => {
                    if chars.peek().is_none() {
                        state = TokenizerState::Closed;
                    }
                }
                _ => return Err(ScriptletRuleError::NotScriptletRule(rule.to_string())),
            },
            TokenizerState::Param => {
                if Some(c) != quote {
                    current.push(c);
                } else if previous == Some('\\') {
                    current.pop();
                    current.push(c);
                } else {
                    args.push(std::mem::take(&mut current));
                    quote = None;
                    state = TokenizerState::Opened;
                }
            }
            TokenizerState::Closed => break,
        }
        previous = Some(c);
    }

    if state != TokenizerState::Closed {
        return Err(ScriptletRuleError::InvalidRule(rule.to_string()));
    }

    let mut args = args.into_iter();
    let name = args
        .next()
        .ok_or_else(|| ScriptletRuleError::MissingScriptletName(rule.to_string()))?;

    Ok(ScriptletRule {
        domains: domains.to_string(),
        exception,
        name,
        args: args.collect(),
    })
}

/// Normalizes an argument to the double quoted form used by native rules.
///
/// A matching outer pair of single or double quotes is replaced, and any unescaped occurrence
/// of the other quote character inside is escaped. Unquoted arguments have their unescaped
/// double quotes escaped.
pub fn wrap_in_double_quotes(arg: &str) -> String {
    let quoted_with = |q: char| arg.len() >= 2 && arg.starts_with(q) && arg.ends_with(q);

    let inner = if quoted_with('\'') {
        escape_unescaped(&arg[1..arg.len() - 1], '"')
    } else if quoted_with('"') {
        escape_unescaped(&arg[1..arg.len() - 1], '\'')
    } else {
        escape_unescaped(arg, '"')
    };
    format!("\"{}\"", inner)
}

fn adg_rule(domains: &str, exception: bool, args: &[String]) -> String {
    let marker = if exception {
        ADG_SCRIPTLET_EXCEPTION_MARKER
    } else {
        ADG_SCRIPTLET_MARKER
    };
    format!("{}{}({})", domains, marker, args.join(", "))
}

/// Every converted rule must tokenize again, which fails e.g. for an argument ending in a
/// backslash that escapes the closing quote.
fn parsed_back(rule: &str, converted: Vec<String>) -> Result<Vec<String>, ScriptletRuleError> {
    match converted.iter().find(|c| parse_scriptlet_rule(c).is_err()) {
        Some(broken) => {
            log::debug!("Converted rule does not parse: {:?}", broken);
            Err(ScriptletRuleError::InvalidRule(rule.to_string()))
        }
        None => Ok(converted),
    }
}

/// Converts `example.org##+js(name, arg)` (or `##script:inject(...)`) into
/// `example.org#%#//scriptlet("ubo-name.js", "arg")`.
///
/// Arguments are split on `", "` without regard for quoting.
pub fn convert_ubo_to_adg(rule: &str) -> Result<Vec<String>, ScriptletRuleError> {
    if lists::is_comment(rule) {
        return Ok(vec![rule.to_string()]);
    }

    let marker = UBO_SCRIPTLET_MASK_RE
        .find(rule)
        .ok_or_else(|| ScriptletRuleError::NotUboScriptletRule(rule.to_string()))?;
    let domains = &rule[..marker.start()];
    let exception = marker.as_str().contains('@');

    let call = string_in_braces(&rule[marker.end()..]);
    if call.trim().is_empty() {
        return Err(ScriptletRuleError::MissingScriptletName(rule.to_string()));
    }

    let args: Vec<String> = call
        .split(", ")
        .enumerate()
        .map(|(i, token)| {
            if i == 0 {
                let name = if token.ends_with(UBO_NAME_SUFFIX) {
                    token.to_string()
                } else {
                    format!("{}{}", token, UBO_NAME_SUFFIX)
                };
                wrap_in_double_quotes(&format!("{}{}", UBO_ALIAS_NAME_MARKER, name))
            } else {
                wrap_in_double_quotes(token)
            }
        })
        .collect();

    parsed_back(rule, vec![adg_rule(domains, exception, &args)])
}

/// Converts `example.org#$#snippet arg; other 'quoted arg'` into one native rule per snippet
/// call, with names prefixed by `abp-`.
pub fn convert_abp_to_adg(rule: &str) -> Result<Vec<String>, ScriptletRuleError> {
    if lists::is_comment(rule) {
        return Ok(vec![rule.to_string()]);
    }

    let (mask, exception) = if rule.contains(ABP_SCRIPTLET_EXCEPTION_MASK) {
        (ABP_SCRIPTLET_EXCEPTION_MASK, true)
    } else if rule.contains(ABP_SCRIPTLET_MASK) {
        (ABP_SCRIPTLET_MASK, false)
    } else {
        return Err(ScriptletRuleError::NotAbpSnippetRule(rule.to_string()));
    };
    let domains = substring_before(rule, mask);

    let converted: Vec<String> = split_outside_double_quotes(substring_after(rule, mask), ';')
        .into_iter()
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let args: Vec<String> = ABP_TOKEN_RE
                .find_iter(segment)
                .enumerate()
                .map(|(i, token)| {
                    if i == 0 {
                        wrap_in_double_quotes(&format!("{}{}", ABP_NAME_PREFIX, token.as_str()))
                    } else {
                        wrap_in_double_quotes(token.as_str())
                    }
                })
                .collect();
            adg_rule(domains, exception, &args)
        })
        .collect();

    if converted.is_empty() {
        return Err(ScriptletRuleError::MissingScriptletName(rule.to_string()));
    }
    parsed_back(rule, converted)
}

/// Converts a scriptlet rule of any supported syntax into native rules. Native rules and
/// comments are returned unchanged. `None` if the rule is not a scriptlet rule or does not
/// convert.
pub fn convert_scriptlet_to_adg(rule: &str) -> Option<Vec<String>> {
    let converted = match lists::detect_rule_dialect(rule) {
        RuleDialect::Comment | RuleDialect::Adg => Ok(vec![rule.to_string()]),
        RuleDialect::Ubo => convert_ubo_to_adg(rule),
        RuleDialect::Abp => convert_abp_to_adg(rule),
        RuleDialect::Invalid => {
            log::debug!("Not a scriptlet rule: {:?}", rule);
            return None;
        }
    };
    match converted {
        Ok(rules) => Some(rules),
        Err(e) => {
            log::debug!("{}", e);
            None
        }
    }
}

/// Converts a native rule into uBlock Origin syntax, using the first `ubo-` name of the
/// scriptlet it resolves to. `None` if the rule does not parse, the scriptlet is unknown, or it
/// has no uBlock Origin name.
pub fn convert_adg_to_ubo(rule: &str, storage: &ResourceStorage) -> Option<String> {
    let parsed = parse_scriptlet_rule(rule)
        .map_err(|e| log::debug!("{}", e))
        .ok()?;
    let definition = storage.get_scriptlet(&parsed.name)?;
    let alias = match definition.ubo_alias() {
        Some(alias) => alias,
        None => {
            log::debug!("`{}` has no uBlock Origin equivalent", definition.name());
            return None;
        }
    };

    let ubo_name = alias.strip_prefix(UBO_ALIAS_NAME_MARKER).unwrap_or(alias);
    let ubo_name = ubo_name.strip_suffix(UBO_NAME_SUFFIX).unwrap_or(ubo_name);

    let marker = if parsed.exception {
        UBO_SCRIPTLET_EXCEPTION_MARKER
    } else {
        UBO_SCRIPTLET_MARKER
    };
    let call = std::iter::once(ubo_name)
        .chain(parsed.args.iter().map(String::as_str))
        .join(", ");

    Some(format!("{}{}({})", parsed.domains, marker, call))
}

#[cfg(test)]
#[path = "../../tests/unit/filters/scriptlet.rs"]
mod unit_tests;
