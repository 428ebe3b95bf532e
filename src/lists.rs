//! Detection of the filter list syntax a rule is written in, and whole-list conversion.

use itertools::{Either, Itertools};
use memchr::memmem;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::filters::redirect::{self, ABP_REDIRECT_MARKER, ADG_UBO_REDIRECT_MARKER};
use crate::filters::scriptlet::{self, ScriptletRule};
use crate::resources::{RedirectCompatibility, ResourceStorage};

pub const COMMENT_MARKER: char = '!';

/// Present in every AdGuard scriptlet rule, e.g. `example.org#%#//scriptlet("log")`.
pub const ADG_SCRIPTLET_MASK: &str = "#//scriptlet";

pub const UBO_SCRIPTLET_MASK_1: &str = "##+js";
pub const UBO_SCRIPTLET_MASK_2: &str = "##script:inject";
pub const UBO_SCRIPTLET_EXCEPTION_MASK_1: &str = "#@#+js";
pub const UBO_SCRIPTLET_EXCEPTION_MASK_2: &str = "#@#script:inject";

pub const ABP_SCRIPTLET_MASK: &str = "#$#";
pub const ABP_SCRIPTLET_EXCEPTION_MASK: &str = "#@$#";

/// Address anchor required in redirect rules.
pub const ADDRESS_ANCHOR_MASK: &str = "||";

pub(crate) static UBO_SCRIPTLET_MASK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#@?#script:inject|#@?#\s*\+js").unwrap());

/// Adblock Plus syntax is shared with AdGuard CSS injection rules like `#$#.ad { display:none }`.
static ADG_CSS_MASK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#@?\$#.+?\s*\{.*\}\s*$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleDialect {
    /// AdGuard, the syntax every other one is converted into.
    Adg,
    /// uBlock Origin.
    Ubo,
    /// Adblock Plus.
    Abp,
    Comment,
    Invalid,
}

#[inline]
fn contains(rule: &str, marker: &str) -> bool {
    memmem::find(rule.as_bytes(), marker.as_bytes()).is_some()
}

pub fn is_comment(rule: &str) -> bool {
    rule.starts_with(COMMENT_MARKER)
}

pub fn is_adg_scriptlet_rule(rule: &str) -> bool {
    !is_comment(rule) && contains(rule, ADG_SCRIPTLET_MASK)
}

pub fn is_ubo_scriptlet_rule(rule: &str) -> bool {
    (contains(rule, UBO_SCRIPTLET_MASK_1)
        || contains(rule, UBO_SCRIPTLET_MASK_2)
        || contains(rule, UBO_SCRIPTLET_EXCEPTION_MASK_1)
        || contains(rule, UBO_SCRIPTLET_EXCEPTION_MASK_2))
        && UBO_SCRIPTLET_MASK_RE.is_match(rule)
        && !is_comment(rule)
}

/// Note that a snippet whose arguments contain a `{...}` block at the end of the rule is taken
/// for a CSS injection rule.
pub fn is_abp_snippet_rule(rule: &str) -> bool {
    (contains(rule, ABP_SCRIPTLET_MASK) || contains(rule, ABP_SCRIPTLET_EXCEPTION_MASK))
        && !ADG_CSS_MASK_RE.is_match(rule)
        && !is_comment(rule)
}

/// Classifies a scriptlet rule. The first matching syntax wins, in the order comment, AdGuard,
/// uBlock Origin, Adblock Plus.
pub fn detect_rule_dialect(rule: &str) -> RuleDialect {
    if is_comment(rule) {
        RuleDialect::Comment
    } else if is_adg_scriptlet_rule(rule) {
        RuleDialect::Adg
    } else if is_ubo_scriptlet_rule(rule) {
        RuleDialect::Ubo
    } else if is_abp_snippet_rule(rule) {
        RuleDialect::Abp
    } else {
        RuleDialect::Invalid
    }
}

pub fn is_adg_redirect_rule(rule: &str) -> bool {
    !is_comment(rule)
        && contains(rule, ADDRESS_ANCHOR_MASK)
        && contains(rule, ADG_UBO_REDIRECT_MARKER)
}

/// A uBlock Origin redirect rule names a resource known under that syntax.
pub fn is_ubo_redirect_rule(rule: &str, compatibility: &RedirectCompatibility) -> bool {
    is_adg_redirect_rule(rule)
        && redirect::redirect_name(rule, ADG_UBO_REDIRECT_MARKER)
            .map_or(false, |name| compatibility.ubo_to_adg(name).is_some())
}

pub fn is_abp_rewrite_rule(rule: &str, compatibility: &RedirectCompatibility) -> bool {
    !is_comment(rule)
        && contains(rule, ADDRESS_ANCHOR_MASK)
        && contains(rule, ABP_REDIRECT_MARKER)
        && redirect::redirect_name(rule, ABP_REDIRECT_MARKER)
            .map_or(false, |name| compatibility.abp_to_adg(name).is_some())
}

/// Classifies a redirect rule, in the order comment, uBlock Origin, Adblock Plus, AdGuard.
pub fn detect_redirect_dialect(rule: &str, compatibility: &RedirectCompatibility) -> RuleDialect {
    if is_comment(rule) {
        RuleDialect::Comment
    } else if is_ubo_redirect_rule(rule, compatibility) {
        RuleDialect::Ubo
    } else if is_abp_rewrite_rule(rule, compatibility) {
        RuleDialect::Abp
    } else if is_adg_redirect_rule(rule) {
        RuleDialect::Adg
    } else {
        RuleDialect::Invalid
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetFormat {
    Adg,
    Ubo,
}

impl Default for TargetFormat {
    fn default() -> Self {
        TargetFormat::Adg
    }
}

/// Options for [`convert_filter_list`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Syntax every scriptlet and redirect rule is converted into.
    pub target: TargetFormat,
    /// Keep rules that are neither scriptlet nor redirect rules, unchanged.
    pub keep_unsupported: bool,
    /// Drop `!` comments from the output.
    pub skip_comments: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            target: TargetFormat::Adg,
            keep_unsupported: true,
            skip_comments: false,
        }
    }
}

/// A line that could not be converted, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionFailure {
    pub line: String,
    pub reason: String,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConvertedList {
    pub rules: Vec<String>,
    pub failures: Vec<ConversionFailure>,
}

/// Converts every line of a filter list. A line that fails to convert is recorded in
/// `failures` and never stops the rest of the list from being processed.
pub fn convert_filter_list(
    lines: impl IntoIterator<Item = impl AsRef<str>>,
    storage: &ResourceStorage,
    compatibility: &RedirectCompatibility,
    opts: &ConvertOptions,
) -> ConvertedList {
    let (rules, failures): (Vec<Vec<String>>, Vec<ConversionFailure>) = lines
        .into_iter()
        .filter_map(|line| {
            let line = line.as_ref().trim();
            if line.is_empty() {
                None
            } else {
                Some(convert_line(line, storage, compatibility, opts))
            }
        })
        .partition_map(|converted| match converted {
            Ok(rules) => Either::Left(rules),
            Err(failure) => {
                log::warn!("Skipping {:?}: {}", failure.line, failure.reason);
                Either::Right(failure)
            }
        });

    ConvertedList {
        rules: rules.into_iter().flatten().collect(),
        failures,
    }
}

fn convert_line(
    line: &str,
    storage: &ResourceStorage,
    compatibility: &RedirectCompatibility,
    opts: &ConvertOptions,
) -> Result<Vec<String>, ConversionFailure> {
    let fail = |reason: String| ConversionFailure {
        line: line.to_string(),
        reason,
    };

    if is_comment(line) {
        return Ok(if opts.skip_comments { vec![] } else { vec![line.to_string()] });
    }

    if detect_rule_dialect(line) != RuleDialect::Invalid {
        let adg_rules = scriptlet::convert_scriptlet_to_adg(line)
            .ok_or_else(|| fail("unrecognized scriptlet rule".to_string()))?;
        for rule in adg_rules.iter() {
            ScriptletRule::parse(rule).map_err(|e| fail(e.to_string()))?;
        }
        return match opts.target {
            TargetFormat::Adg => Ok(adg_rules),
            TargetFormat::Ubo => adg_rules
                .iter()
                .map(|rule| {
                    scriptlet::convert_adg_to_ubo(rule, storage)
                        .ok_or_else(|| fail(format!("no uBlock Origin equivalent for {}", rule)))
                })
                .collect(),
        };
    }

    if detect_redirect_dialect(line, compatibility) != RuleDialect::Invalid {
        let adg_rule = redirect::convert_redirect_to_adg(line, compatibility, storage)
            .ok_or_else(|| fail("unsupported redirect rule".to_string()))?;
        return match opts.target {
            TargetFormat::Adg => Ok(vec![adg_rule]),
            TargetFormat::Ubo => redirect::convert_adg_redirect_to_ubo(&adg_rule, compatibility)
                .map(|rule| vec![rule])
                .map_err(|e| fail(e.to_string())),
        };
    }

    if opts.keep_unsupported {
        Ok(vec![line.to_string()])
    } else {
        log::debug!("Dropping {:?}: not a scriptlet or redirect rule", line);
        Ok(vec![])
    }
}

#[cfg(test)]
#[path = "../tests/unit/lists.rs"]
mod unit_tests;
