//! Redirect resource rules: network rules with a `redirect=` (AdGuard, uBlock Origin) or
//! `rewrite=abp-resource:` (Adblock Plus) modifier naming a resource to serve instead of the
//! blocked request.

use thiserror::Error;

use crate::lists::{self, RuleDialect};
use crate::resources::{RedirectCompatibility, ResourceStorage};
use crate::utils::{substring_after, substring_before};

pub const ADG_UBO_REDIRECT_MARKER: &str = "redirect=";
pub const ABP_REDIRECT_MARKER: &str = "rewrite=abp-resource:";

const MODIFIERS_MARKER: &str = "$";

/// A redirect is only valid for requests of one of these content types.
pub const VALID_SOURCE_TYPES: [&str; 6] = [
    "image",
    "subdocument",
    "stylesheet",
    "script",
    "xmlhttprequest",
    "media",
];

const ADG_XHR_TYPE: &str = "xmlhttprequest";
const UBO_XHR_TYPE: &str = "xhr";

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum RedirectRuleError {
    #[error("redirect rule must have a content type modifier: {0}")]
    MissingContentType(String),
    #[error("no uBlock Origin redirect for rule: {0}")]
    UnsupportedRedirect(String),
    #[error("not a redirect rule: {0}")]
    NotRedirectRule(String),
}

fn modifiers(rule: &str) -> impl Iterator<Item = &str> {
    substring_after(rule, MODIFIERS_MARKER)
        .split(',')
        .filter(|modifier| !modifier.is_empty())
}

/// Resource name following `marker` in the modifier list of `rule`.
pub(crate) fn redirect_name<'a>(rule: &'a str, marker: &str) -> Option<&'a str> {
    modifiers(rule)
        .find(|modifier| modifier.contains(marker))
        .map(|modifier| substring_after(modifier, marker))
        .filter(|name| !name.is_empty())
}

fn has_valid_content_type(rule: &str) -> bool {
    modifiers(rule).any(|modifier| VALID_SOURCE_TYPES.contains(&modifier))
}

/// Rebuilds `rule` with each modifier passed through `f`. `None` if `f` fails on any of them.
fn map_modifiers<'a>(
    rule: &'a str,
    mut f: impl FnMut(&'a str) -> Option<String>,
) -> Option<String> {
    let modifiers = substring_after(rule, MODIFIERS_MARKER)
        .split(',')
        .map(&mut f)
        .collect::<Option<Vec<String>>>()?;
    Some(format!(
        "{}{}{}",
        substring_before(rule, MODIFIERS_MARKER),
        MODIFIERS_MARKER,
        modifiers.join(",")
    ))
}

/// `||example.org^$xhr,redirect=noop.js` to `||example.org^$xmlhttprequest,redirect=noopjs`.
pub fn convert_ubo_redirect_to_adg(
    rule: &str,
    compatibility: &RedirectCompatibility,
) -> Option<String> {
    if !lists::is_ubo_redirect_rule(rule, compatibility) {
        return None;
    }
    map_modifiers(rule, |modifier| {
        if modifier.contains(ADG_UBO_REDIRECT_MARKER) {
            let name = substring_after(modifier, ADG_UBO_REDIRECT_MARKER);
            let adg_name = compatibility.ubo_to_adg(name)?;
            Some(format!("{}{}", ADG_UBO_REDIRECT_MARKER, adg_name))
        } else if modifier == UBO_XHR_TYPE {
            Some(ADG_XHR_TYPE.to_string())
        } else {
            Some(modifier.to_string())
        }
    })
}

/// `||example.org^$script,rewrite=abp-resource:blank-js` to `||example.org^$script,redirect=noopjs`.
pub fn convert_abp_redirect_to_adg(
    rule: &str,
    compatibility: &RedirectCompatibility,
) -> Option<String> {
    if !lists::is_abp_rewrite_rule(rule, compatibility) {
        return None;
    }
    map_modifiers(rule, |modifier| {
        if modifier.contains(ABP_REDIRECT_MARKER) {
            let name = substring_after(modifier, ABP_REDIRECT_MARKER);
            let adg_name = compatibility.abp_to_adg(name)?;
            Some(format!("{}{}", ADG_UBO_REDIRECT_MARKER, adg_name))
        } else {
            Some(modifier.to_string())
        }
    })
}

/// Converts a redirect rule of any supported syntax into native syntax. Comments and valid
/// native rules are returned unchanged.
pub fn convert_redirect_to_adg(
    rule: &str,
    compatibility: &RedirectCompatibility,
    storage: &ResourceStorage,
) -> Option<String> {
    match lists::detect_redirect_dialect(rule, compatibility) {
        RuleDialect::Comment => Some(rule.to_string()),
        RuleDialect::Ubo => convert_ubo_redirect_to_adg(rule, compatibility),
        RuleDialect::Abp => convert_abp_redirect_to_adg(rule, compatibility),
        RuleDialect::Adg if is_valid_redirect_rule(rule, compatibility, storage) => {
            Some(rule.to_string())
        }
        _ => {
            log::debug!("Unsupported redirect rule: {:?}", rule);
            None
        }
    }
}

/// A native redirect rule naming a known redirect, restricted to a content type it can serve.
pub fn is_valid_redirect_rule(
    rule: &str,
    compatibility: &RedirectCompatibility,
    storage: &ResourceStorage,
) -> bool {
    lists::is_adg_redirect_rule(rule)
        && redirect_name(rule, ADG_UBO_REDIRECT_MARKER).map_or(false, |name| {
            compatibility.is_adg_name(name) || storage.is_valid_redirect_name(name)
        })
        && has_valid_content_type(rule)
}

/// `||example.org^$xmlhttprequest,redirect=noopjs` to `||example.org^$xhr,redirect=noop.js`.
pub fn convert_adg_redirect_to_ubo(
    rule: &str,
    compatibility: &RedirectCompatibility,
) -> Result<String, RedirectRuleError> {
    if !lists::is_adg_redirect_rule(rule) {
        return Err(RedirectRuleError::NotRedirectRule(rule.to_string()));
    }
    if !has_valid_content_type(rule) {
        return Err(RedirectRuleError::MissingContentType(rule.to_string()));
    }

    let ubo_name = redirect_name(rule, ADG_UBO_REDIRECT_MARKER)
        .and_then(|name| compatibility.adg_to_ubo(name))
        .ok_or_else(|| RedirectRuleError::UnsupportedRedirect(rule.to_string()))?;

    map_modifiers(rule, |modifier| {
        Some(if modifier.contains(ADG_UBO_REDIRECT_MARKER) {
            format!("{}{}", ADG_UBO_REDIRECT_MARKER, ubo_name)
        } else if modifier == ADG_XHR_TYPE {
            UBO_XHR_TYPE.to_string()
        } else {
            modifier.to_string()
        })
    })
    .ok_or_else(|| RedirectRuleError::UnsupportedRedirect(rule.to_string()))
}

#[cfg(test)]
#[path = "../../tests/unit/filters/redirect.rs"]
mod unit_tests;
