//! The main entry point: resolves and assembles scriptlets and redirects, and validates or
//! converts the rules that request them.

use crate::filters::{redirect, scriptlet};
use crate::lists::{self, ConvertOptions, ConvertedList};
use crate::resources::injection::{assemble_redirect, assemble_scriptlet};
use crate::resources::{
    AddResourceError, RedirectCompatibility, Resource, ResourceStorage, ScriptletSource,
};

/// Holds the resource registry and the redirect name correspondence table.
///
/// Usage:
///
/// ```
/// use adblock_scriptlets::engine::Engine;
/// use adblock_scriptlets::resources::{Resource, ResourceKind, ScriptletSource};
///
/// let engine = Engine::from_resources(vec![Resource::simple(
///     "log",
///     ResourceKind::Scriptlet,
///     "function log(source) { console.log(source.name); }",
/// )])
/// .unwrap();
///
/// assert!(engine.validate_rule(r#"example.org#%#//scriptlet("log")"#));
/// assert!(engine.invoke(&ScriptletSource::new("log", &[])).is_some());
/// ```
pub struct Engine {
    storage: ResourceStorage,
    compatibility: RedirectCompatibility,
}

impl Default for Engine {
    /// No resources, and the redirect table shipped with the crate.
    fn default() -> Self {
        Self::new(
            ResourceStorage::default(),
            RedirectCompatibility::bundled().clone(),
        )
    }
}

impl Engine {
    pub fn new(storage: ResourceStorage, compatibility: RedirectCompatibility) -> Self {
        Self {
            storage,
            compatibility,
        }
    }

    pub fn from_resources(
        resources: impl IntoIterator<Item = Resource>,
    ) -> Result<Self, AddResourceError> {
        Ok(Self::new(
            ResourceStorage::from_resources(resources)?,
            RedirectCompatibility::bundled().clone(),
        ))
    }

    /// Replaces every registered resource. On error the current resources are kept.
    pub fn use_resources(
        &mut self,
        resources: impl IntoIterator<Item = Resource>,
    ) -> Result<(), AddResourceError> {
        self.storage = ResourceStorage::from_resources(resources)?;
        Ok(())
    }

    pub fn add_resource(&mut self, resource: Resource) -> Result<(), AddResourceError> {
        self.storage.add_resource(resource)
    }

    pub fn storage(&self) -> &ResourceStorage {
        &self.storage
    }

    pub fn compatibility(&self) -> &RedirectCompatibility {
        &self.compatibility
    }

    /// Code to inject for the scriptlet requested by `source`, or `None` if it is unknown.
    pub fn invoke(&self, source: &ScriptletSource) -> Option<String> {
        let definition = self.storage.resolve_scriptlet(source)?;
        assemble_scriptlet(&self.storage, definition, source)
            .map_err(|e| log::warn!("Could not serialize source of {:?}: {}", source.name, e))
            .ok()
    }

    pub fn validate_name(&self, name: &str) -> bool {
        self.storage.is_valid_scriptlet_name(name)
    }

    /// Whether every scriptlet call in `rule`, in any supported syntax, parses and names a
    /// registered scriptlet.
    pub fn validate_rule(&self, rule: &str) -> bool {
        if lists::is_comment(rule) {
            return false;
        }
        let adg_rules = match scriptlet::convert_scriptlet_to_adg(rule) {
            Some(rules) if !rules.is_empty() => rules,
            _ => return false,
        };
        adg_rules.iter().all(|adg_rule| {
            scriptlet::parse_scriptlet_rule(adg_rule)
                .map(|parsed| self.validate_name(&parsed.name))
                .unwrap_or_else(|e| {
                    log::debug!("{}", e);
                    false
                })
        })
    }

    pub fn is_adg_scriptlet_rule(&self, rule: &str) -> bool {
        lists::is_adg_scriptlet_rule(rule)
    }

    pub fn is_ubo_scriptlet_rule(&self, rule: &str) -> bool {
        lists::is_ubo_scriptlet_rule(rule)
    }

    pub fn is_abp_snippet_rule(&self, rule: &str) -> bool {
        lists::is_abp_snippet_rule(rule)
    }

    pub fn convert_ubo_to_adg(&self, rule: &str) -> Vec<String> {
        scriptlet::convert_ubo_to_adg(rule).unwrap_or_default()
    }

    pub fn convert_abp_to_adg(&self, rule: &str) -> Vec<String> {
        scriptlet::convert_abp_to_adg(rule).unwrap_or_default()
    }

    pub fn convert_scriptlet_to_adg(&self, rule: &str) -> Option<Vec<String>> {
        scriptlet::convert_scriptlet_to_adg(rule)
    }

    pub fn convert_adg_to_ubo(&self, rule: &str) -> Option<String> {
        scriptlet::convert_adg_to_ubo(rule, &self.storage)
    }

    pub fn redirects(&self) -> Redirects<'_> {
        Redirects { engine: self }
    }

    pub fn convert_filter_list(
        &self,
        lines: impl IntoIterator<Item = impl AsRef<str>>,
        opts: &ConvertOptions,
    ) -> ConvertedList {
        lists::convert_filter_list(lines, &self.storage, &self.compatibility, opts)
    }
}

/// Redirect resource operations of an [`Engine`].
pub struct Redirects<'a> {
    engine: &'a Engine,
}

impl<'a> Redirects<'a> {
    /// Code to serve for the redirect requested by `source`, or `None` if it is unknown.
    pub fn get_code(&self, source: &ScriptletSource) -> Option<String> {
        let storage = &self.engine.storage;
        let definition = storage.resolve_redirect(source)?;
        assemble_redirect(storage, definition, source)
            .map_err(|e| log::warn!("Could not serialize source of {:?}: {}", source.name, e))
            .ok()
    }

    pub fn is_adg_redirect_rule(&self, rule: &str) -> bool {
        lists::is_adg_redirect_rule(rule)
    }

    pub fn is_ubo_redirect_rule(&self, rule: &str) -> bool {
        lists::is_ubo_redirect_rule(rule, &self.engine.compatibility)
    }

    pub fn is_abp_rewrite_rule(&self, rule: &str) -> bool {
        lists::is_abp_rewrite_rule(rule, &self.engine.compatibility)
    }

    pub fn convert_ubo_redirect_to_adg(&self, rule: &str) -> Option<String> {
        redirect::convert_ubo_redirect_to_adg(rule, &self.engine.compatibility)
    }

    pub fn convert_abp_redirect_to_adg(&self, rule: &str) -> Option<String> {
        redirect::convert_abp_redirect_to_adg(rule, &self.engine.compatibility)
    }

    pub fn convert_redirect_to_adg(&self, rule: &str) -> Option<String> {
        redirect::convert_redirect_to_adg(rule, &self.engine.compatibility, &self.engine.storage)
    }

    pub fn is_valid_redirect_rule(&self, rule: &str) -> bool {
        redirect::is_valid_redirect_rule(rule, &self.engine.compatibility, &self.engine.storage)
    }

    pub fn convert_adg_redirect_to_ubo(
        &self,
        rule: &str,
    ) -> Result<String, redirect::RedirectRuleError> {
        redirect::convert_adg_redirect_to_ubo(rule, &self.engine.compatibility)
    }
}

#[cfg(test)]
#[path = "../tests/unit/engine.rs"]
mod unit_tests;
