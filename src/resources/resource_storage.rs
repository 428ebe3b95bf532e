//! Storage and alias resolution for scriptlet, redirect and helper resources.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::resources::{Resource, ResourceKind, ScriptletDefinition, ScriptletSource};

/// `function name(` at the very beginning of a resource body.
static FUNCTION_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^function\s+([^\s(]+)\s*\(").unwrap());

#[derive(Debug, Error, PartialEq, Clone)]
pub enum AddResourceError {
    #[error("`{name}` is already registered for another {kind}")]
    AmbiguousDefinition { name: String, kind: ResourceKind },
    #[error("redirect `{name}` is mapped to more than one {dialect} entry")]
    AmbiguousRedirectName { name: String, dialect: &'static str },
    #[error("resource content is not valid base64")]
    InvalidBase64Content,
    #[error("resource content is not valid utf8")]
    InvalidUtf8Content,
    #[error("`{0}` does not start with a named function declaration")]
    MissingFunctionName(String),
}

impl From<base64::DecodeError> for AddResourceError {
    fn from(_: base64::DecodeError) -> Self {
        AddResourceError::InvalidBase64Content
    }
}

impl From<std::string::FromUtf8Error> for AddResourceError {
    fn from(_: std::string::FromUtf8Error) -> Self {
        AddResourceError::InvalidUtf8Content
    }
}

/// Unified registry of every known resource, indexed by each of its names.
///
/// Scriptlets, redirects and helpers live in separate namespaces: the same name may refer to a
/// scriptlet and to a redirect, but never to two scriptlets.
#[derive(Debug, Default, Clone)]
pub struct ResourceStorage {
    definitions: Vec<ScriptletDefinition>,
    scriptlet_names: HashMap<String, usize>,
    redirect_names: HashMap<String, usize>,
    helper_names: HashMap<String, usize>,
}

impl ResourceStorage {
    /// Builds storage from a list of resources. Fails on the first resource that cannot be
    /// registered, including any name collision.
    pub fn from_resources(
        resources: impl IntoIterator<Item = Resource>,
    ) -> Result<Self, AddResourceError> {
        let mut storage = Self::default();
        for resource in resources {
            storage.add_resource(resource)?;
        }

        log::info!(
            "Registered {} scriptlets, {} redirects and {} helpers",
            storage.scriptlets().count(),
            storage.redirects().count(),
            storage.helpers().count(),
        );

        Ok(storage)
    }

    /// Adds a resource. Nothing is registered if any of its names already belongs to another
    /// resource of the same kind.
    pub fn add_resource(&mut self, resource: Resource) -> Result<(), AddResourceError> {
        let body = String::from_utf8(base64::decode(&resource.content)?)?;
        let function_name = extract_function_name(&body)
            .ok_or_else(|| AddResourceError::MissingFunctionName(resource.name.clone()))?
            .to_string();

        let names: Vec<String> = std::iter::once(resource.name)
            .chain(resource.aliases)
            .unique()
            .collect();

        let index = self.definitions.len();
        let table = match resource.kind {
            ResourceKind::Scriptlet => &mut self.scriptlet_names,
            ResourceKind::Redirect => &mut self.redirect_names,
            ResourceKind::Helper => &mut self.helper_names,
        };

        if let Some(taken) = names.iter().find(|name| table.contains_key(name.as_str())) {
            return Err(AddResourceError::AmbiguousDefinition {
                name: taken.clone(),
                kind: resource.kind,
            });
        }
        for name in names.iter() {
            table.insert(name.clone(), index);
        }

        self.definitions.push(ScriptletDefinition::new(
            names,
            resource.kind,
            resource.dependencies,
            body,
            function_name,
        ));

        Ok(())
    }

    pub fn get_scriptlet(&self, name: &str) -> Option<&ScriptletDefinition> {
        self.scriptlet_names.get(name).map(|&i| &self.definitions[i])
    }

    pub fn get_redirect(&self, name: &str) -> Option<&ScriptletDefinition> {
        self.redirect_names.get(name).map(|&i| &self.definitions[i])
    }

    pub fn get_helper(&self, name: &str) -> Option<&ScriptletDefinition> {
        self.helper_names.get(name).map(|&i| &self.definitions[i])
    }

    pub fn is_valid_scriptlet_name(&self, name: &str) -> bool {
        self.scriptlet_names.contains_key(name)
    }

    pub fn is_valid_redirect_name(&self, name: &str) -> bool {
        self.redirect_names.contains_key(name)
    }

    /// Looks up the scriptlet requested by `source`. `None` means nothing should be injected.
    pub fn resolve_scriptlet(&self, source: &ScriptletSource) -> Option<&ScriptletDefinition> {
        let definition = self.get_scriptlet(&source.name);
        if definition.is_none() {
            log::debug!("No scriptlet named {:?}", source.name);
        }
        definition
    }

    /// Looks up the redirect requested by `source`. `None` means nothing should be injected.
    pub fn resolve_redirect(&self, source: &ScriptletSource) -> Option<&ScriptletDefinition> {
        let definition = self.get_redirect(&source.name);
        if definition.is_none() {
            log::debug!("No redirect named {:?}", source.name);
        }
        definition
    }

    pub fn scriptlets(&self) -> impl Iterator<Item = &ScriptletDefinition> {
        self.of_kind(ResourceKind::Scriptlet)
    }

    pub fn redirects(&self) -> impl Iterator<Item = &ScriptletDefinition> {
        self.of_kind(ResourceKind::Redirect)
    }

    pub fn helpers(&self) -> impl Iterator<Item = &ScriptletDefinition> {
        self.of_kind(ResourceKind::Helper)
    }

    fn of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &ScriptletDefinition> {
        self.definitions.iter().filter(move |d| d.kind() == kind)
    }

    /// Collects the helpers `definition` depends on, directly or through other helpers, in
    /// depth-first declaration order. Each helper appears once; cycles are cut at the first
    /// repeated name. Unknown helper names are skipped.
    pub fn recursive_dependencies<'a>(
        &'a self,
        definition: &'a ScriptletDefinition,
    ) -> Vec<&'a ScriptletDefinition> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut out = vec![];
        self.collect_dependencies(definition, &mut seen, &mut out);
        out
    }

    fn collect_dependencies<'a>(
        &'a self,
        definition: &'a ScriptletDefinition,
        seen: &mut HashSet<&'a str>,
        out: &mut Vec<&'a ScriptletDefinition>,
    ) {
        for dependency in definition.dependencies() {
            let helper = match self.get_helper(dependency) {
                Some(helper) => helper,
                None => {
                    log::warn!(
                        "`{}` depends on unknown helper `{}`",
                        definition.name(),
                        dependency
                    );
                    continue;
                }
            };
            // the helper's canonical name dedups lookups through different aliases
            if !seen.insert(helper.name()) {
                continue;
            }
            out.push(helper);
            self.collect_dependencies(helper, seen, out);
        }
    }
}

/// Returns the identifier of the function declared at the start of `body`, if any.
pub(crate) fn extract_function_name(body: &str) -> Option<&str> {
    FUNCTION_NAME_RE
        .captures(body.trim_start())
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
#[path = "../../tests/unit/resources/resource_storage.rs"]
mod unit_tests;
