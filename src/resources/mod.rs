//! In adblocking terms, resources are small pieces of Javascript that can be injected into pages
//! (scriptlets), served as drop-in replacements for blocked requests (redirects), or shared by
//! both as helper functions. Every resource is a named Javascript function declaration which is
//! opaque to this crate beyond its name, aliases and declared dependencies.

pub mod injection;
pub mod redirect_compatibility;
pub mod resource_assembler;
mod resource_storage;

pub use redirect_compatibility::{RedirectCompatibility, RedirectCompatibilityEntry};
pub use resource_storage::{AddResourceError, ResourceStorage};

use serde::{Deserialize, Serialize};

/// Marker contained in uBlock Origin flavored aliases, e.g. `ubo-set-constant.js`.
pub const UBO_ALIAS_NAME_MARKER: &str = "ubo-";

/// Struct representing a resource that can be registered with a [`ResourceStorage`].
///
/// - `name`: Represents the primary name of the resource
///
/// - `aliases`: Represents secondary names that can be used to access the resource. Order is
/// significant: the first uBlock Origin alias is used when converting rules to that syntax.
///
/// - `kind`: Whether the resource is a scriptlet, a redirect, or a shared helper function
///
/// - `content`: The Javascript function source, encoded using standard base64 configuration
///
/// - `dependencies`: Names of helper resources that must be inlined alongside this one
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Resource {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub kind: ResourceKind,
    pub content: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl Resource {
    /// Builds a resource with no aliases or dependencies from unencoded `content`.
    pub fn simple(name: &str, kind: ResourceKind, content: &str) -> Self {
        Self {
            name: name.to_string(),
            aliases: vec![],
            kind,
            content: base64::encode(content),
            dependencies: vec![],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Scriptlet,
    Redirect,
    Helper,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Scriptlet => write!(f, "scriptlet"),
            ResourceKind::Redirect => write!(f, "redirect"),
            ResourceKind::Helper => write!(f, "helper"),
        }
    }
}

/// A registered resource, with its content decoded and ready to be assembled into injectable
/// code.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptletDefinition {
    names: Vec<String>,
    kind: ResourceKind,
    dependencies: Vec<String>,
    body: String,
    function_name: String,
}

impl ScriptletDefinition {
    pub(crate) fn new(
        names: Vec<String>,
        kind: ResourceKind,
        dependencies: Vec<String>,
        body: String,
        function_name: String,
    ) -> Self {
        debug_assert!(!names.is_empty());
        Self {
            names,
            kind,
            dependencies,
            body,
            function_name,
        }
    }

    /// The canonical name.
    pub fn name(&self) -> &str {
        &self.names[0]
    }

    /// Every name this definition answers to, canonical name first.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn aliases(&self) -> &[String] {
        &self.names[1..]
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Javascript source of the function declaration.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Identifier of the declared Javascript function.
    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// The first name in uBlock Origin syntax, if there is one.
    pub fn ubo_alias(&self) -> Option<&str> {
        self.names
            .iter()
            .find(|alias| alias.contains(UBO_ALIAS_NAME_MARKER))
            .map(|alias| alias.as_str())
    }
}

/// A request to run a scriptlet or redirect, along with the metadata that is handed to the
/// injected code as its `source` argument.
///
/// Only `name` is required. `engine` set to `"corelibs"` makes the assembled code an anonymous
/// function rather than a self-invoking statement.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScriptletSource {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_name: Option<String>,
    /// Source text of a custom hit callback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hit: Option<String>,
}

pub const CORELIBS_ENGINE: &str = "corelibs";

impl ScriptletSource {
    pub fn new(name: &str, args: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn is_corelibs(&self) -> bool {
        self.engine.as_deref() == Some(CORELIBS_ENGINE)
    }
}
