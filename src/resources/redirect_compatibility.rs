//! Correspondence between redirect resource names across AdGuard, uBlock Origin and Adblock
//! Plus.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::resources::resource_assembler::{read_redirect_compatibility, BUNDLED_REDIRECTS};
use crate::resources::AddResourceError;

static BUNDLED: Lazy<RedirectCompatibility> = Lazy::new(|| {
    let entries = read_redirect_compatibility(BUNDLED_REDIRECTS)
        .unwrap_or_else(|e| panic!("bundled redirect table does not parse: {}", e));
    RedirectCompatibility::from_entries(entries)
        .unwrap_or_else(|e| panic!("bundled redirect table is ambiguous: {}", e))
});

/// A single redirect, named in each syntax that supports it. `adg` is the canonical name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RedirectCompatibilityEntry {
    pub adg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ubo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abp: Option<String>,
}

/// Lookup tables built once from a list of [`RedirectCompatibilityEntry`].
#[derive(Debug, Clone, Default)]
pub struct RedirectCompatibility {
    adg_names: HashSet<String>,
    ubo_to_adg: HashMap<String, String>,
    abp_to_adg: HashMap<String, String>,
    adg_to_ubo: HashMap<String, String>,
}

impl RedirectCompatibility {
    /// Fails if a name in any syntax would resolve to more than one canonical redirect.
    pub fn from_entries(
        entries: impl IntoIterator<Item = RedirectCompatibilityEntry>,
    ) -> Result<Self, AddResourceError> {
        let mut table = Self::default();

        for entry in entries {
            if !table.adg_names.insert(entry.adg.clone()) {
                return Err(AddResourceError::AmbiguousRedirectName {
                    name: entry.adg,
                    dialect: "AdGuard",
                });
            }
            if let Some(ubo) = entry.ubo {
                if table.ubo_to_adg.contains_key(&ubo) {
                    return Err(AddResourceError::AmbiguousRedirectName {
                        name: ubo,
                        dialect: "uBlock Origin",
                    });
                }
                table.adg_to_ubo.insert(entry.adg.clone(), ubo.clone());
                table.ubo_to_adg.insert(ubo, entry.adg.clone());
            }
            if let Some(abp) = entry.abp {
                if table.abp_to_adg.contains_key(&abp) {
                    return Err(AddResourceError::AmbiguousRedirectName {
                        name: abp,
                        dialect: "Adblock Plus",
                    });
                }
                table.abp_to_adg.insert(abp, entry.adg);
            }
        }

        Ok(table)
    }

    /// The table shipped with the crate in `data/redirects.yml`, parsed on first use.
    pub fn bundled() -> &'static RedirectCompatibility {
        &BUNDLED
    }

    pub fn is_adg_name(&self, name: &str) -> bool {
        self.adg_names.contains(name)
    }

    pub fn ubo_to_adg(&self, ubo_name: &str) -> Option<&str> {
        self.ubo_to_adg.get(ubo_name).map(|s| s.as_str())
    }

    pub fn abp_to_adg(&self, abp_name: &str) -> Option<&str> {
        self.abp_to_adg.get(abp_name).map(|s| s.as_str())
    }

    pub fn adg_to_ubo(&self, adg_name: &str) -> Option<&str> {
        self.adg_to_ubo.get(adg_name).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.adg_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adg_names.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resources/redirect_compatibility.rs"]
mod unit_tests;
