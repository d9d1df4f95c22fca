use std::collections::{BTreeMap, BTreeSet};

use crate::policy::config::PolicyConfig;

/// Lookup tables compiled from a [`PolicyConfig`].
///
/// Built fresh for every evaluation and never shared across requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyIndex {
    /// Version entries per package name, in config order.
    pub versions_by_package: BTreeMap<String, Vec<String>>,
    pub licenses: BTreeSet<String>,
}

impl PolicyIndex {
    /// Never fails. Repeated package names accumulate their versions.
    pub fn build(config: &PolicyConfig) -> Self {
        let mut versions_by_package: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for pkg in &config.disallowed_packages {
            versions_by_package
                .entry(pkg.name.clone())
                .or_default()
                .push(pkg.version.clone());
        }

        let licenses = config.disallowed_licenses.iter().cloned().collect();

        Self {
            versions_by_package,
            licenses,
        }
    }

    pub fn versions_for(&self, package: &str) -> Option<&[String]> {
        self.versions_by_package.get(package).map(Vec::as_slice)
    }

    pub fn denies_license(&self, license: &str) -> bool {
        self.licenses.contains(license)
    }
}
