//! Read-only catalog providers
//!
//! Packages, interventions, party directories and authored test suites are
//! consumed as YAML files produced by external authoring tools. The
//! orchestrator never mutates any of this data.

use serde::Deserialize;
use std::path::Path;

use crate::common::{Error, Result};
use crate::model::{ExecutionGroup, Money, PartyRef, TestCase};

/// A benefits package
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageRecord {
    pub code: String,
    pub name: String,
}

/// One intervention from the tariff catalog
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterventionRecord {
    /// Billing code (e.g. "SHA-08-005")
    pub code: String,
    pub display: String,
    /// Package this intervention belongs to
    pub package_code: String,
    /// Complexity tier, where the package distinguishes them
    #[serde(default)]
    pub complexity: Option<String>,
    /// Whether the tariff is priced per service day
    #[serde(default)]
    pub per_diem: bool,
    /// Catalog tariff, if published
    #[serde(default)]
    pub tariff: Option<Money>,
}

/// The full read-only catalog consumed by authoring and execution
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStore {
    #[serde(default)]
    pub packages: Vec<PackageRecord>,
    #[serde(default)]
    pub interventions: Vec<InterventionRecord>,
    #[serde(default)]
    pub patients: Vec<PartyRef>,
    #[serde(default)]
    pub providers: Vec<PartyRef>,
    #[serde(default)]
    pub practitioners: Vec<PartyRef>,
}

impl CatalogStore {
    /// Load a catalog from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, &e))?;
        serde_yaml::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Look up one intervention by billing code
    pub fn intervention(&self, code: &str) -> Option<&InterventionRecord> {
        self.interventions.iter().find(|i| i.code == code)
    }

    /// Interventions for a package, optionally filtered by complexity tier
    pub fn interventions_for(
        &self,
        package_code: &str,
        complexity: Option<&str>,
    ) -> Vec<&InterventionRecord> {
        self.interventions
            .iter()
            .filter(|i| i.package_code == package_code)
            .filter(|i| match complexity {
                Some(tier) => i.complexity.as_deref() == Some(tier),
                None => true,
            })
            .collect()
    }
}

/// An authored test suite: named groups of test cases
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSuite {
    pub groups: Vec<ExecutionGroup>,
}

impl TestSuite {
    /// Look up a group by name
    pub fn group(&self, name: &str) -> Option<&ExecutionGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Test cases that bill a given intervention code, across all groups
    pub fn cases_for_code(&self, code: &str) -> Vec<&TestCase> {
        self.groups
            .iter()
            .flat_map(|g| g.test_cases.iter())
            .filter(|c| c.line_items.iter().any(|item| item.code == code))
            .collect()
    }

    /// All titles across groups, in group order
    pub fn titles(&self) -> Vec<&str> {
        self.groups
            .iter()
            .flat_map(|g| g.test_cases.iter())
            .map(|c| c.title.as_str())
            .collect()
    }
}

/// Load an authored test suite from a YAML file
pub fn load_suite(path: &Path) -> Result<TestSuite> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, &e))?;
    serde_yaml::from_str(&content).map_err(|e| Error::SuiteParse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG_YAML: &str = r#"
packages:
  - code: SHA-08
    name: Inpatient services
interventions:
  - code: SHA-08-005
    display: Inpatient bed day
    packageCode: SHA-08
    complexity: level-4
    perDiem: true
  - code: SHA-01-002
    display: Outpatient consultation
    packageCode: SHA-01
providers:
  - id: FAC-77
    display: Test Facility
"#;

    const SUITE_YAML: &str = r#"
groups:
  - name: positive
    testCases:
      - title: Valid claim
        kind: positive
        patient: { id: CR-1 }
        provider: { id: FAC-77 }
        lineItems:
          - sequence: 1
            code: SHA-08-005
            display: Inpatient bed day
            unitPrice: { value: 10000, currency: KES }
            perDiem: true
  - name: negative
    testCases:
      - title: Unknown tariff code
        kind: negative
        patient: { id: CR-1 }
        provider: { id: FAC-77 }
        lineItems:
          - sequence: 1
            code: SHA-99-999
            display: Bogus
            unitPrice: { value: 100, currency: KES }
"#;

    #[test]
    fn test_catalog_lookups() {
        let catalog: CatalogStore = serde_yaml::from_str(CATALOG_YAML).unwrap();
        assert!(catalog.intervention("SHA-08-005").unwrap().per_diem);
        assert!(catalog.intervention("SHA-00-000").is_none());

        let tier4 = catalog.interventions_for("SHA-08", Some("level-4"));
        assert_eq!(tier4.len(), 1);
        assert!(catalog.interventions_for("SHA-08", Some("level-5")).is_empty());
        assert_eq!(catalog.interventions_for("SHA-01", None).len(), 1);
    }

    #[test]
    fn test_suite_lookups() {
        let suite: TestSuite = serde_yaml::from_str(SUITE_YAML).unwrap();
        assert!(suite.group("positive").is_some());
        assert!(suite.group("smoke").is_none());
        assert_eq!(suite.cases_for_code("SHA-08-005").len(), 1);
        assert_eq!(suite.titles(), vec!["Valid claim", "Unknown tariff code"]);
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let catalog_path = dir.path().join("catalog.yaml");
        let suite_path = dir.path().join("suite.yaml");
        std::fs::write(&catalog_path, CATALOG_YAML).unwrap();
        std::fs::write(&suite_path, SUITE_YAML).unwrap();

        assert_eq!(CatalogStore::load(&catalog_path).unwrap().packages.len(), 1);
        assert_eq!(load_suite(&suite_path).unwrap().groups.len(), 2);
    }

    #[test]
    fn test_malformed_suite_is_a_suite_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("suite.yaml");
        std::fs::write(&path, "groups: {not: [a, suite").unwrap();
        assert!(matches!(
            load_suite(&path).unwrap_err(),
            Error::SuiteParse(_)
        ));
    }
}
