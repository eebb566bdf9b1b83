use serde::{Deserialize, Serialize};

/// Company record as supplied by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_person: Option<String>,
}

/// Reference to a company stamped into a report header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRef {
    pub id: String,
    pub name: String,
}

impl From<&Company> for CompanyRef {
    fn from(company: &Company) -> Self {
        Self {
            id: company.id.clone(),
            name: company.name.clone(),
        }
    }
}

/// Read-only lookup into the company directory.
pub trait CompanyDirectory {
    fn company(&self, id: &str) -> Option<Company>;
}

/// Directory backed by a list of records, e.g. loaded from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMemoryDirectory {
    #[serde(default)]
    pub companies: Vec<Company>,
}

impl InMemoryDirectory {
    pub fn new(companies: Vec<Company>) -> Self {
        Self { companies }
    }
}

impl CompanyDirectory for InMemoryDirectory {
    fn company(&self, id: &str) -> Option<Company> {
        self.companies
            .iter()
            .find(|company| company.id == id)
            .cloned()
    }
}
