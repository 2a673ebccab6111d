//! Account directory - where account profiles come from

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use txguard_core::AccountProfile;

/// Read-only source of account profiles
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn profile(&self, account_id: &str) -> Option<AccountProfile>;
}

/// Profiles held in memory, keyed by account id
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    profiles: HashMap<String, AccountProfile>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_profiles(profiles: impl IntoIterator<Item = AccountProfile>) -> Self {
        Self {
            profiles: profiles
                .into_iter()
                .map(|p| (p.account_id.clone(), p))
                .collect(),
        }
    }

    /// Load a JSON array of profiles
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        let profiles: Vec<AccountProfile> = serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(Self::from_profiles(profiles))
    }

    pub fn insert(&mut self, profile: AccountProfile) {
        self.profiles.insert(profile.account_id.clone(), profile);
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[async_trait]
impl AccountDirectory for InMemoryDirectory {
    async fn profile(&self, account_id: &str) -> Option<AccountProfile> {
        self.profiles.get(account_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use txguard_core::Currency;

    fn profile(id: &str) -> AccountProfile {
        AccountProfile {
            account_id: id.to_string(),
            customer_name: "John Doe".to_string(),
            account_type: "Checking".to_string(),
            balance: dec!(15000),
            currency: Currency::Usd,
            daily_limit: dec!(10000),
            country: "United States".to_string(),
            usual_countries: vec!["United States".to_string()],
            usual_transaction_amounts: vec![dec!(1200)],
            usual_recipients: vec!["Jane Smith".to_string()],
            transaction_history_summary: String::new(),
        }
    }

    #[tokio::test]
    async fn test_lookup() {
        let mut directory = InMemoryDirectory::from_profiles(vec![profile("ACC-12345")]);
        directory.insert(profile("ACC-67890"));

        assert_eq!(directory.len(), 2);
        assert!(directory.profile("ACC-12345").await.is_some());
        assert!(directory.profile("ACC-00000").await.is_none());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{
                "account_id": "ACC-12345",
                "customer_name": "John Doe",
                "account_type": "Checking",
                "balance": "15000.00",
                "currency": "USD",
                "daily_limit": "10000.00",
                "country": "United States",
                "usual_countries": ["United States", "Canada"],
                "usual_transaction_amounts": ["1200", "500"],
                "usual_recipients": ["Jane Smith"]
            }}]"#
        )
        .unwrap();

        let directory = InMemoryDirectory::from_file(file.path()).unwrap();
        assert_eq!(directory.len(), 1);
    }
}
