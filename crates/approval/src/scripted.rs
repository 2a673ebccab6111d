//! Scripted gateway - automated reviewer for tests and replays

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::error::GatewayError;
use crate::gateway::{ConfirmationGateway, ConfirmationRequest};
use crate::verdict::RawResponse;

/// Answers confirmation requests from a script and records every call.
///
/// Responses are consumed per transaction id, in order. Transactions with
/// no scripted response fall back to the default queue. When both are
/// empty the gateway reports a transport error, which holds the
/// transaction rather than approving it.
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    by_transaction: Mutex<HashMap<String, VecDeque<RawResponse>>>,
    fallback: Mutex<VecDeque<RawResponse>>,
    calls: Mutex<Vec<ConfirmationRequest>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for one transaction
    pub fn respond(self, transaction_id: impl Into<String>, response: RawResponse) -> Self {
        self.push(transaction_id, response);
        self
    }

    /// Queue a response for any transaction without its own script
    pub fn respond_any(self, response: RawResponse) -> Self {
        if let Ok(mut fallback) = self.fallback.lock() {
            fallback.push_back(response);
        }
        self
    }

    /// Queue a response after construction (e.g. before a `resolve`)
    pub fn push(&self, transaction_id: impl Into<String>, response: RawResponse) {
        if let Ok(mut scripts) = self.by_transaction.lock() {
            scripts
                .entry(transaction_id.into())
                .or_default()
                .push_back(response);
        }
    }

    /// Load scripted responses from a JSON object keyed by transaction id
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        let scripts: HashMap<String, Vec<RawResponse>> = serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        let gateway = Self::new();
        for (transaction_id, responses) in scripts {
            for response in responses {
                gateway.push(transaction_id.clone(), response);
            }
        }
        Ok(gateway)
    }

    /// Every request received, in order
    pub fn calls(&self) -> Vec<ConfirmationRequest> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }

    fn next_response(&self, transaction_id: &str) -> Option<RawResponse> {
        let scripted = self
            .by_transaction
            .lock()
            .ok()
            .and_then(|mut scripts| scripts.get_mut(transaction_id).and_then(|q| q.pop_front()));

        scripted.or_else(|| self.fallback.lock().ok().and_then(|mut q| q.pop_front()))
    }
}

#[async_trait]
impl ConfirmationGateway for ScriptedGateway {
    fn name(&self) -> &str {
        "ScriptedGateway"
    }

    async fn confirm(&self, request: &ConfirmationRequest) -> Result<RawResponse, GatewayError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }

        self.next_response(&request.transaction.id).ok_or_else(|| {
            GatewayError::Transport(format!(
                "no scripted response for {}",
                request.transaction.id
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use txguard_core::{Amount, Currency, Transaction, TransactionType};
    use txguard_risk::{RiskAssessment, RiskLevel};

    fn request(id: &str) -> ConfirmationRequest {
        let tx = Transaction::new(
            id,
            "ACC-12345",
            TransactionType::Wire,
            Amount::new(dec!(25000)).unwrap(),
            Currency::Usd,
            "Acme Corp",
            Utc::now(),
        );
        let assessment = RiskAssessment {
            level: RiskLevel::High,
            factors: vec!["First-time recipient".to_string()],
            rationale: String::new(),
            fail_closed: false,
        };
        ConfirmationRequest::new(tx, &assessment, "Analyst")
    }

    #[tokio::test]
    async fn test_per_transaction_order() {
        let gateway = ScriptedGateway::new()
            .respond("TRX-002", RawResponse::new("investigate", "A"))
            .respond("TRX-002", RawResponse::new("approve", "A"));

        let first = gateway.confirm(&request("TRX-002")).await.unwrap();
        let second = gateway.confirm(&request("TRX-002")).await.unwrap();

        assert_eq!(first.verdict, "investigate");
        assert_eq!(second.verdict, "approve");
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test]
    async fn test_fallback_queue() {
        let gateway = ScriptedGateway::new()
            .respond("TRX-002", RawResponse::new("deny", "A"))
            .respond_any(RawResponse::new("approve", "B"));

        let other = gateway.confirm(&request("TRX-007")).await.unwrap();
        assert_eq!(other.responder, "B");
    }

    #[tokio::test]
    async fn test_exhausted_script_is_transport_error() {
        let gateway = ScriptedGateway::new();
        let result = gateway.confirm(&request("TRX-002")).await;

        assert!(matches!(result, Err(GatewayError::Transport(_))));
        assert_eq!(gateway.calls()[0].transaction.id, "TRX-002");
    }

    #[tokio::test]
    async fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"TRX-002": [{{"verdict": "approve", "responder": "Security Analyst Smith"}}]}}"#
        )
        .unwrap();

        let gateway = ScriptedGateway::from_file(file.path()).unwrap();
        let response = gateway.confirm(&request("TRX-002")).await.unwrap();
        assert_eq!(response.responder, "Security Analyst Smith");
    }
}
