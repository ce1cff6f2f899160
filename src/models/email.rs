//! Outbound report and delivery types

use serde::{Deserialize, Serialize};

/// A single email address with an optional display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Recipient {
    pub fn new<E: Into<String>>(email: E, name: Option<String>) -> Self {
        Self {
            email: email.into(),
            name: name.filter(|n| !n.trim().is_empty()),
        }
    }

    /// Pair comma-delimited address and name lists by position
    ///
    /// Blank addresses are skipped. A missing name leaves the recipient
    /// unnamed and surplus names are ignored.
    pub fn zip_delimited(addresses: &str, names: &str) -> Vec<Recipient> {
        let mut names = names.split(',').map(|n| n.trim().to_string());
        addresses
            .split(',')
            .map(str::trim)
            .map(|address| (address, names.next()))
            .filter(|(address, _)| !address.is_empty())
            .map(|(address, name)| Recipient::new(address, name))
            .collect()
    }
}

/// A formatted report ready to attach
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub filename: String,
    pub content: Vec<u8>,
    /// Number of data rows (header excluded)
    pub rows: usize,
}

/// Everything the notifier needs for one send
#[derive(Debug, Clone)]
pub struct ReportEmail {
    pub to: Vec<Recipient>,
    pub cc: Vec<Recipient>,
    pub subject: String,
    pub body: String,
    pub report: Report,
}

/// Acknowledgement from the email provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub status: u16,
    pub message_id: Option<String>,
}
