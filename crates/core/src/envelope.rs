//! Response envelope used by every backend endpoint.

use serde::{Deserialize, Serialize};

/// `{ success, message, data }` wrapper around endpoint payloads.
///
/// Some endpoints also echo an HTTP-like `status` field; it is informational
/// and not relied upon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub data: T,
}

impl<T> ApiEnvelope<T> {
    pub fn into_data(self) -> T {
        self.data
    }
}

/// Pagination block returned alongside list payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub pages: u32,
}

impl Pagination {
    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_tolerates_missing_status() {
        let raw = r#"{"success":true,"message":"ok","data":{"total":3,"page":1,"limit":2,"pages":2}}"#;
        let env: ApiEnvelope<Pagination> = serde_json::from_str(raw).unwrap();
        assert!(env.success);
        assert_eq!(env.status, None);
        assert!(env.data.has_next());
    }

    #[test]
    fn last_page_has_no_next() {
        let p = Pagination {
            total: 4,
            page: 2,
            limit: 2,
            pages: 2,
        };
        assert!(!p.has_next());
    }
}
