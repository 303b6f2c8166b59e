//! Admin dashboard DTOs mirrored from the backend.

use serde::{Deserialize, Serialize};

use crate::error::FormError;

/// Paged listing. Backends disagree on the items key, so the common ones are aliased.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(alias = "data", alias = "rows")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRow {
    pub id: u64,
    pub mb_id: String,
    #[serde(default)]
    pub mb_name: String,
    #[serde(default)]
    pub mb_nick: String,
    #[serde(default)]
    pub mb_level: u8,
    #[serde(default)]
    pub mb_email: Option<String>,
    #[serde(default)]
    pub mb_hp: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRow {
    pub id: u64,
    pub order_id: String,
    #[serde(default)]
    pub mb_id: Option<String>,
    pub amount: u64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub approved_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub last_seen_at: Option<String>,
}

/// Body of `PUT /api/admin/members/:id/level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelChange {
    pub mb_level: u8,
}

impl LevelChange {
    pub fn new(mb_level: u8) -> Result<Self, FormError> {
        if !(1..=10).contains(&mb_level) {
            return Err(FormError::InvalidLevel);
        }
        Ok(Self { mb_level })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_bounds() {
        assert!(LevelChange::new(1).is_ok());
        assert!(LevelChange::new(10).is_ok());
        assert_eq!(LevelChange::new(0), Err(FormError::InvalidLevel));
        assert_eq!(LevelChange::new(11), Err(FormError::InvalidLevel));
    }

    #[test]
    fn test_page_accepts_data_key() {
        let page: Page<MemberRow> =
            serde_json::from_str(r#"{"data":[{"id":1,"mb_id":"lee"}],"total":1}"#).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, Some(1));
    }

    #[test]
    fn test_member_row_tolerates_missing_fields() {
        let row: MemberRow = serde_json::from_str(r#"{"id":3,"mb_id":"kim"}"#).unwrap();
        assert_eq!(row.mb_level, 0);
        assert!(row.mb_email.is_none());
    }
}
