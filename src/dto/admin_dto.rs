use serde::Deserialize;
use validator::Validate;

use crate::models::job::SpamFlag;
use crate::models::user::Role;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminUpdateUserPayload {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminUpdateCompanyPayload {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub featured: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminUpdateJobPayload {
    pub featured: Option<bool>,
    pub published: Option<bool>,
    pub spam: Option<SpamFlag>,
}

/// `?confirm=true&reason=...` on destructive admin calls.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfirmQuery {
    pub confirm: Option<bool>,
    pub reason: Option<String>,
}

impl ConfirmQuery {
    pub fn confirmed(&self) -> bool {
        self.confirm.unwrap_or(false)
    }

    pub fn reason(&self) -> Option<String> {
        self.reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuditLogQuery {
    pub entity_type: Option<String>,
    pub page: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdminListQuery {
    pub page: Option<usize>,
}
