use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ListError;
use crate::permissions::same_group;

/// Numeric SharePoint item id.
pub type ItemId = u32;

/// One row of a SharePoint list, fields keyed by internal name.
///
/// Not cached anywhere; every read returns fresh items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub id: ItemId,
    pub title: Option<String>,
    pub fields: Map<String, Value>,
}

impl ListItem {
    /// Build from one entry of an OData verbose result.
    pub fn from_odata(value: Value) -> Result<Self, ListError> {
        let Value::Object(mut fields) = value else {
            return Err(ListError::Decode("list item is not an object".to_string()));
        };

        fields.remove("__metadata");

        let id = fields
            .get("Id")
            .or_else(|| fields.get("ID"))
            .and_then(Value::as_u64)
            .and_then(|id| ItemId::try_from(id).ok())
            .ok_or_else(|| ListError::Decode("list item has no numeric Id".to_string()))?;

        let title = fields
            .get("Title")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self { id, title, fields })
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    /// Decode into a typed record.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ListError> {
        let mut fields = self.fields.clone();
        fields.insert("Id".to_string(), Value::from(self.id));
        Ok(serde_json::from_value(Value::Object(fields))?)
    }
}

/// The signed-in user as resolved by the bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUserContext {
    /// Raw login name including the claims prefix.
    pub login_name: String,
    /// Login name without claims prefix.
    pub username: String,
    pub id: u32,
    pub display_name: String,
    pub email: String,
    pub is_site_admin: bool,
    pub groups: BTreeSet<String>,
}

impl CurrentUserContext {
    pub fn is_member_of(&self, group: &str) -> bool {
        self.groups.iter().any(|g| same_group(g, group))
    }

    /// Replace the group set (mock/test override).
    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }
}
