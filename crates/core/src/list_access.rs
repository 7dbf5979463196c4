// crates/core/src/list_access.rs

//! Generic read/create/update/delete against SharePoint lists.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::error::ListError;
use crate::list_registry::{ListDescriptor, ListRegistry};
use crate::records::ListRecord;
use crate::transport::{HttpRequest, HttpResponse, Transport};
use crate::types::{ItemId, ListItem};

/// OData query fragments. Passed through verbatim: callers are responsible
/// for OData-safe values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub select: Option<String>,
    pub filter: Option<String>,
    pub expand: Option<String>,
    pub orderby: Option<String>,
    pub top: Option<u32>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, select: impl Into<String>) -> Self {
        self.select = Some(select.into());
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn expand(mut self, expand: impl Into<String>) -> Self {
        self.expand = Some(expand.into());
        self
    }

    pub fn orderby(mut self, orderby: impl Into<String>) -> Self {
        self.orderby = Some(orderby.into());
        self
    }

    pub fn top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    /// `?$select=...&$filter=...`, or an empty string.
    pub fn to_query_string(&self) -> String {
        let mut parts = Vec::new();
        if let Some(s) = &self.select {
            parts.push(format!("$select={s}"));
        }
        if let Some(f) = &self.filter {
            parts.push(format!("$filter={f}"));
        }
        if let Some(e) = &self.expand {
            parts.push(format!("$expand={e}"));
        }
        if let Some(o) = &self.orderby {
            parts.push(format!("$orderby={o}"));
        }
        if let Some(t) = self.top {
            parts.push(format!("$top={t}"));
        }

        if parts.is_empty() {
            String::new()
        } else {
            format!("?{}", parts.join("&"))
        }
    }
}

/// Read side of the list layer. Implemented by the live client and by the
/// mock provider so either can back the UI.
pub trait ListReader {
    /// Items of a list. Only an unknown list key is an error; every other
    /// failure is logged and yields an empty result.
    fn get_items(&self, key: &str, query: &ListQuery) -> Result<Vec<ListItem>, ListError>;

    /// Read and decode into `R`, skipping rows that do not decode.
    fn get_records<R: ListRecord>(&self, query: &ListQuery) -> Result<Vec<R>, ListError>
    where
        Self: Sized,
    {
        let items = self.get_items(R::LIST_KEY, query)?;
        Ok(decode_records(R::LIST_KEY, &items))
    }
}

pub(crate) fn decode_records<R: ListRecord>(key: &str, items: &[ListItem]) -> Vec<R> {
    items
        .iter()
        .filter_map(|item| match item.decode::<R>() {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(list = key, id = item.id, error = %e, "skipping undecodable item");
                None
            }
        })
        .collect()
}

#[derive(Deserialize)]
struct VerboseCollection {
    d: VerboseResults,
}

#[derive(Deserialize)]
struct VerboseResults {
    #[serde(default)]
    results: Vec<Value>,
}

#[derive(Deserialize)]
struct VerboseError {
    error: VerboseErrorBody,
}

#[derive(Deserialize)]
struct VerboseErrorBody {
    message: VerboseErrorMessage,
}

#[derive(Deserialize)]
struct VerboseErrorMessage {
    value: String,
}

/// Extract `error.message.value` from a SharePoint error body.
fn server_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<VerboseError>(body)
        .ok()
        .map(|e| e.error.message.value)
}

fn status_error(resp: &HttpResponse, fallback: &str) -> ListError {
    ListError::Status {
        status: resp.status,
        message: server_error_message(&resp.body).unwrap_or_else(|| fallback.to_string()),
    }
}

/// Live list client for one site.
pub struct ListClient<T> {
    transport: T,
    registry: Arc<ListRegistry>,
    site_url: String,
}

impl<T: Transport> ListClient<T> {
    pub fn new(transport: T, registry: Arc<ListRegistry>, site_url: impl Into<String>) -> Self {
        Self {
            transport,
            registry,
            site_url: site_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn descriptor(&self, key: &str) -> Result<&ListDescriptor, ListError> {
        self.registry.get(key).ok_or_else(|| {
            error!(list = key, "list configuration not found");
            ListError::ConfigNotFound(key.to_string())
        })
    }

    fn items_url(&self, descriptor: &ListDescriptor) -> String {
        format!(
            "{}/_api/web/lists(guid'{}')/items",
            self.site_url, descriptor.guid
        )
    }

    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ListError> {
        self.transport
            .send(request)
            .map_err(|e| ListError::Network(format!("{e:#}")))
    }

    /// Fetch a fresh request digest. Never cached.
    pub fn request_digest(&self) -> Result<String, ListError> {
        let url = format!("{}/_api/contextinfo", self.site_url);
        let resp = self.send(&HttpRequest::post(url))?;
        if !resp.is_success() {
            return Err(status_error(&resp, "could not obtain request digest"));
        }

        let body: Value = serde_json::from_str(&resp.body)?;
        body.pointer("/d/GetContextWebInformation/FormDigestValue")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ListError::Decode("contextinfo has no FormDigestValue".to_string()))
    }

    fn stamped_payload(
        descriptor: &ListDescriptor,
        fields: Map<String, Value>,
    ) -> Result<Value, ListError> {
        if fields.contains_key("__metadata") {
            return Err(ListError::Invalid(
                "payload must not carry its own __metadata".to_string(),
            ));
        }
        let mut payload = Map::new();
        payload.insert(
            "__metadata".to_string(),
            serde_json::json!({ "type": descriptor.metadata_type() }),
        );
        payload.extend(fields);
        Ok(Value::Object(payload))
    }

    /// Create an item. Only HTTP 201 counts as success.
    pub fn create_item(
        &self,
        key: &str,
        fields: Map<String, Value>,
    ) -> Result<ListItem, ListError> {
        let descriptor = self.descriptor(key)?;
        let payload = Self::stamped_payload(descriptor, fields)?;
        let digest = self.request_digest()?;

        let request = HttpRequest::post(self.items_url(descriptor))
            .header("X-RequestDigest", digest)
            .json_body(&payload);
        let resp = self.send(&request)?;

        if resp.status != 201 {
            let err = status_error(&resp, &format!("could not create item in '{key}'"));
            error!(list = key, error = %err, "create failed");
            return Err(err);
        }

        let mut body: Value = serde_json::from_str(&resp.body)?;
        let raw = match body.get_mut("d") {
            Some(d) => d.take(),
            None => body,
        };
        let item = ListItem::from_odata(raw)?;
        debug!(list = key, id = item.id, "item created");
        Ok(item)
    }

    /// Merge `fields` into an existing item.
    pub fn update_item(
        &self,
        key: &str,
        id: ItemId,
        fields: Map<String, Value>,
    ) -> Result<(), ListError> {
        let descriptor = self.descriptor(key)?;
        let payload = Self::stamped_payload(descriptor, fields)?;
        let digest = self.request_digest()?;

        let request = HttpRequest::post(format!("{}({id})", self.items_url(descriptor)))
            .header("X-RequestDigest", digest)
            .header("X-HTTP-Method", "MERGE")
            .header("IF-MATCH", "*")
            .json_body(&payload);
        let resp = self.send(&request)?;

        if !resp.is_success() {
            let err = status_error(&resp, &format!("could not update item {id} in '{key}'"));
            error!(list = key, id, error = %err, "update failed");
            return Err(err);
        }

        debug!(list = key, id, "item updated");
        Ok(())
    }

    /// Delete an item. 204 or any other 2xx is success.
    pub fn delete_item(&self, key: &str, id: ItemId) -> Result<(), ListError> {
        let descriptor = self.descriptor(key)?;
        let digest = self.request_digest()?;

        let url = format!(
            "{}/_api/web/lists/getbytitle('{}')/items({id})",
            self.site_url,
            urlencoding::encode(&descriptor.title.replace('\'', "''"))
        );
        let request = HttpRequest::delete(url)
            .header("X-RequestDigest", digest)
            .header("IF-MATCH", "*");
        let resp = self.send(&request)?;

        if !resp.is_success() {
            let err = status_error(&resp, &format!("could not delete item {id} from '{key}'"));
            error!(list = key, id, error = %err, "delete failed");
            return Err(err);
        }

        debug!(list = key, id, "item deleted");
        Ok(())
    }

    /// GET `_api/web`; true when the site answers with 2xx.
    pub fn probe(&self) -> bool {
        let url = format!("{}/_api/web", self.site_url);
        match self.transport.send(&HttpRequest::get(url)) {
            Ok(resp) => resp.is_success(),
            Err(e) => {
                debug!(error = %e, "connectivity probe failed");
                false
            }
        }
    }
}

impl<T: Transport> ListReader for ListClient<T> {
    fn get_items(&self, key: &str, query: &ListQuery) -> Result<Vec<ListItem>, ListError> {
        let descriptor = self.descriptor(key)?;
        let url = format!("{}{}", self.items_url(descriptor), query.to_query_string());

        let resp = match self.send(&HttpRequest::get(&url)) {
            Ok(resp) => resp,
            Err(e) => {
                error!(list = key, error = %e, "read failed");
                return Ok(Vec::new());
            }
        };

        if !resp.is_success() {
            let err = status_error(&resp, "read failed");
            error!(list = key, status = resp.status, error = %err, "read failed");
            return Ok(Vec::new());
        }

        let collection: VerboseCollection = match serde_json::from_str(&resp.body) {
            Ok(c) => c,
            Err(e) => {
                error!(list = key, error = %e, "read returned an unreadable body");
                return Ok(Vec::new());
            }
        };

        let items = collection
            .d
            .results
            .into_iter()
            .filter_map(|raw| match ListItem::from_odata(raw) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(list = key, error = %e, "skipping malformed item");
                    None
                }
            })
            .collect::<Vec<_>>();

        debug!(list = key, count = items.len(), "items read");
        Ok(items)
    }
}
