//! CRM resource collections and record key mapping.

use super::client::ApiClient;
use crate::logger::Logger;
use crate::retry::{Failure, RetryOptions};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Collections exposed by the CRM backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Bots,
    Leads,
    Team,
    Billing,
    Documents,
    Agents,
}

impl Resource {
    pub const ALL: [Resource; 6] = [
        Resource::Bots,
        Resource::Leads,
        Resource::Team,
        Resource::Billing,
        Resource::Documents,
        Resource::Agents,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Resource::Bots => "bots",
            Resource::Leads => "leads",
            Resource::Team => "team",
            Resource::Billing => "billing",
            Resource::Documents => "documents",
            Resource::Agents => "agents",
        }
    }

    /// Endpoint path relative to the API base URL.
    pub fn path(self) -> String {
        format!("/api/{}", self.name())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Resource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Resource::ALL
            .into_iter()
            .find(|r| r.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Resource::ALL.iter().map(|r| r.name()).collect();
                anyhow::anyhow!("unknown resource {:?} (expected one of: {})", s, names.join(", "))
            })
    }
}

/// `created_at` -> `createdAt`. Leading underscores and doubled separators are dropped.
pub fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for ch in key.chars() {
        if ch == '_' {
            upper_next = !out.is_empty();
            continue;
        }
        if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Recursively rename object keys from snake_case to camelCase.
pub fn camelize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (snake_to_camel(&k), camelize_keys(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(camelize_keys).collect()),
        other => other,
    }
}

/// Pull the record list out of a collection response.
///
/// Accepts a bare array, or an object wrapping it in `items` or `data`.
/// Anything else is treated as a single record; `null` as no records.
fn into_records(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        Value::Object(mut map) => {
            for key in ["items", "data"] {
                if matches!(map.get(key), Some(Value::Array(_))) {
                    if let Some(Value::Array(items)) = map.remove(key) {
                        return items;
                    }
                }
            }
            vec![Value::Object(map)]
        }
        other => vec![other],
    }
}

impl ApiClient {
    /// Fetch a resource collection with retry, returning camelCase records.
    pub async fn list(
        &self,
        resource: Resource,
        options: &RetryOptions,
        logger: &Logger,
    ) -> Result<Vec<Value>, Failure> {
        let path = resource.path();
        let body = self.get_with_retry(&path, options, logger).await?;
        let records: Vec<Value> = into_records(body).into_iter().map(camelize_keys).collect();
        tracing::debug!("fetched {} {} records", records.len(), resource);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resource_paths_and_parsing() {
        assert_eq!(Resource::Leads.path(), "/api/leads");
        assert_eq!(Resource::Team.path(), "/api/team");
        assert_eq!("Agents".parse::<Resource>().unwrap(), Resource::Agents);
        for r in Resource::ALL {
            assert_eq!(r.name().parse::<Resource>().unwrap(), r);
        }
        let err = "tenants".parse::<Resource>().unwrap_err();
        assert!(err.to_string().contains("bots, leads"));
    }

    #[test]
    fn snake_to_camel_cases() {
        assert_eq!(snake_to_camel("created_at"), "createdAt");
        assert_eq!(snake_to_camel("lead_source_id"), "leadSourceId");
        assert_eq!(snake_to_camel("id"), "id");
        assert_eq!(snake_to_camel("_private"), "private");
        assert_eq!(snake_to_camel("move__in_date"), "moveInDate");
        assert_eq!(snake_to_camel("alreadyCamel"), "alreadyCamel");
    }

    #[test]
    fn camelize_nested_records() {
        let body = json!({
            "lead_id": 7,
            "contact_info": {"phone_number": "555", "email": null},
            "tour_slots": [{"start_time": "10:00"}],
        });
        let expected = json!({
            "leadId": 7,
            "contactInfo": {"phoneNumber": "555", "email": null},
            "tourSlots": [{"startTime": "10:00"}],
        });
        assert_eq!(camelize_keys(body), expected);
    }

    #[test]
    fn records_from_wrapped_and_bare_bodies() {
        assert_eq!(into_records(json!([1, 2])), vec![json!(1), json!(2)]);
        assert_eq!(into_records(json!({"items": [{"a": 1}], "total": 1})), vec![json!({"a": 1})]);
        assert_eq!(into_records(json!({"data": []})), Vec::<Value>::new());
        assert_eq!(into_records(json!({"plan": "pro"})), vec![json!({"plan": "pro"})]);
        assert!(into_records(Value::Null).is_empty());
    }
}
