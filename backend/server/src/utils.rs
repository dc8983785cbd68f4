use std::collections::{BTreeMap, btree_map::Entry};

use serde::Deserialize;
use serde_json::Value;

use crate::{
    application::{NewApplication, SearchFilters},
    error::AppError::{self, DuplicateField, InvalidField, MissingFields},
};

pub const NESTED_FILTERS_KEY: &str = "searchFilters";

/// Raw form body: the four required fields plus anything else the form sends.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationPayload {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub country: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Email is kept as submitted, surrounding whitespace fails the store's schema check.
pub fn get_application_from_payload(
    payload: ApplicationPayload,
) -> Result<NewApplication, AppError> {
    let missing: Vec<&'static str> = [
        ("email", &payload.email),
        ("firstName", &payload.first_name),
        ("lastName", &payload.last_name),
        ("country", &payload.country),
    ]
    .into_iter()
    .filter(|(_, value)| is_blank(value.as_deref()))
    .map(|(name, _)| name)
    .collect();

    if !missing.is_empty() {
        return Err(MissingFields(missing));
    }

    let search_filters = get_search_filters(payload.extra)?;

    Ok(NewApplication {
        email: payload.email.unwrap_or_default(),
        first_name: payload.first_name.unwrap_or_default().trim().to_string(),
        last_name: payload.last_name.unwrap_or_default().trim().to_string(),
        country: payload.country.unwrap_or_default().trim().to_string(),
        search_filters,
    })
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Folds every non-required field into the filter map.
///
/// A nested `searchFilters` object is merged in, nulls are dropped and any
/// other non-string value is rejected. A key sent both at the top level and
/// inside `searchFilters` is rejected rather than letting one value win.
pub fn get_search_filters(extra: BTreeMap<String, Value>) -> Result<SearchFilters, AppError> {
    let mut filters = SearchFilters::new();

    for (key, value) in extra {
        match value {
            Value::Object(nested) if key == NESTED_FILTERS_KEY => {
                for (nested_key, nested_value) in nested {
                    insert_filter(&mut filters, nested_key, nested_value)?;
                }
            }
            value => insert_filter(&mut filters, key, value)?,
        }
    }

    Ok(filters)
}

fn insert_filter(filters: &mut SearchFilters, key: String, value: Value) -> Result<(), AppError> {
    match value {
        Value::String(s) => match filters.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(s);
                Ok(())
            }
            Entry::Occupied(slot) => Err(DuplicateField(slot.key().clone())),
        },
        Value::Null => Ok(()),
        _ => Err(InvalidField(key)),
    }
}
