//! Resource records: attributes plus the prefix values that place them.
//!
//! A [`Record`] keeps two maps:
//!
//! - `attributes`: the body of the resource
//! - `prefix_values`: identifying values that belong in the URL path
//!   (`lawyer_id`, `address_id`, site prefix placeholders)
//!
//! Foreign keys of declared belongs-to associations (including ones
//! declared further up the ancestry) live in both maps, so a record
//! loaded from a response that omits them keeps its nesting context, and
//! a foreign key that the path does not claim still reaches the server in
//! the body.
//!
//! Records are created through
//! [`ResourceClient::new_record`](crate::rest::ResourceClient::new_record)
//! or returned by the client's fetch operations.

use std::collections::{BTreeSet, HashMap};

use serde_json::{Map, Value};

use crate::rest::errors::ResourceError;
use crate::rest::path::{is_blank, Params};
use crate::rest::resource::ResourceClient;

/// The cached result of resolving an association.
#[derive(Debug, Clone, PartialEq)]
pub enum Related {
    /// A belongs-to or has-one target.
    One(Box<Record>),
    /// A has-many collection.
    Many(Vec<Record>),
}

impl Related {
    /// Returns the single record, if this is [`Related::One`].
    #[must_use]
    pub fn as_one(&self) -> Option<&Record> {
        match self {
            Self::One(record) => Some(record),
            Self::Many(_) => None,
        }
    }

    /// Returns the records, if this is [`Related::Many`].
    #[must_use]
    pub fn as_many(&self) -> Option<&[Record]> {
        match self {
            Self::One(_) => None,
            Self::Many(records) => Some(records),
        }
    }
}

/// Which keys of a record are foreign keys or other prefix parameters.
///
/// Computed once per record from the registry and the site prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RecordKeys {
    /// `<name>_id` for every transitive belongs-to attribute.
    pub(crate) foreign_keys: BTreeSet<String>,
    /// Site prefix placeholders that are not foreign keys.
    pub(crate) placeholders: BTreeSet<String>,
}

/// One instance of a resource type.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    resource_type: String,
    attributes: Map<String, Value>,
    prefix_values: Params,
    keys: RecordKeys,
    related: HashMap<String, Related>,
}

impl Record {
    pub(crate) fn blank(resource_type: impl Into<String>, keys: RecordKeys) -> Self {
        Self {
            resource_type: resource_type.into(),
            attributes: Map::new(),
            prefix_values: Params::new(),
            keys,
            related: HashMap::new(),
        }
    }

    /// Returns the resource type name.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Returns the `id` attribute, unless it is absent, `null` or `""`.
    #[must_use]
    pub fn id(&self) -> Option<&Value> {
        self.attributes.get("id").filter(|id| !is_blank(id))
    }

    /// Returns `true` if the record has not been saved yet (no id).
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.id().is_none()
    }

    /// Returns the body attributes.
    #[must_use]
    pub const fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Returns the values placed in the URL path.
    #[must_use]
    pub const fn prefix_values(&self) -> &Params {
        &self.prefix_values
    }

    /// Returns the foreign keys this record tracks (`lawyer_id`, ...).
    pub fn foreign_keys(&self) -> impl Iterator<Item = &str> {
        self.keys.foreign_keys.iter().map(String::as_str)
    }

    /// Returns an attribute, falling back to prefix values for keys that
    /// only live in the path (site prefix placeholders).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes
            .get(key)
            .or_else(|| self.prefix_values.get(key))
    }

    /// Sets an attribute.
    ///
    /// Foreign keys are mirrored into the prefix values; site prefix
    /// placeholders only go to the prefix values.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();

        if self.keys.placeholders.contains(&key) {
            self.prefix_values.insert(key, value);
            return;
        }
        if self.keys.foreign_keys.contains(&key) {
            self.prefix_values.insert(key.clone(), value.clone());
        }
        self.attributes.insert(key, value);
    }

    /// Removes an attribute (and its prefix value, if it has one).
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let prefix = self.prefix_values.remove(key);
        self.attributes.remove(key).or(prefix)
    }

    /// Merges `incoming` into the record.
    ///
    /// Foreign keys missing from `incoming` are backfilled from the current
    /// prefix values, and every foreign key present afterwards is written
    /// to both maps.
    pub fn load(&mut self, incoming: Map<String, Value>) {
        let mut incoming = incoming;

        for foreign_key in &self.keys.foreign_keys {
            let missing = incoming.get(foreign_key).map_or(true, Value::is_null);
            if missing {
                if let Some(value) = self.prefix_values.get(foreign_key) {
                    incoming.insert(foreign_key.clone(), value.clone());
                }
            }
            if let Some(value) = incoming.get(foreign_key) {
                self.prefix_values
                    .insert(foreign_key.clone(), value.clone());
            }
        }

        for (key, value) in incoming {
            if self.keys.placeholders.contains(&key) {
                self.prefix_values.insert(key, value);
            } else {
                self.attributes.insert(key, value);
            }
        }
    }

    /// Replaces all attributes with `incoming`, keeping the prefix values,
    /// and drops cached associations.
    pub(crate) fn replace(&mut self, incoming: Map<String, Value>) {
        self.attributes.clear();
        self.related.clear();
        self.load(incoming);
    }

    /// Seeds prefix values (e.g. the prefix options a record was fetched with).
    pub(crate) fn with_prefix_values(mut self, prefix_values: Params) -> Self {
        self.prefix_values = prefix_values;
        self
    }

    /// Returns the value of `<attribute>_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnknownAssociation`] unless `attribute` is a
    /// belongs-to attribute of this type or one of its ancestors.
    pub fn get_foreign_key(&self, attribute: &str) -> Result<Option<&Value>, ResourceError> {
        let foreign_key = self.checked_foreign_key(attribute)?;
        Ok(self
            .prefix_values
            .get(&foreign_key)
            .or_else(|| self.attributes.get(&foreign_key))
            .filter(|value| !value.is_null()))
    }

    /// Sets `<attribute>_id` in both the prefix values and the attributes.
    ///
    /// Setting `null` removes the key from both. Any cached resolution of
    /// `attribute` is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnknownAssociation`] unless `attribute` is a
    /// belongs-to attribute of this type or one of its ancestors.
    pub fn set_foreign_key(
        &mut self,
        attribute: &str,
        value: impl Into<Value>,
    ) -> Result<(), ResourceError> {
        let foreign_key = self.checked_foreign_key(attribute)?;
        let value = value.into();

        self.related.remove(attribute);
        if value.is_null() {
            self.prefix_values.remove(&foreign_key);
            self.attributes.remove(&foreign_key);
        } else {
            self.prefix_values.insert(foreign_key.clone(), value.clone());
            self.attributes.insert(foreign_key, value);
        }
        Ok(())
    }

    fn checked_foreign_key(&self, attribute: &str) -> Result<String, ResourceError> {
        let foreign_key = format!("{attribute}_id");
        if self.keys.foreign_keys.contains(&foreign_key) {
            Ok(foreign_key)
        } else {
            Err(ResourceError::UnknownAssociation {
                resource: self.resource_type.clone(),
                attribute: attribute.to_string(),
            })
        }
    }

    /// Returns the related record(s) for `attribute`, fetching them on the
    /// first access.
    ///
    /// Later calls return the cached value without a request until the
    /// record is reloaded.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnknownAssociation`] if `attribute` is not
    /// declared on this type, and propagates resolution errors.
    pub async fn get_related(
        &mut self,
        client: &ResourceClient,
        attribute: &str,
    ) -> Result<&Related, ResourceError> {
        if self.related.contains_key(attribute) {
            tracing::trace!(resource = %self.resource_type, attribute, "association cache hit");
        } else {
            let association = client.registry().association(&self.resource_type, attribute)?;
            let related = association.resolve(client, self).await?;
            self.related.insert(attribute.to_string(), related);
        }

        self.related
            .get(attribute)
            .ok_or_else(|| ResourceError::UnknownAssociation {
                resource: self.resource_type.clone(),
                attribute: attribute.to_string(),
            })
    }

    /// Returns a previously resolved association without fetching.
    #[must_use]
    pub fn cached_related(&self, attribute: &str) -> Option<&Related> {
        self.related.get(attribute)
    }

    /// Drops every cached association.
    pub fn clear_related(&mut self) {
        self.related.clear();
    }

    /// The outgoing body attributes: everything except `claimed` keys.
    pub(crate) fn body_attributes(&self, claimed: &[String]) -> Map<String, Value> {
        self.attributes
            .iter()
            .filter(|(key, _)| !claimed.iter().any(|c| c == *key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(foreign_keys: &[&str], placeholders: &[&str]) -> RecordKeys {
        RecordKeys {
            foreign_keys: foreign_keys.iter().map(ToString::to_string).collect(),
            placeholders: placeholders.iter().map(ToString::to_string).collect(),
        }
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[test]
    fn test_set_mirrors_foreign_keys_into_prefix_values() {
        let mut record = Record::blank("LawyerPost", keys(&["lawyer_id", "post_id"], &[]));
        record.set("lawyer_id", 1);
        record.set("post_id", 2);
        record.set("title", "Hello");

        assert_eq!(record.attributes().get("lawyer_id"), Some(&json!(1)));
        assert_eq!(record.attributes().get("post_id"), Some(&json!(2)));
        assert_eq!(record.prefix_values().get("lawyer_id"), Some(&json!(1)));
        assert_eq!(record.prefix_values().get("post_id"), Some(&json!(2)));
        assert!(record.prefix_values().get("title").is_none());
    }

    #[test]
    fn test_placeholders_only_live_in_prefix_values() {
        let mut record = Record::blank("Lawyer", keys(&[], &["account_id"]));
        record.set("account_id", 7);

        assert!(record.attributes().get("account_id").is_none());
        assert_eq!(record.get("account_id"), Some(&json!(7)));
    }

    #[test]
    fn test_id_ignores_blank_values() {
        let mut record = Record::blank("Lawyer", RecordKeys::default());
        assert!(record.is_new());

        record.set("id", "");
        assert!(record.is_new());

        record.set("id", 5);
        assert_eq!(record.id(), Some(&json!(5)));
        assert!(!record.is_new());
    }

    #[test]
    fn test_load_backfills_foreign_keys_from_prefix_values() {
        let mut prefix = Params::new();
        prefix.insert("lawyer_id".to_string(), json!(2));
        let mut record =
            Record::blank("Address", keys(&["lawyer_id", "doctor_id"], &[])).with_prefix_values(prefix);

        record.load(object(json!({"id": 3, "street": "21st Ave NE"})));

        assert_eq!(record.attributes().get("lawyer_id"), Some(&json!(2)));
        assert_eq!(record.prefix_values().get("lawyer_id"), Some(&json!(2)));
        assert!(record.attributes().get("doctor_id").is_none());
        assert_eq!(record.id(), Some(&json!(3)));
    }

    #[test]
    fn test_load_prefers_incoming_foreign_keys() {
        let mut prefix = Params::new();
        prefix.insert("lawyer_id".to_string(), json!(2));
        let mut record =
            Record::blank("Address", keys(&["lawyer_id"], &[])).with_prefix_values(prefix);

        record.load(object(json!({"id": 3, "lawyer_id": 9})));

        assert_eq!(record.attributes().get("lawyer_id"), Some(&json!(9)));
        assert_eq!(record.prefix_values().get("lawyer_id"), Some(&json!(9)));
    }

    #[test]
    fn test_foreign_key_accessors() {
        let mut record = Record::blank("Phone", keys(&["address_id", "lawyer_id", "doctor_id"], &[]));

        record.set_foreign_key("doctor", 2).unwrap();
        record.set_foreign_key("address", 3).unwrap();

        assert_eq!(record.get_foreign_key("address").unwrap(), Some(&json!(3)));
        assert_eq!(record.get_foreign_key("doctor").unwrap(), Some(&json!(2)));
        assert_eq!(record.get_foreign_key("lawyer").unwrap(), None);
        assert_eq!(record.attributes().get("address_id"), Some(&json!(3)));

        record.set_foreign_key("doctor", Value::Null).unwrap();
        assert_eq!(record.get_foreign_key("doctor").unwrap(), None);
        assert!(record.attributes().get("doctor_id").is_none());
    }

    #[test]
    fn test_foreign_key_accessors_reject_undeclared_attributes() {
        let mut record = Record::blank("Phone", keys(&["address_id"], &[]));

        assert!(matches!(
            record.get_foreign_key("carrier"),
            Err(ResourceError::UnknownAssociation { .. })
        ));
        assert!(matches!(
            record.set_foreign_key("carrier", 1),
            Err(ResourceError::UnknownAssociation { .. })
        ));
    }

    #[test]
    fn test_body_attributes_drop_claimed_keys_only() {
        let mut record = Record::blank("LawyerPost", keys(&["lawyer_id", "post_id"], &[]));
        record.set("lawyer_id", 1);
        record.set("post_id", 2);

        let body = record.body_attributes(&["lawyer_id".to_string()]);
        assert_eq!(Value::Object(body), json!({"post_id": 2}));
    }

    #[test]
    fn test_replace_clears_attributes_and_cache() {
        let mut record = Record::blank("Lawyer", RecordKeys::default());
        record.set("id", 1);
        record.set("name", "Ada");
        record
            .related
            .insert("addresses".to_string(), Related::Many(Vec::new()));

        record.replace(object(json!({"id": 1, "firm": "Lovelace LLP"})));

        assert!(record.attributes().get("name").is_none());
        assert_eq!(record.get("firm"), Some(&json!("Lovelace LLP")));
        assert!(record.cached_related("addresses").is_none());
    }

    #[test]
    fn test_related_accessors() {
        let record = Record::blank("Lawyer", RecordKeys::default());
        let one = Related::One(Box::new(record.clone()));
        let many = Related::Many(vec![record]);

        assert!(one.as_one().is_some());
        assert!(one.as_many().is_none());
        assert_eq!(many.as_many().map(<[Record]>::len), Some(1));
    }
}
