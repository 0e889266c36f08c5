//! Declared relationships between resource types.
//!
//! An [`Association`] is an edge from an owning type to a target type,
//! named by an attribute. Three kinds exist:
//!
//! - [`AssociationKind::BelongsTo`]: the owner is nested under one target
//!   record, identified by the `<attribute>_id` prefix value
//! - [`AssociationKind::HasMany`]: the owner has a collection of targets
//!   filtered by `<owner>_id`
//! - [`AssociationKind::HasOne`]: like `HasMany`, but a single target
//!
//! # Target Resolution
//!
//! The target type comes from `options.class_name` when given (absolute
//! lookup), otherwise from the attribute by convention: `lawyer` resolves
//! to `Lawyer`, `addresses` to `Address`. Conventional names are searched
//! relative to the owning type's namespace first, see
//! [`ResourceRegistry::lookup_relative`].
//!
//! # Example
//!
//! ```rust
//! use reactive_resource::rest::{Association, AssociationKind, AssociationOptions};
//!
//! let association = Association::new(
//!     AssociationKind::HasMany,
//!     "Lawyer",
//!     "addresses",
//!     AssociationOptions::default(),
//! );
//!
//! assert_eq!(association.conventional_target_name(), "Address");
//! assert_eq!(association.owner_key(), "lawyer_id");
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::rest::errors::ResourceError;
use crate::rest::inflector::{camelize, singularize, underscore};
use crate::rest::path::{is_blank, Params};
use crate::rest::record::{Record, Related};
use crate::rest::registry::{ResourceRegistry, ResourceType};
use crate::rest::resource::ResourceClient;

/// The three relationship kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssociationKind {
    /// The owner is nested under one target record.
    BelongsTo,
    /// The owner has many target records.
    HasMany,
    /// The owner has one target record.
    HasOne,
}

impl AssociationKind {
    /// Returns the declaration keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BelongsTo => "belongs_to",
            Self::HasMany => "has_many",
            Self::HasOne => "has_one",
        }
    }
}

impl fmt::Display for AssociationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extra parameters given when declaring an association.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssociationOptions {
    /// Fully qualified target type name, bypassing the naming convention.
    pub class_name: Option<String>,
    /// Free-form options carried along with the declaration.
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl AssociationOptions {
    /// Options pointing at an explicit target type.
    #[must_use]
    pub fn class_name(name: impl Into<String>) -> Self {
        Self {
            class_name: Some(name.into()),
            extra: BTreeMap::new(),
        }
    }

    /// Adds a free-form option.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// A declared relationship from `owning_type` to another resource type.
#[derive(Debug, Clone, PartialEq)]
pub struct Association {
    kind: AssociationKind,
    owning_type: String,
    attribute: String,
    options: AssociationOptions,
}

impl Association {
    /// Creates an association owned by `owning_type`.
    #[must_use]
    pub fn new(
        kind: AssociationKind,
        owning_type: impl Into<String>,
        attribute: impl Into<String>,
        options: AssociationOptions,
    ) -> Self {
        Self {
            kind,
            owning_type: owning_type.into(),
            attribute: attribute.into(),
            options,
        }
    }

    /// Re-creates this association on another owning type.
    #[must_use]
    pub fn rebind(&self, owning_type: impl Into<String>) -> Self {
        Self::new(
            self.kind,
            owning_type,
            self.attribute.clone(),
            self.options.clone(),
        )
    }

    /// Returns the association kind.
    #[must_use]
    pub const fn kind(&self) -> AssociationKind {
        self.kind
    }

    /// Returns `true` for belongs-to associations.
    #[must_use]
    pub const fn is_belongs_to(&self) -> bool {
        matches!(self.kind, AssociationKind::BelongsTo)
    }

    /// Returns the fully qualified name of the owning type.
    #[must_use]
    pub fn owning_type(&self) -> &str {
        &self.owning_type
    }

    /// Returns the attribute name (e.g. `lawyer`, `addresses`).
    #[must_use]
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Returns the declaration options.
    #[must_use]
    pub const fn options(&self) -> &AssociationOptions {
        &self.options
    }

    /// Returns the prefix parameter name `<attribute>_id`.
    #[must_use]
    pub fn foreign_key(&self) -> String {
        format!("{}_id", self.attribute)
    }

    /// Returns the filter key used by has-many and has-one fetches:
    /// `<underscored last segment of the owning type>_id`.
    #[must_use]
    pub fn owner_key(&self) -> String {
        let last = self
            .owning_type
            .rsplit("::")
            .next()
            .unwrap_or(&self.owning_type);
        format!("{}_id", underscore(last))
    }

    /// Returns the target type name implied by the attribute.
    ///
    /// Has-many attributes are singularized first.
    #[must_use]
    pub fn conventional_target_name(&self) -> String {
        match self.kind {
            AssociationKind::HasMany => camelize(&singularize(&self.attribute)),
            AssociationKind::BelongsTo | AssociationKind::HasOne => camelize(&self.attribute),
        }
    }

    /// Resolves the target type in `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::TypeNotFound`] if neither the `class_name`
    /// override nor the conventional name is registered.
    pub fn resolved_target_type<'r>(
        &self,
        registry: &'r ResourceRegistry,
    ) -> Result<&'r ResourceType, ResourceError> {
        match &self.options.class_name {
            Some(class_name) => registry.lookup(class_name),
            None => registry.lookup_relative(&self.owning_type, &self.conventional_target_name()),
        }
    }

    /// Returns this association's attribute followed by the belongs-to
    /// attributes of its target, de-duplicated in first-seen order.
    ///
    /// Empty for has-many and has-one associations.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::TypeNotFound`] if the target is not registered.
    pub fn associated_attributes(
        &self,
        registry: &ResourceRegistry,
    ) -> Result<Vec<String>, ResourceError> {
        if !self.is_belongs_to() {
            return Ok(Vec::new());
        }

        let mut attributes = vec![self.attribute.clone()];
        let target = self.resolved_target_type(registry)?;
        for parent in target.belongs_to_associations() {
            if !attributes.iter().any(|a| a == parent.attribute()) {
                attributes.push(parent.attribute().to_string());
            }
        }
        Ok(attributes)
    }

    /// Fetches the related record(s) for `record`.
    ///
    /// - belongs-to: finds the target by the record's `<attribute>_id`,
    ///   passing the other prefix values along for nesting
    /// - has-many: lists targets with `<owner>_id = record.id`
    /// - has-one: fetches the single target with `<owner>_id = record.id`;
    ///   the target must be a singleton resource
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingForeignKey`] when the identifying
    /// value is absent, [`ResourceError::PathResolutionFailed`] for a has-one
    /// whose target is not a singleton (no element path exists without an
    /// id), and propagates lookup and transport errors.
    pub async fn resolve(
        &self,
        client: &ResourceClient,
        record: &Record,
    ) -> Result<Related, ResourceError> {
        let target = self.resolved_target_type(client.registry())?;

        match self.kind {
            AssociationKind::BelongsTo => {
                let foreign_key = self.foreign_key();
                let id = record
                    .prefix_values()
                    .get(&foreign_key)
                    .or_else(|| record.get(&foreign_key))
                    .filter(|value| !is_blank(value))
                    .cloned()
                    .ok_or_else(|| ResourceError::MissingForeignKey {
                        resource: record.resource_type().to_string(),
                        foreign_key: foreign_key.clone(),
                    })?;

                let mut params = record.prefix_values().clone();
                params.remove(&foreign_key);

                let found = client.find(target.name(), id, &params).await?;
                Ok(Related::One(Box::new(found)))
            }
            AssociationKind::HasMany => {
                let params = self.owner_params(record)?;
                let found = client.all(target.name(), &params).await?;
                Ok(Related::Many(found))
            }
            AssociationKind::HasOne => {
                let params = self.owner_params(record)?;
                let found = client.one(target.name(), &params).await?;
                Ok(Related::One(Box::new(found)))
            }
        }
    }

    fn owner_params(&self, record: &Record) -> Result<Params, ResourceError> {
        let id = record
            .id()
            .cloned()
            .ok_or_else(|| ResourceError::MissingForeignKey {
                resource: record.resource_type().to_string(),
                foreign_key: "id".to_string(),
            })?;

        let mut params = record.prefix_values().clone();
        params.insert(self.owner_key(), id);
        Ok(params)
    }
}
