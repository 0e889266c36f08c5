//! Resource type descriptors and the registry that owns them.
//!
//! # Overview
//!
//! - [`ResourceType`]: a named resource (e.g. `"Lawyer"`, `"Child::Address"`)
//!   with its naming overrides, singleton flag, format override and the
//!   ordered list of declared [`Association`]s
//! - [`ResourceRegistry`]: name to descriptor mapping, with namespace-aware
//!   lookup, subtype derivation and memoized transitive foreign keys
//!
//! Declaration order matters: the first declared belongs-to wins ties
//! during prefix resolution.
//!
//! # Example
//!
//! ```rust
//! use reactive_resource::rest::{ResourceRegistry, ResourceType};
//!
//! let mut registry = ResourceRegistry::new();
//! registry.register(ResourceType::new("Lawyer").has_many("addresses")).unwrap();
//! registry.register(ResourceType::new("Doctor").has_many("addresses")).unwrap();
//! registry
//!     .register(ResourceType::new("Address").belongs_to("lawyer").belongs_to("doctor"))
//!     .unwrap();
//!
//! assert_eq!(
//!     registry.belongs_to_with_parents("Address").unwrap(),
//!     vec!["lawyer", "doctor"]
//! );
//! ```

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::config::Format;
use crate::error::ConfigError;
use crate::rest::association::{Association, AssociationKind, AssociationOptions};
use crate::rest::errors::ResourceError;
use crate::rest::inflector::{pluralize, underscore};

/// Maximum depth of the belongs-to graph walked by path resolution.
pub const MAX_NESTING_DEPTH: usize = 32;

/// Namespace separator in fully qualified type names.
pub const NAMESPACE_SEPARATOR: &str = "::";

/// Descriptor of one resource type.
///
/// Built by value and handed to [`ResourceRegistry::register`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceType {
    name: String,
    singleton: bool,
    element_name: Option<String>,
    collection_name: Option<String>,
    format: Option<Format>,
    associations: Vec<Association>,
}

impl ResourceType {
    /// Creates a descriptor with no associations.
    ///
    /// `name` is fully qualified, segments separated by `::`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            singleton: false,
            element_name: None,
            collection_name: None,
            format: None,
            associations: Vec::new(),
        }
    }

    /// Marks the type as a singleton resource (no id in its path).
    #[must_use]
    pub const fn singleton(mut self) -> Self {
        self.singleton = true;
        self
    }

    /// Overrides the element name used for body wrapping.
    #[must_use]
    pub fn with_element_name(mut self, name: impl Into<String>) -> Self {
        self.element_name = Some(name.into());
        self
    }

    /// Overrides the collection name used in paths.
    #[must_use]
    pub fn with_collection_name(mut self, name: impl Into<String>) -> Self {
        self.collection_name = Some(name.into());
        self
    }

    /// Overrides the site-wide format for this type.
    #[must_use]
    pub const fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Declares `belongs_to :attribute`.
    #[must_use]
    pub fn belongs_to(self, attribute: impl Into<String>) -> Self {
        self.belongs_to_with(attribute, AssociationOptions::default())
    }

    /// Declares `belongs_to :attribute` with options.
    #[must_use]
    pub fn belongs_to_with(
        mut self,
        attribute: impl Into<String>,
        options: AssociationOptions,
    ) -> Self {
        self.declare(AssociationKind::BelongsTo, attribute, options);
        self
    }

    /// Declares `has_many :attribute`.
    #[must_use]
    pub fn has_many(self, attribute: impl Into<String>) -> Self {
        self.has_many_with(attribute, AssociationOptions::default())
    }

    /// Declares `has_many :attribute` with options.
    #[must_use]
    pub fn has_many_with(mut self, attribute: impl Into<String>, options: AssociationOptions) -> Self {
        self.declare(AssociationKind::HasMany, attribute, options);
        self
    }

    /// Declares `has_one :attribute`.
    #[must_use]
    pub fn has_one(self, attribute: impl Into<String>) -> Self {
        self.has_one_with(attribute, AssociationOptions::default())
    }

    /// Declares `has_one :attribute` with options.
    #[must_use]
    pub fn has_one_with(mut self, attribute: impl Into<String>, options: AssociationOptions) -> Self {
        self.declare(AssociationKind::HasOne, attribute, options);
        self
    }

    /// Appends an association owned by this type.
    ///
    /// Re-declaring an attribute replaces the earlier declaration in place,
    /// keeping its position.
    pub fn declare(
        &mut self,
        kind: AssociationKind,
        attribute: impl Into<String>,
        options: AssociationOptions,
    ) -> &mut Self {
        let association = Association::new(kind, self.name.clone(), attribute, options);
        match self
            .associations
            .iter_mut()
            .find(|existing| existing.attribute() == association.attribute())
        {
            Some(existing) => *existing = association,
            None => self.associations.push(association),
        }
        self
    }

    /// Removes the association declared for `attribute`, if any.
    pub fn undeclare(&mut self, attribute: &str) -> Option<Association> {
        let index = self
            .associations
            .iter()
            .position(|association| association.attribute() == attribute)?;
        Some(self.associations.remove(index))
    }

    /// Returns the fully qualified name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the last namespace segment (`"Address"` for `"Child::Address"`).
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.name
            .rsplit(NAMESPACE_SEPARATOR)
            .next()
            .unwrap_or(&self.name)
    }

    /// Returns `true` for singleton resources.
    #[must_use]
    pub const fn is_singleton(&self) -> bool {
        self.singleton
    }

    /// Returns the per-type format override, if any.
    #[must_use]
    pub const fn format(&self) -> Option<Format> {
        self.format
    }

    /// Returns the element name (`"lawyer_post"` for `LawyerPost`).
    #[must_use]
    pub fn element_name(&self) -> String {
        self.element_name
            .clone()
            .unwrap_or_else(|| underscore(self.short_name()))
    }

    /// Returns the collection name: the element name for singletons,
    /// otherwise its plural.
    #[must_use]
    pub fn collection_name(&self) -> String {
        if let Some(name) = &self.collection_name {
            return name.clone();
        }
        let element_name = self.element_name();
        if self.singleton {
            element_name
        } else {
            pluralize(&element_name)
        }
    }

    /// Returns every declared association, in declaration order.
    #[must_use]
    pub fn associations(&self) -> &[Association] {
        &self.associations
    }

    /// Returns the declared belongs-to associations, in declaration order.
    pub fn belongs_to_associations(&self) -> impl Iterator<Item = &Association> {
        self.associations.iter().filter(|a| a.is_belongs_to())
    }

    /// Returns the association declared for `attribute`.
    #[must_use]
    pub fn association(&self, attribute: &str) -> Option<&Association> {
        self.associations
            .iter()
            .find(|association| association.attribute() == attribute)
    }

    fn validate_name(name: &str) -> Result<(), ConfigError> {
        let valid = !name.is_empty()
            && name.split(NAMESPACE_SEPARATOR).all(|segment| {
                segment.chars().next().is_some_and(|c| c.is_ascii_uppercase())
                    && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            });
        if valid {
            Ok(())
        } else {
            Err(ConfigError::InvalidTypeName {
                name: name.to_string(),
            })
        }
    }
}

/// Owns every [`ResourceType`] known to a client.
///
/// # Thread Safety
///
/// `ResourceRegistry` is `Send + Sync`. The memo cache sits behind a
/// `RwLock`; all mutation goes through `&mut self`.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    types: HashMap<String, ResourceType>,
    parents_cache: RwLock<HashMap<String, Vec<String>>>,
}

// Verify ResourceRegistry is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceRegistry>();
    assert_send_sync::<ResourceType>();
};

impl Clone for ResourceRegistry {
    fn clone(&self) -> Self {
        Self {
            types: self.types.clone(),
            parents_cache: RwLock::new(HashMap::new()),
        }
    }
}

impl ResourceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type, replacing any previous type of the same name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTypeName`] unless every `::` segment of
    /// the name is a `CamelCase` identifier.
    pub fn register(&mut self, resource: ResourceType) -> Result<&mut ResourceType, ConfigError> {
        ResourceType::validate_name(&resource.name)?;
        self.clear_cache();

        tracing::debug!(
            resource = %resource.name,
            associations = resource.associations.len(),
            "registered resource type"
        );

        Ok(match self.types.entry(resource.name.clone()) {
            Entry::Occupied(mut entry) => {
                entry.insert(resource);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(resource),
        })
    }

    /// Returns the type registered under exactly `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResourceType> {
        self.types.get(name)
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Iterates over every registered type (unordered).
    pub fn types(&self) -> impl Iterator<Item = &ResourceType> {
        self.types.values()
    }

    /// Absolute lookup, used for `class_name` overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::TypeNotFound`] on a miss.
    pub fn lookup(&self, name: &str) -> Result<&ResourceType, ResourceError> {
        let name = name.trim_start_matches(NAMESPACE_SEPARATOR);
        self.types
            .get(name)
            .ok_or_else(|| ResourceError::TypeNotFound {
                name: name.to_string(),
                from: String::new(),
            })
    }

    /// Looks `name` up relative to the namespace of `owning`.
    ///
    /// For `owning = "A::B::C"` the candidates are `A::B::name`, `A::name`
    /// and finally `name`; the first registered one wins.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::TypeNotFound`] if no candidate is registered.
    pub fn lookup_relative(&self, owning: &str, name: &str) -> Result<&ResourceType, ResourceError> {
        let segments: Vec<&str> = owning.split(NAMESPACE_SEPARATOR).collect();
        let namespaces = &segments[..segments.len().saturating_sub(1)];

        (0..=namespaces.len())
            .rev()
            .map(|depth| {
                let mut candidate = namespaces[..depth].join(NAMESPACE_SEPARATOR);
                if !candidate.is_empty() {
                    candidate.push_str(NAMESPACE_SEPARATOR);
                }
                candidate.push_str(name);
                candidate
            })
            .find_map(|candidate| self.types.get(&candidate))
            .ok_or_else(|| ResourceError::TypeNotFound {
                name: name.to_string(),
                from: owning.to_string(),
            })
    }

    /// Returns the association `attribute` declared on `resource`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::TypeNotFound`] for an unknown type and
    /// [`ResourceError::UnknownAssociation`] for an undeclared attribute.
    pub fn association(&self, resource: &str, attribute: &str) -> Result<&Association, ResourceError> {
        self.lookup(resource)?
            .association(attribute)
            .ok_or_else(|| ResourceError::UnknownAssociation {
                resource: resource.to_string(),
                attribute: attribute.to_string(),
            })
    }

    /// Returns a registered type for mutation.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::TypeNotFound`] on a miss.
    pub fn type_mut(&mut self, name: &str) -> Result<&mut ResourceType, ResourceError> {
        self.clear_cache();
        self.types
            .get_mut(name)
            .ok_or_else(|| ResourceError::TypeNotFound {
                name: name.to_string(),
                from: String::new(),
            })
    }

    /// Creates `child` as a subtype of `parent`.
    ///
    /// The child copies the parent's singleton flag, format and naming
    /// overrides, and receives its own copy of every parent association
    /// rebound to `child`. Copies whose target cannot be resolved from the
    /// child's namespace are dropped so the caller can re-declare them
    /// with an explicit `class_name`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::TypeNotFound`] if `parent` is not registered
    /// and [`ResourceError::Config`] if `child` is not a valid type name.
    pub fn derive(&mut self, parent: &str, child: &str) -> Result<&mut ResourceType, ResourceError> {
        let parent_type = self.lookup(parent)?;

        let mut derived = ResourceType {
            name: child.to_string(),
            associations: Vec::with_capacity(parent_type.associations.len()),
            ..parent_type.clone()
        };

        for association in &parent_type.associations {
            let rebound = association.rebind(child);
            match rebound.resolved_target_type(self) {
                Ok(_) => derived.associations.push(rebound),
                Err(error) => {
                    tracing::debug!(
                        parent,
                        child,
                        attribute = association.attribute(),
                        %error,
                        "dropping inherited association"
                    );
                }
            }
        }

        Ok(self.register(derived)?)
    }

    /// Returns every belongs-to attribute name that must be tracked as a
    /// prefix parameter for `resource`, including ones declared further up
    /// the ancestry.
    ///
    /// Memoized per type until the registry is next mutated.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::TypeNotFound`] if a type on the walk is
    /// unknown and [`ResourceError::NestingTooDeep`] if the walk exceeds
    /// [`MAX_NESTING_DEPTH`].
    pub fn belongs_to_with_parents(&self, resource: &str) -> Result<Vec<String>, ResourceError> {
        self.belongs_to_with_parents_at(resource, 0)
    }

    fn belongs_to_with_parents_at(
        &self,
        resource: &str,
        depth: usize,
    ) -> Result<Vec<String>, ResourceError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(ResourceError::NestingTooDeep {
                resource: resource.to_string(),
                limit: MAX_NESTING_DEPTH,
            });
        }

        if let Some(cached) = self
            .parents_cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(resource)
        {
            tracing::trace!(resource, "belongs_to_with_parents cache hit");
            return Ok(cached.clone());
        }

        let resource_type = self.lookup(resource)?;
        let mut names: Vec<String> = Vec::new();
        let push_unique = |name: String, names: &mut Vec<String>| {
            if !names.contains(&name) {
                names.push(name);
            }
        };

        for association in resource_type.belongs_to_associations() {
            for name in association.associated_attributes(self)? {
                push_unique(name, &mut names);
            }
        }
        for association in resource_type.belongs_to_associations() {
            let parent = association.resolved_target_type(self)?;
            for name in self.belongs_to_with_parents_at(parent.name(), depth + 1)? {
                push_unique(name, &mut names);
            }
        }

        self.parents_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(resource.to_string(), names.clone());

        Ok(names)
    }

    fn clear_cache(&mut self) {
        self.parents_cache
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
