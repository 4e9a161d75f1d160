//! Entity metadata

use std::any::TypeId;

/// A typed Service Layer entity.
///
/// Each entity declares the remote collection it maps to and the fields a
/// query may select. Queries receive [`Entity::fields`] to build predicates,
/// projections and sort keys from typed field handles.
///
/// # Example
///
/// ```
/// use b1_lib::api::query::Field;
/// use b1_lib::model::Entity;
///
/// struct Item;
///
/// struct ItemFields {
///     item_code: Field<Item, String>,
///     on_hand: Field<Item, f64>,
/// }
///
/// impl Entity for Item {
///     const RESOURCE: &'static str = "Items";
///     const FIELDS: &'static [&'static str] = &["ItemCode", "QuantityOnStock"];
///     type Fields = ItemFields;
///
///     fn fields() -> ItemFields {
///         ItemFields {
///             item_code: Field::new("ItemCode"),
///             on_hand: Field::new("QuantityOnStock"),
///         }
///     }
/// }
/// ```
pub trait Entity: 'static {
    /// Remote collection name (e.g., `BusinessPartners`).
    const RESOURCE: &'static str;

    /// Selectable field names, in declaration order.
    ///
    /// Used as the default `$select` list of single-resource queries.
    const FIELDS: &'static [&'static str];

    /// Typed field handles handed to query closures.
    type Fields;

    /// Returns the field handles.
    fn fields() -> Self::Fields;
}

/// Identity of an entity type together with its resource name.
///
/// Two ids are equal when they name the same Rust type.
#[derive(Clone, Copy)]
pub struct EntityId {
    type_id: TypeId,
    type_name: &'static str,
    resource: &'static str,
}

impl EntityId {
    /// Returns the id of `E`.
    pub fn of<E: Entity>() -> Self {
        Self {
            type_id: TypeId::of::<E>(),
            type_name: std::any::type_name::<E>(),
            resource: E::RESOURCE,
        }
    }

    /// Returns the declared resource name.
    pub fn resource(&self) -> &'static str {
        self.resource
    }

    /// Returns the Rust type name, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for EntityId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for EntityId {}

impl std::hash::Hash for EntityId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl std::fmt::Debug for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.type_name, self.resource)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.resource)
    }
}
