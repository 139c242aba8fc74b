//! Table-per-concrete-type registry.
//!
//! Each abstract entity family maps to N independent concrete tables. The
//! registry is the single place that mapping lives: inserts look up the
//! destination table for a concrete variant, and polymorphic queries walk a
//! family's bindings to build the union. A variant without a binding is a
//! configuration error surfaced as [`MappingError::UnmappedType`].

use std::collections::HashMap;

use crate::error::MappingError;
use crate::tenant::Scoping;

/// Family name for the workspace member hierarchy.
pub const MEMBER_FAMILY: &str = "workspace_member";

/// Family name for the post hierarchy.
pub const POST_FAMILY: &str = "post";

/// Family name for the animal hierarchy.
pub const ANIMAL_FAMILY: &str = "animal";

/// The mapping of one concrete variant to its storage table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableBinding {
    /// Variant name, matching the family's kind tag.
    pub variant: &'static str,
    /// The concrete table rows of this variant live in.
    pub table: &'static str,
    /// Whether rows in this table are tenant-scoped.
    pub scoping: Scoping,
}

impl TableBinding {
    /// Creates a binding.
    pub fn new(variant: &'static str, table: &'static str, scoping: Scoping) -> Self {
        Self {
            variant,
            table,
            scoping,
        }
    }
}

/// Registry mapping (family, concrete variant) to a table binding.
///
/// Bindings keep their per-family registration order, which is the order
/// per-table queries run in when a polymorphic union is built. That order is
/// incidental: callers get no cross-table ordering guarantee without an
/// explicit sort key.
#[derive(Debug, Clone, Default)]
pub struct TpcRegistry {
    families: HashMap<&'static str, Vec<TableBinding>>,
}

impl TpcRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            families: HashMap::new(),
        }
    }

    /// Creates a registry with all built-in families registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(
            MEMBER_FAMILY,
            TableBinding::new("employee", "employees", Scoping::TenantScoped),
        );
        registry.register(
            MEMBER_FAMILY,
            TableBinding::new("member", "members", Scoping::TenantScoped),
        );
        registry.register(
            MEMBER_FAMILY,
            TableBinding::new("care_recipient", "care_recipients", Scoping::TenantScoped),
        );

        registry.register(
            POST_FAMILY,
            TableBinding::new("employee_post", "employee_posts", Scoping::TenantScoped),
        );
        registry.register(
            POST_FAMILY,
            TableBinding::new("member_post", "member_posts", Scoping::TenantScoped),
        );
        registry.register(
            POST_FAMILY,
            TableBinding::new(
                "care_recipient_post",
                "care_recipient_posts",
                Scoping::TenantScoped,
            ),
        );

        registry.register(
            ANIMAL_FAMILY,
            TableBinding::new("farm_animal", "farm_animals", Scoping::Shared),
        );
        registry.register(ANIMAL_FAMILY, TableBinding::new("cat", "cats", Scoping::Shared));
        registry.register(ANIMAL_FAMILY, TableBinding::new("dog", "dogs", Scoping::Shared));

        registry
    }

    /// Registers a binding for a family, replacing any prior binding for the
    /// same variant.
    pub fn register(&mut self, family: &'static str, binding: TableBinding) {
        let bindings = self.families.entry(family).or_default();
        if let Some(existing) = bindings.iter_mut().find(|b| b.variant == binding.variant) {
            *existing = binding;
        } else {
            bindings.push(binding);
        }
    }

    /// Removes the binding for a variant, if present.
    pub fn unregister(&mut self, family: &'static str, variant: &str) {
        if let Some(bindings) = self.families.get_mut(family) {
            bindings.retain(|b| b.variant != variant);
        }
    }

    /// Looks up the binding for one concrete variant.
    ///
    /// # Errors
    ///
    /// [`MappingError::UnmappedType`] if the variant has no registered table.
    pub fn binding(
        &self,
        family: &'static str,
        variant: &'static str,
    ) -> Result<TableBinding, MappingError> {
        self.families
            .get(family)
            .and_then(|bindings| bindings.iter().find(|b| b.variant == variant))
            .copied()
            .ok_or(MappingError::UnmappedType { family, variant })
    }

    /// Returns all bindings of a family, in registration order.
    ///
    /// # Errors
    ///
    /// [`MappingError::UnknownFamily`] if the family has no bindings at all.
    pub fn family(&self, family: &'static str) -> Result<&[TableBinding], MappingError> {
        match self.families.get(family) {
            Some(bindings) if !bindings.is_empty() => Ok(bindings),
            _ => Err(MappingError::UnknownFamily { family }),
        }
    }

    /// Returns the number of registered bindings across all families.
    pub fn len(&self) -> usize {
        self.families.values().map(Vec::len).sum()
    }

    /// Returns `true` if no bindings are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_all_families() {
        let registry = TpcRegistry::with_defaults();
        assert_eq!(registry.len(), 9);
        assert_eq!(registry.family(MEMBER_FAMILY).unwrap().len(), 3);
        assert_eq!(registry.family(POST_FAMILY).unwrap().len(), 3);
        assert_eq!(registry.family(ANIMAL_FAMILY).unwrap().len(), 3);
    }

    #[test]
    fn test_binding_lookup() {
        let registry = TpcRegistry::with_defaults();
        let binding = registry.binding(MEMBER_FAMILY, "employee").unwrap();
        assert_eq!(binding.table, "employees");
        assert!(binding.scoping.is_tenant_scoped());

        let binding = registry.binding(ANIMAL_FAMILY, "cat").unwrap();
        assert_eq!(binding.table, "cats");
        assert!(!binding.scoping.is_tenant_scoped());
    }

    #[test]
    fn test_unmapped_variant() {
        let registry = TpcRegistry::with_defaults();
        let err = registry.binding(MEMBER_FAMILY, "contractor").unwrap_err();
        assert!(matches!(err, MappingError::UnmappedType { .. }));
    }

    #[test]
    fn test_unknown_family() {
        let registry = TpcRegistry::new();
        let err = registry.family(MEMBER_FAMILY).unwrap_err();
        assert!(matches!(err, MappingError::UnknownFamily { .. }));
    }

    #[test]
    fn test_register_replaces_existing_variant() {
        let mut registry = TpcRegistry::with_defaults();
        registry.register(
            MEMBER_FAMILY,
            TableBinding::new("employee", "staff", Scoping::TenantScoped),
        );
        assert_eq!(registry.family(MEMBER_FAMILY).unwrap().len(), 3);
        assert_eq!(
            registry.binding(MEMBER_FAMILY, "employee").unwrap().table,
            "staff"
        );
    }

    #[test]
    fn test_unregister() {
        let mut registry = TpcRegistry::with_defaults();
        registry.unregister(MEMBER_FAMILY, "employee");
        assert!(registry.binding(MEMBER_FAMILY, "employee").is_err());
        assert_eq!(registry.family(MEMBER_FAMILY).unwrap().len(), 2);
    }
}
