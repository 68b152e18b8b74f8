use std::collections::HashSet;

use indexmap::IndexMap;

use super::data_type::DataType;
use super::schemas::{NamedKind, NamedType};

/// Index of a named type in its [`TypeRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(usize);

impl TypeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Entry {
    ty: NamedType,
    refs: usize,
    removed: bool,
}

/// Name-keyed store of named types.
///
/// Types are kept in an arena and referenced by [`TypeId`], so recursive
/// schemas never form ownership cycles. A key is registered at most once:
/// the first writer wins and later lookups return the same id.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    entries: Vec<Entry>,
    by_key: IndexMap<String, TypeId>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(&self, key: &str) -> Option<TypeId> {
        self.by_key.get(key).copied()
    }

    /// Register `ty` under its key. Returns the existing id if the key is taken.
    pub fn add(&mut self, ty: NamedType) -> TypeId {
        if let Some(id) = self.find(&ty.key) {
            return id;
        }
        let id = TypeId(self.entries.len());
        self.by_key.insert(ty.key.clone(), id);
        self.entries.push(Entry {
            ty,
            refs: 0,
            removed: false,
        });
        id
    }

    /// A forward reference to a type that is still under construction.
    pub fn lazy(&self, key: &str) -> DataType {
        DataType::Lazy(key.to_string())
    }

    pub fn get(&self, id: TypeId) -> Option<&NamedType> {
        self.entries
            .get(id.0)
            .filter(|e| !e.removed)
            .map(|e| &e.ty)
    }

    pub fn get_mut(&mut self, id: TypeId) -> Option<&mut NamedType> {
        self.entries
            .get_mut(id.0)
            .filter(|e| !e.removed)
            .map(|e| &mut e.ty)
    }

    /// Unregister a type. Its id stays allocated but resolves to nothing.
    pub fn remove(&mut self, key: &str) -> Option<NamedType> {
        let id = self.by_key.shift_remove(key)?;
        let entry = self.entries.get_mut(id.0)?;
        entry.removed = true;
        Some(entry.ty.clone())
    }

    /// Whether `id` was handed out after [`Self::mark`] returned `mark`.
    pub fn is_newer(&self, id: TypeId, mark: usize) -> bool {
        id.0 >= mark
    }

    /// The position of the next id. Ids are never reused, removed ones included.
    pub fn mark(&self) -> usize {
        self.entries.len()
    }

    pub fn add_ref(&mut self, id: TypeId) {
        if let Some(entry) = self.entries.get_mut(id.0) {
            entry.refs += 1;
        }
    }

    pub fn ref_count(&self, id: TypeId) -> usize {
        self.entries.get(id.0).map_or(0, |e| e.refs)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// All registered types in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &NamedType)> {
        self.by_key
            .values()
            .filter_map(|id| self.get(*id).map(|ty| (*id, ty)))
    }

    /// Count one reference on every named type reachable from `root`.
    ///
    /// Each type is counted at most once per walk, however many paths lead to
    /// it. Mapped types are not descended into: a type that is only reachable
    /// as the source of a replacing mapping stays unreferenced.
    pub fn collect_reachable(&mut self, root: &DataType) {
        let mut visited = HashSet::new();
        self.walk(root, &mut visited);
        for id in visited {
            self.add_ref(id);
        }
    }

    fn walk(&self, data_type: &DataType, visited: &mut HashSet<TypeId>) {
        match data_type {
            DataType::Named(id) => self.walk_named(*id, visited),
            DataType::Lazy(key) => {
                if let Some(id) = self.find(key) {
                    self.walk_named(id, visited);
                }
            }
            DataType::Array(a) => self.walk(&a.item, visited),
            DataType::MappedCollection(m) => self.walk(&m.item, visited),
            DataType::Mapped(m) => {
                for name in m.target.qualified_names() {
                    if let Some(id) = self.find_generated(name) {
                        self.walk_named(id, visited);
                    }
                }
            }
            DataType::Null(n) => self.walk(&n.inner, visited),
            DataType::Single(w) | DataType::Multi(w) | DataType::Result(w) => {
                self.walk(&w.inner, visited)
            }
            DataType::Scalar(_) | DataType::NoData(_) | DataType::Void { .. } => {}
        }
    }

    fn walk_named(&self, id: TypeId, visited: &mut HashSet<TypeId>) {
        if !visited.insert(id) {
            return;
        }
        let Some(ty) = self.get(id) else {
            return;
        };
        match &ty.kind {
            NamedKind::Object(o) => {
                for property in o.properties.values() {
                    self.walk(&property.data_type, visited);
                }
            }
            NamedKind::AllOf(c) | NamedKind::Interface(c) | NamedKind::AnyOneOf(c) => {
                for member in &c.members {
                    self.walk(member, visited);
                }
                for property in c.properties.values() {
                    self.walk(&property.data_type, visited);
                }
            }
            NamedKind::Enum(_) | NamedKind::ContentTypeInterface(_) => {}
        }
        for interface in &ty.implements {
            self.walk_named(*interface, visited);
        }
    }

    /// A generated type named by its fully qualified name, as used in the
    /// generic arguments of a mapping target.
    fn find_generated(&self, qualified: &str) -> Option<TypeId> {
        self.iter()
            .find(|(_, ty)| ty.qualified_name() == qualified)
            .map(|(id, _)| id)
    }

    /// Registered types with at least one reference.
    pub fn reachable(&self) -> impl Iterator<Item = (TypeId, &NamedType)> {
        self.iter().filter(|(id, _)| self.ref_count(*id) > 0)
    }

    /// Reachable object models (plain and allOf).
    pub fn objects(&self) -> Vec<&NamedType> {
        self.reachable()
            .map(|(_, ty)| ty)
            .filter(|ty| ty.kind.is_model())
            .collect()
    }

    pub fn enums(&self) -> Vec<&NamedType> {
        self.reachable()
            .map(|(_, ty)| ty)
            .filter(|ty| matches!(ty.kind, NamedKind::Enum(_)))
            .collect()
    }

    /// Reachable oneOf and content-type marker interfaces.
    pub fn interfaces(&self) -> Vec<&NamedType> {
        self.reachable()
            .map(|(_, ty)| ty)
            .filter(|ty| ty.kind.is_interface())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::data_type::{MappedType, ScalarKind};
    use crate::ir::schemas::{ObjectType, Property};
    use crate::ir::types::TargetType;
    use crate::transform::name_normalizer::normalize_name;

    fn object(key: &str, properties: Vec<(&str, DataType)>) -> NamedType {
        let mut o = ObjectType::default();
        for (name, dt) in properties {
            o.properties.insert(name.to_string(), Property::new(dt));
        }
        NamedType::new(
            key,
            normalize_name(key),
            "io.generated.model".to_string(),
            NamedKind::Object(o),
        )
    }

    #[test]
    fn test_first_writer_wins() {
        let mut registry = TypeRegistry::new();
        let a = registry.add(object("Foo", vec![]));
        let b = registry.add(object(
            "Foo",
            vec![("x", DataType::scalar(ScalarKind::String))],
        ));
        assert_eq!(a, b);
        assert_eq!(registry.len(), 1);
        let kept = registry.get(a).and_then(|t| t.kind.as_object()).unwrap();
        assert!(kept.properties.is_empty());
    }

    #[test]
    fn test_reachability_counts_each_type_once() {
        let mut registry = TypeRegistry::new();
        let leaf = registry.add(object("Leaf", vec![]));
        let root = registry.add(object(
            "Root",
            vec![
                ("a", DataType::Named(leaf)),
                ("b", DataType::Named(leaf)),
                ("self", DataType::Lazy("Root".into())),
            ],
        ));
        registry.collect_reachable(&DataType::Named(root));
        assert_eq!(registry.ref_count(root), 1);
        assert_eq!(registry.ref_count(leaf), 1);
    }

    #[test]
    fn test_mapped_source_is_not_reachable() {
        let mut registry = TypeRegistry::new();
        let hidden = registry.add(object("Hidden", vec![]));
        let mapped = DataType::Mapped(MappedType {
            target: TargetType::new("io.other.Thing"),
            source: Some(Box::new(DataType::Named(hidden))),
        });
        registry.collect_reachable(&mapped);
        assert_eq!(registry.ref_count(hidden), 0);
        assert!(registry.objects().is_empty());
    }

    #[test]
    fn test_generic_argument_keeps_model_reachable() {
        let mut registry = TypeRegistry::new();
        let foo = registry.add(object("Foo", vec![]));
        let mapped = DataType::Mapped(MappedType {
            target: "java.util.List<io.generated.model.Foo>".parse().unwrap(),
            source: None,
        });
        registry.collect_reachable(&mapped);
        assert_eq!(registry.ref_count(foo), 1);
    }

    #[test]
    fn test_mark_separates_new_types() {
        let mut registry = TypeRegistry::new();
        let old = registry.add(object("Old", vec![]));
        let mark = registry.mark();
        let new = registry.add(object("New", vec![]));
        assert!(!registry.is_newer(old, mark));
        assert!(registry.is_newer(new, mark));

        registry.remove("New");
        assert_eq!(registry.mark(), mark + 1);
    }

    #[test]
    fn test_remove_hides_type() {
        let mut registry = TypeRegistry::new();
        let id = registry.add(object("Body", vec![]));
        assert!(registry.remove("Body").is_some());
        assert!(registry.find("Body").is_none());
        assert!(registry.get(id).is_none());
        assert!(registry.is_empty());
    }
}
