//! Relationship resolution across the full schema set.
//!
//! Extraction only sees one schema at a time, so it classifies references
//! as one-to-one or one-to-many. Resolution looks at both ends of every
//! reference and decides:
//!
//! - which one-to-many references are really many-to-many, and the join
//!   table each pair shares. An array reference pairs with at most one
//!   array reference pointing back, and both sides of a pair always name
//!   the same join table;
//! - where the foreign key of a plain one-to-many lives. It is placed on the
//!   target as an inverse many-to-one, or an existing scalar back-reference
//!   on the target is reclassified as many-to-one;
//! - which references point at schemas that do not exist.

use std::collections::{HashMap, HashSet};

use specql_core::{ManyToManyPolicy, RelationKind, Schema, SchemaRelation, TableNaming};
use tracing::{debug, warn};

use crate::report::DanglingReference;

/// Resolved relations for every schema, plus the references that could not
/// be resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    names: Vec<String>,
    relations: Vec<Vec<SchemaRelation>>,
    /// References whose target schema is missing, in document order.
    pub dangling: Vec<DanglingReference>,
}

impl Resolution {
    /// Resolved relations of a schema, or an empty slice for unknown names.
    pub fn relations_for(&self, schema: &str) -> &[SchemaRelation] {
        self.names
            .iter()
            .position(|name| name == schema)
            .map(|i| self.relations[i].as_slice())
            .unwrap_or(&[])
    }

    /// Iterates `(schema name, resolved relations)` in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[SchemaRelation])> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.relations.iter().map(Vec::as_slice))
    }

    /// Returns `true` when every reference found its target.
    pub fn is_complete(&self) -> bool {
        self.dangling.is_empty()
    }

    /// Copies the resolved relations back onto the schemas.
    pub fn apply(&self, schemas: &[Schema]) -> Vec<Schema> {
        schemas
            .iter()
            .map(|schema| Schema {
                relations: self.relations_for(&schema.name).to_vec(),
                ..schema.clone()
            })
            .collect()
    }
}

/// Resolves relations for a schema set.
///
/// Dangling references are dropped from the resolved relations and reported
/// in [`Resolution::dangling`].
///
/// # Examples
///
/// ```
/// use specql_core::*;
/// use specql_extract::resolve_relationships;
///
/// let post = Schema::new("Post").with_relation(SchemaRelation::new(
///     RelationKind::OneToMany, "tags", "Tag",
/// ));
/// let tag = Schema::new("Tag").with_relation(SchemaRelation::new(
///     RelationKind::OneToMany, "posts", "Post",
/// ));
///
/// let resolution = resolve_relationships(
///     &[post, tag],
///     ManyToManyPolicy::SymmetricArrays,
///     &TableNaming::SchemaId,
/// );
///
/// let tags = &resolution.relations_for("Post")[0];
/// assert_eq!(tags.kind, RelationKind::ManyToMany);
/// assert_eq!(tags.join_table.as_deref(), Some("post_tag"));
/// assert_eq!(resolution.relations_for("Tag")[0].join_table.as_deref(), Some("post_tag"));
/// ```
pub fn resolve_relationships(
    schemas: &[Schema],
    policy: ManyToManyPolicy,
    naming: &TableNaming,
) -> Resolution {
    let mut index: HashMap<&str, usize> = HashMap::new();
    for (i, schema) in schemas.iter().enumerate() {
        index.entry(schema.name.as_str()).or_insert(i);
    }

    let graph = Graph {
        schemas,
        index,
        policy,
    };

    let joins = graph.pair_many_to_many(naming);

    // (parent, child) pairs where the parent holds a plain one-to-many.
    let mut parents: HashSet<(usize, usize)> = HashSet::new();
    for (i, schema) in schemas.iter().enumerate() {
        for (a, relation) in schema.relations.iter().enumerate() {
            if let Some(j) = graph.target(relation) {
                if relation.kind == RelationKind::OneToMany && joins[i][a].is_none() {
                    parents.insert((i, j));
                }
            }
        }
    }

    let mut resolved: Vec<Vec<SchemaRelation>> = vec![Vec::new(); schemas.len()];
    let mut inverse: Vec<Vec<SchemaRelation>> = vec![Vec::new(); schemas.len()];
    let mut dangling = Vec::new();

    for (i, schema) in schemas.iter().enumerate() {
        for (a, relation) in schema.relations.iter().enumerate() {
            let Some(j) = graph.target(relation) else {
                warn!(
                    schema = %schema.name,
                    property = %relation.property,
                    target = %relation.target_schema,
                    "Reference to unknown schema"
                );
                dangling.push(DanglingReference {
                    schema: schema.name.clone(),
                    property: relation.property.clone(),
                    target: relation.target_schema.clone(),
                });
                continue;
            };

            let mut relation = relation.clone();
            if let Some(join_table) = &joins[i][a] {
                relation.join_table = Some(join_table.clone());
                relation.kind = RelationKind::ManyToMany;
            } else {
                if relation.join_table.take().is_some() {
                    debug!(
                        schema = %schema.name,
                        property = %relation.property,
                        "Ignoring join table on a relation that is not many-to-many"
                    );
                }
                match relation.kind {
                    RelationKind::OneToMany if !graph.has_scalar_back_reference(j, i) => {
                        if let Some(back) =
                            graph.inverse_relation(i, j, &relation, &inverse[j])
                        {
                            inverse[j].push(back);
                        }
                    }
                    RelationKind::OneToOne if parents.contains(&(j, i)) => {
                        relation.kind = RelationKind::ManyToOne;
                    }
                    _ => {}
                }
            }
            resolved[i].push(relation);
        }
    }

    for (relations, back) in resolved.iter_mut().zip(inverse) {
        relations.extend(back);
    }

    Resolution {
        names: schemas.iter().map(|s| s.name.clone()).collect(),
        relations: resolved,
        dangling,
    }
}

struct Graph<'a> {
    schemas: &'a [Schema],
    index: HashMap<&'a str, usize>,
    policy: ManyToManyPolicy,
}

impl Graph<'_> {
    fn target(&self, relation: &SchemaRelation) -> Option<usize> {
        self.index.get(relation.target_schema.as_str()).copied()
    }

    /// Whether schema `j` holds an array reference back to schema `i`.
    fn has_array_back_reference(&self, j: usize, i: usize) -> bool {
        self.back_references(j, i).any(is_array)
    }

    /// Whether schema `j` holds a scalar reference back to schema `i`.
    fn has_scalar_back_reference(&self, j: usize, i: usize) -> bool {
        self.back_references(j, i)
            .any(|r| r.kind == RelationKind::OneToOne)
    }

    fn back_references(&self, j: usize, i: usize) -> impl Iterator<Item = &SchemaRelation> {
        let source = self.schemas[i].name.as_str();
        self.schemas[j]
            .relations
            .iter()
            .filter(move |r| r.target_schema == source)
    }

    /// Whether a relation asks for a join table on its own, without a
    /// matching reference from the other side.
    fn requests_join_table(&self, relation: &SchemaRelation) -> bool {
        relation.kind == RelationKind::ManyToMany
            || (self.policy == ManyToManyPolicy::ExplicitJoinTable
                && relation.join_table.is_some())
    }

    /// First unpaired array relation on schema `j` pointing back at `i`.
    fn partner(&self, j: usize, i: usize, paired: &HashSet<(usize, usize)>) -> Option<usize> {
        let source = self.schemas[i].name.as_str();
        self.schemas[j]
            .relations
            .iter()
            .enumerate()
            .find(|(b, r)| {
                r.target_schema == source && is_array(r) && !paired.contains(&(j, *b))
            })
            .map(|(b, _)| b)
    }

    /// Join table of every relation that resolves to many-to-many, indexed
    /// like `schemas[i].relations[a]`.
    ///
    /// Relations are visited in document order. An array relation pairs
    /// with the first unpaired array relation pointing back, and both get
    /// the same join table. Under [`ManyToManyPolicy::SymmetricArrays`] an
    /// array relation whose target already paired its back-references
    /// still becomes many-to-many, with a join table of its own.
    fn pair_many_to_many(&self, naming: &TableNaming) -> Vec<Vec<Option<String>>> {
        let mut joins: Vec<Vec<Option<String>>> = self
            .schemas
            .iter()
            .map(|schema| vec![None; schema.relations.len()])
            .collect();
        let mut paired: HashSet<(usize, usize)> = HashSet::new();
        let mut names: HashSet<String> = HashSet::new();
        let symmetric = self.policy == ManyToManyPolicy::SymmetricArrays;

        for (i, schema) in self.schemas.iter().enumerate() {
            for (a, relation) in schema.relations.iter().enumerate() {
                if paired.contains(&(i, a)) {
                    continue;
                }
                let Some(j) = self.target(relation) else {
                    continue;
                };
                let partner = if i != j && is_array(relation) {
                    self.partner(j, i, &paired)
                } else {
                    None
                };
                let back = partner.map(|b| &self.schemas[j].relations[b]);

                let upgraded = self.requests_join_table(relation)
                    || match back {
                        Some(back) => symmetric || self.requests_join_table(back),
                        None => {
                            symmetric
                                && is_array(relation)
                                && i != j
                                && self.has_array_back_reference(j, i)
                        }
                    };
                if !upgraded {
                    continue;
                }

                let name = self.join_table_name(i, j, relation, back, &names, naming);
                names.insert(name.clone());
                paired.insert((i, a));
                if let Some(b) = partner {
                    paired.insert((j, b));
                    joins[j][b] = Some(name.clone());
                }
                joins[i][a] = Some(name);
            }
        }
        joins
    }

    /// Join table for a many-to-many relation of schema `i` to schema `j`,
    /// with `back` the paired relation of `j`, if any.
    ///
    /// The schema declared first owns the pair: its explicit name wins, then
    /// the other side's, then `<owner>_<other>`. A default name already used
    /// by another pair becomes `<owner>_<property>`.
    fn join_table_name(
        &self,
        i: usize,
        j: usize,
        relation: &SchemaRelation,
        back: Option<&SchemaRelation>,
        taken: &HashSet<String>,
        naming: &TableNaming,
    ) -> String {
        let (owner, other) = if i <= j { (i, j) } else { (j, i) };
        let (owner_side, other_side) = if i <= j {
            (Some(relation), back)
        } else {
            (back, Some(relation))
        };

        let explicit = owner_side
            .and_then(|r| r.join_table.clone())
            .or_else(|| other_side.and_then(|r| r.join_table.clone()));
        if let Some(name) = explicit {
            if taken.contains(&name) {
                warn!(table = %name, "Join table named by more than one many-to-many pair");
            }
            return name;
        }

        let owner_table = naming.table_name(&self.schemas[owner]);
        let name = format!("{owner_table}_{}", naming.table_name(&self.schemas[other]))
            .to_lowercase();
        if !taken.contains(&name) {
            return name;
        }
        let property = &owner_side.unwrap_or(relation).property;
        let distinct = format!("{owner_table}_{property}").to_lowercase();
        debug!(
            default = %name,
            table = %distinct,
            "Join table name taken by another pair"
        );
        distinct
    }

    /// Builds the many-to-one placed on child `j` for a one-to-many declared
    /// by parent `i`.
    ///
    /// Returns `None` when the child already declares a plain property with
    /// the foreign-key name, since the column exists already.
    fn inverse_relation(
        &self,
        i: usize,
        j: usize,
        relation: &SchemaRelation,
        pending: &[SchemaRelation],
    ) -> Option<SchemaRelation> {
        let parent = &self.schemas[i];
        let child = &self.schemas[j];

        let mut foreign_key = if relation.has_custom_foreign_key() {
            relation.foreign_key.clone()
        } else {
            SchemaRelation::default_foreign_key(&parent.name)
        };
        if child.find_property(&foreign_key).is_some() {
            debug!(
                schema = %child.name,
                column = %foreign_key,
                "Foreign key already declared as a property"
            );
            return None;
        }

        let taken = child
            .relations
            .iter()
            .chain(pending)
            .any(|r| r.kind.is_to_one() && r.foreign_key == foreign_key);
        if taken {
            foreign_key = format!(
                "{}_{}_id",
                parent.name.to_lowercase(),
                relation.property.to_lowercase()
            );
        }

        Some(SchemaRelation {
            kind: RelationKind::ManyToOne,
            property: relation.property.clone(),
            target_schema: parent.name.clone(),
            foreign_key,
            join_table: None,
            required: false,
        })
    }
}

fn is_array(relation: &SchemaRelation) -> bool {
    matches!(relation.kind, RelationKind::OneToMany | RelationKind::ManyToMany)
}
