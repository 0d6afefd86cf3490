//! Integration tests for document loading, extraction and resolution.

use std::path::PathBuf;

use specql_core::{
    AbstractType, ManyToManyPolicy, PipelineConfig, RelationKind, SchemaStrategy, TableNaming,
    validate_schemas,
};
use specql_extract::{
    DocumentFormat, extract, extract_schemas, extract_with_naming, load_document, parse_document,
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_blog_fixture_extracts_object_schemas_in_order() {
    let document = load_document(fixture("blog.yaml")).unwrap();
    let extraction = extract_schemas(&document);

    let names: Vec<&str> = extraction.schemas.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["User", "Post", "Tag"]);
    assert!(extraction.malformed.is_empty());
    assert!(validate_schemas(&extraction.schemas).is_empty());

    let user = &extraction.schemas[0];
    assert_eq!(user.title.as_deref(), Some("Blog Author"));
    let props: Vec<&str> = user.properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(props, ["name", "email", "age"]);
    assert!(user.find_property("email").unwrap().is_unique());
    assert!(user.find_property("posts").is_none());
}

#[test]
fn test_blog_fixture_resolves_relationships() {
    let document = load_document(fixture("blog.yaml")).unwrap();
    let resolved = extract(&document, &PipelineConfig::default());

    assert!(resolved.dangling.is_empty());

    let user = &resolved.schemas[0];
    assert_eq!(user.relations.len(), 1);
    assert_eq!(user.relations[0].kind, RelationKind::OneToMany);

    let post = &resolved.schemas[1];
    let author = post.find_relation("author").unwrap();
    assert_eq!(author.kind, RelationKind::ManyToOne);
    assert_eq!(author.foreign_key, "user_id");
    assert!(author.required);

    let tags = post.find_relation("tags").unwrap();
    assert_eq!(tags.kind, RelationKind::ManyToMany);
    assert_eq!(tags.join_table.as_deref(), Some("post_tag"));

    let tag = &resolved.schemas[2];
    assert_eq!(tag.relations[0].join_table.as_deref(), Some("post_tag"));
}

#[test]
fn test_json_and_yaml_documents_agree() {
    let yaml = std::fs::read_to_string(fixture("blog.yaml")).unwrap();
    let from_yaml = parse_document(&yaml, DocumentFormat::Yaml).unwrap();
    let json = serde_json::to_string_pretty(&from_yaml).unwrap();
    let from_json = parse_document(&json, DocumentFormat::Json).unwrap();

    assert_eq!(extract_schemas(&from_yaml), extract_schemas(&from_json));
}

#[test]
fn test_dangling_and_malformed_are_reported_together() {
    let yaml = r#"
components:
  schemas:
    Post:
      type: object
      properties:
        author: { $ref: '#/components/schemas/Person' }
        title: { type: string }
    Broken: "not a schema"
"#;
    let document = parse_document(yaml, DocumentFormat::Yaml).unwrap();
    let resolved = extract(&document, &PipelineConfig::default());

    assert_eq!(resolved.schemas.len(), 1);
    assert_eq!(resolved.malformed.len(), 1);
    assert_eq!(resolved.malformed[0].schema, "Broken");
    assert_eq!(resolved.dangling.len(), 1);
    assert_eq!(
        resolved.dangling[0].to_string(),
        "Post.author references unknown schema Person"
    );
    assert!(resolved.schemas[0].relations.is_empty());
}

#[test]
fn test_denormalized_strategy_flattens_scalars() {
    let yaml = r#"
components:
  schemas:
    Address:
      type: object
      properties:
        city: { type: string }
    Customer:
      type: object
      properties:
        name: { type: string }
        shipping: { $ref: '#/components/schemas/Address' }
        meta:
          type: object
          properties:
            source: { type: string }
        orders:
          type: array
          items: { $ref: '#/components/schemas/Order' }
    Order:
      type: object
      properties:
        total: { type: number }
"#;
    let document = parse_document(yaml, DocumentFormat::Yaml).unwrap();
    let config = PipelineConfig {
        schema_strategy: SchemaStrategy::Denormalized,
        ..PipelineConfig::default()
    };
    let resolved = extract(&document, &config);

    let customer = &resolved.schemas[1];
    let props: Vec<&str> = customer.properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(props, ["name", "meta_source", "shipping_city"]);
    assert_eq!(customer.relations.len(), 1);
    assert_eq!(customer.relations[0].kind, RelationKind::OneToMany);

    let order = &resolved.schemas[2];
    assert_eq!(order.relations[0].kind, RelationKind::ManyToOne);
    assert_eq!(order.relations[0].foreign_key, "customer_id");
    assert_eq!(order.find_property("total").unwrap().ty, AbstractType::Decimal);
}

#[test]
fn test_explicit_policy_pairs_reverse_array() {
    let yaml = r#"
components:
  schemas:
    Student:
      type: object
      properties:
        courses:
          type: array
          x-join-table: enrollments
          items: { $ref: '#/components/schemas/Course' }
    Course:
      type: object
      properties:
        students:
          type: array
          items: { $ref: '#/components/schemas/Student' }
"#;
    let document = parse_document(yaml, DocumentFormat::Yaml).unwrap();
    let config = PipelineConfig {
        many_to_many: ManyToManyPolicy::ExplicitJoinTable,
        ..PipelineConfig::default()
    };
    let naming = TableNaming::custom(|s| format!("tbl_{}", s.name.to_lowercase()));
    let resolved = extract_with_naming(&document, &config, &naming);

    let courses = &resolved.schemas[0].relations[0];
    assert_eq!(courses.kind, RelationKind::ManyToMany);
    assert_eq!(courses.join_table.as_deref(), Some("enrollments"));

    // The plain array back is the other side of the same association: no
    // inverse foreign key lands on either schema.
    assert_eq!(resolved.schemas[0].relations.len(), 1);
    assert_eq!(resolved.schemas[1].relations.len(), 1);
    let students = &resolved.schemas[1].relations[0];
    assert_eq!(students.kind, RelationKind::ManyToMany);
    assert_eq!(students.join_table.as_deref(), Some("enrollments"));
}

#[test]
fn test_second_array_to_same_target_gets_own_join_table() {
    let yaml = r#"
components:
  schemas:
    Post:
      type: object
      properties:
        tags:
          type: array
          items: { $ref: '#/components/schemas/Tag' }
        featured:
          type: array
          items: { $ref: '#/components/schemas/Tag' }
    Tag:
      type: object
      properties:
        posts:
          type: array
          items: { $ref: '#/components/schemas/Post' }
"#;
    let document = parse_document(yaml, DocumentFormat::Yaml).unwrap();
    let resolved = extract(&document, &PipelineConfig::default());

    let joins: Vec<(&str, Option<&str>)> = resolved
        .schemas
        .iter()
        .flat_map(|s| &s.relations)
        .map(|r| (r.property.as_str(), r.join_table.as_deref()))
        .collect();
    assert_eq!(
        joins,
        [
            ("tags", Some("post_tag")),
            ("featured", Some("post_featured")),
            ("posts", Some("post_tag")),
        ]
    );
}
