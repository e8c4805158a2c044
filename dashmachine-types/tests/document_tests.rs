use dashmachine_types::{
    ContractId, Document, DocumentBatch, DocumentId, DocumentQuery, IdentityId, NewDocument,
    WhereClause, WhereOperator,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn doc(id: &str, label: &str, age: u32) -> Document {
    Document {
        contract_id: ContractId::parse("Dpns").unwrap(),
        document_type: "domain".into(),
        id: DocumentId::parse(id).unwrap(),
        owner_id: IdentityId::parse("Creator").unwrap(),
        data: json!({
            "normalizedParentDomainName": "dash",
            "normalizedLabel": label,
            "age": age,
            "records": { "identityId": "4kN7xd" },
        }),
    }
}

// ── Field lookup ──────────────────────────────────────────────────

#[test]
fn field_resolves_dotted_paths() {
    let d = doc("D1", "alice", 3);
    assert_eq!(d.field("records.identityId"), Some(&json!("4kN7xd")));
    assert_eq!(d.field("normalizedLabel"), Some(&json!("alice")));
    assert_eq!(d.field("records.missing"), None);
    assert_eq!(d.field("nope.deeper"), None);
}

// ── Where clauses ─────────────────────────────────────────────────

#[test]
fn eq_clause_matches_exact_value() {
    let d = doc("D1", "alice", 3);
    assert!(WhereClause::eq("normalizedLabel", "alice").matches(&d));
    assert!(!WhereClause::eq("normalizedLabel", "Alice").matches(&d));
}

#[test]
fn missing_field_never_matches() {
    let d = doc("D1", "alice", 3);
    assert!(!WhereClause::eq("unknown", "alice").matches(&d));
}

#[test]
fn ordering_clauses_compare_numbers() {
    let d = doc("D1", "alice", 3);
    let clause = |op, v: u32| WhereClause {
        field: "age".into(),
        op,
        value: json!(v),
    };
    assert!(clause(WhereOperator::Lt, 4).matches(&d));
    assert!(clause(WhereOperator::Lte, 3).matches(&d));
    assert!(clause(WhereOperator::Gt, 2).matches(&d));
    assert!(clause(WhereOperator::Gte, 3).matches(&d));
    assert!(!clause(WhereOperator::Gt, 3).matches(&d));
}

#[test]
fn in_and_starts_with() {
    let d = doc("D1", "alice", 3);
    let within = WhereClause {
        field: "normalizedLabel".into(),
        op: WhereOperator::In,
        value: json!(["bob", "alice"]),
    };
    let prefix = WhereClause {
        field: "normalizedLabel".into(),
        op: WhereOperator::StartsWith,
        value: json!("ali"),
    };
    assert!(within.matches(&d));
    assert!(prefix.matches(&d));
}

// ── Queries ───────────────────────────────────────────────────────

#[test]
fn query_is_conjunction() {
    let d = doc("D1", "alice", 3);
    let q = DocumentQuery::new()
        .where_eq("normalizedParentDomainName", "dash")
        .where_eq("normalizedLabel", "alice");
    assert!(q.matches(&d));

    let q = q.where_eq("age", 99);
    assert!(!q.matches(&d));
}

#[test]
fn apply_honours_start_at_and_limit() {
    let docs = vec![doc("D1", "a", 1), doc("D2", "b", 2), doc("D3", "c", 3)];
    let q = DocumentQuery::new().start_at(2).limit(1);
    let found = q.apply(&docs);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id.as_str(), "D2");
}

#[test]
fn start_at_one_is_first_result() {
    let docs = vec![doc("D1", "a", 1), doc("D2", "b", 2)];
    let found = DocumentQuery::new().start_at(1).apply(&docs);
    assert_eq!(found.len(), 2);
}

#[test]
fn query_serializes_in_platform_shape() {
    let q = DocumentQuery::new().where_eq("normalizedLabel", "alice").start_at(1);
    let value = serde_json::to_value(&q).unwrap();
    assert_eq!(
        value,
        json!({
            "where": [{ "field": "normalizedLabel", "op": "==", "value": "alice" }],
            "startAt": 1,
        })
    );
}

// ── Batches ───────────────────────────────────────────────────────

#[test]
fn create_one_batch() {
    let batch = DocumentBatch::create_one(doc("D1", "a", 1));
    assert_eq!(batch.len(), 1);
    assert_eq!(batch.create.len(), 1);
    assert!(batch.replace.is_empty());
    assert!(batch.delete.is_empty());
    assert!(DocumentBatch::default().is_empty());
}

#[test]
fn new_document_builder() {
    let nd = NewDocument::new(
        ContractId::parse("Dpns").unwrap(),
        "note",
        IdentityId::parse("Creator").unwrap(),
        json!({ "text": "hi" }),
    );
    assert_eq!(nd.document_type, "note");
    assert_eq!(nd.data["text"], "hi");
}
