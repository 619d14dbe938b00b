use schema_bindgen::ir::{Invocation, NamedType, ResponseType, Scalar, TypeRef};
use schema_bindgen::lower::{lower_document, lower_services, lower_types};
use schema_bindgen::{GeneratorConfig, GeneratorError, OptionalityRule, SchemaDocument};
use serde_json::{Value, json};

const FIXTURE: &str = include_str!("fixtures/stripe_subset.json");

fn fixture() -> SchemaDocument {
    SchemaDocument::from_json_str(FIXTURE).unwrap()
}

fn doc(value: Value) -> SchemaDocument {
    SchemaDocument::from_value(value).unwrap()
}

fn record<'a>(types: &'a [NamedType], name: &str) -> &'a schema_bindgen::ir::RecordType {
    types
        .iter()
        .find_map(|t| match t {
            NamedType::Record(r) if r.name == name => Some(r),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no record {name}"))
}

// ————————————————————————————————————————————————————————————————————————————
// SCENARIOS
// ————————————————————————————————————————————————————————————————————————————

#[test]
fn scenario_a_record_with_mandatory_and_optional_fields() {
    let doc = doc(json!({
        "components": { "schemas": {
            "Charge": { "properties": {
                "amount": { "type": "integer" },
                "currency": { "type": "string", "nullable": true }
            } }
        } }
    }));
    let types = lower_types(&doc, &GeneratorConfig::default()).unwrap();
    assert_eq!(types.len(), 1);
    let charge = record(&types, "Charge");
    assert_eq!(charge.fields[0].name, "Amount");
    assert_eq!(charge.fields[0].ty, TypeRef::Scalar(Scalar::Integer));
    assert!(!charge.fields[0].optional);
    assert_eq!(charge.fields[1].name, "Currency");
    assert_eq!(charge.fields[1].ty, TypeRef::Scalar(Scalar::String));
    assert!(charge.fields[1].optional);

    let text = schema_bindgen::generate_types(&doc, &GeneratorConfig::default()).unwrap();
    assert!(text.contains("pub struct Charge {\n    pub amount: i64,\n"));
    assert!(text.contains("    pub currency: Option<String>,\n"));
}

#[test]
fn scenario_b_enum_recovered_from_description() {
    let doc = doc(json!({
        "components": { "schemas": {
            "balance_transaction": { "properties": {
                "kind": { "type": "string", "description": "Can be `charge`, `refund`, or `payout`." }
            } }
        } }
    }));
    let types = lower_types(&doc, &GeneratorConfig::default()).unwrap();
    assert_eq!(types.len(), 2);
    match &types[1] {
        NamedType::Enum(e) => {
            assert_eq!(e.name, "BalanceTransactionKind");
            assert_eq!(e.literals, ["charge", "refund", "payout"]);
        }
        other => panic!("expected an enum, got {other:?}"),
    }
}

#[test]
fn scenario_c_form_post_becomes_post_with_body() {
    let doc = doc(json!({
        "components": { "schemas": {
            "Charge": {
                "properties": { "id": { "type": "string" } },
                "x-stripeOperations": [
                    { "method_name": "create", "method_on": "service", "operation": "post", "path": "/v1/charges" }
                ]
            }
        } },
        "paths": { "/v1/charges": { "post": {
            "requestBody": { "content": { "application/x-www-form-urlencoded": {
                "schema": { "properties": { "amount": { "type": "integer" } } }
            } } },
            "responses": { "200": { "content": { "application/json": {
                "schema": { "$ref": "#/components/schemas/Charge" }
            } } } }
        } } }
    }));
    let services = lower_services(&doc, &GeneratorConfig::default()).unwrap();
    assert_eq!(services.len(), 1);
    assert_eq!(services[0].name, "ChargeService");
    let op = &services[0].operations[0];
    assert_eq!(op.method_name, "Create");
    assert_eq!(op.path, "/v1/charges");
    assert_eq!(op.invocation, Invocation::PostWithBody);

    let text = schema_bindgen::generate_services(&doc, &GeneratorConfig::default()).unwrap();
    assert!(text.contains("pub struct ChargeService<'a, C> {"));
    assert!(text.contains("self.client.post_with_body::<Charge, B>(&path, &query, body)"));
}

#[test]
fn scenario_d_keyword_path_parameter() {
    let sources = schema_bindgen::generate(&fixture(), &GeneratorConfig::default()).unwrap();
    let expected = "\
    pub fn retrieve(&self, r#type: &str) -> ApiResult<Thing> {
        let path = \"/v1/things/{type}\"
            .replace(\"{type}\", &r#type.to_string());
";
    assert!(sources.services.contains(expected), "{}", sources.services);
}

// ————————————————————————————————————————————————————————————————————————————
// FIXTURE
// ————————————————————————————————————————————————————————————————————————————

#[test]
fn fixture_declarations_follow_discovery_order() {
    let model = lower_document(&fixture(), &GeneratorConfig::default()).unwrap();
    let names: Vec<&str> = model.types.iter().map(NamedType::name).collect();
    assert_eq!(
        names,
        [
            "Charge",
            "ChargeCustomerDU",
            "ChargeStatus",
            "ChargeType",
            "Customer",
            "CustomerTaxExempt",
            "Refund",
            "RefundChargeDU",
            "DeletedCustomer",
            "Thing",
            "EmptyObject",
        ]
    );
    let services: Vec<&str> = model.services.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(services, ["ChargeService", "CustomerService", "RefundService", "ThingService"]);
}

#[test]
fn fixture_charge_fields() {
    let types = lower_types(&fixture(), &GeneratorConfig::default()).unwrap();
    let charge = record(&types, "Charge");
    let fields: Vec<(&str, bool)> = charge.fields.iter().map(|f| (f.name.as_str(), f.optional)).collect();
    // `outcome` has no resolvable shape and is left out
    assert_eq!(
        fields,
        [
            ("Amount", false),
            ("Currency", true),
            ("Customer", true),
            ("Id", false),
            ("Metadata", false),
            ("Refunds", false),
            ("Status", false),
            ("Type", false),
            ("Num3dSecure", true),
        ]
    );
    assert_eq!(charge.fields[4].ty, TypeRef::StringMap);
    assert_eq!(charge.fields[5].ty, TypeRef::List(Box::new(TypeRef::Named("Refund".into()))));
    assert_eq!(charge.fields[8].wire(), "3d_secure");

    // explicit enum wins over the description sentence
    let status = types.iter().find(|t| t.name() == "ChargeStatus").unwrap();
    match status {
        NamedType::Enum(e) => assert_eq!(e.literals, ["succeeded", "pending", "failed"]),
        other => panic!("expected an enum, got {other:?}"),
    }

    let empty = record(&types, "EmptyObject");
    assert_eq!(empty.fields.len(), 1);
    assert_eq!(empty.fields[0].ty, TypeRef::PropertyBag);
}

#[test]
fn fixture_required_list_drives_optionality_when_configured() {
    let config = GeneratorConfig {
        optionality: OptionalityRule::Required,
        ..GeneratorConfig::default()
    };
    let types = lower_types(&fixture(), &config).unwrap();
    let charge = record(&types, "Charge");
    let optional: Vec<&str> = charge
        .fields
        .iter()
        .filter(|f| f.optional)
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(
        optional,
        ["Currency", "Customer", "Metadata", "Refunds", "Status", "Type", "Num3dSecure"]
    );
}

#[test]
fn fixture_service_operations() {
    let services = lower_services(&fixture(), &GeneratorConfig::default()).unwrap();

    let charge = &services[0];
    let methods: Vec<&str> = charge.operations.iter().map(|o| o.method_name.as_str()).collect();
    // the `collection` marker is not a service operation
    assert_eq!(methods, ["Create", "Retrieve", "List"]);

    let list = &charge.operations[2];
    let params: Vec<&str> = list.parameters.iter().map(|p| p.wire_name.as_str()).collect();
    // required first, header parameters skipped
    assert_eq!(params, ["customer", "limit", "created"]);
    assert_eq!(list.response, ResponseType::List("Charge".into()));
    assert_eq!(list.invocation, Invocation::Get);

    assert_eq!(services[1].operations[0].invocation, Invocation::Delete);
    assert_eq!(services[1].operations[0].response, ResponseType::Single("DeletedCustomer".into()));

    // the path root belongs to another resource
    assert_eq!(services[2].operations[0].method_name, "ListForCharge");
}

#[test]
fn fixture_renders_rust_modules() {
    let sources = schema_bindgen::generate(&fixture(), &GeneratorConfig::default()).unwrap();

    let charge = "\
/// A charge against a payment source.
/// Charges can be refunded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Charge {
    /// Amount in the smallest currency unit.
    pub amount: i64,
    #[serde(default, skip_serializing_if = \"Option::is_none\")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = \"Option::is_none\")]
    pub customer: Option<Box<ChargeCustomerDU>>,
    pub id: String,
    pub metadata: HashMap<String, String>,
    pub refunds: Vec<Refund>,
    /// Can be `succeeded` or `pending`.
    pub status: ChargeStatus,
    /// Can be `card`, `bank_account`, or `source`.
    pub r#type: ChargeType,
    #[serde(rename = \"3d_secure\", default, skip_serializing_if = \"Option::is_none\")]
    pub num3d_secure: Option<bool>,
}
";
    assert!(sources.types.contains(charge), "{}", sources.types);
    assert!(sources.types.contains("pub enum ChargeType {\n    #[serde(rename = \"card\")]\n    Card,\n"));
    assert!(sources.types.contains("    #[serde(rename = \"bank_account\")]\n    BankAccount,\n"));

    let retrieve = "\
    /// Retrieves a charge.
    ///
    /// `GET /v1/charges/{charge}`
    pub fn retrieve(&self, charge: &str, expand: Option<&[String]>) -> ApiResult<Charge> {
        let path = \"/v1/charges/{charge}\"
            .replace(\"{charge}\", &charge.to_string());
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(expand) = expand {
            query.push((\"expand\", expand.join(\",\")));
        }
        self.client.get::<Charge>(&path, &query)
    }
";
    assert!(sources.services.contains(retrieve), "{}", sources.services);
    assert!(sources.services.contains(
        "pub fn list(&self, customer: &str, limit: Option<i64>, created: Option<i64>) -> ApiResult<ListResponse<Charge>> {"
    ));
    assert!(sources.services.contains("pub fn list_for_charge(&self, charge: &str) -> ApiResult<ListResponse<Refund>> {"));
    assert!(sources.services.contains("self.client.delete::<DeletedCustomer>(&path, &query)"));
}

#[test]
fn output_is_byte_identical_across_runs() {
    let config = GeneratorConfig::default();
    let first = schema_bindgen::generate_from_str(FIXTURE, &config).unwrap();
    for _ in 0..5 {
        assert_eq!(schema_bindgen::generate_from_str(FIXTURE, &config).unwrap(), first);
    }
    // each pipeline on its own renders the same text as the combined run
    let doc = fixture();
    assert_eq!(schema_bindgen::generate_types(&doc, &config).unwrap(), first.types);
    assert_eq!(schema_bindgen::generate_services(&doc, &config).unwrap(), first.services);
}

// ————————————————————————————————————————————————————————————————————————————
// FAILURES
// ————————————————————————————————————————————————————————————————————————————

#[test]
fn one_bad_reference_fails_the_whole_run() {
    let mut value: Value = serde_json::from_str(FIXTURE).unwrap();
    value["components"]["schemas"]["thing"]["properties"]["owner"] =
        json!({ "$ref": "#/components/schemas/account" });
    let err = schema_bindgen::generate(&doc(value), &GeneratorConfig::default()).unwrap_err();
    match err {
        GeneratorError::UnresolvableReference { owner, reference } => {
            assert_eq!(owner, "thing.owner");
            assert_eq!(reference, "account");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn response_without_a_usable_schema_fails() {
    let mut value: Value = serde_json::from_str(FIXTURE).unwrap();
    value["paths"]["/v1/things/{type}"]["get"]["responses"]["200"]["content"]["application/json"]["schema"] =
        json!({ "type": "object" });
    let err = schema_bindgen::generate(&doc(value), &GeneratorConfig::default()).unwrap_err();
    assert!(matches!(err, GeneratorError::UnhandledResponseType { .. }), "{err}");
    assert!(err.to_string().contains("ThingService.Retrieve"));
}

#[test]
fn unsupported_verbs_fail() {
    let mut value: Value = serde_json::from_str(FIXTURE).unwrap();
    let get = value["paths"]["/v1/things/{type}"]["get"].clone();
    value["paths"]["/v1/things/{type}"]["put"] = get;
    value["components"]["schemas"]["thing"]["x-stripeOperations"][0]["operation"] = json!("put");
    let err = schema_bindgen::generate(&doc(value), &GeneratorConfig::default()).unwrap_err();
    assert!(matches!(err, GeneratorError::UnhandledVerb { ref verb, .. } if verb == "put"), "{err}");
}

#[test]
fn nested_arrays_fail_fast() {
    let doc = doc(json!({
        "components": { "schemas": {
            "matrix": { "properties": {
                "rows": { "type": "array", "items": { "type": "array", "items": { "type": "integer" } } }
            } }
        } }
    }));
    let err = lower_types(&doc, &GeneratorConfig::default()).unwrap_err();
    assert!(matches!(err, GeneratorError::UnhandledPropertyShape { .. }), "{err}");
}
