use aas_patch_pointer::{
    format_json_pointer, get, is_child, parse_index, parse_json_pointer, validate_json_pointer,
    ValidationError, APPEND_MARKER,
};
use serde_json::json;

#[test]
fn pointer_parse_format_roundtrip_matrix() {
    let cases = [
        "",
        "/",
        "/id",
        "/assetAdministrationShells/0/assetInformation/globalAssetId",
        "/submodels/0/submodelElements/-",
        "/a~0b/c~1d",
        "/~0/~1",
    ];

    for pointer in cases {
        validate_json_pointer(pointer).expect("valid pointer");
        let path = parse_json_pointer(pointer);
        assert_eq!(format_json_pointer(&path), pointer);
    }
}

#[test]
fn pointer_get_matrix() {
    let doc = json!({
        "submodels": [
            {"id": "urn:sm:1", "submodelElements": [{"idShort": "Weight", "value": null}]}
        ],
        "a/b": {"~": 1}
    });

    assert_eq!(get(&doc, &parse_json_pointer("/submodels/0/id")), Some(&json!("urn:sm:1")));
    assert_eq!(
        get(&doc, &parse_json_pointer("/submodels/0/submodelElements/0/value")),
        Some(&json!(null))
    );
    assert_eq!(get(&doc, &parse_json_pointer("/submodels/1")), None);
    assert_eq!(get(&doc, &parse_json_pointer("/submodels/-")), None);
    assert_eq!(get(&doc, &parse_json_pointer("/a~1b/~0")), Some(&json!(1)));
}

#[test]
fn pointer_validation_and_relationships() {
    assert!(validate_json_pointer("/foo/bar").is_ok());
    assert_eq!(validate_json_pointer("foo/bar"), Err(ValidationError::PointerInvalid));

    let p = parse_json_pointer("/submodels/0");
    let q = parse_json_pointer("/submodels/0/submodelElements/-");
    assert!(is_child(&p, &q));
    assert!(!is_child(&q, &p));
    assert_eq!(q.last().map(String::as_str), Some(APPEND_MARKER));
    assert_eq!(parse_index(&p[1]), Some(0));
    assert_eq!(parse_index(APPEND_MARKER), None);
}
