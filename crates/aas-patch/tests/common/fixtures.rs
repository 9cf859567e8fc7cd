#![allow(dead_code)]

use serde_json::{json, Value};

/// A small asset administration shell environment: one shell referencing
/// two submodels, one concept description.
pub fn environment() -> Value {
    json!({
        "assetAdministrationShells": [{
            "modelType": "AssetAdministrationShell",
            "id": "urn:example:aas:pump-01",
            "idShort": "Pump01",
            "assetInformation": {
                "assetKind": "Instance",
                "globalAssetId": "urn:example:asset:pump-01"
            },
            "submodels": [
                {"type": "ModelReference", "keys": [{"type": "Submodel", "value": "urn:example:sm:nameplate"}]},
                {"type": "ModelReference", "keys": [{"type": "Submodel", "value": "urn:example:sm:tech"}]}
            ]
        }],
        "submodels": [
            {
                "modelType": "Submodel",
                "id": "urn:example:sm:nameplate",
                "idShort": "Nameplate",
                "semanticId": {"type": "ExternalReference", "keys": [{"type": "GlobalReference", "value": "0173-1#01-AHX837#002"}]},
                "description": [{"language": "en", "text": "Manufacturer nameplate"}],
                "submodelElements": [
                    {"modelType": "Property", "idShort": "ManufacturerName", "valueType": "xs:string", "value": "ACME"},
                    {"modelType": "Property", "idShort": "SerialNumber", "valueType": "xs:string", "value": "SN-0042"}
                ]
            },
            {
                "modelType": "Submodel",
                "id": "urn:example:sm:tech",
                "idShort": "TechnicalData",
                "submodelElements": [
                    {"modelType": "Property", "idShort": "MaxPressure", "valueType": "xs:double", "value": "16.0"},
                    {"modelType": "SubmodelElementCollection", "idShort": "Ports", "value": []}
                ]
            }
        ],
        "conceptDescriptions": [
            {"modelType": "ConceptDescription", "id": "urn:example:cd:max-pressure", "idShort": "MaxPressure"}
        ]
    })
}

/// Single-item list document.
pub fn items() -> Value {
    json!({"items": [{"id": "a"}]})
}

/// Pointers into [`environment`] that resolve before any edit.
pub const EXISTING_PATHS: &[&str] = &[
    "/assetAdministrationShells/0/idShort",
    "/assetAdministrationShells/0/assetInformation/assetKind",
    "/assetAdministrationShells/0/submodels/1",
    "/submodels/0/description",
    "/submodels/0/description/0/text",
    "/submodels/0/submodelElements/0",
    "/submodels/0/submodelElements/1/value",
    "/submodels/1/submodelElements/0/value",
    "/submodels/1/submodelElements/1",
    "/submodels/1/submodelElements/1/value",
    "/conceptDescriptions/0/idShort",
];

/// Insertion points in [`environment`]; some only exist before other edits.
pub const INSERT_PATHS: &[&str] = &[
    "/submodels/0/submodelElements/-",
    "/submodels/0/submodelElements/0",
    "/submodels/1/submodelElements/1/value/-",
    "/submodels/0/displayName",
    "/submodels/1/description",
    "/assetAdministrationShells/0/submodels/-",
    "/conceptDescriptions/0/category",
];
