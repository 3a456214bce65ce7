//! Loading an SDMX-JSON dataflow stratum from a canned structure
//! response and resolving the traits it projects

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;

use common::{context, StaticFetcher};
use geocatalog_service::loadable::install_loadable;
use geocatalog_service::prelude::*;
use geocatalog_service::region::RegionProviderList;
use geocatalog_service::sanitize::PassthroughSanitizer;
use geocatalog_service::sdmx::stratum::SdmxDataflowParams;

const STRUCTURE_URL: &str = "https://api.example.com/dataflow/ABS/RT?references=all";

fn params() -> SdmxDataflowParams {
    SdmxDataflowParams {
        base_url: "https://api.example.com".to_string(),
        agency_id: "ABS".to_string(),
        dataflow_id: "RT".to_string(),
        model_overrides: Vec::new(),
    }
}

fn structure_response() -> serde_json::Value {
    json!({
        "data": {
            "dataflows": [{
                "id": "RT",
                "name": "Retail Trade",
                "description": "Monthly retail turnover by state"
            }],
            "dataStructures": [{
                "id": "RT_DSD",
                "dataStructureComponents": {
                    "dimensionList": {
                        "dimensions": [{
                            "id": "REGION",
                            "type": "Dimension",
                            "position": 0,
                            "conceptIdentity": "urn:concept.REGION",
                            "localRepresentation": { "enumeration": "urn:codelist.CL_STATE" }
                        }],
                        "timeDimensions": [{ "id": "TIME_PERIOD", "position": 1 }]
                    },
                    "measureList": {
                        "primaryMeasure": { "id": "OBS_VALUE" }
                    }
                }
            }],
            "codelists": [{
                "id": "STE",
                "urn": "urn:codelist.CL_STATE",
                "name": "State",
                "codes": [
                    { "id": "1", "name": "New South Wales" },
                    { "id": "2", "name": "Victoria" }
                ]
            }],
            "conceptSchemes": [{
                "id": "CS",
                "urn": "urn:conceptscheme.CS",
                "concepts": [{ "id": "REGION", "urn": "urn:concept.REGION", "name": "Region" }]
            }]
        }
    })
}

#[tokio::test]
async fn test_load_projects_traits_onto_model() {
    let fetcher = Arc::new(StaticFetcher::new().with(STRUCTURE_URL, structure_response()));
    let ctx = context(&fetcher);
    let matcher = RegionProviderList::new(vec!["STE".to_string()]);

    let stratum = SdmxJsonDataflowStratum::load(
        &ctx.fetcher,
        &ctx.config,
        &params(),
        &matcher,
        &PassthroughSanitizer,
    )
    .await
    .unwrap();

    let model = ctx
        .factory
        .create("sdmx-json-dataflow", "abs-retail-trade")
        .unwrap();
    install_loadable(&model, &stratum);

    assert_eq!(
        model.resolved_string(&ctx.order, "name").unwrap().as_deref(),
        Some("Retail Trade")
    );
    assert_eq!(
        model
            .resolved_string(&ctx.order, "description")
            .unwrap()
            .as_deref(),
        Some("Monthly retail turnover by state")
    );

    let dimensions = model.resolved_list(&ctx.order, "dimensions").unwrap();
    assert_eq!(dimensions.len(), 1);
    assert_eq!(dimensions[0]["id"], json!("REGION"));
    assert_eq!(dimensions[0]["selectedId"], json!("1"));

    let columns = model.resolved_list(&ctx.order, "columns").unwrap();
    let names: Vec<&str> = columns
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert_eq!(names, vec!["OBS_VALUE", "REGION", "TIME_PERIOD"]);

    let style = model.resolve(&ctx.order, "defaultStyle").unwrap().unwrap();
    let style = style.as_object().unwrap();
    assert_eq!(style["regionColumn"], json!("REGION"));

    let template = model
        .resolve(&ctx.order, "featureInfoTemplate")
        .unwrap()
        .unwrap();
    let template = template.as_object().unwrap();
    assert!(template["template"]
        .as_str()
        .unwrap()
        .contains("{{OBS_VALUE}}"));
}

#[tokio::test]
async fn test_definition_name_beats_loaded_name() {
    let fetcher = Arc::new(StaticFetcher::new().with(STRUCTURE_URL, structure_response()));
    let ctx = context(&fetcher);

    let stratum = SdmxJsonDataflowStratum::load(
        &ctx.fetcher,
        &ctx.config,
        &params(),
        &RegionProviderList::default(),
        &PassthroughSanitizer,
    )
    .await
    .unwrap();

    let model = ctx
        .factory
        .create("sdmx-json-dataflow", "abs-retail-trade")
        .unwrap();
    model
        .set_trait(DEFINITION_STRATUM, "name", "Retail trade (catalog)")
        .unwrap();
    install_loadable(&model, &stratum);

    // The loader stratum outranks the definition.
    assert_eq!(
        model.resolved_string(&ctx.order, "name").unwrap().as_deref(),
        Some("Retail Trade")
    );
    model
        .set_trait(OVERRIDE_STRATUM, "name", "Retail trade (user)")
        .unwrap();
    assert_eq!(
        model.resolved_string(&ctx.order, "name").unwrap().as_deref(),
        Some("Retail trade (user)")
    );
}

#[tokio::test]
async fn test_empty_structure_response_is_fatal() {
    let fetcher = Arc::new(StaticFetcher::new().with(
        STRUCTURE_URL,
        json!({ "data": { "dataStructures": [{ "id": "RT_DSD" }] } }),
    ));
    let ctx = context(&fetcher);

    let err = SdmxJsonDataflowStratum::load(
        &ctx.fetcher,
        &ctx.config,
        &params(),
        &RegionProviderList::default(),
        &PassthroughSanitizer,
    )
    .await
    .unwrap_err();

    match err {
        CatalogError::Structural { title, .. } => {
            assert_eq!(title, "Could not load SDMX dataflow");
        }
        other => panic!("expected structural error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_structure_url_routed_through_proxy() {
    let proxied = format!("https://proxy.example.com/_1d/{STRUCTURE_URL}");
    let fetcher = Arc::new(StaticFetcher::new().with(&proxied, structure_response()));
    let mut ctx = context(&fetcher);
    ctx.config.proxy.base_url = Some("https://proxy.example.com".to_string());

    SdmxJsonDataflowStratum::load(
        &ctx.fetcher,
        &ctx.config,
        &params(),
        &RegionProviderList::default(),
        &PassthroughSanitizer,
    )
    .await
    .unwrap();
    assert_eq!(fetcher.calls_to(&proxied), 1);
}
