//! End-to-end resolution of ArcGIS portal item references against
//! canned portal responses

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;

use common::{context, item_data_url, item_url, portal_reference, StaticFetcher};
use geocatalog_service::prelude::*;

fn resolved_target(ctx: &ResolveContext, state: &ResolutionState) -> Arc<Model> {
    let target_id = state.target_id().expect("resolved state");
    ctx.registry.get(target_id).expect("registered target")
}

#[tokio::test]
async fn test_scene_service_resolves_to_3d_tiles() {
    let fetcher = Arc::new(StaticFetcher::new().with(
        &item_url("scene1"),
        json!({
            "id": "scene1",
            "type": "Scene Service",
            "title": "City buildings",
            "url": "https://tiles.example.com/arcgis/rest/services/City/SceneServer"
        }),
    ));
    let ctx = context(&fetcher);
    let reference = portal_reference(&ctx, "ref-scene", "scene1");

    let state = reference.resolve(&ctx).await.unwrap();
    let target = resolved_target(&ctx, &state);
    assert_eq!(target.type_name(), "3d-tiles");
    assert_eq!(
        target.resolved_string(&ctx.order, "url").unwrap().as_deref(),
        Some("/i3s-to-3dtiles/https://tiles.example.com/arcgis/rest/services/City/SceneServer")
    );
    assert_eq!(
        target.resolved_string(&ctx.order, "name").unwrap().as_deref(),
        Some("City buildings")
    );
}

#[tokio::test]
async fn test_feature_server_layer_resolves_to_single_layer_type() {
    let fetcher = Arc::new(StaticFetcher::new().with(
        &item_url("fs3"),
        json!({
            "id": "fs3",
            "type": "Feature Service",
            "url": "https://services.example.com/arcgis/rest/services/Roads/FeatureServer/3"
        }),
    ));
    let ctx = context(&fetcher);
    let reference = portal_reference(&ctx, "ref-fs3", "fs3");

    let state = reference.resolve(&ctx).await.unwrap();
    assert_eq!(resolved_target(&ctx, &state).type_name(), "esri-featureServer");
}

#[tokio::test]
async fn test_feature_server_root_resolves_to_group() {
    let fetcher = Arc::new(StaticFetcher::new().with(
        &item_url("fsroot"),
        json!({
            "id": "fsroot",
            "type": "Feature Service",
            "url": "https://services.example.com/arcgis/rest/services/Roads/FeatureServer"
        }),
    ));
    let ctx = context(&fetcher);
    let reference = portal_reference(&ctx, "ref-fsroot", "fsroot");

    let state = reference.resolve(&ctx).await.unwrap();
    assert_eq!(
        resolved_target(&ctx, &state).type_name(),
        "esri-featureServer-group"
    );
}

#[tokio::test]
async fn test_item_data_narrows_group_to_single_layer() {
    let fetcher = Arc::new(
        StaticFetcher::new()
            .with(
                &item_url("narrow"),
                json!({
                    "id": "narrow",
                    "type": "Feature Service",
                    "url": "https://services.example.com/arcgis/rest/services/Roads/FeatureServer"
                }),
            )
            .with(&item_data_url("narrow"), json!({ "layers": [{ "id": 7 }] })),
    );
    let ctx = context(&fetcher);
    let reference = portal_reference(&ctx, "ref-narrow", "narrow");

    let state = reference.resolve(&ctx).await.unwrap();
    let target = resolved_target(&ctx, &state);
    assert_eq!(target.type_name(), "esri-featureServer");
    assert_eq!(
        target.resolved_string(&ctx.order, "url").unwrap().as_deref(),
        Some("https://services.example.com/arcgis/rest/services/Roads/FeatureServer/7")
    );
}

#[tokio::test]
async fn test_tiled_map_service_keeps_base_url() {
    let fetcher = Arc::new(
        StaticFetcher::new()
            .with(
                &item_url("tiled"),
                json!({
                    "id": "tiled",
                    "type": "Map Service",
                    "typeKeywords": ["Map Service", "Tiled"],
                    "url": "https://services.example.com/arcgis/rest/services/Basemap/MapServer"
                }),
            )
            .with(&item_data_url("tiled"), json!({ "layers": [{ "id": 0 }] })),
    );
    let ctx = context(&fetcher);
    let reference = portal_reference(&ctx, "ref-tiled", "tiled");

    let state = reference.resolve(&ctx).await.unwrap();
    let target = resolved_target(&ctx, &state);
    // Layer narrowing never applies to tiled map services.
    assert_eq!(target.type_name(), "esri-mapServer");
    assert_eq!(
        target.resolved_string(&ctx.order, "url").unwrap().as_deref(),
        Some("https://services.example.com/arcgis/rest/services/Basemap/MapServer")
    );
}

#[tokio::test]
async fn test_unknown_format_is_unresolvable_not_an_error() {
    let fetcher = Arc::new(StaticFetcher::new().with(
        &item_url("webmap"),
        json!({ "id": "webmap", "type": "Web Map" }),
    ));
    let ctx = context(&fetcher);
    let reference = portal_reference(&ctx, "ref-webmap", "webmap");

    let state = reference.resolve(&ctx).await.unwrap();
    assert_eq!(state, ResolutionState::Unresolvable);
    assert!(ctx.registry.is_empty());
}

#[tokio::test]
async fn test_portal_error_response_is_fatal() {
    let fetcher = Arc::new(StaticFetcher::new().with(
        &item_url("gone"),
        json!({ "error": { "code": 400, "message": "Item does not exist" } }),
    ));
    let ctx = context(&fetcher);
    let reference = portal_reference(&ctx, "ref-gone", "gone");

    let err = reference.resolve(&ctx).await.unwrap_err();
    assert!(matches!(err, CatalogError::Structural { .. }));
    assert_eq!(reference.current_state().await, ResolutionState::Unresolved);
}

#[tokio::test]
async fn test_item_properties_override_target_traits() {
    let fetcher = Arc::new(StaticFetcher::new().with(
        &item_url("props"),
        json!({
            "id": "props",
            "type": "Feature Service",
            "url": "https://services.example.com/arcgis/rest/services/Roads/FeatureServer/1"
        }),
    ));
    let ctx = context(&fetcher);
    let reference = portal_reference(&ctx, "ref-props", "props");
    reference
        .model()
        .set_trait(
            DEFINITION_STRATUM,
            "itemProperties",
            TraitValue::Object(json!({ "opacity": 0.4, "tileWidth": 256 })),
        )
        .unwrap();

    let state = reference.resolve(&ctx).await.unwrap();
    let target = resolved_target(&ctx, &state);
    // Declared keys land in the override stratum; undeclared keys are
    // skipped without failing the resolution.
    assert_eq!(target.resolved_number(&ctx.order, "opacity").unwrap(), Some(0.4));
}

#[tokio::test]
async fn test_definition_carried_onto_target_without_url() {
    let fetcher = Arc::new(StaticFetcher::new().with(
        "https://portal.example.com/sharing/rest/content/items/custom?f=json",
        json!({
            "id": "custom",
            "type": "Feature Service",
            "url": "https://services.example.com/arcgis/rest/services/Roads/FeatureServer/1"
        }),
    ));
    let ctx = context(&fetcher);
    let reference = portal_reference(&ctx, "ref-custom", "custom");
    reference
        .model()
        .set_trait(DEFINITION_STRATUM, "url", "https://portal.example.com")
        .unwrap();
    reference
        .model()
        .set_trait(DEFINITION_STRATUM, "attribution", "Roads team")
        .unwrap();

    let state = reference.resolve(&ctx).await.unwrap();
    let target = resolved_target(&ctx, &state);
    assert_eq!(
        target.resolved_string(&ctx.order, "attribution").unwrap().as_deref(),
        Some("Roads team")
    );
    // The portal root stays on the reference; the target's url comes
    // from the matched item.
    let definition = target.stratum(DEFINITION_STRATUM).expect("carried definition");
    assert!(definition.get("url").is_none());
    assert_eq!(
        target.resolved_string(&ctx.order, "url").unwrap().as_deref(),
        Some("https://services.example.com/arcgis/rest/services/Roads/FeatureServer/1")
    );
}

#[tokio::test]
async fn test_resolution_idempotent_until_strata_change() {
    let fetcher = Arc::new(StaticFetcher::new().with(
        &item_url("stable"),
        json!({
            "id": "stable",
            "type": "Feature Service",
            "url": "https://services.example.com/arcgis/rest/services/Roads/FeatureServer/1"
        }),
    ));
    let ctx = context(&fetcher);
    let reference = portal_reference(&ctx, "ref-stable", "stable");

    let first = reference.resolve(&ctx).await.unwrap();
    let second = reference.resolve(&ctx).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(fetcher.calls_to(&item_url("stable")), 1);
    assert_eq!(ctx.registry.len(), 1);

    // Changing the reference's strata redoes resolution from scratch
    // and the freshly carried definition reaches the new target.
    reference
        .model()
        .set_trait(DEFINITION_STRATUM, "name", "Renamed")
        .unwrap();
    let third = reference.resolve(&ctx).await.unwrap();
    let target = resolved_target(&ctx, &third);
    assert_eq!(
        target
            .stratum(DEFINITION_STRATUM)
            .and_then(|s| s.get("name").and_then(TraitValue::as_str).map(ToString::to_string)),
        Some("Renamed".to_string())
    );
}

#[tokio::test]
async fn test_missing_item_id_is_fatal() {
    let fetcher = Arc::new(StaticFetcher::new());
    let ctx = context(&fetcher);
    let model = ctx
        .factory
        .create("arcgis-portal-item", "ref-empty")
        .unwrap();
    let reference = ArcGisPortalItemReference::new(model).unwrap();

    let err = reference.resolve(&ctx).await.unwrap_err();
    assert!(matches!(err, CatalogError::Structural { .. }));
}
