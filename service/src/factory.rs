//! String-keyed catalog member factory
//!
//! Catalog member types are selected at runtime by a flat string
//! discriminator (the `type` field of a catalog definition, or the
//! `definition.type` of a matched format rule). The factory maps those
//! discriminators to [`ModelType`] entries and is populated once at
//! process start; creating a model for an unregistered discriminator
//! is an error, not a fallback.

use std::collections::HashMap;
use std::sync::Arc;

use geocatalog_core::prelude::*;

use crate::arcgis::ARCGIS_PORTAL_ITEM_STRATUM;
use crate::model::Model;
use crate::sdmx::SDMX_DATAFLOW_STRATUM;

/// A registered catalog member type: discriminator plus schema
#[derive(Debug, Clone)]
pub struct ModelType {
    /// Type discriminator string
    pub type_name: String,

    /// Trait schema models of this type conform to
    pub schema: Arc<TraitSchema>,
}

impl ModelType {
    /// Create a model type from a schema
    #[must_use]
    pub fn new(schema: TraitSchema) -> Self {
        Self {
            type_name: schema.type_name.clone(),
            schema: Arc::new(schema),
        }
    }
}

/// Factory mapping type discriminators to model types
#[derive(Default)]
pub struct CatalogMemberFactory {
    types: HashMap<String, Arc<ModelType>>,
}

impl CatalogMemberFactory {
    /// Create an empty factory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model type
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the discriminator is
    /// already registered.
    pub fn register(&mut self, model_type: ModelType) -> Result<()> {
        let type_name = model_type.type_name.clone();
        if self.types.contains_key(&type_name) {
            return Err(CatalogError::config(format!(
                "catalog member type '{type_name}' registered twice"
            )));
        }
        self.types.insert(type_name, Arc::new(model_type));
        Ok(())
    }

    /// Whether a discriminator is registered
    #[must_use]
    pub fn knows(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Look up a registered model type
    #[must_use]
    pub fn get(&self, type_name: &str) -> Option<&Arc<ModelType>> {
        self.types.get(type_name)
    }

    /// Create a model of the given type
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownType`] for unregistered
    /// discriminators.
    pub fn create(&self, type_name: &str, unique_id: impl Into<String>) -> Result<Arc<Model>> {
        let model_type = self
            .types
            .get(type_name)
            .ok_or_else(|| CatalogError::UnknownType(type_name.to_string()))?;
        Ok(Arc::new(Model::new(
            unique_id,
            Arc::clone(&model_type.schema),
        )))
    }

    /// Factory pre-populated with the standard catalog member types
    ///
    /// # Errors
    ///
    /// Never fails in practice; propagates registration errors.
    pub fn with_standard_types() -> Result<Self> {
        let mut factory = Self::new();
        for schema in standard_schemas() {
            factory.register(ModelType::new(schema))?;
        }
        Ok(factory)
    }
}

/// Build the stratum order and factory used by a catalog process
///
/// This is the single initialization point: the stratum order is an
/// explicit object handed by reference into resolution, and every
/// loader stratum name is registered here exactly once.
///
/// # Errors
///
/// Propagates duplicate stratum or type registrations, which indicate
/// a wiring bug.
pub fn wire_catalog() -> Result<(StratumOrder, CatalogMemberFactory)> {
    let order = StratumOrder::standard()
        .with_load_stratum(ARCGIS_PORTAL_ITEM_STRATUM)?
        .with_load_stratum(SDMX_DATAFLOW_STRATUM)?;
    let factory = CatalogMemberFactory::with_standard_types()?;
    Ok((order, factory))
}

/// Traits shared by every mappable catalog item
fn base_item_schema(type_name: &str) -> TraitSchema {
    TraitSchema::new(type_name)
        .with_trait(TraitDefinition::new("url", TraitKind::String))
        .with_trait(TraitDefinition::new("name", TraitKind::String))
        .with_trait(TraitDefinition::new("description", TraitKind::String))
        .with_trait(TraitDefinition::new("attribution", TraitKind::String))
        .with_trait(TraitDefinition::new("rectangle", TraitKind::Rectangle))
        .with_trait(TraitDefinition::new("opacity", TraitKind::Number).with_default(0.8))
        .with_trait(TraitDefinition::new("legends", TraitKind::ObjectList))
}

fn standard_schemas() -> Vec<TraitSchema> {
    vec![
        base_item_schema("3d-tiles"),
        base_item_schema("wms")
            .with_trait(TraitDefinition::new("layers", TraitKind::String)),
        base_item_schema("kml"),
        base_item_schema("esri-mapServer")
            .with_trait(TraitDefinition::new("layerId", TraitKind::Number)),
        base_item_schema("esri-mapServer-group"),
        base_item_schema("esri-featureServer")
            .with_trait(TraitDefinition::new("layerId", TraitKind::Number)),
        base_item_schema("esri-featureServer-group"),
        base_item_schema("sdmx-json-dataflow")
            .with_trait(TraitDefinition::new("agencyId", TraitKind::String))
            .with_trait(TraitDefinition::new("dataflowId", TraitKind::String))
            .with_trait(TraitDefinition::new("unitMeasure", TraitKind::String))
            .with_trait(TraitDefinition::new("dimensions", TraitKind::ObjectList))
            .with_trait(TraitDefinition::new("columns", TraitKind::ObjectList))
            .with_trait(TraitDefinition::new("modelOverrides", TraitKind::ObjectList))
            .with_trait(TraitDefinition::new("defaultStyle", TraitKind::Object))
            .with_trait(TraitDefinition::new("featureInfoTemplate", TraitKind::Object)),
        base_item_schema("arcgis-portal-item")
            .with_trait(TraitDefinition::new("itemId", TraitKind::String))
            .with_trait(TraitDefinition::new("itemProperties", TraitKind::Object)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_create_known_type() {
        let factory = CatalogMemberFactory::with_standard_types().unwrap();
        let model = factory.create("wms", "my-wms").unwrap();
        assert_eq!(model.type_name(), "wms");
        assert_eq!(model.unique_id(), "my-wms");
        assert!(model.schema().declares("layers"));
    }

    #[test]
    fn test_unknown_type_fails() {
        let factory = CatalogMemberFactory::with_standard_types().unwrap();
        let err = factory.create("gpx", "x").unwrap_err();
        assert!(matches!(err, CatalogError::UnknownType(_)));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut factory = CatalogMemberFactory::new();
        factory
            .register(ModelType::new(TraitSchema::new("wms")))
            .unwrap();
        let err = factory
            .register(ModelType::new(TraitSchema::new("wms")))
            .unwrap_err();
        assert!(matches!(err, CatalogError::Config(_)));
    }

    #[test]
    fn test_wire_catalog_registers_loader_strata() {
        let (order, factory) = wire_catalog().unwrap();
        assert!(order.contains(ARCGIS_PORTAL_ITEM_STRATUM));
        assert!(order.contains(SDMX_DATAFLOW_STRATUM));
        assert!(factory.knows("3d-tiles"));
        assert!(factory.knows("sdmx-json-dataflow"));
    }
}
