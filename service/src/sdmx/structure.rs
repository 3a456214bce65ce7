//! SDMX-JSON structure message models
//!
//! Shapes returned by
//! `{baseUrl}/dataflow/{agencyId}/{dataflowId}?references=all`.
//! Only the substructures the catalog consumes are modeled; unknown
//! fields are dropped during deserialization.

use serde::{Deserialize, Serialize};

/// Top-level structure message
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SdmxStructureMessage {
    /// Structures payload
    pub data: Option<SdmxStructures>,
}

/// Structures carried by one message
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SdmxStructures {
    /// Dataflows
    pub dataflows: Vec<SdmxDataflow>,
    /// Data structure definitions
    pub data_structures: Vec<SdmxDataStructure>,
    /// Codelists referenced by dimensions and attributes
    pub codelists: Vec<SdmxCodelist>,
    /// Concept schemes referenced by components
    pub concept_schemes: Vec<SdmxConceptScheme>,
    /// Content constraints restricting allowed codes
    pub content_constraints: Vec<SdmxContentConstraint>,
}

/// One dataflow
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SdmxDataflow {
    /// Dataflow id
    pub id: Option<String>,
    /// Dataflow URN
    pub urn: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Description
    pub description: Option<String>,
    /// URN of the data structure this flow conforms to
    pub structure: Option<String>,
}

/// One data structure definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SdmxDataStructure {
    /// Data structure id
    pub id: Option<String>,
    /// Component lists
    pub data_structure_components: Option<SdmxComponents>,
}

/// Component lists of a data structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SdmxComponents {
    /// Dimensions
    pub dimension_list: SdmxDimensionList,
    /// Attributes
    pub attribute_list: Option<SdmxAttributeList>,
    /// Measures
    pub measure_list: Option<SdmxMeasureList>,
}

/// Dimension list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SdmxDimensionList {
    /// Regular dimensions
    pub dimensions: Vec<SdmxDimension>,
    /// Time dimensions
    pub time_dimensions: Vec<SdmxTimeDimension>,
}

/// One dimension
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SdmxDimension {
    /// Dimension id, used as the column name
    pub id: Option<String>,
    /// Component type, `Dimension` for enumerable dimensions
    #[serde(rename = "type")]
    pub dimension_type: Option<String>,
    /// Position within the key
    pub position: Option<i64>,
    /// URN of the concept describing this dimension
    pub concept_identity: Option<String>,
    /// Local representation, carrying the codelist enumeration
    pub local_representation: Option<SdmxRepresentation>,
}

/// One time dimension
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SdmxTimeDimension {
    /// Dimension id, e.g. `TIME_PERIOD`
    pub id: Option<String>,
    /// Position within the key
    pub position: Option<i64>,
}

/// Representation of a component
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SdmxRepresentation {
    /// URN of the enumerating codelist
    pub enumeration: Option<String>,
}

/// Attribute list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SdmxAttributeList {
    /// Attributes
    pub attributes: Vec<SdmxAttribute>,
}

/// One attribute
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SdmxAttribute {
    /// Attribute id, used as the column name
    pub id: Option<String>,
    /// URN of the concept describing this attribute
    pub concept_identity: Option<String>,
    /// Local representation, carrying the codelist enumeration
    pub local_representation: Option<SdmxRepresentation>,
}

/// Measure list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SdmxMeasureList {
    /// Primary measure carrying observation values
    pub primary_measure: Option<SdmxPrimaryMeasure>,
}

/// The primary measure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SdmxPrimaryMeasure {
    /// Measure id, usually `OBS_VALUE`
    pub id: Option<String>,
    /// URN of the concept describing the measure
    pub concept_identity: Option<String>,
}

/// One codelist
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SdmxCodelist {
    /// Codelist id
    pub id: Option<String>,
    /// Codelist URN
    pub urn: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Codes
    pub codes: Vec<SdmxCode>,
}

impl SdmxCodelist {
    /// Label of a code, falling back to its id
    #[must_use]
    pub fn code_label(&self, code_id: &str) -> Option<String> {
        self.codes
            .iter()
            .find(|code| code.id.as_deref() == Some(code_id))
            .map(|code| code.name.clone().unwrap_or_else(|| code_id.to_string()))
    }
}

/// One code of a codelist
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SdmxCode {
    /// Code id
    pub id: Option<String>,
    /// Code URN
    pub urn: Option<String>,
    /// Display name
    pub name: Option<String>,
}

/// One concept scheme
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SdmxConceptScheme {
    /// Scheme id
    pub id: Option<String>,
    /// Scheme URN
    pub urn: Option<String>,
    /// Concepts
    pub concepts: Vec<SdmxConcept>,
}

/// One concept
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SdmxConcept {
    /// Concept id
    pub id: Option<String>,
    /// Concept URN
    pub urn: Option<String>,
    /// Display name
    pub name: Option<String>,
}

/// One content constraint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SdmxContentConstraint {
    /// Constraint type; only `Actual` constraints restrict options
    #[serde(rename = "type")]
    pub constraint_type: Option<String>,
    /// Cube regions listing permitted codes
    pub cube_regions: Vec<SdmxCubeRegion>,
}

impl SdmxContentConstraint {
    /// Whether this constraint describes actually present data
    #[must_use]
    pub fn is_actual(&self) -> bool {
        self.constraint_type.as_deref() == Some("Actual")
    }
}

/// One cube region of a content constraint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SdmxCubeRegion {
    /// Whether the listed codes are included (default) or excluded
    pub is_included: Option<bool>,
    /// Permitted codes per dimension
    pub key_values: Vec<SdmxKeyValue>,
}

/// Permitted codes for one dimension
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SdmxKeyValue {
    /// Dimension id
    pub id: Option<String>,
    /// Permitted code ids
    pub values: Vec<String>,
}

/// Immutable snapshot of one fetched structural-metadata response
#[derive(Debug, Clone)]
pub struct SdmxJsonDataflow {
    /// The dataflow
    pub dataflow: SdmxDataflow,
    /// Its data structure
    pub data_structure: SdmxDataStructure,
    /// Codelists from the same response
    pub codelists: Vec<SdmxCodelist>,
    /// Concept schemes from the same response
    pub concept_schemes: Vec<SdmxConceptScheme>,
    /// Content constraints from the same response
    pub content_constraints: Vec<SdmxContentConstraint>,
}

impl SdmxJsonDataflow {
    /// Look a codelist up by its URN
    #[must_use]
    pub fn codelist_by_urn(&self, urn: &str) -> Option<&SdmxCodelist> {
        self.codelists.iter().find(|cl| cl.urn.as_deref() == Some(urn))
    }

    /// Look a concept up by the URN a component's `conceptIdentity` carries
    #[must_use]
    pub fn concept_by_urn(&self, urn: &str) -> Option<&SdmxConcept> {
        self.concept_schemes
            .iter()
            .flat_map(|scheme| scheme.concepts.iter())
            .find(|concept| concept.urn.as_deref() == Some(urn))
            .or_else(|| {
                // Some providers identify concepts only by terminal id.
                let id = terminal_identifier(urn);
                self.concept_schemes
                    .iter()
                    .flat_map(|scheme| scheme.concepts.iter())
                    .find(|concept| concept.id.as_deref() == Some(id))
            })
    }

    /// "Actual" content constraints of this snapshot
    pub fn actual_constraints(&self) -> impl Iterator<Item = &SdmxContentConstraint> {
        self.content_constraints.iter().filter(|c| c.is_actual())
    }
}

/// Terminal identifier of an SDMX URN
///
/// `urn:...ConceptScheme=ABS:CS_COMMON(1.0.0).FREQ` → `FREQ`.
#[must_use]
pub fn terminal_identifier(urn: &str) -> &str {
    urn.rsplit('.').next().unwrap_or(urn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_terminal_identifier() {
        assert_eq!(
            terminal_identifier(
                "urn:sdmx:org.sdmx.infomodel.conceptscheme.Concept=ABS:CS_COMMON(1.0.0).FREQ"
            ),
            "FREQ"
        );
        assert_eq!(terminal_identifier("FREQ"), "FREQ");
    }

    #[test]
    fn test_deserialize_message() {
        let message: SdmxStructureMessage = serde_json::from_value(json!({
            "data": {
                "dataflows": [{ "id": "RT", "name": "Retail Trade" }],
                "dataStructures": [{
                    "id": "RT_DSD",
                    "dataStructureComponents": {
                        "dimensionList": {
                            "dimensions": [{
                                "id": "REGION",
                                "type": "Dimension",
                                "position": 0,
                                "conceptIdentity": "urn:concept.REGION",
                                "localRepresentation": { "enumeration": "urn:codelist.CL_REGION" }
                            }],
                            "timeDimensions": [{ "id": "TIME_PERIOD", "position": 1 }]
                        }
                    }
                }],
                "codelists": [{
                    "id": "CL_REGION",
                    "urn": "urn:codelist.CL_REGION",
                    "codes": [{ "id": "1", "name": "New South Wales" }]
                }]
            }
        }))
        .unwrap();

        let data = message.data.unwrap();
        assert_eq!(data.dataflows[0].name.as_deref(), Some("Retail Trade"));
        let components = data.data_structures[0]
            .data_structure_components
            .as_ref()
            .unwrap();
        assert_eq!(components.dimension_list.dimensions.len(), 1);
        assert_eq!(components.dimension_list.time_dimensions.len(), 1);
        assert_eq!(
            data.codelists[0].code_label("1"),
            Some("New South Wales".to_string())
        );
    }
}
