//! The dataflow stratum and its derivations
//!
//! One loaded `SdmxJsonDataflowStratum` owns the immutable snapshot of
//! a structural-metadata response and the trait values derived from
//! it: selectable dimensions, synthesized table columns, the default
//! style, and the feature-info template. Everything is computed once
//! at load time; the unit string is the only derivation that needs
//! observed data and is therefore a method over column values.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::json;

use geocatalog_core::prelude::*;

use crate::fetch::{cache_window, proxy_url, CachingFetcher};
use crate::loadable::LoadableStratum;
use crate::region::RegionMatcher;
use crate::sanitize::HtmlSanitizer;
use crate::sdmx::overrides::{DimensionOption, ModelOverride};
use crate::sdmx::structure::{
    terminal_identifier, SdmxCodelist, SdmxComponents, SdmxDimension, SdmxJsonDataflow,
    SdmxStructureMessage,
};
use crate::sdmx::SDMX_DATAFLOW_STRATUM;
use crate::table::{ChartStyle, ColumnType, TableColumn, TableStyle};

const LOAD_ERROR_TITLE: &str = "Could not load SDMX dataflow";
const STRUCTURE_CACHE: &str = "1d";

/// One dimension surfaced to the user as a selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectableDimension {
    /// Dimension id
    pub id: String,

    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Allowed options
    pub options: Vec<DimensionOption>,

    /// Currently selected option id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_id: Option<String>,

    /// Whether the dimension is disabled entirely
    pub disable: bool,

    /// Position within the key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
}

impl SelectableDimension {
    /// Label of the selected option, falling back to its id
    #[must_use]
    pub fn selected_label(&self) -> Option<&str> {
        let selected = self.selected_id.as_deref()?;
        Some(
            self.options
                .iter()
                .find(|option| option.id == selected)
                .map_or(selected, DimensionOption::label),
        )
    }
}

/// Parameters identifying one dataflow to load
#[derive(Debug, Clone, Default)]
pub struct SdmxDataflowParams {
    /// Structure API base URL
    pub base_url: String,
    /// Agency id, e.g. `ABS`
    pub agency_id: String,
    /// Dataflow id
    pub dataflow_id: String,
    /// Overrides from the catalog definition
    pub model_overrides: Vec<ModelOverride>,
}

/// Loaded stratum translating one dataflow bundle into trait values
#[derive(Clone)]
pub struct SdmxJsonDataflowStratum {
    snapshot: SdmxJsonDataflow,
    dimensions: Vec<SelectableDimension>,
    columns: Vec<TableColumn>,
    style: TableStyle,
    template: String,
    unit_measure_column: Option<String>,
    unit_measure_codelist_urn: Option<String>,
    frequency_dimension: Option<String>,
}

impl SdmxJsonDataflowStratum {
    /// Fetch and build the stratum for one dataflow
    ///
    /// # Errors
    ///
    /// Network and parse failures propagate; a structure response with
    /// no dataflows or no data structures raises a fatal
    /// [`CatalogError::Structural`] error, aborting creation of the
    /// catalog item backed by this stratum.
    pub async fn load(
        fetcher: &CachingFetcher,
        config: &CatalogConfig,
        params: &SdmxDataflowParams,
        matcher: &dyn RegionMatcher,
        sanitizer: &dyn HtmlSanitizer,
    ) -> Result<Self> {
        let url = format!(
            "{}/dataflow/{}/{}?references=all",
            params.base_url.trim_end_matches('/'),
            params.agency_id,
            params.dataflow_id
        );
        let proxied = proxy_url(&config.proxy, &url, STRUCTURE_CACHE);
        let value = fetcher
            .fetch_json_cached(&proxied, cache_window(STRUCTURE_CACHE))
            .await?;

        let message: SdmxStructureMessage = serde_json::from_value(value)
            .map_err(|e| CatalogError::structural(LOAD_ERROR_TITLE, e.to_string()))?;
        let data = message.data.ok_or_else(|| {
            CatalogError::structural(LOAD_ERROR_TITLE, "The structure response is empty.")
        })?;
        let mut dataflows = data.dataflows;
        let mut data_structures = data.data_structures;
        if dataflows.is_empty() {
            return Err(CatalogError::structural(
                LOAD_ERROR_TITLE,
                "The structure response contains no dataflows.",
            ));
        }
        if data_structures.is_empty() {
            return Err(CatalogError::structural(
                LOAD_ERROR_TITLE,
                "The structure response contains no data structures.",
            ));
        }

        let snapshot = SdmxJsonDataflow {
            dataflow: dataflows.swap_remove(0),
            data_structure: data_structures.swap_remove(0),
            codelists: data.codelists,
            concept_schemes: data.concept_schemes,
            content_constraints: data.content_constraints,
        };
        Ok(Self::build(
            snapshot,
            &params.model_overrides,
            matcher,
            sanitizer,
        ))
    }

    /// Build the stratum from an already-fetched snapshot
    #[must_use]
    pub fn build(
        snapshot: SdmxJsonDataflow,
        overrides: &[ModelOverride],
        matcher: &dyn RegionMatcher,
        sanitizer: &dyn HtmlSanitizer,
    ) -> Self {
        let dimensions = build_dimensions(&snapshot, overrides);

        let mut unit_measure_column = None;
        let mut unit_measure_codelist_urn = None;
        let mut unit_multiplier_column = None;
        let mut frequency_dimension = None;
        for (id, concept, enumeration) in components_of(&snapshot) {
            let ov = override_for(overrides, concept, enumeration);
            match component_tag(ov, concept) {
                Some("unit-measure") => {
                    unit_measure_column = Some(id.to_string());
                    unit_measure_codelist_urn = enumeration.map(ToString::to_string);
                }
                Some("unit-multiplier") => unit_multiplier_column = Some(id.to_string()),
                Some("frequency") => frequency_dimension = Some(id.to_string()),
                _ => {}
            }
        }

        let columns = build_columns(
            &snapshot,
            &dimensions,
            overrides,
            matcher,
            unit_multiplier_column.as_deref(),
        );
        let style = build_style(&columns);
        let template = build_template(sanitizer, &snapshot, &dimensions, &columns, &style);

        Self {
            snapshot,
            dimensions,
            columns,
            style,
            template,
            unit_measure_column,
            unit_measure_codelist_urn,
            frequency_dimension,
        }
    }

    /// The snapshot this stratum was computed from
    #[must_use]
    pub fn snapshot(&self) -> &SdmxJsonDataflow {
        &self.snapshot
    }

    /// Selectable dimensions derived from the data structure
    #[must_use]
    pub fn dimensions(&self) -> &[SelectableDimension] {
        &self.dimensions
    }

    /// Synthesized table columns
    #[must_use]
    pub fn columns(&self) -> &[TableColumn] {
        &self.columns
    }

    /// Default style derived from the columns
    #[must_use]
    pub fn style(&self) -> &TableStyle {
        &self.style
    }

    /// Feature-info template HTML
    #[must_use]
    pub fn feature_info_template(&self) -> &str {
        &self.template
    }

    /// Compose the displayed unit string from observed column values
    ///
    /// The unit-measure column contributes its single unique value
    /// (resolved to a codelist label when one applies); a column with
    /// more than one distinct value is ambiguous and contributes
    /// nothing. The selected frequency option's label is appended in
    /// parentheses, e.g. `AUD (Quarterly)`.
    #[must_use]
    pub fn unit_measure(&self, values_by_column: &HashMap<String, Vec<String>>) -> Option<String> {
        let unit = self.unit_measure_column.as_deref().and_then(|column| {
            let values = values_by_column.get(column)?;
            let distinct: BTreeSet<&String> = values.iter().collect();
            if distinct.len() != 1 {
                return None;
            }
            let raw = (*distinct.iter().next()?).clone();
            Some(
                self.unit_measure_codelist_urn
                    .as_deref()
                    .and_then(|urn| self.snapshot.codelist_by_urn(urn))
                    .and_then(|codelist| codelist.code_label(&raw))
                    .unwrap_or(raw),
            )
        });
        let frequency = self
            .frequency_dimension
            .as_deref()
            .and_then(|id| self.dimensions.iter().find(|d| d.id == id))
            .and_then(|d| d.selected_label().map(ToString::to_string));

        match (unit, frequency) {
            (Some(unit), Some(frequency)) => Some(format!("{unit} ({frequency})")),
            (Some(unit), None) => Some(unit),
            _ => None,
        }
    }
}

impl LoadableStratum for SdmxJsonDataflowStratum {
    fn stratum_name(&self) -> &'static str {
        SDMX_DATAFLOW_STRATUM
    }

    fn to_stratum(&self) -> Stratum {
        let mut stratum = Stratum::new();
        if let Some(name) = &self.snapshot.dataflow.name {
            stratum.set("name", name.as_str());
        }
        if let Some(description) = &self.snapshot.dataflow.description {
            stratum.set("description", description.as_str());
        }
        stratum.set(
            "dimensions",
            TraitValue::List(
                self.dimensions
                    .iter()
                    .filter_map(|d| serde_json::to_value(d).ok())
                    .collect(),
            ),
        );
        stratum.set(
            "columns",
            TraitValue::List(self.columns.iter().map(TableColumn::to_json).collect()),
        );
        stratum.set("defaultStyle", TraitValue::Object(self.style.to_json()));
        stratum.set(
            "featureInfoTemplate",
            TraitValue::Object(json!({ "template": self.template })),
        );
        stratum
    }

    fn duplicate(&self) -> Box<dyn LoadableStratum> {
        Box::new(self.clone())
    }
}

impl std::fmt::Debug for SdmxJsonDataflowStratum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdmxJsonDataflowStratum")
            .field("dataflow", &self.snapshot.dataflow.id)
            .field("dimensions", &self.dimensions.len())
            .field("columns", &self.columns.len())
            .finish_non_exhaustive()
    }
}

fn components<'a>(snapshot: &'a SdmxJsonDataflow) -> Option<&'a SdmxComponents> {
    snapshot.data_structure.data_structure_components.as_ref()
}

/// (id, concept urn, codelist urn) of every dimension and attribute
fn components_of(
    snapshot: &SdmxJsonDataflow,
) -> Vec<(&str, Option<&str>, Option<&str>)> {
    let Some(parts) = components(snapshot) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for dim in &parts.dimension_list.dimensions {
        if let Some(id) = dim.id.as_deref() {
            out.push((
                id,
                dim.concept_identity.as_deref(),
                dim.local_representation
                    .as_ref()
                    .and_then(|r| r.enumeration.as_deref()),
            ));
        }
    }
    if let Some(attributes) = &parts.attribute_list {
        for attr in &attributes.attributes {
            if let Some(id) = attr.id.as_deref() {
                out.push((
                    id,
                    attr.concept_identity.as_deref(),
                    attr.local_representation
                        .as_ref()
                        .and_then(|r| r.enumeration.as_deref()),
                ));
            }
        }
    }
    out
}

/// The override applying to a component; codelist wins over concept
fn override_for<'a>(
    overrides: &'a [ModelOverride],
    concept_urn: Option<&str>,
    codelist_urn: Option<&str>,
) -> Option<&'a ModelOverride> {
    let by_urn = |urn: &str| overrides.iter().find(|o| o.id.as_deref() == Some(urn));
    codelist_urn
        .and_then(by_urn)
        .or_else(|| concept_urn.and_then(by_urn))
}

/// Model-override type of a component, explicit or auto-detected
///
/// Components whose concept URN terminates in `UNIT_MEASURE`,
/// `UNIT_MULT`, or `FREQ` are tagged without configuration.
fn component_tag(ov: Option<&ModelOverride>, concept_urn: Option<&str>) -> Option<&'static str> {
    if let Some(declared) = ov.and_then(|o| o.override_type.as_deref()) {
        return match declared {
            "unit-measure" => Some("unit-measure"),
            "unit-multiplier" => Some("unit-multiplier"),
            "frequency" => Some("frequency"),
            "region" => Some("region"),
            "region-type" => Some("region-type"),
            _ => None,
        };
    }
    match concept_urn.map(terminal_identifier) {
        Some("UNIT_MEASURE") => Some("unit-measure"),
        Some("UNIT_MULT") => Some("unit-multiplier"),
        Some("FREQ") => Some("frequency"),
        _ => None,
    }
}

/// Tag of the dimension with the given id, if any
fn dimension_tag(
    snapshot: &SdmxJsonDataflow,
    overrides: &[ModelOverride],
    dimension_id: &str,
) -> Option<&'static str> {
    let parts = components(snapshot)?;
    let dim = parts
        .dimension_list
        .dimensions
        .iter()
        .find(|d| d.id.as_deref() == Some(dimension_id))?;
    let enum_urn = dim
        .local_representation
        .as_ref()
        .and_then(|r| r.enumeration.as_deref());
    let ov = override_for(overrides, dim.concept_identity.as_deref(), enum_urn);
    component_tag(ov, dim.concept_identity.as_deref())
}

fn build_dimensions(
    snapshot: &SdmxJsonDataflow,
    overrides: &[ModelOverride],
) -> Vec<SelectableDimension> {
    let Some(parts) = components(snapshot) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for dim in &parts.dimension_list.dimensions {
        let Some(id) = dim.id.as_deref() else {
            continue;
        };
        if dim.dimension_type.as_deref() != Some("Dimension") {
            continue;
        }
        let Some(enum_urn) = dim
            .local_representation
            .as_ref()
            .and_then(|r| r.enumeration.as_deref())
        else {
            continue;
        };

        let codelist = snapshot.codelist_by_urn(enum_urn);
        let concept = dim
            .concept_identity
            .as_deref()
            .and_then(|urn| snapshot.concept_by_urn(urn));
        let ov = override_for(overrides, dim.concept_identity.as_deref(), Some(enum_urn));

        let name = ov
            .and_then(|o| o.name.clone())
            .or_else(|| concept.and_then(|c| c.name.clone()));
        let options = match ov.filter(|o| !o.options.is_empty()) {
            Some(o) => o.options.clone(),
            None => allowed_options(snapshot, id, codelist),
        };
        let selected_id = ov
            .and_then(|o| o.selected_id.clone())
            .filter(|selected| options.iter().any(|option| option.id == *selected))
            .or_else(|| {
                if ov.is_some_and(|o| o.allow_undefined) {
                    None
                } else {
                    options.first().map(|option| option.id.clone())
                }
            });

        out.push(SelectableDimension {
            id: id.to_string(),
            name,
            options,
            selected_id,
            disable: ov.is_some_and(|o| o.disable),
            position: dim.position,
        });
    }
    out
}

/// Allowed options: the union across all "Actual" content constraints'
/// cube regions of permitted codes; unconstrained means all codes
fn allowed_options(
    snapshot: &SdmxJsonDataflow,
    dimension_id: &str,
    codelist: Option<&SdmxCodelist>,
) -> Vec<DimensionOption> {
    let mut permitted: Option<BTreeSet<String>> = None;
    for constraint in snapshot.actual_constraints() {
        for region in &constraint.cube_regions {
            if region.is_included == Some(false) {
                continue;
            }
            for key_value in &region.key_values {
                if key_value.id.as_deref() == Some(dimension_id) {
                    permitted
                        .get_or_insert_with(BTreeSet::new)
                        .extend(key_value.values.iter().cloned());
                }
            }
        }
    }

    let Some(codelist) = codelist else {
        return permitted
            .map(|set| {
                set.into_iter()
                    .map(|id| DimensionOption::new(id, None))
                    .collect()
            })
            .unwrap_or_default();
    };
    codelist
        .codes
        .iter()
        .filter_map(|code| {
            let id = code.id.clone()?;
            match &permitted {
                Some(set) if !set.contains(&id) => None,
                _ => Some(DimensionOption::new(id, code.name.clone())),
            }
        })
        .collect()
}

/// Region type of a dimension, tried in order: explicit override,
/// delegation to another dimension's selected value, dimension id,
/// codelist name, codelist id, concept name, concept id
fn region_type_for(
    snapshot: &SdmxJsonDataflow,
    dim: &SdmxDimension,
    built: &[SelectableDimension],
    overrides: &[ModelOverride],
    matcher: &dyn RegionMatcher,
) -> Option<String> {
    let enum_urn = dim
        .local_representation
        .as_ref()
        .and_then(|r| r.enumeration.as_deref());
    let ov = override_for(overrides, dim.concept_identity.as_deref(), enum_urn);
    let codelist = enum_urn.and_then(|urn| snapshot.codelist_by_urn(urn));
    let concept = dim
        .concept_identity
        .as_deref()
        .and_then(|urn| snapshot.concept_by_urn(urn));

    let mut candidates: Vec<String> = Vec::new();
    if let Some(o) = ov {
        if let Some(region_type) = &o.region_type {
            candidates.push(region_type.clone());
        }
        if let Some(delegate) = &o.region_type_from_dimension_id {
            // Only a dimension tagged `region-type` may supply the
            // value by delegation.
            if dimension_tag(snapshot, overrides, delegate) == Some("region-type") {
                if let Some(selected) = built
                    .iter()
                    .find(|d| d.id == *delegate)
                    .and_then(|d| d.selected_id.clone())
                {
                    candidates.push(selected);
                }
            }
        }
    }
    if let Some(id) = &dim.id {
        candidates.push(id.clone());
    }
    if let Some(codelist) = codelist {
        candidates.extend(codelist.name.clone());
        candidates.extend(codelist.id.clone());
    }
    if let Some(concept) = concept {
        candidates.extend(concept.name.clone());
        candidates.extend(concept.id.clone());
    }

    let matched = candidates
        .iter()
        .find_map(|candidate| matcher.match_region_type(candidate))?;
    Some(ov.map_or(matched.clone(), |o| o.alias_region_type(&matched)))
}

fn build_columns(
    snapshot: &SdmxJsonDataflow,
    built: &[SelectableDimension],
    overrides: &[ModelOverride],
    matcher: &dyn RegionMatcher,
    unit_multiplier_column: Option<&str>,
) -> Vec<TableColumn> {
    let mut columns = Vec::new();
    let Some(parts) = components(snapshot) else {
        return columns;
    };

    let primary = parts
        .measure_list
        .as_ref()
        .and_then(|list| list.primary_measure.as_ref());
    let measure_id = primary
        .and_then(|m| m.id.as_deref())
        .unwrap_or("OBS_VALUE");
    let mut measure = TableColumn::new(measure_id, ColumnType::Scalar);
    measure.title = primary
        .and_then(|m| m.concept_identity.as_deref())
        .and_then(|urn| snapshot.concept_by_urn(urn))
        .and_then(|concept| concept.name.clone());
    if let Some(multiplier) = unit_multiplier_column {
        measure.transformation = Some(format!("x*(10**{multiplier})"));
    }
    columns.push(measure);

    for dim in &parts.dimension_list.dimensions {
        let Some(id) = dim.id.as_deref() else {
            continue;
        };
        let selectable = built.iter().find(|d| d.id == id);
        let region_type = if selectable.is_some_and(|d| d.disable) {
            None
        } else {
            region_type_for(snapshot, dim, built, overrides, matcher)
        };
        let mut column = TableColumn::new(
            id,
            if region_type.is_some() {
                ColumnType::Region
            } else {
                ColumnType::Hidden
            },
        );
        column.title = selectable.and_then(|d| d.name.clone());
        column.region_type = region_type;
        columns.push(column);
    }

    for time in &parts.dimension_list.time_dimensions {
        if let Some(id) = time.id.as_deref() {
            columns.push(TableColumn::new(id, ColumnType::Time));
        }
    }

    if let Some(attributes) = &parts.attribute_list {
        for attr in &attributes.attributes {
            if let Some(id) = attr.id.as_deref() {
                columns.push(TableColumn::new(id, ColumnType::Hidden));
            }
        }
    }
    columns
}

/// Legend title comes later from the unit string; here the style picks
/// the region column or, for purely temporal data, a time-series chart
fn build_style(columns: &[TableColumn]) -> TableStyle {
    let region_column = columns
        .iter()
        .find(|c| c.column_type == ColumnType::Region)
        .map(|c| c.name.clone());
    let time_columns: Vec<&TableColumn> = columns
        .iter()
        .filter(|c| c.column_type == ColumnType::Time)
        .collect();
    let measure = columns
        .iter()
        .find(|c| c.column_type == ColumnType::Scalar)
        .map_or("OBS_VALUE", |c| c.name.as_str());

    let mut style = TableStyle {
        region_column: region_column.clone(),
        time_column: time_columns.first().map(|c| c.name.clone()),
        ..TableStyle::default()
    };
    if time_columns.len() == 1 && region_column.is_none() {
        style.chart = Some(ChartStyle {
            x_axis_column: time_columns[0].name.clone(),
            y_axis_column: measure.to_string(),
        });
    }
    style
}

fn mustache(name: &str) -> String {
    ["{{", name, "}}"].concat()
}

fn build_template(
    sanitizer: &dyn HtmlSanitizer,
    snapshot: &SdmxJsonDataflow,
    dimensions: &[SelectableDimension],
    columns: &[TableColumn],
    style: &TableStyle,
) -> String {
    let mut rows = String::new();

    for column in columns.iter().filter(|c| c.column_type == ColumnType::Time) {
        let title = column.title.as_deref().unwrap_or(&column.name);
        rows.push_str(&format!(
            "<tr><td>{title}</td><td>{}</td></tr>",
            mustache(&column.name)
        ));
    }
    if let Some(region) = &style.region_column {
        rows.push_str(&format!(
            "<tr><td>Region</td><td>{}</td></tr>",
            mustache(region)
        ));
    }
    for dimension in dimensions.iter().filter(|d| !d.disable) {
        if let Some(label) = dimension.selected_label() {
            let title = dimension.name.as_deref().unwrap_or(&dimension.id);
            rows.push_str(&format!("<tr><td>{title}</td><td>{label}</td></tr>"));
        }
    }
    if let Some(measure) = columns.iter().find(|c| c.column_type == ColumnType::Scalar) {
        let title = measure
            .title
            .as_deref()
            .or(snapshot.dataflow.name.as_deref())
            .unwrap_or(&measure.name);
        rows.push_str(&format!(
            "<tr><td>{title}</td><td>{}</td></tr>",
            mustache(&measure.name)
        ));
    }

    let mut template = format!("<table>{rows}</table>");
    // The chart section only renders when the table has multiple
    // discrete times, which is only known after data loads.
    if columns.iter().any(|c| c.column_type == ColumnType::Time) {
        template.push_str("{{#terria.timeSeries.data}}<chart");
        template.push_str(" x-column=\"{{terria.timeSeries.xName}}\"");
        template.push_str(" y-column=\"{{terria.timeSeries.yName}}\"");
        template.push_str(">{{terria.timeSeries.data}}</chart>{{/terria.timeSeries.data}}");
    }
    sanitizer.sanitize(&template)
}
