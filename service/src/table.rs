//! Tabular column and style synthesis types
//!
//! Strata that translate dimensional metadata into generic tabular
//! traits produce these shapes; they are stored on models as
//! object-list trait values and consumed by the table rendering layer.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Classification of a synthesized table column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnType {
    /// Plain numeric/scalar values
    Scalar,
    /// Values are region codes driving spatial styling
    Region,
    /// Not shown to the user
    Hidden,
    /// Time values
    Time,
}

/// One synthesized table column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableColumn {
    /// Column name, matching the source dimension or attribute id
    pub name: String,

    /// Human-readable title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Column classification
    #[serde(rename = "type")]
    pub column_type: ColumnType,

    /// Region type driving spatial styling, for region columns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_type: Option<String>,

    /// Value transformation expression, e.g. `x*(10**UNIT_MULT)`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transformation: Option<String>,
}

impl TableColumn {
    /// Create a column of the given type
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            title: None,
            column_type,
            region_type: None,
            transformation: None,
        }
    }

    /// Attach a title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Serialize for storage as an object-list trait item
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }
}

/// Time-series chart configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartStyle {
    /// Column plotted on the x axis
    pub x_axis_column: String,

    /// Column plotted on the y axis
    pub y_axis_column: String,
}

/// Default style attached by a dimensional stratum
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableStyle {
    /// Legend title, usually the composed unit string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_title: Option<String>,

    /// Region column driving spatial styling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_column: Option<String>,

    /// Time column, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_column: Option<String>,

    /// Time-series chart, when the data is temporal and non-spatial
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartStyle>,
}

impl TableStyle {
    /// Serialize for storage as an object trait value
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_column_serialization() {
        let column = TableColumn::new("REGION", ColumnType::Region);
        let mut column = column.with_title("Region");
        column.region_type = Some("SA4".to_string());
        assert_eq!(
            column.to_json(),
            json!({
                "name": "REGION",
                "title": "Region",
                "type": "region",
                "regionType": "SA4"
            })
        );
    }

    #[test]
    fn test_style_serialization() {
        let style = TableStyle {
            legend_title: Some("AUD (Quarterly)".to_string()),
            chart: Some(ChartStyle {
                x_axis_column: "TIME_PERIOD".to_string(),
                y_axis_column: "OBS_VALUE".to_string(),
            }),
            ..TableStyle::default()
        };
        assert_eq!(
            style.to_json(),
            json!({
                "legendTitle": "AUD (Quarterly)",
                "chart": { "xAxisColumn": "TIME_PERIOD", "yAxisColumn": "OBS_VALUE" }
            })
        );
    }
}
