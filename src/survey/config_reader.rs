use crate::survey::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use std::collections::BTreeMap;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct InputSource {
    #[serde(rename = "filePath")]
    pub file_path: String,
    /// `csv` or `xlsx`
    pub provider: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CompetencyEntry {
    pub name: String,
    #[serde(rename = "overallColumn")]
    pub overall_column: Option<String>,
    pub fragments: Option<Vec<String>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct SurveyConfig {
    pub input: Option<InputSource>,
    pub convention: Option<String>,
    pub counting: Option<String>,
    #[serde(rename = "rankLabels")]
    pub rank_labels: Option<BTreeMap<String, i64>>,
    #[serde(rename = "relevanceLabels")]
    pub relevance_labels: Option<BTreeMap<String, i64>>,
    pub competencies: Option<Vec<CompetencyEntry>>,
}

impl SurveyConfig {
    /// The competencies declared in the file, or the default catalog.
    ///
    /// An entry without fragments takes the fragments of the default entry
    /// with the same name, if any.
    pub fn catalog(&self) -> Catalog {
        let default_catalog = Catalog::facade_engineering();
        match &self.competencies {
            None => default_catalog,
            Some(entries) => {
                let competencies = entries
                    .iter()
                    .map(|e| {
                        let mut c = Competency::new(&e.name, &[]);
                        if let Some(col) = &e.overall_column {
                            c.overall_column = col.clone();
                        }
                        c.fragments = match (&e.fragments, default_catalog.find(&e.name)) {
                            (Some(f), _) => f.clone(),
                            (None, Some(d)) => d.fragments.clone(),
                            (None, None) => vec![],
                        };
                        c
                    })
                    .collect();
                Catalog { competencies }
            }
        }
    }

    pub fn coercion_plan(&self) -> CoercionPlan {
        CoercionPlan::with_labels(
            self.rank_labels.as_ref().map(to_mapping),
            self.relevance_labels.as_ref().map(to_mapping),
        )
    }
}

fn to_mapping(m: &BTreeMap<String, i64>) -> LabelMapping {
    LabelMapping::from_pairs(m.iter().map(|(k, v)| (k.clone(), *v)).collect())
}

pub fn read_config(path: &str) -> SurveyResult<SurveyConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: SurveyConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> SurveyResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_config() {
        let js = r#"{
            "input": {"filePath": "survey.xlsx", "provider": "xlsx", "excelWorksheetName": "Form1"},
            "convention": "curated",
            "relevanceLabels": {"C (Core Activity)": 1, "D (Differentiator)": 0},
            "competencies": [
                {"name": "Teamwork"},
                {"name": "Glass Art", "overallColumn": "Glass - Rank", "fragments": ["glass"]}
            ]
        }"#;
        let config: SurveyConfig = serde_json::from_str(js).unwrap();
        assert_eq!(config.input.as_ref().unwrap().file_path, "survey.xlsx");
        assert_eq!(config.counting, None);

        let catalog = config.catalog();
        assert_eq!(catalog.names(), vec!["Teamwork", "Glass Art"]);
        assert_eq!(
            catalog.find("Teamwork").unwrap().fragments,
            Catalog::facade_engineering()
                .find("Teamwork")
                .unwrap()
                .fragments
        );
        assert_eq!(catalog.find("Glass Art").unwrap().overall_column, "Glass - Rank");

        let plan = config.coercion_plan();
        assert_eq!(plan.rank, Coercion::ExtractDigits);
        assert_eq!(
            plan.relevance.apply(&CellValue::Text("C (Core Activity)".to_string())),
            CellValue::Int(1)
        );
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: SurveyConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.catalog(), Catalog::facade_engineering());
        assert_eq!(config.coercion_plan(), CoercionPlan::default());
    }
}
