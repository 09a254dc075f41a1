use crate::tva::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: String,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub contest: String,
    pub scheme: String,
    pub candidates: String,
    #[serde(rename = "optionLimit")]
    pub option_limit: usize,
    #[serde(rename = "advancedAnalysis")]
    pub advanced_analysis: bool,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "firstVoteColumnIndex")]
    pub _first_vote_column_index: Option<JSValue>,
    #[serde(rename = "firstVoteRowIndex")]
    pub _first_vote_row_index: Option<JSValue>,
    #[serde(rename = "idColumnIndex")]
    pub id_column_index: Option<JSValue>,
}

impl FileSource {
    /// A file source for a CSV file with the ballots starting in the first column.
    pub fn csv(file_path: &str) -> FileSource {
        FileSource {
            provider: "csv".to_string(),
            file_path: file_path.to_string(),
            _first_vote_column_index: None,
            _first_vote_row_index: None,
            id_column_index: None,
        }
    }

    /// The column of the first choice, starting at 0.
    pub fn first_vote_column_index(&self) -> TvaResult<usize> {
        match self._first_vote_column_index {
            None => Ok(0),
            Some(_) => Ok(read_js_int(&self._first_vote_column_index)? - 1),
        }
    }

    /// The row of the first ballot, starting at 1.
    pub fn first_vote_row_index(&self) -> TvaResult<usize> {
        match self._first_vote_row_index {
            None => Ok(1),
            Some(_) => read_js_int(&self._first_vote_row_index),
        }
    }

    /// The column of the identifier of the agents, starting at 0.
    pub fn id_column_index_int(&self) -> TvaResult<Option<usize>> {
        if self.id_column_index.is_some() {
            read_js_int(&self.id_column_index).map(|x| Some(x - 1))
        } else {
            Ok(None)
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RandomBallots {
    pub voters: usize,
    pub seed: Option<u32>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct TvaRules {
    #[serde(rename = "votingScheme")]
    pub voting_scheme: Option<String>,
    #[serde(rename = "optionLimit")]
    pub option_limit: Option<usize>,
    #[serde(rename = "advancedAnalysis")]
    pub advanced_analysis: Option<bool>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct TvaConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(default)]
    pub candidates: String,
    #[serde(default)]
    pub rules: TvaRules,
    #[serde(rename = "ballotSources", default)]
    pub ballot_sources: Vec<FileSource>,
    #[serde(rename = "randomBallots")]
    pub random_ballots: Option<RandomBallots>,
}

pub fn read_config(path: &str) -> TvaResult<TvaConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: TvaConfig = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> TvaResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

// Column and row numbers start at 1. Columns may also be written as letters.
fn read_js_int(x: &Option<JSValue>) -> TvaResult<usize> {
    let res = match x {
        Some(JSValue::Number(n)) => n.as_u64().map(|x| x as usize),
        // Parsing the Excel-style columns
        Some(JSValue::String(s)) if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()) => {
            Some(s.to_ascii_lowercase().chars().fold(0, |acc, c| {
                acc * 26 + (c as usize) - ('a' as usize) + 1
            }))
        }
        Some(JSValue::String(s)) => s.parse::<usize>().ok(),
        _ => None,
    };
    match res {
        Some(x) if x >= 1 => Ok(x),
        _ => ParsingJsonNumberSnafu {}.fail(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn column_indexes() {
        assert_eq!(read_js_int(&Some(json!(2))).unwrap(), 2);
        assert_eq!(read_js_int(&Some(json!("3"))).unwrap(), 3);
        assert_eq!(read_js_int(&Some(json!("A"))).unwrap(), 1);
        assert_eq!(read_js_int(&Some(json!("c"))).unwrap(), 3);
        assert_eq!(read_js_int(&Some(json!("AA"))).unwrap(), 27);
        assert!(read_js_int(&Some(json!(0))).is_err());
        assert!(read_js_int(&Some(json!(true))).is_err());
        assert!(read_js_int(&None).is_err());
    }

    #[test]
    fn parse_config() {
        let js = r#"
        {
            "outputSettings": { "contestName": "test" },
            "candidates": "ABC",
            "rules": { "votingScheme": "plurality", "optionLimit": 5 },
            "ballotSources": [
                { "provider": "csv", "filePath": "ballots.csv",
                  "firstVoteColumnIndex": "B", "idColumnIndex": 1 }
            ]
        }"#;
        let config: TvaConfig = serde_json::from_str(js).unwrap();
        assert_eq!(config.output_settings.contest_name, "test");
        assert_eq!(config.rules.voting_scheme, Some("plurality".to_string()));
        assert_eq!(config.rules.advanced_analysis, None);
        assert_eq!(config.random_ballots, None);
        let source = &config.ballot_sources[0];
        assert_eq!(source.first_vote_column_index().unwrap(), 1);
        assert_eq!(source.first_vote_row_index().unwrap(), 1);
        assert_eq!(source.id_column_index_int().unwrap(), Some(0));
    }

    #[test]
    fn parse_random_config() {
        let js = r#"{ "candidates": "ABCD", "randomBallots": { "voters": 10, "seed": 3 } }"#;
        let config: TvaConfig = serde_json::from_str(js).unwrap();
        assert!(config.ballot_sources.is_empty());
        assert_eq!(
            config.random_ballots,
            Some(RandomBallots {
                voters: 10,
                seed: Some(3)
            })
        );
        assert_eq!(config.output_settings, OutputSettings::default());
    }
}
