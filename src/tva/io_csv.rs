// Primitives for reading CSV files.

use std::fs::File;

use crate::tva::{
    io_common::{assemble_ballot_text, simplify_file_name},
    *,
};

/// Reads the ballots of a CSV file: one agent per row.
pub fn read_csv_ballots(path: &str, cfs: &FileSource) -> TvaResult<Vec<(String, Ballot)>> {
    let default_id = make_default_id(path);

    let id_idx_o = cfs.id_column_index_int()?;
    let choices_start_col = cfs.first_vote_column_index()?;

    let mut res: Vec<(String, Ballot)> = Vec::new();
    let (records, row_offset) = get_records(path, cfs)?;

    for (idx, line_r) in records.enumerate() {
        let lineno = idx + row_offset;
        let line = line_r.context(CsvLineParseSnafu {})?;
        let id = if let Some(id_idx) = id_idx_o {
            line.get(id_idx)
                .context(CsvLineTooShortSnafu { lineno })?
                .trim()
                .to_string()
        } else {
            default_id(lineno)
        };

        let text = assemble_ballot_text(line.iter().skip(choices_start_col));
        debug!(
            "read_csv_ballots: lineno: {:?} id: {:?} ballot: {:?}",
            lineno, id, text
        );
        if text.is_empty() {
            warn!("read_csv_ballots: line {}: skipping empty ballot", lineno);
            continue;
        }
        let ballot = Ballot::parse(&text).context(InvalidBallotSnafu { lineno })?;
        res.push((id, ballot));
    }
    Ok(res)
}

fn get_records(
    path: &str,
    cfs: &FileSource,
) -> TvaResult<(csv::StringRecordsIntoIter<File>, usize)> {
    let first_row = cfs.first_vote_row_index()?;
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut records = rdr.into_records();
    // The index starts at 1 to respect most conventions in the excel world
    for _ in 1..first_row {
        _ = records.next();
    }
    Ok((records, first_row))
}

fn make_default_id(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_path(name: &str) -> String {
        format!("{}/tests/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    #[test]
    fn read_with_ids() {
        let cfs = FileSource {
            _first_vote_column_index: Some(serde_json::json!(2)),
            _first_vote_row_index: Some(serde_json::json!(2)),
            id_column_index: Some(serde_json::json!(1)),
            ..FileSource::csv("")
        };
        let res = read_csv_ballots(&data_path("csv_ids/ballots.csv"), &cfs).unwrap();
        let names: Vec<&str> = res.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
        let ballots: Vec<String> = res.iter().map(|(_, b)| b.to_string()).collect();
        assert_eq!(ballots, vec!["ABC", "BAC", "CAB"]);
    }

    #[test]
    fn read_without_ids() {
        let path = data_path("csv_simple/ballots.csv");
        let res = read_csv_ballots(&path, &FileSource::csv(&path)).unwrap();
        assert_eq!(res.len(), 3);
        assert_eq!(res[0].0, "ballots-00000001");
        assert_eq!(res[2].0, "ballots-00000003");
        assert_eq!(res[1].1.to_string(), "BAC");
    }

    #[test]
    fn invalid_ballot() {
        let path = data_path("csv_invalid/ballots.csv");
        let res = read_csv_ballots(&path, &FileSource::csv(&path));
        assert!(matches!(res, Err(TvaError::InvalidBallot { lineno: 2, .. })));
    }
}
