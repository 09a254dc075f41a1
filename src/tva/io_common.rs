use std::path::Path;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Puts together the cells of a row that describe a ballot: either one
/// candidate per cell, or the complete ballot in a single cell.
pub fn assemble_ballot_text<'a, I>(cells: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    cells
        .into_iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<&str>>()
        .concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names() {
        assert_eq!(simplify_file_name("/tmp/data/ballots.csv"), "ballots");
        assert_eq!(simplify_file_name("ballots"), "ballots");
    }

    #[test]
    fn ballot_cells() {
        assert_eq!(assemble_ballot_text(["A", " B", "", "C "]), "ABC");
        assert_eq!(assemble_ballot_text(["CAB"]), "CAB");
        assert_eq!(assemble_ballot_text(Vec::<&str>::new()), "");
    }
}
