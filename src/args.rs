use clap::Parser;

/// This is a tactical voting analysis program for positional voting schemes.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file containing the election description in JSON format.
    /// For more information about the file format, read the documentation of the manual module.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing the summary of an analysis in JSON format. If provided, tva will
    /// check that the produced summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path or 'stdout') If specified, the summary of the analysis will be written in JSON format to the given
    /// location. Setting this option overrides the output directory that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A CSV file with one ballot per row. Setting this option overrides the ballot sources
    /// of the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (letters, for example ABCD) The candidates of the election.
    #[clap(long, value_parser)]
    pub candidates: Option<String>,

    /// (default borda) The voting scheme: borda, plurality, antiPlurality or votingForTwo.
    #[clap(short, long, value_parser)]
    pub scheme: Option<String>,

    /// (number) Generates this number of random ballots instead of reading them.
    #[clap(long, value_parser)]
    pub voters: Option<usize>,

    /// (default 0) The seed of the random ballots.
    #[clap(long, value_parser)]
    pub seed: Option<u32>,

    /// (default 1) With random ballots, averages the risk statistics over this number of seeds.
    #[clap(long, value_parser)]
    pub trials: Option<u32>,

    /// (default 20) The maximum number of tactical options reported per agent and happiness measure.
    #[clap(long, value_parser)]
    pub option_limit: Option<usize>,

    /// If passed as an argument, skips the counter voting and concurrent voting analyses.
    #[clap(long, takes_value = false)]
    pub basic: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
