use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use tactical_voting::builder::Builder;
use tactical_voting::stats::{average_stats, election_stats, ElectionStats};
use tactical_voting::*;

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::tva::config_reader::*;

pub mod config_reader;
mod io_common;
mod io_csv;

#[derive(Debug, Snafu)]
pub enum TvaError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a column or row number starting at 1"))]
    ParsingJsonNumber {},
    #[snafu(display("Error writing file {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Missing parent directory"))]
    MissingParentDir {},
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading a line of a CSV file"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("Line {lineno} is too short"))]
    CsvLineTooShort { lineno: usize },
    #[snafu(display("Line {lineno}: invalid ballot"))]
    InvalidBallot {
        source: TacticalErrors,
        lineno: usize,
    },
    #[snafu(display("Analysis error: {source}"))]
    Analysis { source: TacticalErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type TvaResult<T> = Result<T, TvaError>;

fn candidates_to_string(candidates: &[Candidate]) -> String {
    candidates.iter().map(|c| c.to_string()).collect()
}

fn tally_to_json(tally: &Tally) -> JSValue {
    let mut res: JSMap<String, JSValue> = JSMap::new();
    for (c, count) in tally.iter() {
        res.insert(c.to_string(), json!(count.to_string()));
    }
    JSValue::Object(res)
}

fn percent(x: f64) -> JSValue {
    json!(format!("{:.2}", x))
}

fn happiness_to_json(h: &Happiness) -> JSValue {
    let mut res: JSMap<String, JSValue> = JSMap::new();
    for kind in HappinessKind::ALL {
        res.insert(kind.label().to_string(), percent(*h.get(kind)));
    }
    JSValue::Object(res)
}

// Missing values are written as null.
fn partial_happiness_to_json(h: &PerHappiness<Option<f64>>) -> JSValue {
    let mut res: JSMap<String, JSValue> = JSMap::new();
    for kind in HappinessKind::ALL {
        let value = match *h.get(kind) {
            Some(x) => percent(x),
            None => JSValue::Null,
        };
        res.insert(kind.label().to_string(), value);
    }
    JSValue::Object(res)
}

fn option_set_to_json(options: &OptionSet) -> Vec<JSValue> {
    options
        .iter()
        .map(|(idx, opt)| {
            json!({
                "index": idx,
                "ballot": opt.ballot.to_string(),
                "winner": opt.winner.to_string(),
                "tally": tally_to_json(&opt.tally),
                "happiness": happiness_to_json(&opt.happiness),
                "overallHappiness": happiness_to_json(&opt.overall_happiness),
            })
        })
        .collect()
}

fn per_kind_to_json<T, F: Fn(&T) -> JSValue>(values: &PerHappiness<T>, f: F) -> JSValue {
    let mut res: JSMap<String, JSValue> = JSMap::new();
    for kind in HappinessKind::ALL {
        res.insert(kind.label().to_string(), f(values.get(kind)));
    }
    JSValue::Object(res)
}

fn counter_votes_to_json(votes: &[CounterVote]) -> JSValue {
    let l: Vec<JSValue> = votes
        .iter()
        .map(|cv| match &cv.deviation {
            None => json!({ "otherAgent": cv.other_agent, "affected": false }),
            Some(dev) => json!({
                "otherAgent": cv.other_agent,
                "affected": true,
                "ballot": dev.ballot.to_string(),
                "tally": tally_to_json(&dev.tally),
                "ranking": candidates_to_string(&dev.ranking),
                "counterOptions": option_set_to_json(&dev.counter_options),
            }),
        })
        .collect();
    JSValue::Array(l)
}

fn concurrent_to_json(outcome: &ConcurrentOutcome) -> JSValue {
    let choices: Vec<JSValue> = outcome
        .choices
        .iter()
        .map(|c| json!({"agent": c.agent, "ballot": c.ballot.to_string(), "sincere": c.sincere}))
        .collect();
    json!({
        "winner": outcome.winner.to_string(),
        "tally": tally_to_json(&outcome.tally),
        "choices": choices,
    })
}

fn stats_to_json(stats: &ElectionStats) -> JSValue {
    let mut js = json!({
        "overallHappiness": happiness_to_json(&stats.overall_happiness),
        "risk": happiness_to_json(&PerHappiness::from_fn(|k| 100.0 * stats.risk.get(k))),
        "averageIncrease": happiness_to_json(&stats.average_increase),
    });
    if let Some(h) = &stats.concurrent_happiness {
        js["concurrentHappiness"] = happiness_to_json(h);
    }
    if let Some(h) = &stats.concurrent_change {
        js["concurrentChange"] = happiness_to_json(h);
    }
    if stats.counter_happiness != PerHappiness::default() {
        js["counterHappiness"] = partial_happiness_to_json(&stats.counter_happiness);
        js["counterChange"] = partial_happiness_to_json(&stats.counter_change);
    }
    js
}

fn validate_rules(config: &TvaConfig, args: &Args) -> TvaResult<AnalysisRules> {
    let defaults = AnalysisRules::DEFAULT_RULES;
    let scheme = match args.scheme.clone().or_else(|| config.rules.voting_scheme.clone()) {
        None => defaults.scheme,
        Some(name) => match name.parse::<VotingScheme>() {
            Result::Ok(x) => x,
            Result::Err(e) => {
                whatever!("Cannot use voting scheme {:?}: {}", name, e)
            }
        },
    };
    let option_limit = args
        .option_limit
        .or(config.rules.option_limit)
        .unwrap_or(defaults.option_limit);
    let advanced = !args.basic && config.rules.advanced_analysis.unwrap_or(defaults.advanced);
    Ok(AnalysisRules {
        scheme,
        option_limit,
        advanced,
    })
}

// The command line options take precedence over the configuration file.
fn merge_config(config: Option<TvaConfig>, args: &Args) -> TvaResult<TvaConfig> {
    let mut res = config.unwrap_or_default();
    if let Some(cands) = &args.candidates {
        res.candidates = cands.clone();
    }
    if args.input.is_some() && (args.voters.is_some() || args.seed.is_some()) {
        whatever!("--input cannot be used with --voters or --seed")
    }
    if let Some(input) = &args.input {
        res.ballot_sources = vec![FileSource::csv(input)];
        res.random_ballots = None;
    }
    if args.voters.is_some() || args.seed.is_some() {
        let current = res.random_ballots.clone();
        let voters = match args.voters.or_else(|| current.as_ref().map(|r| r.voters)) {
            Some(x) => x,
            None => whatever!("--seed requires a number of voters"),
        };
        res.random_ballots = Some(RandomBallots {
            voters,
            seed: args.seed.or_else(|| current.and_then(|r| r.seed)),
        });
        res.ballot_sources = vec![];
    }
    if res.output_settings.contest_name.is_empty() {
        res.output_settings.contest_name = "tva".to_string();
    }
    Ok(res)
}

fn read_ballots(root_path: &Path, cfs: &FileSource) -> TvaResult<Vec<(String, Ballot)>> {
    let p: PathBuf = root_path.join(&cfs.file_path);
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read ballot file {:?}", p2);
    match cfs.provider.as_str() {
        "csv" => io_csv::read_csv_ballots(&p2, cfs),
        x => whatever!("Provider not implemented {:?}", x),
    }
}

fn build_election(
    config: &TvaConfig,
    root_path: &Path,
    rules: &AnalysisRules,
    trial: u32,
) -> TvaResult<Election> {
    let mut builder = Builder::new(rules).context(AnalysisSnafu {})?;
    if !config.candidates.is_empty() {
        builder = builder
            .candidates(&config.candidates)
            .context(AnalysisSnafu {})?;
    }
    if let Some(rb) = &config.random_ballots {
        if config.candidates.is_empty() {
            whatever!("Random ballots require the list of candidates")
        }
        let seed = rb.seed.unwrap_or(0).wrapping_add(trial);
        builder
            .add_random_ballots(rb.voters, seed)
            .context(AnalysisSnafu {})?;
    } else {
        if config.ballot_sources.is_empty() {
            whatever!("No ballot sources detected")
        }
        for cfs in config.ballot_sources.iter() {
            for (name, ballot) in read_ballots(root_path, cfs)? {
                builder
                    .add_ballot_2(&name, ballot)
                    .context(AnalysisSnafu {})?;
            }
        }
    }
    builder.build().context(AnalysisSnafu {})
}

fn build_summary_js(
    config: &TvaConfig,
    rules: &AnalysisRules,
    election: &Election,
) -> TvaResult<JSValue> {
    let c = OutputConfig {
        contest: config.output_settings.contest_name.clone(),
        scheme: election.scheme().to_string(),
        candidates: candidates_to_string(election.candidates()),
        option_limit: rules.option_limit,
        advanced_analysis: rules.advanced,
    };

    let mut agents: Vec<JSValue> = Vec::new();
    for (idx, agent) in election.agents().iter().enumerate() {
        let h = election.happiness(idx).context(AnalysisSnafu {})?;
        let mut js = json!({
            "agent": agent.name(),
            "ballot": agent.ballot().to_string(),
            "happiness": happiness_to_json(&h),
        });
        if h.my_preference > 99.0 && h.social_index > 99.0 {
            debug!("build_summary_js: {} is already happy", agent.name());
        } else {
            let options = tactical_options(election, idx, rules).context(AnalysisSnafu {})?;
            js["tacticalOptions"] =
                per_kind_to_json(&options, |o| JSValue::Array(option_set_to_json(o)));
            if rules.advanced {
                let votes = counter_vote(election, idx, rules).context(AnalysisSnafu {})?;
                js["counterVotes"] = per_kind_to_json(&votes, |v| counter_votes_to_json(v));
            }
        }
        agents.push(js);
    }

    let stats = election_stats(election, rules).context(AnalysisSnafu {})?;

    let mut js = json!({
        "config": c,
        "results": {
            "tally": tally_to_json(election.tally()),
            "winner": election.winner().to_string(),
            "ranking": candidates_to_string(&election.ranking()),
            "overallHappiness": happiness_to_json(&election.overall_happiness()),
        },
        "agents": agents,
        "stats": stats_to_json(&stats),
    });
    if rules.advanced {
        let concurrent = concurrent_vote(election, rules).context(AnalysisSnafu {})?;
        js["concurrent"] = per_kind_to_json(&concurrent, concurrent_to_json);
    }
    Ok(js)
}

fn trials_to_json(
    config: &TvaConfig,
    root_path: &Path,
    rules: &AnalysisRules,
    trials: u32,
) -> TvaResult<JSValue> {
    let mut all_stats: Vec<ElectionStats> = Vec::new();
    for trial in 0..trials {
        let election = build_election(config, root_path, rules, trial)?;
        all_stats.push(election_stats(&election, rules).context(AnalysisSnafu {})?);
    }
    let average = match average_stats(&all_stats) {
        Some(x) => x,
        None => whatever!("No trials to average"),
    };
    Ok(json!({"count": trials, "average": stats_to_json(&average)}))
}

/// Computes the summary of the analysis, and where it should be written (None for the standard output).
fn compute_summary(args: &Args) -> TvaResult<(JSValue, Option<String>)> {
    let (file_config, root_path) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root_p = Path::new(config_path.as_str())
                .parent()
                .context(MissingParentDirSnafu {})?;
            (Some(config), root_p.to_path_buf())
        }
        None => (None, PathBuf::new()),
    };
    let config = merge_config(file_config, args)?;
    info!("config: {:?}", config);

    let rules = validate_rules(&config, args)?;
    info!("rules: {:?}", rules);

    let election = build_election(&config, &root_path, &rules, 0)?;
    info!(
        "Election with {} agents, tally: {:?}",
        election.agents().len(),
        election.tally()
    );

    let mut result_js = build_summary_js(&config, &rules, &election)?;

    match args.trials {
        Some(n) if n > 1 => {
            if config.random_ballots.is_none() {
                whatever!("--trials requires random ballots")
            }
            result_js["trials"] = trials_to_json(&config, &root_path, &rules, n)?;
        }
        _ => {}
    }

    let out = match &args.out {
        Some(x) if x == "stdout" => None,
        Some(x) => Some(x.clone()),
        None => config.output_settings.output_directory.as_ref().map(|dir| {
            root_path
                .join(dir)
                .join(format!("{}_summary.json", config.output_settings.contest_name))
                .display()
                .to_string()
        }),
    };
    Ok((result_js, out))
}

fn check_reference(reference_path: &str, pretty_js_stats: &str) -> TvaResult<()> {
    let summary_ref = read_summary(reference_path)?;
    debug!("summary: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    Ok(())
}

pub fn run_analysis(args: &Args) -> TvaResult<()> {
    let (result_js, out) = compute_summary(args)?;

    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    match out {
        Some(path) => {
            if let Some(parent) = Path::new(&path).parent() {
                fs::create_dir_all(parent).context(WritingOutputSnafu { path: path.clone() })?;
            }
            fs::write(&path, &pretty_js_stats).context(WritingOutputSnafu { path: path.clone() })?;
            info!("Summary written to {}", path);
        }
        None => {
            println!("{}", pretty_js_stats);
        }
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = &args.reference {
        check_reference(summary_p, &pretty_js_stats)?;
    }

    Ok(())
}
