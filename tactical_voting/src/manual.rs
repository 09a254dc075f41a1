/*!

This is the long-form manual for `tactical_voting` and `tva`.

## Voting schemes

Every agent submits a complete ranking of the candidates (a ballot). The
candidates are single letters, and a ballot is written from the most
preferred candidate to the least preferred one: `ACB`.

The following scoring rules are supported, for `m` candidates:
* `borda` the candidate at position `i` (starting at 0) gets `m - 1 - i` points
* `plurality` one point for the first choice
* `antiPlurality` one point for every choice except the last one
* `votingForTwo` one point for each of the first two choices

The candidate with the most points wins. Ties are broken in favour of the
candidate that comes first in alphabetical order.

## Happiness

Two measures, both between 0 and 100:
* `H_p` (my preference): how high the winner sits in the ballot of the agent.
  100 if the winner is the first choice of the agent, 0 if it is the last one.
* `H_si` (social index): how high the first choice of the agent sits in the
  ranking of the election.

The happiness of an agent is always measured with its sincere ballot, even
when it votes tactically.

## Analyses

For every agent, `tva` searches the ballots that increase one of the
happiness measures of this agent, assuming that all the other agents keep
their sincere ballot. The number of options reported per measure is capped
(`optionLimit`, 20 by default). Agents that are already happy (above 99 for
both measures) are not analysed in the report.

With the advanced analysis:
* counter voting: for each other agent that deviates with its best option,
  the options that remain for the agent
* concurrent voting: the outcome when all the agents deviate at the same time,
  each one with its best option that makes the first candidate of its
  tactical ballot win.

## Input formats

### Random ballots

Ballots can be generated from a seed. The same seed always produces the same
ballots. Agents are called `Agent1`, `Agent2`, ...

```text
tva --candidates ABCD --voters 10 --seed 3 --scheme plurality
```

With `--trials N`, the risk statistics are averaged over the seeds
`seed`, `seed + 1`, ... `seed + N - 1`.

### csv

Simple CSV reader. Each row is the ballot of one agent. Each column (in order)
is considered to be a choice, or a single column contains the complete ballot.

```text
id,choice 1,choice 2,choice 3
alice,A,B,C
bob,B,A,C
carol,CAB
```

The `id` column is optional: by default the agents are named after the file
and the line number. Headers in the first row are optional.

## Configuration

The program accepts a configuration file in JSON:

```text
{
  "outputSettings": {
    "contestName": "Example",
    "outputDirectory": "output"
  },
  "candidates": "ABC",
  "rules": {
    "votingScheme": "borda",
    "optionLimit": 20,
    "advancedAnalysis": true
  },
  "ballotSources": [
    {
      "provider": "csv",
      "filePath": "ballots.csv",
      "firstVoteColumnIndex": 2,
      "firstVoteRowIndex": 2,
      "idColumnIndex": 1
    }
  ]
}
```

The column and row indexes start at 1. Columns can also be written as
letters (`"B"`). The file paths are relative to the configuration file.

Instead of `ballotSources`, `randomBallots` generates the ballots:

```text
  "randomBallots": { "voters": 10, "seed": 3 }
```

The command line options `--candidates`, `--scheme`, `--input`, `--voters`,
`--seed`, `--option-limit` and `--basic` override the configuration file.
Without a configuration file, `--candidates` is mandatory.

## Output

The summary is written in JSON, to the file given with `--out`, to
`outputDirectory/<contestName>_summary.json` if specified in the configuration,
or to the standard output otherwise. With `--reference`, the summary is
compared with a stored summary and the differences are printed.

The `stats` section holds the overall happiness, the risk (percentage of the
agents with at least one option) and the average increase of happiness of
the best options. The advanced analysis adds the overall happiness after
concurrent voting (`concurrentHappiness`, `concurrentChange`) and after
counter voting (`counterHappiness`, `counterChange`): each agent answers the
best option of every other agent with its own best option, or keeps its
sincere ballot when it has none.

 */
