/*!

This is the long-form manual for `competency_scoring` and `compscore`.

## Input formats

The following formats are supported:
* `csv` Comma Separated Values with one header row
* `xlsx` Excel workbooks (the first worksheet, or the one given with `--excel-worksheet-name`)

In both cases the first row holds the questions and every following row is
one response. Empty cells, `NA`, `N/A` and `NaN` are treated as missing.
Duplicate headers are renamed `header.1`, `header.2` and so on.

## Header conventions

The columns of a competency are found from the text of the headers.

### `bracket`

* overall ranking: `Design and Analysis - Overall Ranking`
* sub-competency: any header that contains the competency name and a
  bracketed item, e.g. `Design and Analysis [Design Concept]`
* relevance: any header that starts with `Relevance` and contains the
  competency name, e.g. `Relevance - Design and Analysis [Design Concept]`

### `curated`

* overall ranking: as above
* sub-competency: `Sub-competencies Assessment [...]` headers that mention the
  competency name or one of its topic phrases
* relevance: `Relevance Codes [...]` headers that mention the competency name
  or one of its topic phrases

Topic phrases are matched without regard to case. The default phrases can be
replaced in the configuration file.

The label shown on the charts is the bracketed item when there is one, and the
competency name for the overall rankings.

## Coercion

Text answers such as `Rank 2` are reduced to their first number. Label
mappings can be configured instead (for instance `C (Core Activity)` → 1 and
`D (Differentiator)` → 0); with a mapping, every answer that is not listed is
treated as missing.

## Scores

### Rank reversal

A rank of 1 is the best. Ranks are reversed so that higher scores are better:
1 weighs 3, 2 weighs 2 and 3 weighs 1.

* `by-count` (default for the overall rankings): only the answers 1, 2 and 3
  are counted. For the answers `1, 1, 2, 3, 3, 3` the score is
  `(3×2 + 2×1 + 1×3) / 6 ≈ 1.833`.
* `by-row` (default for the sub-competencies): every numeric answer counts,
  and answers other than 1, 2 or 3 weigh 0. For `3, (blank), 5` the score is
  `(1 + 0) / 2 = 0.5`.

A column without any usable answer scores 0.

### Relevance

The percentage of numeric answers equal to 1 (core activity) and equal to 0
(differentiator). The two percentages do not add up to 100 when other values
are present.

## Configuration file

```json
{
  "input": { "filePath": "survey.csv", "provider": "csv" },
  "convention": "bracket",
  "counting": "byRow",
  "relevanceLabels": { "C (Core Activity)": 1, "D (Differentiator)": 0 },
  "competencies": [
    { "name": "Teamwork", "fragments": ["team", "cooperat"] }
  ]
}
```

The file path is relative to the configuration file. Command line options take
precedence over the configuration.
*/
