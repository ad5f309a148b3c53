/*!

This is the long-form manual for `vote_concentration` and `vgeo`.

## Data sources

Two kinds of tables are supported. They have the same shape but not the same meaning:
* `tse` the official results per municipality, as published by the Brazilian electoral court.
  The count is the number of nominal valid votes. Only the elected candidates take part in the
  concentration analysis.
* `twitter` the number of posts of each candidate mentioning a municipality. Every candidate
  with at least one mention takes part in the concentration analysis.

Every row must provide a location, a candidate, a party, an electoral unit and a count. The `tse`
rows also provide the result of the candidate (`Eleito` for the elected ones).

## Indices

For a candidate `c` in a location `l`, with `v(c, l)` its count:

- `share_of_location = 100 * v(c, l) / sum_c' v(c', l)`
- `share_of_candidate_total = v(c, l) / sum_l' v(c, l')`
- `dominance(c, l) = share_of_location * share_of_candidate_total / 100`, rounded to 6 decimals.

The dominance index of the candidate is the sum of `dominance(c, l)` over its locations, divided
by 100 and rounded to 6 decimals. It is computed over all the candidates, elected or not.

The concentration indices are computed over the filtered table (elected candidates only for
`tse`). For the locations `l` of the candidate:

- `contrib_candidate(l) = v(c, l) / sum_l' v(c, l')`
- `contrib_location(l) = total(l) / sum_l' total(l')`, where `total(l)` is the count of all the
  candidates of the filtered table in `l`
- `g_index = sum_l (contrib_candidate(l) - contrib_location(l))^2`
- `rae_index = sum_l contrib_candidate(l)^2`, never lower than `1e-9`
- `nem = 1 / rae_index`

A candidate present in a single location has a G-index of 0 and a NEM of 1. A candidate without
any count has a RAE index of `1e-9`.

## Voting types

The dominance index and `ln(nem)` are compared to their means, plus or minus `k` standard
deviations (sample standard deviation). The default `k` is `5e-7`.

| dominance | ln(nem) | voting type |
|---|---|---|
| high | high | Dispersa Dominante |
| high | low | Concentrada Dominante |
| low | high | Dispersa Compartilhada |
| low | low | Concentrada Compartilhada |

All the other candidates are `Unclassified`. With less than two candidates, the standard
deviation is not defined and no candidate is classified.

## Configuration

`vgeo` reads a configuration file in JSON. All the keys are optional except `sources`.

```json
{
  "outputSettings": {
    "outputDirectory": "output",
    "generateExcel": true,
    "excelGroupBy": "voting_type"
  },
  "sources": [
    {
      "dataSource": "tse",
      "provider": "csv",
      "filePath": "votacao_candidato_munzona_2022_SP.csv"
    },
    {
      "dataSource": "twitter",
      "provider": "csv"
    }
  ],
  "mentions": {
    "postsFilePath": "tweets.csv",
    "outputFilePath": "city_mentions_twitter_data.csv"
  },
  "rules": {
    "classifierMultiplier": 5e-7,
    "inconsistentCandidatePolicy": "firstSeen"
  }
}
```

Options of a source:
 - `provider`: `csv` (default) or `xlsx`.
 - `separator`: one character. Defaults to `;` for `tse` and `,` for `twitter`.
 - `encoding`: `latin-1` or `utf-8`. Defaults to `latin-1` for `tse` and `utf-8` for `twitter`.
 - `excelWorksheetName`: for `xlsx`, the name of the worksheet. Defaults to the first one.
 - `columns`: the names of the columns `location`, `candidate`, `party`, `electoralUnit`,
   `count` and `status`. The defaults are the names of the electoral court files:
   `nm_municipio`, `nm_urna_candidato`, `sg_partido`, `sg_ue`, `qt_votos_nom_validos`
   (`qt_city_mentions` for `twitter`) and `ds_sit_totalizacao`.
 - `electedLabel`: the status of the elected candidates. Defaults to `Eleito`.
 - `expectedOutput`: a reference classified table. The run of the source fails if the output
   differs.

The paths are relative to the directory of the configuration file.

Each source writes `voting_types.csv`, `voting_type_frequencies.csv` and `statistics.csv` in
`<outputDirectory>/<dataSource>`. With `generateExcel`, it also writes `voting_types.xlsx`.
`excelGroupBy` splits this workbook into one sheet per `voting_type`, `party` or
`electoral_unit`. If a file cannot be written, the other files of the source are removed.

When `mentions` is present, the posts are read after the `tse` source and the mentions of its
municipalities are counted and written to `outputFilePath`, in the output directory, before the
`twitter` source is read. A `twitter` source without `filePath` reads this file.

 */
