use deunicode::deunicode;
use log::{debug, info, warn};

use std::collections::HashMap;

use crate::config::*;

/// A social media post published by or about a candidate.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Post {
    pub candidate: String,
    pub content: String,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct MentionCount {
    pub location: String,
    pub candidate: String,
    pub mentions: u64,
}

/// Transliterates to ASCII and lowercases, so that `São Paulo`, `SAO PAULO`
/// and `sao paulo` compare equal.
pub fn fold_accents(text: &str) -> String {
    deunicode(text).to_lowercase()
}

/// Counts, for every candidate, the posts that mention each location.
///
/// A post mentions a location when the location name is contained in the
/// content, ignoring case and accents. A post mentioning several locations
/// counts once for each of them. The counts are returned in order of first
/// mention.
pub fn count_mentions(posts: &[Post], locations: &[String]) -> Vec<MentionCount> {
    let folded_locations: Vec<(&String, String)> = locations
        .iter()
        .map(|l| (l, fold_accents(l)))
        .filter(|(l, f)| {
            if f.is_empty() {
                warn!("count_mentions: skipping empty location name {:?}", l);
            }
            !f.is_empty()
        })
        .collect();

    let mut positions: HashMap<(String, String), usize> = HashMap::new();
    let mut res: Vec<MentionCount> = Vec::new();
    for post in posts.iter() {
        let content = fold_accents(&post.content);
        for (location, folded) in folded_locations.iter() {
            if !content.contains(folded.as_str()) {
                continue;
            }
            let key = (location.to_string(), post.candidate.clone());
            match positions.get(&key) {
                Some(idx) => res[*idx].mentions += 1,
                None => {
                    positions.insert(key, res.len());
                    res.push(MentionCount {
                        location: location.to_string(),
                        candidate: post.candidate.clone(),
                        mentions: 1,
                    });
                }
            }
        }
    }
    info!(
        "count_mentions: {} posts, {} locations, {} (location, candidate) pairs",
        posts.len(),
        locations.len(),
        res.len()
    );
    res
}

/// Turns the mention counts into vote records, taking the party, the
/// electoral unit and the status of each candidate from the official table.
///
/// Candidates unknown to the official table keep an empty party and
/// electoral unit.
pub fn enrich_mentions(counts: &[MentionCount], official: &[VoteRecord]) -> Vec<VoteRecord> {
    let mut reference: HashMap<&str, &VoteRecord> = HashMap::new();
    for r in official.iter() {
        reference.entry(r.candidate.as_str()).or_insert(r);
    }

    let mut unknown: Vec<&str> = Vec::new();
    let res: Vec<VoteRecord> = counts
        .iter()
        .map(|mc| {
            let (party, electoral_unit, elected_status) =
                match reference.get(mc.candidate.as_str()) {
                    Some(r) => (r.party.clone(), r.electoral_unit.clone(), r.elected_status),
                    None => {
                        if !unknown.contains(&mc.candidate.as_str()) {
                            unknown.push(mc.candidate.as_str());
                        }
                        (String::new(), String::new(), ElectedStatus::NotElected)
                    }
                };
            VoteRecord {
                location: mc.location.clone(),
                candidate: mc.candidate.clone(),
                party,
                electoral_unit,
                count: mc.mentions,
                elected_status,
            }
        })
        .collect();
    if !unknown.is_empty() {
        warn!(
            "enrich_mentions: {} candidates not found in the official table: {:?}",
            unknown.len(),
            unknown
        );
    }
    debug!("enrich_mentions: {} records", res.len());
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(candidate: &str, content: &str) -> Post {
        Post {
            candidate: candidate.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn folding() {
        assert_eq!(fold_accents("São Paulo"), "sao paulo");
        assert_eq!(fold_accents("RIBEIRÃO PRETO"), "ribeirao preto");
        assert_eq!(fold_accents("Jundiaí"), "jundiai");
    }

    #[test]
    fn folding_beyond_portuguese() {
        assert_eq!(fold_accents("Æsir Łódź"), "aesir lodz");
        assert_eq!(fold_accents("Øresund"), "oresund");
        assert_eq!(fold_accents("İzmir"), "izmir");
        assert_eq!(fold_accents("Œuvre"), "oeuvre");
    }

    #[test]
    fn counts_ignore_case_and_accents() {
        let locations = vec!["São Paulo".to_string(), "Santos".to_string()];
        let posts = vec![
            post("Ana", "Obrigada SAO PAULO!"),
            post("Ana", "Hoje em são paulo e em Santos"),
            post("Bruno", "Visita a Santos"),
            post("Ana", "Nada aqui"),
        ];
        let counts = count_mentions(&posts, &locations);
        assert_eq!(
            counts,
            vec![
                MentionCount {
                    location: "São Paulo".to_string(),
                    candidate: "Ana".to_string(),
                    mentions: 2
                },
                MentionCount {
                    location: "Santos".to_string(),
                    candidate: "Ana".to_string(),
                    mentions: 1
                },
                MentionCount {
                    location: "Santos".to_string(),
                    candidate: "Bruno".to_string(),
                    mentions: 1
                },
            ]
        );
    }

    #[test]
    fn enrichment_from_official_rows() {
        let official = vec![VoteRecord {
            location: "Santos".to_string(),
            candidate: "Ana".to_string(),
            party: "P1".to_string(),
            electoral_unit: "SP".to_string(),
            count: 10,
            elected_status: ElectedStatus::Elected,
        }];
        let counts = vec![
            MentionCount {
                location: "Santos".to_string(),
                candidate: "Ana".to_string(),
                mentions: 3,
            },
            MentionCount {
                location: "Santos".to_string(),
                candidate: "Zeca".to_string(),
                mentions: 1,
            },
        ];
        let records = enrich_mentions(&counts, &official);
        assert_eq!(records[0].party, "P1");
        assert_eq!(records[0].count, 3);
        assert_eq!(records[0].elected_status, ElectedStatus::Elected);
        assert_eq!(records[1].party, "");
        assert_eq!(records[1].elected_status, ElectedStatus::NotElected);
    }
}
