//! Ranking of artist suggestions for incremental search.

use crate::catalog::{Catalog, CatalogError};
use crate::model::ArtistCandidate;
use crate::session::Session;
use log::debug;
use std::collections::HashSet;
use similar::TextDiff;

/// Shorter queries match too much to be useful.
pub const MIN_QUERY_LENGTH: usize = 4;
pub const MAX_SUGGESTIONS: usize = 10;
const ARTIST_SEARCH_LIMIT: u32 = 20;

const EXACT_MATCH_SCORE: f64 = 10_000.0;
const PREFIX_MATCH_SCORE: f64 = 8_000.0;
const ALL_WORDS_MATCH_SCORE: f64 = 6_000.0;
const SUBSTRING_MATCH_SCORE: f64 = 4_000.0;

struct NormalizedQuery {
    text: String,
    words: Vec<String>,
}

impl NormalizedQuery {
    fn new(query: &str) -> Self {
        let text = query.trim().to_lowercase();
        let words = text.split_whitespace().map(str::to_owned).collect();
        Self { text, words }
    }

    fn score(&self, candidate: &ArtistCandidate) -> f64 {
        let name = candidate.name.trim().to_lowercase();
        let popularity = f64::from(candidate.popularity);

        if name == self.text {
            EXACT_MATCH_SCORE + popularity
        } else if name.starts_with(&self.text) {
            PREFIX_MATCH_SCORE + popularity
        } else if self.words.len() >= 2
            && self.words.iter().all(|word| name.contains(word.as_str()))
        {
            ALL_WORDS_MATCH_SCORE + popularity
        } else if name.contains(&self.text) {
            SUBSTRING_MATCH_SCORE + popularity
        } else {
            100.0 * similarity(&name, &self.text) + 0.5 * popularity
        }
    }
}

/// Twice the length of the longest common subsequence over the total length, so a longer shared
/// run of characters never lowers the ratio.
fn similarity(name: &str, query: &str) -> f64 {
    f64::from(TextDiff::from_chars(name, query).ratio())
}

fn is_searchable(query: &str) -> bool {
    query.trim().chars().count() >= MIN_QUERY_LENGTH
}

/// Orders the candidates by relevance to the query, best first, keeping at most
/// [`MAX_SUGGESTIONS`]. Candidates without an identifier are dropped and repeated identifiers
/// keep their first occurrence; equally scored candidates keep their relative order.
pub fn rank(
    query: &str,
    candidates: impl IntoIterator<Item = ArtistCandidate>,
) -> Vec<ArtistCandidate> {
    if !is_searchable(query) {
        return Vec::new();
    }

    let query = NormalizedQuery::new(query);
    let mut seen_ids = HashSet::new();
    let mut scored_candidates = candidates
        .into_iter()
        .filter(|candidate| !candidate.id.is_empty())
        .filter(|candidate| seen_ids.insert(candidate.id.clone()))
        .map(|candidate| (query.score(&candidate), candidate))
        .collect::<Vec<_>>();

    scored_candidates.sort_by(|(score, _), (other_score, _)| other_score.total_cmp(score));

    scored_candidates
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, candidate)| candidate)
        .collect()
}

/// Asks the catalog for artists matching the query and ranks them. Queries the ranker would
/// reject, and sessions without a token, yield no suggestions without calling the catalog.
pub async fn search_artists<C: Catalog>(
    session: &Session<C>,
    query: &str,
) -> Result<Vec<ArtistCandidate>, CatalogError> {
    let query = query.trim();
    if !session.is_authenticated() || !is_searchable(query) {
        debug!("Not searching for artists matching \"{query}\".");
        return Ok(Vec::new());
    }

    let candidates = session
        .catalog()
        .search_artists(query, ARTIST_SEARCH_LIMIT)
        .await?;

    Ok(rank(query, candidates))
}
