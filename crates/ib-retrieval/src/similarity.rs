//! Cosine similarity over already-produced embeddings and token-set
//! Jaccard similarity over text. Computing embeddings is out of scope
//! (spec §1 Non-goals: "low-level embedding math") but comparing two
//! embeddings handed to this crate is squarely in scope.

use std::collections::HashSet;

/// Cosine similarity of two equal-length embeddings, in `[-1.0, 1.0]`.
/// Mismatched lengths or a zero vector have no defined similarity.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.is_empty() || a.len() != b.len() {
        return None;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    Some(dot / (norm_a * norm_b))
}

fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase().split_whitespace().map(str::to_string).collect()
}

/// Token-set Jaccard similarity: `|A ∩ B| / |A ∪ B|`, `0.0` when both sides
/// tokenize to nothing.
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let tokens_a = tokenize(a);
    let tokens_b = tokenize(b);
    if tokens_a.is_empty() && tokens_b.is_empty() {
        return 0.0;
    }
    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}
