//! Community profiles and discriminant dimensions

use super::stats::{argmax, argmin, mean, round_to};
use crate::report::{CommunityProfile, DepartmentShare, DimensionDifference, Discriminant};
use crate::vectorize::VectorSet;
use indexmap::IndexMap;
use ndarray::Array1;
use rustc_hash::FxHashMap;

/// Dimensions listed per profile as the largest departures from the global mean
const TOP_DIFFERENCES: usize = 3;

/// Department counts ordered by count (descending) then name
fn department_counts<'a>(departments: impl Iterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    for dept in departments {
        *counts.entry(dept).or_insert(0) += 1;
    }
    let mut counts: Vec<(&str, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    counts
}

/// One profile per community, in community order.
///
/// `membership[i]` is the community of `vectors.vectors[i]`; `global_means`
/// are the unrounded per-dimension means over all respondents.
pub fn community_profiles(
    vectors: &VectorSet,
    membership: &[usize],
    community_count: usize,
    global_means: &Array1<f64>,
) -> Vec<CommunityProfile> {
    let total = vectors.len();
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); community_count];
    for (node, &c) in membership.iter().enumerate() {
        members[c].push(node);
    }

    members
        .iter()
        .enumerate()
        .map(|(id, rows)| {
            let size = rows.len();

            let mut dimension_scores = IndexMap::with_capacity(vectors.dimensions.len());
            for (d, code) in vectors.dimensions.iter().enumerate() {
                let values: Vec<f64> = rows.iter().map(|&r| vectors.vectors[r].values[d]).collect();
                dimension_scores.insert(code.clone(), round_to(mean(&values), 3));
            }
            let scores: Vec<f64> = dimension_scores.values().copied().collect();
            let avg_score = round_to(mean(&scores), 3);

            let counts = department_counts(rows.iter().map(|&r| vectors.vectors[r].department.as_str()));
            let dominant_department = counts.first().map(|(d, _)| d.to_string()).unwrap_or_default();
            let department_distribution = counts
                .iter()
                .map(|&(dept, count)| {
                    let pct = if size > 0 { count as f64 / size as f64 * 100.0 } else { 0.0 };
                    (
                        dept.to_string(),
                        DepartmentShare {
                            count,
                            pct: round_to(pct, 1),
                        },
                    )
                })
                .collect();

            let mut diffs: Vec<(usize, f64)> = scores
                .iter()
                .enumerate()
                .map(|(d, &score)| (d, score - global_means[d]))
                .collect();
            diffs.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
            let top_differences = diffs
                .into_iter()
                .take(TOP_DIFFERENCES)
                .map(|(d, diff)| DimensionDifference {
                    code: vectors.dimensions[d].clone(),
                    diff: round_to(diff, 3),
                    cluster_score: scores[d],
                })
                .collect();

            let pct = if total > 0 { size as f64 / total as f64 * 100.0 } else { 0.0 };
            CommunityProfile {
                id,
                size,
                pct: round_to(pct, 1),
                avg_score,
                dominant_department,
                department_distribution,
                dimension_scores,
                top_differences,
            }
        })
        .collect()
}

/// Dimensions ranked by how far apart the community means are.
///
/// Empty when there are fewer than two communities.
pub fn discriminants(profiles: &[CommunityProfile], vectors: &VectorSet) -> Vec<Discriminant> {
    if profiles.len() < 2 {
        return Vec::new();
    }

    let mut ranked: Vec<Discriminant> = vectors
        .dimensions
        .iter()
        .filter_map(|code| {
            let means: Vec<f64> = profiles
                .iter()
                .map(|p| p.dimension_scores.get(code).copied().unwrap_or(0.0))
                .collect();
            let max_cluster = argmax(&means)?;
            let min_cluster = argmin(&means)?;
            Some(Discriminant {
                code: code.clone(),
                spread: round_to(means[max_cluster] - means[min_cluster], 3),
                max_cluster,
                max_value: round_to(means[max_cluster], 3),
                min_cluster,
                min_value: round_to(means[min_cluster], 3),
            })
        })
        .collect();

    ranked.sort_by(|a, b| b.spread.total_cmp(&a.spread));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::DimensionCode;
    use crate::vectorize::RespondentVector;
    use ndarray::array;

    fn vectors() -> VectorSet {
        let rows = [
            ("a1", "Ventas", [4.0, 2.0]),
            ("a2", "Ventas", [5.0, 2.0]),
            ("a3", "Operaciones", [4.5, 2.0]),
            ("b1", "Operaciones", [1.0, 2.5]),
            ("b2", "Finanzas", [1.0, 2.5]),
        ];
        VectorSet {
            dimensions: vec![DimensionCode::new("COM"), DimensionCode::new("LID")],
            vectors: rows
                .iter()
                .map(|(id, dept, v)| RespondentVector {
                    respondent_id: id.to_string(),
                    department: dept.to_string(),
                    tenure: None,
                    gender: None,
                    values: array![v[0], v[1]],
                })
                .collect(),
        }
    }

    #[test]
    fn test_profiles() {
        let set = vectors();
        let means = set.global_means();
        let profiles = community_profiles(&set, &[0, 0, 0, 1, 1], 2, &means);

        assert_eq!(profiles.len(), 2);
        let a = &profiles[0];
        assert_eq!(a.size, 3);
        assert_eq!(a.pct, 60.0);
        assert_eq!(a.dimension_scores[&DimensionCode::new("COM")], 4.5);
        assert_eq!(a.dimension_scores[&DimensionCode::new("LID")], 2.0);
        assert_eq!(a.avg_score, 3.25);
        assert_eq!(a.dominant_department, "Ventas");
        assert_eq!(a.department_distribution["Ventas"].count, 2);
        assert_eq!(a.department_distribution["Ventas"].pct, 66.7);
        assert_eq!(a.department_distribution["Operaciones"].pct, 33.3);
        // global COM mean = 3.1, LID mean = 2.2
        assert_eq!(a.top_differences[0].code.as_str(), "COM");
        assert_eq!(a.top_differences[0].diff, 1.4);
        assert_eq!(a.top_differences[1].diff, -0.2);

        // 1-1 tie between Finanzas and Operaciones: name order decides
        let b = &profiles[1];
        assert_eq!(b.dominant_department, "Finanzas");
        let order: Vec<&String> = b.department_distribution.keys().collect();
        assert_eq!(order, vec!["Finanzas", "Operaciones"]);
    }

    #[test]
    fn test_discriminants_sorted_by_spread() {
        let set = vectors();
        let means = set.global_means();
        let profiles = community_profiles(&set, &[0, 0, 0, 1, 1], 2, &means);
        let ranked = discriminants(&profiles, &set);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].code.as_str(), "COM");
        assert_eq!(ranked[0].spread, 3.5);
        assert_eq!(ranked[0].max_cluster, 0);
        assert_eq!(ranked[0].min_cluster, 1);
        assert_eq!(ranked[1].code.as_str(), "LID");
        assert_eq!(ranked[1].spread, 0.5);
        assert_eq!(ranked[1].max_cluster, 1);
        assert!(ranked.iter().all(|d| d.spread >= 0.0));
    }

    #[test]
    fn test_single_community_has_no_discriminants() {
        let set = vectors();
        let means = set.global_means();
        let profiles = community_profiles(&set, &[0; 5], 1, &means);
        assert!(discriminants(&profiles, &set).is_empty());
        assert_eq!(profiles[0].pct, 100.0);
    }
}
