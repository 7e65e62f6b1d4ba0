//! Respondent vectorization
//!
//! Turns item-level Likert responses into one vector per respondent: item
//! scores are reverse-scored where flagged, averaged per dimension, and a
//! respondent is kept only if every dimension received at least one score.

use crate::config::AnalysisConfig;
use crate::error::{InsufficientData, OnaResult};
use crate::survey::{CampaignData, DimensionCode, RespondentStatus};
use ndarray::{Array1, Array2};
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

/// Mirror a score on a `1..=scale_max` scale.
pub fn reverse_score(score: i32, scale_max: i32) -> i32 {
    scale_max + 1 - score
}

/// One respondent's perception vector
#[derive(Debug, Clone)]
pub struct RespondentVector {
    pub respondent_id: String,
    pub department: String,
    pub tenure: Option<String>,
    pub gender: Option<String>,
    /// Mean adjusted score per dimension, aligned with [`VectorSet::dimensions`]
    pub values: Array1<f64>,
}

/// All complete vectors of a campaign plus their shared dimension order
#[derive(Debug, Clone)]
pub struct VectorSet {
    pub dimensions: Vec<DimensionCode>,
    pub vectors: Vec<RespondentVector>,
}

impl VectorSet {
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Stack the vectors into an `n × d` matrix
    pub fn matrix(&self) -> Array2<f64> {
        let mut m = Array2::zeros((self.vectors.len(), self.dimensions.len()));
        for (mut row, v) in m.rows_mut().into_iter().zip(&self.vectors) {
            row.assign(&v.values);
        }
        m
    }

    /// Mean of each dimension over all respondents
    pub fn global_means(&self) -> Array1<f64> {
        self.matrix()
            .mean_axis(ndarray::Axis(0))
            .unwrap_or_else(|| Array1::zeros(self.dimensions.len()))
    }
}

#[derive(Clone, Copy, Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

/// Build respondent vectors for a campaign.
///
/// Fails with [`InsufficientData`] when the campaign has no usable dimension,
/// too few completed respondents, or too few complete vectors.
pub fn vectorize(data: &CampaignData, config: &AnalysisConfig) -> OnaResult<VectorSet> {
    let min = config.min_respondents;

    let mut dimensions: Vec<DimensionCode> = data
        .dimensions
        .iter()
        .filter(|d| d.code != config.excluded_dimension)
        .map(|d| d.code.clone())
        .collect();
    dimensions.sort();
    dimensions.dedup();
    if dimensions.is_empty() {
        return Err(InsufficientData::NoDimensions {
            excluded: config.excluded_dimension.to_string(),
        }
        .into());
    }

    let dim_slot: FxHashMap<&DimensionCode, usize> =
        dimensions.iter().enumerate().map(|(i, code)| (code, i)).collect();
    let dimension_of: FxHashMap<&str, usize> = data
        .dimensions
        .iter()
        .filter_map(|d| dim_slot.get(&d.code).map(|&slot| (d.id.as_str(), slot)))
        .collect();

    // item id -> (dimension slot, reverse)
    let items: FxHashMap<&str, (usize, bool)> = data
        .items
        .iter()
        .filter(|it| !it.is_attention_check)
        .filter_map(|it| {
            dimension_of
                .get(it.dimension_id.as_str())
                .map(|&slot| (it.id.as_str(), (slot, it.is_reverse)))
        })
        .collect();

    let respondents: Vec<_> = data
        .respondents
        .iter()
        .filter(|r| r.status == RespondentStatus::Completed)
        .collect();
    if respondents.len() < min {
        return Err(InsufficientData::TooFewRespondents {
            found: respondents.len(),
            required: min,
        }
        .into());
    }

    let row_of: FxHashMap<&str, usize> = respondents
        .iter()
        .enumerate()
        .map(|(row, r)| (r.id.as_str(), row))
        .collect();
    let mut scores = vec![vec![Accumulator::default(); dimensions.len()]; respondents.len()];

    let mut out_of_range = 0usize;
    for response in &data.responses {
        let Some(&(slot, reverse)) = items.get(response.item_id.as_str()) else {
            continue;
        };
        let Some(&row) = row_of.get(response.respondent_id.as_str()) else {
            continue;
        };
        if response.score < 1 || response.score > config.scale_max {
            out_of_range += 1;
            continue;
        }
        let score = if reverse {
            reverse_score(response.score, config.scale_max)
        } else {
            response.score
        };
        let acc = &mut scores[row][slot];
        acc.sum += score as f64;
        acc.count += 1;
    }
    if out_of_range > 0 {
        warn!(
            "Ignored {} responses outside the 1..={} scale in campaign {}",
            out_of_range, config.scale_max, data.campaign_id
        );
    }

    let vectors: Vec<RespondentVector> = respondents
        .iter()
        .zip(scores)
        .filter(|(_, dims)| dims.iter().all(|acc| acc.count > 0))
        .map(|(r, dims)| RespondentVector {
            respondent_id: r.id.clone(),
            department: r
                .department
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| config.default_department.clone()),
            tenure: r.tenure.clone().filter(|t| !t.is_empty()),
            gender: r.gender.clone().filter(|g| !g.is_empty()),
            values: dims.iter().map(|acc| acc.sum / acc.count as f64).collect(),
        })
        .collect();

    debug!(
        "{} of {} completed respondents have complete vectors",
        vectors.len(),
        respondents.len()
    );
    if vectors.len() < min {
        return Err(InsufficientData::TooFewCompleteVectors {
            found: vectors.len(),
            required: min,
        }
        .into());
    }

    info!("Vectors: {} respondents x {} dimensions", vectors.len(), dimensions.len());
    Ok(VectorSet { dimensions, vectors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OnaError;
    use crate::survey::{DimensionRecord, ItemRecord, RespondentRecord, ResponseRecord};

    fn respondent(id: &str, status: RespondentStatus) -> RespondentRecord {
        RespondentRecord {
            id: id.to_string(),
            campaign_id: "c1".to_string(),
            department: None,
            tenure: None,
            gender: None,
            status,
        }
    }

    fn item(id: &str, dim: &str, reverse: bool, attention: bool) -> ItemRecord {
        ItemRecord {
            id: id.to_string(),
            dimension_id: dim.to_string(),
            is_reverse: reverse,
            is_attention_check: attention,
        }
    }

    fn response(resp: &str, item: &str, score: i32) -> ResponseRecord {
        ResponseRecord {
            respondent_id: resp.to_string(),
            item_id: item.to_string(),
            score,
        }
    }

    /// Two dimensions (COM, LID) plus the outcome ENG. `n` completed respondents.
    fn campaign(n: usize) -> CampaignData {
        let mut data = CampaignData::new("c1");
        for (id, code) in [("d-lid", "LID"), ("d-com", "COM"), ("d-eng", "ENG")] {
            data.dimensions.push(DimensionRecord {
                id: id.to_string(),
                code: DimensionCode::new(code),
                instrument_id: "core".to_string(),
            });
        }
        data.items = vec![
            item("i1", "d-lid", false, false),
            item("i2", "d-lid", true, false),
            item("i3", "d-com", false, false),
            item("i4", "d-com", false, true),
            item("i5", "d-eng", false, false),
        ];
        for r in 0..n {
            let id = format!("r{}", r);
            data.respondents.push(respondent(&id, RespondentStatus::Completed));
            data.responses.push(response(&id, "i1", 4));
            data.responses.push(response(&id, "i2", 2));
            data.responses.push(response(&id, "i3", 3));
            data.responses.push(response(&id, "i4", 1));
            data.responses.push(response(&id, "i5", 5));
        }
        data
    }

    #[test]
    fn test_reverse_score_involution() {
        for s in 1..=5 {
            assert_eq!(reverse_score(reverse_score(s, 5), 5), s);
        }
        assert_eq!(reverse_score(1, 5), 5);
        assert_eq!(reverse_score(2, 5), 4);
    }

    #[test]
    fn test_vectors_average_adjusted_scores() {
        let set = vectorize(&campaign(10), &AnalysisConfig::default()).unwrap();

        assert_eq!(set.dimensions, vec![DimensionCode::new("COM"), DimensionCode::new("LID")]);
        assert_eq!(set.len(), 10);
        let v = &set.vectors[0];
        // COM ignores the attention check; LID = mean(4, 6-2)
        assert_eq!(v.values.to_vec(), vec![3.0, 4.0]);
        assert_eq!(v.department, "Sin departamento");
        assert_eq!(set.matrix().shape(), &[10, 2]);
        assert_eq!(set.global_means().to_vec(), vec![3.0, 4.0]);
    }

    #[test]
    fn test_incomplete_respondents_dropped() {
        let mut data = campaign(11);
        data.responses.retain(|r| !(r.respondent_id == "r3" && r.item_id == "i3"));
        let set = vectorize(&data, &AnalysisConfig::default()).unwrap();
        assert_eq!(set.len(), 10);
        assert!(set.vectors.iter().all(|v| v.respondent_id != "r3"));
    }

    #[test]
    fn test_too_few_completed_respondents() {
        let mut data = campaign(10);
        data.respondents[0].status = RespondentStatus::InProgress;
        let err = vectorize(&data, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            OnaError::InsufficientData(InsufficientData::TooFewRespondents { found: 9, required: 10 })
        ));
    }

    #[test]
    fn test_too_few_complete_vectors() {
        let mut data = campaign(10);
        data.responses.retain(|r| !(r.respondent_id == "r0" && r.item_id == "i1"));
        data.responses.retain(|r| !(r.respondent_id == "r0" && r.item_id == "i2"));
        let err = vectorize(&data, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            OnaError::InsufficientData(InsufficientData::TooFewCompleteVectors { found: 9, .. })
        ));
    }

    #[test]
    fn test_only_outcome_dimension() {
        let mut data = campaign(10);
        data.dimensions.retain(|d| d.code.as_str() == "ENG");
        let err = vectorize(&data, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, OnaError::InsufficientData(InsufficientData::NoDimensions { .. })));
    }

    #[test]
    fn test_out_of_range_scores_ignored() {
        let mut data = campaign(10);
        data.responses.push(response("r0", "i3", 9));
        let set = vectorize(&data, &AnalysisConfig::default()).unwrap();
        assert_eq!(set.vectors[0].values[0], 3.0);
    }
}
