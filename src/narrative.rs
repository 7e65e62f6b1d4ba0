//! Narrative synthesis
//!
//! Template-based Spanish summary of the network. Pure function of its input.

use crate::partition::{StabilityLabel, StabilityScore};
use crate::report::{CommunityProfile, Discriminant};

/// Discriminant dimensions named in the narrative
const NAMED_DIMENSIONS: usize = 3;

/// What the narrative is built from
#[derive(Debug, Clone, Copy)]
pub struct NarrativeInput<'a> {
    pub community_count: usize,
    pub modularity: f64,
    pub profiles: &'a [CommunityProfile],
    /// Ranked by spread, most discriminating first
    pub discriminants: &'a [Discriminant],
    pub bridge_count: usize,
    pub stability: StabilityScore,
}

fn group_description(p: &CommunityProfile) -> String {
    format!(
        "{} ({} personas, mayoritariamente {})",
        p.id + 1,
        p.size,
        p.dominant_department
    )
}

pub fn synthesize(input: &NarrativeInput<'_>) -> String {
    let mut parts: Vec<String> = Vec::new();

    if input.stability.label == StabilityLabel::Weak {
        parts.push(format!(
            "Nota: La estructura comunitaria tiene baja estabilidad (NMI={:.2}). \
             Los clusters detectados pueden variar entre ejecuciones y deben interpretarse con cautela.",
            input.stability.nmi
        ));
    }

    parts.push(match input.community_count {
        0 | 1 => "La organización presenta una percepción homogénea: todos los colaboradores \
                  viven una realidad organizacional similar."
            .to_string(),
        n @ 2..=3 => format!(
            "Se identificaron {} grupos perceptuales diferenciados dentro de la organización, \
             lo que sugiere que coexisten realidades organizacionales distintas.",
            n
        ),
        n => format!(
            "La organización está fragmentada en {} comunidades perceptuales, indicando \
             múltiples realidades organizacionales paralelas.",
            n
        ),
    });

    if !input.discriminants.is_empty() {
        let top: Vec<&str> = input
            .discriminants
            .iter()
            .take(NAMED_DIMENSIONS)
            .map(|d| d.code.as_str())
            .collect();
        parts.push(format!(
            "Las dimensiones que más diferencian a los grupos son: {}.",
            top.join(", ")
        ));
    }

    if input.profiles.len() >= 2 {
        // Stable sort: among equal averages the lower community id ranks first
        let mut by_score: Vec<&CommunityProfile> = input.profiles.iter().collect();
        by_score.sort_by(|a, b| b.avg_score.total_cmp(&a.avg_score));
        if let (Some(best), Some(worst)) = (by_score.first(), by_score.last()) {
            parts.push(format!(
                "El grupo {} tiene la percepción más favorable ({:.2}), mientras que el grupo {} \
                 presenta la percepción más crítica ({:.2}).",
                group_description(best),
                best.avg_score,
                group_description(worst),
                worst.avg_score
            ));
        }
    }

    if input.bridge_count > 0 {
        parts.push(format!(
            "Se identificaron {} nodos puente: personas que conectan múltiples comunidades \
             y pueden actuar como traductores culturales.",
            input.bridge_count
        ));
    } else {
        parts.push("No se identificaron nodos puente significativos entre las comunidades.".to_string());
    }

    parts.join(" ")
}
