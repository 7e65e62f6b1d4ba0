//! Static graph image
//!
//! Draws the similarity graph as an SVG document: force-directed layout,
//! nodes coloured by community and sized by betweenness, no labels. The
//! document is returned base64 encoded, ready to be embedded in the report.

use crate::network::PerceptualGraph;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use percepta_graph_algorithms::{betweenness, fruchterman_reingold, LayoutConfig, Point};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt::Write;
use thiserror::Error;

/// Community palette, cycled when there are more communities than colours
pub const CLUSTER_COLORS: [&str; 10] = [
    "#3b82f6", "#ef4444", "#22c55e", "#f59e0b", "#8b5cf6", "#ec4899", "#0ea5e9", "#f97316", "#14b8a6",
    "#a855f7",
];

const INTER_COMMUNITY_COLOR: &str = "#94a3b8";
const MIN_NODE_SIZE: f64 = 15.0;
const MAX_NODE_SIZE: f64 = 40.0;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("graph has no nodes")]
    EmptyGraph,

    #[error("membership covers {membership} nodes, graph has {nodes}")]
    MembershipMismatch { nodes: usize, membership: usize },

    #[error("failed to write image: {0}")]
    Format(#[from] std::fmt::Error),
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Turns a partitioned graph into an encoded image
pub trait GraphRenderer {
    /// Image format recorded next to the encoded data (e.g. "svg")
    fn format(&self) -> &'static str;

    /// Render and base64 encode
    fn render(&self, graph: &PerceptualGraph, membership: &[usize]) -> RenderResult<String>;
}

/// SVG renderer
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    pub layout: LayoutConfig,
    /// Canvas edge length in pixels
    pub size: f64,
    /// Fixed layout seed; random placement when `None`
    pub seed: Option<u64>,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            size: 1000.0,
            seed: None,
        }
    }
}

impl SvgRenderer {
    fn layout(&self, graph: &PerceptualGraph) -> Vec<Point> {
        match self.seed {
            Some(seed) => fruchterman_reingold(&graph.view, &self.layout, &mut StdRng::seed_from_u64(seed)),
            None => fruchterman_reingold(&graph.view, &self.layout, &mut rand::thread_rng()),
        }
    }

    /// Map layout coordinates into the drawing area below the title
    fn fit(&self, points: &[Point], margin: f64, top: f64) -> Vec<Point> {
        let (mut min_x, mut max_x, mut min_y, mut max_y) = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
        for &(x, y) in points {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
        let span = (max_x - min_x).max(max_y - min_y).max(f64::EPSILON);
        let area = self.size - 2.0 * margin;
        let scale = (area - top) / span;
        let offset_x = margin + (area - (max_x - min_x) * scale) / 2.0;
        let offset_y = margin + top + (area - top - (max_y - min_y) * scale) / 2.0;
        points
            .iter()
            .map(|&(x, y)| (offset_x + (x - min_x) * scale, offset_y + (y - min_y) * scale))
            .collect()
    }

    /// Build the SVG document
    pub fn document(&self, graph: &PerceptualGraph, membership: &[usize]) -> RenderResult<String> {
        let n = graph.node_count();
        if n == 0 {
            return Err(RenderError::EmptyGraph);
        }
        if membership.len() != n {
            return Err(RenderError::MembershipMismatch {
                nodes: n,
                membership: membership.len(),
            });
        }

        let color = |c: usize| CLUSTER_COLORS[c % CLUSTER_COLORS.len()];
        let raw = betweenness(&graph.view).nodes;
        let max_btw = raw.iter().cloned().fold(0.0_f64, f64::max);
        let max_btw = if max_btw > 0.0 { max_btw } else { 1.0 };
        let positions = self.fit(&self.layout(graph), 40.0, 50.0);

        let mut svg = String::new();
        writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{s}" height="{s}" viewBox="0 0 {s} {s}">"#,
            s = self.size
        )?;
        writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
        writeln!(
            svg,
            r#"<text x="{}" y="40" text-anchor="middle" font-family="sans-serif" font-size="22" font-weight="bold">Red de similitud perceptual</text>"#,
            self.size / 2.0
        )?;

        writeln!(svg, r#"<g id="edges">"#)?;
        for &(u, v, _) in &graph.view.edges {
            let (stroke, opacity, width) = if membership[u] == membership[v] {
                (color(membership[u]), 0.25, 0.6)
            } else {
                (INTER_COMMUNITY_COLOR, 0.53, 1.0)
            };
            writeln!(
                svg,
                r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-opacity="{}" stroke-width="{}"/>"#,
                positions[u].0, positions[u].1, positions[v].0, positions[v].1, stroke, opacity, width
            )?;
        }
        writeln!(svg, "</g>")?;

        writeln!(svg, r#"<g id="nodes" stroke="white" stroke-width="1">"#)?;
        for (v, &(x, y)) in positions.iter().enumerate() {
            let size = MIN_NODE_SIZE + (MAX_NODE_SIZE - MIN_NODE_SIZE) * (raw[v] / max_btw);
            writeln!(
                svg,
                r#"<circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{}"/>"#,
                x,
                y,
                size / 2.0,
                color(membership[v])
            )?;
        }
        writeln!(svg, "</g>")?;

        let communities = membership.iter().max().map(|&m| m + 1).unwrap_or(1);
        let legend_height = 30.0 + 20.0 * communities as f64;
        writeln!(svg, r#"<g id="legend" font-family="sans-serif" font-size="13">"#)?;
        writeln!(
            svg,
            r#"<rect x="10" y="60" width="170" height="{}" fill="white" fill-opacity="0.9" stroke="{}"/>"#,
            legend_height, INTER_COMMUNITY_COLOR
        )?;
        writeln!(svg, r#"<text x="20" y="80" font-size="14">Comunidades</text>"#)?;
        for c in 0..communities {
            let count = membership.iter().filter(|&&m| m == c).count();
            let y = 100.0 + 20.0 * c as f64;
            writeln!(
                svg,
                r#"<circle cx="26" cy="{}" r="6" fill="{}" stroke="white"/><text x="38" y="{}">Grupo {} ({})</text>"#,
                y - 4.0,
                color(c),
                y,
                c + 1,
                count
            )?;
        }
        writeln!(svg, "</g>")?;
        writeln!(svg, "</svg>")?;

        Ok(svg)
    }
}

impl GraphRenderer for SvgRenderer {
    fn format(&self) -> &'static str {
        "svg"
    }

    fn render(&self, graph: &PerceptualGraph, membership: &[usize]) -> RenderResult<String> {
        let svg = self.document(graph, membership)?;
        Ok(BASE64.encode(svg.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Calibration, NodeInfo};
    use percepta_graph_algorithms::GraphView;

    fn graph() -> PerceptualGraph {
        let edges = vec![(0, 1, 0.9), (1, 2, 0.9), (0, 2, 0.9), (2, 3, 0.7), (3, 4, 0.9)];
        PerceptualGraph {
            nodes: (0..5)
                .map(|i| NodeInfo {
                    respondent_id: format!("persona-{}", i),
                    department: "A".to_string(),
                })
                .collect(),
            view: GraphView::from_edges(5, &edges, true),
            calibration: Calibration {
                threshold: 0.7,
                density: 0.5,
                steps: 1,
                in_band: false,
            },
        }
    }

    fn renderer() -> SvgRenderer {
        SvgRenderer {
            seed: Some(7),
            layout: LayoutConfig {
                iterations: 50,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_document_contents() {
        let svg = renderer().document(&graph(), &[0, 0, 0, 1, 1]).unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("Red de similitud perceptual"));
        assert!(svg.contains("Grupo 1 (3)"));
        assert!(svg.contains("Grupo 2 (2)"));
        assert_eq!(svg.matches("<line").count(), 5);
        // 5 nodes + 2 legend markers
        assert_eq!(svg.matches("<circle").count(), 7);
        // one edge crosses communities
        assert_eq!(svg.matches(INTER_COMMUNITY_COLOR).count(), 2);
        // no respondent ids leak into the image
        assert!(!svg.contains("persona"));
    }

    #[test]
    fn test_render_is_base64_svg() {
        let encoded = renderer().render(&graph(), &[0, 0, 0, 1, 1]).unwrap();
        let decoded = BASE64.decode(encoded).unwrap();
        assert!(String::from_utf8(decoded).unwrap().starts_with("<svg"));
        assert_eq!(renderer().format(), "svg");
    }

    #[test]
    fn test_membership_mismatch() {
        let err = renderer().render(&graph(), &[0, 0]).unwrap_err();
        assert!(matches!(err, RenderError::MembershipMismatch { nodes: 5, membership: 2 }));
    }
}
