//! # Contour Ordering Policies
//!
//! Decides the order in which kept contours are drawn. The default keeps the
//! tracer's order untouched. `GreedyNearest` builds a nearest-neighbour tour:
//! starting at the origin, it always continues with the unvisited contour whose
//! first point is closest to where the beam currently is, which shortens the
//! total travel the move segments have to pay for.

use beam_trace::{Contour, Point};

/// Contour drawing order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ContourOrdering {
    /// Draw in extraction order.
    #[default]
    #[clap(name = "identity")]
    Identity,
    /// Greedy nearest-neighbour tour starting at the origin.
    #[clap(name = "greedy")]
    GreedyNearest,
}

impl ContourOrdering {
    /// Reorder `contours`. Empty contours are expected to be filtered out already.
    pub fn apply<'a>(&self, contours: Vec<&'a Contour>) -> Vec<&'a Contour> {
        match self {
            Self::Identity => contours,
            Self::GreedyNearest => greedy_nearest(contours),
        }
    }
}

fn greedy_nearest(mut remaining: Vec<&Contour>) -> Vec<&Contour> {
    let mut ordered = Vec::with_capacity(remaining.len());
    let mut at = Point::ORIGIN;

    while !remaining.is_empty() {
        let mut best = 0;
        let mut best_dist = f64::INFINITY;
        for (i, c) in remaining.iter().enumerate() {
            let d = c.first().map_or(f64::INFINITY, |p| at.distance(p));
            // strict comparison keeps the lowest index on ties
            if d < best_dist {
                best = i;
                best_dist = d;
            }
        }
        let next = remaining.remove(best);
        at = next.last().unwrap_or(at);
        ordered.push(next);
    }
    ordered
}
