use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchStats {
    /// Nodes moved from the frontier to closed
    pub expanded: usize,
    /// Nodes added to the frontier, not counting the start
    pub opened: usize,
    /// Frontier nodes re-linked through a cheaper parent
    pub relaxed: usize,
    /// Cells on the returned path, 0 when no path was found
    pub path_len: usize,
    pub path_cost: Option<f64>,
    pub elapsed: Duration,
}

impl SearchStats {
    pub fn found(&self) -> bool {
        self.path_cost.is_some()
    }

    /// Ratio of the found cost to the optimal cost; 1.0 means optimal.
    pub fn optimality_ratio(&self, optimal: f64) -> Option<f64> {
        match self.path_cost {
            Some(cost) if optimal > 0.0 => Some(cost / optimal),
            Some(cost) if cost == 0.0 => Some(1.0),
            _ => None,
        }
    }
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "A* Search Statistics:")?;
        match self.path_cost {
            Some(cost) => {
                writeln!(f, "Length of shortest path: {:.3}", cost)?;
                writeln!(f, "Cells on path: {}", self.path_len)?;
            }
            None => writeln!(f, "No path exists")?,
        }
        writeln!(f, "Nodes expanded: {}", self.expanded)?;
        writeln!(f, "Nodes opened: {}", self.opened)?;
        writeln!(f, "Relaxations: {}", self.relaxed)?;
        writeln!(f, "Search time: {:.2?}", self.elapsed)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_requires_a_path() {
        let mut stats = SearchStats::default();
        assert!(!stats.found());
        assert_eq!(stats.optimality_ratio(4.0), None);

        stats.path_cost = Some(5.0);
        assert_eq!(stats.optimality_ratio(4.0), Some(1.25));

        stats.path_cost = Some(0.0);
        assert_eq!(stats.optimality_ratio(0.0), Some(1.0));
    }

    #[test]
    fn display_reports_missing_path() {
        let stats = SearchStats {
            expanded: 12,
            ..SearchStats::default()
        };
        let text = stats.to_string();
        assert!(text.contains("No path exists"));
        assert!(text.contains("Nodes expanded: 12"));
    }
}
