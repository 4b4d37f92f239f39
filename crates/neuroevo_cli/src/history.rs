use anyhow::Context;
use neuroevo_core::GenerationStats;
use std::path::Path;

/// Per-generation record of a run, kept by the caller rather than the engine.
#[derive(Debug, Default)]
pub struct History {
    generations: Vec<GenerationStats>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stats: GenerationStats) {
        self.generations.push(stats);
    }

    pub fn len(&self) -> usize {
        self.generations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }

    /// Highest best-of-generation fitness seen so far.
    pub fn best_fitness(&self) -> Option<f64> {
        self.generations
            .iter()
            .map(|s| s.best_fitness)
            .reduce(f64::max)
    }

    pub fn export_csv(&self, path: &Path) -> anyhow::Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("creating history {}", path.display()))?;
        for stats in &self.generations {
            writer.serialize(stats)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(generation: u64, best: f64) -> GenerationStats {
        GenerationStats {
            generation,
            best_fitness: best,
            mean_fitness: best / 2.0,
            best_composite: best,
            mutation_rate: 0.3,
            mutation_intensity: 0.3,
            generations_without_improvement: 0,
        }
    }

    #[test]
    fn test_best_fitness() {
        let mut history = History::new();
        assert_eq!(history.best_fitness(), None);
        history.push(stats(0, 1.0));
        history.push(stats(1, 3.0));
        history.push(stats(2, 2.0));
        assert_eq!(history.best_fitness(), Some(3.0));
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_export_csv() {
        let mut history = History::new();
        history.push(stats(0, 1.5));
        history.push(stats(1, 2.5));

        let mut path = std::env::temp_dir();
        path.push(format!("neuroevo_history_{}.csv", std::process::id()));
        history.export_csv(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("generation,best_fitness,mean_fitness"));
        assert_eq!(lines.count(), 2);
        let _ = std::fs::remove_file(path);
    }
}
