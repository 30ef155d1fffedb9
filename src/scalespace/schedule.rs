use crate::scalespace::KazeConfig;

/// Scale and evolution time of one level of the sigma ladder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelSchedule {
    pub index: usize,
    pub octave: usize,
    pub sublevel: usize,
    /// sigma_i = base_sigma * 2^(octave + sublevel / sublevels)
    pub sigma: f32,
    /// Evolution time, t_i = sigma_i^2 / 2.
    pub time: f32,
    /// round(sigma_i), used when sizing derivative stencils.
    pub sigma_px: usize,
}

/// Compute the logarithmic sigma ladder for a configuration.
///
/// Emits 1 + octaves * sublevels entries with strictly increasing sigma
/// and evolution time.
#[must_use]
pub fn schedule(config: &KazeConfig) -> Vec<LevelSchedule> {
    let n = config.levels();
    let mut levels = Vec::with_capacity(n);

    for index in 0..n {
        let octave = index / config.sublevels;
        let sublevel = index % config.sublevels;
        let exponent = octave as f32 + sublevel as f32 / config.sublevels as f32;
        let sigma = config.base_sigma * 2.0f32.powf(exponent);

        levels.push(LevelSchedule {
            index,
            octave,
            sublevel,
            sigma,
            time: 0.5 * sigma * sigma,
            sigma_px: (sigma.round() as usize).max(1),
        });
    }

    levels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_count_and_base() {
        let cfg = KazeConfig::new(64, 64);
        let levels = schedule(&cfg);

        assert_eq!(levels.len(), 17);
        assert_eq!(levels[0].sigma, 1.6);
        assert_eq!(levels[0].octave, 0);
        assert_eq!(levels[0].sublevel, 0);
    }

    #[test]
    fn test_sigma_and_time_strictly_increase() {
        let cfg = KazeConfig::new(64, 64);
        let levels = schedule(&cfg);

        for pair in levels.windows(2) {
            assert!(pair[0].sigma < pair[1].sigma, "sigma must increase");
            assert!(pair[0].time < pair[1].time, "time must increase");
        }
    }

    #[test]
    fn test_octave_doubles_sigma() {
        let cfg = KazeConfig::new(64, 64);
        let levels = schedule(&cfg);
        let s = cfg.sublevels;

        let ratio = levels[s].sigma / levels[0].sigma;
        assert!((ratio - 2.0).abs() < 1e-5, "one octave should double sigma");
    }

    #[test]
    fn test_time_is_half_sigma_squared() {
        let cfg = KazeConfig::new(64, 64).with_octaves(2).with_sublevels(3);
        for level in schedule(&cfg) {
            assert!((level.time - 0.5 * level.sigma * level.sigma).abs() < 1e-5);
        }
    }

    #[test]
    fn test_single_level_ladder() {
        let cfg = KazeConfig::new(64, 64).with_octaves(1).with_sublevels(1);
        let levels = schedule(&cfg);

        assert_eq!(levels.len(), 2);
        assert_eq!(levels[1].octave, 1);
        assert!((levels[1].sigma - 3.2).abs() < 1e-6);
    }
}
