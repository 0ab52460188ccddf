//! CPU/memory tier catalog
//!
//! Container apps are sized by picking one of sixteen fixed CPU/memory
//! combinations. Memory is always twice the CPU count, in GiB.

use serde::{Deserialize, Serialize};

/// Index of the tier new apps start with (1 CPU, 2 GiB).
pub const DEFAULT_TIER_INDEX: usize = 3;

/// One selectable CPU/memory combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTier {
    pub cpu_cores: f64,
    pub memory_gib: f64,
    pub label: String,
}

impl ResourceTier {
    fn new(cpu_cores: f64) -> Self {
        let memory_gib = cpu_cores * 2.0;
        Self {
            cpu_cores,
            memory_gib,
            label: format!("{} CPU cores, {} Gi memory", cpu_cores, memory_gib),
        }
    }
}

/// The full ordered tier list: 0.25 to 4.0 CPU cores in 0.25 steps.
pub fn tiers() -> Vec<ResourceTier> {
    (1..=16).map(|step| ResourceTier::new(step as f64 * 0.25)).collect()
}

/// Look up a tier by its catalog index.
pub fn tier(index: usize) -> Option<ResourceTier> {
    if index < 16 {
        Some(ResourceTier::new((index + 1) as f64 * 0.25))
    } else {
        None
    }
}

/// Tier for an index, falling back to the default tier for stale indices
/// (for example from a hand-edited state file).
pub fn tier_or_default(index: usize) -> ResourceTier {
    tier(index).unwrap_or_else(|| {
        tracing::warn!(
            "Tier index {} is out of range, using default tier {}",
            index,
            DEFAULT_TIER_INDEX
        );
        ResourceTier::new((DEFAULT_TIER_INDEX + 1) as f64 * 0.25)
    })
}

/// Named shortcut sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizePreset {
    pub key: &'static str,
    pub index: usize,
    pub label: &'static str,
}

pub const SIZE_PRESETS: [SizePreset; 5] = [
    SizePreset { key: "xs", index: 0, label: "XS (0.25 vCPU, 0.5 GB)" },
    SizePreset { key: "s", index: 1, label: "S (0.5 vCPU, 1 GB)" },
    SizePreset { key: "m", index: 3, label: "M (1 vCPU, 2 GB)" },
    SizePreset { key: "l", index: 7, label: "L (2 vCPU, 4 GB)" },
    SizePreset { key: "xl", index: 15, label: "XL (4 vCPU, 8 GB)" },
];

/// Resolve a size key (`xs`, `s`, `m`, `l`, `xl`) to a tier index.
pub fn size_preset(key: &str) -> Option<usize> {
    let key = key.to_ascii_lowercase();
    SIZE_PRESETS.iter().find(|p| p.key == key).map(|p| p.index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_list_shape() {
        let all = tiers();
        assert_eq!(all.len(), 16);
        assert_eq!(all[0].cpu_cores, 0.25);
        assert_eq!(all[0].memory_gib, 0.5);
        assert_eq!(all[15].cpu_cores, 4.0);
        assert_eq!(all[15].memory_gib, 8.0);
        for t in &all {
            assert_eq!(t.memory_gib, t.cpu_cores * 2.0);
        }
    }

    #[test]
    fn test_tier_labels() {
        assert_eq!(tier(3).unwrap().label, "1 CPU cores, 2 Gi memory");
        assert_eq!(tier(0).unwrap().label, "0.25 CPU cores, 0.5 Gi memory");
    }

    #[test]
    fn test_tier_out_of_range() {
        assert!(tier(16).is_none());
        assert_eq!(tier_or_default(99).cpu_cores, 1.0);
    }

    #[test]
    fn test_size_presets() {
        assert_eq!(size_preset("xs"), Some(0));
        assert_eq!(size_preset("M"), Some(3));
        assert_eq!(size_preset("xl"), Some(15));
        assert_eq!(size_preset("xxl"), None);
    }
}
