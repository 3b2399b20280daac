use crate::decoder::AddressLayout;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CacheHit {
    Hit,
    /// `prev` is the tag that was resident at the index, `None` for a cold miss.
    Miss { prev: Option<u64> },
}

impl CacheHit {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheHit::Hit)
    }
}

impl std::fmt::Display for CacheHit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheHit::Hit => f.write_str("HIT"),
            CacheHit::Miss { .. } => f.write_str("MISS"),
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct CacheLine {
    pub valid: bool,
    pub tag: u64,
}

/// One direct-mapped cache: every index addresses exactly one line.
///
/// The index field of an address is a direct offset into `lines`, so there is
/// never a choice of victim. Installing into an occupied line simply
/// overwrites it.
#[derive(Debug, Clone)]
pub struct DirectMappedCache {
    lines: Vec<CacheLine>,
}

impl DirectMappedCache {
    pub fn new(layout: &AddressLayout) -> Self {
        Self::with_lines(layout.lines() as usize)
    }

    pub fn with_lines(lines: usize) -> Self {
        Self {
            lines: vec![CacheLine::default(); lines],
        }
    }

    pub fn reset(&mut self) {
        self.lines.fill(CacheLine::default());
    }

    pub fn lines(&self) -> &[CacheLine] {
        &self.lines
    }

    pub fn lookup(&self, index: u64, tag: u64) -> CacheHit {
        debug_assert!(
            (index as usize) < self.lines.len(),
            "index {index} out of range for {} lines",
            self.lines.len()
        );
        match self.lines.get(index as usize) {
            Some(line) if line.valid && line.tag == tag => CacheHit::Hit,
            Some(line) if line.valid => CacheHit::Miss {
                prev: Some(line.tag),
            },
            _ => CacheHit::Miss { prev: None },
        }
    }

    /// Makes `tag` the resident of line `index`, replacing any previous occupant.
    ///
    /// # Panics
    ///
    /// If `index` is not smaller than the number of lines. A decoded index is
    /// always in range.
    pub fn install(&mut self, index: u64, tag: u64) {
        self.lines[index as usize] = CacheLine { valid: true, tag };
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn starts_invalid() {
        let cache = DirectMappedCache::with_lines(4);
        assert!(cache.lines().iter().all(|line| !line.valid));
        for index in 0..4 {
            assert_eq!(cache.lookup(index, 0), CacheHit::Miss { prev: None });
        }
    }

    #[test]
    fn lookup_does_not_install() {
        let cache = DirectMappedCache::with_lines(2);
        _ = cache.lookup(1, 7);
        assert_eq!(cache.lookup(1, 7), CacheHit::Miss { prev: None });
    }

    #[test]
    fn install_overwrites() {
        let mut cache = DirectMappedCache::with_lines(4);

        cache.install(2, 5);
        assert_eq!(cache.lookup(2, 5), CacheHit::Hit);
        assert_eq!(cache.lookup(2, 6), CacheHit::Miss { prev: Some(5) });

        cache.install(2, 6);
        assert_eq!(cache.lookup(2, 6), CacheHit::Hit);
        assert_eq!(cache.lookup(2, 5), CacheHit::Miss { prev: Some(6) });
        assert_eq!(cache.lines()[2], CacheLine { valid: true, tag: 6 });

        // other lines untouched
        assert_eq!(cache.lookup(1, 5), CacheHit::Miss { prev: None });
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "out of range")]
    fn lookup_out_of_range() {
        let cache = DirectMappedCache::with_lines(4);
        _ = cache.lookup(4, 0);
    }

    #[test]
    fn reset() {
        let mut cache = DirectMappedCache::with_lines(4);
        cache.install(0, 1);
        cache.install(3, 1);
        cache.reset();

        assert_eq!(cache.lines().len(), 4);
        assert!(cache.lines().iter().all(|line| *line == CacheLine::default()));
    }
}
