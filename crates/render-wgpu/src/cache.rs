use std::collections::HashMap;
use towerscape_scene::{GeometryId, Released};

/// Cache key: a geometry tessellated solid or as wireframe.
pub type MeshKey = (GeometryId, bool);

/// Per-geometry mesh bookkeeping, independent of the GPU handle type.
///
/// Eviction hands the removed meshes back so the caller can free them.
#[derive(Debug)]
pub struct MeshCache<M> {
    meshes: HashMap<MeshKey, M>,
}

impl<M> Default for MeshCache<M> {
    fn default() -> Self {
        Self {
            meshes: HashMap::new(),
        }
    }
}

impl<M> MeshCache<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn contains(&self, key: &MeshKey) -> bool {
        self.meshes.contains_key(key)
    }

    pub fn get(&self, key: &MeshKey) -> Option<&M> {
        self.meshes.get(key)
    }

    pub fn insert(&mut self, key: MeshKey, mesh: M) {
        self.meshes.insert(key, mesh);
    }

    /// Remove both variants of every released geometry.
    pub fn evict_released(&mut self, released: &[Released]) -> Vec<M> {
        let mut evicted = Vec::new();
        for entry in released {
            if let Released::Geometry(id) = entry {
                for wireframe in [false, true] {
                    evicted.extend(self.meshes.remove(&(*id, wireframe)));
                }
            }
        }
        evicted
    }

    /// Remove every mesh whose geometry is no longer alive.
    ///
    /// Used when the scene collapsed its release queue and individual ids
    /// were lost.
    pub fn evict_dead(&mut self, mut alive: impl FnMut(GeometryId) -> bool) -> Vec<M> {
        let dead: Vec<MeshKey> = self
            .meshes
            .keys()
            .filter(|(id, _)| !alive(*id))
            .copied()
            .collect();
        dead.iter()
            .filter_map(|key| self.meshes.remove(key))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use towerscape_scene::MaterialId;

    #[test]
    fn release_evicts_both_variants() {
        let mut cache = MeshCache::new();
        cache.insert((GeometryId(1), false), "solid");
        cache.insert((GeometryId(1), true), "wire");
        cache.insert((GeometryId(2), false), "other");

        let mut evicted = cache.evict_released(&[
            Released::Geometry(GeometryId(1)),
            Released::Material(MaterialId(9)),
        ]);
        evicted.sort();
        assert_eq!(evicted, vec!["solid", "wire"]);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&(GeometryId(2), false)));
    }

    #[test]
    fn release_of_uncached_geometry_is_noop() {
        let mut cache: MeshCache<u32> = MeshCache::new();
        cache.insert((GeometryId(3), true), 7);
        assert!(cache.evict_released(&[Released::Geometry(GeometryId(4))]).is_empty());
        assert_eq!(cache.get(&(GeometryId(3), true)), Some(&7));
    }

    #[test]
    fn dead_sweep_keeps_live_geometry() {
        let mut cache = MeshCache::new();
        for id in 1..=4 {
            cache.insert((GeometryId(id), id % 2 == 0), id);
        }
        let mut evicted = cache.evict_dead(|id| id.0 >= 3);
        evicted.sort();
        assert_eq!(evicted, vec![1, 2]);
        assert_eq!(cache.len(), 2);
        assert!(!cache.is_empty());
    }
}
