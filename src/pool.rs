use crate::geometry::Cell;
use crate::light::Light;
use crate::moves::CellMoves;
use crate::propagation::SightMaps;
use rustc_hash::FxHashMap;

/// Per-cell arrays backing one [`crate::state::State`].
#[derive(Clone, Debug)]
pub struct Buffers {
    pub(crate) cells: Vec<Cell>,
    pub(crate) light: Vec<Light>,
    pub(crate) reach: Vec<Light>,
    pub(crate) sights: SightMaps,
    pub(crate) moves: Vec<Option<CellMoves>>,
}

impl Buffers {
    fn new(len: usize) -> Self {
        Self {
            cells: vec![Cell::Empty; len],
            light: vec![Light::EMPTY; len],
            reach: vec![Light::EMPTY; len],
            sights: std::array::from_fn(|_| vec![None; len]),
            moves: vec![None; len],
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Loads a fresh board: `cells` as given, every derived map cleared.
    pub(crate) fn reset(&mut self, cells: &[Cell]) {
        self.cells.copy_from_slice(cells);
        self.light.fill(Light::EMPTY);
        self.reach.fill(Light::EMPTY);
        for sights in &mut self.sights {
            sights.fill(None);
        }
        self.moves.fill(None);
    }

    pub(crate) fn copy_from(&mut self, other: &Buffers) {
        self.cells.copy_from_slice(&other.cells);
        self.light.copy_from_slice(&other.light);
        self.reach.copy_from_slice(&other.reach);
        for (dst, src) in self.sights.iter_mut().zip(&other.sights) {
            dst.copy_from_slice(src);
        }
        self.moves.copy_from_slice(&other.moves);
    }
}

/// Free list of [`Buffers`], keyed by cell count.
///
/// The search creates and drops thousands of same-sized states; buffers handed
/// back through [`BufferPool::release`] are reused instead of reallocated.
/// Acquired buffers have unspecified contents.
#[derive(Default)]
pub struct BufferPool {
    free: FxHashMap<usize, Vec<Buffers>>,
    allocated: usize,
    reused: usize,
}

impl BufferPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&mut self, len: usize) -> Buffers {
        match self.free.get_mut(&len).and_then(|list| list.pop()) {
            Some(buffers) => {
                self.reused += 1;
                buffers
            }
            None => {
                self.allocated += 1;
                Buffers::new(len)
            }
        }
    }

    pub fn release(&mut self, buffers: Buffers) {
        self.free.entry(buffers.len()).or_default().push(buffers);
    }

    /// Number of buffers created so far.
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    /// Number of acquisitions served from the free list.
    pub fn reused(&self) -> usize {
        self.reused
    }

    pub fn idle(&self, len: usize) -> usize {
        self.free.get(&len).map_or(0, Vec::len)
    }
}
