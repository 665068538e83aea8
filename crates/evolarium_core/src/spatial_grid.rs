/// Largest number of cells along one axis.
pub const MAX_GRID_DIM: usize = 256;

const EMPTY: u32 = u32::MAX;

#[derive(Clone, Debug)]
/// Uniform toroidal grid over entity slot indices.
///
/// Each cell holds an intrusive singly-linked list threaded through `next`,
/// one link per store slot. The grid is thrown away and rebuilt from the
/// store's columns before every use, so it never carries entries from a
/// previous step and needs no removal logic.
///
/// # Performance Characteristics
/// - Rebuild: O(capacity) with no allocation once `next` has grown to capacity
/// - Neighbor query: O(entities in the 3x3 block around the query cell)
///
/// # Implementation Notes
/// - `dim = min(ceil(world_size / cell_size), MAX_GRID_DIM)` on both axes; when
///   capped, cells grow to `world_size / dim`
/// - Cell coordinates wrap, so an entity on the edge still sees 8 neighbors
/// - Queries never widen beyond one cell ring. Matches farther than one cell
///   are missed when a sense radius exceeds the cell edge
///
/// # Examples
/// ```
/// use evolarium_core::spatial_grid::SpatialGrid;
///
/// let xs = [15.0, 25.0, 985.0];
/// let ys = [15.0, 25.0, 985.0];
/// let active = [true, true, true];
/// let mut grid = SpatialGrid::new(1000.0, 10.0, 3);
/// grid.rebuild(&xs, &ys, &active);
///
/// let mut nearby = Vec::new();
/// grid.for_each_neighbor(15.0, 15.0, |idx| nearby.push(idx));
/// assert_eq!(nearby, vec![0, 1]);
/// ```
pub struct SpatialGrid {
    world_size: f64,
    dim: usize,
    inv_cell: f64,
    head: Vec<u32>,
    next: Vec<u32>,
}

impl SpatialGrid {
    /// Creates an empty grid sized for `capacity` slots.
    #[must_use]
    pub fn new(world_size: f64, cell_size: f64, capacity: usize) -> Self {
        let mut grid = Self {
            world_size: 1.0,
            dim: 1,
            inv_cell: 1.0,
            head: vec![EMPTY],
            next: vec![EMPTY; capacity],
        };
        grid.resize(world_size, cell_size);
        grid
    }

    /// Recomputes the cell layout. Call when the world or cell size changes;
    /// contents are discarded.
    pub fn resize(&mut self, world_size: f64, cell_size: f64) {
        let world_size = if world_size.is_finite() && world_size > 0.0 {
            world_size
        } else {
            1.0
        };
        let wanted = if cell_size.is_finite() && cell_size > 0.0 {
            (world_size / cell_size).ceil() as usize
        } else {
            1
        };
        self.world_size = world_size;
        self.dim = wanted.clamp(1, MAX_GRID_DIM);
        self.inv_cell = self.dim as f64 / world_size;
        self.head.clear();
        self.head.resize(self.dim * self.dim, EMPTY);
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Effective cell edge after capping.
    #[must_use]
    pub fn cell_edge(&self) -> f64 {
        self.world_size / self.dim as f64
    }

    #[must_use]
    pub fn world_size(&self) -> f64 {
        self.world_size
    }

    #[inline]
    #[must_use]
    pub fn cell_coords(&self, x: f64, y: f64) -> (usize, usize) {
        // Float-to-int casts saturate and map NaN to 0.
        let cx = ((x * self.inv_cell) as usize).min(self.dim - 1);
        let cy = ((y * self.inv_cell) as usize).min(self.dim - 1);
        (cx, cy)
    }

    #[inline]
    #[must_use]
    pub fn cell_index(&self, x: f64, y: f64) -> usize {
        let (cx, cy) = self.cell_coords(x, y);
        cy * self.dim + cx
    }

    /// Rebuilds every cell list from the given columns. Inactive slots are
    /// skipped.
    pub fn rebuild(&mut self, xs: &[f64], ys: &[f64], active: &[bool]) {
        let n = xs.len().min(ys.len()).min(active.len());
        if self.next.len() < n {
            self.next.resize(n, EMPTY);
        }
        self.head.fill(EMPTY);
        // Walk backwards so each cell list reads in ascending slot order.
        for idx in (0..n).rev() {
            if !active[idx] {
                continue;
            }
            let cell = self.cell_index(xs[idx], ys[idx]);
            self.next[idx] = self.head[cell];
            self.head[cell] = idx as u32;
        }
    }

    /// Drops every entry without changing the layout.
    pub fn clear(&mut self) {
        self.head.fill(EMPTY);
    }

    #[inline]
    fn walk<F: FnMut(usize)>(&self, cell: usize, f: &mut F) {
        let mut cursor = self.head[cell];
        while cursor != EMPTY {
            let idx = cursor as usize;
            f(idx);
            cursor = self.next[idx];
        }
    }

    /// Visits every slot in the cell containing `(x, y)`.
    #[inline]
    pub fn for_each_in_cell<F: FnMut(usize)>(&self, x: f64, y: f64, mut f: F) {
        let cell = self.cell_index(x, y);
        self.walk(cell, &mut f);
    }

    /// Visits every slot in the 3x3 block of cells around `(x, y)`, wrapping
    /// at the edges. Each cell is visited once even on grids narrower than 3.
    pub fn for_each_neighbor<F: FnMut(usize)>(&self, x: f64, y: f64, mut f: F) {
        let (cx, cy) = self.cell_coords(x, y);
        let (cols, ncols) = ring(cx, self.dim);
        let (rows, nrows) = ring(cy, self.dim);
        for &row in &rows[..nrows] {
            for &col in &cols[..ncols] {
                self.walk(row * self.dim + col, &mut f);
            }
        }
    }

    #[must_use]
    pub fn count_neighbors(&self, x: f64, y: f64) -> usize {
        let mut count = 0;
        self.for_each_neighbor(x, y, |_| count += 1);
        count
    }
}

/// The distinct coordinates `c - 1, c, c + 1` modulo `dim`.
#[inline]
fn ring(c: usize, dim: usize) -> ([usize; 3], usize) {
    match dim {
        1 => ([0, 0, 0], 1),
        2 => ([0, 1, 0], 2),
        _ => ([(c + dim - 1) % dim, c, (c + 1) % dim], 3),
    }
}
