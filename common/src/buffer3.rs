use std::ops::{Deref, Index, IndexMut};
use std::slice;

/// Dense 3D grid stored x-fastest, then y, then z.
///
/// `index(x, y, z) = x + width * (y + height * z)`, which is the C-order
/// layout of a `(depth, height, width)` array.
#[derive(Debug, Clone, PartialEq)]
pub struct Buffer3<T> {
    voxels: Vec<T>,
    width: usize,
    height: usize,
    depth: usize,
}

impl<T> Buffer3<T> {
    pub fn new(width: usize, height: usize, depth: usize, voxels: Vec<T>) -> Self {
        assert_eq!(
            voxels.len(),
            width * height * depth,
            "voxels length must equal width * height * depth"
        );
        Self {
            voxels,
            width,
            height,
            depth,
        }
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < self.width && y < self.height && z < self.depth);
        x + self.width * (y + self.height * z)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> &T {
        &self.voxels[self.index(x, y, z)]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize, z: usize) -> &mut T {
        let idx = self.index(x, y, z);
        &mut self.voxels[idx]
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of voxels in one XY slice.
    #[inline]
    pub fn slice_len(&self) -> usize {
        self.width * self.height
    }

    /// Row-major XY slice at depth `z`.
    #[inline]
    pub fn slice(&self, z: usize) -> &[T] {
        let len = self.slice_len();
        &self.voxels[z * len..(z + 1) * len]
    }

    #[inline]
    pub fn slice_mut(&mut self, z: usize) -> &mut [T] {
        let len = self.slice_len();
        &mut self.voxels[z * len..(z + 1) * len]
    }

    /// Iterator over XY slices in increasing z.
    #[inline]
    pub fn slices(&self) -> slice::ChunksExact<'_, T> {
        self.voxels.chunks_exact(self.slice_len().max(1))
    }

    /// Mutable XY slices; each chunk is disjoint, so they can be handed to
    /// separate worker threads.
    #[inline]
    pub fn slices_mut(&mut self) -> slice::ChunksExactMut<'_, T> {
        let len = self.slice_len().max(1);
        self.voxels.chunks_exact_mut(len)
    }

    #[inline]
    pub fn voxels(&self) -> &[T] {
        &self.voxels
    }

    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.voxels
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.voxels.iter()
    }
}

impl<T: Default + Clone> Buffer3<T> {
    pub fn new_default(width: usize, height: usize, depth: usize) -> Self {
        Self {
            voxels: vec![T::default(); width * height * depth],
            width,
            height,
            depth,
        }
    }
}

impl<T: Copy> Buffer3<T> {
    /// Map every voxel into a new grid of the same shape.
    pub fn map<U, F: FnMut(T) -> U>(&self, f: F) -> Buffer3<U> {
        Buffer3 {
            voxels: self.voxels.iter().copied().map(f).collect(),
            width: self.width,
            height: self.height,
            depth: self.depth,
        }
    }
}

impl<T> Index<(usize, usize, usize)> for Buffer3<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y, z): (usize, usize, usize)) -> &Self::Output {
        &self.voxels[x + self.width * (y + self.height * z)]
    }
}

impl<T> IndexMut<(usize, usize, usize)> for Buffer3<T> {
    #[inline]
    fn index_mut(&mut self, (x, y, z): (usize, usize, usize)) -> &mut Self::Output {
        &mut self.voxels[x + self.width * (y + self.height * z)]
    }
}

impl<T> Deref for Buffer3<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.voxels
    }
}

impl<'a, T> IntoIterator for &'a Buffer3<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.voxels.iter()
    }
}
