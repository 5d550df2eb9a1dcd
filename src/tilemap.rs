//! Row-major 2D grid shared by the height field and the color map.

use serde::{Deserialize, Serialize};

/// A width×height grid stored row by row.
///
/// Unlike a planet map this grid does not wrap: terrain patches have hard
/// edges, so out-of-range coordinates are a caller bug.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Tilemap<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }
}

impl<T> Tilemap<T> {
    /// Build a grid from row-major data. Returns `None` if the length
    /// does not match `width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Option<Self> {
        if data.len() != width * height {
            return None;
        }
        Some(Self { width, height, data })
    }

    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let idx = self.index(x, y);
        &mut self.data[idx]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw row-major slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Iterate over rows, top to bottom.
    pub fn rows(&self) -> std::slice::Chunks<'_, T> {
        self.data.chunks(self.width.max(1))
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx % width;
            let y = idx / width;
            (x, y, val)
        })
    }

    /// Build a new grid of the same shape by mapping every cell.
    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> Tilemap<U> {
        Tilemap {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_layout() {
        let mut map = Tilemap::new_with(3, 2, 0u8);
        map.set(2, 1, 7);
        assert_eq!(map.as_slice()[5], 7);
        assert_eq!(*map.get(2, 1), 7);
        assert_eq!(map.rows().count(), 2);
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        assert!(Tilemap::from_vec(2, 2, vec![0.0f32; 3]).is_none());
        assert!(Tilemap::from_vec(2, 2, vec![0.0f32; 4]).is_some());
    }

    #[test]
    fn test_iter_coordinates() {
        let map = Tilemap::from_vec(2, 2, vec![1, 2, 3, 4]).unwrap();
        let cells: Vec<_> = map.iter().map(|(x, y, v)| (x, y, *v)).collect();
        assert_eq!(cells, vec![(0, 0, 1), (1, 0, 2), (0, 1, 3), (1, 1, 4)]);
    }

    #[test]
    fn test_map_preserves_shape() {
        let map = Tilemap::new_with(4, 3, 2u32);
        let doubled = map.map(|v| v * 2);
        assert_eq!((doubled.width, doubled.height), (4, 3));
        assert!(doubled.as_slice().iter().all(|&v| v == 4));
    }
}
