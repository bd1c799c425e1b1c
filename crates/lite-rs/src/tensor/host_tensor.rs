//! Host-backed tensor stored in a [`Scope`](crate::scope::Scope).

use super::shape::Shape;
use crate::error::{LiteError, LiteResult};

/// Shape metadata plus an `f32` buffer.
///
/// Shape and storage are decoupled: [`Tensor::resize`] only rewrites the
/// shape, and the buffer is brought in line with it when a kernel asks for
/// writable data.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Shape,
    data: Vec<f32>,
}

impl Default for Tensor {
    fn default() -> Self {
        Tensor::declared()
    }
}

impl Tensor {
    /// A tensor with no shape or storage yet.
    pub fn declared() -> Self {
        Tensor {
            shape: Shape::empty(),
            data: Vec::new(),
        }
    }

    /// Constructs a tensor from raw values, validating the length against the shape.
    pub fn from_vec(shape: Shape, data: Vec<f32>) -> LiteResult<Self> {
        if data.len() != shape.num_elements() {
            return Err(LiteError::ElementCount {
                expected: shape.num_elements(),
                found: data.len(),
            });
        }
        Ok(Tensor { shape, data })
    }

    /// Returns a zero-initialized tensor of the requested shape.
    pub fn zeros(shape: Shape) -> Self {
        let data = vec![0.0; shape.num_elements()];
        Tensor { shape, data }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Number of elements implied by the current shape.
    pub fn numel(&self) -> usize {
        self.shape.num_elements()
    }

    /// Byte length of the storage currently held, which may lag behind the shape.
    pub fn byte_len(&self) -> usize {
        self.data.len() * std::mem::size_of::<f32>()
    }

    /// Whether the storage matches the current shape.
    pub fn is_allocated(&self) -> bool {
        self.data.len() == self.numel()
    }

    /// Rewrites the shape without touching the storage.
    pub fn resize(&mut self, shape: Shape) {
        self.shape = shape;
    }

    /// Resizes the storage to match the shape, zero-filling new elements.
    pub fn allocate(&mut self) {
        let numel = self.numel();
        self.data.resize(numel, 0.0);
    }

    /// Copies the payload out. Fails while the storage lags behind the shape.
    pub fn to_f32_vec(&self) -> LiteResult<Vec<f32>> {
        if !self.is_allocated() {
            return Err(LiteError::ElementCount {
                expected: self.numel(),
                found: self.data.len(),
            });
        }
        Ok(self.data.clone())
    }

    /// Overwrites the payload with `values`, allocating storage for the current shape.
    pub fn write_f32(&mut self, values: &[f32]) -> LiteResult<()> {
        if values.len() != self.numel() {
            return Err(LiteError::ElementCount {
                expected: self.numel(),
                found: values.len(),
            });
        }
        self.allocate();
        self.data.copy_from_slice(values);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_leaves_storage_alone() {
        let mut tensor = Tensor::zeros(Shape::new([2, 2]));
        tensor.resize(Shape::new([3, 3]));
        assert_eq!(tensor.numel(), 9);
        assert_eq!(tensor.byte_len(), 16);
        assert!(!tensor.is_allocated());
        assert!(tensor.to_f32_vec().is_err());
    }

    #[test]
    fn write_allocates_for_current_shape() {
        let mut tensor = Tensor::declared();
        tensor.resize(Shape::new([3]));
        tensor.write_f32(&[1.0, 2.0, 3.0]).unwrap();
        assert!(tensor.is_allocated());
        assert_eq!(tensor.to_f32_vec().unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn from_vec_checks_length() {
        let err = Tensor::from_vec(Shape::new([2, 3]), vec![0.0; 5]).unwrap_err();
        assert!(matches!(
            err,
            LiteError::ElementCount {
                expected: 6,
                found: 5
            }
        ));
    }

    #[test]
    fn write_rejects_wrong_length() {
        let mut tensor = Tensor::zeros(Shape::new([2]));
        assert!(matches!(
            tensor.write_f32(&[1.0]),
            Err(LiteError::ElementCount {
                expected: 2,
                found: 1
            })
        ));
    }
}
