//! CPU-side vectors mirrored lazily into wgpu buffers.

use crate::context::Context;
use bytemuck::{Pod, Zeroable};

/// Type of gpu buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferType {
    /// A vertex buffer.
    Array,
    /// An index buffer.
    ElementArray,
}

impl BufferType {
    #[inline]
    pub fn to_wgpu(self) -> wgpu::BufferUsages {
        match self {
            BufferType::Array => wgpu::BufferUsages::VERTEX,
            BufferType::ElementArray => wgpu::BufferUsages::INDEX,
        }
    }
}

/// A vector kept on the RAM and uploaded to the GPU on first use.
///
/// Creating a `GpuVec` never touches the device, so meshes can be built
/// before a window exists. The buffer is (re)created by
/// [`GpuVec::load_to_gpu`] whenever the data changed since the last upload.
pub struct GpuVec<T: Pod + Zeroable> {
    data: Vec<T>,
    usage: wgpu::BufferUsages,
    buffer: Option<wgpu::Buffer>,
    dirty: bool,
}

impl<T: Pod + Zeroable> GpuVec<T> {
    pub fn new(data: Vec<T>, buf_type: BufferType) -> GpuVec<T> {
        GpuVec {
            data,
            usage: buf_type.to_wgpu() | wgpu::BufferUsages::COPY_DST,
            buffer: None,
            dirty: true,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Mutably accesses the data, marking it for re-upload.
    #[inline]
    pub fn data_mut(&mut self) -> &mut Vec<T> {
        self.dirty = true;
        &mut self.data
    }

    /// Whether a buffer was created for this vector.
    #[inline]
    pub fn is_on_gpu(&self) -> bool {
        self.buffer.is_some()
    }

    /// Whether the RAM copy changed since the last upload.
    #[inline]
    pub fn dirty(&self) -> bool {
        self.dirty
    }

    /// Uploads the data if it changed since the last call.
    ///
    /// Empty vectors never get a buffer.
    pub fn load_to_gpu(&mut self) {
        if !self.dirty || self.data.is_empty() {
            return;
        }

        let ctxt = Context::get();
        let bytes: &[u8] = bytemuck::cast_slice(&self.data);

        match self.buffer {
            Some(ref buffer) if buffer.size() >= bytes.len() as u64 => {
                ctxt.write_buffer(buffer, 0, bytes);
            }
            _ => {
                self.buffer = Some(ctxt.create_buffer_init(Some("gpu_vec"), bytes, self.usage));
            }
        }

        self.dirty = false;
    }

    /// Uploads the data if needed and returns the buffer.
    ///
    /// Returns `None` if the vector is empty.
    #[inline]
    pub fn ensure_on_gpu(&mut self) -> Option<&wgpu::Buffer> {
        self.load_to_gpu();
        self.buffer.as_ref()
    }

    /// Drops the GPU buffer, keeping the RAM copy.
    pub fn unload_from_gpu(&mut self) {
        self.buffer = None;
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_vectors_wait_for_their_first_upload() {
        let v = GpuVec::new(vec![1u32, 2, 3], BufferType::ElementArray);
        assert_eq!(v.len(), 3);
        assert!(v.dirty());
        assert!(!v.is_on_gpu());
    }

    #[test]
    fn mutable_access_marks_the_vector_dirty() {
        let mut v = GpuVec::new(vec![0.0f32; 4], BufferType::Array);
        v.unload_from_gpu();
        v.data_mut().push(1.0);
        assert!(v.dirty());
        assert_eq!(v.data().len(), 5);
    }

    #[test]
    fn index_vectors_are_bindable_as_indices() {
        let v = GpuVec::<u32>::new(Vec::new(), BufferType::ElementArray);
        assert!(v.usage.contains(wgpu::BufferUsages::INDEX));
        assert!(v.is_empty());
    }
}
