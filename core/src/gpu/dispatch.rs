//! Dispatch geometry: how many workgroups cover a resource.

/// A 3-D extent in elements (texels, array items, or workgroups).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent3 {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl Extent3 {
    pub const fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// A one-dimensional extent.
    pub const fn linear(len: u32) -> Self {
        Self::new(len, 1, 1)
    }

    /// A two-dimensional extent.
    pub const fn planar(width: u32, height: u32) -> Self {
        Self::new(width, height, 1)
    }

    pub fn volume(&self) -> u64 {
        self.width as u64 * self.height as u64 * self.depth as u64
    }

    pub fn to_array(self) -> [u32; 3] {
        [self.width, self.height, self.depth]
    }
}

impl From<Extent3> for wgpu::Extent3d {
    fn from(e: Extent3) -> Self {
        wgpu::Extent3d {
            width: e.width,
            height: e.height,
            depth_or_array_layers: e.depth,
        }
    }
}

/// Workgroup size and workgroup count for one compute dispatch.
///
/// Computed once when a sample initializes and reused unchanged for every
/// frame. `group_count * group_size` covers the resource in every dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchGeometry {
    group_size: Extent3,
    group_count: Extent3,
}

/// Number of groups of `group` elements needed to cover `extent` elements.
pub fn groups_needed(extent: u32, group: u32) -> u32 {
    extent.div_ceil(group.max(1))
}

impl DispatchGeometry {
    /// Tight cover of `extent` with groups of `group_size`, per dimension.
    pub fn covering(extent: Extent3, group_size: Extent3) -> Self {
        Self {
            group_size,
            group_count: Extent3::new(
                groups_needed(extent.width, group_size.width),
                groups_needed(extent.height, group_size.height),
                groups_needed(extent.depth, group_size.depth),
            ),
        }
    }

    /// Cover `len` array elements with one-dimensional groups of `group_width`.
    ///
    /// Devices cap the group count per dimension, so long arrays are folded
    /// into rows of at most `max_groups_per_dim` groups. Kernels recover the
    /// flat index as `x + y * group_count.width * group_width`.
    pub fn linear(len: u32, group_width: u32, max_groups_per_dim: u32) -> Self {
        let group_size = Extent3::linear(group_width.max(1));
        let total = groups_needed(len, group_size.width);
        let max = max_groups_per_dim.max(1);
        let group_count = if total <= max {
            Extent3::linear(total)
        } else {
            Extent3::planar(max, groups_needed(total, max))
        };
        Self {
            group_size,
            group_count,
        }
    }

    pub fn group_size(&self) -> Extent3 {
        self.group_size
    }

    pub fn group_count(&self) -> Extent3 {
        self.group_count
    }

    /// Total number of kernel invocations launched by the dispatch.
    pub fn invocations(&self) -> u64 {
        self.group_size.volume() * self.group_count.volume()
    }

    /// Invocation grid extent (group count times group size).
    pub fn grid(&self) -> Extent3 {
        Extent3::new(
            self.group_count.width * self.group_size.width,
            self.group_count.height * self.group_size.height,
            self.group_count.depth * self.group_size.depth,
        )
    }

    /// Whether the invocation grid reaches every element of `extent`.
    pub fn covers(&self, extent: Extent3) -> bool {
        let grid = self.grid();
        grid.width >= extent.width && grid.height >= extent.height && grid.depth >= extent.depth
    }

    /// Flat element index for an invocation of a [`DispatchGeometry::linear`] dispatch.
    pub fn linear_index(&self, invocation: [u32; 3]) -> u64 {
        let row = self.group_count.width as u64 * self.group_size.width as u64;
        invocation[0] as u64 + invocation[1] as u64 * row
    }

    /// Encode this dispatch into a compute pass.
    pub fn dispatch(&self, pass: &mut wgpu::ComputePass<'_>) {
        let [x, y, z] = self.group_count.to_array();
        pass.dispatch_workgroups(x, y, z);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUP_16: Extent3 = Extent3::planar(16, 16);

    #[test]
    fn test_small_image_single_group() {
        let geometry = DispatchGeometry::covering(Extent3::planar(4, 4), GROUP_16);
        assert_eq!(geometry.group_count(), Extent3::new(1, 1, 1));
    }

    #[test]
    fn test_exact_multiple() {
        let geometry = DispatchGeometry::covering(Extent3::planar(64, 48), GROUP_16);
        assert_eq!(geometry.group_count(), Extent3::new(4, 3, 1));
        assert_eq!(geometry.invocations(), 64 * 48);
    }

    #[test]
    fn test_partial_group_rounds_up() {
        let geometry = DispatchGeometry::covering(Extent3::planar(65, 17), GROUP_16);
        assert_eq!(geometry.group_count(), Extent3::new(5, 2, 1));
    }

    #[test]
    fn test_zero_extent_dispatches_nothing() {
        let geometry = DispatchGeometry::covering(Extent3::planar(0, 8), GROUP_16);
        assert_eq!(geometry.group_count().width, 0);
        assert_eq!(geometry.invocations(), 0);
    }

    #[test]
    fn test_ceiling_division_is_tight() {
        for w in 1..=70u32 {
            for h in [1u32, 5, 16, 31, 33, 48] {
                for (gx, gy) in [(1u32, 1u32), (8, 8), (16, 16), (32, 4), (7, 3)] {
                    let g = DispatchGeometry::covering(
                        Extent3::planar(w, h),
                        Extent3::planar(gx, gy),
                    );
                    let c = g.group_count();
                    assert!(c.width * gx >= w && c.height * gy >= h);
                    assert!((c.width - 1) * gx < w, "w={w} gx={gx}");
                    assert!((c.height - 1) * gy < h, "h={h} gy={gy}");
                    assert!(g.covers(Extent3::planar(w, h)));
                }
            }
        }
    }

    #[test]
    fn test_linear_fits_in_one_row() {
        let geometry = DispatchGeometry::linear(1000, 256, 65535);
        assert_eq!(geometry.group_count(), Extent3::linear(4));
        assert_eq!(geometry.linear_index([999, 0, 0]), 999);
    }

    #[test]
    fn test_linear_folds_long_arrays() {
        let len = 1u32 << 24;
        let geometry = DispatchGeometry::linear(len, 256, 65535);
        let count = geometry.group_count();
        assert_eq!(count.width, 65535);
        assert_eq!(count.height, 2);
        assert!(geometry.invocations() >= len as u64);
        assert_eq!(geometry.linear_index([5, 1, 0]), 65535 * 256 + 5);
    }
}
