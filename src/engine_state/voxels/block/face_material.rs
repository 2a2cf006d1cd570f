//! # Face Material Module
//!
//! Face materials name a tile of the texture atlas. Every face of a given
//! material uses the same four atlas coordinates.

/// A tile of the texture atlas that can be applied to a voxel face.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FaceMaterial {
    GRASSTOP,
    GRASSSIDE,
    DIRT,
    WATER,
    STONE,
    SAND,
    GOLD,
    OBSIDIAN,
    REDSTONE,
    DIAMOND,
    NOCRACK,
    CRACK1,
    CRACK2,
    CRACK3,
    CRACK4,
    /// No tile. Only assigned to AIR, which is never meshed.
    AIR,
}

/// The four atlas coordinates of a tile.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UvRect {
    pub bottom_left: [f32; 2],
    pub bottom_right: [f32; 2],
    pub top_left: [f32; 2],
    pub top_right: [f32; 2],
}

impl UvRect {
    const fn new(
        bottom_left: [f32; 2],
        bottom_right: [f32; 2],
        top_left: [f32; 2],
        top_right: [f32; 2],
    ) -> Self {
        UvRect {
            bottom_left,
            bottom_right,
            top_left,
            top_right,
        }
    }

    /// The corners in the order faces are emitted:
    /// top-right, top-left, bottom-left, bottom-right.
    #[inline]
    pub fn face_order(&self) -> [[f32; 2]; 4] {
        [
            self.top_right,
            self.top_left,
            self.bottom_left,
            self.bottom_right,
        ]
    }
}

/// Atlas rectangles indexed by `FaceMaterial as usize`. `AIR` has none.
static FACE_MATERIAL_UVS: [UvRect; 15] = [
    UvRect::new([0.125, 0.375], [0.1875, 0.375], [0.125, 0.4375], [0.1875, 0.4375]), // GRASSTOP
    UvRect::new([0.1875, 0.9375], [0.25, 0.9375], [0.1875, 1.0], [0.25, 1.0]),       // GRASSSIDE
    UvRect::new([0.125, 0.9375], [0.1875, 0.9375], [0.125, 1.0], [0.1875, 1.0]),     // DIRT
    UvRect::new([0.875, 0.125], [0.9375, 0.125], [0.875, 0.1875], [0.9375, 0.1875]), // WATER
    UvRect::new([0.0, 0.875], [0.0625, 0.875], [0.0, 0.9375], [0.0625, 0.9375]),     // STONE
    UvRect::new([0.125, 0.875], [0.1875, 0.875], [0.125, 0.9375], [0.1875, 0.9375]), // SAND
    UvRect::new([0.0, 0.8125], [0.0625, 0.8125], [0.0, 0.875], [0.0625, 0.875]),     // GOLD
    UvRect::new([0.3125, 0.8125], [0.375, 0.8125], [0.3125, 0.875], [0.375, 0.875]), // OBSIDIAN
    UvRect::new([0.1875, 0.75], [0.25, 0.75], [0.1875, 0.8125], [0.25, 0.8125]),     // REDSTONE
    UvRect::new([0.125, 0.75], [0.1875, 0.75], [0.125, 0.8125], [0.1875, 0.8125]),   // DIAMOND
    UvRect::new([0.6875, 0.0], [0.75, 0.0], [0.6875, 0.0625], [0.75, 0.0625]),       // NOCRACK
    UvRect::new([0.0, 0.0], [0.0625, 0.0], [0.0, 0.0625], [0.0625, 0.0625]),         // CRACK1
    UvRect::new([0.0625, 0.0], [0.125, 0.0], [0.0625, 0.0625], [0.125, 0.0625]),     // CRACK2
    UvRect::new([0.125, 0.0], [0.1875, 0.0], [0.125, 0.0625], [0.1875, 0.0625]),     // CRACK3
    UvRect::new([0.1875, 0.0], [0.25, 0.0], [0.1875, 0.0625], [0.25, 0.0625]),       // CRACK4
];

impl FaceMaterial {
    /// The atlas rectangle for this material, or `None` for `AIR`.
    #[inline]
    pub fn uv_rect(self) -> Option<&'static UvRect> {
        FACE_MATERIAL_UVS.get(self as usize)
    }
}
