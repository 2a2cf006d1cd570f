use crate::engine_state::voxels::block::{block_side::BlockSide, face_material::UvRect};

/// Corners of a unit cube centred on the origin.
///
/// ```text
///      7 ---- 6
///     /|     /|
///    4 ---- 5 |     y
///    | 3 ---|-2     | z
///    |/     |/      |/
///    0 ---- 1       +--- x   (0 and 1 sit on the +z side)
/// ```
const CUBE_CORNERS: [[f32; 3]; 8] = [
    [-0.5, -0.5, 0.5],
    [0.5, -0.5, 0.5],
    [0.5, -0.5, -0.5],
    [-0.5, -0.5, -0.5],
    [-0.5, 0.5, 0.5],
    [0.5, 0.5, 0.5],
    [0.5, 0.5, -0.5],
    [-0.5, 0.5, -0.5],
];

/// The two triangles of a quad, in local vertex numbering.
const QUAD_INDICES: [u32; 6] = [3, 1, 0, 3, 2, 1];

/// Vertices emitted per visible face.
pub const VERTICES_PER_FACE: usize = 4;
/// Indices emitted per visible face.
pub const INDICES_PER_FACE: usize = QUAD_INDICES.len();

/// Which cube corners make up each face, in emission order.
fn face_corners(side: BlockSide) -> [usize; 4] {
    match side {
        BlockSide::FORWARD => [4, 5, 1, 0],
        BlockSide::BACK => [6, 7, 3, 2],
        BlockSide::LEFT => [7, 4, 0, 3],
        BlockSide::RIGHT => [5, 6, 2, 1],
        BlockSide::UP => [7, 6, 5, 4],
        BlockSide::DOWN => [0, 1, 2, 3],
    }
}

/// The geometry of one visible voxel face.
///
/// UVs line up with the corners as top-right, top-left, bottom-left,
/// bottom-right, which together with the fixed triangle pair keeps every
/// face's texture upright.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceQuad {
    pub positions: [[f32; 3]; 4],
    pub normal: [f32; 3],
    pub uvs: [[f32; 2]; 4],
    pub indices: [u32; 6],
}

impl FaceQuad {
    /// Builds the quad for one face of a voxel.
    ///
    /// # Arguments
    /// * `side` - Which face to emit
    /// * `centre` - Absolute position of the voxel centre
    /// * `uv` - Atlas rectangle of the face material
    /// * `face_counter` - How many faces this voxel has already emitted; shifts
    ///   the indices past the earlier faces' vertices
    pub fn new(side: BlockSide, centre: [f32; 3], uv: &UvRect, face_counter: u32) -> Self {
        let positions = face_corners(side).map(|corner| {
            let offset = CUBE_CORNERS[corner];
            [
                centre[0] + offset[0],
                centre[1] + offset[1],
                centre[2] + offset[2],
            ]
        });
        let base = face_counter * VERTICES_PER_FACE as u32;

        FaceQuad {
            positions,
            normal: side.normal(),
            uvs: uv.face_order(),
            indices: QUAD_INDICES.map(|index| index + base),
        }
    }
}
