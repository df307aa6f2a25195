//! Procedural mesh generators for benchmarks and testing.
//!
//! These generators produce deterministic, resolution-configurable meshes
//! with consistent orientation: quad grids face +Z and every generated
//! tetrahedron has positive signed volume.

use medsim_math::{signed_tetrahedron_volume, DVec3};

use crate::mesh::{LineMesh, SurfaceMesh, TetrahedralMesh};

/// Generates a straight polyline of `vertex_count` vertices.
///
/// Vertex `i` sits at `origin + i * spacing * direction.normalize()`;
/// segment `i` joins vertices `i` and `i + 1`.
///
/// # Example
/// ```
/// use medsim_math::DVec3;
/// use medsim_mesh::generators::line_strand;
/// let strand = line_strand(3, 0.5, DVec3::ZERO, DVec3::X);
/// assert_eq!(strand.cell_count(), 2);
/// ```
pub fn line_strand(vertex_count: usize, spacing: f64, origin: DVec3, direction: DVec3) -> LineMesh {
    let dir = direction.normalize_or_zero();
    let positions = (0..vertex_count)
        .map(|i| origin + dir * (i as f64 * spacing))
        .collect();
    let cells = (1..vertex_count).map(|i| [i - 1, i]).collect();
    LineMesh::from_raw(positions, cells)
}

/// Generates a flat rectangular quad grid in the XY plane.
///
/// The grid spans `[-width/2, width/2]` in X and `[-height/2, height/2]` in Y,
/// centered at the origin at Z=0. Row 0 is the top edge (+Y).
///
/// # Arguments
/// - `cols` — Number of quads along X (vertex count = cols + 1).
/// - `rows` — Number of quads along Y (vertex count = rows + 1).
/// - `width` — Total width in meters.
/// - `height` — Total height in meters.
///
/// # Example
/// ```
/// use medsim_mesh::generators::quad_grid;
/// let mesh = quad_grid(2, 2, 1.0, 1.0);
/// assert_eq!(mesh.vertex_count(), 9);  // 3×3 vertices
/// assert_eq!(mesh.cell_count(), 8);    // 2×2 quads × 2 tris each
/// ```
pub fn quad_grid(cols: usize, rows: usize, width: f64, height: f64) -> SurfaceMesh {
    let verts_x = cols + 1;
    let verts_y = rows + 1;
    let half_w = width / 2.0;
    let half_h = height / 2.0;

    let mut positions = Vec::with_capacity(verts_x * verts_y);
    for j in 0..verts_y {
        for i in 0..verts_x {
            let u = i as f64 / cols.max(1) as f64;
            let v = j as f64 / rows.max(1) as f64;
            positions.push(DVec3::new(-half_w + u * width, half_h - v * height, 0.0));
        }
    }

    let mut cells = Vec::with_capacity(cols * rows * 2);
    for j in 0..rows {
        for i in 0..cols {
            let top_left = j * verts_x + i;
            let top_right = top_left + 1;
            let bot_left = top_left + verts_x;
            let bot_right = bot_left + 1;

            cells.push([top_left, bot_left, top_right]);
            cells.push([top_right, bot_left, bot_right]);
        }
    }

    SurfaceMesh::from_raw(positions, cells)
}

/// Generates an axis-aligned block of `nx × ny × nz` cubes, each split
/// into six tetrahedra along its main diagonal (Kuhn subdivision).
///
/// Adjacent cubes share faces conformingly. The block spans `size`,
/// centered at `center`.
pub fn tet_grid(nx: usize, ny: usize, nz: usize, size: DVec3, center: DVec3) -> TetrahedralMesh {
    let (vx, vy, vz) = (nx + 1, ny + 1, nz + 1);
    let step = size / DVec3::new(nx.max(1) as f64, ny.max(1) as f64, nz.max(1) as f64);
    let min = center - size * 0.5;

    let index = |i: usize, j: usize, k: usize| (k * vy + j) * vx + i;

    let mut positions = Vec::with_capacity(vx * vy * vz);
    for k in 0..vz {
        for j in 0..vy {
            for i in 0..vx {
                positions.push(min + step * DVec3::new(i as f64, j as f64, k as f64));
            }
        }
    }

    // Paths from corner (0,0,0) to (1,1,1), one axis at a time.
    const PATHS: [[usize; 3]; 6] = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];

    let mut cells = Vec::with_capacity(nx * ny * nz * 6);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                for path in PATHS {
                    let mut corner = [i, j, k];
                    let mut tet = [index(i, j, k); 4];
                    for (slot, axis) in path.into_iter().enumerate() {
                        corner[axis] += 1;
                        tet[slot + 1] = index(corner[0], corner[1], corner[2]);
                    }
                    let [a, b, c, d] = tet.map(|v| positions[v]);
                    if signed_tetrahedron_volume(a, b, c, d) < 0.0 {
                        tet.swap(2, 3);
                    }
                    cells.push(tet);
                }
            }
        }
    }

    TetrahedralMesh::from_raw(positions, cells)
}

/// A single right-corner tetrahedron at the origin with unit legs.
///
/// Its volume is 1/6.
pub fn unit_tetrahedron() -> TetrahedralMesh {
    TetrahedralMesh::from_raw(
        vec![DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z],
        vec![[0, 1, 2, 3]],
    )
}
