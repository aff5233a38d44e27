// mesh.rs — 地球用的 UV 球体网格

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobeVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl GlobeVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GlobeVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SphereMesh {
    pub vertices: Vec<GlobeVertex>,
    pub indices: Vec<u32>,
}

/// Latitude/longitude sphere centred on the origin, +Y up.
/// `u` runs west to east starting at the antimeridian so an
/// equirectangular Earth texture puts longitude 0 facing +Z.
pub fn build_sphere(radius: f32, lat: usize, lon: usize) -> SphereMesh {
    let lat = lat.max(2);
    let lon = lon.max(3);
    let mut vertices = Vec::with_capacity((lat + 1) * (lon + 1));
    let mut indices = Vec::with_capacity(lat * lon * 6);

    for i in 0..=lat {
        let theta = std::f32::consts::PI * (i as f32) / (lat as f32);
        let y = theta.cos();
        let sin_t = theta.sin();

        for j in 0..=lon {
            let u = (j as f32) / (lon as f32);
            // u = 0.5 落在 +Z 方向
            let phi = std::f32::consts::TAU * u - std::f32::consts::PI;
            let normal = [sin_t * phi.sin(), y, sin_t * phi.cos()];

            vertices.push(GlobeVertex {
                position: [normal[0] * radius, normal[1] * radius, normal[2] * radius],
                normal,
                uv: [u, (i as f32) / (lat as f32)],
            });
        }
    }

    for i in 0..lat {
        for j in 0..lon {
            let a = (i * (lon + 1) + j) as u32;
            let b = a + (lon + 1) as u32;

            // 从球外看为逆时针
            indices.extend_from_slice(&[a, b, a + 1, b, b + 1, a + 1]);
        }
    }

    SphereMesh { vertices, indices }
}
