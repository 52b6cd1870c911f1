use bytemuck::{Pod, Zeroable};
use rondavel_render::{FramePacket, MeshItem, ShadowMapKind, ShadowMapSettings};
use rondavel_scene::{Geometry, MeshData};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

impl Vertex {
    pub(crate) const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x3,
        ],
    };
}

/// Zip positions and normals into one vertex stream.
pub(crate) fn interleave(mesh: &MeshData) -> Vec<Vertex> {
    mesh.positions
        .iter()
        .zip(&mesh.normals)
        .map(|(&position, &normal)| Vertex { position, normal })
        .collect()
}

/// Per-frame uniforms shared by the shadow and scene passes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct FrameUniforms {
    view_proj: [[f32; 4]; 4],
    light_view_proj: [[f32; 4]; 4],
    camera_position: [f32; 4],
    ambient: [f32; 4],
    /// xyz: unit vector towards the light. w: 1 when a light is present.
    light_direction: [f32; 4],
    light_radiance: [f32; 4],
    /// x: shadows on, y: PCF kernel radius in texels, z: texel size, w: depth bias.
    shadow: [f32; 4],
}

impl FrameUniforms {
    pub(crate) fn new(packet: &FramePacket, shadows: ShadowMapSettings) -> Self {
        let [ar, ag, ab] = packet.ambient;
        let mut uniforms = Self {
            view_proj: packet.view_projection().to_cols_array_2d(),
            light_view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
            camera_position: packet.camera_position.extend(1.0).to_array(),
            ambient: [ar, ag, ab, 1.0],
            light_direction: [0.0; 4],
            light_radiance: [0.0; 4],
            shadow: [0.0; 4],
        };

        // One directional light is shaded; a shadow caster wins over the rest.
        let Some(light) = packet.shadow_light().or(packet.directional.first()) else {
            return uniforms;
        };
        let [lr, lg, lb] = light.radiance;
        uniforms.light_direction = light.to_light().extend(1.0).to_array();
        uniforms.light_radiance = [lr, lg, lb, 1.0];

        if shadows.enabled && light.cast_shadow {
            uniforms.light_view_proj = light.shadow_view_projection().to_cols_array_2d();
            let radius = match shadows.kind {
                ShadowMapKind::Basic => 0.0,
                ShadowMapKind::PcfSoft => 1.0,
            };
            uniforms.shadow = [
                1.0,
                radius,
                1.0 / light.shadow.map_size.max(1) as f32,
                light.shadow.bias,
            ];
        }
        uniforms
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct ModelUniforms {
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    color: [f32; 4],
    /// x: receives shadow, y: roughness, z: metalness.
    params: [f32; 4],
}

impl ModelUniforms {
    pub(crate) fn new(item: &MeshItem) -> Self {
        let [r, g, b] = item.material.color.to_linear();
        Self {
            model: item.world.to_cols_array_2d(),
            normal_matrix: item.world.inverse().transpose().to_cols_array_2d(),
            color: [r, g, b, 1.0],
            params: [
                if item.receive_shadow { 1.0 } else { 0.0 },
                item.material.roughness,
                item.material.metalness,
                0.0,
            ],
        }
    }
}

/// GPU buffers for one mesh node.
pub(crate) struct GpuMesh {
    pub geometry: Geometry,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub model_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub cast_shadow: bool,
}

impl GpuMesh {
    pub(crate) fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        item: &MeshItem,
    ) -> Self {
        let data = item.geometry.tessellate();
        let vertices = interleave(&data);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_vertex_buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_index_buffer"),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let model_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_model_buffer"),
            contents: bytemuck::bytes_of(&ModelUniforms::new(item)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("mesh_bind_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: model_buffer.as_entire_binding(),
            }],
        });
        tracing::debug!(
            "uploaded mesh {} ({}): {} vertices, {} triangles",
            item.name,
            item.id.short(),
            data.vertex_count(),
            data.triangle_count()
        );

        Self {
            geometry: item.geometry,
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
            model_buffer,
            bind_group,
            cast_shadow: item.cast_shadow,
        }
    }

    pub(crate) fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(1, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}
