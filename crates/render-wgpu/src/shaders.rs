/// WGSL shader for lit meshes: ambient plus one directional light, with the
/// directional term attenuated by the shadow map.
pub const SCENE_SHADER: &str = r#"
struct Frame {
    view_proj: mat4x4<f32>,
    light_view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    ambient: vec4<f32>,
    light_direction: vec4<f32>,
    light_radiance: vec4<f32>,
    shadow: vec4<f32>,
};

struct Model {
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    color: vec4<f32>,
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> frame: Frame;

@group(1) @binding(0)
var<uniform> model: Model;

@group(2) @binding(0)
var shadow_map: texture_depth_2d;
@group(2) @binding(1)
var shadow_sampler: sampler_comparison;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world = model.model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = frame.view_proj * world;
    out.world_position = world.xyz;
    out.world_normal = (model.normal_matrix * vec4<f32>(vertex.normal, 0.0)).xyz;
    return out;
}

fn shadow_factor(world_position: vec3<f32>) -> f32 {
    if (frame.shadow.x < 0.5 || model.params.x < 0.5) {
        return 1.0;
    }
    let light_clip = frame.light_view_proj * vec4<f32>(world_position, 1.0);
    let ndc = light_clip.xyz / light_clip.w;
    let uv = vec2<f32>(ndc.x * 0.5 + 0.5, ndc.y * -0.5 + 0.5);
    if (uv.x < 0.0 || uv.x > 1.0 || uv.y < 0.0 || uv.y > 1.0 || ndc.z > 1.0) {
        return 1.0;
    }

    let depth = ndc.z - frame.shadow.w;
    let radius = i32(frame.shadow.y);
    let texel = frame.shadow.z;
    var lit = 0.0;
    var taps = 0.0;
    for (var y = -radius; y <= radius; y++) {
        for (var x = -radius; x <= radius; x++) {
            let offset = vec2<f32>(f32(x), f32(y)) * texel;
            lit += textureSampleCompareLevel(shadow_map, shadow_sampler, uv + offset, depth);
            taps += 1.0;
        }
    }
    return lit / taps;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.world_normal);
    var light = frame.ambient.rgb;
    if (frame.light_direction.w > 0.5) {
        let diffuse = max(dot(n, frame.light_direction.xyz), 0.0);
        light += frame.light_radiance.rgb * diffuse * shadow_factor(in.world_position);
    }
    return vec4<f32>(model.color.rgb * light, 1.0);
}
"#;

/// WGSL depth-only shader rendering casters from the light's point of view.
pub const SHADOW_SHADER: &str = r#"
struct Frame {
    view_proj: mat4x4<f32>,
    light_view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    ambient: vec4<f32>,
    light_direction: vec4<f32>,
    light_radiance: vec4<f32>,
    shadow: vec4<f32>,
};

struct Model {
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    color: vec4<f32>,
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> frame: Frame;

@group(1) @binding(0)
var<uniform> model: Model;

@vertex
fn vs_shadow(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return frame.light_view_proj * model.model * vec4<f32>(position, 1.0);
}
"#;

/// WGSL shader scaling the offscreen scene target onto the window surface.
pub const BLIT_SHADER: &str = r#"
@group(0) @binding(0)
var source: texture_2d<f32>;
@group(0) @binding(1)
var source_sampler: sampler;

struct BlitOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

// One triangle covering the whole target.
@vertex
fn vs_blit(@builtin(vertex_index) index: u32) -> BlitOutput {
    let uv = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));

    var out: BlitOutput;
    out.clip_position = vec4<f32>(uv * vec2<f32>(2.0, -2.0) + vec2<f32>(-1.0, 1.0), 0.0, 1.0);
    out.uv = uv;
    return out;
}

@fragment
fn fs_blit(in: BlitOutput) -> @location(0) vec4<f32> {
    return textureSample(source, source_sampler, in.uv);
}
"#;
