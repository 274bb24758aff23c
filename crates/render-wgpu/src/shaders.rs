/// WGSL shader for scene nodes: lit or flat, triangles or lines.
///
/// Lighting is ambient + hemisphere fill + Lambert sun. `emissive.w` is 1.0
/// for lit materials and 0.0 for flat ones; flat fragments output the base
/// color untouched.
pub const SCENE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    ambient: vec4<f32>,
    sky: vec4<f32>,
    ground: vec4<f32>,
    sun_dir: vec4<f32>,
    sun_color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
    @location(7) emissive: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
    @location(1) color: vec4<f32>,
    @location(2) emissive: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_normal = world_normal;
    out.color = instance.color;
    out.emissive = instance.emissive;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    if (in.emissive.w < 0.5) {
        return in.color;
    }
    let n = normalize(in.world_normal);
    let up = n.y * 0.5 + 0.5;
    let hemisphere = mix(uniforms.ground.rgb, uniforms.sky.rgb, up) * uniforms.sky.w;
    let diffuse = max(dot(n, uniforms.sun_dir.xyz), 0.0);
    let light = uniforms.ambient.rgb + hemisphere + uniforms.sun_color.rgb * diffuse;
    let rgb = in.color.rgb * light + in.emissive.rgb;
    return vec4<f32>(min(rgb, vec3<f32>(1.0)), in.color.a);
}
"#;
