/// Textured spheres lit by an equirectangular environment map.
pub(crate) const MESH_SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    // x: environment intensity
    environment: vec4<f32>,
}

struct Object {
    model: mat4x4<f32>,
    normal: mat3x4<f32>,
    // x: self illumination
    params: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> globals: Globals;
@group(0) @binding(1)
var environment_map: texture_2d<f32>;
@group(0) @binding(2)
var linear_sampler: sampler;

@group(1) @binding(0)
var<uniform> object: Object;
@group(1) @binding(1)
var albedo_map: texture_2d<f32>;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) clip: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

const PI: f32 = 3.14159265;

fn equirect_uv(direction: vec3<f32>) -> vec2<f32> {
    let d = normalize(direction);
    let u = atan2(d.z, d.x) / (2.0 * PI) + 0.5;
    let v = acos(clamp(d.y, -1.0, 1.0)) / PI;
    return vec2<f32>(u, v);
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world = object.model * vec4<f32>(input.position, 1.0);
    out.clip = globals.view_proj * world;
    out.world_pos = world.xyz;
    let normal_matrix = mat3x3<f32>(
        object.normal[0].xyz,
        object.normal[1].xyz,
        object.normal[2].xyz
    );
    out.normal = normalize(normal_matrix * input.normal);
    out.uv = input.uv;
    return out;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let albedo = textureSample(albedo_map, linear_sampler, input.uv).rgb;
    let n = normalize(input.normal);
    let view = normalize(globals.camera_position.xyz - input.world_pos);
    let reflected = reflect(-view, n);
    let irradiance = textureSample(environment_map, linear_sampler, equirect_uv(n)).rgb;
    let specular = textureSample(environment_map, linear_sampler, equirect_uv(reflected)).rgb;
    let intensity = globals.environment.x;
    let lit = albedo * (irradiance * intensity + vec3<f32>(0.04)) + specular * 0.04 * intensity;
    return vec4<f32>(mix(lit, albedo, object.params.x), 1.0);
}
"#;

/// Flat-colored screen-space quads.
pub(crate) const QUAD_SHADER: &str = r#"
struct QuadInput {
    @location(0) position: vec2<f32>,
    @location(1) color: vec4<f32>,
}

struct QuadOutput {
    @builtin(position) clip: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_quad(input: QuadInput) -> QuadOutput {
    var out: QuadOutput;
    out.clip = vec4<f32>(input.position, 0.0, 1.0);
    out.color = input.color;
    return out;
}

@fragment
fn fs_quad(input: QuadOutput) -> @location(0) vec4<f32> {
    return input.color;
}
"#;
