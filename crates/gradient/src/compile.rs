use std::borrow::Cow;

use wgpu::naga::ShaderStage;

/// Compiles the static full-screen triangle vertex shader.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fullscreen triangle vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(VERTEX_SHADER_GLSL),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    })
}

/// Compiles the flow-gradient fragment program.
pub(crate) fn compile_fragment_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("flow gradient fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(FRAGMENT_SHADER_GLSL),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    })
}

/// Minimal full-screen triangle vertex shader.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_uv;

const vec2 positions[3] = vec2[3](
    vec2(-1.0, -3.0),
    vec2(3.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    uint vertex_index = uint(gl_VertexIndex);
    vec2 pos = positions[vertex_index];
    v_uv = pos * 0.5 + vec2(0.5, 0.5);
    gl_Position = vec4(pos, 0.0, 1.0);
}
";

/// Flow-gradient fragment program.
///
/// The uniform block layout must match [`crate::GradientUniforms`]. Coordinates
/// are remapped to a bottom-left origin so the pointer uniform (which flips Y)
/// lines up with the noise field.
const FRAGMENT_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform GradientParams {
    vec2 uResolution;
    vec2 uMouse;
    float uTime;
    float _padding0;
    float _padding1;
    float _padding2;
} ubo;

vec3 mod289_3(vec3 x) {
    return x - floor(x * (1.0 / 289.0)) * 289.0;
}

vec2 mod289_2(vec2 x) {
    return x - floor(x * (1.0 / 289.0)) * 289.0;
}

vec3 permute(vec3 x) {
    return mod289_3(((x * 34.0) + vec3(1.0)) * x);
}

// 2D simplex noise, roughly in [-1, 1].
float snoise(vec2 v) {
    vec4 C = vec4(0.211324865405187, 0.366025403784439, -0.577350269189626, 0.024390243902439);
    vec2 i = floor(v + vec2(dot(v, C.yy)));
    vec2 x0 = v - i + vec2(dot(i, C.xx));
    vec2 i1 = (x0.x > x0.y) ? vec2(1.0, 0.0) : vec2(0.0, 1.0);
    vec4 x12 = x0.xyxy + C.xxzz;
    x12 = vec4(x12.xy - i1, x12.zw);
    i = mod289_2(i);
    vec3 p = permute(permute(vec3(i.y) + vec3(0.0, i1.y, 1.0)) + vec3(i.x) + vec3(0.0, i1.x, 1.0));
    vec3 m = max(vec3(0.5) - vec3(dot(x0, x0), dot(x12.xy, x12.xy), dot(x12.zw, x12.zw)), vec3(0.0));
    m = m * m;
    m = m * m;
    vec3 x = 2.0 * fract(p * C.www) - vec3(1.0);
    vec3 h = abs(x) - vec3(0.5);
    vec3 ox = floor(x + vec3(0.5));
    vec3 a0 = x - ox;
    m = m * (vec3(1.79284291400159) - 0.85373472095314 * (a0 * a0 + h * h));
    vec3 g = vec3(
        a0.x * x0.x + h.x * x0.y,
        a0.y * x12.x + h.y * x12.y,
        a0.z * x12.z + h.z * x12.w
    );
    return 130.0 * dot(m, g);
}

void main() {
    vec2 fragCoord = vec2(gl_FragCoord.x, ubo.uResolution.y - gl_FragCoord.y);
    vec2 st = fragCoord / ubo.uResolution;
    st = vec2(st.x * (ubo.uResolution.x / ubo.uResolution.y), st.y);

    float flowTime = ubo.uTime * 0.2;
    float flow = snoise(vec2(st.x * 2.0 + flowTime, st.y * 2.0 - flowTime));

    float dist = distance(st, ubo.uMouse);
    float pointerGlow = smoothstep(0.4, 0.0, dist) * 0.1;

    vec3 colorBg = vec3(0.082, 0.082, 0.082);
    vec3 colorPrimary = vec3(0.871, 0.922, 0.784);
    vec3 colorDeep = vec3(0.1, 0.12, 0.1);

    vec3 color = mix(colorBg, colorDeep, vec3(flow));
    color = mix(color, colorPrimary, vec3(smoothstep(0.4, 0.6, flow + pointerGlow)));

    float grain = fract(sin(dot(v_uv, vec2(12.9898, 78.233))) * 43758.5453);
    color = color + vec3(grain * 0.04);

    outColor = vec4(color, 1.0);
}
";

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::naga;

    fn parse(stage: ShaderStage, source: &str) -> naga::Module {
        let mut frontend = naga::front::glsl::Frontend::default();
        frontend
            .parse(&naga::front::glsl::Options::from(stage), source)
            .unwrap_or_else(|err| panic!("{stage:?} shader failed to parse: {err:?}"))
    }

    fn validate(module: &naga::Module) {
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(module)
        .expect("shader module validates");
    }

    #[test]
    fn vertex_shader_is_valid_glsl() {
        validate(&parse(ShaderStage::Vertex, VERTEX_SHADER_GLSL));
    }

    #[test]
    fn fragment_shader_is_valid_glsl() {
        validate(&parse(ShaderStage::Fragment, FRAGMENT_SHADER_GLSL));
    }

    #[test]
    fn uniform_block_order_matches_rust_layout() {
        let resolution = FRAGMENT_SHADER_GLSL.find("vec2 uResolution;").unwrap();
        let mouse = FRAGMENT_SHADER_GLSL.find("vec2 uMouse;").unwrap();
        let time = FRAGMENT_SHADER_GLSL.find("float uTime;").unwrap();
        assert!(resolution < mouse && mouse < time);
    }
}
