use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

const SHADERS_DIR: &str = "assets/shaders";

// Compiles the GLSL sources in SHADERS_DIR to SPIR-V, writing each binary
// next to its source so the library can include_bytes! it.
fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed={SHADERS_DIR}");

    let compiler = shaderc::Compiler::new().ok_or("create shaderc compiler")?;
    let options = shaderc::CompileOptions::new().ok_or("create shaderc compile options")?;

    for entry in fs::read_dir(SHADERS_DIR).map_err(|e| format!("read {SHADERS_DIR}: {e:?}"))? {
        let path = entry?.path();
        if let Some(kind) = shader_kind(&path) {
            compile_shader(&compiler, &options, &path, kind)?;
        }
    }

    Ok(())
}

fn shader_kind(path: &Path) -> Option<shaderc::ShaderKind> {
    match path.extension()?.to_str()? {
        "vert" => Some(shaderc::ShaderKind::Vertex),
        "frag" => Some(shaderc::ShaderKind::Fragment),
        _ => None,
    }
}

fn compile_shader(
    compiler: &shaderc::Compiler,
    options: &shaderc::CompileOptions,
    path: &PathBuf,
    kind: shaderc::ShaderKind,
) -> Result<(), Box<dyn Error>> {
    let source = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e:?}"))?;

    let binary = compiler.compile_into_spirv(
        &source,
        kind,
        &path.display().to_string(),
        "main",
        Some(options),
    )?;

    let out_path = path.with_extension(format!(
        "{}.spv",
        path.extension().unwrap().to_string_lossy()
    ));
    fs::write(&out_path, binary.as_binary_u8())
        .map_err(|e| format!("write {out_path:?}: {e:?}"))?;

    Ok(())
}
