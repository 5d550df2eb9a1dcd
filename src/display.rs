//! Renderer seam. The generator hands finished textures and meshes to a
//! caller-owned `MapDisplay`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::error::DisplayError;
use crate::mesh::MeshData;

/// Anything that can show a generated map.
pub trait MapDisplay {
    /// Show a flat image (grayscale heights or region colors).
    fn draw_texture(&mut self, texture: &RgbaImage) -> Result<(), DisplayError>;

    /// Show a mesh with the texture mapped through its UVs.
    fn draw_mesh(&mut self, mesh: &MeshData, texture: &RgbaImage) -> Result<(), DisplayError>;
}

/// Headless display that writes `<stem>.png` and, for meshes, `<stem>.obj`
/// plus a matching `<stem>.mtl`.
pub struct FileDisplay {
    dir: PathBuf,
    stem: String,
    written: Vec<PathBuf>,
}

impl FileDisplay {
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
            written: Vec::new(),
        }
    }

    /// Files written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn path(&self, extension: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", self.stem, extension))
    }

    fn save_texture(&mut self, texture: &RgbaImage) -> Result<PathBuf, DisplayError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path("png");
        texture.save(&path)?;
        self.written.push(path.clone());
        Ok(path)
    }
}

impl MapDisplay for FileDisplay {
    fn draw_texture(&mut self, texture: &RgbaImage) -> Result<(), DisplayError> {
        self.save_texture(texture)?;
        Ok(())
    }

    fn draw_mesh(&mut self, mesh: &MeshData, texture: &RgbaImage) -> Result<(), DisplayError> {
        let texture_path = self.save_texture(texture)?;

        let mtl_path = self.path("mtl");
        write_material(&mtl_path, &texture_path)?;
        self.written.push(mtl_path.clone());

        let obj_path = self.path("obj");
        let mut writer = BufWriter::new(File::create(&obj_path)?);
        write_obj(&mut writer, mesh, file_name(&mtl_path))?;
        writer.flush()?;
        self.written.push(obj_path);

        Ok(())
    }
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

fn write_material(path: &Path, texture_path: &Path) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "newmtl terrain")?;
    writeln!(writer, "Kd 1.0 1.0 1.0")?;
    writeln!(writer, "map_Kd {}", file_name(texture_path))?;
    writer.flush()
}

/// Write a mesh as Wavefront OBJ with positions, UVs and normals.
///
/// OBJ texture space has v pointing up, so v is flipped to keep row 0 of the
/// texture on the far edge.
pub fn write_obj<W: Write>(writer: &mut W, mesh: &MeshData, material_lib: &str) -> std::io::Result<()> {
    writeln!(writer, "# terrain mesh: {} vertices, {} triangles", mesh.vertex_count(), mesh.triangle_count())?;
    if !material_lib.is_empty() {
        writeln!(writer, "mtllib {}", material_lib)?;
        writeln!(writer, "usemtl terrain")?;
    }

    for v in &mesh.vertices {
        writeln!(writer, "v {} {} {}", v[0], v[1], v[2])?;
    }
    for uv in &mesh.uvs {
        writeln!(writer, "vt {} {}", uv[0], 1.0 - uv[1])?;
    }
    for n in mesh.normals() {
        writeln!(writer, "vn {} {} {}", n[0], n[1], n[2])?;
    }
    // OBJ indices are 1-based, and position/uv/normal share an index
    for tri in mesh.triangles.chunks_exact(3) {
        let [a, b, c] = [tri[0] + 1, tri[1] + 1, tri[2] + 1];
        writeln!(writer, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::HeightCurve;
    use crate::mesh::build_mesh;
    use crate::noise_field::HeightField;
    use crate::params::LevelOfDetail;

    #[test]
    fn test_obj_layout() {
        let field = HeightField::from_values(2, 2, vec![0.0; 4]);
        let mesh = build_mesh(&field, 1.0, &HeightCurve::linear(), LevelOfDetail::FULL);

        let mut out = Vec::new();
        write_obj(&mut out, &mesh, "").unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 4);
        assert_eq!(text.lines().filter(|l| l.starts_with("vt ")).count(), 4);
        assert_eq!(text.lines().filter(|l| l.starts_with("vn ")).count(), 4);
        assert!(text.contains("f 1/1/1 4/4/4 3/3/3"));
        assert!(!text.contains("mtllib"));
    }

    #[test]
    fn test_file_display_writes_mesh_bundle() {
        let dir = std::env::temp_dir().join(format!("terrain_display_{}", std::process::id()));
        let field = HeightField::from_values(3, 3, vec![0.5; 9]);
        let mesh = build_mesh(&field, 2.0, &HeightCurve::linear(), LevelOfDetail::FULL);
        let texture = crate::texture::texture_from_height_map(&field);

        let mut display = FileDisplay::new(&dir, "terrain");
        display.draw_mesh(&mesh, &texture).unwrap();

        let names: Vec<&str> = display.written().iter().map(|p| file_name(p)).collect();
        assert_eq!(names, vec!["terrain.png", "terrain.mtl", "terrain.obj"]);
        assert!(display.written().iter().all(|p| p.exists()));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
