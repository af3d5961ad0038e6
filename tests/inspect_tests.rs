use model_viewer::config::ViewerConfig;
use model_viewer::core::Layout;
use model_viewer::inspect::inspect;
use std::path::PathBuf;

const TRIANGLE_GLTF: &str = r#"{
    "asset": { "version": "2.0" },
    "scene": 0,
    "scenes": [{ "nodes": [0] }],
    "nodes": [{ "name": "roof", "children": [1] }, { "name": "panel", "mesh": 0 }],
    "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1, "material": 0 }] }],
    "materials": [{ "pbrMetallicRoughness": { "baseColorFactor": [0.2, 0.4, 0.6, 1.0],
                                               "metallicFactor": 0.0, "roughnessFactor": 0.7 } }],
    "buffers": [{ "byteLength": 42,
                  "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAABAAIA" }],
    "bufferViews": [
        { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
        { "buffer": 0, "byteOffset": 36, "byteLength": 6 }
    ],
    "accessors": [
        { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
          "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
        { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
    ]
}"#;

/// Scratch directory unique to one test
fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("model-viewer-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[cfg(test)]
mod headless_tests {
    use super::*;

    #[test]
    fn test_config_file_drives_inspect() {
        let dir = scratch("inspect");
        let model = dir.join("roof.gltf");
        std::fs::write(&model, TRIANGLE_GLTF).unwrap();

        let config_path = dir.join("viewer.json");
        let json = format!(
            r#"{{
                "window": {{ "layout": "model-only" }},
                "model": {{ "model_path": {:?}, "environment_path": null, "spin_step": 0.01 }}
            }}"#,
            model.display().to_string()
        );
        std::fs::write(&config_path, json).unwrap();

        let config = ViewerConfig::load(&config_path).unwrap();
        assert_eq!(config.window.layout, Layout::ModelOnly);
        assert!(config.model.environment_path.is_none());

        let report = inspect(&config, 30).unwrap();
        assert_eq!(report.normalize.visited, 3);
        assert_eq!(report.normalize.meshes, 1);
        // Already metal/roughness, so nothing to upgrade
        assert_eq!(report.normalize.upgraded, 0);
        assert!((report.rotation_y - 0.3).abs() < 1e-4);
        assert_eq!(
            report.outline,
            vec!["roof", "  roof", "    panel [mesh, 1 triangles, standard, shadows]"]
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_broken_model_reports_error() {
        let dir = scratch("broken");
        let model = dir.join("broken.gltf");
        std::fs::write(&model, "{ \"asset\": ").unwrap();

        let mut config = ViewerConfig::default();
        config.model.model_path = model;
        assert!(inspect(&config, 1).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }
}
