//! 模型路径解析
//!
//! 只检查路径并给出可加载的引用，不做任何加载

use std::path::Path;

pub trait ModelResolver {
    /// 返回 None 表示路径不可用
    fn resolve(&self, path: &str) -> Option<String>;
}

/// 把绝对路径转成 `file://` url，要求带扩展名
#[derive(Clone, Copy, Debug, Default)]
pub struct FileUrlResolver;

impl ModelResolver for FileUrlResolver {
    fn resolve(&self, path: &str) -> Option<String> {
        let file = Path::new(path);
        if !file.is_absolute() || file.extension().is_none() {
            return None;
        }
        Some(format!("file://{}", path.replace(' ', "%20")))
    }
}

/// 按扩展名给出 media type，未知扩展名留空由前端自行判断
pub fn media_type(url: &str) -> &'static str {
    match Path::new(url).extension().and_then(|x| x.to_str()) {
        Some("glb") => "model/gltf-binary",
        Some("gltf") => "model/gltf+json",
        Some("stl") => "model/stl",
        Some("dae") => "model/vnd.collada+xml",
        Some("png") => "image/png",
        Some("svg") => "image/svg+xml",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_paths_become_file_urls() -> () {
        let resolver = FileUrlResolver;
        assert_eq!(resolver.resolve("/opt/models/car.glb").as_deref(), Some("file:///opt/models/car.glb"));
        assert_eq!(resolver.resolve("/opt/my models/car.glb").as_deref(), Some("file:///opt/my%20models/car.glb"));
    }

    #[test]
    fn relative_or_bare_paths_are_rejected() -> () {
        let resolver = FileUrlResolver;
        assert_eq!(resolver.resolve("models/car.glb"), None);
        assert_eq!(resolver.resolve("/opt/models/vehicles/"), None);
        assert_eq!(resolver.resolve(""), None);
    }

    #[test]
    fn media_type_from_extension() -> () {
        assert_eq!(media_type("file:///a/b.glb"), "model/gltf-binary");
        assert_eq!(media_type("file:///a/b"), "");
    }
}
