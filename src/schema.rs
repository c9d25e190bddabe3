use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

/// 默认集合名称
pub const COLLECTION: &str = "ghosts";

/// 图片嵌入维数（CLIP 类模型，余弦度量）
pub const IMAGE_DIM: usize = 512;
/// 文本稠密嵌入维数（GTE 类模型，余弦度量）
pub const TEXT_DIM: usize = 768;
/// 混合模型稠密嵌入维数（BGE-M3 类模型，欧氏度量）
pub const HYBRID_DIM: usize = 1024;

/// 按 ghostclass 分区的分区数量
pub const PARTITION_NUM: usize = 8;

/// 上传文件大小上限：50M
pub const MAX_FILE_SIZE: usize = 50 * 1024 * 1024;
/// 允许的图片后缀
pub const IMAGE_SUFFIXES: &[&str] = &["png", "jpg", "jpeg"];

/// 灵体分类，插入时作为集合的分区键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GhostClass {
    Fake,
    Art,
    Tv,
    Unclassified,
    ClassI,
    ClassII,
    ClassIII,
    ClassIV,
    ClassV,
    ClassVI,
    ClassVII,
}

impl GhostClass {
    pub const ALL: [GhostClass; 11] = [
        GhostClass::Fake,
        GhostClass::Art,
        GhostClass::Tv,
        GhostClass::Unclassified,
        GhostClass::ClassI,
        GhostClass::ClassII,
        GhostClass::ClassIII,
        GhostClass::ClassIV,
        GhostClass::ClassV,
        GhostClass::ClassVI,
        GhostClass::ClassVII,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GhostClass::Fake => "Fake",
            GhostClass::Art => "Art",
            GhostClass::Tv => "TV",
            GhostClass::Unclassified => "Unclassified",
            GhostClass::ClassI => "Class I",
            GhostClass::ClassII => "Class II",
            GhostClass::ClassIII => "Class III",
            GhostClass::ClassIV => "Class IV",
            GhostClass::ClassV => "Class V",
            GhostClass::ClassVI => "Class VI",
            GhostClass::ClassVII => "Class VII",
        }
    }
}

impl FromStr for GhostClass {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for class in GhostClass::ALL {
            if class.as_str().eq_ignore_ascii_case(s) {
                return Ok(class);
            }
        }
        bail!("无效的灵体分类: {s}")
    }
}

impl fmt::Display for GhostClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 记录类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Ghost,
    Deity,
    Unstable,
    Environmental,
    Vathek,
    Legend,
    VideoGame,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Ghost,
        Category::Deity,
        Category::Unstable,
        Category::Environmental,
        Category::Vathek,
        Category::Legend,
        Category::VideoGame,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Ghost => "Ghost",
            Category::Deity => "Deity",
            Category::Unstable => "Unstable",
            Category::Environmental => "Environmental",
            Category::Vathek => "Vathek",
            Category::Legend => "Legend",
            Category::VideoGame => "Video Game",
        }
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for category in Category::ALL {
            if category.as_str().eq_ignore_ascii_case(s) {
                return Ok(category);
            }
        }
        bail!("无效的记录类别: {s}")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一次提交中用户填写的全部元数据
///
/// 分类字段在构造时已经过枚举校验，自由文本字段不做校验
#[derive(Debug, Clone)]
pub struct GhostMetadata {
    pub ghostclass: GhostClass,
    pub category: Category,
    pub description: String,
    pub identification: String,
    pub location: String,
    pub country: String,
    pub latitude: String,
    pub longitude: String,
    pub zipcode: String,
}

/// 稀疏向量，序列化为 `{"维度下标": 权重}` 形式
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector(pub Vec<(u32, f32)>);

impl SparseVector {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SparseVector {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (index, value) in &self.0 {
            map.serialize_entry(&index.to_string(), value)?;
        }
        map.end()
    }
}

/// 待插入的完整记录
///
/// 字段名与集合 schema 一一对应，id 由 Milvus 自动分配，不在此处出现
#[derive(Debug, Clone, Serialize)]
pub struct GhostRecord {
    pub ghostclass: String,
    pub filename: String,
    pub s3path: String,
    pub description: String,
    pub category: String,
    pub identification: String,
    pub location: String,
    pub country: String,
    pub latitude: String,
    pub longitude: String,
    pub zipcode: String,
    pub timestamp: String,
    pub s3timestamp: String,
    pub vector: Vec<f32>,
    pub text_vector: SparseVector,
    pub text_vector2: Vec<f32>,
    pub text_vector3: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ghost_class_roundtrip() {
        for class in GhostClass::ALL {
            assert_eq!(class.as_str().parse::<GhostClass>().unwrap(), class);
        }
        assert_eq!(GhostClass::ALL.len(), 11);
        assert!("Class VIII".parse::<GhostClass>().is_err());
        assert!("".parse::<GhostClass>().is_err());
    }

    #[test]
    fn category_roundtrip() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        assert_eq!(Category::ALL.len(), 7);
        assert!("Poltergeist".parse::<Category>().is_err());
    }

    #[test]
    fn ghost_class_case_insensitive() {
        assert_eq!("fake".parse::<GhostClass>().unwrap(), GhostClass::Fake);
        assert_eq!("class iii".parse::<GhostClass>().unwrap(), GhostClass::ClassIII);
        assert_eq!("video game".parse::<Category>().unwrap(), Category::VideoGame);
    }

    #[test]
    fn sparse_vector_json_shape() {
        let sparse = SparseVector(vec![(3, 0.5), (217, 0.25)]);
        let json = serde_json::to_value(&sparse).unwrap();
        assert_eq!(json, serde_json::json!({"3": 0.5, "217": 0.25}));
    }

    #[test]
    fn record_field_names() {
        let record = GhostRecord {
            ghostclass: "Fake".to_string(),
            filename: "casper.png".to_string(),
            s3path: "http://127.0.0.1:9000/images/casper.png".to_string(),
            description: "A cartoon ghost sketch".to_string(),
            category: "Art".to_string(),
            identification: String::new(),
            location: String::new(),
            country: String::new(),
            latitude: String::new(),
            longitude: String::new(),
            zipcode: String::new(),
            timestamp: "2025-01-01T00:00:00Z".to_string(),
            s3timestamp: "2025-01-01T00:00:00Z".to_string(),
            vector: vec![0.0; IMAGE_DIM],
            text_vector: SparseVector(vec![(1, 1.0)]),
            text_vector2: vec![0.0; TEXT_DIM],
            text_vector3: vec![0.0; HYBRID_DIM],
        };
        let json = serde_json::to_value(&record).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 17);
        for field in [
            "ghostclass", "filename", "s3path", "description", "category", "identification",
            "location", "country", "latitude", "longitude", "zipcode", "timestamp", "s3timestamp",
            "vector", "text_vector", "text_vector2", "text_vector3",
        ] {
            assert!(obj.contains_key(field), "missing field {field}");
        }
        assert_eq!(obj["vector"].as_array().unwrap().len(), IMAGE_DIM);
        assert!(obj["text_vector"].is_object());
    }
}
