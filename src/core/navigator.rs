//! Extracts typed values from the provider's loosely shaped responses.
//!
//! Supported `data` shapes:
//! - `{"data": [{"files": [...]}, ...]}`
//! - `{"data": {"files": [...]}}`
//! - `{"data": {"<id>": {"files": [...]}}}` (only when `data` itself has no `files` array)
//!
//! Entries of `files` are either bare URL strings or objects carrying `pth`.

use crate::domain::model::{FileDescriptor, FileReference, PopulationImage, ProviderDocument};
use serde_json::Value;

const DATA_FIELD: &str = "data";
const FILES_FIELD: &str = "files";
const YEAR_FIELD: &str = "popyear";
const IMAGE_URL_FIELD: &str = "url_img";

/// `data` 節點；缺少或為 null 時回傳 None
fn data_node(doc: &ProviderDocument) -> Option<&Value> {
    match doc.get(DATA_FIELD) {
        None | Some(Value::Null) => None,
        Some(node) => Some(node),
    }
}

/// 依文件順序列出候選項目：陣列展開，物件視為單一項目
fn candidate_items(data: &Value) -> Vec<&Value> {
    match data {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

fn files_list(node: &Value) -> Option<&Vec<Value>> {
    node.get(FILES_FIELD).and_then(Value::as_array)
}

fn to_file_reference(entry: &Value) -> Option<FileReference> {
    match entry {
        Value::String(url) => Some(FileReference::Url(url.clone())),
        Value::Object(fields) => Some(FileReference::Descriptor(FileDescriptor(fields.clone()))),
        Value::Number(n) => Some(FileReference::Url(n.to_string())),
        Value::Bool(b) => Some(FileReference::Url(b.to_string())),
        Value::Null | Value::Array(_) => None,
    }
}

/// 同一個 `files` 清單同時出現 URL 字串與物件
fn mixes_shapes(files: &[Value]) -> bool {
    let has_object = files.iter().any(Value::is_object);
    let has_scalar = files
        .iter()
        .any(|entry| matches!(entry, Value::String(_) | Value::Number(_) | Value::Bool(_)));
    has_object && has_scalar
}

fn push_entries(out: &mut Vec<FileReference>, files: &[Value]) {
    if mixes_shapes(files) {
        tracing::warn!(
            "Files list mixes URL strings and descriptor objects; keeping both in document order"
        );
    }
    out.extend(files.iter().filter_map(to_file_reference));
}

pub fn extract_file_references(doc: &ProviderDocument) -> Vec<FileReference> {
    let Some(data) = data_node(doc) else {
        tracing::warn!("Provider response has no 'data' field");
        return Vec::new();
    };

    let mut references = Vec::new();

    match data {
        Value::Array(items) => {
            for item in items {
                if let Some(files) = files_list(item) {
                    push_entries(&mut references, files);
                }
            }
        }
        Value::Object(children) => {
            if let Some(files) = files_list(data) {
                push_entries(&mut references, files);
            } else {
                // data.<id>.files
                for (id, child) in children {
                    if let Some(files) = files_list(child) {
                        tracing::debug!("Reading nested files list under data.{}", id);
                        push_entries(&mut references, files);
                    }
                }
            }
        }
        _ => tracing::warn!("Provider 'data' field is neither an object nor an array"),
    }

    tracing::debug!("Extracted {} file references", references.len());
    references
}

fn as_year(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn to_population_image(item: &Value) -> Option<PopulationImage> {
    let year = item.get(YEAR_FIELD).and_then(as_year);
    let url = item.get(IMAGE_URL_FIELD).and_then(as_text);

    match (year, url) {
        (Some(year), Some(url)) => Some(PopulationImage::new(year, url)),
        _ => {
            let available = item
                .as_object()
                .map(|obj| obj.keys().cloned().collect::<Vec<_>>().join(", "))
                .unwrap_or_default();
            tracing::warn!(
                "Missing popyear or url_img field. Available fields: {}",
                if available.is_empty() { "none" } else { available.as_str() }
            );
            None
        }
    }
}

pub fn extract_population_images(doc: &ProviderDocument) -> Vec<PopulationImage> {
    let Some(data) = data_node(doc) else {
        tracing::warn!("Density response has no 'data' field");
        return Vec::new();
    };

    candidate_items(data)
        .into_iter()
        .filter_map(to_population_image)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn url(s: &str) -> FileReference {
        FileReference::Url(s.to_string())
    }

    #[test]
    fn test_data_array_with_string_files() {
        let doc = json!({"data": [{"files": ["http://x/a.tif"]}]});
        assert_eq!(extract_file_references(&doc), vec![url("http://x/a.tif")]);
    }

    #[test]
    fn test_data_array_yields_n_times_m_in_order() {
        let doc = json!({"data": [
            {"files": ["a1", "a2", "a3"]},
            {"files": ["b1", "b2", "b3"]}
        ]});

        let refs = extract_file_references(&doc);
        let urls: Vec<_> = refs.iter().filter_map(FileReference::download_url).collect();
        assert_eq!(urls, vec!["a1", "a2", "a3", "b1", "b2", "b3"]);
    }

    #[test]
    fn test_data_array_skips_items_without_files_list() {
        let doc = json!({"data": [
            {"files": ["a"]},
            {"title": "no files"},
            {"files": "not-a-list"},
            {"files": ["b"]}
        ]});

        assert_eq!(extract_file_references(&doc), vec![url("a"), url("b")]);
    }

    #[test]
    fn test_data_object_with_descriptor_files() {
        let doc = json!({"data": {"files": [{"pth": "http://x/b.tif"}]}});

        let refs = extract_file_references(&doc);
        assert_eq!(refs.len(), 1);
        assert!(matches!(refs[0], FileReference::Descriptor(_)));
        assert_eq!(refs[0].download_url(), Some("http://x/b.tif"));
    }

    #[test]
    fn test_mixed_file_shapes_are_kept_in_order() {
        let files = json!([
            "http://x/a.tif",
            {"pth": "http://x/b.tif", "size": 10},
            2020
        ]);
        let entries = files.as_array().unwrap();
        assert!(mixes_shapes(entries));
        assert!(!mixes_shapes(&entries[..1]));

        let refs = extract_file_references(&json!({"data": {"files": files}}));
        assert_eq!(refs.len(), 3);
        assert_eq!(refs[0], url("http://x/a.tif"));
        assert!(matches!(
            &refs[1],
            FileReference::Descriptor(d) if d.path() == Some("http://x/b.tif")
        ));
        assert_eq!(refs[2], url("2020"));
    }

    #[test]
    fn test_nested_id_shape() {
        let doc = json!({"data": {"4201": {"id": "4201", "files": ["http://x/nested.tif"]}}});
        assert_eq!(extract_file_references(&doc), vec![url("http://x/nested.tif")]);
    }

    #[test]
    fn test_direct_files_win_over_nested_shape() {
        let doc = json!({"data": {
            "files": ["direct"],
            "other": {"files": ["nested"]}
        }});
        assert_eq!(extract_file_references(&doc), vec![url("direct")]);
    }

    #[test]
    fn test_scalar_entries_are_coerced_and_nulls_skipped() {
        let doc = json!({"data": {"files": [42, null, true, ["x"]]}});
        assert_eq!(extract_file_references(&doc), vec![url("42"), url("true")]);
    }

    #[test]
    fn test_missing_or_null_data_yields_empty() {
        assert!(extract_file_references(&json!({})).is_empty());
        assert!(extract_file_references(&json!({"data": null})).is_empty());
        assert!(extract_file_references(&json!({"data": "text"})).is_empty());
        assert!(extract_population_images(&json!({})).is_empty());
        assert!(extract_population_images(&json!({"data": null})).is_empty());
    }

    #[test]
    fn test_population_images_skip_incomplete_items() {
        let doc = json!({"data": [
            {"popyear": 2020, "url_img": "http://x/img1.png"},
            {"popyear": 2019}
        ]});

        assert_eq!(
            extract_population_images(&doc),
            vec![PopulationImage::new(2020, "http://x/img1.png")]
        );
    }

    #[test]
    fn test_population_images_keep_relative_order() {
        let doc = json!({"data": [
            {"popyear": 2000, "url_img": "u2000"},
            {"url_img": "orphan"},
            {"popyear": "2005", "url_img": "u2005"},
            {"popyear": null, "url_img": "null-year"},
            {"popyear": 2010.0, "url_img": "u2010"}
        ]});

        let years: Vec<_> = extract_population_images(&doc)
            .into_iter()
            .map(|image| image.year)
            .collect();
        assert_eq!(years, vec![2000, 2005, 2010]);
    }

    #[test]
    fn test_population_image_from_single_object() {
        let doc = json!({"data": {"popyear": 2020, "url_img": "http://x/mex.png"}});
        assert_eq!(
            extract_population_images(&doc),
            vec![PopulationImage::new(2020, "http://x/mex.png")]
        );
    }
}
