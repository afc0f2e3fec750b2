use std::collections::HashMap;
use std::path::Path;

use super::ClassifyError;

/// Load a class-id → label map from JSON.
///
/// The training job serializes the map with stringified integer keys
/// (`{"0": "lunch_bag_pink_polkadot", ...}`), so keys are parsed back to
/// integers here. Non-numeric keys are a corrupt map and rejected.
pub fn load_label_map(path: &Path) -> Result<HashMap<usize, String>, ClassifyError> {
    if !path.exists() {
        return Err(ClassifyError::ModelNotFound(path.to_path_buf()));
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| ClassifyError::LabelMap(format!("read {}: {e}", path.display())))?;

    parse_label_map(&raw)
}

fn parse_label_map(raw: &str) -> Result<HashMap<usize, String>, ClassifyError> {
    let string_keyed: HashMap<String, String> =
        serde_json::from_str(raw).map_err(|e| ClassifyError::LabelMap(e.to_string()))?;

    let mut map = HashMap::with_capacity(string_keyed.len());
    for (key, label) in string_keyed {
        let id: usize = key
            .parse()
            .map_err(|_| ClassifyError::LabelMap(format!("non-numeric class id {key:?}")))?;
        map.insert(id, label);
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn parses_stringified_integer_keys() {
        let map = parse_label_map(r#"{"0": "lunch_bag_pink_polkadot", "1": "white_metal_lantern"}"#)
            .unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map[&0], "lunch_bag_pink_polkadot");
        assert_eq!(map[&1], "white_metal_lantern");
    }

    #[test]
    fn rejects_non_numeric_keys() {
        let result = parse_label_map(r#"{"zero": "label"}"#);
        assert!(matches!(result, Err(ClassifyError::LabelMap(_))));
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(parse_label_map("not json").is_err());
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let result = load_label_map(Path::new("/nonexistent/label_map.json"));
        assert!(matches!(result, Err(ClassifyError::ModelNotFound(_))));
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"3": "jumbo_bag_red_retrospot"}"#).unwrap();
        file.flush().unwrap();

        let map = load_label_map(file.path()).unwrap();
        assert_eq!(map[&3], "jumbo_bag_red_retrospot");
    }
}
