//! Seed and recipe files for the command line

use std::path::Path;

use shared::Recipe;

use crate::error::{GeneratorError, GeneratorResult};

/// Parse seed item names.
///
/// Accepts a JSON array of strings, or plain text with one name per line.
/// Names are trimmed and blank entries dropped.
pub fn parse_seeds(text: &str) -> GeneratorResult<Vec<String>> {
    let trimmed = text.trim_start();
    let raw: Vec<String> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed)?
    } else {
        text.lines().map(str::to_string).collect()
    };

    Ok(raw
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect())
}

/// Split a comma separated `--seeds` value
pub fn split_seed_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

pub fn load_seeds_file(path: &Path) -> GeneratorResult<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    parse_seeds(&text)
}

/// Load known recipes from a JSON array of `{src_a, src_b, result}` objects
pub fn load_known_recipes(path: &Path) -> GeneratorResult<Vec<Recipe>> {
    let text = std::fs::read_to_string(path)?;
    let recipes: Vec<Recipe> = serde_json::from_str(&text)?;
    for (index, recipe) in recipes.iter().enumerate() {
        recipe.validate().map_err(|e| {
            GeneratorError::config(format!("{}: recipe #{index}: {e}", path.display()))
        })?;
    }
    Ok(recipes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("generator-input-{}-{}", std::process::id(), name));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_seeds_json() {
        let seeds = parse_seeds(r#"["Water", " Fire ", ""]"#).unwrap();
        assert_eq!(seeds, vec!["Water", "Fire"]);
    }

    #[test]
    fn test_parse_seeds_lines() {
        let seeds = parse_seeds("Water\n\n  Fire\r\nEarth Wind\n").unwrap();
        assert_eq!(seeds, vec!["Water", "Fire", "Earth Wind"]);
    }

    #[test]
    fn test_parse_seeds_bad_json() {
        assert!(matches!(parse_seeds("[\"Water\""), Err(GeneratorError::JsonError(_))));
    }

    #[test]
    fn test_split_seed_list() {
        assert_eq!(split_seed_list("Water, Fire,,Wind "), vec!["Water", "Fire", "Wind"]);
        assert!(split_seed_list(" , ").is_empty());
    }

    #[test]
    fn test_load_known_recipes() {
        let path = temp_file(
            "recipes.json",
            r#"[{"src_a":"Water","src_b":"Fire","result":"Steam"}]"#,
        );
        let recipes = load_known_recipes(&path).unwrap();
        assert_eq!(recipes, vec![Recipe::new("Water", "Fire", "Steam")]);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_known_recipes_rejects_blank() {
        let path = temp_file("blank.json", r#"[{"src_a":"Water","src_b":"","result":"Steam"}]"#);
        let err = load_known_recipes(&path).unwrap_err();
        assert!(matches!(err, GeneratorError::ConfigError { .. }));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_seeds_file(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, GeneratorError::IoError(_)));
    }
}
