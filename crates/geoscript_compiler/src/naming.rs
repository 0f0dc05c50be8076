// SPDX-License-Identifier: MIT OR Apache-2.0
//! Conversions between host display names and script identifiers.

/// Script identifier for a host name (`Vertices X` -> `vertices_x`)
pub fn snake_case(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// Host display name for a script identifier (`vertices_x` -> `Vertices X`)
pub fn title_case(identifier: &str) -> String {
    identifier
        .split(['_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("Vertices X"), "vertices_x");
        assert_eq!(snake_case("Join Geometry"), "join_geometry");
        assert_eq!(snake_case("ID"), "id");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("cyl_radius"), "Cyl Radius");
        assert_eq!(title_case("size"), "Size");
        assert_eq!(snake_case(&title_case("vertices_x")), "vertices_x");
    }
}
