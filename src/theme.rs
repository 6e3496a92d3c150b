use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub text_color: String,
    pub line_color: String,
    pub border_color: String,
    /// Fill of boxes when coloring is off or no class applies.
    pub box_color: String,
    pub background: String,
    pub generation_colors: Vec<String>,
    pub male_color: String,
    pub female_color: String,
    pub ego_color: String,
    pub ethnicity_colors: Vec<String>,
    /// Indexed by the number of languages spoken, starting at one.
    pub language_count_colors: Vec<String>,
    pub selected_language_color: String,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "verdana, arial, sans-serif".to_string(),
            text_color: "#000000".to_string(),
            line_color: "#000000".to_string(),
            border_color: "#000000".to_string(),
            box_color: "#FFFFFF".to_string(),
            background: "#FFFFFF".to_string(),
            generation_colors: to_strings(&[
                "#FCE4C4", "#E2EFDA", "#DDEBF7", "#FFF2CC", "#EDE2F6", "#FBE2D5", "#D9F2EF",
            ]),
            male_color: "#DBE7FF".to_string(),
            female_color: "#FFDDE6".to_string(),
            ego_color: "#FFD966".to_string(),
            ethnicity_colors: to_strings(&[
                "#F4B183", "#A9D08E", "#9BC2E6", "#FFE699", "#C9A0DC", "#F8CBAD", "#8FD3C7",
                "#D6DCE4", "#E6B8B7", "#B4C6E7", "#C6E0B4", "#FFC000", "#BDD7EE", "#D5A6BD",
            ]),
            language_count_colors: to_strings(&[
                "#EDF8E9", "#C7E9C0", "#A1D99B", "#74C476", "#41AB5D", "#238B45", "#005A32",
            ]),
            selected_language_color: "#FFB570".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, sans-serif".to_string(),
            text_color: "#1C2430".to_string(),
            line_color: "#7A8AA6".to_string(),
            border_color: "#C7D2E5".to_string(),
            box_color: "#F8FAFF".to_string(),
            background: "#FFFFFF".to_string(),
            generation_colors: to_strings(&[
                "#EEF2F8", "#E8F4EC", "#FDF1E6", "#F1ECF9", "#E7F3F8", "#FBEAEA", "#F5F5E6",
            ]),
            male_color: "#E3ECFA".to_string(),
            female_color: "#FBE7EE".to_string(),
            ego_color: "#FFF4CC".to_string(),
            ethnicity_colors: to_strings(&[
                "#F6D5C3", "#D3E8C8", "#CADDF0", "#FBEFC4", "#E1D0EC", "#F8DDD0", "#C8EAE4",
                "#E4E8EE", "#EFD3D2", "#D6E0F2", "#DDEBD3", "#FCE3A6", "#D9E8F5", "#E8CFDB",
            ]),
            language_count_colors: to_strings(&[
                "#F2F9EF", "#DDF0D7", "#C5E6BC", "#A8D89C", "#86C779", "#63B15A", "#3F8F3D",
            ]),
            selected_language_color: "#FFD2A6".to_string(),
        }
    }

    pub fn generation_color(&self, generation: i32) -> &str {
        let len = self.generation_colors.len().max(1) as i32;
        pick(&self.generation_colors, generation.rem_euclid(len) as usize)
            .unwrap_or(self.box_color.as_str())
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

fn pick(colors: &[String], index: usize) -> Option<&str> {
    colors.get(index).map(String::as_str)
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_colors_wrap_for_ancestors() {
        let theme = Theme::classic();
        let count = theme.generation_colors.len() as i32;
        assert_eq!(theme.generation_color(-1), theme.generation_color(count - 1));
        assert_eq!(theme.generation_color(0), theme.generation_color(count));
    }
}
