use std::collections::HashMap;

use crate::data::{DataProvider, Event, Family, Individual, Sex, format_event_date};
use crate::layout::{EntryBox, PositionedNode, composite};
use crate::render::escape_xml;
use crate::text_metrics::{TextMeasurer, TextStyle};

use super::{ChartColors, NodeRenderer, RendererOptions, text_element};

const INDI_MIN_HEIGHT: f32 = 44.0;
const INDI_MIN_WIDTH: f32 = 64.0;
const FAM_MIN_HEIGHT: f32 = 10.0;
const FAM_MIN_WIDTH: f32 = 15.0;
const IMAGE_WIDTH: f32 = 70.0;
/// Minimum box height when an image is present.
const IMAGE_HEIGHT: f32 = 90.0;
const ETHNICITY_HEIGHT: f32 = 17.0;
const LANGUAGES_HEIGHT: f32 = 17.0;
const DETAILS_HEIGHT: f32 = 17.0;
const MAX_LANGUAGE_CLASS: usize = 7;

#[derive(Debug, Clone, PartialEq)]
struct DetailLine {
    symbol: &'static str,
    text: String,
}

/// Lines for an event: the date, then the place, with `symbol` on the first.
fn event_lines(event: Option<&Event>, symbol: &'static str) -> Vec<DetailLine> {
    let Some(event) = event else {
        return Vec::new();
    };
    let mut lines: Vec<DetailLine> = format_event_date(event)
        .into_iter()
        .chain(event.place.clone().filter(|place| !place.is_empty()))
        .map(|text| DetailLine { symbol: "", text })
        .collect();
    if let Some(first) = lines.first_mut() {
        first.symbol = symbol;
    }
    lines
}

fn indi_details(indi: &Individual) -> Vec<DetailLine> {
    let mut lines = event_lines(indi.birth.as_ref(), "*");
    let death = event_lines(indi.death.as_ref(), "+");
    if death.is_empty() && indi.is_confirmed_death() {
        lines.push(DetailLine {
            symbol: "+",
            text: String::new(),
        });
    }
    lines.extend(death);
    lines
}

fn fam_details(fam: &Family) -> Vec<DetailLine> {
    event_lines(fam.marriage.as_ref(), "\u{26AD}")
}

fn sex_symbol(sex: Sex) -> &'static str {
    match sex {
        Sex::Male => "\u{2642}",
        Sex::Female => "\u{2640}",
        Sex::Unknown => "",
    }
}

fn sex_class(sex: Sex) -> &'static str {
    match sex {
        Sex::Male => "male",
        Sex::Female => "female",
        Sex::Unknown => "",
    }
}

/// Characters allowed in a CSS class derived from record data.
fn class_token(value: &str) -> String {
    value
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .collect()
}

/// Boxes with names, life events, languages, ethnicity and an optional photo.
#[derive(Debug)]
pub struct DetailedRenderer {
    options: RendererOptions,
    measurer: TextMeasurer,
    /// Ethnicity to CSS class. Built on first use and cleared by `reset`.
    ethnicity_classes: HashMap<String, String>,
}

impl DetailedRenderer {
    pub fn new(options: RendererOptions, measurer: TextMeasurer) -> Self {
        Self {
            options,
            measurer,
            ethnicity_classes: HashMap::new(),
        }
    }

    fn build_ethnicity_classes(&mut self, data: &dyn DataProvider) {
        if let Some(ethnicity) = data
            .indis()
            .find(|indi| indi.is_ego)
            .and_then(|indi| indi.ethnicity.clone())
        {
            self.ethnicity_classes.insert(ethnicity, "ego".to_string());
        }
        let mut next = 1;
        for indi in data.indis() {
            let Some(ethnicity) = &indi.ethnicity else {
                continue;
            };
            if self.ethnicity_classes.contains_key(ethnicity) {
                continue;
            }
            if next > self.options.theme.ethnicity_colors.len() {
                tracing::warn!(ethnicity = %ethnicity, "no color left for ethnicity");
                continue;
            }
            self.ethnicity_classes
                .insert(ethnicity.clone(), format!("eth{next}"));
            next += 1;
        }
    }

    fn ethnicity_class(&mut self, data: &dyn DataProvider, indi: &Individual) -> String {
        if self.ethnicity_classes.is_empty() {
            self.build_ethnicity_classes(data);
        }
        indi.ethnicity
            .as_ref()
            .and_then(|ethnicity| self.ethnicity_classes.get(ethnicity))
            .cloned()
            .unwrap_or_default()
    }

    fn languages_class(&self, indi: &Individual) -> String {
        match &self.options.selected_language {
            Some(selected) => {
                if indi.languages.iter().any(|language| &language.id == selected) {
                    format!("l{}", class_token(selected))
                } else {
                    String::new()
                }
            }
            None if indi.languages.is_empty() => String::new(),
            None => format!("n{}", indi.languages.len().min(MAX_LANGUAGE_CLASS)),
        }
    }

    fn coloring_classes(&self, generation: i32) -> String {
        let coloring = self.options.colors.class();
        if self.options.colors == ChartColors::ByGeneration {
            let palette = self.options.theme.generation_colors.len().max(1) as i32;
            format!("{coloring} gen{}", generation.rem_euclid(palette))
        } else {
            coloring.to_string()
        }
    }

    fn render_indi(
        &mut self,
        out: &mut String,
        node: &PositionedNode,
        entry: &EntryBox,
        offset: (f32, f32),
        slot: &str,
        data: &dyn DataProvider,
    ) {
        out.push_str(&format!(
            "<g class=\"indi\" transform=\"translate({:.2}, {:.2})\">",
            offset.0, offset.1
        ));
        let (width, height) = (entry.width, entry.height);
        let Some(indi) = data.indi(&entry.id) else {
            out.push_str(&format!(
                "<rect class=\"background nocolor\" rx=\"5\" width=\"{width:.2}\" height=\"{height:.2}\"/></g>"
            ));
            return;
        };

        let classes = [
            "background".to_string(),
            self.coloring_classes(node.generation),
            sex_class(indi.sex).to_string(),
            self.ethnicity_class(data, indi),
            self.languages_class(indi),
        ]
        .into_iter()
        .filter(|class| !class.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
        out.push_str(&format!(
            "<rect class=\"{classes}\" rx=\"5\" stroke-width=\"0\" width=\"{width:.2}\" height=\"{height:.2}\"/>"
        ));

        let clip_id = escape_xml(&format!("clip-{}-{slot}", node.id));
        out.push_str(&format!(
            "<clipPath id=\"{clip_id}\"><rect rx=\"5\" width=\"{width:.2}\" height=\"{height:.2}\"/></clipPath>"
        ));

        let image = indi.image_url();
        let details_width = width - if image.is_some() { IMAGE_WIDTH } else { 0.0 };
        let center = details_width / 2.0;
        out.push_str(&text_element(
            center,
            17.0,
            "name",
            Some("middle"),
            indi.first_name().unwrap_or_default(),
        ));
        out.push_str(&text_element(
            center,
            33.0,
            "name",
            Some("middle"),
            &indi.last_name().unwrap_or_default(),
        ));

        let languages = indi.show_languages();
        let ethnicity = indi.show_ethnicity();
        if languages && let Some(label) = indi.languages_label() {
            out.push_str(&text_element(center, 52.0, "languages", Some("middle"), &label));
        }
        if ethnicity && let Some(value) = &indi.ethnicity {
            let y = if languages { 71.0 } else { 55.0 };
            out.push_str(&text_element(5.0, y, "ethnicity", None, &format!("¤ {value}")));
        }

        let start = 55.0
            + if languages { LANGUAGES_HEIGHT } else { 0.0 }
            + if ethnicity { ETHNICITY_HEIGHT } else { 0.0 };
        for (i, line) in indi_details(indi).iter().enumerate() {
            let y = start + i as f32 * DETAILS_HEIGHT;
            out.push_str(&text_element(9.0, y, "details", Some("middle"), line.symbol));
            out.push_str(&text_element(15.0, y, "details", None, &line.text));
        }

        if indi.show_id() {
            out.push_str(&text_element(9.0, height - 5.0, "id", None, &entry.id));
        }
        if indi.show_sex() {
            out.push_str(&text_element(
                details_width - 5.0,
                height - 5.0,
                "details sex",
                Some("end"),
                sex_symbol(indi.sex),
            ));
        }

        if let Some(url) = image {
            out.push_str(&format!(
                "<image width=\"{IMAGE_WIDTH}\" height=\"{height:.2}\" preserveAspectRatio=\"xMidYMin\" transform=\"translate({:.2}, 0)\" clip-path=\"url(#{clip_id})\" href=\"{}\"/>",
                width - IMAGE_WIDTH,
                escape_xml(url)
            ));
        }

        let dash = if entry.hidden_relatives { "5, 5" } else { "0, 0" };
        out.push_str(&format!(
            "<rect class=\"border\" rx=\"5\" fill-opacity=\"0\" stroke-dasharray=\"{dash}\" width=\"{width:.2}\" height=\"{height:.2}\"/>"
        ));
        out.push_str("</g>");
    }

    fn render_family(
        &self,
        out: &mut String,
        node: &PositionedNode,
        entry: &EntryBox,
        data: &dyn DataProvider,
        horizontal: bool,
    ) {
        let Some(fam) = data.fam(&entry.id) else {
            return;
        };
        let details = fam_details(fam);
        let (x, y) = composite::family_box_origin(node, horizontal);
        out.push_str(&format!(
            "<g class=\"family\" transform=\"translate({x:.2}, {y:.2})\">"
        ));
        if !details.is_empty() {
            out.push_str(&format!(
                "<rect class=\"{}\" rx=\"5\" ry=\"5\" width=\"{:.2}\" height=\"{:.2}\"/>",
                self.coloring_classes(node.generation),
                entry.width,
                entry.height
            ));
        }
        for (i, line) in details.iter().enumerate() {
            let y = 16.0 + i as f32 * DETAILS_HEIGHT;
            out.push_str(&text_element(9.0, y, "details", Some("middle"), line.symbol));
            out.push_str(&text_element(15.0, y, "details", Some("start"), &line.text));
        }
        out.push_str("</g>");
    }
}

impl NodeRenderer for DetailedRenderer {
    fn preferred_indi_size(&mut self, data: &dyn DataProvider, id: &str) -> (f32, f32) {
        let Some(indi) = data.indi(id) else {
            return (INDI_MIN_WIDTH, INDI_MIN_HEIGHT);
        };
        let details = indi_details(indi);
        let languages = indi.show_languages();
        let ethnicity = indi.show_ethnicity();
        let image = indi.image_url().is_some();

        let languages_height = if languages { LANGUAGES_HEIGHT } else { 0.0 };
        let ethnicity_height = if ethnicity { ETHNICITY_HEIGHT } else { 0.0 };
        let id_and_sex_height = if indi.show_id() || indi.show_sex() {
            DETAILS_HEIGHT
        } else {
            0.0
        };
        let height = (INDI_MIN_HEIGHT
            + languages_height
            + ethnicity_height
            + details.len() as f32 * DETAILS_HEIGHT
            + id_and_sex_height)
            .max(if image { IMAGE_HEIGHT } else { 0.0 });

        let details_width = details
            .iter()
            .map(|line| self.measurer.measure(&line.text, TextStyle::Details))
            .fold(0.0, f32::max);
        let first = self
            .measurer
            .measure(indi.first_name().unwrap_or_default(), TextStyle::Name);
        let last = self
            .measurer
            .measure(&indi.last_name().unwrap_or_default(), TextStyle::Name);
        let languages_width = match indi.languages_label() {
            Some(label) if languages => self.measurer.measure(&label, TextStyle::Languages) + 28.0,
            _ => 0.0,
        };
        let ethnicity_width = match &indi.ethnicity {
            Some(value) if ethnicity => self.measurer.measure(value, TextStyle::Ethnicity) + 28.0,
            _ => 0.0,
        };
        let id_width = self.measurer.measure(id, TextStyle::Id) + 32.0;
        let width = [
            details_width + 22.0,
            first + 8.0,
            last + 8.0,
            languages_width,
            ethnicity_width,
            id_width,
            INDI_MIN_WIDTH,
        ]
        .into_iter()
        .fold(0.0, f32::max)
            + if image { IMAGE_WIDTH } else { 0.0 };
        (width, height)
    }

    fn preferred_fam_size(&mut self, data: &dyn DataProvider, id: &str) -> (f32, f32) {
        let details = data.fam(id).map(fam_details).unwrap_or_default();
        if details.is_empty() {
            return (FAM_MIN_WIDTH, FAM_MIN_HEIGHT);
        }
        let height = (10.0 + details.len() as f32 * DETAILS_HEIGHT).max(FAM_MIN_HEIGHT);
        let details_width = details
            .iter()
            .map(|line| self.measurer.measure(&line.text, TextStyle::Details))
            .fold(0.0, f32::max);
        ((details_width + 22.0).max(FAM_MIN_WIDTH), height)
    }

    fn render_node(
        &mut self,
        node: &PositionedNode,
        data: &dyn DataProvider,
        horizontal: bool,
    ) -> String {
        let mut out = String::from("<g class=\"detailed\">");
        if let Some(indi) = &node.indi {
            let offset = composite::indi_box_origin(node, horizontal);
            self.render_indi(&mut out, node, indi, offset, "indi", data);
        }
        if let Some(spouse) = &node.spouse {
            let offset = composite::spouse_box_origin(node, horizontal);
            self.render_indi(&mut out, node, spouse, offset, "spouse", data);
        }
        if let Some(family) = &node.family {
            self.render_family(&mut out, node, family, data, horizontal);
        }
        out.push_str("</g>");
        out
    }

    fn stylesheet(&self) -> String {
        let theme = &self.options.theme;
        let mut css = format!(
            ".detailed text {{ font-family: {font}; fill: {text}; }}\n\
             .detailed .name {{ font-size: 12px; font-weight: bold; }}\n\
             .detailed .details, .detailed .languages, .detailed .ethnicity {{ font-size: 11px; }}\n\
             .detailed .id {{ font-size: 10px; font-style: italic; }}\n\
             .detailed rect {{ fill: {fill}; }}\n\
             .detailed rect.border {{ stroke: {border}; stroke-width: 1px; }}\n\
             .detailed .family rect {{ stroke: {border}; stroke-width: 1px; }}\n",
            font = theme.font_family,
            text = theme.text_color,
            fill = theme.box_color,
            border = theme.border_color,
        );
        for (index, color) in theme.generation_colors.iter().enumerate() {
            css.push_str(&format!(".detailed .bygeneration.gen{index} {{ fill: {color}; }}\n"));
        }
        css.push_str(&format!(
            ".detailed .bysex.male {{ fill: {}; }}\n.detailed .bysex.female {{ fill: {}; }}\n",
            theme.male_color, theme.female_color
        ));
        css.push_str(&format!(
            ".detailed .byethnicity.ego {{ fill: {}; }}\n",
            theme.ego_color
        ));
        for (index, color) in theme.ethnicity_colors.iter().enumerate() {
            css.push_str(&format!(
                ".detailed .byethnicity.eth{} {{ fill: {color}; }}\n",
                index + 1
            ));
        }
        for (index, color) in theme.language_count_colors.iter().enumerate() {
            css.push_str(&format!(
                ".detailed .bylanguages.n{} {{ fill: {color}; }}\n",
                index + 1
            ));
        }
        if let Some(selected) = &self.options.selected_language {
            css.push_str(&format!(
                ".detailed .bylanguages.l{} {{ fill: {}; }}\n",
                class_token(selected),
                theme.selected_language_color
            ));
        }
        css
    }

    fn reset(&mut self) {
        self.ethnicity_classes.clear();
        self.measurer.reset();
    }
}
